//! Report formatting for console, JSON, and Markdown output

pub mod formatter;
