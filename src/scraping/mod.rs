//! Job posting retrieval and content extraction

pub mod extractor;
pub mod fetcher;
pub mod pipeline;
pub mod platform;
