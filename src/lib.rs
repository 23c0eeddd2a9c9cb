//! Job lens library

pub mod cli;
pub mod config;
pub mod error;
pub mod matching;
pub mod output;
pub mod parsing;
pub mod scraping;
pub mod storage;
pub mod util;

pub use config::Config;
pub use error::{JobLensError, Result};
