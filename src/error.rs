//! Error handling for the job-lens application

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobLensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Skill database error: {0}")]
    SkillDatabase(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

pub type Result<T> = std::result::Result<T, JobLensError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for JobLensError {
    fn from(err: anyhow::Error) -> Self {
        JobLensError::Processing(err.to_string())
    }
}

/// Transport failures surface as fetch errors with the original message
impl From<reqwest::Error> for JobLensError {
    fn from(err: reqwest::Error) -> Self {
        JobLensError::Fetch(err.to_string())
    }
}
