//! CLI interface for the job lens

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "job-lens")]
#[command(about = "Job posting scraper and skill gap analyzer")]
#[command(
    long_about = "Scrape job postings from ATS platforms, parse their skill requirements, and score them against your skill inventory"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape and analyze a job posting
    Scrape {
        /// Job posting URL
        url: String,

        /// Analyze this description file instead of fetching the URL (TXT, MD)
        #[arg(short, long)]
        description: Option<PathBuf>,

        /// Output format: console, json, markdown
        #[arg(short, long, default_value = "console")]
        output: String,

        /// Output detailed analysis
        #[arg(long)]
        detailed: bool,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Match a job posting against your skill inventory
    Match {
        /// Job posting URL
        url: String,

        /// Path to skills inventory file (JSON)
        #[arg(short = 'k', long)]
        skills: PathBuf,

        /// Analyze this description file instead of fetching the URL (TXT, MD)
        #[arg(short, long)]
        description: Option<PathBuf>,

        /// Output format: console, json, markdown
        #[arg(short, long, default_value = "console")]
        output: String,

        /// Output detailed analysis
        #[arg(long)]
        detailed: bool,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Analyze skill gaps across all saved jobs
    Portfolio {
        /// Path to saved jobs file (JSON)
        #[arg(short, long)]
        jobs: PathBuf,

        /// Path to skills inventory file (JSON)
        #[arg(short = 'k', long)]
        skills: PathBuf,

        /// Output format: console, json, markdown
        #[arg(short, long, default_value = "console")]
        output: String,

        /// Output detailed analysis
        #[arg(long)]
        detailed: bool,

        /// Save a point-in-time snapshot of the analysis to file (JSON)
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        "markdown" | "md" => Ok(crate::config::OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &PathBuf, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("console"), Ok(OutputFormat::Console));
        assert_eq!(parse_output_format("MD"), Ok(OutputFormat::Markdown));
        assert!(parse_output_format("html").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(&PathBuf::from("skills.json"), &["json"]).is_ok());
        assert!(validate_file_extension(&PathBuf::from("skills.yaml"), &["json"]).is_err());
        assert!(validate_file_extension(&PathBuf::from("skills"), &["json"]).is_err());
    }
}
