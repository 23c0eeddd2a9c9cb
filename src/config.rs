//! Configuration management for job-lens

use crate::error::{JobLensError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub scraping: ScrapingConfig,
    pub matching: MatchingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingConfig {
    /// HTTP timeout for the single fetch attempt, in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Cap on collected bullet-point requirements
    pub max_specific_requirements: usize,
    /// Optional override for the skill database TOML
    pub skill_database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Similarity ratio a fuzzy candidate must exceed
    pub fuzzy_threshold: f64,
    pub required_weight: f64,
    pub preferred_weight: f64,
    pub technology_weight: f64,
    /// Priority boost applied to technical skill gaps
    pub technical_boost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scraping: ScrapingConfig {
                timeout_secs: 10,
                user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                             (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                    .to_string(),
                max_specific_requirements: 10,
                skill_database_path: None,
            },
            matching: MatchingConfig {
                fuzzy_threshold: 0.8,
                required_weight: 0.6,
                preferred_weight: 0.3,
                technology_weight: 0.1,
                technical_boost: 1.2,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| JobLensError::Configuration(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| JobLensError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("job-lens")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matching_weights() {
        let config = Config::default();
        assert_eq!(config.matching.fuzzy_threshold, 0.8);
        assert_eq!(config.matching.required_weight, 0.6);
        assert_eq!(config.matching.preferred_weight, 0.3);
        assert_eq!(config.matching.technology_weight, 0.1);
    }

    #[test]
    fn test_config_round_trip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.scraping.timeout_secs, 10);
        assert_eq!(parsed.matching.technical_boost, 1.2);
    }
}
