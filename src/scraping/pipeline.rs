//! Scrape pipeline: fetch, detect, extract, parse, assemble

use crate::config::Config;
use crate::error::Result;
use crate::parsing::requirements::{
    ExtractedRequirements, MatchingOpportunities, RequirementParser,
};
use crate::parsing::skill_db::SkillDatabase;
use crate::scraping::extractor::ContentExtractor;
use crate::scraping::fetcher::PageFetcher;
use crate::scraping::platform::AtsPlatform;
use chrono::{DateTime, Utc};
use log::{info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

const SCRAPER_VERSION: &str = "1.0.0";

/// Raw page-level content carried alongside the parsed record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedContent {
    pub full_description: String,
    pub description_html: String,
    pub company_info: String,
    pub benefits: String,
    pub original_url: String,
    pub ats_platform: AtsPlatform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapingMetadata {
    pub success: bool,
    pub scraped_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub scraper_version: String,
}

/// The full output record for one scrape/analyze operation; this is
/// the JSON contract with the surrounding application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobScrape {
    pub job_title: String,
    pub company_name: String,
    pub location: String,
    pub remote_allowed: bool,
    pub scraped_content: ScrapedContent,
    pub parsed_requirements: ExtractedRequirements,
    pub matching_opportunities: MatchingOpportunities,
    pub scraping_metadata: ScrapingMetadata,
}

impl JobScrape {
    /// Failure-marked record for a URL that could not be fetched.
    /// The caller stores this instead of dropping the attempt.
    pub fn failure(url: &str, error: &str) -> Self {
        Self {
            job_title: "Could Not Parse".to_string(),
            company_name: "Scraping Failed".to_string(),
            location: String::new(),
            remote_allowed: false,
            scraped_content: ScrapedContent {
                full_description: String::new(),
                description_html: String::new(),
                company_info: String::new(),
                benefits: String::new(),
                original_url: url.to_string(),
                ats_platform: AtsPlatform::Generic,
            },
            parsed_requirements: ExtractedRequirements::default(),
            matching_opportunities: MatchingOpportunities::default(),
            scraping_metadata: ScrapingMetadata {
                success: false,
                scraped_at: Utc::now(),
                error: Some(error.to_string()),
                scraper_version: SCRAPER_VERSION.to_string(),
            },
        }
    }
}

pub struct JobScraper {
    fetcher: PageFetcher,
    extractor: ContentExtractor,
    parser: RequirementParser,
    remote_patterns: Vec<Regex>,
    remote_placeholder: Regex,
}

impl JobScraper {
    pub fn new(config: &Config) -> Result<Self> {
        let db = match &config.scraping.skill_database_path {
            Some(path) => SkillDatabase::from_file(path)?,
            None => SkillDatabase::embedded()?,
        };
        let parser = RequirementParser::new(db, config.scraping.max_specific_requirements)?;

        let remote_patterns = [
            r"remote.{0,20}work",
            r"work.{0,20}from.{0,10}home",
            r"distributed.{0,10}team",
            r"location.{0,10}independent",
            r"anywhere",
            r"100% remote",
            r"fully remote",
            r"remote first",
            r"remote friendly",
        ]
        .iter()
        .map(|p| Regex::new(p).map_err(|e| crate::error::JobLensError::Processing(e.to_string())))
        .collect::<Result<Vec<_>>>()?;

        let remote_placeholder = Regex::new(r"%[A-Z_]*REMOTE[A-Z_]*%")
            .map_err(|e| crate::error::JobLensError::Processing(e.to_string()))?;

        Ok(Self {
            fetcher: PageFetcher::new(&config.scraping)?,
            extractor: ContentExtractor::new()?,
            parser,
            remote_patterns,
            remote_placeholder,
        })
    }

    pub fn database(&self) -> &SkillDatabase {
        self.parser.database()
    }

    /// Fetch and analyze one posting URL. The only hard failure is the
    /// fetch itself; extraction gaps degrade to empty fields.
    pub async fn scrape(&self, url: &str) -> Result<JobScrape> {
        let html = self.fetcher.fetch(url).await?;
        Ok(self.analyze_html(url, &html))
    }

    /// Like `scrape` but a fetch failure becomes a failure-marked record
    pub async fn scrape_or_failure(&self, url: &str) -> JobScrape {
        match self.scrape(url).await {
            Ok(scrape) => scrape,
            Err(e) => {
                warn!("Scrape failed for {}: {}", url, e);
                JobScrape::failure(url, &e.to_string())
            }
        }
    }

    /// Analyze already-fetched markup (also used by tests and fixtures)
    pub fn analyze_html(&self, url: &str, html: &str) -> JobScrape {
        let platform = AtsPlatform::detect(url, html);
        info!("Detected ATS platform: {}", platform);

        let content = self.extractor.extract(html, platform);
        let parsed_requirements = self.parser.parse(&content.description_text);
        let matching_opportunities =
            MatchingOpportunities::derive(&parsed_requirements, self.parser.database());

        JobScrape {
            job_title: non_empty_or(&content.job_title, "Unknown Position"),
            company_name: non_empty_or(&content.company_name, "Unknown Company"),
            location: content.location.clone(),
            remote_allowed: self.is_remote_job(&content.description_text),
            scraped_content: ScrapedContent {
                full_description: content.description_text,
                description_html: content.description_html,
                company_info: content.company_info,
                benefits: content.benefits,
                original_url: url.to_string(),
                ats_platform: platform,
            },
            parsed_requirements,
            matching_opportunities,
            scraping_metadata: ScrapingMetadata {
                success: true,
                scraped_at: Utc::now(),
                error: None,
                scraper_version: SCRAPER_VERSION.to_string(),
            },
        }
    }

    /// Manual-override path: the caller supplies the description text
    /// instead of scraping (used when a site cannot be fetched)
    pub fn analyze_description(&self, url: &str, description: &str) -> JobScrape {
        let parsed_requirements = self.parser.parse(description);
        let matching_opportunities =
            MatchingOpportunities::derive(&parsed_requirements, self.parser.database());

        JobScrape {
            job_title: "Unknown Position".to_string(),
            company_name: "Unknown Company".to_string(),
            location: String::new(),
            remote_allowed: self.is_remote_job(description),
            scraped_content: ScrapedContent {
                full_description: description.to_string(),
                description_html: String::new(),
                company_info: String::new(),
                benefits: String::new(),
                original_url: url.to_string(),
                ats_platform: AtsPlatform::Generic,
            },
            parsed_requirements,
            matching_opportunities,
            scraping_metadata: ScrapingMetadata {
                success: true,
                scraped_at: Utc::now(),
                error: None,
                scraper_version: SCRAPER_VERSION.to_string(),
            },
        }
    }

    /// Remote-work detection, aware of unrendered %...REMOTE...% tokens
    fn is_remote_job(&self, text: &str) -> bool {
        let lower = text.to_lowercase();

        if text.contains('%') && lower.contains("remote") {
            return !self.remote_placeholder.is_match(text)
                && self.remote_patterns.iter().any(|p| p.is_match(&lower));
        }

        let keywords = [
            "remote",
            "work from home",
            "telecommute",
            "distributed",
            "anywhere",
            "100% remote",
            "fully remote",
            "remote first",
        ];
        keywords.iter().any(|k| lower.contains(k))
    }
}

fn non_empty_or(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn scraper() -> JobScraper {
        JobScraper::new(&Config::default()).unwrap()
    }

    const LEVER_PAGE: &str = r#"<html><head><title>Jobs at Acme</title></head><body>
        <div class="posting">
          <div class="posting-headline"><h2>Senior Data Engineer</h2></div>
          <div class="posting-company"><h2>Acme</h2></div>
          <div class="posting-categories"><span class="location">Berlin</span></div>
          <div class="posting-description">
            We build data platforms (e.g., Snowflake, Airflow, dbt).
            5+ years experience required. Bachelor's degree required.
            This is a fully remote role.
          </div>
        </div>
        </body></html>"#;

    #[test]
    fn test_analyze_html_full_record() {
        let scrape = scraper().analyze_html("https://jobs.lever.co/acme/1", LEVER_PAGE);

        assert_eq!(scrape.scraped_content.ats_platform, AtsPlatform::Lever);
        assert_eq!(scrape.job_title, "Senior Data Engineer");
        assert_eq!(scrape.company_name, "Acme");
        assert_eq!(scrape.location, "Berlin");
        assert!(scrape.remote_allowed);
        assert!(scrape.parsed_requirements.required_skills.contains("snowflake"));
        assert!(scrape.parsed_requirements.required_skills.contains("airflow"));
        assert!(scrape.parsed_requirements.required_skills.contains("dbt"));
        assert_eq!(scrape.parsed_requirements.experience_years, "5+ years");
        assert!(scrape.scraping_metadata.success);
        assert!(scrape.scraping_metadata.error.is_none());
    }

    #[test]
    fn test_manual_description_override() {
        let scrape = scraper().analyze_description(
            "https://example.com/job",
            "Looking for Python and Docker experience. Must have Kubernetes.",
        );

        assert!(scrape.scraping_metadata.success);
        assert!(scrape.parsed_requirements.required_skills.contains("python"));
        assert!(scrape.parsed_requirements.required_skills.contains("kubernetes"));
    }

    #[test]
    fn test_failure_record_shape() {
        let scrape = JobScrape::failure("https://example.com/job", "connection refused");

        assert!(!scrape.scraping_metadata.success);
        assert_eq!(scrape.company_name, "Scraping Failed");
        assert_eq!(scrape.job_title, "Could Not Parse");
        assert_eq!(
            scrape.scraping_metadata.error.as_deref(),
            Some("connection refused")
        );
    }

    #[test]
    fn test_remote_placeholder_not_remote() {
        let scraper = scraper();
        assert!(!scraper.is_remote_job("Position type: %LABEL_POSITION_TYPE_REMOTE_ANY%"));
        assert!(scraper.is_remote_job("This is a fully remote position"));
        assert!(scraper.is_remote_job("100% remote, work from anywhere"));
    }

    #[test]
    fn test_scrape_record_serializes() {
        let scrape = scraper().analyze_html("https://jobs.lever.co/acme/1", LEVER_PAGE);
        let json = serde_json::to_value(&scrape).unwrap();

        assert_eq!(json["scraped_content"]["ats_platform"], "lever");
        assert_eq!(json["scraping_metadata"]["success"], true);
        assert!(json["parsed_requirements"]["required_skills"].is_array());
    }
}
