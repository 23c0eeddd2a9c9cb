//! Job lens: job posting scraper and skill gap analyzer

mod cli;
mod config;
mod error;
mod matching;
mod output;
mod parsing;
mod scraping;
mod storage;
mod util;

use clap::Parser;
use cli::{Cli, Commands, ConfigAction};
use config::Config;
use error::{JobLensError, Result};
use log::{error, info};
use matching::gap_analyzer::GapAnalyzer;
use matching::skill_matcher::{JobSkills, SkillMatcher};
use matching::snapshot::AnalysisSnapshot;
use output::formatter::{save_report_to_file, ReportGenerator};
use scraping::pipeline::{JobScrape, JobScraper};
use std::path::{Path, PathBuf};
use std::process;
use storage::{JobStore, SkillInventory, UserSkill};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Scrape {
            url,
            description,
            output,
            detailed,
            save,
        } => {
            info!("Analyzing job posting: {}", url);

            let format = cli::parse_output_format(&output).map_err(JobLensError::InvalidInput)?;
            let scraper = JobScraper::new(&config)?;
            let scrape = obtain_scrape(&scraper, &url, description.as_deref()).await?;

            let generator =
                ReportGenerator::with_options(config.output.color_output, detailed, true);
            let report = generator.generate_scrape(&scrape, format)?;
            emit(&report, save.as_deref())?;
            Ok(())
        }

        Commands::Match {
            url,
            skills,
            description,
            output,
            detailed,
            save,
        } => {
            info!("Matching skills against job posting: {}", url);

            let format = cli::parse_output_format(&output).map_err(JobLensError::InvalidInput)?;
            let inventory = load_inventory(&skills)?;

            let scraper = JobScraper::new(&config)?;
            let scrape = obtain_scrape(&scraper, &url, description.as_deref()).await?;

            let matcher = SkillMatcher::new(&inventory, scraper.database(), &config.matching);
            let report = matcher.analyze(&JobSkills::from_scrape(&scrape));

            let generator =
                ReportGenerator::with_options(config.output.color_output, detailed, true);
            let rendered = generator.generate_match(&scrape, &report, format)?;
            emit(&rendered, save.as_deref())?;
            Ok(())
        }

        Commands::Portfolio {
            jobs,
            skills,
            output,
            detailed,
            snapshot,
            save,
        } => {
            info!("Running portfolio gap analysis");

            let format = cli::parse_output_format(&output).map_err(JobLensError::InvalidInput)?;
            let inventory = load_inventory(&skills)?;
            let store = load_jobs(&jobs)?;
            let postings = store.all();

            let scraper = JobScraper::new(&config)?;
            let analyzer = GapAnalyzer::new(scraper.database(), &config.matching);
            let report = analyzer.analyze(&postings, &inventory);

            if let Some(path) = &snapshot {
                let captured = AnalysisSnapshot::capture(&report);
                let json = serde_json::to_string_pretty(&captured)?;
                save_report_to_file(&json, path)?;
                info!("Snapshot saved to {}", path.display());
            }

            let generator =
                ReportGenerator::with_options(config.output.color_output, detailed, true);
            let rendered = generator.generate_portfolio(&report, format)?;
            emit(&rendered, save.as_deref())?;
            Ok(())
        }

        Commands::Config { action } => {
            match action.unwrap_or(ConfigAction::Show) {
                ConfigAction::Show => {
                    let content = toml::to_string_pretty(&config).map_err(|e| {
                        JobLensError::Configuration(format!("Failed to serialize config: {}", e))
                    })?;
                    println!("# {}\n{}", Config::config_path().display(), content);
                }
                ConfigAction::Reset => {
                    Config::default().save()?;
                    println!("Configuration reset to defaults");
                }
            }
            Ok(())
        }
    }
}

/// Fetch the URL, or analyze a caller-supplied description file instead
async fn obtain_scrape(
    scraper: &JobScraper,
    url: &str,
    description: Option<&Path>,
) -> Result<JobScrape> {
    match description {
        Some(path) => {
            cli::validate_file_extension(&path.to_path_buf(), &["txt", "md"])
                .map_err(|e| JobLensError::InvalidInput(format!("Description file: {}", e)))?;
            let text = std::fs::read_to_string(path)?;
            Ok(scraper.analyze_description(url, &text))
        }
        None => Ok(scraper.scrape_or_failure(url).await),
    }
}

fn load_inventory(path: &PathBuf) -> Result<SkillInventory> {
    cli::validate_file_extension(path, &["json"])
        .map_err(|e| JobLensError::InvalidInput(format!("Skills file: {}", e)))?;
    let content = std::fs::read_to_string(path)?;
    let skills: Vec<UserSkill> = serde_json::from_str(&content)?;
    Ok(SkillInventory::from_skills(skills))
}

fn load_jobs(path: &PathBuf) -> Result<JobStore> {
    cli::validate_file_extension(path, &["json"])
        .map_err(|e| JobLensError::InvalidInput(format!("Jobs file: {}", e)))?;
    let content = std::fs::read_to_string(path)?;
    let scrapes: Vec<JobScrape> = serde_json::from_str(&content)?;

    let mut store = JobStore::new();
    for scrape in scrapes {
        store.add_or_get(scrape);
    }
    Ok(store)
}

fn emit(report: &str, save: Option<&Path>) -> Result<()> {
    println!("{}", report);
    if let Some(path) = save {
        save_report_to_file(report, path)?;
        info!("Report saved to {}", path.display());
    }
    Ok(())
}
