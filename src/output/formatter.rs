//! Output formatters with multiple format support

use crate::config::OutputFormat;
use crate::error::Result;
use crate::matching::gap_analyzer::PortfolioReport;
use crate::matching::skill_matcher::{CategoryAnalysis, MatchLevel, MatchReport};
use crate::scraping::pipeline::JobScrape;
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for formatting analysis results
pub trait OutputFormatter {
    fn format_scrape(&self, scrape: &JobScrape) -> Result<String>;
    fn format_match(&self, scrape: &JobScrape, report: &MatchReport) -> Result<String>;
    fn format_portfolio(&self, report: &PortfolioReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with colors and rich presentation
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for integration with the surrounding application
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter for saved reports
pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Coordinates the formatters behind one dispatch point
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self {
            use_colors,
            detailed,
        }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };
        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, level: MatchLevel) -> String {
        let (badge, color) = match level {
            MatchLevel::Excellent => ("EXCELLENT", Color::Green),
            MatchLevel::Good => ("GOOD", Color::BrightGreen),
            MatchLevel::Fair => ("FAIR", Color::Yellow),
            MatchLevel::Poor => ("POOR", Color::Red),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_category(&self, output: &mut String, name: &str, category: &CategoryAnalysis) {
        output.push_str(&format!(
            "{}: {}% ({}/{} matched)\n",
            name, category.match_percentage, category.matched_count, category.total_count
        ));
        if self.detailed {
            for matched in &category.matched_skills {
                output.push_str(&format!(
                    "  ✓ {}\n",
                    self.colorize(&matched.job_skill, Color::Green)
                ));
            }
            for partial in &category.partial_matches {
                output.push_str(&format!(
                    "  ~ {} (via {}, {}%)\n",
                    self.colorize(&partial.job_skill, Color::Yellow),
                    partial.user_skill,
                    partial.similarity
                ));
            }
            for gap in &category.missing_skills {
                output.push_str(&format!(
                    "  ✗ {}\n",
                    self.colorize(&gap.skill_name, Color::Red)
                ));
            }
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_scrape(&self, scrape: &JobScrape) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📋 JOB POSTING ANALYSIS", 1));
        output.push_str(&format!(
            "Position: {}\n",
            self.colorize(&scrape.job_title, Color::Cyan)
        ));
        output.push_str(&format!("Company: {}\n", scrape.company_name));
        if !scrape.location.is_empty() {
            output.push_str(&format!("Location: {}\n", scrape.location));
        }
        output.push_str(&format!(
            "Remote: {}\n",
            if scrape.remote_allowed { "yes" } else { "no" }
        ));
        output.push_str(&format!(
            "Platform: {}\n",
            scrape.scraped_content.ats_platform
        ));

        let requirements = &scrape.parsed_requirements;
        output.push_str(&self.format_header("Requirements", 2));
        if !requirements.experience_years.is_empty() {
            output.push_str(&format!("Experience: {}\n", requirements.experience_years));
        }
        if !requirements.education.is_empty() {
            output.push_str(&format!("Education: {}\n", requirements.education));
        }
        output.push_str(&format!(
            "Required skills ({}): {}\n",
            requirements.required_skills.len(),
            requirements
                .required_skills
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        ));
        output.push_str(&format!(
            "Preferred skills ({}): {}\n",
            requirements.preferred_skills.len(),
            requirements
                .preferred_skills
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        ));

        if self.detailed && !requirements.specific_requirements.is_empty() {
            output.push_str(&self.format_header("Specific Requirements", 3));
            for (i, requirement) in requirements.specific_requirements.iter().enumerate() {
                output.push_str(&format!("{}. {}\n", i + 1, requirement));
            }
        }

        let opportunities = &scrape.matching_opportunities;
        if !opportunities.key_technologies.is_empty() {
            output.push_str(&self.format_header("Key Technologies", 3));
            output.push_str(&format!("{}\n", opportunities.key_technologies.join(", ")));
        }

        if !scrape.scraping_metadata.success {
            output.push_str(&format!(
                "\n{} {}\n",
                self.colorize("⚠️ Scraping failed:", Color::Red),
                scrape.scraping_metadata.error.as_deref().unwrap_or("unknown error")
            ));
        }

        Ok(output)
    }

    fn format_match(&self, scrape: &JobScrape, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📊 SKILL MATCH ANALYSIS", 1));
        output.push_str(&format!(
            "{} at {}\n",
            self.colorize(&scrape.job_title, Color::Cyan),
            scrape.company_name
        ));

        let badge = self.format_score_badge(report.match_level);
        output.push_str(&format!(
            "Overall Match: {}% {}\n",
            report.overall_match_score, badge
        ));
        output.push_str(&format!(
            "Matched {} of {} job skills\n",
            report.total_matched_skills, report.total_job_skills
        ));

        output.push_str(&self.format_header("Category Breakdown", 2));
        self.format_category(&mut output, "Required", &report.required_skills);
        self.format_category(&mut output, "Preferred", &report.preferred_skills);
        self.format_category(&mut output, "Technologies", &report.technologies);

        if !report.top_skill_gaps.is_empty() {
            output.push_str(&self.format_header("🎯 Top Skill Gaps", 2));
            for gap in &report.top_skill_gaps {
                output.push_str(&format!(
                    "  • {} (score {}, {:?})\n",
                    self.colorize(&gap.skill_name, Color::Red),
                    gap.priority_score,
                    gap.category
                ));
            }
        }

        output.push_str(&self.format_header("📋 Recommendations", 2));
        for recommendation in &report.recommendations {
            output.push_str(&format!("  • {}\n", recommendation.message));
            output.push_str(&format!(
                "    {}\n",
                self.colorize(&recommendation.action, Color::BrightBlack)
            ));
        }

        Ok(output)
    }

    fn format_portfolio(&self, report: &PortfolioReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📊 PORTFOLIO GAP ANALYSIS", 1));

        if let Some(reason) = &report.insufficient_data {
            output.push_str(&format!(
                "{} {}\n",
                self.colorize("⚠️", Color::Yellow),
                reason.message()
            ));
            return Ok(output);
        }

        output.push_str(&format!(
            "Analyzed {} jobs against {} skills\n",
            report.total_jobs_analyzed, report.total_user_skills
        ));

        if !report.skill_gaps.is_empty() {
            output.push_str(&self.format_header("🎯 Skill Gaps by Priority", 2));
            let limit = if self.detailed { report.skill_gaps.len() } else { 10 };
            for gap in report.skill_gaps.iter().take(limit) {
                output.push_str(&format!(
                    "  • {} — in {} of {} jobs (priority {})\n",
                    self.colorize(&gap.skill_name, Color::Red),
                    gap.frequency,
                    report.total_jobs_analyzed,
                    gap.priority_score
                ));
            }
        }

        if !report.job_match_scores.is_empty() {
            output.push_str(&self.format_header("💼 Job Match Scores", 2));
            for score in &report.job_match_scores {
                let color = if score.match_percentage >= 70.0 {
                    Color::Green
                } else if score.match_percentage >= 50.0 {
                    Color::Yellow
                } else {
                    Color::Red
                };
                output.push_str(&format!(
                    "  {} — {} at {} ({}/{} skills)\n",
                    self.colorize(&format!("{}%", score.match_percentage), color),
                    score.job_title,
                    score.company_name,
                    score.total_matched,
                    score.total_job_skills
                ));
            }
        }

        if !report.suggestions.is_empty() {
            output.push_str(&self.format_header("📋 Suggestions", 2));
            for suggestion in &report.suggestions {
                output.push_str(&format!("  • {}\n", suggestion.message));
                output.push_str(&format!(
                    "    {}\n",
                    self.colorize(&suggestion.action, Color::BrightBlack)
                ));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn serialize<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_scrape(&self, scrape: &JobScrape) -> Result<String> {
        self.serialize(scrape)
    }

    fn format_match(&self, scrape: &JobScrape, report: &MatchReport) -> Result<String> {
        self.serialize(&serde_json::json!({
            "job_title": scrape.job_title,
            "company_name": scrape.company_name,
            "url": scrape.scraped_content.original_url,
            "match_report": report,
        }))
    }

    fn format_portfolio(&self, report: &PortfolioReport) -> Result<String> {
        self.serialize(report)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn metadata_footer(&self, output: &mut String, version: &str) {
        if self.include_metadata {
            output.push_str("---\n\n");
            output.push_str(&format!("*Generated by job-lens v{}*\n", version));
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_scrape(&self, scrape: &JobScrape) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!("# 📋 {}\n\n", scrape.job_title));
        output.push_str(&format!("**Company:** {}\n", scrape.company_name));
        if !scrape.location.is_empty() {
            output.push_str(&format!("**Location:** {}\n", scrape.location));
        }
        output.push_str(&format!(
            "**Remote:** {} | **Platform:** {}\n\n",
            if scrape.remote_allowed { "yes" } else { "no" },
            scrape.scraped_content.ats_platform
        ));

        let requirements = &scrape.parsed_requirements;
        output.push_str("## Requirements\n\n");
        if !requirements.experience_years.is_empty() {
            output.push_str(&format!("**Experience:** {}\n", requirements.experience_years));
        }
        if !requirements.education.is_empty() {
            output.push_str(&format!("**Education:** {}\n", requirements.education));
        }
        output.push('\n');

        output.push_str("### Required Skills\n\n");
        for skill in &requirements.required_skills {
            output.push_str(&format!("- {}\n", skill));
        }
        output.push_str("\n### Preferred Skills\n\n");
        for skill in &requirements.preferred_skills {
            output.push_str(&format!("- {}\n", skill));
        }
        output.push('\n');

        if !requirements.specific_requirements.is_empty() {
            output.push_str("### Specific Requirements\n\n");
            for (i, requirement) in requirements.specific_requirements.iter().enumerate() {
                output.push_str(&format!("{}. {}\n", i + 1, requirement));
            }
            output.push('\n');
        }

        self.metadata_footer(&mut output, &scrape.scraping_metadata.scraper_version);
        Ok(output)
    }

    fn format_match(&self, scrape: &JobScrape, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!(
            "# 📊 Skill Match: {} at {}\n\n",
            scrape.job_title, scrape.company_name
        ));
        output.push_str(&format!(
            "**Overall Match:** {}% ({:?})\n\n",
            report.overall_match_score, report.match_level
        ));

        output.push_str("## Category Breakdown\n\n");
        output.push_str("| Category | Matched | Total | Percentage |\n");
        output.push_str("|----------|---------|-------|------------|\n");
        for (name, category) in [
            ("Required", &report.required_skills),
            ("Preferred", &report.preferred_skills),
            ("Technologies", &report.technologies),
        ] {
            output.push_str(&format!(
                "| {} | {} | {} | {}% |\n",
                name, category.matched_count, category.total_count, category.match_percentage
            ));
        }
        output.push('\n');

        if !report.top_skill_gaps.is_empty() {
            output.push_str("## 🎯 Top Skill Gaps\n\n");
            for gap in &report.top_skill_gaps {
                output.push_str(&format!(
                    "- **{}** (score {}, {:?})\n",
                    gap.skill_name, gap.priority_score, gap.category
                ));
            }
            output.push('\n');
        }

        output.push_str("## 📋 Recommendations\n\n");
        for recommendation in &report.recommendations {
            output.push_str(&format!(
                "- {}\n  - *{}*\n",
                recommendation.message, recommendation.action
            ));
        }
        output.push('\n');

        self.metadata_footer(&mut output, &scrape.scraping_metadata.scraper_version);
        Ok(output)
    }

    fn format_portfolio(&self, report: &PortfolioReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# 📊 Portfolio Gap Analysis\n\n");

        if let Some(reason) = &report.insufficient_data {
            output.push_str(&format!("> ⚠️ {}\n", reason.message()));
            return Ok(output);
        }

        output.push_str(&format!(
            "Analyzed **{}** jobs against **{}** skills.\n\n",
            report.total_jobs_analyzed, report.total_user_skills
        ));

        if !report.skill_gaps.is_empty() {
            output.push_str("## 🎯 Skill Gaps\n\n");
            output.push_str("| Skill | Jobs | Priority |\n");
            output.push_str("|-------|------|----------|\n");
            for gap in &report.skill_gaps {
                output.push_str(&format!(
                    "| {} | {}/{} | {} |\n",
                    gap.skill_name, gap.frequency, report.total_jobs_analyzed, gap.priority_score
                ));
            }
            output.push('\n');
        }

        if !report.job_match_scores.is_empty() {
            output.push_str("## 💼 Job Match Scores\n\n");
            for score in &report.job_match_scores {
                output.push_str(&format!(
                    "- **{}%** — {} at {} ({}/{} skills)\n",
                    score.match_percentage,
                    score.job_title,
                    score.company_name,
                    score.total_matched,
                    score.total_job_skills
                ));
            }
            output.push('\n');
        }

        for suggestion in &report.suggestions {
            output.push_str(&format!("> {}\n\n", suggestion.message));
        }

        self.metadata_footer(&mut output, "1.0.0");
        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        }
    }

    pub fn generate_scrape(&self, scrape: &JobScrape, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_scrape(scrape)
    }

    pub fn generate_match(
        &self,
        scrape: &JobScrape,
        report: &MatchReport,
        format: OutputFormat,
    ) -> Result<String> {
        self.formatter(format).format_match(scrape, report)
    }

    pub fn generate_portfolio(
        &self,
        report: &PortfolioReport,
        format: OutputFormat,
    ) -> Result<String> {
        self.formatter(format).format_portfolio(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, job_title: &str, timestamp: bool) -> String {
    let base_name: String = job_title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_analysis{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_analysis{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_analysis{}.md", base_name, timestamp_suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraping::pipeline::JobScrape;

    fn scrape() -> JobScrape {
        let mut scrape = JobScrape::failure("https://example.com/job", "fixture");
        scrape.scraping_metadata.success = true;
        scrape.scraping_metadata.error = None;
        scrape.job_title = "Platform Engineer".to_string();
        scrape.company_name = "Acme".to_string();
        scrape
            .parsed_requirements
            .required_skills
            .insert("python".to_string());
        scrape
    }

    #[test]
    fn test_console_scrape_without_colors() {
        let formatter = ConsoleFormatter::new(false, false);
        let output = formatter.format_scrape(&scrape()).unwrap();
        assert!(output.contains("Platform Engineer"));
        assert!(output.contains("python"));
        // no ANSI escapes when colors are off
        assert!(!output.contains('\u{1b}'));
    }

    #[test]
    fn test_json_scrape_round_trips() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.format_scrape(&scrape()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["job_title"], "Platform Engineer");
    }

    #[test]
    fn test_markdown_scrape_structure() {
        let formatter = MarkdownFormatter::new(true);
        let output = formatter.format_scrape(&scrape()).unwrap();
        assert!(output.contains("# 📋 Platform Engineer"));
        assert!(output.contains("### Required Skills"));
        assert!(output.contains("- python"));
        assert!(output.contains("*Generated by job-lens"));
    }

    #[test]
    fn test_suggest_filename() {
        let name = suggest_filename(OutputFormat::Json, "Platform Engineer", false);
        assert_eq!(name, "platform_engineer_analysis.json");
    }
}
