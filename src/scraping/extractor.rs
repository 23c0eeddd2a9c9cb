//! Structured field extraction from job posting markup

use crate::error::{JobLensError, Result};
use crate::scraping::platform::AtsPlatform;
use crate::util::title_case;
use log::{debug, warn};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

/// Raw fields pulled out of one posting page. Missing fields degrade to
/// empty strings; downstream parsing of an empty description just yields
/// an empty requirements record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobContent {
    pub job_title: String,
    pub company_name: String,
    pub location: String,
    pub description_text: String,
    pub description_html: String,
    pub benefits: String,
    pub company_info: String,
}

pub struct ContentExtractor {
    placeholder_patterns: Vec<Regex>,
    title_company_patterns: Vec<Regex>,
    token_cleaner: Regex,
}

impl ContentExtractor {
    pub fn new() -> Result<Self> {
        // Unrendered ATS template variables that leak into served pages
        let placeholder_patterns = compile_all(&[
            r"%[A-Z_]+%",
            r"\{\{.*?\}\}",
            r"\[.*?\]",
            r"(?i)COMPANY_NAME",
            r"(?i)PLACEHOLDER",
            r"(?i)TBD",
            r"(?i)TO_BE_DETERMINED",
        ])?;

        let title_company_patterns = compile_all(&[
            r"(?i)(.+?)\s*-\s*Careers?",
            r"(?i)(.+?)\s*-\s*Jobs?",
            r"(?i)(.+?)\s*\|\s*Careers?",
            r"(?i)(.+?)\s*\|\s*Jobs?",
            r"(?i)Jobs?\s*at\s*(.+?)(?:\s*-|\s*\||$)",
            r"(?i)Careers?\s*at\s*(.+?)(?:\s*-|\s*\||$)",
        ])?;

        let token_cleaner =
            Regex::new(r"%[A-Z_]+%").map_err(|e| JobLensError::Extraction(e.to_string()))?;

        Ok(Self {
            placeholder_patterns,
            title_company_patterns,
            token_cleaner,
        })
    }

    pub fn extract(&self, html: &str, platform: AtsPlatform) -> JobContent {
        let document = Html::parse_document(html);
        let profile = platform.selector_profile();

        let job_title = self
            .select_first_text(&document, profile.title)
            .unwrap_or_default();
        let company_name = self.extract_company_name(&document, profile.company);
        let location = self.extract_location(&document, profile.location);

        let (description_text, description_html) = self
            .find_first_element(&document, profile.description)
            .map(|element| (element_text(&element), element.html()))
            .unwrap_or_default();

        if description_text.is_empty() {
            warn!("No description found for {} page", platform);
        }

        let benefits = self.extract_section(&document, &["benefits", "perks", "what we offer"]);
        let company_info =
            self.extract_section(&document, &["about us", "about the company", "company"]);

        JobContent {
            job_title,
            company_name,
            location,
            description_text,
            description_html,
            benefits,
            company_info,
        }
    }

    /// First selector yielding non-empty, non-placeholder text wins
    fn select_first_text(&self, document: &Html, selectors: &[&str]) -> Option<String> {
        for selector_str in selectors {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(element) = document.select(&selector).next() {
                    let text = element_text(&element);
                    if !text.is_empty() && !self.is_placeholder(&text) {
                        return Some(text);
                    }
                }
            }
        }
        None
    }

    /// Like `select_first_text` but keeps placeholder-bearing text; the
    /// location path strips embedded tokens instead of discarding the hit
    fn select_first_text_raw(&self, document: &Html, selectors: &[&str]) -> Option<String> {
        for selector_str in selectors {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(element) = document.select(&selector).next() {
                    let text = element_text(&element);
                    if !text.is_empty() {
                        return Some(text);
                    }
                }
            }
        }
        None
    }

    fn find_first_element<'a>(
        &self,
        document: &'a Html,
        selectors: &[&str],
    ) -> Option<ElementRef<'a>> {
        for selector_str in selectors {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(element) = document.select(&selector).next() {
                    return Some(element);
                }
            }
        }
        None
    }

    pub fn is_placeholder(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return true;
        }
        self.placeholder_patterns.iter().any(|p| p.is_match(text))
    }

    /// Fallback chain: selectors, meta tags, JSON-LD, URL domain, page title
    fn extract_company_name(&self, document: &Html, selectors: &[&str]) -> String {
        if let Some(company) = self.select_first_text(document, selectors) {
            return company;
        }
        debug!("Company selectors failed, trying fallbacks");

        self.company_from_meta_tags(document)
            .or_else(|| self.company_from_structured_data(document))
            .or_else(|| self.company_from_url(document))
            .or_else(|| self.company_from_title(document))
            .unwrap_or_else(|| "Unknown Company".to_string())
    }

    fn company_from_meta_tags(&self, document: &Html) -> Option<String> {
        if let Some(content) = meta_content(document, "meta[property=\"og:site_name\"]") {
            return Some(content);
        }
        if let Some(content) = meta_content(document, "meta[name=\"twitter:site\"]") {
            return Some(content.trim_start_matches('@').to_string());
        }
        meta_content(document, "meta[name=\"application-name\"]")
    }

    /// JSON-LD Organization or JobPosting hiringOrganization name
    fn company_from_structured_data(&self, document: &Html) -> Option<String> {
        let selector = Selector::parse("script[type=\"application/ld+json\"]").ok()?;
        for script in document.select(&selector) {
            let raw: String = script.text().collect();
            let Ok(data) = serde_json::from_str::<serde_json::Value>(&raw) else {
                continue;
            };

            match data.get("@type").and_then(|t| t.as_str()) {
                Some("Organization") => {
                    if let Some(name) = data.get("name").and_then(|n| n.as_str()) {
                        return Some(name.to_string());
                    }
                }
                Some("JobPosting") => {
                    if let Some(name) = data
                        .get("hiringOrganization")
                        .and_then(|o| o.get("name"))
                        .and_then(|n| n.as_str())
                    {
                        return Some(name.to_string());
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Infer a company name from the canonical or og:url domain
    fn company_from_url(&self, document: &Html) -> Option<String> {
        let href = canonical_url(document)?;
        let parsed = Url::parse(&href).ok()?;
        let mut domain = parsed.host_str()?.to_lowercase();

        for prefix in ["www.", "jobs.", "careers.", "apply."] {
            if let Some(stripped) = domain.strip_prefix(prefix) {
                domain = stripped.to_string();
                break;
            }
        }

        let label = domain.split('.').next()?;
        let company = title_case(&label.replace(['-', '_'], " "));
        (company.len() > 2).then_some(company)
    }

    fn company_from_title(&self, document: &Html) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        let title: String = document.select(&selector).next()?.text().collect();

        for pattern in &self.title_company_patterns {
            if let Some(captures) = pattern.captures(&title) {
                if let Some(company) = captures.get(1) {
                    let company = company.as_str().trim();
                    if !self.is_placeholder(company) && company.len() > 2 {
                        return Some(company.to_string());
                    }
                }
            }
        }
        None
    }

    /// Location with placeholder tokens stripped and edges cleaned
    fn extract_location(&self, document: &Html, selectors: &[&str]) -> String {
        let Some(raw) = self.select_first_text_raw(document, selectors) else {
            return String::new();
        };

        let cleaned = self.token_cleaner.replace_all(&raw, "");
        let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        let trimmed = collapsed
            .trim_matches(|c: char| c == '•' || c == '-' || c.is_whitespace())
            .to_string();

        if self.is_placeholder(&trimmed) {
            return String::new();
        }
        trimmed
    }

    /// Text under a heading that names the wanted section, up to the
    /// next heading
    fn extract_section(&self, document: &Html, keywords: &[&str]) -> String {
        let Ok(selector) = Selector::parse("h1, h2, h3, h4") else {
            return String::new();
        };

        for heading in document.select(&selector) {
            let heading_text = element_text(&heading).to_lowercase();
            if !keywords.iter().any(|k| heading_text.contains(k)) {
                continue;
            }

            let mut content = Vec::new();
            for sibling in heading.next_siblings() {
                if let Some(element) = ElementRef::wrap(sibling) {
                    let name = element.value().name();
                    if matches!(name, "h1" | "h2" | "h3" | "h4") {
                        break;
                    }
                    let text = element_text(&element);
                    if !text.is_empty() {
                        content.push(text);
                    }
                }
            }
            if !content.is_empty() {
                return content.join("\n");
            }
        }
        String::new()
    }
}

fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(|e| JobLensError::Extraction(e.to_string())))
        .collect()
}

fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn meta_content(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    let element = document.select(&selector).next()?;
    let content = element.value().attr("content")?.trim();
    (!content.is_empty()).then(|| content.to_string())
}

fn canonical_url(document: &Html) -> Option<String> {
    if let Ok(selector) = Selector::parse("link[rel=\"canonical\"]") {
        if let Some(element) = document.select(&selector).next() {
            if let Some(href) = element.value().attr("href") {
                return Some(href.to_string());
            }
        }
    }
    meta_content(document, "meta[property=\"og:url\"]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ContentExtractor {
        ContentExtractor::new().unwrap()
    }

    #[test]
    fn test_placeholder_detection() {
        let extractor = extractor();
        assert!(extractor.is_placeholder("%HEADER_COMPANY_WEBSITE%"));
        assert!(extractor.is_placeholder("{{company_name}}"));
        assert!(extractor.is_placeholder("[COMPANY]"));
        assert!(extractor.is_placeholder("TBD"));
        assert!(extractor.is_placeholder(""));
        assert!(!extractor.is_placeholder("Acme Corp"));
    }

    #[test]
    fn test_placeholder_company_falls_through_to_meta() {
        let html = r#"<html><head>
            <meta property="og:site_name" content="Acme Corp">
            </head><body>
            <div class="company">%HEADER_COMPANY_WEBSITE%</div>
            <h1>Engineer</h1>
            </body></html>"#;
        let content = extractor().extract(html, AtsPlatform::Generic);
        assert_eq!(content.company_name, "Acme Corp");
    }

    #[test]
    fn test_company_from_structured_data() {
        let html = r#"<html><head>
            <script type="application/ld+json">
            {"@type": "JobPosting", "hiringOrganization": {"name": "Initech"}}
            </script>
            </head><body><h1>Engineer</h1></body></html>"#;
        let content = extractor().extract(html, AtsPlatform::Generic);
        assert_eq!(content.company_name, "Initech");
    }

    #[test]
    fn test_company_from_url_domain() {
        let html = r#"<html><head>
            <link rel="canonical" href="https://careers.blue-widgets.com/jobs/1">
            </head><body><h1>Engineer</h1></body></html>"#;
        let content = extractor().extract(html, AtsPlatform::Generic);
        assert_eq!(content.company_name, "Blue Widgets");
    }

    #[test]
    fn test_company_from_page_title() {
        let html = r#"<html><head>
            <title>Jobs at Hooli - Senior Engineer</title>
            </head><body><h1>Engineer</h1></body></html>"#;
        let content = extractor().extract(html, AtsPlatform::Generic);
        assert_eq!(content.company_name, "Hooli");
    }

    #[test]
    fn test_unknown_company_fallback() {
        let html = "<html><body><h1>Engineer</h1></body></html>";
        let content = extractor().extract(html, AtsPlatform::Generic);
        assert_eq!(content.company_name, "Unknown Company");
    }

    #[test]
    fn test_location_cleanup() {
        let html = r#"<html><body>
            <h1>Engineer</h1>
            <div class="company">Acme</div>
            <div class="location">• %LABEL_POSITION_TYPE_REMOTE_ANY%  New   York -</div>
            </body></html>"#;
        let content = extractor().extract(html, AtsPlatform::Generic);
        assert_eq!(content.location, "New York");
    }

    #[test]
    fn test_missing_description_degrades_to_empty() {
        let html = "<html><body><h1>Engineer</h1></body></html>";
        let content = extractor().extract(html, AtsPlatform::Generic);
        assert!(content.description_text.is_empty());
        assert!(content.description_html.is_empty());
    }

    #[test]
    fn test_section_extraction() {
        let html = r#"<html><body>
            <h1>Engineer</h1>
            <h2>Benefits</h2>
            <p>Health insurance</p>
            <p>401k matching</p>
            <h2>About Us</h2>
            <p>We build widgets</p>
            </body></html>"#;
        let content = extractor().extract(html, AtsPlatform::Generic);
        assert!(content.benefits.contains("Health insurance"));
        assert!(content.benefits.contains("401k matching"));
        assert!(!content.benefits.contains("We build widgets"));
        assert!(content.company_info.contains("We build widgets"));
    }
}
