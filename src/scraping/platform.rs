//! ATS platform detection and per-platform selector profiles

use serde::{Deserialize, Serialize};

/// Applicant-tracking-system family a posting page was served by.
/// Detection always resolves; unknown pages fall back to `Generic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtsPlatform {
    Greenhouse,
    Lever,
    Workday,
    Generic,
}

/// Ordered CSS selector lists tried first-match-wins per field
#[derive(Debug, Clone, Copy)]
pub struct SelectorProfile {
    pub title: &'static [&'static str],
    pub company: &'static [&'static str],
    pub location: &'static [&'static str],
    pub description: &'static [&'static str],
}

impl AtsPlatform {
    /// Classify by URL domain fragments, then markup fingerprints
    pub fn detect(url: &str, html: &str) -> Self {
        let url_lower = url.to_lowercase();
        let html_lower = html.to_lowercase();

        if url_lower.contains("greenhouse.io") || html_lower.contains("greenhouse") {
            AtsPlatform::Greenhouse
        } else if url_lower.contains("jobs.lever.co") || html_lower.contains("lever") {
            AtsPlatform::Lever
        } else if url_lower.contains("myworkdayjobs.com") || html_lower.contains("workday") {
            AtsPlatform::Workday
        } else {
            AtsPlatform::Generic
        }
    }

    pub fn selector_profile(&self) -> SelectorProfile {
        match self {
            AtsPlatform::Greenhouse => SelectorProfile {
                title: &[".job-post-title", ".posting-headline h2", "h1"],
                company: &[".company-name", ".posting-company h2"],
                location: &[".location", ".posting-categories .location"],
                description: &[".job-post-description", ".posting-description"],
            },
            AtsPlatform::Lever => SelectorProfile {
                title: &[".posting-headline h2", "h1"],
                company: &[".posting-company h2", ".company-name"],
                location: &[".posting-categories .location", ".location"],
                description: &[".posting-description", ".content"],
            },
            AtsPlatform::Workday => SelectorProfile {
                title: &["h1[data-automation-id=\"jobPostingHeader\"]", "h1"],
                company: &[".company-name", "h2"],
                location: &[".jobdescription .location", ".location"],
                description: &[".jobdescription .content", ".job-description"],
            },
            AtsPlatform::Generic => SelectorProfile {
                title: &["h1", "h2", ".job-title", ".title"],
                company: &[".company", ".company-name", "h2"],
                location: &[".location", ".job-location"],
                description: &[".description", ".content", ".job-description"],
            },
        }
    }
}

impl std::fmt::Display for AtsPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AtsPlatform::Greenhouse => "greenhouse",
            AtsPlatform::Lever => "lever",
            AtsPlatform::Workday => "workday",
            AtsPlatform::Generic => "generic",
        };
        write!(f, "{}", name)
    }
}
