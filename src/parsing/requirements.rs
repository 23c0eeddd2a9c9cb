//! Free-text job description parsing: skills, experience, education

use crate::error::{JobLensError, Result};
use crate::parsing::skill_db::{normalize, SkillDatabase};
use aho_corasick::AhoCorasick;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Structured requirements extracted from a job description.
///
/// Skill names are case-folded and trimmed; after classification a skill
/// lives in exactly one of `required_skills`/`preferred_skills`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRequirements {
    pub required_skills: BTreeSet<String>,
    pub preferred_skills: BTreeSet<String>,
    pub experience_years: String,
    pub education: String,
    pub specific_requirements: Vec<String>,
}

impl ExtractedRequirements {
    pub fn is_empty(&self) -> bool {
        self.required_skills.is_empty()
            && self.preferred_skills.is_empty()
            && self.experience_years.is_empty()
            && self.education.is_empty()
            && self.specific_requirements.is_empty()
    }

    pub fn all_skills(&self) -> impl Iterator<Item = &String> {
        self.required_skills.iter().chain(self.preferred_skills.iter())
    }
}

/// Key areas a resume could emphasize for this posting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchingOpportunities {
    pub key_technologies: Vec<String>,
    pub leadership_emphasis: bool,
    pub scale_requirements: bool,
}

impl MatchingOpportunities {
    pub fn derive(requirements: &ExtractedRequirements, db: &SkillDatabase) -> Self {
        let key_technologies: Vec<String> = requirements
            .required_skills
            .iter()
            .filter(|s| db.is_technical(s))
            .take(5)
            .cloned()
            .collect();

        let joined = requirements.specific_requirements.join(" ").to_lowercase();

        let leadership_keywords = ["lead", "manage", "mentor", "team", "direct", "supervise"];
        let leadership_emphasis = leadership_keywords.iter().any(|k| joined.contains(k));

        let scale_keywords = [
            "scale", "performance", "million", "billion", "high traffic", "optimization",
        ];
        let scale_requirements = scale_keywords.iter().any(|k| joined.contains(k));

        Self {
            key_technologies,
            leadership_emphasis,
            scale_requirements,
        }
    }
}

const REQUIRED_INDICATORS: [&str; 4] = ["required", "must", "essential", "mandatory"];
const PREFERRED_INDICATORS: [&str; 4] = ["preferred", "nice", "bonus", "plus"];

/// Generic nouns that the extraction passes keep catching
const STOPWORDS: [&str; 23] = [
    "experience", "knowledge", "skills", "skill", "ability", "capability",
    "strong", "solid", "deep", "extensive", "proven", "excellent",
    "years", "year", "minimum", "preferred", "required", "must",
    "and", "or", "with", "the", "etc",
];

/// Four-pass skill and requirement extractor.
///
/// Each pass is an independent heuristic tuned for a different phrasing
/// style; their results are unioned once before classification.
pub struct RequirementParser {
    db: SkillDatabase,
    keyword_matcher: AhoCorasick,
    keyword_patterns: Vec<String>,
    parenthetical_patterns: Vec<Regex>,
    context_patterns: Vec<Regex>,
    years_patterns: Vec<Regex>,
    education_patterns: Vec<Regex>,
    prefix_cleaner: Regex,
    suffix_cleaner: Regex,
    max_specific_requirements: usize,
}

impl RequirementParser {
    pub fn new(db: SkillDatabase, max_specific_requirements: usize) -> Result<Self> {
        let keyword_patterns: Vec<String> =
            db.all_skills().iter().map(|s| s.to_string()).collect();
        let keyword_matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(aho_corasick::MatchKind::LeftmostLongest)
            .build(&keyword_patterns)
            .map_err(|e| {
                JobLensError::Processing(format!("Failed to build keyword matcher: {}", e))
            })?;

        let parenthetical_patterns = compile_all(&[
            r"(?i)\(e\.g\.?,\s*([^)]+)\)",
            r"(?i)\(such as\s+([^)]+)\)",
            r"(?i)\(including\s+([^)]+)\)",
            r"(?i)\(like\s+([^)]+)\)",
            r"(?i)\(i\.e\.?,\s*([^)]+)\)",
        ])?;

        let context_patterns = compile_all(&[
            r"(?i)experience (?:with|in|using|developing)\s+([^.\n]+)",
            r"(?i)expertise (?:with|in|using)\s+([^.\n]+)",
            r"(?i)proficiency (?:with|in|using)\s+([^.\n]+)",
            r"(?i)knowledge of\s+([^.\n]+)",
            r"(?i)skilled in\s+([^.\n]+)",
            r"(?i)background in\s+([^.\n]+)",
        ])?;

        let years_patterns = compile_all(&[
            r"(?i)(\d+)\+?\s*(?:to\s*\d+\s*)?years?\s*(?:of\s*)?experience",
            r"(?i)(\d+)\+?\s*(?:to\s*\d+\s*)?yrs?\s*(?:of\s*)?experience",
            r"(?i)minimum\s*(?:of\s*)?(\d+)\s*years?",
            r"(?i)at\s*least\s*(\d+)\s*years?",
        ])?;

        // Ordered by degree level; first hit wins
        let education_patterns = compile_all(&[
            r"(?i)bachelor['’]?s?\s*degree",
            r"(?i)master['’]?s?\s*degree",
            r"(?i)phd|doctorate",
            r"(?i)associate['’]?s?\s*degree",
            r"(?i)high\s*school|diploma",
        ])?;

        let prefix_cleaner = Regex::new(r"(?i)^(?:strong|solid|deep|extensive|proven|excellent)\s+")
            .map_err(|e| JobLensError::Processing(e.to_string()))?;
        let suffix_cleaner =
            Regex::new(r"(?i)\s+(?:experience|knowledge|skills?|expertise|proficiency)$")
                .map_err(|e| JobLensError::Processing(e.to_string()))?;

        Ok(Self {
            db,
            keyword_matcher,
            keyword_patterns,
            parenthetical_patterns,
            context_patterns,
            years_patterns,
            education_patterns,
            prefix_cleaner,
            suffix_cleaner,
            max_specific_requirements,
        })
    }

    pub fn database(&self) -> &SkillDatabase {
        &self.db
    }

    /// Parse a job description into structured requirements.
    /// Empty or unparseable input degrades to an empty record.
    pub fn parse(&self, text: &str) -> ExtractedRequirements {
        if text.trim().is_empty() {
            return ExtractedRequirements::default();
        }

        let mut found: HashSet<String> = HashSet::new();
        found.extend(self.extract_parenthetical_skills(text));
        found.extend(self.extract_skills_from_bullets(text));
        found.extend(self.extract_keyword_skills(text));
        found.extend(self.extract_context_skills(text));

        let lower_text = text.to_lowercase();
        let mut required_skills = BTreeSet::new();
        let mut preferred_skills = BTreeSet::new();
        for skill in found {
            if self.is_skill_required(&lower_text, &skill) {
                required_skills.insert(skill);
            } else {
                preferred_skills.insert(skill);
            }
        }

        ExtractedRequirements {
            required_skills,
            preferred_skills,
            experience_years: self.extract_experience_years(text),
            education: self.extract_education(text),
            specific_requirements: self.extract_specific_requirements(text),
        }
    }

    /// Pass 1: skills listed inside parentheses like "(e.g., Python, AWS)"
    fn extract_parenthetical_skills(&self, text: &str) -> HashSet<String> {
        let mut skills = HashSet::new();
        for pattern in &self.parenthetical_patterns {
            for captures in pattern.captures_iter(text) {
                if let Some(group) = captures.get(1) {
                    for candidate in group.as_str().split(',') {
                        let cleaned = self.clean_skill_text(candidate);
                        if self.is_valid_skill(&cleaned) {
                            skills.insert(cleaned);
                        }
                    }
                }
            }
        }
        skills
    }

    /// Pass 2: bullet and numbered list items checked against the
    /// technology, platform, and methodology tables
    fn extract_skills_from_bullets(&self, text: &str) -> HashSet<String> {
        let mut skills = HashSet::new();

        for item in bullet_items(text) {
            if item.len() < 10 {
                continue;
            }
            let item_lower = item.to_lowercase();

            for keyword in self.db.technology_skills() {
                if contains_word(&item_lower, &normalize(keyword)) {
                    skills.insert(normalize(keyword));
                }
            }
            for keyword in self.db.platform_skills() {
                if contains_word(&item_lower, &normalize(keyword)) {
                    skills.insert(normalize(keyword));
                }
            }
            for keyword in self.db.methodology_skills() {
                if contains_word(&item_lower, &normalize(keyword)) {
                    skills.insert(normalize(keyword));
                }
            }
        }

        skills
    }

    /// Pass 3: word-boundary scan of the whole text against the database
    fn extract_keyword_skills(&self, text: &str) -> HashSet<String> {
        let mut skills = HashSet::new();
        for mat in self.keyword_matcher.find_iter(text) {
            if is_word_boundary(text, mat.start(), mat.end()) {
                skills.insert(normalize(&self.keyword_patterns[mat.pattern()]));
            }
        }
        skills
    }

    /// Pass 4: tails of "experience with X", "knowledge of X" phrases
    fn extract_context_skills(&self, text: &str) -> HashSet<String> {
        let mut skills = HashSet::new();
        for pattern in &self.context_patterns {
            for captures in pattern.captures_iter(text) {
                if let Some(group) = captures.get(1) {
                    for candidate in split_skill_list(group.as_str()) {
                        let cleaned = self.clean_skill_text(&candidate);
                        if self.is_valid_skill(&cleaned) {
                            skills.insert(cleaned);
                        }
                    }
                }
            }
        }
        skills
    }

    fn clean_skill_text(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        let without_prefix = self.prefix_cleaner.replace(trimmed, "");
        let without_suffix = self.suffix_cleaner.replace(&without_prefix, "");
        let edges_trimmed = without_suffix
            .trim_matches(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'));
        normalize(edges_trimmed)
    }

    fn is_valid_skill(&self, skill: &str) -> bool {
        let char_count = skill.chars().count();
        if char_count < 2 || char_count > 50 {
            return false;
        }
        if STOPWORDS.contains(&skill) {
            return false;
        }
        // Guard against punctuation fragments
        let word_chars = skill
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
            .count();
        word_chars * 10 >= char_count * 7
    }

    /// Classify from a ±100-char window around each whole-word
    /// occurrence. The window never crosses a line boundary, so an
    /// indicator on a neighboring line cannot leak in. The conservative
    /// default for an ambiguous context is required.
    fn is_skill_required(&self, lower_text: &str, skill: &str) -> bool {
        for (start, _) in lower_text.match_indices(skill) {
            let end = start + skill.len();
            if !is_word_boundary(lower_text, start, end) {
                continue;
            }

            let line_start = lower_text[..start].rfind('\n').map_or(0, |i| i + 1);
            let line_end = lower_text[end..]
                .find('\n')
                .map_or(lower_text.len(), |i| end + i);
            let window_start =
                floor_char_boundary(lower_text, start.saturating_sub(100)).max(line_start);
            let window_end = ceil_char_boundary(lower_text, (end + 100).min(line_end));
            let window = &lower_text[window_start..window_end];

            if REQUIRED_INDICATORS.iter().any(|w| window.contains(w)) {
                return true;
            }
            if PREFERRED_INDICATORS.iter().any(|w| window.contains(w)) {
                return false;
            }
        }
        true
    }

    fn extract_experience_years(&self, text: &str) -> String {
        for pattern in &self.years_patterns {
            if let Some(captures) = pattern.captures(text) {
                if let Some(years) = captures.get(1) {
                    return format!("{}+ years", years.as_str());
                }
            }
        }
        String::new()
    }

    fn extract_education(&self, text: &str) -> String {
        for pattern in &self.education_patterns {
            if let Some(mat) = pattern.find(text) {
                return mat.as_str().to_string();
            }
        }
        String::new()
    }

    /// Bullet lines between 10 and 200 chars, source order, capped
    fn extract_specific_requirements(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut requirements = Vec::new();

        for line in text.lines() {
            if let Some(content) = bullet_content(line) {
                let content = content.trim();
                if content.len() > 10 && content.len() < 200 && seen.insert(content.to_string()) {
                    requirements.push(content.to_string());
                    if requirements.len() == self.max_specific_requirements {
                        break;
                    }
                }
            }
        }

        requirements
    }
}

fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(|e| JobLensError::Processing(e.to_string())))
        .collect()
}

/// Strip the bullet or numbering marker from a line, if it has one
fn bullet_content(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed
        .strip_prefix('•')
        .or_else(|| trimmed.strip_prefix('-'))
        .or_else(|| trimmed.strip_prefix('*'))
    {
        return Some(rest);
    }

    // Numbered items like "1." or "2)"
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    if !digits.is_empty() {
        let rest = &trimmed[digits.len()..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return Some(stripped);
        }
    }

    None
}

/// Collect bullet items, folding continuation lines into the open item
fn bullet_items(text: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if let Some(content) = bullet_content(line) {
            if let Some(item) = current.take() {
                items.push(item);
            }
            current = Some(content.trim().to_string());
        } else if line.trim().is_empty() {
            if let Some(item) = current.take() {
                items.push(item);
            }
        } else if let Some(item) = current.as_mut() {
            item.push(' ');
            item.push_str(line.trim());
        }
    }
    if let Some(item) = current.take() {
        items.push(item);
    }

    items
}

/// Split a phrase tail into individual skill candidates
fn split_skill_list(text: &str) -> Vec<String> {
    let mut parts = vec![text.to_string()];
    for delimiter in [",", ";", "&", "/", " and ", " or "] {
        parts = parts
            .into_iter()
            .flat_map(|part| {
                part.split(delimiter)
                    .map(|s| s.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .collect();
    }
    parts
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !matches!(before, Some(c) if c.is_alphanumeric())
        && !matches!(after, Some(c) if c.is_alphanumeric())
}

/// Word-boundary containment check for multi-word keywords
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut offset = 0;
    while let Some(pos) = haystack[offset..].find(needle) {
        let start = offset + pos;
        let end = start + needle.len();
        if is_word_boundary(haystack, start, end) {
            return true;
        }
        offset = ceil_char_boundary(haystack, start + 1);
    }
    false
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(s: &str, mut index: usize) -> usize {
    while index < s.len() && !s.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::skill_db::SkillDatabase;

    fn parser() -> RequirementParser {
        RequirementParser::new(SkillDatabase::embedded().unwrap(), 10).unwrap()
    }

    #[test]
    fn test_empty_description_is_safe() {
        let requirements = parser().parse("");
        assert!(requirements.is_empty());

        let requirements = parser().parse("   \n\n  ");
        assert!(requirements.is_empty());
    }

    #[test]
    fn test_parenthetical_extraction_end_to_end() {
        let text = "Looking for a Senior Engineer (e.g., Python, AWS, Docker) \
                    with 5+ years experience. Bachelor's degree required.";
        let requirements = parser().parse(text);

        assert!(requirements.required_skills.contains("python"));
        assert!(requirements.required_skills.contains("aws"));
        assert!(requirements.required_skills.contains("docker"));
        assert_eq!(requirements.experience_years, "5+ years");
        assert_eq!(requirements.education.to_lowercase(), "bachelor's degree");
    }

    #[test]
    fn test_required_preferred_disjoint() {
        let text = "Python is required for this role.\n\
                    Kubernetes knowledge is nice to have as a bonus.";
        let requirements = parser().parse(text);

        assert!(requirements.required_skills.contains("python"));
        assert!(requirements.preferred_skills.contains("kubernetes"));
        for skill in &requirements.required_skills {
            assert!(!requirements.preferred_skills.contains(skill));
        }
    }

    #[test]
    fn test_classification_window_stays_on_its_line() {
        // "required" on the previous line must not leak into the
        // window around a skill mentioned as a bonus
        let text = "Python is required for this role. Docker is essential.\n\
                    Kubernetes would be a nice addition to your toolkit.";
        let requirements = parser().parse(text);

        assert!(requirements.required_skills.contains("python"));
        assert!(requirements.required_skills.contains("docker"));
        assert!(requirements.preferred_skills.contains("kubernetes"));
    }

    #[test]
    fn test_classification_ignores_substring_occurrences() {
        // "go" inside "good" must not anchor a window near "required"
        let text = "We value good teamwork; Python is required.\n\
                    Go would be a nice bonus.";
        let requirements = parser().parse(text);

        assert!(requirements.required_skills.contains("python"));
        assert!(requirements.preferred_skills.contains("go"));
    }

    #[test]
    fn test_ambiguous_context_defaults_to_required() {
        let text = "We work with Terraform across all environments.";
        let requirements = parser().parse(text);
        assert!(requirements.required_skills.contains("terraform"));
        assert!(requirements.preferred_skills.is_empty());
    }

    #[test]
    fn test_keyword_scan_respects_word_boundaries() {
        // "go" inside "good" and "r" inside words must not match
        let text = "We expect good communication across the board.";
        let requirements = parser().parse(text);
        assert!(!requirements.all_skills().any(|s| s == "go"));
        assert!(!requirements.all_skills().any(|s| s == "r"));
        assert!(requirements.required_skills.contains("communication"));
    }

    #[test]
    fn test_bullet_skill_extraction() {
        let text = "Responsibilities:\n\
                    • Build data pipelines with Apache Spark and Airflow\n\
                    • Deploy services to Kubernetes clusters\n\
                    - Practice Agile ceremonies with the team\n";
        let requirements = parser().parse(text);

        assert!(requirements.all_skills().any(|s| s == "apache spark"));
        assert!(requirements.all_skills().any(|s| s == "airflow"));
        assert!(requirements.all_skills().any(|s| s == "kubernetes"));
        assert!(requirements.all_skills().any(|s| s == "agile"));
    }

    #[test]
    fn test_context_extraction_splits_lists() {
        let text = "Experience with Snowflake, Databricks and Looker required";
        let requirements = parser().parse(text);

        assert!(requirements.required_skills.contains("snowflake"));
        assert!(requirements.required_skills.contains("databricks"));
        assert!(requirements.required_skills.contains("looker"));
    }

    #[test]
    fn test_stopwords_rejected() {
        let parser = parser();
        assert!(!parser.is_valid_skill("experience"));
        assert!(!parser.is_valid_skill("years"));
        assert!(!parser.is_valid_skill("x"));
        assert!(!parser.is_valid_skill("..--//"));
        assert!(parser.is_valid_skill("python"));
    }

    #[test]
    fn test_specific_requirements_bounded() {
        let mut text = String::new();
        for i in 0..20 {
            text.push_str(&format!("- Requirement number {} with enough length\n", i));
        }
        let requirements = parser().parse(&text);
        assert_eq!(requirements.specific_requirements.len(), 10);
        assert!(requirements.specific_requirements[0].contains("number 0"));
    }

    #[test]
    fn test_experience_years_variants() {
        let parser = parser();
        assert_eq!(
            parser.extract_experience_years("minimum of 3 years in the field"),
            "3+ years"
        );
        assert_eq!(
            parser.extract_experience_years("at least 7 years leading teams"),
            "7+ years"
        );
        assert_eq!(parser.extract_experience_years("no numbers here"), "");
    }

    #[test]
    fn test_education_first_match_wins() {
        let parser = parser();
        let text = "Master's degree preferred, Bachelor's degree required";
        // bachelor patterns are tried first regardless of position
        assert_eq!(
            parser.extract_education(text).to_lowercase(),
            "bachelor's degree"
        );
    }

    #[test]
    fn test_matching_opportunities() {
        let db = SkillDatabase::embedded().unwrap();
        let text = "Requirements:\n\
                    - Lead and mentor a team of engineers\n\
                    - Optimize systems for scale and performance\n\
                    Experience with Python and AWS required.";
        let requirements = parser().parse(text);
        let opportunities = MatchingOpportunities::derive(&requirements, &db);

        assert!(opportunities.key_technologies.contains(&"python".to_string()));
        assert!(opportunities.key_technologies.contains(&"aws".to_string()));
        assert!(opportunities.leadership_emphasis);
        assert!(opportunities.scale_requirements);
    }
}
