//! In-memory stores for job postings and the user's skill inventory.
//!
//! The surrounding application owns durable persistence; these stores
//! enforce the identity rules the pipeline relies on: one posting per
//! URL, one skill per normalized title.

use crate::parsing::skill_db::{normalize, SkillType};
use crate::scraping::pipeline::JobScrape;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSkill {
    pub title: String,
    pub category: String,
    pub skill_type: SkillType,
    #[serde(default)]
    pub years_experience: Option<u32>,
    /// Alternate names this skill also matches under
    #[serde(default)]
    pub alternates: Vec<String>,
    #[serde(default)]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl UserSkill {
    pub fn new(title: &str, category: &str, skill_type: SkillType) -> Self {
        Self {
            title: title.to_string(),
            category: category.to_string(),
            skill_type,
            years_experience: None,
            alternates: Vec::new(),
            details: BTreeMap::new(),
        }
    }

    pub fn normalized_title(&self) -> String {
        normalize(&self.title)
    }

    /// All keys this skill answers to in the matcher
    pub fn matcher_keys(&self) -> Vec<String> {
        let mut keys = vec![self.normalized_title()];
        keys.extend(self.alternates.iter().map(|a| normalize(a)));
        keys
    }
}

/// One skill per normalized title. Adding a duplicate merges into the
/// existing row instead of creating a second one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillInventory {
    skills: BTreeMap<String, UserSkill>,
}

impl SkillInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_skills(skills: Vec<UserSkill>) -> Self {
        let mut inventory = Self::new();
        for skill in skills {
            inventory.add(skill);
        }
        inventory
    }

    /// Insert or merge. Merging keeps the longer experience figure and
    /// unions alternates and details.
    pub fn add(&mut self, skill: UserSkill) -> &UserSkill {
        let key = skill.normalized_title();
        match self.skills.entry(key) {
            std::collections::btree_map::Entry::Vacant(entry) => entry.insert(skill),
            std::collections::btree_map::Entry::Occupied(entry) => {
                let existing = entry.into_mut();
                existing.years_experience =
                    existing.years_experience.max(skill.years_experience);
                for alternate in skill.alternates {
                    if !existing
                        .alternates
                        .iter()
                        .any(|a| normalize(a) == normalize(&alternate))
                    {
                        existing.alternates.push(alternate);
                    }
                }
                existing.details.extend(skill.details);
                existing
            }
        }
    }

    pub fn get(&self, title: &str) -> Option<&UserSkill> {
        self.skills.get(&normalize(title))
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserSkill> {
        self.skills.values()
    }

    /// Normalized titles only, for portfolio set intersection
    pub fn normalized_titles(&self) -> HashSet<String> {
        self.skills.keys().cloned().collect()
    }

    /// Matcher view: every title and alternate mapped to its skill
    pub fn matcher_map(&self) -> HashMap<String, &UserSkill> {
        let mut map = HashMap::new();
        for skill in self.skills.values() {
            for key in skill.matcher_keys() {
                map.insert(key, skill);
            }
        }
        map
    }
}

/// A saved job posting, one per distinct URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub url: String,
    pub company_name: String,
    pub job_title: String,
    pub location: String,
    pub remote_allowed: bool,
    pub scraping_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scraping_error: Option<String>,
    pub scrape: JobScrape,
}

impl JobPosting {
    pub fn from_scrape(scrape: JobScrape) -> Self {
        Self {
            url: scrape.scraped_content.original_url.clone(),
            company_name: scrape.company_name.clone(),
            job_title: scrape.job_title.clone(),
            location: scrape.location.clone(),
            remote_allowed: scrape.remote_allowed,
            scraping_success: scrape.scraping_metadata.success,
            scraping_error: scrape.scraping_metadata.error.clone(),
            scrape,
        }
    }

    /// Every demanded skill (required + preferred), already normalized
    pub fn demanded_skills(&self) -> Vec<String> {
        self.scrape
            .parsed_requirements
            .all_skills()
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStore {
    jobs: BTreeMap<String, JobPosting>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent by URL: a re-scrape of a known URL resolves to the
    /// existing posting rather than creating a second one.
    pub fn add_or_get(&mut self, scrape: JobScrape) -> &JobPosting {
        let url = scrape.scraped_content.original_url.clone();
        self.jobs
            .entry(url)
            .or_insert_with(|| JobPosting::from_scrape(scrape))
    }

    /// Explicit refresh path that replaces the stored record
    pub fn update(&mut self, scrape: JobScrape) -> &JobPosting {
        let url = scrape.scraped_content.original_url.clone();
        self.jobs.insert(url.clone(), JobPosting::from_scrape(scrape));
        &self.jobs[&url]
    }

    pub fn get(&self, url: &str) -> Option<&JobPosting> {
        self.jobs.get(url)
    }

    pub fn all(&self) -> Vec<&JobPosting> {
        self.jobs.values().collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrape_for(url: &str) -> JobScrape {
        let mut scrape = JobScrape::failure(url, "placeholder");
        scrape.scraping_metadata.success = true;
        scrape.scraping_metadata.error = None;
        scrape.company_name = "Acme".to_string();
        scrape
    }

    #[test]
    fn test_rescrape_is_idempotent() {
        let mut store = JobStore::new();
        let url = "https://jobs.lever.co/acme/1";

        store.add_or_get(scrape_for(url));
        let mut second = scrape_for(url);
        second.company_name = "Different".to_string();
        store.add_or_get(second);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(url).unwrap().company_name, "Acme");
    }

    #[test]
    fn test_duplicate_skill_merges() {
        let mut inventory = SkillInventory::new();
        let mut first = UserSkill::new("Python", "Programming", SkillType::Technical);
        first.years_experience = Some(3);

        let mut second = UserSkill::new(" PYTHON ", "Programming", SkillType::Technical);
        second.years_experience = Some(5);
        second.alternates.push("Python 3".to_string());

        inventory.add(first);
        inventory.add(second);

        assert_eq!(inventory.len(), 1);
        let merged = inventory.get("python").unwrap();
        assert_eq!(merged.years_experience, Some(5));
        assert_eq!(merged.alternates, vec!["Python 3".to_string()]);
    }

    #[test]
    fn test_matcher_map_includes_alternates() {
        let mut skill = UserSkill::new("JavaScript", "Programming", SkillType::Technical);
        skill.alternates.push("JS".to_string());
        let inventory = SkillInventory::from_skills(vec![skill]);

        let map = inventory.matcher_map();
        assert!(map.contains_key("javascript"));
        assert!(map.contains_key("js"));
    }

    #[test]
    fn test_normalization_unifies_case_variants() {
        let inventory = SkillInventory::from_skills(vec![
            UserSkill::new("Python", "Programming", SkillType::Technical),
            UserSkill::new("python ", "Programming", SkillType::Technical),
            UserSkill::new(" PYTHON", "Programming", SkillType::Technical),
        ]);
        assert_eq!(inventory.len(), 1);
    }
}
