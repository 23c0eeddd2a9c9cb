//! Categorized skill database loaded from a TOML data asset

use crate::error::{JobLensError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Default database compiled into the binary; a user copy can override it.
const EMBEDDED_SKILLS: &str = include_str!("../../assets/skills.toml");

/// Categories whose members count as technical skills for scoring
const TECHNICAL_CATEGORIES: &[&str] = &[
    "programming_languages",
    "frameworks_libraries",
    "cloud_platforms",
    "databases",
    "devops_tools",
    "data_tools",
    "platform_tools",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillType {
    Technical,
    Soft,
    Transferable,
}

#[derive(Debug, Clone, Deserialize)]
struct SkillDatabaseFile {
    categories: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct SkillDatabase {
    categories: BTreeMap<String, Vec<String>>,
    technical: HashSet<String>,
    soft: HashSet<String>,
}

/// Case-fold and trim a skill name into its canonical matcher key
pub fn normalize(skill: &str) -> String {
    skill.trim().to_lowercase()
}

impl SkillDatabase {
    /// Load the compiled-in default database
    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED_SKILLS)
    }

    /// Load a user-supplied database file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        let file: SkillDatabaseFile = toml::from_str(content)
            .map_err(|e| JobLensError::SkillDatabase(format!("Failed to parse skill database: {}", e)))?;

        let mut technical = HashSet::new();
        let mut soft = HashSet::new();
        for (category, skills) in &file.categories {
            if TECHNICAL_CATEGORIES.contains(&category.as_str()) {
                technical.extend(skills.iter().map(|s| normalize(s)));
            } else if category == "soft_skills" {
                soft.extend(skills.iter().map(|s| normalize(s)));
            }
        }

        Ok(Self {
            categories: file.categories,
            technical,
            soft,
        })
    }

    /// Every skill in the database, in category order
    pub fn all_skills(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut skills = Vec::new();
        for list in self.categories.values() {
            for skill in list {
                if seen.insert(normalize(skill)) {
                    skills.push(skill.as_str());
                }
            }
        }
        skills
    }

    pub fn category_skills(&self, category: &str) -> &[String] {
        self.categories
            .get(category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Skills from the technology-flavored categories (used by the bullet pass)
    pub fn technology_skills(&self) -> Vec<&str> {
        let mut skills = Vec::new();
        for category in TECHNICAL_CATEGORIES {
            if *category == "platform_tools" {
                continue;
            }
            skills.extend(self.category_skills(category).iter().map(|s| s.as_str()));
        }
        skills
    }

    pub fn platform_skills(&self) -> &[String] {
        self.category_skills("platform_tools")
    }

    pub fn methodology_skills(&self) -> &[String] {
        self.category_skills("methodologies")
    }

    pub fn is_technical(&self, skill: &str) -> bool {
        self.technical.contains(&normalize(skill))
    }

    /// Classify a skill for gap scoring; falls back to keyword heuristics
    /// when the skill is not in the database.
    pub fn skill_type(&self, skill: &str) -> SkillType {
        let normalized = normalize(skill);

        if self.technical.contains(&normalized) {
            return SkillType::Technical;
        }
        if self.soft.contains(&normalized) {
            return SkillType::Soft;
        }

        let technical_hints = ["python", "javascript", "sql", "aws", "docker", "api", "framework"];
        if technical_hints.iter().any(|k| normalized.contains(k)) {
            return SkillType::Technical;
        }

        let soft_hints = ["communication", "leadership", "teamwork", "problem solving"];
        if soft_hints.iter().any(|k| normalized.contains(k)) {
            return SkillType::Soft;
        }

        SkillType::Transferable
    }

    /// Suggest which inventory category a missing skill belongs to
    pub fn suggest_category(&self, skill: &str) -> &'static str {
        let normalized = normalize(skill);

        let technical_hints = [
            "python", "javascript", "sql", "aws", "docker", "api", "framework", "database",
        ];
        if technical_hints.iter().any(|k| normalized.contains(k)) || self.technical.contains(&normalized) {
            return "Programming";
        }

        let leadership_hints = ["leadership", "management", "team", "mentor", "lead"];
        if leadership_hints.iter().any(|k| normalized.contains(k)) {
            return "Leadership";
        }

        let communication_hints = ["communication", "presentation", "writing", "documentation"];
        if communication_hints.iter().any(|k| normalized.contains(k)) {
            return "Communication";
        }

        "Other"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_database_loads() {
        let db = SkillDatabase::embedded().unwrap();
        assert!(db.all_skills().len() > 50);
        assert!(!db.category_skills("programming_languages").is_empty());
    }

    #[test]
    fn test_database_file_override() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[categories]\nprogramming_languages = [\"Zig\"]").unwrap();

        let db = SkillDatabase::from_file(file.path()).unwrap();
        assert!(db.is_technical("zig"));
        assert_eq!(db.all_skills(), vec!["Zig"]);
    }

    #[test]
    fn test_normalization() {
        assert_eq!(normalize("Python"), "python");
        assert_eq!(normalize("python "), "python");
        assert_eq!(normalize(" PYTHON"), "python");
    }

    #[test]
    fn test_skill_type_classification() {
        let db = SkillDatabase::embedded().unwrap();
        assert_eq!(db.skill_type("Python"), SkillType::Technical);
        assert_eq!(db.skill_type("Leadership"), SkillType::Soft);
        assert_eq!(db.skill_type("negotiation"), SkillType::Transferable);
    }

    #[test]
    fn test_suggest_category() {
        let db = SkillDatabase::embedded().unwrap();
        assert_eq!(db.suggest_category("python scripting"), "Programming");
        assert_eq!(db.suggest_category("team mentoring"), "Leadership");
        assert_eq!(db.suggest_category("technical writing"), "Communication");
        assert_eq!(db.suggest_category("gardening"), "Other");
    }
}
