//! Per-job skill matching and gap scoring

use crate::config::MatchingConfig;
use crate::parsing::skill_db::{normalize, SkillDatabase};
use crate::scraping::pipeline::JobScrape;
use crate::storage::{SkillInventory, UserSkill};
use crate::util::{round1, title_case};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use strsim::normalized_levenshtein;

/// A job's demanded skills, grouped the way the matcher weighs them.
/// All entries are normalized (lower-cased, trimmed).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSkills {
    pub required: Vec<String>,
    pub preferred: Vec<String>,
    pub technologies: Vec<String>,
    /// Extra resume keywords from deeper analysis, when available
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl JobSkills {
    pub fn from_scrape(scrape: &JobScrape) -> Self {
        Self {
            required: scrape
                .parsed_requirements
                .required_skills
                .iter()
                .cloned()
                .collect(),
            preferred: scrape
                .parsed_requirements
                .preferred_skills
                .iter()
                .cloned()
                .collect(),
            technologies: scrape.matching_opportunities.key_technologies.clone(),
            keywords: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.required.len() + self.preferred.len() + self.technologies.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapCategory {
    Technology,
    Required,
    Keyword,
    Preferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPriority {
    Critical,
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedSkill {
    pub job_skill: String,
    pub user_skill: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialMatch {
    pub job_skill: String,
    pub user_skill: String,
    /// Similarity as a percentage, one decimal
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill_name: String,
    pub priority: GapPriority,
    pub category: GapCategory,
    pub suggested_category: String,
    pub priority_score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryAnalysis {
    pub total_count: usize,
    pub matched_count: usize,
    pub matched_skills: Vec<MatchedSkill>,
    pub missing_skills: Vec<SkillGap>,
    pub partial_matches: Vec<PartialMatch>,
    pub match_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Urgent,
    Moderate,
    Good,
    Skills,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub message: String,
    pub action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLevel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl MatchLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            MatchLevel::Excellent
        } else if score >= 70.0 {
            MatchLevel::Good
        } else if score >= 50.0 {
            MatchLevel::Fair
        } else {
            MatchLevel::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub overall_match_score: f64,
    pub required_skills: CategoryAnalysis,
    pub preferred_skills: CategoryAnalysis,
    pub technologies: CategoryAnalysis,
    pub top_skill_gaps: Vec<SkillGap>,
    pub recommendations: Vec<Recommendation>,
    pub match_level: MatchLevel,
    pub total_job_skills: usize,
    pub total_matched_skills: usize,
}

enum MatchOutcome<'a> {
    Exact(&'a UserSkill),
    Fuzzy(&'a UserSkill, f64),
    None,
}

pub struct SkillMatcher<'a> {
    user_skills: HashMap<String, &'a UserSkill>,
    db: &'a SkillDatabase,
    config: &'a MatchingConfig,
}

impl<'a> SkillMatcher<'a> {
    pub fn new(
        inventory: &'a SkillInventory,
        db: &'a SkillDatabase,
        config: &'a MatchingConfig,
    ) -> Self {
        Self {
            user_skills: inventory.matcher_map(),
            db,
            config,
        }
    }

    pub fn analyze(&self, job: &JobSkills) -> MatchReport {
        let required = self.analyze_category(&job.required, GapCategory::Required);
        let preferred = self.analyze_category(&job.preferred, GapCategory::Preferred);
        let technologies = self.analyze_category(&job.technologies, GapCategory::Technology);

        let overall_match_score = round1(
            required.match_percentage * self.config.required_weight
                + preferred.match_percentage * self.config.preferred_weight
                + technologies.match_percentage * self.config.technology_weight,
        );

        let top_skill_gaps =
            self.identify_top_gaps(&required, &preferred, &technologies, &job.keywords);
        let recommendations = self.generate_recommendations(&top_skill_gaps, overall_match_score);

        let total_matched_skills =
            required.matched_count + preferred.matched_count + technologies.matched_count;

        MatchReport {
            overall_match_score,
            match_level: MatchLevel::from_score(overall_match_score),
            total_job_skills: job.total(),
            total_matched_skills,
            required_skills: required,
            preferred_skills: preferred,
            technologies,
            top_skill_gaps,
            recommendations,
        }
    }

    fn analyze_category(&self, job_skills: &[String], category: GapCategory) -> CategoryAnalysis {
        if job_skills.is_empty() {
            return CategoryAnalysis::default();
        }

        let mut matched_skills = Vec::new();
        let mut partial_matches = Vec::new();
        let mut missing_skills = Vec::new();

        for job_skill in job_skills {
            let job_skill = normalize(job_skill);
            if job_skill.is_empty() {
                continue;
            }

            match self.find_match(&job_skill) {
                MatchOutcome::Exact(user_skill) => matched_skills.push(MatchedSkill {
                    job_skill,
                    user_skill: user_skill.title.clone(),
                }),
                MatchOutcome::Fuzzy(user_skill, similarity) => {
                    partial_matches.push(PartialMatch {
                        job_skill,
                        user_skill: user_skill.title.clone(),
                        similarity: round1(similarity * 100.0),
                    })
                }
                MatchOutcome::None => missing_skills.push(SkillGap {
                    skill_name: title_case(&job_skill),
                    priority: initial_priority(category),
                    category,
                    suggested_category: self.db.suggest_category(&job_skill).to_string(),
                    priority_score: 0,
                }),
            }
        }

        let total_count = job_skills.len();
        let matched_count = matched_skills.len() + partial_matches.len();
        let match_percentage = if total_count > 0 {
            round1(matched_count as f64 / total_count as f64 * 100.0)
        } else {
            0.0
        };

        CategoryAnalysis {
            total_count,
            matched_count,
            matched_skills,
            missing_skills,
            partial_matches,
            match_percentage,
        }
    }

    /// Exact key lookup first, then the best fuzzy candidate above the
    /// configured similarity threshold
    fn find_match(&self, job_skill: &str) -> MatchOutcome<'a> {
        if let Some(user_skill) = self.user_skills.get(job_skill).copied() {
            return MatchOutcome::Exact(user_skill);
        }

        let mut best: Option<(&'a UserSkill, f64)> = None;
        for (key, user_skill) in &self.user_skills {
            let similarity = normalized_levenshtein(job_skill, key);
            if similarity > self.config.fuzzy_threshold
                && best.map_or(true, |(_, b)| similarity > b)
            {
                best = Some((*user_skill, similarity));
            }
        }

        match best {
            Some((user_skill, similarity)) => MatchOutcome::Fuzzy(user_skill, similarity),
            None => MatchOutcome::None,
        }
    }

    /// Fixed priority hierarchy: technology > required > keyword > preferred
    fn identify_top_gaps(
        &self,
        required: &CategoryAnalysis,
        preferred: &CategoryAnalysis,
        technologies: &CategoryAnalysis,
        keywords: &[String],
    ) -> Vec<SkillGap> {
        let mut all_gaps = Vec::new();

        for gap in &technologies.missing_skills {
            all_gaps.push(SkillGap {
                priority: GapPriority::Critical,
                category: GapCategory::Technology,
                priority_score: 100,
                ..gap.clone()
            });
        }
        for gap in &required.missing_skills {
            all_gaps.push(SkillGap {
                priority: GapPriority::Critical,
                category: GapCategory::Required,
                priority_score: 90,
                ..gap.clone()
            });
        }

        // Keywords not already missing as required and not held by the user
        let missing_required: HashSet<String> = required
            .missing_skills
            .iter()
            .map(|g| normalize(&g.skill_name))
            .collect();
        for keyword in keywords {
            let normalized = normalize(keyword);
            if normalized.is_empty()
                || missing_required.contains(&normalized)
                || self.user_skills.contains_key(&normalized)
            {
                continue;
            }
            all_gaps.push(SkillGap {
                skill_name: title_case(&normalized),
                priority: GapPriority::High,
                category: GapCategory::Keyword,
                suggested_category: self.db.suggest_category(&normalized).to_string(),
                priority_score: 70,
            });
        }

        for gap in &preferred.missing_skills {
            all_gaps.push(SkillGap {
                priority: GapPriority::Medium,
                category: GapCategory::Preferred,
                priority_score: 50,
                ..gap.clone()
            });
        }

        // Same skill across categories keeps only its highest-priority entry
        let mut best: HashMap<String, SkillGap> = HashMap::new();
        for gap in all_gaps {
            let key = normalize(&gap.skill_name);
            match best.get(&key) {
                Some(existing) if existing.priority_score >= gap.priority_score => {}
                _ => {
                    best.insert(key, gap);
                }
            }
        }

        let mut unique: Vec<SkillGap> = best.into_values().collect();
        unique.sort_by(|a, b| {
            b.priority_score
                .cmp(&a.priority_score)
                .then_with(|| a.skill_name.cmp(&b.skill_name))
        });
        unique
    }

    /// Deterministic function of the overall score and the top gap names
    fn generate_recommendations(
        &self,
        top_gaps: &[SkillGap],
        overall_score: f64,
    ) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if overall_score < 40.0 {
            recommendations.push(Recommendation {
                kind: RecommendationType::Urgent,
                message: format!(
                    "Your skill match is quite low at {}%. Consider adding experiences \
                     that demonstrate the critical missing skills.",
                    overall_score
                ),
                action: "Focus on required skills first".to_string(),
            });
        } else if overall_score < 70.0 {
            recommendations.push(Recommendation {
                kind: RecommendationType::Moderate,
                message: format!(
                    "You have a {}% match. Adding a few key experiences could \
                     significantly improve your candidacy.",
                    overall_score
                ),
                action: "Add experiences for top missing skills".to_string(),
            });
        } else {
            recommendations.push(Recommendation {
                kind: RecommendationType::Good,
                message: format!(
                    "Strong {}% skill match! Consider adding experiences for \
                     preferred skills to stand out.",
                    overall_score
                ),
                action: "Optimize with preferred skills".to_string(),
            });
        }

        if !top_gaps.is_empty() {
            let names: Vec<&str> = top_gaps.iter().take(3).map(|g| g.skill_name.as_str()).collect();
            recommendations.push(Recommendation {
                kind: RecommendationType::Skills,
                message: format!("Priority skills to add: {}", names.join(", ")),
                action: format!("Create experiences showcasing these {} skills", names.len()),
            });
        }

        recommendations
    }
}

fn initial_priority(category: GapCategory) -> GapPriority {
    match category {
        GapCategory::Required => GapPriority::Critical,
        GapCategory::Preferred => GapPriority::High,
        _ => GapPriority::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::parsing::skill_db::{SkillDatabase, SkillType};
    use crate::storage::UserSkill;

    fn inventory(titles: &[&str]) -> SkillInventory {
        SkillInventory::from_skills(
            titles
                .iter()
                .map(|t| UserSkill::new(t, "Programming", SkillType::Technical))
                .collect(),
        )
    }

    fn analyze(user_titles: &[&str], job: &JobSkills) -> MatchReport {
        let config = Config::default();
        let db = SkillDatabase::embedded().unwrap();
        let inventory = inventory(user_titles);
        SkillMatcher::new(&inventory, &db, &config.matching).analyze(job)
    }

    #[test]
    fn test_exact_match_case_insensitive() {
        let job = JobSkills {
            required: vec!["javascript".to_string()],
            ..Default::default()
        };
        let report = analyze(&["Javascript"], &job);

        assert_eq!(report.required_skills.matched_count, 1);
        assert_eq!(report.required_skills.match_percentage, 100.0);
        assert!(report.required_skills.partial_matches.is_empty());
    }

    #[test]
    fn test_fuzzy_threshold_rejects_substring_skills() {
        // "java" vs "javascript" sits well under the 0.8 ratio
        let job = JobSkills {
            required: vec!["javascript".to_string()],
            ..Default::default()
        };
        let report = analyze(&["Java"], &job);

        assert_eq!(report.required_skills.matched_count, 0);
        assert_eq!(report.required_skills.missing_skills.len(), 1);
    }

    #[test]
    fn test_fuzzy_match_accepts_close_variant() {
        let job = JobSkills {
            required: vec!["postgresql".to_string()],
            ..Default::default()
        };
        let report = analyze(&["PostgreSQL 9"], &job);
        // "postgresql 9" vs "postgresql" is 2 edits over 12 chars, ratio ~0.83
        assert_eq!(report.required_skills.matched_count, 1);
        assert_eq!(report.required_skills.partial_matches.len(), 1);
    }

    #[test]
    fn test_weighted_overall_score() {
        let job = JobSkills {
            required: vec!["python".to_string(), "docker".to_string()],
            preferred: vec!["kubernetes".to_string()],
            technologies: vec!["python".to_string()],
            ..Default::default()
        };
        // required 50%, preferred 0%, technologies 100%: 30 + 0 + 10
        let report = analyze(&["Python"], &job);
        assert_eq!(report.overall_match_score, 40.0);
    }

    #[test]
    fn test_score_monotonic_in_added_skill() {
        let job = JobSkills {
            required: vec!["python".to_string(), "docker".to_string()],
            preferred: vec!["kubernetes".to_string()],
            ..Default::default()
        };

        let before = analyze(&["Python"], &job);
        let after = analyze(&["Python", "Docker"], &job);
        assert!(after.overall_match_score >= before.overall_match_score);
    }

    #[test]
    fn test_gap_dedup_keeps_technology_priority() {
        let job = JobSkills {
            preferred: vec!["terraform".to_string()],
            technologies: vec!["terraform".to_string()],
            ..Default::default()
        };
        let report = analyze(&[], &job);

        let gaps: Vec<&SkillGap> = report
            .top_skill_gaps
            .iter()
            .filter(|g| normalize(&g.skill_name) == "terraform")
            .collect();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].category, GapCategory::Technology);
        assert_eq!(gaps[0].priority_score, 100);
    }

    #[test]
    fn test_gap_ordering_and_keyword_pass() {
        let job = JobSkills {
            required: vec!["python".to_string()],
            preferred: vec!["kubernetes".to_string()],
            technologies: vec!["terraform".to_string()],
            keywords: vec!["airflow".to_string(), "python".to_string()],
        };
        let report = analyze(&[], &job);

        let scores: Vec<u32> = report.top_skill_gaps.iter().map(|g| g.priority_score).collect();
        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(scores, sorted);

        // "python" keyword is already a missing required skill, not doubled
        let python_gaps = report
            .top_skill_gaps
            .iter()
            .filter(|g| normalize(&g.skill_name) == "python")
            .count();
        assert_eq!(python_gaps, 1);
        assert!(report
            .top_skill_gaps
            .iter()
            .any(|g| normalize(&g.skill_name) == "airflow" && g.priority_score == 70));
    }

    #[test]
    fn test_empty_job_skills_score_zero() {
        let report = analyze(&["Python"], &JobSkills::default());
        assert_eq!(report.overall_match_score, 0.0);
        assert_eq!(report.match_level, MatchLevel::Poor);
        assert_eq!(report.total_job_skills, 0);
    }

    #[test]
    fn test_recommendation_thresholds() {
        let low = analyze(&[], &JobSkills {
            required: vec!["python".to_string()],
            ..Default::default()
        });
        assert_eq!(low.recommendations[0].kind, RecommendationType::Urgent);

        // empty preferred/technology categories score 0, capping at 60
        let required_only = analyze(&["Python"], &JobSkills {
            required: vec!["python".to_string()],
            ..Default::default()
        });
        assert_eq!(required_only.overall_match_score, 60.0);
        assert_eq!(required_only.recommendations[0].kind, RecommendationType::Moderate);

        let high = analyze(&["Python"], &JobSkills {
            required: vec!["python".to_string()],
            preferred: vec!["python".to_string()],
            technologies: vec!["python".to_string()],
            ..Default::default()
        });
        assert_eq!(high.recommendations[0].kind, RecommendationType::Good);
        assert_eq!(high.match_level, MatchLevel::Excellent);
    }

    #[test]
    fn test_alternate_names_match() {
        let mut skill = UserSkill::new("JavaScript", "Programming", SkillType::Technical);
        skill.alternates.push("JS".to_string());
        let inventory = SkillInventory::from_skills(vec![skill]);

        let config = Config::default();
        let db = SkillDatabase::embedded().unwrap();
        let report = SkillMatcher::new(&inventory, &db, &config.matching).analyze(&JobSkills {
            required: vec!["js".to_string()],
            ..Default::default()
        });
        assert_eq!(report.required_skills.matched_count, 1);
    }
}
