//! Portfolio-wide gap analysis across every saved job posting

use crate::config::MatchingConfig;
use crate::parsing::skill_db::{normalize, SkillDatabase, SkillType};
use crate::storage::{JobPosting, SkillInventory};
use crate::util::{round1, round2, title_case};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One skill the portfolio demands but the user lacks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioGap {
    pub skill_name: String,
    /// Number of saved jobs demanding this skill
    pub frequency: usize,
    pub percentage_of_jobs: f64,
    pub priority_score: f64,
    pub suggested_category: String,
    pub skill_type: SkillType,
}

/// How well the user covers one saved job's demanded skills
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatchScore {
    pub url: String,
    pub job_title: String,
    pub company_name: String,
    pub match_percentage: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub total_job_skills: usize,
    pub total_matched: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    SkillGaps,
    LowMatches,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    pub message: String,
    pub action: String,
}

/// Why a portfolio analysis could not produce scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsufficientData {
    NoSavedJobs,
    NoUserSkills,
}

impl InsufficientData {
    pub fn message(&self) -> &'static str {
        match self {
            InsufficientData::NoSavedJobs => {
                "No saved jobs to analyze. Save some job postings first."
            }
            InsufficientData::NoUserSkills => {
                "No skills in your inventory. Add skills or extract them from experiences first."
            }
        }
    }
}

/// Portfolio report: empty aggregates are legal, missing preconditions
/// are reported structurally instead of failing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub total_jobs_analyzed: usize,
    pub total_user_skills: usize,
    pub skill_frequency: HashMap<String, usize>,
    pub skill_gaps: Vec<PortfolioGap>,
    pub job_match_scores: Vec<JobMatchScore>,
    pub suggestions: Vec<Suggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insufficient_data: Option<InsufficientData>,
}

impl PortfolioReport {
    fn empty(reason: InsufficientData, jobs: usize, skills: usize) -> Self {
        Self {
            total_jobs_analyzed: jobs,
            total_user_skills: skills,
            skill_frequency: HashMap::new(),
            skill_gaps: Vec::new(),
            job_match_scores: Vec::new(),
            suggestions: Vec::new(),
            insufficient_data: Some(reason),
        }
    }
}

pub struct GapAnalyzer<'a> {
    db: &'a SkillDatabase,
    config: &'a MatchingConfig,
}

impl<'a> GapAnalyzer<'a> {
    pub fn new(db: &'a SkillDatabase, config: &'a MatchingConfig) -> Self {
        Self { db, config }
    }

    pub fn analyze(&self, jobs: &[&JobPosting], inventory: &SkillInventory) -> PortfolioReport {
        if jobs.is_empty() {
            return PortfolioReport::empty(InsufficientData::NoSavedJobs, 0, inventory.len());
        }
        if inventory.is_empty() {
            return PortfolioReport::empty(InsufficientData::NoUserSkills, jobs.len(), 0);
        }

        let user_skills = inventory.normalized_titles();
        let total_jobs = jobs.len();

        // Demand counter: one increment per job per demanded skill
        let mut skill_frequency: HashMap<String, usize> = HashMap::new();
        for job in jobs {
            for skill in job.demanded_skills() {
                *skill_frequency.entry(skill).or_insert(0) += 1;
            }
        }

        let mut skill_gaps: Vec<PortfolioGap> = skill_frequency
            .iter()
            .filter(|(skill, _)| !user_skills.contains(*skill))
            .map(|(skill, &frequency)| {
                let percentage = frequency as f64 / total_jobs as f64 * 100.0;
                PortfolioGap {
                    skill_name: title_case(skill),
                    frequency,
                    percentage_of_jobs: round1(percentage),
                    priority_score: self.gap_priority(skill, percentage),
                    suggested_category: self.db.suggest_category(skill).to_string(),
                    skill_type: self.db.skill_type(skill),
                }
            })
            .collect();
        skill_gaps.sort_by(|a, b| {
            b.priority_score
                .partial_cmp(&a.priority_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.skill_name.cmp(&b.skill_name))
        });

        let job_match_scores = self.job_match_scores(jobs, &user_skills);
        let suggestions = generate_suggestions(&skill_gaps, &job_match_scores);

        PortfolioReport {
            total_jobs_analyzed: total_jobs,
            total_user_skills: inventory.len(),
            skill_frequency,
            skill_gaps,
            job_match_scores,
            suggestions,
            insufficient_data: None,
        }
    }

    /// Demand share of the portfolio, boosted for technical skills
    fn gap_priority(&self, skill: &str, percentage: f64) -> f64 {
        let mut score = percentage;
        if self.db.skill_type(skill) == SkillType::Technical {
            score *= self.config.technical_boost;
        }
        round2(score)
    }

    fn job_match_scores(
        &self,
        jobs: &[&JobPosting],
        user_skills: &HashSet<String>,
    ) -> Vec<JobMatchScore> {
        let mut scores: Vec<JobMatchScore> = jobs
            .iter()
            .filter_map(|job| {
                let job_skills: HashSet<String> = job.demanded_skills().into_iter().collect();
                if job_skills.is_empty() {
                    return None;
                }

                let mut matched: Vec<String> =
                    job_skills.intersection(user_skills).cloned().collect();
                let mut missing: Vec<String> =
                    job_skills.difference(user_skills).cloned().collect();
                matched.sort();
                missing.sort();

                Some(JobMatchScore {
                    url: job.url.clone(),
                    job_title: job.job_title.clone(),
                    company_name: job.company_name.clone(),
                    match_percentage: round1(
                        matched.len() as f64 / job_skills.len() as f64 * 100.0,
                    ),
                    total_job_skills: job_skills.len(),
                    total_matched: matched.len(),
                    matched_skills: matched,
                    missing_skills: missing,
                })
            })
            .collect();

        scores.sort_by(|a, b| {
            b.match_percentage
                .partial_cmp(&a.match_percentage)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.url.cmp(&b.url))
        });
        scores
    }
}

fn generate_suggestions(gaps: &[PortfolioGap], matches: &[JobMatchScore]) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    if !gaps.is_empty() {
        let top: Vec<&str> = gaps.iter().take(3).map(|g| g.skill_name.as_str()).collect();
        suggestions.push(Suggestion {
            kind: SuggestionType::SkillGaps,
            message: format!(
                "You're missing {} skills that appear frequently in your saved jobs. \
                 The top ones are: {}",
                gaps.len(),
                top.join(", ")
            ),
            action: "Add experiences that demonstrate these skills".to_string(),
        });
    }

    let low_matches = matches.iter().filter(|m| m.match_percentage < 60.0).count();
    if low_matches > 0 {
        suggestions.push(Suggestion {
            kind: SuggestionType::LowMatches,
            message: format!(
                "You have {} saved jobs where you match less than 60% of requirements.",
                low_matches
            ),
            action: "Consider adding more relevant experiences or skills".to_string(),
        });
    }

    suggestions
}
