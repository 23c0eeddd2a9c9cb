//! Point-in-time audit record of a portfolio analysis run

use crate::matching::gap_analyzer::{JobMatchScore, PortfolioGap, PortfolioReport};
use crate::util::round1;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ANALYZER_VERSION: &str = "1.0";

/// Lifecycle of a snapshot. The only field that may change after capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    #[default]
    Fresh,
    InProgress,
    Completed,
    Archived,
}

/// Frozen copy of a [`PortfolioReport`] plus summary statistics.
/// Immutable after capture except for `status` and `user_notes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub created_at: DateTime<Utc>,
    pub total_jobs_analyzed: usize,
    pub total_skills_found: usize,
    pub total_skill_gaps: usize,
    pub average_job_match_score: f64,
    pub highest_job_match_score: f64,
    pub lowest_job_match_score: f64,
    pub skill_gaps: Vec<PortfolioGap>,
    pub job_matches: Vec<JobMatchScore>,
    pub analyzer_version: String,
    pub status: SnapshotStatus,
    #[serde(default)]
    pub user_notes: String,
}

impl AnalysisSnapshot {
    pub fn capture(report: &PortfolioReport) -> Self {
        let scores: Vec<f64> = report
            .job_match_scores
            .iter()
            .map(|m| m.match_percentage)
            .collect();

        let (average, highest, lowest) = if scores.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let sum: f64 = scores.iter().sum();
            let average = round1(sum / scores.len() as f64);
            let highest = scores.iter().cloned().fold(f64::MIN, f64::max);
            let lowest = scores.iter().cloned().fold(f64::MAX, f64::min);
            (average, highest, lowest)
        };

        Self {
            created_at: Utc::now(),
            total_jobs_analyzed: report.total_jobs_analyzed,
            total_skills_found: report.total_user_skills,
            total_skill_gaps: report.skill_gaps.len(),
            average_job_match_score: average,
            highest_job_match_score: highest,
            lowest_job_match_score: lowest,
            skill_gaps: report.skill_gaps.clone(),
            job_matches: report.job_match_scores.clone(),
            analyzer_version: ANALYZER_VERSION.to_string(),
            status: SnapshotStatus::Fresh,
            user_notes: String::new(),
        }
    }

    pub fn is_recent(&self, days: i64) -> bool {
        (Utc::now() - self.created_at).num_days() < days
    }

    pub fn mark_in_progress(&mut self) {
        self.status = SnapshotStatus::InProgress;
    }

    pub fn mark_completed(&mut self, user_notes: &str) {
        self.status = SnapshotStatus::Completed;
        if !user_notes.is_empty() {
            self.user_notes = user_notes.to_string();
        }
    }

    pub fn archive(&mut self) {
        self.status = SnapshotStatus::Archived;
    }

    pub fn gap_for_skill(&self, skill_name: &str) -> Option<&PortfolioGap> {
        let wanted = skill_name.to_lowercase();
        self.skill_gaps
            .iter()
            .find(|g| g.skill_name.to_lowercase() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn score(url: &str, pct: f64) -> JobMatchScore {
        JobMatchScore {
            url: url.to_string(),
            job_title: "Engineer".to_string(),
            company_name: "Acme".to_string(),
            match_percentage: pct,
            matched_skills: Vec::new(),
            missing_skills: Vec::new(),
            total_job_skills: 4,
            total_matched: 2,
        }
    }

    fn report(scores: Vec<JobMatchScore>) -> PortfolioReport {
        PortfolioReport {
            total_jobs_analyzed: scores.len(),
            total_user_skills: 5,
            skill_frequency: HashMap::new(),
            skill_gaps: Vec::new(),
            job_match_scores: scores,
            suggestions: Vec::new(),
            insufficient_data: None,
        }
    }

    #[test]
    fn test_capture_statistics() {
        let snapshot = AnalysisSnapshot::capture(&report(vec![
            score("https://a.example/1", 80.0),
            score("https://a.example/2", 40.0),
            score("https://a.example/3", 60.0),
        ]));

        assert_eq!(snapshot.average_job_match_score, 60.0);
        assert_eq!(snapshot.highest_job_match_score, 80.0);
        assert_eq!(snapshot.lowest_job_match_score, 40.0);
        assert_eq!(snapshot.status, SnapshotStatus::Fresh);
        assert!(snapshot.is_recent(7));
    }

    #[test]
    fn test_empty_report_statistics_are_zero() {
        let snapshot = AnalysisSnapshot::capture(&report(Vec::new()));
        assert_eq!(snapshot.average_job_match_score, 0.0);
        assert_eq!(snapshot.highest_job_match_score, 0.0);
        assert_eq!(snapshot.lowest_job_match_score, 0.0);
    }

    #[test]
    fn test_status_lifecycle() {
        let mut snapshot = AnalysisSnapshot::capture(&report(Vec::new()));

        snapshot.mark_in_progress();
        assert_eq!(snapshot.status, SnapshotStatus::InProgress);

        snapshot.mark_completed("addressed the docker gap");
        assert_eq!(snapshot.status, SnapshotStatus::Completed);
        assert_eq!(snapshot.user_notes, "addressed the docker gap");

        snapshot.archive();
        assert_eq!(snapshot.status, SnapshotStatus::Archived);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let mut snapshot = AnalysisSnapshot::capture(&report(Vec::new()));
        snapshot.mark_in_progress();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["analyzer_version"], "1.0");
    }
}
