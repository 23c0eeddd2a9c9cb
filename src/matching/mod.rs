//! Skill matching, gap analysis, and analysis snapshots

pub mod gap_analyzer;
pub mod skill_matcher;
pub mod snapshot;
