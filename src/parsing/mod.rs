//! Description parsing: skill database and requirement extraction

pub mod requirements;
pub mod skill_db;
