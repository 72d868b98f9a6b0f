//! Transformation module.
//!
//! - Rules: Ranking tiers, ratio and quality filter as data
//! - Pipeline: Stage functions and the orchestrating run

pub mod pipeline;
pub mod rules;

pub use pipeline::*;
pub use rules::{player_rules, RuleSet};
