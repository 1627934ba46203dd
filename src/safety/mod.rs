//! Deletion-safety analysis for unused units.
//!
//! A unit with no dependents in the graph can still be in use: re-exported
//! from an aggregator file, named in markup or docs, or referenced by a
//! build tool's config. The [`SafetyAnalyzer`] runs four independent checks
//! and folds them into a [`SafetyVerdict`].
//!
//! # Policies
//!
//! Whether re-export and config-file findings flip the verdict is a choice,
//! exposed as [`SafetyPolicy`]:
//!
//! - [`SafetyPolicy::Strict`] (default): any finding makes the unit unsafe.
//! - [`SafetyPolicy::Lenient`]: only non-test direct dependents and indirect
//!   mentions make it unsafe; re-exports and config mentions are advisory.
//!
//! Warnings are emitted for every finding under both policies.

mod analyzer;
mod mentions;

pub use analyzer::{is_test_file, SafetyAnalyzer, SafetyError, SafetyResult};
pub use mentions::{is_module_statement, Mention, MentionIndex};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How advisory findings affect [`SafetyVerdict::is_safe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyPolicy {
    /// Re-exports and config mentions make a unit unsafe
    #[default]
    Strict,
    /// Re-exports and config mentions only add warnings
    Lenient,
}

impl FromStr for SafetyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(SafetyPolicy::Strict),
            "lenient" => Ok(SafetyPolicy::Lenient),
            _ => Err(format!(
                "Unknown safety policy: '{}'. Valid policies: strict, lenient",
                s
            )),
        }
    }
}

impl fmt::Display for SafetyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyPolicy::Strict => write!(f, "strict"),
            SafetyPolicy::Lenient => write!(f, "lenient"),
        }
    }
}

/// Outcome of the safety checks for one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SafetyVerdict {
    pub is_safe: bool,
    /// Human-readable findings, in check order
    pub warnings: Vec<String>,
    /// Every file referencing the unit, deduplicated
    pub dependents: Vec<PathBuf>,
    /// Suggested actions, most actionable first
    pub recommendations: Vec<String>,
    /// Dependents that are test files
    pub test_dependents: Vec<PathBuf>,
    /// Aggregator files re-exporting the unit
    pub reexported_by: Vec<PathBuf>,
    /// Textual mentions outside import/export lines
    pub indirect_mentions: Vec<Mention>,
    /// Quoted mentions in build/tooling configuration
    pub config_mentions: Vec<Mention>,
}
