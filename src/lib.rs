//! PruneScope - unused component finder for JavaScript/TypeScript projects
//!
//! This crate finds the files in a project that define a reusable UI
//! component, builds the graph of which files import them, and for every
//! component nobody imports decides whether deleting it is actually safe.
//!
//! ```no_run
//! use std::path::Path;
//! use prunescope::config::AnalysisConfig;
//! use prunescope::pipeline::analyze;
//!
//! let report = analyze(Path::new("."), AnalysisConfig::default()).unwrap();
//! for record in report.safe_records() {
//!     println!("{}", report.relative(&record.path));
//! }
//! ```

pub mod analysis;
pub mod classify;
pub mod config;
pub mod export;
pub mod graph;
pub mod logger;
pub mod pipeline;
pub mod report;
pub mod safety;
pub mod workspace;
