//! Graph module for unit reference modeling.
//!
//! This module provides the [`DependencyGraph`] struct: a directed graph
//! from referencing files to the units they import, with a total
//! unit -> dependents mapping and the unused-unit query on top.
//!
//! # Example
//!
//! ```rust
//! use std::path::Path;
//! use prunescope::graph::DependencyGraph;
//!
//! let mut graph = DependencyGraph::new(&["tsx", "ts"]);
//! graph.add_unit(Path::new("/app/Nav.tsx"));
//! graph.add_edge(Path::new("/app/Layout.tsx"), Path::new("/app/Nav"), false);
//!
//! assert_eq!(graph.unit_count(), 1);
//! assert_eq!(graph.edge_count(), 1);
//! ```

mod dependency_graph;

pub use dependency_graph::{CycleInfo, DependencyEdge, DependencyGraph, FileNode};
