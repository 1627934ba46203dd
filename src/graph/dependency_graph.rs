//! Dependency graph implementation using petgraph.
//!
//! Nodes are project files keyed by normalized path. Unit nodes are the
//! targets of interest; every other node exists only because it references a
//! unit. Edges point from the referencing file to the unit.

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::analysis::{equivalence_key, normalize_path, path_key, ResolvedEdge};
use crate::classify::Unit;

/// A file in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// Normalized path of the file
    pub path: PathBuf,
    /// Whether the file was classified as a unit
    pub is_unit: bool,
}

/// Represents an edge in the dependency graph.
#[derive(Debug, Clone, Default)]
pub struct DependencyEdge {
    /// Whether every reference behind this edge is a dynamic `import()`
    pub is_dynamic: bool,
}

impl DependencyEdge {
    /// Creates a new static reference edge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new dynamic reference edge.
    pub fn dynamic() -> Self {
        Self { is_dynamic: true }
    }
}

/// Details of one circular reference among units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInfo {
    /// The unit paths in the cycle (the last connects back to the first)
    pub nodes: Vec<String>,
}

impl CycleInfo {
    /// Returns a formatted string representation of the cycle path.
    ///
    /// For example: "a -> b -> c -> a"
    pub fn cycle_path(&self) -> String {
        match self.nodes.first() {
            Some(first) => format!("{} -> {}", self.nodes.join(" -> "), first),
            None => String::new(),
        }
    }

    /// Returns the number of units in the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the cycle is empty (should not happen in practice).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Mapping from unit path to the files that reference it.
///
/// Every unit added to the graph has an entry, possibly empty. Dependents
/// are deduplicated and reported in the order their first edge was added.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use prunescope::graph::DependencyGraph;
///
/// let mut graph = DependencyGraph::new(&["tsx"]);
/// graph.add_unit(Path::new("/p/Button.tsx"));
/// graph.add_unit(Path::new("/p/Card.tsx"));
///
/// // `./Button` from App.tsx resolves to the extensionless form
/// assert!(graph.add_edge(Path::new("/p/App.tsx"), Path::new("/p/Button"), false));
///
/// assert_eq!(graph.dependents(Path::new("/p/Button.tsx")).len(), 1);
/// assert!(graph.dependents(Path::new("/p/Card.tsx")).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// The underlying directed graph
    graph: DiGraph<FileNode, DependencyEdge>,
    /// Maps exact path keys to their node indices for O(1) lookup
    node_indices: HashMap<String, NodeIndex>,
    /// Maps equivalence keys to unit nodes
    unit_index: HashMap<String, Vec<NodeIndex>>,
    /// Unit nodes in insertion order
    units: Vec<NodeIndex>,
    extensions: Vec<String>,
}

impl DependencyGraph {
    /// Creates a new empty graph using `extensions` for path equivalence.
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
            unit_index: HashMap::new(),
            units: Vec::new(),
            extensions: extensions.iter().map(|e| e.as_ref().to_string()).collect(),
        }
    }

    /// Builds the graph for `units` from resolved `edges`.
    ///
    /// Edges whose target matches no unit are dropped.
    pub fn build<S: AsRef<str>>(units: &[Unit], edges: &[ResolvedEdge], extensions: &[S]) -> Self {
        let mut graph = Self::new(extensions);
        for unit in units {
            graph.add_unit(&unit.path);
        }

        let mut matched = 0usize;
        for edge in edges {
            if graph.add_edge(&edge.from, &edge.to, edge.dynamic) {
                matched += 1;
            }
        }
        tracing::debug!(
            "Matched {} of {} resolved edges to {} units",
            matched,
            edges.len(),
            units.len()
        );

        graph
    }

    /// Adds a unit. Adding the same path twice returns the existing node.
    pub fn add_unit(&mut self, path: &Path) -> NodeIndex {
        let idx = self.add_file(path);
        if let Some(node) = self.graph.node_weight_mut(idx) {
            if node.is_unit {
                return idx;
            }
            node.is_unit = true;
        }
        let key = equivalence_key(path, &self.extensions);
        self.unit_index.entry(key).or_default().push(idx);
        self.units.push(idx);
        idx
    }

    fn add_file(&mut self, path: &Path) -> NodeIndex {
        let path = normalize_path(path);
        let key = path_key(&path);
        if let Some(&idx) = self.node_indices.get(&key) {
            return idx;
        }

        let idx = self.graph.add_node(FileNode {
            path,
            is_unit: false,
        });
        self.node_indices.insert(key, idx);
        idx
    }

    /// Finds the unit nodes a resolved target refers to.
    ///
    /// An exact path match wins; otherwise every unit sharing the target's
    /// equivalence key matches.
    fn match_units(&self, target: &Path) -> Vec<NodeIndex> {
        let exact = path_key(&normalize_path(target));
        if let Some(&idx) = self.node_indices.get(&exact) {
            if self.graph[idx].is_unit {
                return vec![idx];
            }
        }

        let key = equivalence_key(target, &self.extensions);
        self.unit_index.get(&key).cloned().unwrap_or_default()
    }

    /// Records that `from` references `target`.
    ///
    /// Returns true if `target` matched at least one unit. Self-references
    /// and repeated references are not added twice.
    pub fn add_edge(&mut self, from: &Path, target: &Path, dynamic: bool) -> bool {
        let targets = self.match_units(target);
        if targets.is_empty() {
            return false;
        }

        let from_idx = self.add_file(from);
        for to_idx in targets {
            if from_idx == to_idx {
                continue;
            }
            match self.graph.find_edge(from_idx, to_idx) {
                Some(existing) => {
                    // A static reference anywhere makes the edge static.
                    if !dynamic {
                        self.graph[existing].is_dynamic = false;
                    }
                }
                None => {
                    let edge = if dynamic {
                        DependencyEdge::dynamic()
                    } else {
                        DependencyEdge::new()
                    };
                    self.graph.add_edge(from_idx, to_idx, edge);
                }
            }
        }
        true
    }

    fn unit_node(&self, path: &Path) -> Option<NodeIndex> {
        let key = path_key(&normalize_path(path));
        self.node_indices
            .get(&key)
            .copied()
            .filter(|&idx| self.graph[idx].is_unit)
    }

    /// Returns true if `path` is a unit known to the graph.
    pub fn contains_unit(&self, path: &Path) -> bool {
        self.unit_node(path).is_some()
    }

    /// Files referencing the unit at `path`, in first-reference order.
    ///
    /// Unknown paths yield an empty list.
    pub fn dependents(&self, path: &Path) -> Vec<PathBuf> {
        let Some(idx) = self.unit_node(path) else {
            return Vec::new();
        };

        let mut incoming: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|edge| (edge.id().index(), edge.source()))
            .collect();
        incoming.sort_by_key(|(order, _)| *order);

        incoming
            .into_iter()
            .map(|(_, source)| self.graph[source].path.clone())
            .collect()
    }

    /// Returns true if only dynamic imports reference the unit at `path`.
    pub fn is_dynamically_loaded(&self, path: &Path) -> bool {
        let Some(idx) = self.unit_node(path) else {
            return false;
        };
        let mut edges = self.graph.edges_directed(idx, Direction::Incoming).peekable();
        edges.peek().is_some() && edges.all(|e| e.weight().is_dynamic)
    }

    /// Every unit with its dependents, in unit insertion order.
    pub fn entries(&self) -> Vec<(PathBuf, Vec<PathBuf>)> {
        self.units
            .iter()
            .map(|&idx| {
                let path = self.graph[idx].path.clone();
                let dependents = self.dependents(&path);
                (path, dependents)
            })
            .collect()
    }

    /// Returns the units in `units` that no file references.
    ///
    /// A pure query over the built graph; nothing is re-resolved.
    pub fn find_unused<'a>(&self, units: &'a [Unit]) -> Vec<&'a Unit> {
        units
            .iter()
            .filter(|unit| {
                self.unit_node(&unit.path).map_or(true, |idx| {
                    self.graph
                        .edges_directed(idx, Direction::Incoming)
                        .next()
                        .is_none()
                })
            })
            .collect()
    }

    /// Checks if units reference each other circularly.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Detects and returns all cycles in the graph.
    ///
    /// Each cycle is a strongly connected component with more than one node,
    /// listed by path.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut cycle: Vec<String> = scc
                    .iter()
                    .map(|&idx| path_key(&self.graph[idx].path))
                    .collect();
                cycle.sort();
                cycle
            })
            .collect()
    }

    /// Returns detailed cycle information including the cycle path.
    pub fn cycle_details(&self) -> Vec<CycleInfo> {
        self.detect_cycles()
            .into_iter()
            .map(|nodes| CycleInfo { nodes })
            .collect()
    }

    /// Returns the number of units in the graph.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Returns the number of nodes (units plus referencing files).
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
