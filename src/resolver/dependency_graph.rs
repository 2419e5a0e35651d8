//! Dependency graph over the resources of one template.
//!
//! The scheduler does not need this graph to make progress; it is built to explain
//! and order things: cycle paths for [`StackError::DependencyCycle`] diagnostics,
//! a deterministic load order for planning, and a tree rendering for the `deps`
//! command.

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::core::StackError;

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is currently being visited (in the DFS stack).
    Gray,
    /// Node has been fully visited.
    Black,
}

/// Directed graph of logical IDs, with an edge from each resource to every resource it
/// depends on.
pub struct DependencyGraph {
    /// The underlying directed graph.
    graph: DiGraph<String, ()>,
    /// Map from logical IDs to their graph indices.
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Build a graph from per-resource dependency sets.
    ///
    /// Nodes are inserted in key order so that every derived order is deterministic.
    pub fn from_dependencies(dependencies: &BTreeMap<String, BTreeSet<String>>) -> Self {
        let mut graph = Self::new();
        for logical_id in dependencies.keys() {
            graph.ensure_node(logical_id);
        }
        for (logical_id, deps) in dependencies {
            for dep in deps {
                graph.add_dependency(logical_id, dep);
            }
        }
        graph
    }

    /// Add a node to the graph if it doesn't already exist.
    ///
    /// Returns the node index in the graph.
    fn ensure_node(&mut self, logical_id: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(logical_id) {
            index
        } else {
            let index = self.graph.add_node(logical_id.to_string());
            self.node_map.insert(logical_id.to_string(), index);
            index
        }
    }

    /// Add a dependency relationship to the graph.
    ///
    /// `from` depends on `to`, meaning `to` must be resolved before `from`.
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Find one cycle using DFS with colors.
    ///
    /// Returns the cycle path, closed by repeating its first node, or `None` if the
    /// graph is acyclic.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|node| (node, Color::White)).collect();
        let mut path: Vec<NodeIndex> = Vec::new();

        for node in self.graph.node_indices() {
            if matches!(colors.get(&node), Some(Color::White)) {
                if let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path) {
                    return Some(cycle.into_iter().map(|idx| self.graph[idx].clone()).collect());
                }
            }
        }

        None
    }

    /// DFS visit for cycle detection.
    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        // Visit neighbors in name order for a stable cycle report
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        neighbors.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));

        for neighbor in neighbors {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    let start = path.iter().position(|n| *n == neighbor).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Some(Color::White) => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    /// Get the order in which resources can be resolved.
    ///
    /// Every resource comes after all of its dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::DependencyCycle`] if the graph contains a cycle.
    pub fn topological_order(&self) -> Result<Vec<String>, StackError> {
        if let Some(cycle) = self.find_cycle() {
            let pending: BTreeSet<String> = cycle.iter().cloned().collect();
            return Err(StackError::DependencyCycle {
                pending: pending.into_iter().collect(),
                cycle: Some(cycle),
            });
        }

        let indices = toposort(&self.graph, None).map_err(|cycle| StackError::DependencyCycle {
            pending: vec![self.graph[cycle.node_id()].clone()],
            cycle: None,
        })?;

        // Reverse the order so dependencies come first
        Ok(indices.into_iter().rev().map(|idx| self.graph[idx].clone()).collect())
    }

    /// Direct dependencies of `logical_id`, sorted.
    pub fn direct_dependencies(&self, logical_id: &str) -> Vec<String> {
        self.sorted_neighbors(logical_id, Direction::Outgoing)
    }

    /// Resources nothing else depends on, sorted.
    pub fn roots(&self) -> Vec<String> {
        let mut roots: Vec<String> = self
            .graph
            .node_indices()
            .filter(|idx| self.graph.neighbors_directed(*idx, Direction::Incoming).next().is_none())
            .map(|idx| self.graph[idx].clone())
            .collect();
        roots.sort();
        roots
    }

    fn sorted_neighbors(&self, logical_id: &str, direction: Direction) -> Vec<String> {
        let Some(&idx) = self.node_map.get(logical_id) else {
            return Vec::new();
        };
        let mut names: Vec<String> =
            self.graph.neighbors_directed(idx, direction).map(|n| self.graph[n].clone()).collect();
        names.sort();
        names
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Get the total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the total number of edges (dependencies) in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Build a human-readable dependency tree rooted at `root`.
    pub fn to_tree_string(&self, root: &str) -> String {
        let mut result = String::new();
        let mut visited = HashSet::new();
        self.build_tree_string(root, &mut result, "", true, &mut visited);
        result
    }

    fn build_tree_string(
        &self,
        node: &str,
        result: &mut String,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<String>,
    ) {
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        result.push_str(&format!("{prefix}{connector}{node}\n"));

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        if !visited.insert(node.to_string()) {
            result.push_str(&format!("{child_prefix}└── (circular reference)\n"));
            return;
        }

        let deps = self.direct_dependencies(node);
        for (i, dep) in deps.iter().enumerate() {
            self.build_tree_string(dep, result, &child_prefix, i == deps.len() - 1, visited);
        }

        visited.remove(node);
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
