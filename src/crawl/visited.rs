// src/crawl/visited.rs
// =============================================================================
// The set of nodes that have already been visited.
//
// Many workers read and write this set at the same time. DashSet splits its
// contents into shards, each with its own lock, so callers never lock
// anything themselves.
//
// Nodes are only ever added. Nothing removes a node once it is in the set.
//
// Note: `contains` followed later by `put_if_absent` is two separate steps.
// Another worker can slip in between them. The visit operation relies on
// that gap being possible and reports duplicate work when it happens.
// =============================================================================

use super::NodeId;
use dashmap::DashSet;

/// Concurrent, grow-only set of visited nodes
#[derive(Debug, Default)]
pub struct VisitedSet {
    nodes: DashSet<NodeId>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Has this node been recorded as visited?
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Record a node as visited
    ///
    /// Returns true if this call inserted it, false if it was already there.
    pub fn put_if_absent(&self, node: NodeId) -> bool {
        self.nodes.insert(node)
    }

    /// Number of distinct visited nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sorted copy of the visited nodes
    pub fn snapshot(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.nodes.iter().map(|n| *n).collect();
        nodes.sort_unstable();
        nodes
    }
}
