// src/crawl/children.rs
// =============================================================================
// Where new nodes come from.
//
// A visit "discovers" a fixed number of nodes drawn uniformly from the space.
// The discovered nodes do not depend on the node being visited. The source
// is a trait so tests can hand in exact node lists instead of random ones.
// =============================================================================

use super::NodeId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Produces nodes in [0, space)
pub trait ChildSource: Send + Sync {
    /// Draw `count` nodes from [0, space)
    fn children(&self, count: usize, space: u64) -> Vec<NodeId>;

    /// Draw one node, used to pick the seed
    fn pick(&self, space: u64) -> NodeId {
        self.children(1, space)[0]
    }
}

/// Uniform random children
pub struct RandomChildren {
    rng: Mutex<StdRng>,
}

impl RandomChildren {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Same seed, same sequence of children
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl ChildSource for RandomChildren {
    fn children(&self, count: usize, space: u64) -> Vec<NodeId> {
        // A poisoned lock only means another worker panicked mid-draw;
        // the generator state is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        (0..count).map(|_| rng.gen_range(0..space)).collect()
    }
}

/// Replays a fixed list of nodes, wrapping modulo the space
///
/// Once the list runs out it keeps returning the last node.
pub struct ScriptedChildren {
    script: Mutex<Script>,
}

struct Script {
    nodes: VecDeque<NodeId>,
    last: NodeId,
}

impl ScriptedChildren {
    pub fn new(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            script: Mutex::new(Script {
                nodes: nodes.into_iter().collect(),
                last: 0,
            }),
        }
    }
}

impl ChildSource for ScriptedChildren {
    fn children(&self, count: usize, space: u64) -> Vec<NodeId> {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        (0..count)
            .map(|_| {
                if let Some(node) = script.nodes.pop_front() {
                    script.last = node;
                }
                script.last % space
            })
            .collect()
    }
}
