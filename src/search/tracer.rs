//! Work items for the parallel search

use std::sync::Arc;

use crate::graph::{Connection, NodeId};

/// Backward-linked path history.
///
/// Each link points at the node it was created for and at the history of the
/// tracer it branched from, so sibling tracers share their common prefix.
#[derive(Debug)]
pub struct TraceHistory {
    node: NodeId,
    parent: Option<Arc<TraceHistory>>,
}

impl TraceHistory {
    pub fn root(node: NodeId) -> Arc<Self> {
        Arc::new(Self { node, parent: None })
    }

    pub fn extend(parent: &Arc<Self>, node: NodeId) -> Arc<Self> {
        Arc::new(Self {
            node,
            parent: Some(Arc::clone(parent)),
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Walk from this node back to the start
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(self), |h| h.parent.as_deref()).map(|h| h.node)
    }

    /// Forward path from the start node to this one
    pub fn to_path(&self) -> Vec<NodeId> {
        let mut path: Vec<NodeId> = self.iter().collect();
        path.reverse();
        path
    }
}

/// One partial path in flight.
#[derive(Debug, Clone)]
pub struct Tracer {
    pub node: NodeId,
    pub time: u32,
    pub history: Arc<TraceHistory>,
}

impl Tracer {
    /// Seed tracer sitting on `start` at time zero
    pub fn seed(start: NodeId) -> Self {
        Self {
            node: start,
            time: 0,
            history: TraceHistory::root(start),
        }
    }

    /// Successor reached by following `connection` from this tracer.
    pub fn follow(&self, connection: &Connection) -> Self {
        Self {
            node: connection.target,
            time: self
                .time
                .saturating_add(connection.parity.traversal_cost(self.time)),
            history: TraceHistory::extend(&self.history, connection.target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Parity;

    #[test]
    fn test_seed_tracer() {
        let tracer = Tracer::seed(NodeId(3));
        assert_eq!(tracer.node, NodeId(3));
        assert_eq!(tracer.time, 0);
        assert_eq!(tracer.history.to_path(), vec![NodeId(3)]);
    }

    #[test]
    fn test_follow_matching_parity() {
        let tracer = Tracer::seed(NodeId(0));
        let next = tracer.follow(&Connection {
            target: NodeId(1),
            parity: Parity::Even,
        });
        assert_eq!(next.time, 1);
        assert_eq!(next.node, NodeId(1));
    }

    #[test]
    fn test_follow_waits_on_parity_mismatch() {
        let tracer = Tracer::seed(NodeId(0));
        let next = tracer.follow(&Connection {
            target: NodeId(1),
            parity: Parity::Odd,
        });
        assert_eq!(next.time, 2);
    }

    #[test]
    fn test_branches_share_prefix() {
        let root = Tracer::seed(NodeId(0));
        let mid = root.follow(&Connection {
            target: NodeId(1),
            parity: Parity::Even,
        });
        let left = mid.follow(&Connection {
            target: NodeId(2),
            parity: Parity::Odd,
        });
        let right = mid.follow(&Connection {
            target: NodeId(3),
            parity: Parity::Even,
        });

        // mid plus one parent link per branch
        assert_eq!(Arc::strong_count(&mid.history), 3);
        assert_eq!(left.history.to_path(), vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(right.history.to_path(), vec![NodeId(0), NodeId(1), NodeId(3)]);
        assert_eq!(right.history.iter().count(), 3);
        assert_eq!(left.time, 2);
        assert_eq!(right.time, 3);
    }
}
