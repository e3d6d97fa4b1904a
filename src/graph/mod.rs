//! Graph model for parity-constrained path search
//!
//! Nodes are stored in an arena owned by the [`Graph`] and addressed by
//! [`NodeId`]. The topology is fixed once [`GraphBuilder::build`] returns; the
//! only state that changes afterwards is each node's best-arrival cell, which
//! the parallel search reads and lowers concurrently.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use log::warn;
use thiserror::Error;

/// Sentinel for "not reached yet" / "no solution"
pub const UNREACHED: u32 = u32::MAX;

/// Errors raised while constructing a graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("self-loop detected: node '{0}' cannot connect to itself")]
    SelfLoop(String),
    #[error("invalid parity value '{0}', only 'odd' or 'even' are allowed")]
    InvalidParity(String),
}

/// Time parity on which a connection can be traversed without waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    /// Parity of an elapsed-time count
    pub fn of(time: u32) -> Self {
        if time % 2 == 0 {
            Parity::Even
        } else {
            Parity::Odd
        }
    }

    /// Steps needed to traverse a connection of this parity when leaving at `time`.
    ///
    /// A matching parity costs a single step. Otherwise the traveller waits one
    /// step at the node first, so the move costs two.
    pub fn traversal_cost(self, time: u32) -> u32 {
        if Parity::of(time) == self {
            1
        } else {
            2
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parity::Even => write!(f, "even"),
            Parity::Odd => write!(f, "odd"),
        }
    }
}

impl FromStr for Parity {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "even" => Ok(Parity::Even),
            "odd" => Ok(Parity::Odd),
            _ => Err(GraphError::InvalidParity(s.to_string())),
        }
    }
}

/// Index of a node inside its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One direction of an undirected edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub target: NodeId,
    pub parity: Parity,
}

#[derive(Debug)]
pub struct Node {
    name: String,
    connections: Vec<Connection>,
    /// Fastest arrival seen during the current search
    best_arrival: AtomicU32,
}

impl Node {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connections: Vec::new(),
            best_arrival: AtomicU32::new(UNREACHED),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Best arrival time recorded for this node, [`UNREACHED`] if none
    pub fn best_arrival(&self) -> u32 {
        self.best_arrival.load(Ordering::Acquire)
    }

    /// Record an arrival at `time`, returning the record it was compared against.
    ///
    /// The first arrival claims the empty cell and gets its own time back. Later
    /// arrivals get the record as it stood before their update; when `time` is
    /// strictly better the cell is lowered with a compare-and-retry loop, so it
    /// never moves upwards under concurrent updates.
    pub fn record_arrival(&self, time: u32) -> u32 {
        let earliest = match self.best_arrival.compare_exchange(
            UNREACHED,
            time,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => return time,
            Err(current) => current,
        };

        let mut current = earliest;
        while time < current {
            match self.best_arrival.compare_exchange_weak(
                current,
                time,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(previous) => {
                    debug_assert!(time < previous, "best arrival must not regress");
                    break;
                }
                Err(actual) => current = actual,
            }
        }
        earliest
    }

    fn reset(&mut self) {
        *self.best_arrival.get_mut() = UNREACHED;
    }
}

/// Outcome of [`GraphBuilder::add_edge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsert {
    Inserted,
    /// Same unordered pair with the same parity already present
    Duplicate,
}

/// Incremental graph construction
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    by_name: HashMap<String, NodeId>,
    edge_count: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_create(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name));
        self.by_name.insert(name.to_string(), id);
        id
    }

    fn has_connection(&self, from: NodeId, to: NodeId, parity: Parity) -> bool {
        self.nodes[from.0]
            .connections
            .iter()
            .any(|c| c.target == to && c.parity == parity)
    }

    /// Add an undirected edge between `source` and `target`.
    ///
    /// Both nodes are created on first mention. Self-loops are rejected before
    /// any node is created.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        parity: Parity,
    ) -> Result<EdgeInsert, GraphError> {
        if source == target {
            return Err(GraphError::SelfLoop(source.to_string()));
        }

        let source_id = self.get_or_create(source);
        let target_id = self.get_or_create(target);

        if self.has_connection(source_id, target_id, parity)
            || self.has_connection(target_id, source_id, parity)
        {
            warn!(
                "duplicate connection between '{}' and '{}' with timestep '{}', skipping",
                source, target, parity
            );
            return Ok(EdgeInsert::Duplicate);
        }

        self.nodes[source_id.0].connections.push(Connection {
            target: target_id,
            parity,
        });
        self.nodes[target_id.0].connections.push(Connection {
            target: source_id,
            parity,
        });
        self.edge_count += 1;
        Ok(EdgeInsert::Inserted)
    }

    /// Same as [`add_edge`](Self::add_edge) with the parity given as text
    pub fn add_edge_str(
        &mut self,
        source: &str,
        target: &str,
        parity: &str,
    ) -> Result<EdgeInsert, GraphError> {
        let parity = parity.parse::<Parity>()?;
        self.add_edge(source, target, parity)
    }

    pub fn build(self) -> Graph {
        Graph {
            nodes: self.nodes,
            by_name: self.by_name,
            edge_count: self.edge_count,
        }
    }
}

/// Undirected graph with parity-tagged edges
#[derive(Debug)]
pub struct Graph {
    nodes: Vec<Node>,
    by_name: HashMap<String, NodeId>,
    edge_count: usize,
}

impl Graph {
    /// Build a graph from `(source, target, parity)` triples
    pub fn from_edges<'a, I>(edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (&'a str, &'a str, Parity)>,
    {
        let mut builder = GraphBuilder::new();
        for (source, target, parity) in edges {
            builder.add_edge(source, target, parity)?;
        }
        Ok(builder.build())
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Name of a node. Panics on an id from another graph.
    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of accepted undirected edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Format a path as `A -> B -> C`
    pub fn format_path(&self, path: &[NodeId]) -> String {
        path.iter()
            .map(|&id| self.name(id))
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Clear all per-node search bookkeeping
    pub fn reset_search_state(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
    }
}
