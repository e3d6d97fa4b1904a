//! Parallel search for all shortest-time paths through graphs whose edges can
//! only be crossed on even or odd time steps.
//!
//! ```ignore
//! use parity_paths::{parser, search};
//!
//! let mut graph = parser::parse_edge_list(text)?;
//! let start = graph.node_id("AA").unwrap();
//! let destination = graph.node_id("ZZ").unwrap();
//! let result = search::find_shortest_paths(
//!     &mut graph,
//!     start,
//!     destination,
//!     &search::SearchConfig::default(),
//! )?;
//! println!("{}", result.display(&graph));
//! ```

pub mod graph;
pub mod parser;
pub mod search;

pub use graph::{Connection, Graph, GraphBuilder, GraphError, Node, NodeId, Parity, UNREACHED};
pub use parser::{ParseError, load_edge_list, parse_edge_list};
pub use search::{SearchConfig, SearchError, SearchResult, find_shortest_paths};
