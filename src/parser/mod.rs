//! Edge-list reader for the DOT-like graph format
//!
//! Each edge lives on its own line:
//!
//! ```text
//! "AA" -- "BA" [timestep="odd"];
//! ```
//!
//! Lines that do not match the edge pattern (`graph G {`, `}`, comments,
//! blank lines) are skipped.

use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use thiserror::Error;

use crate::graph::{Graph, GraphBuilder, GraphError};

lazy_static! {
    static ref EDGE_RE: Regex =
        Regex::new(r#"\s*"(.+?)"\s*--\s*"(.+?)"\s*\[timestep="(.+?)"\];"#)
            .expect("edge pattern is a valid regex");
}

/// Errors raised while reading an edge list
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line_number}: {source}\n  | {line_content}")]
    Graph {
        line_number: usize,
        line_content: String,
        #[source]
        source: GraphError,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// 1-based line of the offending edge, if the error came from a line
    pub fn line_number(&self) -> Option<usize> {
        match self {
            ParseError::Graph { line_number, .. } => Some(*line_number),
            ParseError::Io { .. } => None,
        }
    }
}

/// A single edge as written in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLine<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub timestep: &'a str,
}

/// Match one line against the edge pattern. Returns `None` for boilerplate.
pub fn parse_edge_line(line: &str) -> Option<EdgeLine<'_>> {
    let caps = EDGE_RE.captures(line)?;
    Some(EdgeLine {
        source: caps.get(1)?.as_str(),
        target: caps.get(2)?.as_str(),
        timestep: caps.get(3)?.as_str(),
    })
}

/// Build a graph from edge-list text
pub fn parse_edge_list(content: &str) -> Result<Graph, ParseError> {
    let mut builder = GraphBuilder::new();
    let mut skipped = 0usize;

    for (index, line) in content.lines().enumerate() {
        let Some(edge) = parse_edge_line(line) else {
            if !line.trim().is_empty() {
                skipped += 1;
            }
            continue;
        };

        builder
            .add_edge_str(edge.source, edge.target, edge.timestep)
            .map_err(|source| ParseError::Graph {
                line_number: index + 1,
                line_content: line.to_string(),
                source,
            })?;
    }

    let graph = builder.build();
    debug!(
        "parsed {} nodes and {} edges ({} non-edge lines skipped)",
        graph.node_count(),
        graph.edge_count(),
        skipped
    );
    Ok(graph)
}

/// Read and parse an edge-list file
pub fn load_edge_list(path: &Path) -> Result<Graph, ParseError> {
    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_edge_list(&content)
}
