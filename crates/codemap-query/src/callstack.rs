//! `get_call_stack`: bounded BFS over `calls` edges, in either direction,
//! with per-root cycle detection and breadcrumb paths.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use codemap_core::{EdgeKind, Node, NodeId, Store};

use crate::error::{CodemapError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Both,
}

impl Direction {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "both" => Ok(Direction::Both),
            other => Err(CodemapError::InvalidInput(format!("unknown direction {other:?}"))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CallStackHit {
    pub node: Node,
    /// `origin > ... > node`, disambiguating identically-named nodes
    /// reached at different depths.
    pub breadcrumb: String,
    pub depth: u32,
    pub cycle: bool,
}

#[derive(Debug, Serialize)]
pub struct CallStackResult {
    /// One group per origin node that matched `node_name`.
    pub origins: Vec<OriginResult>,
}

#[derive(Debug, Serialize)]
pub struct OriginResult {
    pub origin: Node,
    pub hits: Vec<CallStackHit>,
}

pub fn get_call_stack(
    store: &Store,
    node_name: &str,
    file_path: Option<&str>,
    direction: Direction,
    depth: u32,
) -> Result<CallStackResult> {
    if !(1..=10).contains(&depth) {
        return Err(CodemapError::InvalidInput(format!("depth {depth} out of range [1, 10]")));
    }

    let origins = store.nodes_by_name(node_name, file_path)?;
    if origins.is_empty() {
        return Err(CodemapError::NotFound(format!("no symbol named {node_name:?}")));
    }

    let mut results = Vec::with_capacity(origins.len());
    for origin in origins {
        let hits = traverse_from(store, &origin, direction, depth)?;
        results.push(OriginResult { origin, hits });
    }
    Ok(CallStackResult { origins: results })
}

fn traverse_from(store: &Store, origin: &Node, direction: Direction, depth: u32) -> Result<Vec<CallStackHit>> {
    let mut hits = Vec::new();
    match direction {
        Direction::Up => traverse_direction(store, origin, Hop::Up, depth, &mut hits)?,
        Direction::Down => traverse_direction(store, origin, Hop::Down, depth, &mut hits)?,
        Direction::Both => {
            traverse_direction(store, origin, Hop::Up, depth, &mut hits)?;
            traverse_direction(store, origin, Hop::Down, depth, &mut hits)?;
        }
    }
    Ok(hits)
}

#[derive(Clone, Copy)]
enum Hop {
    Up,
    Down,
}

struct Frame {
    id: NodeId,
    breadcrumb: String,
    depth: u32,
}

fn traverse_direction(store: &Store, origin: &Node, hop: Hop, depth: u32, hits: &mut Vec<CallStackHit>) -> Result<()> {
    let mut visited = HashSet::new();
    visited.insert(origin.id);

    let mut queue = VecDeque::new();
    queue.push_back(Frame {
        id: origin.id,
        breadcrumb: origin.name.clone(),
        depth: 0,
    });

    while let Some(frame) = queue.pop_front() {
        if frame.depth == depth {
            continue;
        }
        let edges = match hop {
            Hop::Up => store.edges_to(frame.id, Some(EdgeKind::Calls))?,
            Hop::Down => store.edges_from(frame.id, Some(EdgeKind::Calls))?,
        };
        for edge in edges {
            let next_id = match hop {
                Hop::Up => edge.from_id,
                Hop::Down => edge.to_id,
            };
            let Some(next_node) = store.node_by_id(next_id)? else { continue };
            let breadcrumb = format!("{} > {}", frame.breadcrumb, next_node.name);

            if visited.contains(&next_id) {
                hits.push(CallStackHit {
                    node: next_node,
                    breadcrumb,
                    depth: frame.depth + 1,
                    cycle: true,
                });
                continue;
            }
            visited.insert(next_id);
            hits.push(CallStackHit {
                node: next_node,
                breadcrumb: breadcrumb.clone(),
                depth: frame.depth + 1,
                cycle: false,
            });
            queue.push_back(Frame {
                id: next_id,
                breadcrumb,
                depth: frame.depth + 1,
            });
        }
    }
    Ok(())
}
