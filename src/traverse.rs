//! Graph traversal utilities.
//!
//! This module provides the traversals shared by the haplotype resolvers:
//! enumeration of unbranching paths, a depth-bounded DFS that finds a witness
//! path through a suspected bubble, and a bounded Dijkstra search used for
//! superbubble detection.

use crate::graph::{AssemblyGraph, EdgeId, EdgeIndex, NodeIndex};

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};


//-----------------------------------------------------------------------------

/// A maximal path whose internal nodes have exactly one in-edge and one
/// out-edge.
///
/// Unbranching paths cover the graph: every edge belongs to exactly one.
/// Paths come in complement pairs with paired identifiers, like edges; the
/// identifiers live in their own namespace and are stable only within one
/// enumeration.
#[derive(Clone, Debug)]
pub struct UnbranchingPath {
    /// Identifier of the path within this enumeration.
    pub id: EdgeId,
    /// The edges of the path, in order.
    pub path: Vec<EdgeIndex>,
    /// The node the path starts from.
    pub node_left: NodeIndex,
    /// The node the path ends at.
    pub node_right: NodeIndex,
    /// Total length of the path in bases.
    pub length: usize,
    /// Length-weighted mean coverage of the path.
    pub mean_coverage: i32,
}

impl UnbranchingPath {
    /// Returns `true` if the path starts and ends at the same node.
    pub fn is_looped(&self) -> bool {
        self.node_left == self.node_right
    }
}

/// Returns the unbranching paths covering the graph.
///
/// Paths are reported in the graph's intrinsic edge order: a path is listed
/// when its first edge is reached. The complement of a reported path is also
/// reported, with the complement identifier, unless the path is its own
/// complement.
pub fn unbranching_paths(graph: &AssemblyGraph) -> Vec<UnbranchingPath> {
    let mut visited = vec![false; graph.edge_count()];
    let mut raw_paths: Vec<Vec<EdgeIndex>> = Vec::new();

    // Paths starting at branching nodes.
    for edge in 0..graph.edge_count() {
        if visited[edge] || graph.node(graph.edge(edge).node_left).is_simple() {
            continue;
        }
        let mut path = vec![edge];
        visited[edge] = true;
        let mut cur = edge;
        loop {
            let right = graph.node(graph.edge(cur).node_right);
            if !right.is_simple() {
                break;
            }
            let next = right.out_edges[0];
            if visited[next] {
                break;
            }
            visited[next] = true;
            path.push(next);
            cur = next;
        }
        raw_paths.push(path);
    }

    // The remaining edges lie on isolated cycles where every node is simple.
    for edge in 0..graph.edge_count() {
        if visited[edge] {
            continue;
        }
        let mut path = vec![edge];
        visited[edge] = true;
        let mut cur = edge;
        loop {
            let next = graph.node(graph.edge(cur).node_right).out_edges[0];
            if next == edge || visited[next] {
                break;
            }
            visited[next] = true;
            path.push(next);
            cur = next;
        }
        raw_paths.push(path);
    }

    // Pair each path with its complement and assign paired identifiers.
    let mut owner = vec![usize::MAX; graph.edge_count()];
    for (index, path) in raw_paths.iter().enumerate() {
        for &edge in path {
            owner[edge] = index;
        }
    }
    let mut ids: Vec<Option<EdgeId>> = vec![None; raw_paths.len()];
    let mut next_id = 0;
    for index in 0..raw_paths.len() {
        if ids[index].is_some() {
            continue;
        }
        let id = EdgeId::new(next_id);
        next_id += 2;
        ids[index] = Some(id);
        let complement = owner[graph.complement_edge(raw_paths[index][0])];
        if complement != index {
            ids[complement] = Some(id.rc());
        }
    }

    let mut result = Vec::with_capacity(raw_paths.len());
    for (index, path) in raw_paths.into_iter().enumerate() {
        let mut length = 0;
        let mut weighted_coverage = 0;
        for &edge in &path {
            length += graph.edge(edge).length;
            weighted_coverage += (graph.edge(edge).length as i64) * (graph.edge(edge).mean_coverage as i64);
        }
        let mean_coverage = (weighted_coverage / (length.max(1) as i64)) as i32;
        result.push(UnbranchingPath {
            id: ids[index].unwrap_or(EdgeId::new(0)),
            node_left: graph.edge(path[0]).node_left,
            node_right: graph.edge(path[path.len() - 1]).node_right,
            length,
            mean_coverage,
            path,
        });
    }
    result
}

//-----------------------------------------------------------------------------

struct PathWithLen {
    path: Vec<EdgeIndex>,
    length: usize,
}

/// Returns a path from the given edge whose accumulated length exceeds
/// `max_depth`, found by depth-first search.
///
/// The first edge does not count towards the length. A path never revisits an
/// edge already on it, and looped edges shorter than `max_depth` are not
/// entered. If no path is long enough, the longest dead-end path is returned;
/// if there is none, the result is empty.
pub fn any_path(graph: &AssemblyGraph, start: EdgeIndex, max_depth: usize) -> Vec<EdgeIndex> {
    let mut dead_ends: Vec<PathWithLen> = Vec::new();
    let mut queue = vec![PathWithLen { path: vec![start], length: 0 }];

    while let Some(cur) = queue.pop() {
        // Found a path that is long enough.
        if cur.length > max_depth {
            return cur.path;
        }

        let mut dead_end = true;
        let right = graph.edge(cur.path[cur.path.len() - 1]).node_right;
        for &next in &graph.node(right).out_edges {
            if cur.path.contains(&next) {
                continue;
            }
            let next_edge = graph.edge(next);
            if next_edge.is_looped() && next_edge.length < max_depth {
                continue;
            }
            dead_end = false;
            let mut new_path = cur.path.clone();
            new_path.push(next);
            queue.push(PathWithLen { path: new_path, length: cur.length + next_edge.length });
        }
        if dead_end {
            dead_ends.push(cur);
        }
    }

    // No path over `max_depth`; return the longest dead end.
    let mut best: Option<&PathWithLen> = None;
    for candidate in dead_ends.iter() {
        if best.map_or(true, |b| candidate.length > b.length) {
            best = Some(candidate);
        }
    }
    best.map_or(Vec::new(), |b| b.path.clone())
}

//-----------------------------------------------------------------------------

/// Shortest-path distances from a source edge, with a failure flag set if a
/// tentative distance exceeded the bound.
#[derive(Clone, Debug, Default)]
pub struct DijkstraResult {
    /// Distance to each reachable edge. The source and the sink are excluded.
    pub dist: HashMap<EdgeIndex, usize>,
    /// A tentative distance exceeded the bound and the search was abandoned.
    pub failure: bool,
}

/// Computes shortest-path distances from `source` to the edges reachable
/// without traversing `sink` outbound.
///
/// The weight of an edge is its length plus one, so that zero-length edges
/// still contribute to the distance. If any tentative distance exceeds
/// `max_bubble`, the search stops with the failure flag set.
pub fn shortest_paths_from(
    graph: &AssemblyGraph,
    source: EdgeIndex, sink: EdgeIndex,
    max_bubble: usize,
) -> DijkstraResult {
    let mut result = DijkstraResult::default();
    let mut queue: BinaryHeap<Reverse<(usize, EdgeIndex)>> = BinaryHeap::new();
    let mut closed: HashSet<EdgeIndex> = HashSet::new();

    result.dist.insert(source, 0);
    queue.push(Reverse((0, source)));
    while let Some(Reverse((dist, edge))) = queue.pop() {
        if !closed.insert(edge) {
            continue;
        }
        let right = graph.edge(edge).node_right;
        for &next in &graph.node(right).out_edges {
            if next == sink {
                continue;
            }
            let new_dist = dist + graph.edge(next).length + 1;
            if result.dist.get(&next).map_or(true, |&d| new_dist < d) {
                if new_dist > max_bubble {
                    result.failure = true;
                    return result;
                }
                result.dist.insert(next, new_dist);
                queue.push(Reverse((new_dist, next)));
            }
        }
    }

    result.dist.remove(&source);
    result
}

//-----------------------------------------------------------------------------
