//! Read-to-graph alignments.
//!
//! A [`GraphAlignment`] is the path of graph edges a read aligns to, with the
//! read coordinates of each edge. Alignments are produced by an external
//! aligner; this module defines the records, the per-edge alignment index the
//! complex-variant resolver consumes, and the [`Aligner`] interface through
//! which the resolver requests the index and asks for a refresh after the
//! graph has been rewritten.

use crate::graph::{AssemblyGraph, EdgeIndex};
use crate::overlap::Overlap;

use log::debug;

use std::collections::HashMap;

//-----------------------------------------------------------------------------

/// The alignment of a read to a single graph edge.
///
/// The `cur` side of the overlap holds the read coordinates; the read itself
/// is `overlap.cur_id`.
#[derive(Clone, Debug)]
pub struct EdgeAlignment {
    /// The edge the read aligns to.
    pub edge: EdgeIndex,
    /// The read interval covering the edge.
    pub overlap: Overlap,
}

/// The alignment of a read to a path of graph edges.
pub type GraphAlignment = Vec<EdgeAlignment>;

/// Alignments grouped by the edges they touch.
pub type AlignmentIndex = HashMap<EdgeIndex, Vec<GraphAlignment>>;

//-----------------------------------------------------------------------------

/// The interface of an external read-to-graph aligner.
pub trait Aligner {
    /// Returns the alignments grouped by edge: an alignment is listed under
    /// every distinct edge it touches.
    fn make_alignment_index(&self, graph: &AssemblyGraph) -> AlignmentIndex;

    /// Refreshes the alignments against a rewritten graph.
    fn update_alignments(&mut self, graph: &AssemblyGraph);
}

//-----------------------------------------------------------------------------

/// An [`Aligner`] over a fixed set of pre-computed alignments.
///
/// Collapsing rewires nodes but never removes edges, so pre-computed
/// alignments stay valid; the refresh is a no-op.
#[derive(Clone, Debug, Default)]
pub struct StaticAligner {
    alignments: Vec<GraphAlignment>,
}

impl StaticAligner {
    /// Creates an aligner holding the given alignments.
    pub fn new(alignments: Vec<GraphAlignment>) -> Self {
        StaticAligner { alignments }
    }
}

impl Aligner for StaticAligner {
    fn make_alignment_index(&self, _: &AssemblyGraph) -> AlignmentIndex {
        let mut index: AlignmentIndex = HashMap::new();
        for alignment in self.alignments.iter() {
            let mut seen: Vec<EdgeIndex> = Vec::new();
            for edge_aln in alignment.iter() {
                if !seen.contains(&edge_aln.edge) {
                    seen.push(edge_aln.edge);
                    index.entry(edge_aln.edge).or_default().push(alignment.clone());
                }
            }
        }
        index
    }

    fn update_alignments(&mut self, _: &AssemblyGraph) {
        debug!("Keeping {} static alignments", self.alignments.len());
    }
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
