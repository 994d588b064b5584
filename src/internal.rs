use crate::alignment::{EdgeAlignment, GraphAlignment};
use crate::graph::{AssemblyGraph, EdgeIndex, NodeIndex};
use crate::overlap::Overlap;
use crate::sequence::{DnaSequence, SeqId};

//-----------------------------------------------------------------------------

// A builder for perfectly mirrored test graphs: every node and edge is created
// together with its complement twin.

pub(crate) struct MirrorGraph {
    pub(crate) graph: AssemblyGraph,
}

impl MirrorGraph {
    pub(crate) fn new() -> Self {
        MirrorGraph { graph: AssemblyGraph::new() }
    }

    // Returns (node, complement node).
    pub(crate) fn add_node(&mut self) -> (NodeIndex, NodeIndex) {
        let forward = self.graph.add_node();
        let complement = self.graph.add_node();
        (forward, complement)
    }

    // Adds an edge between node pairs, with its twin between the complement
    // nodes in the opposite direction. Returns (edge, complement edge).
    pub(crate) fn add_edge(
        &mut self,
        from: (NodeIndex, NodeIndex), to: (NodeIndex, NodeIndex),
        length: usize, coverage: i32,
    ) -> (EdgeIndex, EdgeIndex) {
        self.graph.add_edge_pair(from.0, to.0, to.1, from.1, length, coverage)
    }

    // Adds an edge pair carrying the given sequence.
    pub(crate) fn add_edge_with_seq(
        &mut self,
        from: (NodeIndex, NodeIndex), to: (NodeIndex, NodeIndex),
        coverage: i32, bases: &[u8],
    ) -> (EdgeIndex, EdgeIndex) {
        let (forward, complement) = self.add_edge(from, to, bases.len(), coverage);
        let name = format!("edge_{}", self.graph.edge(forward).id);
        let sequence = DnaSequence::new(bases);
        let seq_id = self.graph.add_edge_sequence(&sequence, 0, sequence.len(), &name);
        self.graph.edge_mut(forward).sequence = Some(seq_id);
        self.graph.edge_mut(complement).sequence = Some(seq_id.rc());
        (forward, complement)
    }
}

//-----------------------------------------------------------------------------

// Builders for read-to-graph alignments.

// An alignment of a read along the given edges, with the read interval of
// each edge supplied as (cur_begin, cur_end).
pub(crate) fn read_alignment(
    read: SeqId, read_len: i32,
    edges: &[(EdgeIndex, i32, i32)],
) -> GraphAlignment {
    edges.iter().map(|&(edge, cur_begin, cur_end)| {
        EdgeAlignment {
            edge,
            overlap: Overlap {
                cur_id: read, cur_begin, cur_end, cur_len: read_len,
                ext_id: read, ext_begin: cur_begin, ext_end: cur_end, ext_len: read_len,
            },
        }
    }).collect()
}

//-----------------------------------------------------------------------------
