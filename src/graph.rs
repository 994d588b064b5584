//! The bi-directed assembly graph.
//!
//! Nodes and edges live in index arenas owned by [`AssemblyGraph`]; an edge or
//! node is identified by its offset in the arena, so graph elements never hold
//! pointers to each other. Every edge has a complement twin representing the
//! reverse-complement strand, found through the paired [`EdgeId`] values, and
//! every mutation is expected to be mirrored on the twin.
//!
//! Edges carry the mutable state used during haplotype resolution: the
//! `alt_haplotype` mask and the `left_link` / `right_link` pointers naming the
//! edges to be joined when a resolved variant is collapsed. Links are stored
//! as edge identifiers rather than indices, which keeps them meaningful while
//! the graph is being rewritten.

use crate::sequence::{DnaSequence, SeqId, SequenceContainer};

use std::collections::HashMap;
use std::fmt::Display;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// An identifier of an oriented edge.
///
/// Like [`SeqId`], identifiers come in pairs: the forward orientation is even
/// and the reverse complement orientation is the following odd value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(u32);

impl EdgeId {
    /// Creates an identifier from a raw value.
    pub fn new(value: u32) -> Self {
        EdgeId(value)
    }

    /// Returns the identifier of the complement edge.
    pub fn rc(self) -> Self {
        EdgeId(self.0 ^ 1)
    }

    /// Returns `true` if this is the forward orientation.
    pub fn is_forward(self) -> bool {
        self.0 & 1 == 0
    }

    /// Returns the raw value of the identifier.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Returns the identifier as a signed number: positive for the forward
    /// orientation and negative for the complement, offset by one.
    pub fn signed(self) -> i64 {
        let id = (self.0 >> 1) as i64 + 1;
        if self.is_forward() { id } else { -id }
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.signed())
    }
}

/// An offset in the node arena of an [`AssemblyGraph`].
pub type NodeIndex = usize;

/// An offset in the edge arena of an [`AssemblyGraph`].
pub type EdgeIndex = usize;

//-----------------------------------------------------------------------------

/// A node of the assembly graph: the junction between edges.
#[derive(Clone, Debug, Default)]
pub struct Node {
    /// Edges ending at this node.
    pub in_edges: Vec<EdgeIndex>,
    /// Edges starting at this node.
    pub out_edges: Vec<EdgeIndex>,
}

impl Node {
    /// Returns `true` if the node has exactly one in-edge and one out-edge.
    pub fn is_simple(&self) -> bool {
        self.in_edges.len() == 1 && self.out_edges.len() == 1
    }
}

/// An oriented edge of the assembly graph.
#[derive(Clone, Debug)]
pub struct Edge {
    /// Identifier of the edge; the complement twin has the paired identifier.
    pub id: EdgeId,
    /// The node the edge starts from.
    pub node_left: NodeIndex,
    /// The node the edge ends at.
    pub node_right: NodeIndex,
    /// Length of the edge sequence in bases.
    pub length: usize,
    /// Mean read coverage of the edge.
    pub mean_coverage: i32,
    /// The edge is its own complement.
    pub self_complement: bool,
    /// The edge represents a non-reference allele destined for collapse.
    pub alt_haplotype: bool,
    /// The edge to be joined to the left end, if a variant has been resolved.
    pub left_link: Option<EdgeId>,
    /// The edge to be joined to the right end, if a variant has been resolved.
    pub right_link: Option<EdgeId>,
    /// The sequence of the edge in the graph's edge-sequence store.
    pub sequence: Option<SeqId>,
}

impl Edge {
    /// Returns `true` if the edge starts and ends at the same node.
    pub fn is_looped(&self) -> bool {
        self.node_left == self.node_right
    }
}

//-----------------------------------------------------------------------------

/// A bi-directed assembly graph with complement twin edges.
///
/// The graph owns its nodes, edges, and edge sequences. Graph construction is
/// the caller's responsibility; the invariant maintained here is that every
/// registered edge identifier resolves to an edge, and that the complement of
/// a registered edge is registered as well (an edge may be its own
/// complement, see [`AssemblyGraph::mark_self_complement`]).
#[derive(Clone, Debug, Default)]
pub struct AssemblyGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    id_to_edge: HashMap<EdgeId, EdgeIndex>,
    edge_seqs: SequenceContainer,
    next_edge_id: u32,
}

impl AssemblyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        AssemblyGraph::default()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Adds a node and returns its index.
    pub fn add_node(&mut self) -> NodeIndex {
        self.nodes.push(Node::default());
        self.nodes.len() - 1
    }

    /// Adds an edge between the given nodes and returns its index.
    ///
    /// The identifier must not be in use. The caller is responsible for adding
    /// the complement twin with the paired identifier.
    pub fn add_edge(
        &mut self,
        node_left: NodeIndex, node_right: NodeIndex,
        id: EdgeId, length: usize, mean_coverage: i32,
    ) -> EdgeIndex {
        let index = self.edges.len();
        self.edges.push(Edge {
            id, node_left, node_right, length, mean_coverage,
            self_complement: false,
            alt_haplotype: false,
            left_link: None, right_link: None,
            sequence: None,
        });
        self.id_to_edge.insert(id, index);
        self.nodes[node_left].out_edges.push(index);
        self.nodes[node_right].in_edges.push(index);
        self.next_edge_id = self.next_edge_id.max((id.value() | 1) + 1);
        index
    }

    /// Adds an edge pair: the edge and its complement twin, with paired
    /// identifiers minted from the graph. Returns both indices.
    pub fn add_edge_pair(
        &mut self,
        node_left: NodeIndex, node_right: NodeIndex,
        comp_left: NodeIndex, comp_right: NodeIndex,
        length: usize, mean_coverage: i32,
    ) -> (EdgeIndex, EdgeIndex) {
        let id = self.new_edge_id();
        let forward = self.add_edge(node_left, node_right, id, length, mean_coverage);
        let complement = self.add_edge(comp_left, comp_right, id.rc(), length, mean_coverage);
        (forward, complement)
    }

    /// Marks the edge as self-complementary: the edge is its own complement
    /// twin, and both orientations of its identifier resolve to it.
    pub fn mark_self_complement(&mut self, edge: EdgeIndex) {
        self.edges[edge].self_complement = true;
        let id = self.edges[edge].id;
        self.id_to_edge.insert(id.rc(), edge);
    }

    /// Returns a reference to the node.
    pub fn node(&self, node: NodeIndex) -> &Node {
        &self.nodes[node]
    }

    /// Returns a mutable reference to the node.
    pub fn node_mut(&mut self, node: NodeIndex) -> &mut Node {
        &mut self.nodes[node]
    }

    /// Returns a reference to the edge.
    pub fn edge(&self, edge: EdgeIndex) -> &Edge {
        &self.edges[edge]
    }

    /// Returns a mutable reference to the edge.
    pub fn edge_mut(&mut self, edge: EdgeIndex) -> &mut Edge {
        &mut self.edges[edge]
    }

    /// Returns the index of the edge with the given identifier.
    pub fn edge_index(&self, id: EdgeId) -> Option<EdgeIndex> {
        self.id_to_edge.get(&id).copied()
    }

    /// Returns `true` if an edge with the given identifier exists.
    pub fn has_edge(&self, id: EdgeId) -> bool {
        self.id_to_edge.contains_key(&id)
    }

    /// Returns the index of the complement twin of the edge.
    ///
    /// # Panics
    ///
    /// Panics if the twin has not been added to the graph.
    pub fn complement_edge(&self, edge: EdgeIndex) -> EdgeIndex {
        self.id_to_edge[&self.edges[edge].id.rc()]
    }

    /// Installs the link joining two edges during collapse: `right_link` on
    /// the first edge and `left_link` on the second.
    ///
    /// The caller is responsible for mirroring the link on the complements.
    pub fn link_edges(&mut self, left: EdgeIndex, right: EdgeIndex) {
        let right_id = self.edges[right].id;
        let left_id = self.edges[left].id;
        self.edges[left].right_link = Some(right_id);
        self.edges[right].left_link = Some(left_id);
    }

    /// Mints a fresh forward edge identifier.
    pub fn new_edge_id(&mut self) -> EdgeId {
        let id = EdgeId::new(self.next_edge_id);
        self.next_edge_id += 2;
        id
    }

    /// Stores a slice of the given sequence as an edge sequence under the
    /// given name and returns its identifier.
    pub fn add_edge_sequence(&mut self, sequence: &DnaSequence, offset: usize, len: usize, name: &str) -> SeqId {
        self.edge_seqs.add_sequence(name, sequence.substr(offset, len))
    }

    /// Returns the edge-sequence store.
    pub fn edge_sequences(&self) -> &SequenceContainer {
        &self.edge_seqs
    }
}

//-----------------------------------------------------------------------------
