use super::*;

//-----------------------------------------------------------------------------

#[test]
fn edge_id_orientations() {
    let id = EdgeId::new(6);
    assert!(id.is_forward(), "Even identifier is not forward");
    assert_eq!(id.rc(), EdgeId::new(7), "Wrong complement identifier");
    assert_eq!(id.rc().rc(), id, "Double rc() is not the identity");
    assert_eq!(id.signed(), 4, "Wrong signed value");
    assert_eq!(id.rc().signed(), -4, "Wrong signed value for a complement");
}

#[test]
fn edge_pairs() {
    let mut graph = AssemblyGraph::new();
    let n1 = graph.add_node();
    let n2 = graph.add_node();
    let c2 = graph.add_node();
    let c1 = graph.add_node();
    let (forward, complement) = graph.add_edge_pair(n1, n2, c2, c1, 5000, 30);

    assert_eq!(graph.node_count(), 4, "Wrong number of nodes");
    assert_eq!(graph.edge_count(), 2, "Wrong number of edges");
    assert_eq!(graph.complement_edge(forward), complement, "Wrong complement twin");
    assert_eq!(graph.complement_edge(complement), forward, "Complement is not an involution");
    assert_eq!(graph.edge(forward).id.rc(), graph.edge(complement).id, "Identifiers are not paired");
    assert_eq!(graph.edge(forward).length, graph.edge(complement).length, "Twin lengths differ");

    assert_eq!(graph.node(n1).out_edges, vec![forward], "Edge not registered at its left node");
    assert_eq!(graph.node(n2).in_edges, vec![forward], "Edge not registered at its right node");
    assert!(graph.has_edge(graph.edge(forward).id), "Edge identifier not registered");
    assert_eq!(graph.edge_index(graph.edge(complement).id), Some(complement), "Wrong index lookup");
}

#[test]
fn self_complement_edges() {
    let mut graph = AssemblyGraph::new();
    let n1 = graph.add_node();
    let n2 = graph.add_node();
    let id = graph.new_edge_id();
    let edge = graph.add_edge(n1, n2, id, 1000, 20);
    graph.mark_self_complement(edge);

    assert!(graph.edge(edge).self_complement, "Self-complement flag not set");
    assert_eq!(graph.complement_edge(edge), edge, "Self-complement edge is not its own twin");
}

#[test]
fn fresh_edge_ids() {
    let mut graph = AssemblyGraph::new();
    let n1 = graph.add_node();
    let n2 = graph.add_node();
    let first = graph.new_edge_id();
    graph.add_edge(n1, n2, first, 100, 1);
    graph.add_edge(n2, n1, first.rc(), 100, 1);
    let second = graph.new_edge_id();
    assert!(second.is_forward(), "Minted identifier is not forward");
    assert_ne!(second, first, "Minted identifier collides");
    assert_ne!(second, first.rc(), "Minted identifier collides with a complement");
    assert!(!graph.has_edge(second), "Fresh identifier already registered");
}

#[test]
fn links() {
    let mut graph = AssemblyGraph::new();
    let nodes: Vec<NodeIndex> = (0..8).map(|_| graph.add_node()).collect();
    let (in_fwd, in_rc) = graph.add_edge_pair(nodes[0], nodes[1], nodes[5], nodes[4], 100, 10);
    let (out_fwd, out_rc) = graph.add_edge_pair(nodes[2], nodes[3], nodes[7], nodes[6], 100, 10);

    graph.link_edges(in_fwd, out_fwd);
    graph.link_edges(out_rc, in_rc);

    assert_eq!(graph.edge(in_fwd).right_link, Some(graph.edge(out_fwd).id), "Wrong right link");
    assert_eq!(graph.edge(out_fwd).left_link, Some(graph.edge(in_fwd).id), "Wrong left link");
    assert_eq!(
        graph.edge(out_rc).right_link, Some(graph.edge(in_rc).id),
        "Wrong mirrored right link"
    );
    assert_eq!(
        graph.edge(in_rc).left_link, Some(graph.edge(out_rc).id),
        "Wrong mirrored left link"
    );
}

#[test]
fn edge_sequences() {
    let mut graph = AssemblyGraph::new();
    let sequence = DnaSequence::new(b"ACGTACGT");
    let id = graph.add_edge_sequence(&sequence, 2, 4, "edge_1");
    assert_eq!(graph.edge_sequences().get_seq(id).bases(), b"GTAC", "Wrong stored slice");
    assert_eq!(graph.edge_sequences().get_seq(id.rc()).bases(), b"GTAC", "Wrong complement slice");
    assert_eq!(graph.edge_sequences().seq_name(id), "edge_1", "Wrong sequence name");
}

//-----------------------------------------------------------------------------
