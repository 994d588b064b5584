//! Haplotype resolution on the assembly graph.
//!
//! Heterozygosity shows up in an assembly graph as local structures with
//! alternative paths between a shared entrance and exit: two-branch bulges,
//! single-edge loops, multi-branch variants visible only through read paths,
//! and superbubbles. [`HaplotypeResolver`] detects these structures, masks the
//! alternative-haplotype edges, and links each entrance to its exit together
//! with a bridging sequence. [`HaplotypeResolver::collapse_haplotypes`] then
//! materializes the links, producing a haploid topology.
//!
//! Detection phases only set flags and links; the graph is rewritten during
//! collapse alone. Every change is mirrored on the complement strand. A
//! typical pass runs one detection phase, collapses, and resets the links
//! before the next phase.

use crate::alignment::{Aligner, GraphAlignment};
use crate::config::Params;
use crate::graph::{AssemblyGraph, EdgeId, EdgeIndex};
use crate::sequence::{DnaSequence, SeqId, SequenceContainer};
use crate::traverse::{self, UnbranchingPath};

use log::{debug, warn};

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};


//-----------------------------------------------------------------------------

/// An alignment path together with the number of reads supporting it.
#[derive(Clone, Debug)]
pub struct PathWithScore {
    /// The alignment path.
    pub path: GraphAlignment,
    /// The number of reads merged into this path.
    pub score: u32,
}

/// A detected multi-branch variant.
///
/// Every branch starts with `start_edge` and ends with `end_edge`; the edges
/// in between are the alternative alleles.
#[derive(Clone, Debug)]
pub struct VariantPaths {
    /// The edge where the branches diverge.
    pub start_edge: EdgeIndex,
    /// The edge where the branches converge again.
    pub end_edge: EdgeIndex,
    /// The alternative branches with their supporting read counts.
    pub alt_paths: Vec<PathWithScore>,
}

//-----------------------------------------------------------------------------

/// Detects and collapses structural variants caused by alternative haplotypes.
///
/// The resolver borrows the graph mutably for its lifetime and owns the map of
/// bridging sequences registered by the detection phases. Detection phases
/// return the number of newly masked variants and degrade gracefully: broken
/// invariants are logged and the offending item is skipped.
pub struct HaplotypeResolver<'a, A: Aligner> {
    graph: &'a mut AssemblyGraph,
    aligner: &'a mut A,
    read_seqs: &'a SequenceContainer,
    params: &'a Params,
    bridging_seqs: HashMap<(EdgeId, EdgeId), DnaSequence>,
}

impl<'a, A: Aligner> HaplotypeResolver<'a, A> {
    /// Creates a resolver with an empty bridging-sequence map.
    pub fn new(
        graph: &'a mut AssemblyGraph,
        aligner: &'a mut A,
        read_seqs: &'a SequenceContainer,
        params: &'a Params,
    ) -> Self {
        HaplotypeResolver {
            graph,
            aligner,
            read_seqs,
            params,
            bridging_seqs: HashMap::new(),
        }
    }

    /// Returns the bridging sequence registered for the linked edge pair.
    pub fn bridging_sequence(&self, in_id: EdgeId, out_id: EdgeId) -> Option<&DnaSequence> {
        self.bridging_seqs.get(&(in_id, out_id))
    }

    /// Returns a view of the graph being resolved.
    pub fn graph(&self) -> &AssemblyGraph {
        self.graph
    }

    // Masks the edge and its complement as an alternative haplotype.
    fn mark_alt(&mut self, edge: EdgeIndex) {
        self.graph.edge_mut(edge).alt_haplotype = true;
        let complement = self.graph.complement_edge(edge);
        self.graph.edge_mut(complement).alt_haplotype = true;
    }

    // The concatenated sequence of the edges of a path; an empty concatenation
    // falls back to a single base.
    fn path_sequence(&self, path: &[EdgeIndex]) -> DnaSequence {
        let mut bases: Vec<u8> = Vec::new();
        for &edge in path {
            if let Some(seq_id) = self.graph.edge(edge).sequence {
                bases.extend(self.graph.edge_sequences().get_seq(seq_id).bases());
            }
        }
        if bases.is_empty() {
            bases.push(b'A');
        }
        DnaSequence::new(&bases)
    }

    // Registers the bridging sequence for the pair and the reverse complement
    // for the complement pair.
    fn register_bridge(&mut self, in_edge: EdgeIndex, out_edge: EdgeIndex, sequence: DnaSequence) {
        let in_id = self.graph.edge(in_edge).id;
        let out_id = self.graph.edge(out_edge).id;
        let comp_in_id = self.graph.edge(self.graph.complement_edge(in_edge)).id;
        let comp_out_id = self.graph.edge(self.graph.complement_edge(out_edge)).id;
        let complement = sequence.reverse_complement();
        self.bridging_seqs.insert((in_id, out_id), sequence);
        self.bridging_seqs.insert((comp_out_id, comp_in_id), complement);
    }

    //-------------------------------------------------------------------------

    /// Finds and masks simple two-branch bubbles caused by alternative
    /// haplotypes, returning the number of newly masked bubbles.
    ///
    /// A bubble has one entrance, two branches between the same pair of nodes,
    /// and one exit. Both branches are masked, the entrance is linked to the
    /// exit on both strands, and the lower-coverage branch provides the
    /// bridging sequence. No global coverage assumptions are used here.
    pub fn find_heterozygous_bulges(&mut self) -> usize {
        let max_bubble_len = self.params.max_bubble_length;
        let paths = traverse::unbranching_paths(self.graph);

        let mut to_separate: HashSet<EdgeId> = HashSet::new();
        let mut num_masked = 0;
        for path in paths.iter() {
            if path.is_looped() {
                continue;
            }

            let two_paths: Vec<&UnbranchingPath> = paths.iter()
                .filter(|cand| cand.node_left == path.node_left && cand.node_right == path.node_right)
                .collect();

            // Making sure the structure is ok.
            if two_paths.len() != 2 {
                continue;
            }
            if two_paths[0].id == two_paths[1].id.rc() {
                continue;
            }
            if to_separate.contains(&two_paths[0].id) || to_separate.contains(&two_paths[1].id) {
                continue;
            }
            let left = self.graph.node(two_paths[0].node_left);
            let right = self.graph.node(two_paths[0].node_right);
            if left.in_edges.len() != 1 || left.out_edges.len() != 2 ||
                right.out_edges.len() != 1 || right.in_edges.len() != 2 {
                continue;
            }

            let mut entrance: Option<&UnbranchingPath> = None;
            let mut exit: Option<&UnbranchingPath> = None;
            for cand in paths.iter() {
                if cand.node_right == two_paths[0].node_left {
                    entrance = Some(cand);
                }
                if cand.node_left == two_paths[0].node_right {
                    exit = Some(cand);
                }
            }
            let (Some(entrance), Some(exit)) = (entrance, exit) else {
                continue;
            };
            if entrance.id == exit.id || entrance.id == exit.id.rc() {
                continue;
            }

            // Sanity check for the maximum bubble size.
            if two_paths[0].length.max(two_paths[1].length) > max_bubble_len {
                continue;
            }

            // The lower-coverage branch provides the bridging sequence.
            let (lower, higher) = if two_paths[0].mean_coverage > two_paths[1].mean_coverage {
                (two_paths[1], two_paths[0])
            } else {
                (two_paths[0], two_paths[1])
            };

            if !self.graph.edge(lower.path[0]).alt_haplotype ||
                !self.graph.edge(higher.path[0]).alt_haplotype {
                num_masked += 1;
            }
            for branch in [lower, higher] {
                for &edge in branch.path.iter() {
                    self.mark_alt(edge);
                }
            }
            to_separate.insert(lower.id);
            to_separate.insert(higher.id);

            let in_edge = entrance.path[entrance.path.len() - 1];
            let out_edge = exit.path[0];
            debug!("Regular bubble: {} {}", self.graph.edge(in_edge).id, self.graph.edge(out_edge).id);

            if self.graph.edge(in_edge).right_link.is_some() ||
                self.graph.edge(out_edge).left_link.is_some() {
                continue;
            }

            // Link the entrance to the exit on both strands.
            let comp_in = self.graph.complement_edge(in_edge);
            let comp_out = self.graph.complement_edge(out_edge);
            self.graph.link_edges(in_edge, out_edge);
            self.graph.link_edges(comp_out, comp_in);

            let sequence = self.path_sequence(&lower.path);
            self.register_bridge(in_edge, out_edge, sequence);
        }

        debug!("Masked {} heterozygous bubbles", num_masked);
        num_masked
    }

    //-------------------------------------------------------------------------

    /// Finds and masks single-edge loops caused by alternative haplotypes,
    /// returning the number of newly masked loops.
    ///
    /// A candidate loop hangs off a node with one other entrance and one other
    /// exit, is covered no deeper than its entrance, and is shorter than the
    /// longer of the two. A loop with very low coverage is bridged with a stub
    /// sequence, which removes it; otherwise the loop is unrolled once into
    /// the bridging sequence.
    pub fn find_heterozygous_loops(&mut self) -> usize {
        const COV_MULT: f64 = 1.5;
        let paths = traverse::unbranching_paths(self.graph);

        let mut num_masked = 0;
        for lp in paths.iter() {
            if !lp.id.is_forward() || !lp.is_looped() {
                continue;
            }
            if self.graph.edge(lp.path[0]).self_complement {
                continue;
            }

            let node = lp.node_left;
            if self.graph.node(node).in_edges.len() != 2 ||
                self.graph.node(node).out_edges.len() != 2 {
                continue;
            }

            let mut entrance: Option<&UnbranchingPath> = None;
            let mut exit: Option<&UnbranchingPath> = None;
            for cand in paths.iter() {
                if cand.node_right == node && cand.id != lp.id {
                    entrance = Some(cand);
                }
                if cand.node_left == node && cand.id != lp.id {
                    exit = Some(cand);
                }
            }
            let (Some(entrance), Some(exit)) = (entrance, exit) else {
                continue;
            };

            if entrance.is_looped() {
                continue;
            }
            if entrance.id == exit.id.rc() {
                continue;
            }

            // Loop coverage should be roughly equal to the entrance coverage
            // or less.
            if lp.mean_coverage as f64 > COV_MULT * entrance.mean_coverage as f64 {
                continue;
            }

            // The loop should not be longer than the other branches.
            if lp.length > entrance.length.max(exit.length) {
                continue;
            }

            if !self.graph.edge(lp.path[0]).alt_haplotype {
                num_masked += 1;
            }
            for &edge in lp.path.iter() {
                self.mark_alt(edge);
            }

            let in_edge = entrance.path[entrance.path.len() - 1];
            let out_edge = exit.path[0];
            if self.graph.edge(in_edge).right_link.is_some() ||
                self.graph.edge(out_edge).left_link.is_some() {
                continue;
            }

            let comp_in = self.graph.complement_edge(in_edge);
            let comp_out = self.graph.complement_edge(out_edge);
            self.graph.link_edges(in_edge, out_edge);
            self.graph.link_edges(comp_out, comp_in);

            // Either remove or unroll the loop, depending on the coverage.
            if lp.mean_coverage < (entrance.mean_coverage + exit.mean_coverage) / 4 {
                let in_id = self.graph.edge(in_edge).id;
                let out_id = self.graph.edge(out_edge).id;
                let comp_in_id = self.graph.edge(comp_in).id;
                let comp_out_id = self.graph.edge(comp_out).id;
                self.bridging_seqs.insert((in_id, out_id), DnaSequence::from("A"));
                self.bridging_seqs.insert((comp_out_id, comp_in_id), DnaSequence::from("A"));
            } else {
                let sequence = self.path_sequence(&lp.path);
                self.register_bridge(in_edge, out_edge, sequence);
            }
        }

        debug!("Masked {} heterozygous loops", num_masked);
        num_masked
    }

    //-------------------------------------------------------------------------

    // Finds a multi-branch variant in the read paths that pass through the
    // given edge.
    //
    // The alignment suffixes starting at the edge are clustered by prefix
    // containment, clusters supported by a single read are dropped, and the
    // surviving clusters are clipped to the interval where they diverge from
    // the longest cluster and converge again.
    fn find_variant_segment(
        &self,
        start_edge: EdgeIndex,
        alignments: &[GraphAlignment],
        looped_edges: &HashSet<EdgeIndex>,
    ) -> Option<VariantPaths> {
        const MIN_SCORE: u32 = 2;

        // Extract the alignment suffixes starting from the current edge and
        // sort them from longest to shortest read-coordinate span.
        let mut out_paths: Vec<GraphAlignment> = Vec::new();
        for aln in alignments {
            if let Some(pos) = aln.iter().position(|edge_aln| edge_aln.edge == start_edge) {
                out_paths.push(aln[pos..].to_vec());
            }
        }
        if out_paths.is_empty() {
            return None;
        }
        out_paths.sort_by_key(|aln| {
            Reverse(aln[aln.len() - 1].overlap.cur_end - aln[0].overlap.cur_end)
        });

        // Group the paths by containment. Each group is represented by the
        // longest path that seeded it, with the number of merged paths as the
        // score.
        let mut path_groups: Vec<PathWithScore> = Vec::new();
        for trg_path in out_paths {
            let mut new_path = true;
            for group in path_groups.iter_mut() {
                let common = trg_path.len().min(group.path.len());
                if (0..common).all(|i| trg_path[i].edge == group.path[i].edge) {
                    new_path = false;
                    group.score += 1;
                    break;
                }
            }
            if new_path {
                path_groups.push(PathWithScore { path: trg_path, score: 1 });
            }
        }
        path_groups.retain(|group| group.score >= MIN_SCORE);
        if path_groups.len() < 2 {
            return None;
        }

        // Mark edges that appear more than once as repeats.
        let mut repeats: HashSet<EdgeIndex> = HashSet::new();
        for group in path_groups.iter() {
            let mut seen: HashSet<EdgeIndex> = HashSet::new();
            for edge_aln in group.path.iter() {
                if !seen.insert(edge_aln.edge) {
                    repeats.insert(edge_aln.edge);
                }
            }
        }

        // The longest path is the reference; find the edges where the other
        // groups converge with it.
        let ref_path = &path_groups[0].path;
        let mut convergence: HashSet<EdgeIndex> = ref_path.iter()
            .map(|edge_aln| edge_aln.edge)
            .filter(|edge| !looped_edges.contains(edge) && !repeats.contains(edge))
            .collect();
        for group in path_groups[1..].iter() {
            let edges: HashSet<EdgeIndex> = group.path.iter().map(|edge_aln| edge_aln.edge).collect();
            convergence = convergence.intersection(&edges).copied().collect();
        }

        // The groups may agree for a while; the bubble starts at the last
        // position where they all do.
        let mut bubble_start = 0;
        loop {
            let next = bubble_start + 1;
            let mut agreement = next < ref_path.len();
            if agreement {
                for group in path_groups[1..].iter() {
                    if next >= group.path.len() ||
                        !convergence.contains(&ref_path[next].edge) ||
                        group.path[next].edge != ref_path[next].edge {
                        agreement = false;
                        break;
                    }
                }
            }
            if !agreement {
                break;
            }
            bubble_start = next;
        }
        if !convergence.contains(&ref_path[bubble_start].edge) {
            return None;
        }

        // The bubble ends at the first convergence edge after the start.
        let mut bubble_end = None;
        for i in bubble_start + 1..ref_path.len() {
            if convergence.contains(&ref_path[i].edge) {
                bubble_end = Some(i);
                break;
            }
        }
        let bubble_end = bubble_end?;

        // Clip every group to the bubble and merge identical branches.
        let start = ref_path[bubble_start].edge;
        let end = ref_path[bubble_end].edge;
        let mut branches: Vec<PathWithScore> = Vec::new();
        for group in path_groups.iter() {
            let mut group_start = 0;
            let mut group_end = 0;
            for (i, edge_aln) in group.path.iter().enumerate() {
                if edge_aln.edge == start {
                    group_start = i;
                }
                if edge_aln.edge == end {
                    group_end = i;
                }
            }
            if group_end < group_start {
                continue;
            }
            let new_path: GraphAlignment = group.path[group_start..=group_end].to_vec();
            let mut duplicate = false;
            for branch in branches.iter_mut() {
                if branch.path.len() == new_path.len() &&
                    branch.path.iter().zip(new_path.iter()).all(|(a, b)| a.edge == b.edge) {
                    duplicate = true;
                    branch.score += group.score;
                }
            }
            if !duplicate {
                branches.push(PathWithScore { path: new_path, score: group.score });
            }
        }
        if branches.len() < 2 {
            return None;
        }
        debug!("Variant segment with {} branches at edge {}", branches.len(), self.graph.edge(start).id);

        Some(VariantPaths { start_edge: start, end_edge: end, alt_paths: branches })
    }

    /// Finds and masks complex heterozygosities (more than two alternative
    /// branches) using read paths, returning the number of accepted variants.
    ///
    /// A variant found from the last edge of an unbranching path is accepted
    /// only if searching backwards from the complement of its end edge finds
    /// the complement of its start edge. The interiors of all branches are
    /// masked, and the bridging sequence is cut from the read supporting the
    /// first branch, padded to a minimum span.
    pub fn find_complex_haplotypes(&mut self) -> usize {
        // Calibration constant: bridging sequences are padded from the read to
        // a span of at least 99 bases.
        const MIN_BRIDGE_SPAN: i32 = 100;

        let aln_index = self.aligner.make_alignment_index(self.graph);
        let paths = traverse::unbranching_paths(self.graph);
        let mut looped_edges: HashSet<EdgeIndex> = HashSet::new();
        for path in paths.iter() {
            if path.is_looped() {
                looped_edges.extend(path.path.iter().copied());
            }
        }

        let empty: Vec<GraphAlignment> = Vec::new();
        let mut used_edges: HashSet<EdgeIndex> = HashSet::new();
        let mut found_variants: Vec<VariantPaths> = Vec::new();
        for start_path in paths.iter() {
            let start_edge = start_path.path[start_path.path.len() - 1];
            if looped_edges.contains(&start_edge) || used_edges.contains(&start_edge) {
                continue;
            }

            let alignments = aln_index.get(&start_edge).unwrap_or(&empty);
            let Some(var_seg) = self.find_variant_segment(start_edge, alignments, &looped_edges) else {
                continue;
            };
            if var_seg.start_edge == self.graph.complement_edge(var_seg.end_edge) {
                continue;
            }

            // Both directions must agree on the variant.
            let rev_start = self.graph.complement_edge(var_seg.end_edge);
            let rev_alignments = aln_index.get(&rev_start).unwrap_or(&empty);
            if let Some(rev_seg) = self.find_variant_segment(rev_start, rev_alignments, &looped_edges) {
                if self.graph.complement_edge(rev_seg.end_edge) == var_seg.start_edge {
                    used_edges.insert(rev_seg.start_edge);
                    found_variants.push(var_seg);
                }
            }
        }

        let mut found_new = 0;
        for var_segment in found_variants.iter() {
            let mut new_variant = true;
            for branch in var_segment.alt_paths.iter() {
                for edge_aln in branch.path[1..branch.path.len() - 1].iter() {
                    if self.graph.edge(edge_aln.edge).alt_haplotype {
                        new_variant = false;
                    }
                }
            }
            if new_variant {
                found_new += 1;
                debug!("Complex bulge: {} : {}",
                    self.graph.edge(var_segment.start_edge).id,
                    self.graph.edge(var_segment.end_edge).id);
            }

            for branch in var_segment.alt_paths.iter() {
                for i in 1..branch.path.len() - 1 {
                    self.mark_alt(branch.path[i].edge);
                }
            }

            if self.graph.edge(var_segment.start_edge).right_link.is_some() ||
                self.graph.edge(var_segment.end_edge).left_link.is_some() {
                continue;
            }

            let comp_start = self.graph.complement_edge(var_segment.start_edge);
            let comp_end = self.graph.complement_edge(var_segment.end_edge);
            self.graph.link_edges(var_segment.start_edge, var_segment.end_edge);
            self.graph.link_edges(comp_end, comp_start);

            // The bridging sequence is cut from the read behind the first
            // branch.
            let first = &var_segment.alt_paths[0].path;
            let read_id = first[0].overlap.cur_id;
            let read_start = first[0].overlap.cur_end;
            let read_end = first[first.len() - 1].overlap.cur_begin
                .max(read_start + MIN_BRIDGE_SPAN - 1);
            let sequence = self.read_seqs.get_seq(read_id)
                .substr(read_start as usize, (read_end - read_start) as usize);
            self.register_bridge(var_segment.start_edge, var_segment.end_edge, sequence);
        }

        debug!("Masked {} complex haplotypes", found_new);
        found_variants.len()
    }

    //-------------------------------------------------------------------------

    /// Finds and masks superbubbles, returning the number of newly masked
    /// ones.
    ///
    /// A superbubble starts at an edge whose right node branches out, and ends
    /// at an edge on a reference path such that everything reachable from the
    /// start is also reachable backwards from the end, within the bubble
    /// length bound. Both directions must agree before the bubble is accepted.
    pub fn find_superbubbles(&mut self) -> usize {
        let max_bubble_len = self.params.max_bubble_length;
        let paths = traverse::unbranching_paths(self.graph);
        let mut looped_edges: HashSet<EdgeIndex> = HashSet::new();
        for path in paths.iter() {
            if path.is_looped() {
                looped_edges.extend(path.path.iter().copied());
            }
        }

        let mut found_new = 0;
        let mut used_edges: HashSet<EdgeIndex> = HashSet::new();
        for start_edge in 0..self.graph.edge_count() {
            if looped_edges.contains(&start_edge) || used_edges.contains(&start_edge) {
                continue;
            }
            let right = self.graph.edge(start_edge).node_right;
            if self.graph.node(right).in_edges.len() > 1 ||
                self.graph.node(right).out_edges.len() < 2 {
                continue;
            }

            // A superbubble found in one direction...
            let Some(fwd_bubble) = is_right_superbubble(self.graph, start_edge, max_bubble_len) else {
                continue;
            };
            if fwd_bubble.end == start_edge ||
                self.graph.complement_edge(fwd_bubble.end) == start_edge {
                continue;
            }

            // ...must agree with one found in the opposite direction.
            let rev_start = self.graph.complement_edge(fwd_bubble.end);
            let Some(rev_bubble) = is_right_superbubble(self.graph, rev_start, max_bubble_len) else {
                continue;
            };
            if self.graph.complement_edge(rev_bubble.end) != start_edge {
                continue;
            }

            used_edges.insert(self.graph.complement_edge(fwd_bubble.end));

            let new_variant = fwd_bubble.internal_edges.iter()
                .all(|&edge| !self.graph.edge(edge).alt_haplotype);
            if new_variant {
                found_new += 1;
            }
            for &edge in fwd_bubble.internal_edges.iter() {
                self.mark_alt(edge);
            }

            if self.graph.edge(start_edge).right_link.is_some() ||
                self.graph.edge(fwd_bubble.end).left_link.is_some() {
                continue;
            }

            let comp_start = self.graph.complement_edge(start_edge);
            let comp_end = self.graph.complement_edge(fwd_bubble.end);
            self.graph.link_edges(start_edge, fwd_bubble.end);
            self.graph.link_edges(comp_end, comp_start);

            // The reference path strictly between the start and the end
            // provides the bridging sequence.
            let end_pos = fwd_bubble.ref_path.iter()
                .position(|&edge| edge == fwd_bubble.end)
                .unwrap_or(fwd_bubble.ref_path.len());
            let sequence = self.path_sequence(&fwd_bubble.ref_path[1..end_pos]);
            self.register_bridge(start_edge, fwd_bubble.end, sequence);

            debug!("Superbubble: {} {}",
                self.graph.edge(start_edge).id, self.graph.edge(fwd_bubble.end).id);
        }

        debug!("Masked {} superbubbles", found_new);
        found_new
    }

    //-------------------------------------------------------------------------

    /// Materializes the links installed by the detection phases, rewriting the
    /// graph, and returns the number of collapsed variants.
    ///
    /// For every linked pair, the edges are detached from the nodes between
    /// them and rejoined: directly through a fresh node if they were adjacent,
    /// or through a fresh edge carrying the bridging sequence otherwise. Each
    /// pair is handled once, with the complement rewired alongside. Pairs with
    /// a missing edge, a broken link, or no bridging sequence are skipped with
    /// a warning.
    pub fn collapse_haplotypes(&mut self) -> usize {
        let mut num_bridged = 0;
        let mut separated_edges: HashSet<EdgeIndex> = HashSet::new();
        for in_edge in 0..self.graph.edge_count() {
            let Some(out_id) = self.graph.edge(in_edge).right_link else {
                continue;
            };
            if separated_edges.contains(&in_edge) {
                continue;
            }

            let Some(out_edge) = self.graph.edge_index(out_id) else {
                warn!("Missing linked edge");
                continue;
            };
            if self.graph.edge(out_edge).left_link != Some(self.graph.edge(in_edge).id) {
                warn!("Broken link");
                continue;
            }

            let key = (self.graph.edge(in_edge).id, out_id);
            if !self.bridging_seqs.contains_key(&key) {
                warn!("No bridging path!");
                continue;
            }

            num_bridged += 1;
            separated_edges.insert(self.graph.complement_edge(out_edge));

            let comp_out = self.graph.complement_edge(out_edge);
            let comp_in = self.graph.complement_edge(in_edge);
            if self.graph.edge(in_edge).node_right == self.graph.edge(out_edge).node_left {
                self.separate_adjacent_edges(in_edge, out_edge);
                self.separate_adjacent_edges(comp_out, comp_in);
            } else {
                let insert_seq = self.bridging_seqs[&key].clone();
                let edge_id = self.graph.new_edge_id();
                let name = format!("edge_{}_haplotype", edge_id);
                let seq_id = self.graph.add_edge_sequence(&insert_seq, 0, insert_seq.len(), &name);
                self.separate_distant_edges(in_edge, out_edge, seq_id, insert_seq.len(), edge_id);
                self.separate_distant_edges(comp_out, comp_in, seq_id.rc(), insert_seq.len(), edge_id.rc());
            }
        }

        self.aligner.update_alignments(self.graph);
        debug!("Collapsed {} haplotypes", num_bridged);
        num_bridged
    }

    // Detaches the linked pair from the nodes between them and rejoins the
    // pair directly through a fresh node.
    fn separate_adjacent_edges(&mut self, in_edge: EdgeIndex, out_edge: EdgeIndex) {
        let new_node = self.graph.add_node();

        let old_right = self.graph.edge(in_edge).node_right;
        self.graph.node_mut(old_right).in_edges.retain(|&edge| edge != in_edge);
        self.graph.edge_mut(in_edge).node_right = new_node;
        self.graph.node_mut(new_node).in_edges.push(in_edge);

        let old_left = self.graph.edge(out_edge).node_left;
        self.graph.node_mut(old_left).out_edges.retain(|&edge| edge != out_edge);
        self.graph.edge_mut(out_edge).node_left = new_node;
        self.graph.node_mut(new_node).out_edges.push(out_edge);
    }

    // Detaches the linked pair from the nodes between them and rejoins the
    // pair through a fresh edge carrying the bridging sequence.
    fn separate_distant_edges(
        &mut self,
        in_edge: EdgeIndex, out_edge: EdgeIndex,
        seq_id: SeqId, seq_len: usize, new_id: EdgeId,
    ) {
        let left_node = self.graph.add_node();
        let old_right = self.graph.edge(in_edge).node_right;
        self.graph.node_mut(old_right).in_edges.retain(|&edge| edge != in_edge);
        self.graph.edge_mut(in_edge).node_right = left_node;
        self.graph.node_mut(left_node).in_edges.push(in_edge);

        let right_node = self.graph.add_node();
        let coverage = (self.graph.edge(in_edge).mean_coverage +
            self.graph.edge(out_edge).mean_coverage) / 2;
        let new_edge = self.graph.add_edge(left_node, right_node, new_id, seq_len, coverage);
        self.graph.edge_mut(new_edge).sequence = Some(seq_id);

        let old_left = self.graph.edge(out_edge).node_left;
        self.graph.node_mut(old_left).out_edges.retain(|&edge| edge != out_edge);
        self.graph.edge_mut(out_edge).node_left = right_node;
        self.graph.node_mut(right_node).out_edges.push(out_edge);
    }

    /// Clears the links and the alternative-haplotype masks on every edge and
    /// empties the bridging-sequence map. Called between resolution passes.
    pub fn reset_edges(&mut self) {
        for edge in 0..self.graph.edge_count() {
            let edge = self.graph.edge_mut(edge);
            edge.left_link = None;
            edge.right_link = None;
            edge.alt_haplotype = false;
        }
        self.bridging_seqs.clear();
    }
}

//-----------------------------------------------------------------------------

// Helpers for superbubble detection.

struct Superbubble {
    end: EdgeIndex,
    internal_edges: Vec<EdgeIndex>,
    ref_path: Vec<EdgeIndex>,
}

// Looks for a superbubble to the right of the given edge.
//
// An arbitrary reference path is extended past the bubble length bound; every
// edge of it is tried as the bubble end. The end is accepted if everything
// reachable from the start (without passing the end) is also reachable from
// the complement of the end, and every source-to-sink tour fits in the bound.
fn is_right_superbubble(
    graph: &AssemblyGraph,
    start: EdgeIndex,
    max_bubble_len: usize,
) -> Option<Superbubble> {
    let ref_path = traverse::any_path(graph, start, max_bubble_len);
    if ref_path.is_empty() {
        return None;
    }

    for &end_cand in ref_path.iter() {
        if end_cand == start {
            continue;
        }

        let from_source = traverse::shortest_paths_from(graph, start, end_cand, max_bubble_len);
        let from_sink = traverse::shortest_paths_from(
            graph,
            graph.complement_edge(end_cand), graph.complement_edge(start),
            max_bubble_len,
        );
        if from_source.failure || from_sink.failure {
            continue;
        }

        let mut good_bubble = true;
        for (&edge, &dist) in from_source.dist.iter() {
            let comp_edge = graph.complement_edge(edge);
            let Some(&comp_dist) = from_sink.dist.get(&comp_edge) else {
                good_bubble = false;
                break;
            };
            // The complement edge's own length is counted in both distances.
            let tour_len = dist + comp_dist - graph.edge(comp_edge).length;
            if tour_len > max_bubble_len {
                good_bubble = false;
                break;
            }
        }
        if good_bubble {
            let internal_edges: Vec<EdgeIndex> = from_source.dist.keys()
                .copied()
                .filter(|&edge| edge != start && edge != end_cand)
                .collect();
            return Some(Superbubble { end: end_cand, internal_edges, ref_path });
        }
    }

    None
}

//-----------------------------------------------------------------------------
