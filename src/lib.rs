//! # Chimera screening and haplotype resolution for long-read assembly graphs.
//!
//! This crate implements two coupled stages of a long-read genome assembler.
//!
//! # Chimera screening
//!
//! Reads are classified as chimeric using read-to-read overlap evidence: the
//! windowed coverage of a read, inferred from the overlaps that enclose each
//! window, drops sharply at an artifactual junction, and a read joined to its
//! own reverse complement overlaps itself near the midpoint. Verdicts are
//! cached per read and shared between the two orientations, so screening can
//! be driven from parallel workers.
//!
//! See [`ChimeraDetector`], [`OverlapStore`], and [`SequenceContainer`].
//!
//! # Haplotype resolution
//!
//! A diploid sample leaves alternative haplotypes in the assembly graph as
//! bulges, loops, multi-branch variants, and superbubbles. The resolver
//! detects these structures, masks the alternative-haplotype edges, links
//! each variant's entrance to its exit, and collapses the links into a
//! haploid topology with a bridging sequence spanning each collapsed variant.
//!
//! The graph is bi-directed: every edge has a complement twin representing
//! the reverse-complement strand, and every decision is mirrored on the twin.
//!
//! See [`AssemblyGraph`], [`HaplotypeResolver`], and [`Aligner`].
//!
//! ### Basic concepts
//!
//! Oriented identifiers ([`sequence::SeqId`], [`graph::EdgeId`]) come in
//! pairs, with the orientation in the low bit; `rc()` maps between a sequence
//! or edge and its reverse complement. Graph elements are addressed by stable
//! arena indices, so the complement of an edge is an index lookup.
//!
//! A typical resolution round runs a detection phase
//! ([`HaplotypeResolver::find_heterozygous_bulges`],
//! [`HaplotypeResolver::find_heterozygous_loops`],
//! [`HaplotypeResolver::find_complex_haplotypes`], or
//! [`HaplotypeResolver::find_superbubbles`]), materializes the result with
//! [`HaplotypeResolver::collapse_haplotypes`], and clears the working state
//! with [`HaplotypeResolver::reset_edges`] before the next phase.

pub mod alignment;
pub mod chimera;
pub mod config;
pub mod graph;
pub mod haplotype;
pub mod overlap;
pub mod sequence;
pub mod traverse;
pub mod utils;

#[cfg(test)]
mod internal;

pub use alignment::{Aligner, AlignmentIndex, EdgeAlignment, GraphAlignment, StaticAligner};
pub use chimera::ChimeraDetector;
pub use config::Params;
pub use graph::AssemblyGraph;
pub use haplotype::{HaplotypeResolver, VariantPaths};
pub use overlap::{Overlap, OverlapStore};
pub use sequence::{DnaSequence, SequenceContainer};
