//! Pairwise overlaps between oriented reads.
//!
//! An [`Overlap`] is the primitive evidence produced by the overlap engine: an
//! inferred alignment from one oriented read to another, with coordinates in
//! the forward orientation of each read. [`OverlapStore`] keeps the overlaps
//! of each read and answers the queries the chimera detector needs.
//!
//! Computing overlaps is outside the scope of this crate; the store only
//! holds what it is given.

use crate::sequence::SeqId;

use std::collections::HashMap;

//-----------------------------------------------------------------------------

/// A directed pairwise overlap from one oriented read to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Overlap {
    /// The read the overlap originates from.
    pub cur_id: SeqId,
    /// Start of the overlap in the originating read.
    pub cur_begin: i32,
    /// End of the overlap in the originating read.
    pub cur_end: i32,
    /// Length of the originating read.
    pub cur_len: i32,
    /// The read the overlap extends into.
    pub ext_id: SeqId,
    /// Start of the overlap in the extension read.
    pub ext_begin: i32,
    /// End of the overlap in the extension read.
    pub ext_end: i32,
    /// Length of the extension read.
    pub ext_len: i32,
}

impl Overlap {
    /// Returns `true` if the overlap joins a read with its own reverse complement.
    pub fn is_self_overlap(&self) -> bool {
        self.ext_id == self.cur_id.rc()
    }
}

//-----------------------------------------------------------------------------

/// Per-read overlap lists, as produced by an external overlap engine.
#[derive(Clone, Debug, Default)]
pub struct OverlapStore {
    by_read: HashMap<SeqId, Vec<Overlap>>,
}

impl OverlapStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        OverlapStore { by_read: HashMap::new() }
    }

    /// Registers an overlap under its originating read.
    pub fn add(&mut self, overlap: Overlap) {
        self.by_read.entry(overlap.cur_id).or_default().push(overlap);
    }

    /// Returns the overlaps originating from the given read.
    pub fn lazy_seq_overlaps(&self, id: SeqId) -> &[Overlap] {
        self.by_read.get(&id).map_or(&[], |overlaps| overlaps.as_slice())
    }

    /// Returns `true` if the read overlaps its own reverse complement.
    pub fn has_self_overlaps(&self, id: SeqId) -> bool {
        self.lazy_seq_overlaps(id).iter().any(|overlap| overlap.is_self_overlap())
    }
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
