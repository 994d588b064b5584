//! Chimeric read detection from overlap evidence.
//!
//! A chimeric read is an artifact whose two halves derive from disjoint loci.
//! Such reads betray themselves in two ways: the windowed coverage inferred
//! from read-to-read overlaps drops sharply near the junction, or the read
//! overlaps its own reverse complement close to the midpoint (a near-palindromic
//! join). [`ChimeraDetector`] tests both signals and caches the verdicts.
//!
//! Verdicts are symmetric over orientations: a read and its reverse complement
//! always receive the same classification.

use crate::config::Params;
use crate::overlap::{Overlap, OverlapStore};
use crate::sequence::{SeqId, SequenceContainer};
use crate::utils;

use dashmap::DashMap;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// Classifies reads as chimeric using read-to-read overlap evidence.
///
/// The detector borrows the sequence container and the overlap store and owns
/// a concurrent verdict cache, so cached queries may be issued from parallel
/// workers. [`ChimeraDetector::estimate_global_coverage`] must be called
/// before querying, unless uneven-coverage mode makes the global estimate
/// irrelevant.
pub struct ChimeraDetector<'a> {
    seqs: &'a SequenceContainer,
    overlaps: &'a OverlapStore,
    params: &'a Params,
    overlap_coverage: i32,
    verdicts: DashMap<SeqId, bool>,
}

impl<'a> ChimeraDetector<'a> {
    // Reads sampled for the global coverage estimate.
    const COVERAGE_SAMPLES: usize = 1000;

    /// Creates a detector with an empty verdict cache and a zero coverage estimate.
    pub fn new(seqs: &'a SequenceContainer, overlaps: &'a OverlapStore, params: &'a Params) -> Self {
        ChimeraDetector {
            seqs,
            overlaps,
            params,
            overlap_coverage: 0,
            verdicts: DashMap::new(),
        }
    }

    /// Returns the windowed coverage profile of the read.
    ///
    /// The read is split into fixed-width windows, and the profile counts the
    /// overlaps that strictly enclose each window. Windows within the maximum
    /// tolerated overhang of either read end are trimmed, as overlaps may end
    /// anywhere inside them. Self-overlaps are ignored. A read too short to
    /// have any interior windows yields the sentinel profile `[0]`.
    pub fn coverage_profile(&self, read_id: SeqId, overlaps: &[Overlap]) -> Vec<i32> {
        let window = self.params.chimera_window as i32;
        let flank = (self.params.maximum_overhang as i32) / window;

        let num_windows = (self.seqs.seq_len(read_id) as i32) / window;
        if num_windows - 2 * flank <= 0 {
            return vec![0];
        }

        let mut coverage = vec![0; (num_windows - 2 * flank) as usize];
        for overlap in overlaps {
            if overlap.is_self_overlap() {
                continue;
            }
            for pos in (overlap.cur_begin / window + 1)..(overlap.cur_end / window) {
                let pos = pos - flank;
                if pos >= 0 && (pos as usize) < coverage.len() {
                    coverage[pos as usize] += 1;
                }
            }
        }

        coverage
    }

    // Returns `true` if some window of the read has no coverage or coverage
    // below the drop threshold.
    fn coverage_drops(&self, read_id: SeqId, overlaps: &[Overlap]) -> bool {
        let coverage = self.coverage_profile(read_id, overlaps);
        let max_drop_rate = self.params.max_coverage_drop_rate;

        let threshold = if !self.params.uneven_coverage {
            (self.overlap_coverage as f64 / max_drop_rate).round() as i32
        } else {
            let max_cov = coverage.iter().copied().max().unwrap_or(0);
            (self.overlap_coverage.min(max_cov) as f64 / max_drop_rate).round() as i32
        };

        coverage.iter().any(|&cov| cov == 0 || cov < threshold)
    }

    /// Returns `true` if the read is classified as chimeric, fetching its
    /// overlaps from the overlap store on a cache miss.
    ///
    /// The verdict is cached under both orientations of the read.
    pub fn is_chimeric(&self, read_id: SeqId) -> bool {
        if let Some(verdict) = self.verdicts.get(&read_id) {
            return *verdict;
        }
        let overlaps = self.overlaps.lazy_seq_overlaps(read_id);
        let result = self.coverage_drops(read_id, overlaps) || self.overlaps.has_self_overlaps(read_id);
        self.verdicts.insert(read_id, result);
        self.verdicts.insert(read_id.rc(), result);
        result
    }

    /// Returns `true` if the read is classified as chimeric, using the given
    /// overlaps on a cache miss.
    ///
    /// In addition to the coverage test, self-overlaps are inspected for a
    /// near-palindromic join: the read is chimeric if the end of a self-overlap
    /// projects close to its own position on the opposite strand.
    pub fn is_chimeric_from_overlaps(&self, read_id: SeqId, overlaps: &[Overlap]) -> bool {
        let jump = self.params.maximum_jump;
        if let Some(verdict) = self.verdicts.get(&read_id) {
            return *verdict;
        }
        let mut result = self.coverage_drops(read_id, overlaps);
        for overlap in overlaps {
            if overlap.is_self_overlap() {
                let proj_end = overlap.ext_len - overlap.ext_end - 1;
                if (overlap.cur_end - proj_end).abs() < jump {
                    result = true;
                }
            }
        }
        self.verdicts.insert(read_id, result);
        self.verdicts.insert(read_id.rc(), result);
        result
    }

    /// Estimates the global overlap coverage as the median interior window
    /// coverage over a sample of reads.
    ///
    /// Up to 1000 reads are sampled with a pseudo-random stride; the seed makes
    /// the sample reproducible. Reads with no coverage at all are skipped. If
    /// nothing is sampled, the estimate is set to zero with a warning.
    pub fn estimate_global_coverage(&mut self, seed: u64) {
        debug!("Estimating overlap coverage");

        let total = self.seqs.iter_seqs().count();
        let num_samples = Self::COVERAGE_SAMPLES.min(total);
        let mut cov_list: Vec<i32> = Vec::new();
        if num_samples > 0 {
            let sample_rate = total / num_samples;
            let mut rng = StdRng::seed_from_u64(seed);
            for id in self.seqs.iter_seqs() {
                if rng.gen_range(0..sample_rate) != 0 {
                    continue;
                }
                let overlaps = self.overlaps.lazy_seq_overlaps(id);
                let coverage = self.coverage_profile(id, overlaps);
                if coverage.iter().all(|&cov| cov == 0) {
                    continue;
                }
                cov_list.extend_from_slice(&coverage);
            }
        }

        match utils::median(&mut cov_list) {
            Some(value) => self.overlap_coverage = value,
            None => {
                warn!("No overlaps found!");
                self.overlap_coverage = 0;
            }
        }

        info!("Overlap-based coverage: {}", self.overlap_coverage);
    }

    /// Returns the current global coverage estimate.
    pub fn overlap_coverage(&self) -> i32 {
        self.overlap_coverage
    }

    /// Classifies every read in the container in parallel, filling the verdict
    /// cache, and returns the number of chimeric reads.
    pub fn classify_all(&self) -> usize {
        let ids: Vec<SeqId> = self.seqs.iter_seqs().filter(|id| id.is_forward()).collect();
        let flagged = ids.par_iter().filter(|&&id| self.is_chimeric(id)).count();
        info!("Detected {} chimeric reads out of {}", flagged, ids.len());
        flagged
    }
}

//-----------------------------------------------------------------------------
