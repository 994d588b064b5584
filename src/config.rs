//! Named parameters for chimera screening and haplotype resolution.

//-----------------------------------------------------------------------------

/// Parameters shared by the chimera detector and the haplotype resolver.
///
/// The defaults match the values used for noisy long reads. All values are
/// assumed to be positive; out-of-range parameters are not diagnosed.
#[derive(Clone, Debug, PartialEq)]
pub struct Params {
    /// Maximum unaligned jump between consecutive alignment anchors (bp).
    pub maximum_jump: i32,
    /// Window size for per-read coverage profiles (bp).
    pub chimera_window: usize,
    /// Maximum tolerated overhang of an overlap (bp); determines how many
    /// flanking windows of a coverage profile are trimmed.
    pub maximum_overhang: usize,
    /// Maximum drop rate of read coverage before a read is called chimeric.
    pub max_coverage_drop_rate: f64,
    /// Maximum length of a heterozygous bubble branch or superbubble (bp).
    pub max_bubble_length: usize,
    /// Assume uneven coverage (e.g. metagenomes): coverage-drop thresholds
    /// are capped by the local peak coverage of each read.
    pub uneven_coverage: bool,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            maximum_jump: 1500,
            chimera_window: 100,
            maximum_overhang: 1500,
            max_coverage_drop_rate: 5.0,
            max_bubble_length: 50000,
            uneven_coverage: false,
        }
    }
}

//-----------------------------------------------------------------------------
