use super::*;

use crate::sequence::DnaSequence;

//-----------------------------------------------------------------------------

// Window size 100, flank 10 windows.
fn test_params() -> Params {
    Params {
        chimera_window: 100,
        maximum_overhang: 1000,
        max_coverage_drop_rate: 5.0,
        ..Params::default()
    }
}

fn add_read(container: &mut SequenceContainer, name: &str, len: usize) -> SeqId {
    let bases: Vec<u8> = (0..len).map(|i| b"ACGT"[i % 4]).collect();
    container.add_sequence(name, DnaSequence::new(&bases))
}

// An overlap from `cur` enclosing the interval `begin..end`.
fn enclosing_overlap(cur: SeqId, begin: i32, end: i32, cur_len: i32, ext: SeqId) -> Overlap {
    Overlap {
        cur_id: cur, cur_begin: begin, cur_end: end, cur_len,
        ext_id: ext, ext_begin: 0, ext_end: end - begin, ext_len: cur_len,
    }
}

// `count` overlaps from `cur` enclosing the interval `begin..end`, each from a
// distinct extension read that does not need to exist in the container.
fn add_coverage(store: &mut OverlapStore, cur: SeqId, begin: i32, end: i32, cur_len: i32, count: u32) {
    for i in 0..count {
        let ext = SeqId::new(1000 + 2 * (i + begin as u32));
        store.add(enclosing_overlap(cur, begin, end, cur_len, ext));
    }
}

//-----------------------------------------------------------------------------

#[test]
fn profile_lengths() {
    let params = test_params();
    let mut seqs = SequenceContainer::new();
    let long = add_read(&mut seqs, "long", 10000);
    let short = add_read(&mut seqs, "short", 2100);
    let too_short = add_read(&mut seqs, "too_short", 2000);
    let store = OverlapStore::new();
    let detector = ChimeraDetector::new(&seqs, &store, &params);

    assert_eq!(detector.coverage_profile(long, &[]).len(), 80, "Wrong profile length");
    assert_eq!(detector.coverage_profile(short, &[]).len(), 1, "Wrong single-window profile length");
    assert_eq!(
        detector.coverage_profile(too_short, &[]), vec![0],
        "Too short a read does not yield the sentinel profile"
    );
}

#[test]
fn profile_counts_enclosed_windows() {
    let params = test_params();
    let mut seqs = SequenceContainer::new();
    let read = add_read(&mut seqs, "read", 10000);
    let mut store = OverlapStore::new();
    // Windows 10..49 in read coordinates, 0..39 in the profile.
    add_coverage(&mut store, read, 900, 5000, 10000, 3);
    // An overlap reaching past both flanks must be clamped to the profile.
    store.add(enclosing_overlap(read, 0, 10000, 10000, SeqId::new(600)));
    // Self-overlaps do not contribute to coverage.
    store.add(Overlap {
        cur_id: read, cur_begin: 0, cur_end: 10000, cur_len: 10000,
        ext_id: read.rc(), ext_begin: 0, ext_end: 10000, ext_len: 10000,
    });

    let detector = ChimeraDetector::new(&seqs, &store, &params);
    let profile = detector.coverage_profile(read, store.lazy_seq_overlaps(read));
    assert_eq!(profile.len(), 80, "Wrong profile length");
    for (i, &cov) in profile.iter().enumerate() {
        let expected = if i < 40 { 4 } else { 1 };
        assert_eq!(cov, expected, "Wrong coverage in window {}", i);
    }
}

//-----------------------------------------------------------------------------

#[test]
fn coverage_drop() {
    let params = test_params();
    let mut seqs = SequenceContainer::new();
    let chimeric = add_read(&mut seqs, "chimeric", 10000);
    let normal = add_read(&mut seqs, "normal", 10000);

    let mut store = OverlapStore::new();
    // Windows 0..39 and 50..79 of the profile at coverage 30, 40..49 at zero.
    add_coverage(&mut store, chimeric, 900, 5000, 10000, 30);
    add_coverage(&mut store, chimeric, 5900, 9000, 10000, 30);
    // Full coverage 30 for the normal read.
    add_coverage(&mut store, normal, 900, 9000, 10000, 30);

    let mut detector = ChimeraDetector::new(&seqs, &store, &params);
    detector.estimate_global_coverage(7);
    assert_eq!(detector.overlap_coverage(), 30, "Wrong global coverage estimate");

    assert!(detector.is_chimeric(chimeric), "Coverage drop not flagged");
    assert!(!detector.is_chimeric(normal), "Well-covered read flagged");
    assert_eq!(
        detector.is_chimeric(chimeric.rc()), detector.is_chimeric(chimeric),
        "Verdict differs between orientations"
    );
}

#[test]
fn estimate_is_reproducible() {
    let params = test_params();
    let mut seqs = SequenceContainer::new();
    let mut store = OverlapStore::new();
    for i in 0..10 {
        let read = add_read(&mut seqs, &format!("read_{}", i), 10000);
        add_coverage(&mut store, read, 900, 9000, 10000, 10 + i as u32);
    }

    let mut detector = ChimeraDetector::new(&seqs, &store, &params);
    detector.estimate_global_coverage(42);
    let first = detector.overlap_coverage();
    detector.estimate_global_coverage(42);
    assert_eq!(detector.overlap_coverage(), first, "Estimate changed between identical runs");
}

//-----------------------------------------------------------------------------

#[test]
fn self_overlap_palindrome() {
    let mut params = test_params();
    params.maximum_jump = 5;
    let mut seqs = SequenceContainer::new();
    let palindromic = add_read(&mut seqs, "palindromic", 5000);
    let displaced = add_read(&mut seqs, "displaced", 5000);
    let store = OverlapStore::new();
    let detector = ChimeraDetector::new(&seqs, &store, &params);

    // Full coverage so that only the self-overlap test can flag the reads.
    let mut overlaps = vec![enclosing_overlap(palindromic, 0, 5000, 5000, SeqId::new(600))];
    overlaps.push(Overlap {
        cur_id: palindromic, cur_begin: 0, cur_end: 2500, cur_len: 5000,
        ext_id: palindromic.rc(), ext_begin: 0, ext_end: 2499, ext_len: 5000,
    });
    // projEnd = 5000 - 2499 - 1 = 2500, within the jump of curEnd = 2500.
    assert!(
        detector.is_chimeric_from_overlaps(palindromic, &overlaps),
        "Near-palindromic self-overlap not flagged"
    );
    assert!(detector.is_chimeric(palindromic.rc()), "Cached verdict differs for the complement");

    let mut overlaps = vec![enclosing_overlap(displaced, 0, 5000, 5000, SeqId::new(600))];
    overlaps.push(Overlap {
        cur_id: displaced, cur_begin: 0, cur_end: 2500, cur_len: 5000,
        ext_id: displaced.rc(), ext_begin: 0, ext_end: 3000, ext_len: 5000,
    });
    // projEnd = 1999, further than the jump from curEnd = 2500.
    assert!(
        !detector.is_chimeric_from_overlaps(displaced, &overlaps),
        "Distant self-overlap flagged as a palindrome"
    );
}

//-----------------------------------------------------------------------------

#[test]
fn no_overlaps() {
    let params = test_params();
    let mut seqs = SequenceContainer::new();
    let short = add_read(&mut seqs, "short", 500);
    let store = OverlapStore::new();

    let mut detector = ChimeraDetector::new(&seqs, &store, &params);
    detector.estimate_global_coverage(1);
    assert_eq!(detector.overlap_coverage(), 0, "Nonzero estimate without overlaps");
    assert!(detector.is_chimeric(short), "Read with a sentinel profile not flagged");
}

#[test]
fn uneven_coverage_mode() {
    let mut seqs = SequenceContainer::new();
    let low = add_read(&mut seqs, "low", 10000);
    let high = add_read(&mut seqs, "high", 10000);
    let mut store = OverlapStore::new();
    add_coverage(&mut store, low, 900, 9000, 10000, 4);
    add_coverage(&mut store, high, 900, 9000, 10000, 50);

    // Global estimate is the median over both reads' windows.
    let even = test_params();
    let mut detector = ChimeraDetector::new(&seqs, &store, &even);
    detector.estimate_global_coverage(3);
    assert_eq!(detector.overlap_coverage(), 50, "Wrong global coverage estimate");
    assert!(
        detector.is_chimeric(low),
        "Low-coverage read not flagged with an even-coverage threshold"
    );

    let mut uneven = test_params();
    uneven.uneven_coverage = true;
    let mut detector = ChimeraDetector::new(&seqs, &store, &uneven);
    detector.estimate_global_coverage(3);
    assert!(
        !detector.is_chimeric(low),
        "Uniform low-coverage read flagged in uneven-coverage mode"
    );
    assert!(!detector.is_chimeric(high), "Well-covered read flagged in uneven-coverage mode");
}

//-----------------------------------------------------------------------------

#[test]
fn classify_all_reads() {
    let params = test_params();
    let mut seqs = SequenceContainer::new();
    let chimeric = add_read(&mut seqs, "chimeric", 10000);
    let normal = add_read(&mut seqs, "normal", 10000);
    let mut store = OverlapStore::new();
    add_coverage(&mut store, chimeric, 900, 5000, 10000, 30);
    add_coverage(&mut store, chimeric, 5900, 9000, 10000, 30);
    add_coverage(&mut store, normal, 900, 9000, 10000, 30);

    let mut detector = ChimeraDetector::new(&seqs, &store, &params);
    detector.estimate_global_coverage(7);
    assert_eq!(detector.classify_all(), 1, "Wrong number of chimeric reads");
    assert!(detector.is_chimeric(chimeric.rc()), "Verdict not cached for both orientations");
}

//-----------------------------------------------------------------------------
