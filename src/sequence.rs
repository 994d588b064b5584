//! Oriented sequence identifiers, DNA sequences, and an in-memory sequence store.
//!
//! Reads and edge sequences are identified by [`SeqId`], which encodes the
//! orientation in the low bit. Both orientations of a sequence are first-class:
//! any operation applied to an identifier is expected to be applied to its
//! reverse complement as well, and [`SequenceContainer`] resolves either
//! orientation of a stored sequence.
//!
//! Sequences are stored in packed form, three bases per byte.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bio::io::fasta;

use flate2::read::MultiGzDecoder;


//-----------------------------------------------------------------------------

/// An identifier of an oriented sequence.
///
/// Identifiers come in pairs: the forward orientation has an even value and
/// the reverse complement orientation the following odd value. [`SeqId::rc`]
/// maps between the two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeqId(u32);

impl SeqId {
    /// Creates an identifier from a raw value.
    pub fn new(value: u32) -> Self {
        SeqId(value)
    }

    /// Returns the identifier of the reverse complement orientation.
    pub fn rc(self) -> Self {
        SeqId(self.0 ^ 1)
    }

    /// Returns `true` if this is the forward orientation.
    pub fn is_forward(self) -> bool {
        self.0 & 1 == 0
    }

    /// Returns the offset of the underlying sequence, shared by both orientations.
    pub fn index(self) -> usize {
        (self.0 >> 1) as usize
    }

    /// Returns the raw value of the identifier.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Returns the identifier as a signed number: positive for the forward
    /// orientation and negative for the reverse complement, offset by one so
    /// that the first sequence is `1` / `-1`.
    pub fn signed(self) -> i64 {
        let id = self.index() as i64 + 1;
        if self.is_forward() { id } else { -id }
    }
}

impl Display for SeqId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.signed())
    }
}

//-----------------------------------------------------------------------------

// Sequence encoding and decoding.

const DECODE: [u8; 6] = [0, b'A', b'C', b'G', b'T', b'N'];

// Complements of the encoded values; `N` is its own complement.
const COMPLEMENT: [u8; 6] = [0, 4, 3, 2, 1, 5];

const fn generate_encoding() -> [u8; 256] {
    let mut result = [5; 256];
    result[b'a' as usize] = 1; result[b'A' as usize] = 1;
    result[b'c' as usize] = 2; result[b'C' as usize] = 2;
    result[b'g' as usize] = 3; result[b'G' as usize] = 3;
    result[b't' as usize] = 4; result[b'T' as usize] = 4;
    result
}

const ENCODE: [u8; 256] = generate_encoding();

//-----------------------------------------------------------------------------

/// A DNA sequence stored three bases per byte.
///
/// Values outside `acgtACGT` are stored as `N`. The sequence supports random
/// access to bases, substring extraction, and reverse complementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnaSequence {
    packed: Vec<u8>,
    len: usize,
}

impl DnaSequence {
    /// Creates a sequence from unpacked bases.
    pub fn new(bases: &[u8]) -> Self {
        let mut packed: Vec<u8> = Vec::with_capacity(bases.len() / 3 + 1);
        let mut offset = 0;
        while offset + 3 <= bases.len() {
            let byte = ENCODE[bases[offset] as usize] +
                6 * ENCODE[bases[offset + 1] as usize] +
                36 * ENCODE[bases[offset + 2] as usize];
            packed.push(byte);
            offset += 3;
        }
        match bases.len() - offset {
            0 => (),
            1 => packed.push(ENCODE[bases[offset] as usize]),
            _ => packed.push(ENCODE[bases[offset] as usize] + 6 * ENCODE[bases[offset + 1] as usize]),
        }
        DnaSequence { packed, len: bases.len() }
    }

    /// Returns the length of the sequence in bases.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // Returns the encoded value at the given position.
    fn encoded(&self, index: usize) -> u8 {
        let mut value = self.packed[index / 3] as usize;
        for _ in 0..index % 3 {
            value /= DECODE.len();
        }
        (value % DECODE.len()) as u8
    }

    /// Returns the base at the given position, or `None` if out of range.
    pub fn base(&self, index: usize) -> Option<u8> {
        if index >= self.len {
            return None;
        }
        Some(DECODE[self.encoded(index) as usize])
    }

    /// Returns the unpacked bases.
    pub fn bases(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.len);
        for i in 0..self.len {
            result.push(DECODE[self.encoded(i) as usize]);
        }
        result
    }

    /// Returns the substring starting at `start` with up to `len` bases.
    ///
    /// The substring is clamped to the end of the sequence.
    pub fn substr(&self, start: usize, len: usize) -> DnaSequence {
        let start = start.min(self.len);
        let end = start.saturating_add(len).min(self.len);
        let mut bases = Vec::with_capacity(end - start);
        for i in start..end {
            bases.push(DECODE[self.encoded(i) as usize]);
        }
        DnaSequence::new(&bases)
    }

    /// Returns the reverse complement of the sequence.
    pub fn reverse_complement(&self) -> DnaSequence {
        let mut bases = Vec::with_capacity(self.len);
        for i in (0..self.len).rev() {
            bases.push(DECODE[COMPLEMENT[self.encoded(i) as usize] as usize]);
        }
        DnaSequence::new(&bases)
    }

    /// Appends another sequence to this one.
    pub fn append(&mut self, other: &DnaSequence) {
        let mut bases = self.bases();
        bases.extend(other.bases());
        *self = DnaSequence::new(&bases);
    }
}

impl Display for DnaSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bases()))
    }
}

impl From<&str> for DnaSequence {
    fn from(bases: &str) -> Self {
        DnaSequence::new(bases.as_bytes())
    }
}

//-----------------------------------------------------------------------------

// A stored sequence with its name.
#[derive(Clone, Debug)]
struct SequenceRecord {
    name: String,
    sequence: DnaSequence,
}

/// An in-memory store of named DNA sequences.
///
/// Each stored sequence is accessible in both orientations through the paired
/// identifiers returned by [`SequenceContainer::add_sequence`]. The reverse
/// complement orientation is materialized on demand.
#[derive(Clone, Debug, Default)]
pub struct SequenceContainer {
    records: Vec<SequenceRecord>,
}

impl SequenceContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        SequenceContainer { records: Vec::new() }
    }

    /// Adds a sequence and returns the identifier of its forward orientation.
    pub fn add_sequence(&mut self, name: &str, sequence: DnaSequence) -> SeqId {
        let id = SeqId::new((self.records.len() as u32) << 1);
        self.records.push(SequenceRecord { name: String::from(name), sequence });
        id
    }

    /// Returns the number of stored sequences, counting each orientation pair once.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the container is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns an iterator over the identifiers of all oriented sequences.
    ///
    /// Both orientations of each stored sequence are listed, forward first.
    pub fn iter_seqs(&self) -> impl Iterator<Item = SeqId> {
        (0..(self.records.len() as u32) * 2).map(SeqId::new)
    }

    /// Returns the length of the sequence in bases.
    pub fn seq_len(&self, id: SeqId) -> usize {
        self.records[id.index()].sequence.len()
    }

    /// Returns the name of the underlying sequence.
    pub fn seq_name(&self, id: SeqId) -> &str {
        &self.records[id.index()].name
    }

    /// Returns the sequence in the requested orientation.
    pub fn get_seq(&self, id: SeqId) -> DnaSequence {
        let record = &self.records[id.index()];
        if id.is_forward() {
            record.sequence.clone()
        } else {
            record.sequence.reverse_complement()
        }
    }

    /// Loads sequences from a FASTA file, which may be gzip-compressed.
    ///
    /// Returns the number of sequences loaded. Sequence names are truncated at
    /// the first whitespace, and sequence data may span multiple lines.
    pub fn load_fasta<P: AsRef<Path>>(&mut self, filename: P) -> Result<usize, String> {
        let reader = fasta::Reader::from_bufread(open_fasta(filename)?);
        let mut loaded = 0;
        for record in reader.records() {
            let record = record.map_err(|x| x.to_string())?;
            if record.id().is_empty() {
                return Err(String::from("FASTA header without a sequence name"));
            }
            if record.seq().is_empty() {
                return Err(format!("Empty sequence: {}", record.id()));
            }
            self.add_sequence(record.id(), DnaSequence::new(record.seq()));
            loaded += 1;
        }
        Ok(loaded)
    }
}

// Opens a FASTA file for reading, decompressing on the fly when the buffered
// reader starts with the gzip magic bytes.
fn open_fasta<P: AsRef<Path>>(filename: P) -> Result<Box<dyn BufRead>, String> {
    let file = File::open(&filename).map_err(|x| x.to_string())?;
    let mut inner = BufReader::new(file);
    let gzipped = matches!(inner.fill_buf(), Ok(&[0x1F, 0x8B, ..]));
    if gzipped {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(inner))))
    } else {
        Ok(Box::new(inner))
    }
}

//-----------------------------------------------------------------------------
