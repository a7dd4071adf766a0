//! Nucleotide buffer read from a plain sequence file.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use tracing::info;

use crate::error::Result;

/// Lower-cased `a,t,g,c` bases followed by a circular copy of the first
/// `nucleotides` of them, so every position has a full window after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    bases: Vec<u8>,
    len: usize,
}

impl Sequence {
    /// Keep the nucleotides of `raw` (either case) and drop everything else.
    pub fn from_bytes(raw: &[u8], nucleotides: usize) -> Self {
        let mut bases = Vec::with_capacity(raw.len() + nucleotides);
        bases.extend(raw.iter().filter_map(|&byte| match byte {
            b'a' | b'A' => Some(b'a'),
            b't' | b'T' => Some(b't'),
            b'g' | b'G' => Some(b'g'),
            b'c' | b'C' => Some(b'c'),
            _ => None,
        }));

        let len = bases.len();
        // assume circular nucleotides; wraps again if the sequence is shorter
        if len > 0 {
            for j in 0..nucleotides {
                bases.push(bases[j]);
            }
        }

        Self { bases, len }
    }

    pub fn load(path: &Path, nucleotides: usize) -> Result<Self> {
        info!("Inputting sequence from {}", path.display());

        let file = File::open(path)?;
        let sequence = if file.metadata()?.len() == 0 {
            Self::from_bytes(&[], nucleotides)
        } else {
            // SAFETY: the map is read once and dropped before returning.
            let mmap = unsafe { Mmap::map(&file)? };
            Self::from_bytes(&mmap, nucleotides)
        };

        info!("Loaded {} nucleotides", sequence.len());
        Ok(sequence)
    }

    /// Number of scan positions (bases before the circular extension).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bases including the circular extension.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn filters_and_lowers() {
        let seq = Sequence::from_bytes(b"AcG t\nN5gx", 0);
        assert_eq!(seq.as_bytes(), b"acgtg");
        assert_eq!(seq.len(), 5);
    }

    #[test]
    fn extends_circularly() {
        let seq = Sequence::from_bytes(b"acgtt", 3);
        assert_eq!(seq.len(), 5);
        assert_eq!(seq.as_bytes(), b"acgttacg");
    }

    #[test]
    fn short_sequence_wraps_repeatedly() {
        let seq = Sequence::from_bytes(b"ag", 5);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.as_bytes(), b"agagaga");
    }

    #[test]
    fn empty_sequence_has_no_positions() {
        let seq = Sequence::from_bytes(b">\n\n", 12);
        assert!(seq.is_empty());
        assert!(seq.as_bytes().is_empty());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "GCGCGC").unwrap();
        writeln!(file, "atat").unwrap();
        let seq = Sequence::load(file.path(), 4).unwrap();
        assert_eq!(seq.len(), 10);
        assert_eq!(seq.as_bytes(), b"gcgcgcatatgcgc");

        let empty = tempfile::NamedTempFile::new().unwrap();
        assert!(Sequence::load(empty.path(), 4).unwrap().is_empty());
    }
}
