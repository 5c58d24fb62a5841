//! Read-only inspection of unknown `.cpmmodel` files.
//!
//! Nothing here feeds the conversion; it lists where the scanners would
//! look so a file that converts badly can be examined by hand.

use crate::scanner::{
    brace_offsets, length_prefixed_strings, png_signature_offsets, CandidateString,
};

/// Number of leading bytes kept for the hex preview
pub const HEAD_LEN: usize = 100;

/// Bytes per hex preview row
pub const HEX_ROW_LEN: usize = 16;

/// Diagnostic summary of a buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Buffer length in bytes
    pub size: usize,
    /// Leading bytes of the buffer, at most [`HEAD_LEN`]
    pub head: Vec<u8>,
    /// Offsets of every `{` that could start a JSON object
    pub brace_offsets: Vec<usize>,
    /// Offsets of every PNG signature
    pub png_offsets: Vec<usize>,
    /// Printable length-prefixed strings
    pub strings: Vec<CandidateString>,
    /// blake3 digest of the whole buffer, hex encoded
    pub fingerprint: String,
}

impl Analysis {
    /// Rows of the hex preview as `(offset, bytes)` pairs
    pub fn head_rows(&self) -> impl Iterator<Item = (usize, &[u8])> {
        self.head
            .chunks(HEX_ROW_LEN)
            .enumerate()
            .map(|(row, bytes)| (row * HEX_ROW_LEN, bytes))
    }
}

/// Analyze a buffer
pub fn analyze(data: &[u8]) -> Analysis {
    Analysis {
        size: data.len(),
        head: data[..data.len().min(HEAD_LEN)].to_vec(),
        brace_offsets: brace_offsets(data),
        png_offsets: png_signature_offsets(data),
        strings: length_prefixed_strings(data),
        fingerprint: blake3::hash(data).to_hex().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::PNG_SIGNATURE;

    #[test]
    fn test_analyze() {
        let mut data = b"{\"a\":1}".to_vec();
        data.extend_from_slice(PNG_SIGNATURE);
        data.extend(std::iter::repeat(0u8).take(200));

        let analysis = analyze(&data);
        assert_eq!(analysis.size, data.len());
        assert_eq!(analysis.head.len(), HEAD_LEN);
        assert_eq!(analysis.brace_offsets, vec![0]);
        assert_eq!(analysis.png_offsets, vec![7]);
        assert_eq!(analysis.fingerprint.len(), 64);
    }

    #[test]
    fn test_head_rows() {
        let analysis = analyze(&[7u8; 40]);
        let rows: Vec<_> = analysis.head_rows().collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].0, 16);
        assert_eq!(rows[2].1.len(), 8);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(analyze(b"abc").fingerprint, analyze(b"abc").fingerprint);
        assert_ne!(analyze(b"abc").fingerprint, analyze(b"abd").fingerprint);
    }

    #[test]
    fn test_empty_buffer() {
        let analysis = analyze(&[]);
        assert_eq!(analysis.size, 0);
        assert!(analysis.head.is_empty());
        assert_eq!(analysis.head_rows().count(), 0);
    }
}
