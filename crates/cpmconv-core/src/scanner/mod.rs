//! Byte-level scanning for content embedded in `.cpmmodel` containers.
//!
//! The container format has no documented schema, so nothing here relies on
//! headers or offset tables. Every function is a pure function over a byte
//! slice with explicit offsets.
//!
//! ## Structurally significant patterns
//!
//! - `{` / `}` delimiting the embedded JSON model description
//! - the 8-byte PNG signature `89 50 4E 47 0D 0A 1A 0A`
//! - the ASCII `IEND` marker, followed by a 4-byte checksum, closing an image
//!
//! ## Algorithm Overview
//!
//! 1. Try every `{` in ascending order; the first one whose balanced-brace
//!    span parses as JSON wins (see [`find_json_object`])
//! 2. Find every PNG signature, pairing each with the next `IEND` marker
//!    (see [`find_png_images`])

mod json;
mod strings;

use std::ops::Range;
use tracing::trace;

pub use json::{
    balanced_brace_end, brace_offsets, find_json_object, JsonMatch, CLOSE_BRACE, OPEN_BRACE,
};
pub use strings::{length_prefixed_strings, CandidateString, MAX_STRING_LEN};

/// PNG file signature
pub const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// Marker of the final PNG chunk
pub const IEND_MARKER: &[u8; 4] = b"IEND";

/// Bytes covered from the start of `IEND` to the end of the image:
/// the 4-byte marker plus its 4-byte checksum
pub const IEND_TRAILER_LEN: usize = 8;

/// A PNG image located inside a buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngMatch {
    /// Byte range of the image, signature through `IEND` checksum
    pub range: Range<usize>,
}

impl PngMatch {
    /// Returns the image bytes from the buffer the match was found in
    pub fn slice<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.range.clone()]
    }

    /// Length of the image in bytes
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Returns true if the match covers no bytes
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Find a subsequence within a byte slice
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Find a subsequence at or after `from`, returning its absolute offset
pub fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    let tail = haystack.get(from..)?;
    find_subsequence(tail, needle).map(|pos| from + pos)
}

/// Offsets of every PNG signature in the buffer.
///
/// The cursor advances one byte past each hit, so overlapping occurrences
/// are all reported.
pub fn png_signature_offsets(data: &[u8]) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut cursor = 0;

    while let Some(pos) = find_from(data, PNG_SIGNATURE, cursor) {
        offsets.push(pos);
        cursor = pos + 1;
    }

    offsets
}

/// Locate embedded PNG images.
///
/// Each signature at `P` is paired with the first `IEND` at or after `P`;
/// the image spans `P..IEND + 8`, clamped to the buffer end. A signature
/// with no later `IEND` yields nothing. Scanning resumes at `P + 1`
/// regardless, so in malformed input one image may contain the start of
/// another.
pub fn find_png_images(data: &[u8]) -> Vec<PngMatch> {
    let mut images = Vec::new();

    for start in png_signature_offsets(data) {
        match find_from(data, IEND_MARKER, start) {
            Some(marker) => {
                let end = (marker + IEND_TRAILER_LEN).min(data.len());
                trace!("PNG at {}..{} ({} bytes)", start, end, end - start);
                images.push(PngMatch { range: start..end });
            }
            None => {
                trace!("PNG signature at {} has no IEND marker, skipping", start);
            }
        }
    }

    images
}
