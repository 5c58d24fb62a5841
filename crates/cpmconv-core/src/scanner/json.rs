//! Recovery of the embedded JSON model description.
//!
//! Braces are counted as raw bytes. A `{` or `}` inside a JSON string
//! literal still moves the depth counter, so a payload containing literal
//! braces in its strings ends up unbalanced or mis-sliced and fails to
//! parse. Payloads written by the source application carry no such strings,
//! and callers fall back to default model data when parsing fails.
//!
//! Parsing keeps serde_json's nesting limit of 128 levels. A payload nested
//! deeper is rejected at its outer brace like any other unparseable span,
//! and the scan moves on to the next `{`, which may be an inner object.
//! Numbers keep their exact source text, so integers wider than 64 bits
//! survive the round trip into `model.json`.

use serde_json::{Map, Value};
use std::ops::Range;
use tracing::trace;

/// Opening brace byte
pub const OPEN_BRACE: u8 = b'{';

/// Closing brace byte
pub const CLOSE_BRACE: u8 = b'}';

/// A JSON object located inside a buffer
#[derive(Debug, Clone, PartialEq)]
pub struct JsonMatch {
    /// Byte range from the opening brace through the closing brace
    pub range: Range<usize>,
    /// The parsed object
    pub document: Map<String, Value>,
}

/// Returns the offset one past the brace closing the one at `open`.
///
/// Depth starts at 1 for the byte at `open`, which is assumed to be `{`.
/// Returns `None` if the buffer ends before depth returns to zero.
pub fn balanced_brace_end(data: &[u8], open: usize) -> Option<usize> {
    let mut depth: usize = 1;

    for (pos, &byte) in data.iter().enumerate().skip(open + 1) {
        match byte {
            OPEN_BRACE => depth += 1,
            CLOSE_BRACE => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos + 1);
                }
            }
            _ => {}
        }
    }

    None
}

/// Offsets of every `{` that may start a JSON object.
///
/// The final byte of the buffer is never a candidate: a lone brace there
/// cannot be closed.
pub fn brace_offsets(data: &[u8]) -> Vec<usize> {
    let limit = data.len().saturating_sub(1);
    data[..limit]
        .iter()
        .enumerate()
        .filter(|(_, byte)| **byte == OPEN_BRACE)
        .map(|(pos, _)| pos)
        .collect()
}

/// Find the first balanced-brace span that parses as a JSON object.
///
/// Candidates are tried in ascending offset order and scanning stops at the
/// first success. Spans that are not valid UTF-8 or not valid JSON are
/// abandoned and the next `{` is tried.
pub fn find_json_object(data: &[u8]) -> Option<JsonMatch> {
    for start in brace_offsets(data) {
        let Some(end) = balanced_brace_end(data, start) else {
            trace!("Unbalanced brace at {}", start);
            continue;
        };

        match parse_object(&data[start..end]) {
            Some(document) => {
                trace!("Parsed JSON object at {}..{}", start, end);
                return Some(JsonMatch {
                    range: start..end,
                    document,
                });
            }
            None => {
                trace!("Span {}..{} is not a JSON object", start, end);
            }
        }
    }

    None
}

fn parse_object(bytes: &[u8]) -> Option<Map<String, Value>> {
    let text = std::str::from_utf8(bytes).ok()?;
    serde_json::from_str(text).ok()
}
