//! Length-prefixed string discovery for diagnostics.
//!
//! The source format appears to store some names as a little-endian `u32`
//! length followed by UTF-8 bytes. This scan is only used to help inspect
//! unknown files; conversion does not depend on it.

/// Strings of this many bytes or more are ignored
pub const MAX_STRING_LEN: usize = 1000;

/// Minimum number of characters for a candidate to be reported
const MIN_STRING_CHARS: usize = 3;

const PREFIX_LEN: usize = 4;

/// A printable string found behind a plausible length prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateString {
    /// Offset of the length prefix
    pub offset: usize,
    /// Decoded text
    pub text: String,
}

/// Find every printable length-prefixed string in the buffer.
///
/// Every offset is tried as a prefix. Four zero bytes in a row are skipped
/// as a unit since a zero length can never start a string.
pub fn length_prefixed_strings(data: &[u8]) -> Vec<CandidateString> {
    let mut found = Vec::new();
    let mut offset = 0;

    while offset + PREFIX_LEN < data.len() {
        let prefix = [
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ];

        if prefix == [0; PREFIX_LEN] {
            offset += PREFIX_LEN;
            continue;
        }

        let len = u32::from_le_bytes(prefix) as usize;
        let body = offset + PREFIX_LEN;

        if len > 0 && len < MAX_STRING_LEN && body + len < data.len() {
            if let Ok(text) = std::str::from_utf8(&data[body..body + len]) {
                if is_printable(text) && text.chars().count() >= MIN_STRING_CHARS {
                    found.push(CandidateString {
                        offset,
                        text: text.to_string(),
                    });
                }
            }
        }

        offset += 1;
    }

    found
}

fn is_printable(text: &str) -> bool {
    text.chars().all(|c| {
        !c.is_control()
            && (c == ' ' || !c.is_whitespace())
            && !is_format(c)
            && !is_private_use(c)
    })
}

/// Unicode general category `Cf`
fn is_format(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{0890}'..='\u{0891}'
            | '\u{08E2}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{110BD}'
            | '\u{110CD}'
            | '\u{13430}'..='\u{1343F}'
            | '\u{1BCA0}'..='\u{1BCA3}'
            | '\u{1D173}'..='\u{1D17A}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
    )
}

/// Unicode general category `Co`
fn is_private_use(c: char) -> bool {
    matches!(
        c,
        '\u{E000}'..='\u{F8FF}' | '\u{F0000}'..='\u{FFFFD}' | '\u{100000}'..='\u{10FFFD}'
    )
}
