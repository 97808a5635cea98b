//! Codepoint-indexed movement over UTF-8 bytes.
//!
//! Positions are plain byte offsets. Nothing here borrows the buffer beyond a
//! single call, so a [`Cursor`] can outlive a reallocation of its text; it is
//! then merely stale. Stale or out-of-range positions are clamped to the
//! buffer and never panic.

use crate::{SurrogateMode, utf8};

/// Sequence length announced by a lead byte, or `None` for a continuation
/// byte.
fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0x80..=0xBF => None,
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xFF => Some(4),
    }
}

/// Advances `pos` by `n` codepoints and returns the new byte offset.
///
/// Sequence lengths come from lead bytes alone. Starting on a continuation
/// byte consumes the run of continuation bytes as one codepoint, which
/// resynchronizes on the next lead. Returns `end` when fewer than `n`
/// codepoints remain; a truncated final sequence never moves past `end`.
#[must_use]
pub fn skip_code_points(bytes: &[u8], pos: usize, end: usize, n: usize) -> usize {
    let end = end.min(bytes.len());
    let mut cur = pos.min(end);
    for _ in 0..n {
        if cur >= end {
            break;
        }
        let step = sequence_len(bytes[cur]).unwrap_or_else(|| {
            1 + bytes[cur + 1..end]
                .iter()
                .take_while(|&&b| b & 0xC0 == 0x80)
                .count()
        });
        cur = (cur + step).min(end);
    }
    cur
}

/// Decodes the codepoint starting at `pos`.
///
/// Returns `None` when `pos` is at or past `end`, and U+FFFD when the bytes
/// at `pos` are malformed.
#[must_use]
pub fn read_code_point(bytes: &[u8], pos: usize, end: usize, mode: SurrogateMode) -> Option<u32> {
    let end = end.min(bytes.len());
    let window = bytes.get(pos..end)?;
    utf8::decode_first(window, mode).map(|(cp, _)| cp)
}

/// A byte position paired with the end of its range.
///
/// ```rust
/// use unistring::Text;
///
/// let text = Text::from("añb");
/// let cursor = text.cursor().advance(text.as_bytes(), 1);
/// assert_eq!(cursor.position(), 1);
/// assert_eq!(text.read(cursor), Some('ñ' as u32));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    pos: usize,
    end: usize,
}

impl Cursor {
    /// Creates a cursor at `pos` bounded by `end`.
    #[must_use]
    pub const fn new(pos: usize, end: usize) -> Self {
        Self { pos, end }
    }

    /// Byte offset of the cursor.
    #[must_use]
    pub const fn position(self) -> usize {
        self.pos
    }

    /// End of the range the cursor moves in.
    #[must_use]
    pub const fn end(self) -> usize {
        self.end
    }

    /// Returns `true` once the cursor has reached its end.
    #[must_use]
    pub const fn is_at_end(self) -> bool {
        self.pos >= self.end
    }

    /// Returns the cursor moved `n` codepoints forward within `bytes`.
    #[must_use]
    pub fn advance(self, bytes: &[u8], n: usize) -> Self {
        Self {
            pos: skip_code_points(bytes, self.pos, self.end, n),
            end: self.end,
        }
    }

    /// Decodes the codepoint under the cursor.
    #[must_use]
    pub fn read(self, bytes: &[u8], mode: SurrogateMode) -> Option<u32> {
        read_code_point(bytes, self.pos, self.end, mode)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::utf8::REPLACEMENT_CHARACTER;

    const MIXED: &str = "aé€😀z";

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(2, 3)]
    #[case(3, 6)]
    #[case(4, 10)]
    #[case(5, 11)]
    #[case(6, 11)]
    #[case(usize::MAX, 11)]
    fn skip_from_start(#[case] n: usize, #[case] offset: usize) {
        let bytes = MIXED.as_bytes();
        assert_eq!(skip_code_points(bytes, 0, bytes.len(), n), offset);
    }

    #[test]
    fn skip_respects_end() {
        let bytes = MIXED.as_bytes();
        assert_eq!(skip_code_points(bytes, 0, 4, 10), 4);
        assert_eq!(skip_code_points(bytes, 0, 100, 10), bytes.len());
    }

    #[test]
    fn skip_resyncs_inside_sequence() {
        // Offset 7 is the second byte of the emoji.
        let bytes = MIXED.as_bytes();
        assert_eq!(skip_code_points(bytes, 7, bytes.len(), 1), 10);
        assert_eq!(skip_code_points(bytes, 7, bytes.len(), 2), 11);
    }

    #[test]
    fn skip_truncated_sequence_stops_at_end() {
        let bytes = [b'a', 0xF0, 0x9F];
        assert_eq!(skip_code_points(&bytes, 0, bytes.len(), 2), 3);
        assert_eq!(skip_code_points(&[0x80, 0x80], 0, 2, 1), 2);
    }

    #[test]
    fn read_at_positions() {
        let bytes = MIXED.as_bytes();
        let mode = SurrogateMode::Replace;
        assert_eq!(read_code_point(bytes, 0, bytes.len(), mode), Some('a' as u32));
        assert_eq!(read_code_point(bytes, 6, bytes.len(), mode), Some(0x1F600));
        assert_eq!(read_code_point(bytes, 7, bytes.len(), mode), Some(REPLACEMENT_CHARACTER));
        assert_eq!(read_code_point(bytes, bytes.len(), bytes.len(), mode), None);
        assert_eq!(read_code_point(bytes, 50, 60, mode), None);
    }

    #[test]
    fn read_distinguishes_nul_from_end() {
        let bytes = b"\0";
        assert_eq!(read_code_point(bytes, 0, 1, SurrogateMode::Replace), Some(0));
        assert_eq!(read_code_point(bytes, 1, 1, SurrogateMode::Replace), None);
    }

    #[test]
    fn cursor_walks_to_end() {
        let bytes = MIXED.as_bytes();
        let mut cursor = Cursor::new(0, bytes.len());
        let mut seen = 0;
        while !cursor.is_at_end() {
            assert!(cursor.read(bytes, SurrogateMode::Replace).is_some());
            cursor = cursor.advance(bytes, 1);
            seen += 1;
        }
        assert_eq!(seen, 5);
        assert_eq!(cursor.position(), cursor.end());
    }
}
