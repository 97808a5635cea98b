//! UTF-8 encoding, a byte-at-a-time decoder, and length counting.
//!
//! The decoder is a small finite-state acceptor: every call to
//! [`Utf8Decoder::feed`] consumes exactly one byte and reports whether a
//! codepoint was completed, the sequence was rejected, or more bytes are
//! needed. It runs directly over untrusted buffers and recovers from corrupt
//! input mid-stream; a rejection always returns the decoder to its initial
//! state.
//!
//! The first continuation byte after `E0`, `ED`, `F0` and `F4` is range
//! checked so that overlong forms, encoded surrogates and values above
//! `0x10FFFF` are rejected as early as possible. The WTF-8 flavour
//! ([`Utf8Decoder::wtf8`]) lifts the restriction after `ED` so that stored
//! surrogates decode back to their 16-bit value.

use alloc::vec::Vec;

use crate::{SurrogateMode, TranscodeError};

/// U+FFFD REPLACEMENT CHARACTER.
pub const REPLACEMENT_CHARACTER: u32 = 0xFFFD;

/// The largest Unicode codepoint.
pub const MAX_CODEPOINT: u32 = 0x10_FFFF;

/// Outcome of feeding one byte to a [`Utf8Decoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A complete codepoint; the decoder is back in its initial state.
    Accepted(u32),
    /// The bytes seen so far cannot start or continue a valid sequence. The
    /// decoder has been reset.
    Rejected,
    /// A multi-byte sequence is in progress.
    Incomplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    /// `n` continuation bytes in `80..=BF` remain.
    Tail(u8),
    /// The next continuation byte must lie in `lo..=hi`; `rest` follow it.
    Bounded { lo: u8, hi: u8, rest: u8 },
}

/// Streaming UTF-8 decoder.
///
/// ```rust
/// use unistring::utf8::{Decoded, Utf8Decoder};
///
/// let mut decoder = Utf8Decoder::new();
/// let outcomes: Vec<_> = [0xF0, 0x9F, 0x98, 0x80].iter().map(|&b| decoder.feed(b)).collect();
/// assert_eq!(outcomes.last(), Some(&Decoded::Accepted(0x1F600)));
/// ```
#[derive(Debug, Clone)]
pub struct Utf8Decoder {
    state: State,
    codepoint: u32,
    wtf8: bool,
}

impl Default for Utf8Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Utf8Decoder {
    /// Creates a strict decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: State::Start,
            codepoint: 0,
            wtf8: false,
        }
    }

    /// Creates a decoder that also accepts encoded surrogates (WTF-8).
    #[must_use]
    pub const fn wtf8() -> Self {
        Self {
            state: State::Start,
            codepoint: 0,
            wtf8: true,
        }
    }

    /// Creates the decoder matching a text's surrogate policy.
    #[must_use]
    pub const fn for_mode(mode: SurrogateMode) -> Self {
        match mode {
            SurrogateMode::Replace => Self::new(),
            SurrogateMode::Preserve => Self::wtf8(),
        }
    }

    /// Discards any partially decoded sequence.
    pub fn reset(&mut self) {
        self.state = State::Start;
        self.codepoint = 0;
    }

    /// Returns `true` when no sequence is in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == State::Start
    }

    /// Number of continuation bytes still expected.
    #[must_use]
    pub fn pending(&self) -> u8 {
        match self.state {
            State::Start => 0,
            State::Tail(n) => n,
            State::Bounded { rest, .. } => rest + 1,
        }
    }

    /// Advances the decoder by one byte.
    pub fn feed(&mut self, byte: u8) -> Decoded {
        match self.state {
            State::Start => self.lead(byte),
            State::Tail(n) => self.continuation(byte, 0x80, 0xBF, n - 1),
            State::Bounded { lo, hi, rest } => self.continuation(byte, lo, hi, rest),
        }
    }

    fn lead(&mut self, byte: u8) -> Decoded {
        let (codepoint, state) = match byte {
            0x00..=0x7F => return Decoded::Accepted(u32::from(byte)),
            0xC2..=0xDF => (byte & 0x1F, State::Tail(1)),
            0xE0 => (0, State::Bounded { lo: 0xA0, hi: 0xBF, rest: 1 }),
            0xED if !self.wtf8 => (0x0D, State::Bounded { lo: 0x80, hi: 0x9F, rest: 1 }),
            0xE1..=0xEF => (byte & 0x0F, State::Tail(2)),
            0xF0 => (0, State::Bounded { lo: 0x90, hi: 0xBF, rest: 2 }),
            0xF1..=0xF3 => (byte & 0x07, State::Tail(3)),
            0xF4 => (0x04, State::Bounded { lo: 0x80, hi: 0x8F, rest: 2 }),
            // Continuation bytes, overlong leads C0/C1 and F5..=FF.
            _ => return self.reject(),
        };
        self.codepoint = u32::from(codepoint);
        self.state = state;
        Decoded::Incomplete
    }

    fn continuation(&mut self, byte: u8, lo: u8, hi: u8, rest: u8) -> Decoded {
        if !(lo..=hi).contains(&byte) {
            return self.reject();
        }
        self.codepoint = (self.codepoint << 6) | u32::from(byte & 0x3F);
        if rest == 0 {
            let codepoint = self.codepoint;
            self.reset();
            Decoded::Accepted(codepoint)
        } else {
            self.state = State::Tail(rest);
            Decoded::Incomplete
        }
    }

    fn reject(&mut self) -> Decoded {
        self.reset();
        Decoded::Rejected
    }
}

/// Number of bytes `codepoint` occupies in UTF-8.
///
/// Values above `0x10FFFF` report the length of U+FFFD, which is what the
/// lenient appends write in their place.
#[must_use]
pub const fn encoded_len(codepoint: u32) -> usize {
    match codepoint {
        0..0x80 => 1,
        0x80..0x800 => 2,
        0x800..0x1_0000 => 3,
        0x1_0000..=MAX_CODEPOINT => 4,
        _ => 3,
    }
}

/// Encodes `codepoint` into `buf` and returns the written prefix.
///
/// Surrogate values are encoded as their three byte WTF-8 form; deciding
/// whether they are acceptable is the caller's business.
///
/// # Errors
///
/// [`TranscodeError::CodepointOutOfRange`] for values above `0x10FFFF`.
pub fn encode(codepoint: u32, buf: &mut [u8; 4]) -> Result<&[u8], TranscodeError> {
    if codepoint > MAX_CODEPOINT {
        return Err(TranscodeError::CodepointOutOfRange(codepoint));
    }
    Ok(encode_unchecked(codepoint, buf))
}

#[allow(clippy::cast_possible_truncation)]
fn encode_unchecked(cp: u32, buf: &mut [u8; 4]) -> &[u8] {
    let len = encoded_len(cp);
    match len {
        1 => buf[0] = cp as u8,
        2 => {
            buf[0] = 0xC0 | (cp >> 6) as u8;
            buf[1] = 0x80 | (cp & 0x3F) as u8;
        }
        3 => {
            buf[0] = 0xE0 | (cp >> 12) as u8;
            buf[1] = 0x80 | ((cp >> 6) & 0x3F) as u8;
            buf[2] = 0x80 | (cp & 0x3F) as u8;
        }
        _ => {
            buf[0] = 0xF0 | (cp >> 18) as u8;
            buf[1] = 0x80 | ((cp >> 12) & 0x3F) as u8;
            buf[2] = 0x80 | ((cp >> 6) & 0x3F) as u8;
            buf[3] = 0x80 | (cp & 0x3F) as u8;
        }
    }
    &buf[..len]
}

/// Appends the encoding of `codepoint` to `out`, writing U+FFFD for values
/// above `0x10FFFF`. Returns `false` when a substitution happened.
pub(crate) fn push_lossy(out: &mut Vec<u8>, codepoint: u32) -> bool {
    let mut buf = [0u8; 4];
    match encode(codepoint, &mut buf) {
        Ok(bytes) => {
            out.extend_from_slice(bytes);
            true
        }
        Err(_) => {
            out.extend_from_slice(encode_unchecked(REPLACEMENT_CHARACTER, &mut buf));
            false
        }
    }
}

/// Decodes the codepoint at the start of `bytes`.
///
/// Returns the codepoint and the number of bytes it covered, or `None` when
/// `bytes` is empty. Malformed input yields U+FFFD: a lone invalid byte
/// covers one byte, and a valid prefix interrupted by a bad byte covers the
/// prefix only, so the bad byte is examined again as a potential lead. A
/// sequence truncated by the end of `bytes` covers the remainder.
#[must_use]
pub fn decode_first(bytes: &[u8], mode: SurrogateMode) -> Option<(u32, usize)> {
    let first = *bytes.first()?;
    if first < 0x80 {
        return Some((u32::from(first), 1));
    }

    let mut decoder = Utf8Decoder::for_mode(mode);
    for (i, &byte) in bytes.iter().enumerate() {
        match decoder.feed(byte) {
            Decoded::Accepted(cp) => return Some((cp, i + 1)),
            Decoded::Rejected => return Some((REPLACEMENT_CHARACTER, i.max(1))),
            Decoded::Incomplete => {}
        }
    }
    Some((REPLACEMENT_CHARACTER, bytes.len()))
}

/// Iterator over `(codepoint, byte_len)` pairs of a byte buffer.
#[derive(Debug, Clone)]
pub(crate) struct Decode<'a> {
    bytes: &'a [u8],
    mode: SurrogateMode,
}

impl<'a> Decode<'a> {
    pub(crate) fn new(bytes: &'a [u8], mode: SurrogateMode) -> Self {
        Self { bytes, mode }
    }
}

impl Iterator for Decode<'_> {
    type Item = (u32, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (cp, len) = decode_first(self.bytes, self.mode)?;
        self.bytes = &self.bytes[len..];
        Some((cp, len))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.bytes.len().div_ceil(4), Some(self.bytes.len()))
    }
}

/// Counts the codepoints [`decode_first`] would produce for `bytes`,
/// replacement characters included.
#[must_use]
pub fn count_code_points(bytes: &[u8], mode: SurrogateMode) -> usize {
    let mut count = 0;
    let mut rest = bytes;
    while let Some(&b) = rest.first() {
        let len = if b < 0x80 {
            1
        } else {
            decode_first(rest, mode).map_or(rest.len(), |(_, len)| len)
        };
        rest = &rest[len..];
        count += 1;
    }
    count
}

/// Sums the UTF-8 length of every codepoint, as written by the lenient
/// appends.
#[must_use]
pub fn count_bytes(codepoints: &[u32]) -> usize {
    codepoints.iter().map(|&cp| encoded_len(cp)).sum()
}

/// Returns the offset of the first malformed sequence, if any.
pub(crate) fn first_invalid(bytes: &[u8], mode: SurrogateMode) -> Option<usize> {
    let mut offset = 0;
    let mut decoder = Utf8Decoder::for_mode(mode);
    for (i, &byte) in bytes.iter().enumerate() {
        let idle = decoder.is_idle();
        match decoder.feed(byte) {
            Decoded::Accepted(_) => offset = i + 1,
            Decoded::Rejected => return Some(if idle { i } else { offset }),
            Decoded::Incomplete => {}
        }
    }
    (!decoder.is_idle()).then_some(offset)
}

/// Offset of the first sequence [`decode_first`] would replace.
///
/// Exposed only so fuzz targets can cross-check the lossy appends.
#[cfg(feature = "fuzzing")]
#[must_use]
pub fn first_invalid_offset(bytes: &[u8], mode: SurrogateMode) -> Option<usize> {
    first_invalid(bytes, mode)
}
