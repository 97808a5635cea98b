//! The owning text value.
//!
//! A [`Text`] keeps exactly one UTF-8 buffer. Every constructor and append
//! transcodes its input into that buffer, so the stored bytes are always
//! well-formed UTF-8, or WTF-8 when the text was built with
//! [`SurrogateMode::Preserve`].
//!
//! Indexing is by codepoint and costs O(n): nothing is cached, because the
//! buffer can change between calls.
//!
//! Iterators and [`Cursor`]s refer to the buffer by offset. Iterators borrow
//! the text, so the borrow checker rules out mutation while one is alive; a
//! `Cursor` does not, and a cursor taken before a mutation is stale. Reading
//! through a stale cursor yields unspecified codepoints, never a panic.

use alloc::{borrow::Cow, string::String, vec::Vec};
use core::{cmp::Ordering, fmt, hash, iter::FusedIterator};

use bstr::{BStr, BString, ByteSlice};

use crate::{
    Cursor, NATIVE_WIDE_WIDTH, SurrogateMode, TextOptions, TranscodeError, WideStr, WideString,
    WideWidth, bridge,
    navigation::skip_code_points,
    utf8::{self, REPLACEMENT_CHARACTER},
};

/// UTF-8 backed text with codepoint indexing.
///
/// # Examples
///
/// ```rust
/// use unistring::Text;
///
/// let text = Text::from_utf16(&[0x61, 0x62, 0x63, 0xD83D, 0xDE00]);
/// assert_eq!(text.char_count(), 4);
/// assert_eq!(text.byte_len(), 7);
/// assert_eq!(text.char_at(3), Some(0x1F600));
/// assert_eq!(text.substring(1, 2), "bc");
/// assert_eq!(text.to_utf16(), [0x61, 0x62, 0x63, 0xD83D, 0xDE00]);
/// ```
#[derive(Clone, Default)]
pub struct Text {
    bytes: BString,
    options: TextOptions,
}

impl Text {
    /// Creates an empty text with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty text with the given options.
    #[must_use]
    pub fn with_options(options: TextOptions) -> Self {
        Self {
            bytes: BString::new(Vec::new()),
            options,
        }
    }

    /// The options this text was created with.
    #[must_use]
    pub fn options(&self) -> TextOptions {
        self.options
    }

    fn mode(&self) -> SurrogateMode {
        self.options.surrogates
    }

    // --------------------------------------------------------------------------------------------
    // Construction
    // --------------------------------------------------------------------------------------------

    /// Builds a text from UTF-16 code units, combining surrogate pairs.
    #[must_use]
    pub fn from_utf16(units: &[u16]) -> Self {
        Self::from_utf16_with(units, TextOptions::default())
    }

    /// Builds a text from UTF-16 code units with explicit options.
    #[must_use]
    pub fn from_utf16_with(units: &[u16], options: TextOptions) -> Self {
        let mut text = Self::with_options(options);
        text.append_utf16(units);
        text
    }

    /// Builds a text from UTF-16, rejecting unpaired surrogates.
    ///
    /// # Errors
    ///
    /// [`TranscodeError::UnpairedSurrogate`] with the index of the first
    /// offending unit.
    pub fn try_from_utf16(units: &[u16]) -> Result<Self, TranscodeError> {
        if let Some((index, unit)) = bridge::find_unpaired_surrogate(units) {
            return Err(TranscodeError::UnpairedSurrogate {
                index,
                unit: unit.into(),
            });
        }
        Ok(Self::from_utf16(units))
    }

    /// Builds a text from UCS-2 units; no surrogate combination happens.
    #[must_use]
    pub fn from_ucs2(units: &[u16]) -> Self {
        Self::from_ucs2_with(units, TextOptions::default())
    }

    /// Builds a text from UCS-2 units with explicit options.
    #[must_use]
    pub fn from_ucs2_with(units: &[u16], options: TextOptions) -> Self {
        let mut text = Self::with_options(options);
        text.append_ucs2(units);
        text
    }

    /// Builds a text from UTF-32 codepoints.
    #[must_use]
    pub fn from_utf32(codepoints: &[u32]) -> Self {
        Self::from_utf32_with(codepoints, TextOptions::default())
    }

    /// Builds a text from UTF-32 codepoints with explicit options.
    #[must_use]
    pub fn from_utf32_with(codepoints: &[u32], options: TextOptions) -> Self {
        let mut text = Self::with_options(options);
        text.append_utf32(codepoints);
        text
    }

    /// Builds a text from UTF-32, rejecting anything that is not a Unicode
    /// scalar value.
    ///
    /// # Errors
    ///
    /// See [`bridge::validate_utf32`].
    pub fn try_from_utf32(codepoints: &[u32]) -> Result<Self, TranscodeError> {
        bridge::validate_utf32(codepoints)?;
        Ok(Self::from_utf32(codepoints))
    }

    /// Builds a text from Latin-1 bytes.
    #[must_use]
    pub fn from_latin1(bytes: &[u8]) -> Self {
        let mut text = Self::new();
        text.append_latin1(bytes);
        text
    }

    /// Builds a text from UTF-8 bytes, replacing malformed sequences.
    #[must_use]
    pub fn from_utf8_lossy(bytes: &[u8]) -> Self {
        let mut text = Self::new();
        text.append_utf8_lossy(bytes);
        text
    }

    /// Builds a text from UTF-8 bytes that must be well-formed.
    ///
    /// # Errors
    ///
    /// [`TranscodeError::InvalidUtf8`] with the offset of the first malformed
    /// sequence.
    pub fn try_from_utf8(bytes: &[u8]) -> Result<Self, TranscodeError> {
        match utf8::first_invalid(bytes, SurrogateMode::Replace) {
            Some(offset) => Err(TranscodeError::InvalidUtf8 { offset }),
            None => Ok(Self {
                bytes: BString::from(bytes),
                options: TextOptions::default(),
            }),
        }
    }

    /// Builds a text from a platform wide-character buffer.
    #[must_use]
    pub fn from_wide(wide: WideStr<'_>) -> Self {
        let mut text = Self::new();
        text.append_wide(wide);
        text
    }

    // --------------------------------------------------------------------------------------------
    // Mutation
    // --------------------------------------------------------------------------------------------

    /// Appends UTF-16 code units.
    pub fn append_utf16(&mut self, units: &[u16]) {
        let mode = self.mode();
        bridge::append_utf16(&mut self.bytes, units, mode);
    }

    /// Appends UCS-2 code units.
    pub fn append_ucs2(&mut self, units: &[u16]) {
        let mode = self.mode();
        bridge::append_ucs2(&mut self.bytes, units, mode);
    }

    /// Appends UTF-32 codepoints.
    pub fn append_utf32(&mut self, codepoints: &[u32]) {
        let mode = self.mode();
        bridge::append_utf32(&mut self.bytes, codepoints, mode);
    }

    /// Appends one codepoint.
    pub fn push_code_point(&mut self, codepoint: u32) {
        self.append_utf32(&[codepoint]);
    }

    /// Appends Latin-1 bytes.
    pub fn append_latin1(&mut self, bytes: &[u8]) {
        bridge::append_latin1(&mut self.bytes, bytes);
    }

    /// Appends UTF-8 bytes, replacing malformed sequences.
    pub fn append_utf8_lossy(&mut self, bytes: &[u8]) {
        let mode = self.mode();
        bridge::append_utf8_lossy(&mut self.bytes, bytes, mode);
    }

    /// Appends a string slice verbatim.
    pub fn push_str(&mut self, s: &str) {
        self.bytes.extend_from_slice(s.as_bytes());
    }

    /// Appends a wide-character buffer.
    pub fn append_wide(&mut self, wide: WideStr<'_>) {
        match wide {
            WideStr::Utf16(units) => self.append_utf16(units),
            WideStr::Utf32(units) => self.append_utf32(units),
        }
    }

    /// Appends another text. Surrogates the other text preserved are
    /// replaced if this text does not preserve them.
    ///
    /// A preserved high surrogate at the end of this text and a preserved
    /// low surrogate at the start of `other` are joined into one
    /// supplementary codepoint, so the result is stored exactly as if the
    /// pair had been ingested in one call.
    pub fn append(&mut self, other: &Text) {
        if other.mode() == SurrogateMode::Preserve && self.mode() == SurrogateMode::Replace {
            self.append_utf32(&other.to_utf32());
            return;
        }
        match (final_high_surrogate(&self.bytes), initial_low_surrogate(&other.bytes)) {
            (Some(high), Some(low)) => {
                let keep = self.bytes.len() - 3;
                self.bytes.truncate(keep);
                self.bytes.reserve(other.bytes.len() + 1);
                utf8::push_lossy(&mut self.bytes, bridge::combine_surrogates(high, low));
                self.bytes.extend_from_slice(&other.bytes[3..]);
            }
            _ => self.bytes.extend_from_slice(&other.bytes),
        }
    }

    /// Removes all content, keeping the allocation.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    // --------------------------------------------------------------------------------------------
    // Conversion
    // --------------------------------------------------------------------------------------------

    /// The canonical bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The canonical bytes as a byte string.
    #[must_use]
    pub fn as_bstr(&self) -> &BStr {
        self.bytes.as_bstr()
    }

    /// Consumes the text and returns its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes.into()
    }

    /// Borrows the content as `&str`; `None` only when preserved surrogates
    /// are stored.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.bytes.to_str().ok()
    }

    /// The content as a string, with preserved surrogates replaced.
    #[must_use]
    pub fn to_utf8_lossy(&self) -> Cow<'_, str> {
        match self.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(self.chars().collect()),
        }
    }

    /// Appends the content to `out` as UTF-16.
    pub fn write_utf16_into(&self, out: &mut Vec<u16>) {
        bridge::utf8_to_utf16(&self.bytes, self.mode(), out);
    }

    /// The content as UTF-16.
    #[must_use]
    pub fn to_utf16(&self) -> Vec<u16> {
        let mut out = Vec::new();
        self.write_utf16_into(&mut out);
        out
    }

    /// Appends the content to `out` as UTF-32.
    pub fn write_utf32_into(&self, out: &mut Vec<u32>) {
        bridge::utf8_to_utf32(&self.bytes, self.mode(), out);
    }

    /// The content as UTF-32.
    #[must_use]
    pub fn to_utf32(&self) -> Vec<u32> {
        let mut out = Vec::new();
        self.write_utf32_into(&mut out);
        out
    }

    /// The content as platform wide characters.
    #[must_use]
    pub fn to_wide(&self) -> WideString {
        self.to_wide_with(NATIVE_WIDE_WIDTH)
    }

    /// The content as wide characters of an explicit width.
    #[must_use]
    pub fn to_wide_with(&self, width: WideWidth) -> WideString {
        let mut wide = WideString::new(width);
        match &mut wide {
            WideString::Utf16(units) => self.write_utf16_into(units),
            WideString::Utf32(codepoints) => self.write_utf32_into(codepoints),
        }
        wide
    }

    // --------------------------------------------------------------------------------------------
    // Codepoint access
    // --------------------------------------------------------------------------------------------

    /// Number of codepoints. O(n).
    #[must_use]
    pub fn char_count(&self) -> usize {
        utf8::count_code_points(&self.bytes, self.mode())
    }

    /// Number of bytes in canonical storage.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` when the text holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The codepoint at `index`, or `None` past the end.
    #[must_use]
    pub fn char_at(&self, index: usize) -> Option<u32> {
        self.read(self.cursor().advance(&self.bytes, index))
    }

    /// Codepoints `[start, start + count)`.
    ///
    /// A negative `count` takes everything from `start` to the end; zero
    /// yields an empty text. Out-of-range bounds are clamped. The result
    /// shares this text's options.
    #[must_use]
    pub fn substring(&self, start: usize, count: isize) -> Text {
        let mut result = Self::with_options(self.options);
        if count == 0 {
            return result;
        }
        let end = self.bytes.len();
        let from = skip_code_points(&self.bytes, 0, end, start);
        let to = match usize::try_from(count) {
            Ok(count) => skip_code_points(&self.bytes, from, end, count),
            Err(_) => end,
        };
        result.bytes.extend_from_slice(&self.bytes[from..to]);
        result
    }

    /// A cursor at the first codepoint.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor::new(0, self.bytes.len())
    }

    /// Reads the codepoint under `cursor`.
    #[must_use]
    pub fn read(&self, cursor: Cursor) -> Option<u32> {
        cursor.read(&self.bytes, self.mode())
    }

    /// Iterates over codepoints.
    #[must_use]
    pub fn code_points(&self) -> CodePoints<'_> {
        CodePoints {
            bytes: &self.bytes,
            cursor: self.cursor(),
            mode: self.mode(),
        }
    }

    /// Iterates over `char`s; preserved surrogates come out as U+FFFD.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.code_points()
            .map(|cp| char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    // --------------------------------------------------------------------------------------------
    // Stream output
    // --------------------------------------------------------------------------------------------

    /// Writes the canonical bytes verbatim.
    ///
    /// # Errors
    ///
    /// Propagates the writer's errors.
    #[cfg(feature = "std")]
    pub fn write_to<W: std::io::Write + ?Sized>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(&self.bytes)
    }

    /// Converts to platform wide characters and writes them in native byte
    /// order.
    ///
    /// # Errors
    ///
    /// Propagates the writer's errors.
    #[cfg(feature = "std")]
    pub fn write_wide_to<W: std::io::Write + ?Sized>(&self, out: &mut W) -> std::io::Result<()> {
        self.to_wide().write_ne_bytes(out)
    }
}

/// Lazy iterator over the codepoints of a [`Text`].
///
/// Cloning restarts nothing; it forks the iteration at the current position.
/// Call [`Text::code_points`] again to start over.
#[derive(Debug, Clone)]
pub struct CodePoints<'a> {
    bytes: &'a [u8],
    cursor: Cursor,
    mode: SurrogateMode,
}

impl CodePoints<'_> {
    /// Byte offset of the next codepoint.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.cursor.position()
    }
}

impl Iterator for CodePoints<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let cp = self.cursor.read(self.bytes, self.mode)?;
        self.cursor = self.cursor.advance(self.bytes, 1);
        Some(cp)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.end().saturating_sub(self.cursor.position());
        (remaining.div_ceil(4), Some(remaining))
    }
}

impl FusedIterator for CodePoints<'_> {}

impl<'a> IntoIterator for &'a Text {
    type Item = u32;
    type IntoIter = CodePoints<'a>;

    fn into_iter(self) -> CodePoints<'a> {
        self.code_points()
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_utf8_lossy(), f)
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_bstr(), f)
    }
}

/// Texts are equal when their stored bytes are. Preserved surrogates that
/// UCS-2 ingestion kept apart are not paired for comparison, so such a text
/// differs from one holding the combined codepoint.
impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Text {}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialOrd for Text {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Text {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

impl hash::Hash for Text {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        hash::Hash::hash(&self.bytes, state);
    }
}

/// The high surrogate a WTF-8 buffer ends with, if any.
fn final_high_surrogate(bytes: &[u8]) -> Option<u16> {
    match *bytes {
        [.., 0xED, b2 @ 0xA0..=0xAF, b3] => Some(wtf8_surrogate(b2, b3)),
        _ => None,
    }
}

/// The low surrogate a WTF-8 buffer starts with, if any.
fn initial_low_surrogate(bytes: &[u8]) -> Option<u16> {
    match *bytes {
        [0xED, b2 @ 0xB0..=0xBF, b3, ..] => Some(wtf8_surrogate(b2, b3)),
        _ => None,
    }
}

fn wtf8_surrogate(b2: u8, b3: u8) -> u16 {
    0xD000 | (u16::from(b2 & 0x3F) << 6) | u16::from(b3 & 0x3F)
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self {
            bytes: BString::from(s),
            options: TextOptions::default(),
        }
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self {
            bytes: BString::from(s),
            options: TextOptions::default(),
        }
    }
}

impl From<char> for Text {
    fn from(ch: char) -> Self {
        let mut buf = [0u8; 4];
        Self::from(&*ch.encode_utf8(&mut buf))
    }
}

impl FromIterator<char> for Text {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        let mut text = Self::new();
        text.extend(iter);
        text
    }
}

impl Extend<char> for Text {
    fn extend<I: IntoIterator<Item = char>>(&mut self, iter: I) {
        let mut buf = [0u8; 4];
        for ch in iter {
            self.bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
    }
}

impl Extend<u32> for Text {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        let mode = self.mode();
        for cp in iter {
            let cp = if mode == SurrogateMode::Replace && bridge::is_surrogate(cp) {
                REPLACEMENT_CHARACTER
            } else {
                cp
            };
            utf8::push_lossy(&mut self.bytes, cp);
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Text {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_utf8_lossy())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Text {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <String as serde::Deserialize>::deserialize(deserializer).map(Text::from)
    }
}
