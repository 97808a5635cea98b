/// How unpaired surrogates are stored when ingesting UTF-16, UCS-2 or
/// UTF-32 input.
///
/// # Examples
///
/// ```rust
/// use unistring::{SurrogateMode, Text, TextOptions};
///
/// let lone = [0x61, 0xD800];
/// let replaced = Text::from_utf16(&lone);
/// assert_eq!(replaced.as_bytes(), b"a\xEF\xBF\xBD");
///
/// let kept = Text::from_utf16_with(&lone, TextOptions { surrogates: SurrogateMode::Preserve });
/// assert_eq!(kept.as_bytes(), b"a\xED\xA0\x80");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SurrogateMode {
    /// Substitute U+FFFD. Storage stays well-formed UTF-8.
    #[default]
    Replace,
    /// Encode the raw 16-bit value as a three byte sequence (WTF-8).
    ///
    /// Storage may then hold encoded surrogates; decoding of such a text
    /// accepts them and yields the surrogate value as a codepoint.
    Preserve,
}

/// Construction options for a [`Text`](crate::Text).
///
/// # Default
///
/// Unpaired surrogates are replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextOptions {
    /// Policy for unpaired surrogates.
    pub surrogates: SurrogateMode,
}

/// Width of a platform wide character, in code units of that encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WideWidth {
    /// Two-byte wide characters; routed through the UTF-16 bridge.
    Utf16,
    /// Four-byte wide characters; routed through the UTF-32 bridge.
    Utf32,
}

/// The wide-character width of the target platform (`wchar_t`).
pub const NATIVE_WIDE_WIDTH: WideWidth = if cfg!(windows) {
    WideWidth::Utf16
} else {
    WideWidth::Utf32
};
