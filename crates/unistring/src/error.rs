use thiserror::Error;

/// Failure reported by the strict (`try_*`) entry points.
///
/// The lenient API never returns this; it substitutes U+FFFD instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeError {
    /// The value is above `0x10FFFF` and has no UTF-8 encoding.
    #[error("codepoint {0:#X} is outside the Unicode range")]
    CodepointOutOfRange(u32),
    /// A surrogate code unit appeared without its partner.
    #[error("unpaired surrogate {unit:#06X} at index {index}")]
    UnpairedSurrogate {
        /// Position of the offending unit in the input.
        index: usize,
        /// The surrogate value itself.
        unit: u32,
    },
    /// The byte sequence starting at `offset` is not well-formed UTF-8.
    #[error("invalid UTF-8 sequence at byte offset {offset}")]
    InvalidUtf8 {
        /// Byte offset of the first byte of the malformed sequence.
        offset: usize,
    },
}
