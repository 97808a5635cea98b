//! UTF-8 backed text with transcoding to and from UTF-16, UTF-32, UCS-2 and
//! Latin-1, and codepoint-indexed access over the UTF-8 bytes.
//!
//! The crate is layered leaves first:
//!
//! - [`utf8`]: encoding, the streaming decoder, and length counting.
//! - [`bridge`]: conversions between UTF-8 and the wide encodings.
//! - [`navigation`]: skipping and reading codepoints by byte offset.
//! - [`Text`]: the owning value built on the three above.
//!
//! Malformed input never fails the lenient API; it is replaced with U+FFFD.
//! The `try_*` constructors report the first problem instead.
//!
//! ```rust
//! use unistring::Text;
//!
//! let text = Text::from_latin1(b"caf\xE9");
//! assert_eq!(text, "café");
//! assert_eq!(text.char_count(), 4);
//! assert_eq!(text.to_utf16(), [0x63, 0x61, 0x66, 0xE9]);
//! ```

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod bridge;
pub mod navigation;
pub mod utf8;

mod error;
mod options;
mod text;
mod wide;

#[cfg(test)]
mod tests;

pub use error::TranscodeError;
pub use navigation::Cursor;
pub use options::{NATIVE_WIDE_WIDTH, SurrogateMode, TextOptions, WideWidth};
pub use text::{CodePoints, Text};
pub use wide::{WideStr, WideString};
