//! Platform wide-character buffers.
//!
//! A wide buffer is UTF-16 or UTF-32 depending on [`WideWidth`]; both paths
//! are always compiled and tested, and [`NATIVE_WIDE_WIDTH`] only picks the
//! default.
//!
//! [`NATIVE_WIDE_WIDTH`]: crate::NATIVE_WIDE_WIDTH

use alloc::vec::Vec;

use crate::WideWidth;

/// Borrowed wide-character input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WideStr<'a> {
    /// Two-byte units, surrogate pairs allowed.
    Utf16(&'a [u16]),
    /// Four-byte units, one codepoint each.
    Utf32(&'a [u32]),
}

impl WideStr<'_> {
    /// Width of the units in this buffer.
    #[must_use]
    pub fn width(&self) -> WideWidth {
        match self {
            WideStr::Utf16(_) => WideWidth::Utf16,
            WideStr::Utf32(_) => WideWidth::Utf32,
        }
    }

    /// Number of code units.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            WideStr::Utf16(units) => units.len(),
            WideStr::Utf32(units) => units.len(),
        }
    }

    /// Returns `true` when there are no code units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Owned wide-character output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WideString {
    /// Two-byte units.
    Utf16(Vec<u16>),
    /// Four-byte units.
    Utf32(Vec<u32>),
}

impl WideString {
    /// Creates an empty buffer of the given width.
    #[must_use]
    pub fn new(width: WideWidth) -> Self {
        match width {
            WideWidth::Utf16 => WideString::Utf16(Vec::new()),
            WideWidth::Utf32 => WideString::Utf32(Vec::new()),
        }
    }

    /// Width of the units in this buffer.
    #[must_use]
    pub fn width(&self) -> WideWidth {
        self.as_wide_str().width()
    }

    /// Number of code units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_wide_str().len()
    }

    /// Returns `true` when there are no code units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrows the buffer.
    #[must_use]
    pub fn as_wide_str(&self) -> WideStr<'_> {
        match self {
            WideString::Utf16(units) => WideStr::Utf16(units),
            WideString::Utf32(units) => WideStr::Utf32(units),
        }
    }

    /// Writes every unit in native byte order.
    ///
    /// # Errors
    ///
    /// Propagates the writer's errors.
    #[cfg(feature = "std")]
    pub fn write_ne_bytes<W: std::io::Write + ?Sized>(&self, out: &mut W) -> std::io::Result<()> {
        match self {
            WideString::Utf16(units) => {
                let bytes: Vec<u8> = units.iter().flat_map(|u| u.to_ne_bytes()).collect();
                out.write_all(&bytes)
            }
            WideString::Utf32(units) => {
                let bytes: Vec<u8> = units.iter().flat_map(|u| u.to_ne_bytes()).collect();
                out.write_all(&bytes)
            }
        }
    }
}

impl<'a> From<&'a [u16]> for WideStr<'a> {
    fn from(units: &'a [u16]) -> Self {
        WideStr::Utf16(units)
    }
}

impl<'a> From<&'a [u32]> for WideStr<'a> {
    fn from(units: &'a [u32]) -> Self {
        WideStr::Utf32(units)
    }
}
