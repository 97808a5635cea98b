mod property;

use alloc::{format, string::String, vec::Vec};

/// Renders bytes as space separated upper-case hex pairs.
pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
