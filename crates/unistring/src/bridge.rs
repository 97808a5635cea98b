//! Conversions between canonical UTF-8 and the wide source encodings.
//!
//! Every `append_*` function has a matching `*_utf8_len` that reports the
//! exact number of bytes the append will write, so callers can reserve once.
//! Appends return how many units were replaced by U+FFFD.

use alloc::vec::Vec;

use crate::{
    SurrogateMode, TranscodeError,
    utf8::{self, Decode, REPLACEMENT_CHARACTER},
};

const HIGH_SURROGATES: core::ops::RangeInclusive<u32> = 0xD800..=0xDBFF;
const LOW_SURROGATES: core::ops::RangeInclusive<u32> = 0xDC00..=0xDFFF;

/// Returns `true` for `0xD800..=0xDBFF`.
#[must_use]
pub fn is_high_surrogate(unit: u32) -> bool {
    HIGH_SURROGATES.contains(&unit)
}

/// Returns `true` for `0xDC00..=0xDFFF`.
#[must_use]
pub fn is_low_surrogate(unit: u32) -> bool {
    LOW_SURROGATES.contains(&unit)
}

/// Returns `true` for any surrogate value.
#[must_use]
pub fn is_surrogate(unit: u32) -> bool {
    (0xD800..=0xDFFF).contains(&unit)
}

/// Combines a high/low surrogate pair into one codepoint.
#[must_use]
pub fn combine_surrogates(high: u16, low: u16) -> u32 {
    0x1_0000 + (u32::from(high) - 0xD800) * 0x400 + (u32::from(low) - 0xDC00)
}

/// Splits a supplementary-plane codepoint (`0x10000..=0x10FFFF`) into its
/// high/low surrogate pair.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn split_surrogates(codepoint: u32) -> (u16, u16) {
    debug_assert!(codepoint > 0xFFFF && codepoint <= utf8::MAX_CODEPOINT);
    let high = 0xD7C0 + (codepoint >> 10);
    let low = 0xDC00 + (codepoint & 0x3FF);
    (high as u16, low as u16)
}

/// Writes a surrogate that has no partner, following `mode`.
fn push_unpaired(out: &mut Vec<u8>, unit: u32, mode: SurrogateMode) -> bool {
    match mode {
        SurrogateMode::Replace => {
            utf8::push_lossy(out, REPLACEMENT_CHARACTER);
            false
        }
        SurrogateMode::Preserve => utf8::push_lossy(out, unit),
    }
}

fn log_replacements(source: &str, replaced: usize) {
    if replaced > 0 {
        log::debug!("{source} ingestion replaced {replaced} unit(s) with U+FFFD");
    }
}

// ------------------------------------------------------------------------------------------------
// Direction A: into UTF-8
// ------------------------------------------------------------------------------------------------

/// Exact UTF-8 length of [`append_utf16`]'s output.
///
/// A high surrogate followed by a low surrogate consumes two units and
/// yields four bytes; anything else in the BMP, paired or not, yields one to
/// three bytes. Unpaired surrogates take three bytes under either
/// [`SurrogateMode`].
#[must_use]
pub fn utf16_utf8_len(units: &[u16]) -> usize {
    let mut len = 0;
    let mut i = 0;
    while i < units.len() {
        let unit = u32::from(units[i]);
        if is_high_surrogate(unit) && units.get(i + 1).is_some_and(|&n| is_low_surrogate(n.into())) {
            len += 4;
            i += 2;
        } else {
            len += utf8::encoded_len(unit);
            i += 1;
        }
    }
    len
}

/// Appends UTF-16 `units` to `out`, combining surrogate pairs.
pub fn append_utf16(out: &mut Vec<u8>, units: &[u16], mode: SurrogateMode) -> usize {
    out.reserve(utf16_utf8_len(units));
    let mut replaced = 0;
    let mut iter = units.iter().copied().peekable();
    while let Some(unit) = iter.next() {
        let unit32 = u32::from(unit);
        if is_high_surrogate(unit32) {
            if let Some(low) = iter.next_if(|&n| is_low_surrogate(n.into())) {
                utf8::push_lossy(out, combine_surrogates(unit, low));
                continue;
            }
        }
        if is_surrogate(unit32) {
            if !push_unpaired(out, unit32, mode) {
                replaced += 1;
            }
        } else {
            utf8::push_lossy(out, unit32);
        }
    }
    log_replacements("UTF-16", replaced);
    replaced
}

/// Returns the first unpaired surrogate in `units` and its index.
#[must_use]
pub fn find_unpaired_surrogate(units: &[u16]) -> Option<(usize, u16)> {
    let mut i = 0;
    while i < units.len() {
        let unit = u32::from(units[i]);
        if is_high_surrogate(unit) && units.get(i + 1).is_some_and(|&n| is_low_surrogate(n.into())) {
            i += 2;
            continue;
        }
        if is_surrogate(unit) {
            return Some((i, units[i]));
        }
        i += 1;
    }
    None
}

/// Exact UTF-8 length of [`append_ucs2`]'s output.
#[must_use]
pub fn ucs2_utf8_len(units: &[u16]) -> usize {
    units.iter().map(|&u| utf8::encoded_len(u.into())).sum()
}

/// Appends UCS-2 `units` to `out`. Each unit is its own codepoint; units in
/// the surrogate range are never combined.
pub fn append_ucs2(out: &mut Vec<u8>, units: &[u16], mode: SurrogateMode) -> usize {
    out.reserve(ucs2_utf8_len(units));
    let mut replaced = 0;
    for &unit in units {
        let unit = u32::from(unit);
        if is_surrogate(unit) {
            if !push_unpaired(out, unit, mode) {
                replaced += 1;
            }
        } else {
            utf8::push_lossy(out, unit);
        }
    }
    log_replacements("UCS-2", replaced);
    replaced
}

/// Exact UTF-8 length of [`append_utf32`]'s output.
#[must_use]
pub fn utf32_utf8_len(codepoints: &[u32]) -> usize {
    utf8::count_bytes(codepoints)
}

/// Appends UTF-32 `codepoints` to `out`. Values above `0x10FFFF` become
/// U+FFFD; surrogates follow `mode`.
pub fn append_utf32(out: &mut Vec<u8>, codepoints: &[u32], mode: SurrogateMode) -> usize {
    out.reserve(utf32_utf8_len(codepoints));
    let mut replaced = 0;
    for &cp in codepoints {
        let written = if is_surrogate(cp) {
            push_unpaired(out, cp, mode)
        } else {
            utf8::push_lossy(out, cp)
        };
        if !written {
            replaced += 1;
        }
    }
    log_replacements("UTF-32", replaced);
    replaced
}

/// Checks that every value in `codepoints` is a Unicode scalar value.
///
/// # Errors
///
/// The first out-of-range value or surrogate, with its index.
pub fn validate_utf32(codepoints: &[u32]) -> Result<(), TranscodeError> {
    for (index, &cp) in codepoints.iter().enumerate() {
        if cp > utf8::MAX_CODEPOINT {
            return Err(TranscodeError::CodepointOutOfRange(cp));
        }
        if is_surrogate(cp) {
            return Err(TranscodeError::UnpairedSurrogate { index, unit: cp });
        }
    }
    Ok(())
}

/// Exact UTF-8 length of [`append_latin1`]'s output.
#[must_use]
pub fn latin1_utf8_len(bytes: &[u8]) -> usize {
    bytes.len() + bytes.iter().filter(|&&b| b >= 0x80).count()
}

/// Appends Latin-1 `bytes` to `out`; every byte is the codepoint of the
/// same value.
pub fn append_latin1(out: &mut Vec<u8>, bytes: &[u8]) {
    out.reserve(latin1_utf8_len(bytes));
    for &b in bytes {
        if b < 0x80 {
            out.push(b);
        } else {
            out.push(0xC0 | (b >> 6));
            out.push(0x80 | (b & 0x3F));
        }
    }
}

/// Exact UTF-8 length of [`append_utf8_lossy`]'s output.
///
/// Valid runs keep their length and every malformed sequence becomes the
/// three bytes of U+FFFD, so the result can exceed `bytes.len()`.
#[must_use]
pub fn utf8_lossy_utf8_len(bytes: &[u8], mode: SurrogateMode) -> usize {
    let mut len = 0;
    let mut rest = bytes;
    while !rest.is_empty() {
        let Some(bad) = utf8::first_invalid(rest, mode) else {
            len += rest.len();
            break;
        };
        let skip = utf8::decode_first(&rest[bad..], mode).map_or(1, |(_, len)| len);
        len += bad + utf8::encoded_len(REPLACEMENT_CHARACTER);
        rest = &rest[bad + skip..];
    }
    len
}

/// Appends `bytes` to `out`, replacing each malformed sequence with
/// U+FFFD. Valid input is copied verbatim.
pub fn append_utf8_lossy(out: &mut Vec<u8>, bytes: &[u8], mode: SurrogateMode) -> usize {
    out.reserve(utf8_lossy_utf8_len(bytes, mode));
    let mut replaced = 0;
    let mut rest = bytes;
    while !rest.is_empty() {
        let Some(bad) = utf8::first_invalid(rest, mode) else {
            out.extend_from_slice(rest);
            break;
        };
        out.extend_from_slice(&rest[..bad]);
        let skip = utf8::decode_first(&rest[bad..], mode).map_or(1, |(_, len)| len);
        utf8::push_lossy(out, REPLACEMENT_CHARACTER);
        replaced += 1;
        rest = &rest[bad + skip..];
    }
    log_replacements("UTF-8", replaced);
    replaced
}

// ------------------------------------------------------------------------------------------------
// Direction B: out of UTF-8
// ------------------------------------------------------------------------------------------------

/// Decodes `bytes` and appends UTF-16 code units to `out`, splitting
/// supplementary-plane codepoints into surrogate pairs.
#[allow(clippy::cast_possible_truncation)]
pub fn utf8_to_utf16(bytes: &[u8], mode: SurrogateMode, out: &mut Vec<u16>) {
    let count = utf8::count_code_points(bytes, mode);
    if count == 0 {
        return;
    }
    out.reserve(count);
    for (cp, _) in Decode::new(bytes, mode) {
        if cp > 0xFFFF {
            let (high, low) = split_surrogates(cp);
            out.push(high);
            out.push(low);
        } else {
            out.push(cp as u16);
        }
    }
}

/// Decodes `bytes` and appends one UTF-32 value per codepoint to `out`.
pub fn utf8_to_utf32(bytes: &[u8], mode: SurrogateMode, out: &mut Vec<u32>) {
    let count = utf8::count_code_points(bytes, mode);
    if count == 0 {
        return;
    }
    out.reserve(count);
    out.extend(Decode::new(bytes, mode).map(|(cp, _)| cp));
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use insta::assert_snapshot;
    use rstest::rstest;

    use super::*;
    use crate::tests::hex;

    fn utf16(units: &[u16], mode: SurrogateMode) -> Vec<u8> {
        let mut out = Vec::new();
        append_utf16(&mut out, units, mode);
        assert_eq!(out.len(), utf16_utf8_len(units), "length precount mismatch");
        out
    }

    #[test]
    fn surrogate_formulas() {
        assert_eq!(combine_surrogates(0xD83D, 0xDE00), 0x1F600);
        assert_eq!(split_surrogates(0x1F600), (0xD83D, 0xDE00));
        assert_eq!(split_surrogates(0x10_FFFF), (0xDBFF, 0xDFFF));
        assert_eq!(split_surrogates(0x1_0000), (0xD800, 0xDC00));
    }

    #[test]
    fn utf16_pair_becomes_four_bytes() {
        let out = utf16(&[0xD83D, 0xDE00], SurrogateMode::Replace);
        assert_snapshot!(hex(&out), @"F0 9F 98 80");
    }

    #[rstest]
    #[case::lone_high(&[0xD800, 0x41], "EF BF BD 41", "ED A0 80 41")]
    #[case::lone_low(&[0xDC00], "EF BF BD", "ED B0 80")]
    #[case::trailing_high(&[0x41, 0xDBFF], "41 EF BF BD", "41 ED AF BF")]
    #[case::reversed_pair(&[0xDE00, 0xD83D], "EF BF BD EF BF BD", "ED B8 80 ED A0 BD")]
    fn utf16_unpaired(
        #[case] units: &[u16],
        #[case] replaced: &str,
        #[case] preserved: &str,
    ) {
        assert_eq!(hex(&utf16(units, SurrogateMode::Replace)), replaced);
        assert_eq!(hex(&utf16(units, SurrogateMode::Preserve)), preserved);
    }

    #[test]
    fn utf16_reports_replacements() {
        let mut out = Vec::new();
        assert_eq!(append_utf16(&mut out, &[0xD800, 0xD800, 0xDC00], SurrogateMode::Replace), 1);
        assert_eq!(out, "\u{FFFD}\u{10000}".as_bytes());
    }

    #[test]
    fn find_unpaired_surrogate_skips_pairs() {
        assert_eq!(find_unpaired_surrogate(&[0xD83D, 0xDE00, 0x41]), None);
        assert_eq!(find_unpaired_surrogate(&[0x41, 0xD83D, 0x41]), Some((1, 0xD83D)));
        assert_eq!(find_unpaired_surrogate(&[0xDE00]), Some((0, 0xDE00)));
    }

    #[test]
    fn ucs2_never_combines() {
        let units = [0xD83D, 0xDE00];
        let mut out = Vec::new();
        assert_eq!(append_ucs2(&mut out, &units, SurrogateMode::Preserve), 0);
        assert_snapshot!(hex(&out), @"ED A0 BD ED B8 80");
        assert_eq!(out.len(), ucs2_utf8_len(&units));

        out.clear();
        assert_eq!(append_ucs2(&mut out, &units, SurrogateMode::Replace), 2);
        assert_eq!(out.len(), ucs2_utf8_len(&units));
    }

    #[test]
    fn utf32_out_of_range_is_replaced() {
        let cps = [0x41, 0x11_0000, 0xDFFF, 0x1F600];
        let mut out = Vec::new();
        assert_eq!(append_utf32(&mut out, &cps, SurrogateMode::Replace), 2);
        assert_eq!(out, "A\u{FFFD}\u{FFFD}😀".as_bytes());
        assert_eq!(out.len(), utf32_utf8_len(&cps));
    }

    #[test]
    fn utf32_surrogates_follow_mode() {
        let cps = [0xD800, 0x41];
        let mut out = Vec::new();
        assert_eq!(append_utf32(&mut out, &cps, SurrogateMode::Preserve), 0);
        assert_snapshot!(hex(&out), @"ED A0 80 41");
        assert_eq!(out.len(), utf32_utf8_len(&cps));

        let mut back = Vec::new();
        utf8_to_utf32(&out, SurrogateMode::Preserve, &mut back);
        assert_eq!(back, cps);

        out.clear();
        assert_eq!(append_utf32(&mut out, &cps, SurrogateMode::Replace), 1);
        assert_snapshot!(hex(&out), @"EF BF BD 41");
    }

    #[test]
    fn validate_utf32_reports_first_problem() {
        assert_eq!(validate_utf32(&[0x41, 0x1F600]), Ok(()));
        assert_eq!(
            validate_utf32(&[0x41, 0xD800]),
            Err(TranscodeError::UnpairedSurrogate { index: 1, unit: 0xD800 })
        );
        assert_eq!(
            validate_utf32(&[0x11_0000]),
            Err(TranscodeError::CodepointOutOfRange(0x11_0000))
        );
    }

    #[test]
    fn latin1_high_bytes_take_two() {
        let mut out = Vec::new();
        append_latin1(&mut out, &[b'c', b'a', b'f', 0xE9]);
        assert_eq!(out, "café".as_bytes());
        assert_eq!(latin1_utf8_len(&[b'c', 0xE9, 0xFF]), 5);
    }

    #[test]
    fn utf8_lossy_replaces_each_bad_sequence() {
        let mut out = Vec::new();
        let replaced = append_utf8_lossy(&mut out, b"a\x80b\xC3\xE2\x82", SurrogateMode::Replace);
        assert_eq!(replaced, 3);
        assert_eq!(out, "a\u{FFFD}b\u{FFFD}\u{FFFD}".as_bytes());
    }

    #[test]
    fn utf8_lossy_reserves_for_expansion() {
        let bytes = [0x80; 100];
        assert_eq!(utf8_lossy_utf8_len(&bytes, SurrogateMode::Replace), 300);

        let mut out = Vec::new();
        assert_eq!(append_utf8_lossy(&mut out, &bytes, SurrogateMode::Replace), 100);
        assert_eq!(out.len(), 300);
        assert_eq!(out.capacity(), 300);
    }

    #[rstest]
    #[case::valid("héllo 😀".as_bytes(), SurrogateMode::Replace, 11)]
    #[case::truncated_tail(b"a\xE2\x82", SurrogateMode::Replace, 4)]
    #[case::broken_tail(b"\xC3\x41", SurrogateMode::Replace, 4)]
    #[case::surrogate_replaced(b"\xED\xA0\x80", SurrogateMode::Replace, 9)]
    #[case::surrogate_kept(b"\xED\xA0\x80", SurrogateMode::Preserve, 3)]
    fn utf8_lossy_len_matches_output(
        #[case] bytes: &[u8],
        #[case] mode: SurrogateMode,
        #[case] expected: usize,
    ) {
        let mut out = Vec::new();
        append_utf8_lossy(&mut out, bytes, mode);
        assert_eq!(out.len(), expected);
        assert_eq!(utf8_lossy_utf8_len(bytes, mode), expected);
    }

    #[test]
    fn utf8_lossy_keeps_valid_input() {
        let mut out = vec![b'>'];
        assert_eq!(append_utf8_lossy(&mut out, "héllo 😀".as_bytes(), SurrogateMode::Replace), 0);
        assert_eq!(out, ">héllo 😀".as_bytes());
    }

    #[test]
    fn utf8_to_utf16_splits_pairs() {
        let mut out = vec![0x20];
        utf8_to_utf16("a😀".as_bytes(), SurrogateMode::Replace, &mut out);
        assert_eq!(out, [0x20, 0x61, 0xD83D, 0xDE00]);
    }

    #[test]
    fn utf8_to_utf32_replaces_garbage() {
        let mut out = Vec::new();
        utf8_to_utf32(b"\x80a", SurrogateMode::Replace, &mut out);
        assert_eq!(out, [REPLACEMENT_CHARACTER, 0x61]);
    }

    #[test]
    fn preserved_surrogates_round_trip() {
        let mut bytes = Vec::new();
        append_utf16(&mut bytes, &[0x41, 0xD800], SurrogateMode::Preserve);
        let mut units = Vec::new();
        utf8_to_utf16(&bytes, SurrogateMode::Preserve, &mut units);
        assert_eq!(units, [0x41, 0xD800]);
    }
}
