use alloc::{
    boxed::Box,
    string::{String, ToString},
    vec::Vec,
};

use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

use crate::{
    SurrogateMode, Text, TextOptions, WideWidth,
    bridge::{self, is_surrogate},
    utf8,
};

fn tests() -> u64 {
    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;
    tests
}

/// UTF-16 units drawn mostly from the interesting ranges: ASCII, two and
/// three byte BMP, and both surrogate halves.
#[derive(Debug, Clone)]
struct Units(Vec<u16>);

impl Arbitrary for Units {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 24;
        let units = (0..len)
            .map(|_| {
                let raw = u16::arbitrary(g);
                match usize::arbitrary(g) % 5 {
                    0 => raw % 0x80,
                    1 => 0x80 + raw % 0x780,
                    2 => 0xD800 + raw % 0x400,
                    3 => 0xDC00 + raw % 0x400,
                    _ => raw,
                }
            })
            .collect();
        Units(units)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().map(Units))
    }
}

/// Property: BMP text survives UTF-16 → UTF-8 → UTF-16 unchanged, including
/// a detour through the raw canonical bytes.
#[test]
fn bmp_round_trip_quickcheck() {
    fn prop(units: Units) -> TestResult {
        let bmp: Vec<u16> = units.0.into_iter().filter(|&u| !is_surrogate(u.into())).collect();
        let text = Text::from_utf16(&bmp);
        let reparsed = Text::try_from_utf8(text.as_bytes()).expect("canonical bytes are UTF-8");
        TestResult::from_bool(reparsed.to_utf16() == bmp && reparsed == text)
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Units) -> TestResult);
}

/// Property: with surrogate preservation any UTF-16 sequence round-trips,
/// paired or not.
#[test]
fn preserved_utf16_round_trip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(units: Units) -> bool {
        let options = TextOptions {
            surrogates: SurrogateMode::Preserve,
        };
        Text::from_utf16_with(&units.0, options).to_utf16() == units.0
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Units) -> bool);
}

/// Property: the byte count computed up front equals the bytes written, for
/// every source encoding.
#[test]
fn precount_matches_output_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(units: Units, codepoints: Vec<u32>, raw: Vec<u8>) -> bool {
        let mut ok = true;
        for mode in [SurrogateMode::Replace, SurrogateMode::Preserve] {
            let mut out = Vec::new();
            bridge::append_utf16(&mut out, &units.0, mode);
            ok &= out.len() == bridge::utf16_utf8_len(&units.0);

            out.clear();
            bridge::append_ucs2(&mut out, &units.0, mode);
            ok &= out.len() == bridge::ucs2_utf8_len(&units.0);

            out.clear();
            bridge::append_utf32(&mut out, &codepoints, mode);
            ok &= out.len() == utf8::count_bytes(&codepoints);

            out.clear();
            bridge::append_utf8_lossy(&mut out, &raw, mode);
            ok &= out.len() == bridge::utf8_lossy_utf8_len(&raw, mode);
        }
        let mut out = Vec::new();
        bridge::append_latin1(&mut out, &raw);
        ok && out.len() == bridge::latin1_utf8_len(&raw)
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Units, Vec<u32>, Vec<u8>) -> bool);
}

/// Property: lossy ingestion of arbitrary bytes agrees with the standard
/// library's replacement strategy and always yields well-formed storage.
#[test]
fn lossy_matches_std_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(bytes: Vec<u8>) -> bool {
        let text = Text::from_utf8_lossy(&bytes);
        let expected = String::from_utf8_lossy(&bytes);
        text.as_str() == Some(&*expected)
            && text.char_count() == expected.chars().count()
            && text.to_utf32().len() == text.char_count()
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Vec<u8>) -> bool);
}

/// Property: codepoint indexing agrees with `char` iteration.
#[test]
fn indexing_matches_chars_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(s: String, start: usize, count: i8) -> bool {
        let text = Text::from(s.as_str());
        let chars: Vec<char> = s.chars().collect();
        let start = start % (chars.len() + 2);

        let expected: String = match count {
            0 => String::new(),
            c if c < 0 => chars.iter().skip(start).collect(),
            c => chars.iter().skip(start).take(c.unsigned_abs().into()).collect(),
        };
        let char_at = chars.get(start).map(|&c| c as u32);

        text.substring(start, count.into()).to_string() == expected
            && text.char_at(start) == char_at
            && text.char_count() == chars.len()
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(String, usize, i8) -> bool);
}

/// Property: both wide paths decode back to the same text.
#[test]
fn wide_paths_agree_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(s: String) -> bool {
        let text = Text::from(s.as_str());
        let via16 = Text::from_wide(text.to_wide_with(WideWidth::Utf16).as_wide_str());
        let via32 = Text::from_wide(text.to_wide_with(WideWidth::Utf32).as_wide_str());
        via16 == text && via32 == text
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(String) -> bool);
}
