#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use unistring::{SurrogateMode, Text, TextOptions, bridge, utf8};

#[derive(Debug, Arbitrary)]
enum Input {
    Utf8(Vec<u8>),
    Utf16(Vec<u16>),
    Ucs2(Vec<u16>),
    Utf32(Vec<u32>),
    Latin1(Vec<u8>),
}

#[derive(Debug, Arbitrary)]
struct Case {
    input: Input,
    preserve: bool,
    start: usize,
    count: isize,
}

fn mode(case: &Case) -> SurrogateMode {
    if case.preserve {
        SurrogateMode::Preserve
    } else {
        SurrogateMode::Replace
    }
}

fn ingest(case: &Case) -> Text {
    let options = TextOptions {
        surrogates: mode(case),
    };
    let mut text = Text::with_options(options);
    match &case.input {
        Input::Utf8(bytes) => text.append_utf8_lossy(bytes),
        Input::Utf16(units) => text.append_utf16(units),
        Input::Ucs2(units) => text.append_ucs2(units),
        Input::Utf32(cps) => text.append_utf32(cps),
        Input::Latin1(bytes) => text.append_latin1(bytes),
    }
    text
}

fuzz_target!(|case: Case| {
    let text = ingest(&case);

    // Replacing texts always hold well-formed UTF-8.
    if !case.preserve {
        assert!(text.as_str().is_some(), "malformed storage: {text:?}");
    }

    // Well-formed input is copied verbatim; anything else is rewritten, and
    // the up-front byte count matches either way.
    if let Input::Utf8(bytes) = &case.input {
        let valid = utf8::first_invalid_offset(bytes, mode(&case)).is_none();
        assert_eq!(valid, text.as_bytes() == bytes.as_slice());
        assert_eq!(bridge::utf8_lossy_utf8_len(bytes, mode(&case)), text.byte_len());
    }

    let count = text.char_count();
    assert_eq!(text.code_points().count(), count);
    assert_eq!(text.to_utf32().len(), count);

    let start = case.start % (count + 2);
    let sub = text.substring(start, case.count);
    assert!(sub.byte_len() <= text.byte_len());
    assert_eq!(text.char_at(start).is_some(), start < count);

    // Separately preserved halves pair up on the way back, so only replacing
    // texts round-trip exactly.
    if !case.preserve {
        let units = text.to_utf16();
        assert_eq!(Text::from_utf16(&units), text);
    }
});
