use skein::{Encoding, ErrorKind, Event, Parser, YamlResult};

const SAMPLE: &str = "- Mark McGwire\n- Sammy Sosa\n";

fn utf8_events(input: &str) -> Vec<Event> {
    Parser::from(input)
        .collect::<YamlResult<Vec<Event>>>()
        .unwrap()
}

fn collect(buf: &[u8], encoding: Option<Encoding>) -> Vec<Event> {
    Parser::new(buf, encoding)
        .collect::<YamlResult<Vec<Event>>>()
        .unwrap()
}

/// Compare everything except byte offsets, which legitimately differ
/// between encodings of the same text.
fn assert_same_events(left: &[Event], right: &[Event]) {
    assert_eq!(left.len(), right.len());
    for (l, r) in left.iter().zip(right) {
        assert_eq!(l.kind, r.kind);
        assert_eq!(l.is_implicit, r.is_implicit);
        assert_eq!(l.mark.line, r.mark.line);
        assert_eq!(l.mark.col, r.mark.col);
    }
}

fn utf16(input: &str, little_endian: bool) -> Vec<u8> {
    input
        .encode_utf16()
        .flat_map(|unit| {
            if little_endian {
                unit.to_le_bytes()
            } else {
                unit.to_be_bytes()
            }
        })
        .collect()
}

fn utf32(input: &str, little_endian: bool) -> Vec<u8> {
    input
        .chars()
        .flat_map(|chr| {
            let code = chr as u32;
            if little_endian {
                code.to_le_bytes()
            } else {
                code.to_be_bytes()
            }
        })
        .collect()
}

#[test]
fn utf16_le_matches_utf8() {
    let reference = utf8_events(SAMPLE);
    let buf = utf16(SAMPLE, true);
    assert_same_events(&reference, &collect(&buf, Some(Encoding::Utf16Le)));
    // The zero-byte pattern is enough to autodetect.
    assert_same_events(&reference, &collect(&buf, None));
}

#[test]
fn utf16_be_matches_utf8() {
    let reference = utf8_events(SAMPLE);
    let buf = utf16(SAMPLE, false);
    assert_same_events(&reference, &collect(&buf, Some(Encoding::Utf16Be)));
    assert_same_events(&reference, &collect(&buf, None));
}

#[test]
fn utf32_both_orders_match_utf8() {
    let reference = utf8_events(SAMPLE);
    let le = utf32(SAMPLE, true);
    let be = utf32(SAMPLE, false);
    assert_same_events(&reference, &collect(&le, None));
    assert_same_events(&reference, &collect(&be, None));
}

#[test]
fn boms_are_skipped() {
    let reference = utf8_events(SAMPLE);

    let mut utf8_bom = b"\xEF\xBB\xBF".to_vec();
    utf8_bom.extend_from_slice(SAMPLE.as_bytes());
    assert_same_events(&reference, &collect(&utf8_bom, None));

    let mut utf16_le_bom = b"\xFF\xFE".to_vec();
    utf16_le_bom.extend_from_slice(&utf16(SAMPLE, true));
    assert_same_events(&reference, &collect(&utf16_le_bom, None));

    let mut utf16_be_bom = b"\xFE\xFF".to_vec();
    utf16_be_bom.extend_from_slice(&utf16(SAMPLE, false));
    assert_same_events(&reference, &collect(&utf16_be_bom, None));

    let mut utf32_le_bom = b"\xFF\xFE\x00\x00".to_vec();
    utf32_le_bom.extend_from_slice(&utf32(SAMPLE, true));
    assert_same_events(&reference, &collect(&utf32_le_bom, None));

    let mut utf32_be_bom = b"\x00\x00\xFE\xFF".to_vec();
    utf32_be_bom.extend_from_slice(&utf32(SAMPLE, false));
    assert_same_events(&reference, &collect(&utf32_be_bom, None));
}

#[test]
fn crlf_normalizes_to_lf() {
    let crlf = "a: |\r\n  x\r\n  y\r\n";
    let lf = "a: |\n  x\n  y\n";
    assert_same_events(&utf8_events(lf), &utf8_events(crlf));

    let events = utf8_events(crlf);
    let skein::EventKind::Scalar { value, .. } = &events[3].kind else {
        panic!("expected the literal scalar");
    };
    assert_eq!(value, "x\ny\n");
}

#[test]
fn non_ascii_scalars_survive_transcoding() {
    let input = "- húsky\n- 日本語\n";
    let reference = utf8_events(input);
    assert_same_events(&reference, &collect(&utf16(input, true), None));
    assert_same_events(&reference, &collect(&utf32(input, false), None));
}

#[test]
fn invalid_utf8_is_invalid_encoding() {
    let err = Parser::new(b"a\xFFb", Some(Encoding::Utf8))
        .find_map(Result::err)
        .expect("must fail");
    assert_eq!(err.kind, ErrorKind::InvalidEncoding);
    assert_eq!(err.mark.pos, 1);
}

#[test]
fn unpaired_surrogate_is_invalid_encoding() {
    // A lone high surrogate in UTF-16 LE.
    let buf = [0x61, 0x00, 0x3D, 0xD8];
    let err = Parser::new(&buf, Some(Encoding::Utf16Le))
        .find_map(Result::err)
        .expect("must fail");
    assert_eq!(err.kind, ErrorKind::InvalidEncoding);
}

#[test]
fn truncated_utf32_unit_is_invalid_encoding() {
    let mut buf = utf32("ab", true);
    buf.truncate(6);
    let err = Parser::new(&buf, Some(Encoding::Utf32Le))
        .find_map(Result::err)
        .expect("must fail");
    assert_eq!(err.kind, ErrorKind::InvalidEncoding);
}
