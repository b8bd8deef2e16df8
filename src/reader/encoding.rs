//! Input encodings and their codecs.
//!
//! Each codec decodes one code unit at a time; the reader drives it scalar
//! by scalar so every error can carry the exact byte offset of the
//! offending unit.

/// The Unicode encoding of the input buffer, supplied by the caller or
/// autodetected from the first four bytes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Encoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
}

/// Inspect the first four bytes for a BOM or a zero-byte pattern.
///
/// Returns the detected encoding and the number of prefix bytes to skip
/// (the BOM itself, when present).
#[must_use]
pub fn detect(buf: &[u8]) -> (Encoding, usize) {
    match buf {
        [0x00, 0x00, 0xFE, 0xFF, ..] => (Encoding::Utf32Be, 4),
        [0xFF, 0xFE, 0x00, 0x00, ..] => (Encoding::Utf32Le, 4),
        [0xFE, 0xFF, ..] => (Encoding::Utf16Be, 2),
        [0xFF, 0xFE, ..] => (Encoding::Utf16Le, 2),
        [0xEF, 0xBB, 0xBF, ..] => (Encoding::Utf8, 3),
        [0x00, 0x00, 0x00, _, ..] => (Encoding::Utf32Be, 0),
        [_, 0x00, 0x00, 0x00, ..] => (Encoding::Utf32Le, 0),
        [0x00, _, ..] => (Encoding::Utf16Be, 0),
        [_, 0x00, ..] => (Encoding::Utf16Le, 0),
        _ => (Encoding::Utf8, 0),
    }
}

/// Decode the UTF-8 sequence starting at `pos` without validity checks.
///
/// Callers must have validated `buf[..limit]` beforehand and only call
/// below that limit.
#[must_use]
pub(crate) fn decode_utf8_unchecked(buf: &[u8], pos: usize) -> (char, usize) {
    let b0 = buf[pos];
    if b0 < 0x80 {
        return (b0 as char, 1);
    }
    let (width, mut code) = if b0 < 0xE0 {
        (2, u32::from(b0 & 0x1F))
    } else if b0 < 0xF0 {
        (3, u32::from(b0 & 0x0F))
    } else {
        (4, u32::from(b0 & 0x07))
    };
    for i in 1..width {
        code = (code << 6) | u32::from(buf[pos + i] & 0x3F);
    }
    // The sequence was validated up front, so the code point is a scalar.
    (char::from_u32(code).unwrap_or('\u{FFFD}'), width)
}

fn read_u16(buf: &[u8], pos: usize, little_endian: bool) -> u16 {
    let pair = [buf[pos], buf[pos + 1]];
    if little_endian {
        u16::from_le_bytes(pair)
    } else {
        u16::from_be_bytes(pair)
    }
}

/// Decode one UTF-16 scalar, combining surrogate pairs.
///
/// `Ok(None)` is end of input; `Err(())` is a truncated unit, an unpaired
/// surrogate, or a low surrogate with no preceding high surrogate.
pub(crate) fn decode_utf16(
    buf: &[u8],
    pos: usize,
    little_endian: bool,
) -> Result<Option<(char, usize)>, ()> {
    if pos >= buf.len() {
        return Ok(None);
    }
    if pos + 2 > buf.len() {
        return Err(());
    }
    let unit = read_u16(buf, pos, little_endian);
    match unit {
        0xD800..=0xDBFF => {
            if pos + 4 > buf.len() {
                return Err(());
            }
            let low = read_u16(buf, pos + 2, little_endian);
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(());
            }
            let code =
                0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
            match char::from_u32(code) {
                Some(chr) => Ok(Some((chr, 4))),
                None => Err(()),
            }
        }
        0xDC00..=0xDFFF => Err(()),
        _ => Ok(Some((char::from_u32(u32::from(unit)).ok_or(())?, 2))),
    }
}

/// Decode one UTF-32 scalar. Values outside the Unicode scalar range
/// (including surrogates) are invalid code units.
pub(crate) fn decode_utf32(
    buf: &[u8],
    pos: usize,
    little_endian: bool,
) -> Result<Option<(char, usize)>, ()> {
    if pos >= buf.len() {
        return Ok(None);
    }
    if pos + 4 > buf.len() {
        return Err(());
    }
    let quad = [buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]];
    let code = if little_endian {
        u32::from_le_bytes(quad)
    } else {
        u32::from_be_bytes(quad)
    };
    match char::from_u32(code) {
        Some(chr) => Ok(Some((chr, 4))),
        None => Err(()),
    }
}
