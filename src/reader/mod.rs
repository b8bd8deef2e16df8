//! The transcoding reader: decodes the input buffer one Unicode scalar at
//! a time and tracks the byte offset, line and column of the head scalar.

pub mod encoding;

use skein_common::{ErrorKind, Marker, YamlError, YamlResult};

pub use encoding::Encoding;

/// A malformed code unit, positioned at its first byte.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ReadError {
    pub mark: Marker,
}

impl From<ReadError> for YamlError {
    fn from(err: ReadError) -> YamlError {
        YamlError::new(ErrorKind::InvalidEncoding, err.mark)
    }
}

/// Line breaks for line counting. `\r\n` is handled as a single break by
/// [`Reader::advance`].
#[inline]
#[must_use]
pub(crate) fn is_break_char(chr: char) -> bool {
    matches!(chr, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

pub struct Reader<'input> {
    buf: &'input [u8],
    encoding: Encoding,
    head: Option<char>,
    prev: Option<char>,
    mark: Marker,
    /// Byte offset just past `head`.
    next_pos: usize,
    /// For UTF-8: how far the up-front validation got. Decoding below this
    /// bound runs unchecked; reaching it before the end of the buffer is an
    /// invalid code unit.
    valid_up_to: usize,
}

impl<'input> Reader<'input> {
    /// Build a reader over `buf`. Without an explicit encoding the first
    /// four bytes decide (BOM, else zero-byte pattern, else UTF-8).
    #[must_use]
    pub fn new(buf: &'input [u8], encoding: Option<Encoding>) -> Reader<'input> {
        let (encoding, skip) = match encoding {
            Some(encoding) => (encoding, detected_bom_len(buf, encoding)),
            None => encoding::detect(buf),
        };
        let valid_up_to = match encoding {
            Encoding::Utf8 => match simdutf8::compat::from_utf8(&buf[skip..]) {
                Ok(_) => buf.len(),
                Err(err) => skip + err.valid_up_to(),
            },
            _ => buf.len(),
        };
        Reader {
            buf,
            encoding,
            head: None,
            prev: None,
            mark: Marker {
                pos: skip,
                line: 1,
                col: 1,
            },
            next_pos: skip,
            valid_up_to,
        }
    }

    #[inline]
    #[must_use]
    pub fn head(&self) -> Option<char> {
        self.head
    }

    /// The scalar consumed immediately before the current head.
    #[inline]
    #[must_use]
    pub fn prev(&self) -> Option<char> {
        self.prev
    }

    #[inline]
    #[must_use]
    pub fn mark(&self) -> Marker {
        self.mark
    }

    #[inline]
    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Move the head to the next scalar, updating the mark. At end of
    /// input the head becomes `None` and further calls are no-ops.
    pub fn advance(&mut self) -> Result<(), ReadError> {
        let next = match self.decode_at(self.next_pos) {
            Ok(next) => next,
            Err(()) => {
                return Err(ReadError {
                    mark: self.next_mark(self.head != Some('\r')),
                });
            }
        };
        let crlf = self.head == Some('\r') && matches!(next, Some(('\n', _)));
        self.mark = self.next_mark(!crlf);
        self.prev = self.head;
        match next {
            Some((chr, width)) => {
                self.head = Some(chr);
                self.next_pos += width;
            }
            None => self.head = None,
        }
        Ok(())
    }

    /// The mark the next head will carry. `count_break` is false when a
    /// `\r\n` pair must collapse into one line break.
    fn next_mark(&self, count_break: bool) -> Marker {
        let mut mark = self.mark;
        match self.head {
            Some(chr) if is_break_char(chr) && count_break => {
                mark.line += 1;
                mark.col = 1;
            }
            Some(_) => mark.col += 1,
            None => {}
        }
        mark.pos = self.next_pos;
        mark
    }

    fn decode_at(&self, pos: usize) -> Result<Option<(char, usize)>, ()> {
        match self.encoding {
            Encoding::Utf8 => {
                if pos >= self.buf.len() {
                    Ok(None)
                } else if pos >= self.valid_up_to {
                    Err(())
                } else {
                    Ok(Some(encoding::decode_utf8_unchecked(self.buf, pos)))
                }
            }
            Encoding::Utf16Le => encoding::decode_utf16(self.buf, pos, true),
            Encoding::Utf16Be => encoding::decode_utf16(self.buf, pos, false),
            Encoding::Utf32Le => encoding::decode_utf32(self.buf, pos, true),
            Encoding::Utf32Be => encoding::decode_utf32(self.buf, pos, false),
        }
    }

    /// Look `n` scalars past the head without moving it. Returns `None`
    /// past the end of input or past a malformed unit; the error itself
    /// surfaces when `advance` reaches it.
    #[must_use]
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        if n == 0 {
            return self.head;
        }
        let mut pos = self.next_pos;
        let mut index = 1;
        loop {
            match self.decode_at(pos) {
                Ok(Some((chr, width))) => {
                    if index == n {
                        return Some(chr);
                    }
                    pos += width;
                    index += 1;
                }
                _ => return None,
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.head.is_none()
    }

    #[inline]
    #[must_use]
    pub fn next_is(&self, chr: char) -> bool {
        self.head == Some(chr)
    }

    #[inline]
    #[must_use]
    pub fn nth_is(&self, n: usize, chr: char) -> bool {
        self.peek_nth(n) == Some(chr)
    }

    #[must_use]
    pub fn next_is_three(&self, chr: char) -> bool {
        self.next_is(chr) && self.nth_is(1, chr) && self.nth_is(2, chr)
    }

    /// `---` or `...` followed by a blank, a break or the end of input.
    #[must_use]
    pub fn next_is_document_indicator(&self) -> bool {
        (self.next_is_three('-') || self.next_is_three('.'))
            && self.peek_nth(3).map_or(true, |chr| {
                chr == ' ' || chr == '\t' || is_break_char(chr)
            })
    }

    /// Consume a line break, normalizing `\r\n`, `\r` and NEL to `\n`.
    /// LS and PS keep their identity. Returns `None` when the head is not
    /// a break.
    pub fn scan_line_break(&mut self) -> Result<Option<char>, ReadError> {
        match self.head {
            Some('\r') => {
                self.advance()?;
                if self.next_is('\n') {
                    self.advance()?;
                }
                Ok(Some('\n'))
            }
            Some('\n' | '\u{85}') => {
                self.advance()?;
                Ok(Some('\n'))
            }
            Some(chr @ ('\u{2028}' | '\u{2029}')) => {
                self.advance()?;
                Ok(Some(chr))
            }
            _ => Ok(None),
        }
    }

    /// Consume a line break without producing text.
    pub fn skip_line_break(&mut self) -> Result<bool, ReadError> {
        Ok(self.scan_line_break()?.is_some())
    }

    /// Consume a run of ASCII digits. `None` when the head is not a digit.
    /// Saturates rather than wrapping; callers bound the digit count.
    pub fn scan_integer(&mut self) -> Result<Option<i64>, ReadError> {
        let mut value: i64 = 0;
        let mut any = false;
        while let Some(chr) = self.head {
            let Some(digit) = chr.to_digit(10) else { break };
            value = value.saturating_mul(10).saturating_add(i64::from(digit));
            any = true;
            self.advance()?;
        }
        Ok(if any { Some(value) } else { None })
    }

    /// Consume a `\` escape sequence in a double-quoted scalar and return
    /// the escaped scalar. The head must be the backslash. Errors point at
    /// the escape's start.
    pub fn scan_escape(&mut self) -> YamlResult<char> {
        let start_mark = self.mark;
        self.advance().map_err(YamlError::from)?;

        let code_length = match self.head {
            Some('0') => return self.escaped('\0'),
            Some('a') => return self.escaped('\x07'),
            Some('b') => return self.escaped('\x08'),
            Some('t' | '\t') => return self.escaped('\t'),
            Some('n') => return self.escaped('\n'),
            Some('v') => return self.escaped('\x0b'),
            Some('f') => return self.escaped('\x0c'),
            Some('r') => return self.escaped('\r'),
            Some('e') => return self.escaped('\x1b'),
            Some(' ') => return self.escaped(' '),
            Some('"') => return self.escaped('"'),
            Some('/') => return self.escaped('/'),
            Some('\\') => return self.escaped('\\'),
            Some('N') => return self.escaped('\u{85}'),
            Some('_') => return self.escaped('\u{a0}'),
            Some('L') => return self.escaped('\u{2028}'),
            Some('P') => return self.escaped('\u{2029}'),
            Some('x') => 2,
            Some('u') => 4,
            Some('U') => 8,
            _ => return Err(YamlError::new(ErrorKind::InvalidEscape, start_mark)),
        };

        self.advance().map_err(YamlError::from)?;
        let mut value = 0u32;
        for _ in 0..code_length {
            let digit = self
                .head
                .and_then(|chr| chr.to_digit(16))
                .ok_or_else(|| YamlError::new(ErrorKind::InvalidEscape, start_mark))?;
            value = (value << 4) + digit;
            self.advance().map_err(YamlError::from)?;
        }
        char::from_u32(value).ok_or_else(|| YamlError::new(ErrorKind::InvalidEscape, start_mark))
    }

    fn escaped(&mut self, chr: char) -> YamlResult<char> {
        self.advance().map_err(YamlError::from)?;
        Ok(chr)
    }
}

/// When the caller names the encoding explicitly, a matching BOM at the
/// head of the buffer is still skipped.
fn detected_bom_len(buf: &[u8], encoding: Encoding) -> usize {
    match encoding {
        Encoding::Utf8 if buf.starts_with(b"\xEF\xBB\xBF") => 3,
        Encoding::Utf16Be if buf.starts_with(b"\xFE\xFF") => 2,
        Encoding::Utf16Le if buf.starts_with(b"\xFF\xFE") && !buf.starts_with(b"\xFF\xFE\x00\x00") => 2,
        Encoding::Utf32Be if buf.starts_with(b"\x00\x00\xFE\xFF") => 4,
        Encoding::Utf32Le if buf.starts_with(b"\xFF\xFE\x00\x00") => 4,
        _ => 0,
    }
}
