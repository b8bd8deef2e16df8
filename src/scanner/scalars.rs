//! The five scalar sub-scanners behind one tagged entry point. Each runs
//! the same three-phase loop (line content, line break, next-line
//! indentation) with per-kind termination and folding rules.

use alloc::string::String;

use super::Scanner;
use crate::scanner::char_utils::{is_blank, is_blank_or_break, is_break, is_flow, is_flow_break};
use skein_common::{ChompIndicator, ErrorKind, ScalarStyle, ScanResult, Span, Token, TokenType,
                   YamlError, YamlResult};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ScalarKind {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    BlockLiteral,
    BlockFolded,
}

impl<'input> Scanner<'input> {
    pub(crate) fn scan_scalar(&mut self, kind: ScalarKind) -> YamlResult<Token> {
        match kind {
            ScalarKind::Plain => self.scan_plain_scalar(),
            ScalarKind::SingleQuoted => self.scan_quoted_scalar(true),
            ScalarKind::DoubleQuoted => self.scan_quoted_scalar(false),
            ScalarKind::BlockLiteral => self.scan_block_scalar(true),
            ScalarKind::BlockFolded => self.scan_block_scalar(false),
        }
    }

    /// Can the head continue a plain scalar? A `:` ends one before a blank
    /// or, in flow, a flow indicator; `?` and the flow indicators end one
    /// inside flow collections. The first character is exempt from the
    /// flow-indicator test: the dispatcher already decided it starts a
    /// scalar (e.g. `:x` or `?x`).
    fn can_continue_plain(&self, first: bool) -> bool {
        let Some(chr) = self.rdr.head() else {
            return false;
        };
        if chr == ':' {
            let next = self.rdr.peek_nth(1);
            if next.map_or(true, is_blank_or_break) {
                return false;
            }
            if self.flow_level > 0 && next.map_or(false, is_flow) {
                return false;
            }
        }
        if self.flow_level > 0 && is_flow_break(chr) && chr != ':' {
            return first && chr == '?';
        }
        true
    }

    fn scan_plain_scalar(&mut self) -> YamlResult<Token> {
        self.unroll_non_block_indents();
        let indent = self.indent + 1;
        let start_mark = self.mark();

        if self.flow_level > 0 && start_mark.col < indent {
            return Err(YamlError::new(ErrorKind::InvalidIndentation, start_mark));
        }

        let mut string = String::with_capacity(32);
        self.buf_whitespaces.clear();
        self.buf_leading_break.clear();
        self.buf_trailing_breaks.clear();
        let mut end_mark = start_mark;
        let mut first = true;

        loop {
            let at_document_indicator = self.leading_whitespace
                && self.mark().col == 1
                && self.rdr.next_is_document_indicator();
            if at_document_indicator || self.rdr.next_is('#') {
                break;
            }

            if self.flow_level > 0
                && self.rdr.next_is('-')
                && self.rdr.peek_nth(1).map_or(false, is_flow)
            {
                return Err(YamlError::new(ErrorKind::InvalidToken, self.mark()));
            }

            if !self.rdr.head().map_or(true, is_blank_or_break) && self.can_continue_plain(first) {
                // Fold the breaks and blanks accumulated before this run.
                if self.leading_whitespace {
                    if !self.buf_leading_break.is_empty() {
                        if self.buf_trailing_breaks.is_empty() {
                            string.push(' ');
                        } else {
                            string.push_str(&self.buf_trailing_breaks);
                            self.buf_trailing_breaks.clear();
                        }
                        self.buf_leading_break.clear();
                    }
                    self.leading_whitespace = false;
                } else if !self.buf_whitespaces.is_empty() {
                    string.push_str(&self.buf_whitespaces);
                    self.buf_whitespaces.clear();
                }

                while !self.rdr.head().map_or(true, is_blank_or_break)
                    && self.can_continue_plain(first)
                {
                    string.push(self.rdr.head().unwrap());
                    self.skip_non_blank()?;
                    first = false;
                }
                end_mark = self.mark();
            }

            if !self.rdr.head().map_or(false, is_blank_or_break) {
                break;
            }

            while let Some(chr) = self.rdr.head() {
                if !is_blank_or_break(chr) {
                    break;
                }
                if is_blank(chr) {
                    if !self.leading_whitespace {
                        self.buf_whitespaces.push(chr);
                        self.skip_blank()?;
                    } else if chr == '\t' && self.mark().col < indent {
                        // A tab in the indentation is only fine on an
                        // otherwise empty line.
                        self.skip_blanks()?;
                        if !self.next_is_breakz() {
                            return Err(YamlError::new(
                                ErrorKind::InvalidIndentation,
                                start_mark,
                            ));
                        }
                    } else {
                        self.skip_blank()?;
                    }
                } else if self.leading_whitespace {
                    let br = self.rdr.scan_line_break().map_err(YamlError::from)?;
                    self.buf_trailing_breaks.push(br.unwrap_or('\n'));
                } else {
                    self.buf_whitespaces.clear();
                    let br = self.rdr.scan_line_break().map_err(YamlError::from)?;
                    self.buf_leading_break.push(br.unwrap_or('\n'));
                    self.leading_whitespace = true;
                }
            }

            // A shallower line ends the scalar in block context.
            if self.flow_level == 0 && self.mark().col < indent {
                break;
            }
        }

        if self.leading_whitespace {
            self.simple_key_allowed = true;
        }

        if string.is_empty() {
            // The dispatcher guarantees progress; an empty scalar here is
            // malformed input such as `{-`.
            return Err(YamlError::new(ErrorKind::InvalidToken, start_mark));
        }

        Ok(Token::new(
            Span::new(start_mark, end_mark),
            TokenType::Scalar {
                style: ScalarStyle::Plain,
                value: string,
            },
        ))
    }

    fn scan_quoted_scalar(&mut self, single: bool) -> YamlResult<Token> {
        let start_mark = self.mark();

        let mut string = String::new();
        self.buf_leading_break.clear();
        self.buf_trailing_breaks.clear();
        self.buf_whitespaces.clear();
        let mut leading_blanks;

        // Eat the left quote.
        self.skip_non_blank()?;

        loop {
            if self.mark().col == 1 && self.rdr.next_is_document_indicator() {
                return Err(YamlError::new(ErrorKind::InvalidToken, start_mark));
            }
            if self.rdr.is_eof() {
                return Err(YamlError::new(ErrorKind::EndOfStream, start_mark));
            }
            if self.mark().col < self.indent {
                return Err(YamlError::new(ErrorKind::InvalidIndentation, start_mark));
            }

            leading_blanks = false;
            self.scan_quoted_chars(single, &mut string, &mut leading_blanks)?;

            match self.rdr.head() {
                Some('\'') if single => break,
                Some('"') if !single => break,
                _ => {}
            }

            while let Some(chr) = self.rdr.head() {
                if !is_blank_or_break(chr) {
                    break;
                }
                if is_blank(chr) {
                    if leading_blanks {
                        if chr == '\t' && self.mark().col < self.indent {
                            return Err(YamlError::new(
                                ErrorKind::InvalidIndentation,
                                self.mark(),
                            ));
                        }
                        self.skip_blank()?;
                    } else {
                        self.buf_whitespaces.push(chr);
                        self.skip_blank()?;
                    }
                } else if leading_blanks {
                    let br = self.rdr.scan_line_break().map_err(YamlError::from)?;
                    self.buf_trailing_breaks.push(br.unwrap_or('\n'));
                } else {
                    self.buf_whitespaces.clear();
                    let br = self.rdr.scan_line_break().map_err(YamlError::from)?;
                    self.buf_leading_break.push(br.unwrap_or('\n'));
                    leading_blanks = true;
                }
            }

            if leading_blanks {
                if self.buf_leading_break.is_empty() {
                    // An escaped line break: the break is elided, no space.
                    string.push_str(&self.buf_trailing_breaks);
                    self.buf_trailing_breaks.clear();
                } else {
                    if self.buf_trailing_breaks.is_empty() {
                        string.push(' ');
                    } else {
                        string.push_str(&self.buf_trailing_breaks);
                        self.buf_trailing_breaks.clear();
                    }
                    self.buf_leading_break.clear();
                }
            } else {
                string.push_str(&self.buf_whitespaces);
                self.buf_whitespaces.clear();
            }
        }

        // Eat the right quote.
        self.skip_non_blank()?;
        let end_mark = self.mark();

        // Only separation, flow punctuation, a comment or a value
        // indicator may trail the closing quote.
        self.skip_blanks()?;
        let trailing_ok = match self.rdr.head() {
            None => true,
            Some(chr) if is_break(chr) => true,
            Some(',' | '}' | ']') if self.flow_level > 0 => true,
            Some(':') if self.flow_level > 0 => true,
            Some(':') if self.flow_level == 0 && start_mark.line == self.mark().line => true,
            Some('#') if self.comment_separated() => true,
            _ => false,
        };
        if !trailing_ok {
            return Err(YamlError::new(ErrorKind::InvalidToken, self.mark()));
        }

        let style = if single {
            ScalarStyle::SingleQuoted
        } else {
            ScalarStyle::DoubleQuoted
        };
        Ok(Token::new(
            Span::new(start_mark, end_mark),
            TokenType::Scalar {
                style,
                value: string,
            },
        ))
    }

    fn scan_quoted_chars(
        &mut self,
        single: bool,
        string: &mut String,
        leading_blanks: &mut bool,
    ) -> ScanResult {
        while let Some(chr) = self.rdr.head() {
            if is_blank_or_break(chr) {
                break;
            }
            match chr {
                // A doubled quote escapes a literal apostrophe.
                '\'' if single && self.rdr.nth_is(1, '\'') => {
                    string.push('\'');
                    self.skip_non_blank()?;
                    self.skip_non_blank()?;
                }
                '\'' if single => break,
                '"' if !single => break,
                // A backslash right before the break elides it.
                '\\' if !single && self.rdr.peek_nth(1).map_or(false, is_break) => {
                    self.skip_non_blank()?;
                    self.skip_line_break()?;
                    *leading_blanks = true;
                    break;
                }
                '\\' if !single => {
                    let escaped = self.rdr.scan_escape()?;
                    self.leading_whitespace = false;
                    string.push(escaped);
                }
                _ => {
                    string.push(chr);
                    self.skip_non_blank()?;
                }
            }
        }
        Ok(())
    }

    fn scan_block_scalar(&mut self, literal: bool) -> YamlResult<Token> {
        let start_mark = self.mark();
        let mut chomping = ChompIndicator::Clip;
        let mut increment: u32 = 0;
        let mut indent: u32 = 0;
        let mut trailing_blank: bool;
        let mut leading_blank = false;
        let style = if literal {
            ScalarStyle::Literal
        } else {
            ScalarStyle::Folded
        };

        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut chomping_break = String::new();

        // Skip `|` or `>`.
        self.skip_non_blank()?;
        self.unroll_non_block_indents();

        // Header: chomping and indentation indicator, in either order.
        if matches!(self.rdr.head(), Some('+' | '-')) {
            chomping = if self.rdr.next_is('+') {
                ChompIndicator::Keep
            } else {
                ChompIndicator::Strip
            };
            self.skip_non_blank()?;
            if let Some(digit) = self.rdr.head().and_then(|chr| chr.to_digit(10)) {
                if digit == 0 {
                    return Err(YamlError::new(ErrorKind::InvalidIndentation, start_mark));
                }
                increment = digit;
                self.skip_non_blank()?;
            }
        } else if let Some(digit) = self.rdr.head().and_then(|chr| chr.to_digit(10)) {
            if digit == 0 {
                return Err(YamlError::new(ErrorKind::InvalidIndentation, start_mark));
            }
            increment = digit;
            self.skip_non_blank()?;
            if matches!(self.rdr.head(), Some('+' | '-')) {
                chomping = if self.rdr.next_is('+') {
                    ChompIndicator::Keep
                } else {
                    ChompIndicator::Strip
                };
                self.skip_non_blank()?;
            }
        }

        // Only blanks and a comment may follow the header.
        self.skip_blanks()?;
        if self.rdr.next_is('#') && self.comment_separated() {
            while !self.next_is_breakz() {
                self.skip_non_blank()?;
            }
        }
        if !self.next_is_breakz() {
            return Err(YamlError::new(ErrorKind::ExpectedWhitespace, start_mark));
        }
        if !self.rdr.is_eof() {
            let br = self.rdr.scan_line_break().map_err(YamlError::from)?;
            if br.is_some() {
                self.leading_whitespace = true;
                chomping_break.push('\n');
            }
        }

        if self.rdr.next_is('\t') {
            return Err(YamlError::new(ErrorKind::InvalidIndentation, start_mark));
        }

        if increment > 0 {
            // The indicator counts from the parent block level.
            indent = if self.indent >= 1 {
                self.indent + increment
            } else {
                increment + 1
            };
        }

        if indent == 0 {
            self.scan_block_scalar_first_line_indent(&mut indent, &mut trailing_breaks)?;
        } else {
            self.scan_block_scalar_indent(indent, &mut trailing_breaks)?;
        }

        // End of stream with no content line, e.g. `- |+`.
        if self.rdr.is_eof() {
            let contents = match chomping {
                ChompIndicator::Strip => String::new(),
                _ if self.mark().line == start_mark.line => String::new(),
                ChompIndicator::Clip => chomping_break,
                ChompIndicator::Keep if trailing_breaks.is_empty() => chomping_break,
                ChompIndicator::Keep => trailing_breaks,
            };
            return Ok(Token::new(
                Span::new(start_mark, self.mark()),
                TokenType::Scalar {
                    style,
                    value: contents,
                },
            ));
        }

        if self.mark().col < indent && self.mark().col > self.indent {
            return Err(YamlError::new(ErrorKind::InvalidIndentation, self.mark()));
        }

        while self.mark().col == indent && !self.rdr.is_eof() {
            if indent == 1 && self.rdr.next_is_three('.') && self.rdr.next_is_document_indicator()
            {
                break;
            }

            // First content character of the line: decide folding.
            trailing_blank = self.rdr.head().map_or(false, is_blank);
            if !literal && !leading_break.is_empty() && !leading_blank && !trailing_blank {
                string.push_str(&trailing_breaks);
                if trailing_breaks.is_empty() {
                    string.push(' ');
                }
            } else {
                string.push_str(&leading_break);
                string.push_str(&trailing_breaks);
            }
            leading_break.clear();
            trailing_breaks.clear();

            leading_blank = self.rdr.head().map_or(false, is_blank);

            while !self.rdr.head().map_or(true, is_break) {
                string.push(self.rdr.head().unwrap());
                self.skip_blank()?;
            }

            if self.rdr.is_eof() {
                break;
            }

            let br = self.rdr.scan_line_break().map_err(YamlError::from)?;
            if br.is_some() {
                self.leading_whitespace = true;
                leading_break.push('\n');
            }

            self.scan_block_scalar_indent(indent, &mut trailing_breaks)?;
        }

        // Chomp the tail.
        if chomping != ChompIndicator::Strip {
            string.push_str(&leading_break);
            // An unterminated final line at content depth still counts as
            // a line for clipping purposes.
            if self.rdr.is_eof() && self.mark().col > indent.max(1) {
                string.push('\n');
            }
        }
        if chomping == ChompIndicator::Keep {
            string.push_str(&trailing_breaks);
        }

        Ok(Token::new(
            Span::new(start_mark, self.mark()),
            TokenType::Scalar {
                style,
                value: string,
            },
        ))
    }

    /// Detect the content indentation from the first non-empty line,
    /// consuming leading empty lines into `breaks`.
    fn scan_block_scalar_first_line_indent(
        &mut self,
        indent: &mut u32,
        breaks: &mut String,
    ) -> ScanResult {
        let mut max_indent = 0;
        loop {
            while self.rdr.next_is(' ') {
                self.skip_blank()?;
            }
            if self.mark().col > max_indent {
                max_indent = self.mark().col;
            }
            if self.rdr.head().map_or(false, is_break) {
                self.read_break_into(breaks)?;
            } else {
                break;
            }
        }
        *indent = max_indent.max(self.indent + 1);
        Ok(())
    }

    /// Skip the indentation of the coming line, consuming empty lines
    /// into `breaks`.
    fn scan_block_scalar_indent(&mut self, indent: u32, breaks: &mut String) -> ScanResult {
        loop {
            while self.mark().col < indent && self.rdr.next_is(' ') {
                self.skip_blank()?;
            }
            if self.rdr.head().map_or(false, is_break) {
                self.read_break_into(breaks)?;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn read_break_into(&mut self, buf: &mut String) -> ScanResult {
        let br = self.rdr.scan_line_break().map_err(YamlError::from)?;
        if br.is_some() {
            self.leading_whitespace = true;
            buf.push('\n');
        }
        Ok(())
    }
}

impl ScalarKind {
    #[must_use]
    pub fn style(self) -> ScalarStyle {
        match self {
            ScalarKind::Plain => ScalarStyle::Plain,
            ScalarKind::SingleQuoted => ScalarStyle::SingleQuoted,
            ScalarKind::DoubleQuoted => ScalarStyle::DoubleQuoted,
            ScalarKind::BlockLiteral => ScalarStyle::Literal,
            ScalarKind::BlockFolded => ScalarStyle::Folded,
        }
    }
}
