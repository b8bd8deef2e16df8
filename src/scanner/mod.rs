//! The token scanner: turns the reader's scalars into a stream of tokens,
//! tracking indentation, flow nesting, simple-key candidates and comments.

pub mod char_utils;
mod scalars;

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;

pub use scalars::ScalarKind;

use crate::reader::{Encoding, Reader};
use crate::scanner::char_utils::{is_anchor_char, is_blank, is_blank_or_break, is_break, is_flow,
                                 is_tag_char, is_uri_char, is_word_char};
use skein_common::{Comment, ErrorKind, Marker, ScanResult, Span, Token, TokenType, YamlError,
                   YamlResult};
use urlencoding::decode_binary;

/// A speculative implicit-key record. While `possible`, a later `:` on the
/// same line retroactively inserts a `Key` token at `token_number`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SimpleKey {
    possible: bool,
    required: bool,
    token_number: usize,
    mark: Marker,
}

impl SimpleKey {
    fn new(mark: Marker) -> SimpleKey {
        SimpleKey {
            possible: false,
            required: false,
            token_number: 0,
            mark,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Indent {
    column: u32,
    /// Entries pushed by `roll_one_col_indent` do not close a block
    /// collection and therefore emit no `BlockEnd` when popped.
    needs_block_end: bool,
}

pub struct Scanner<'input> {
    pub(crate) rdr: Reader<'input>,
    tokens: VecDeque<Token>,
    /// Index the next popped token will take; candidate token numbers are
    /// absolute against this counter.
    tokens_taken: usize,
    pending_comments: Vec<Comment>,
    simple_keys: Vec<SimpleKey>,
    indents: Vec<Indent>,
    error: Option<YamlError>,

    /// Column of the current block level's content, 0 outside any block.
    pub(crate) indent: u32,
    pub(crate) flow_level: u32,
    pub(crate) simple_key_allowed: bool,
    stream_start_produced: bool,
    stream_end_fetched: bool,
    stream_end_produced: bool,
    /// True while only blanks have been seen since the last line break.
    pub(crate) leading_whitespace: bool,
    /// Byte offset where a `:` with no following space is still a value
    /// indicator (right after a quoted scalar or flow end).
    adjacent_value_allowed_at: usize,

    // Fold buffers shared by the scalar sub-scanners.
    pub(crate) buf_leading_break: String,
    pub(crate) buf_trailing_breaks: String,
    pub(crate) buf_whitespaces: String,
}

impl<'input> Scanner<'input> {
    #[must_use]
    pub fn new(buf: &'input [u8], encoding: Option<Encoding>) -> Scanner<'input> {
        Scanner {
            rdr: Reader::new(buf, encoding),
            tokens: VecDeque::new(),
            tokens_taken: 0,
            pending_comments: Vec::new(),
            simple_keys: Vec::new(),
            indents: Vec::new(),
            error: None,

            indent: 0,
            flow_level: 0,
            simple_key_allowed: true,
            stream_start_produced: false,
            stream_end_fetched: false,
            stream_end_produced: false,
            leading_whitespace: true,
            adjacent_value_allowed_at: usize::MAX,

            buf_leading_break: String::new(),
            buf_trailing_breaks: String::new(),
            buf_whitespaces: String::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn mark(&self) -> Marker {
        self.rdr.mark()
    }

    /// Pop the next token, with comments gathered onto it. Leading
    /// `Comment` tokens join into `comment_before`; a comment trailing a
    /// single-line token on the same line becomes its `comment_after`.
    pub fn next_token(&mut self) -> YamlResult<Token> {
        loop {
            if self.stream_end_produced {
                return Err(YamlError::new(ErrorKind::EndOfStream, self.mark()));
            }
            self.fetch_more_tokens()?;
            let Some(tok) = self.tokens.pop_front() else {
                return Err(YamlError::new(ErrorKind::EndOfStream, self.mark()));
            };
            self.tokens_taken += 1;

            if let TokenType::Comment(text) = tok.token_type {
                self.pending_comments.push(Comment {
                    text,
                    mark: tok.span.start,
                });
                continue;
            }

            let mut tok = tok;
            if !self.pending_comments.is_empty() {
                tok.comment_before = Some(join_comments(&mut self.pending_comments));
            }
            if is_single_line(&tok.token_type) {
                self.attach_trailing_comment(&mut tok)?;
            }
            if tok.token_type == TokenType::StreamEnd {
                self.stream_end_produced = true;
            }
            return Ok(tok);
        }
    }

    fn attach_trailing_comment(&mut self, tok: &mut Token) -> ScanResult {
        if self.tokens.is_empty() {
            self.fetch_more_tokens()?;
        }
        let same_line = match self.tokens.front() {
            Some(front) => {
                matches!(front.token_type, TokenType::Comment(_))
                    && front.span.start.line == tok.span.end.line
            }
            None => false,
        };
        if same_line {
            let front = self.tokens.pop_front().unwrap();
            self.tokens_taken += 1;
            if let TokenType::Comment(text) = front.token_type {
                tok.comment_after = Some(Comment {
                    text,
                    mark: front.span.start,
                });
            }
        }
        Ok(())
    }

    /// Fetch until the queue holds a token that cannot be displaced by a
    /// retroactive `Key` insert, i.e. no live candidate points at the
    /// front index.
    fn fetch_more_tokens(&mut self) -> ScanResult {
        loop {
            let mut need_more = false;
            if self.tokens.is_empty() {
                need_more = true;
            } else {
                self.stale_simple_keys()?;
                for sk in &self.simple_keys {
                    if sk.possible && sk.token_number == self.tokens_taken {
                        need_more = true;
                        break;
                    }
                }
            }
            if !need_more || self.stream_end_fetched {
                break;
            }
            self.fetch_next_token()?;
        }
        Ok(())
    }

    fn fetch_next_token(&mut self) -> ScanResult {
        if !self.stream_start_produced {
            return self.fetch_stream_start();
        }

        self.scan_to_next_token()?;
        self.stale_simple_keys()?;

        let mark = self.mark();
        self.unroll_indent(mark.col);

        if self.rdr.is_eof() {
            return self.fetch_stream_end();
        }

        if mark.col == 1 {
            if self.rdr.next_is('%') {
                return self.fetch_directive();
            }
            if self.rdr.next_is_three('-') && self.blank_or_breakz_at(3) {
                return self.fetch_document_indicator(TokenType::DocumentStart);
            }
            if self.rdr.next_is_three('.') && self.blank_or_breakz_at(3) {
                return self.finish_document();
            }
        }

        if mark.col < self.indent {
            return Err(YamlError::new(ErrorKind::InvalidIndentation, mark));
        }

        self.fetch_main_loop()
    }

    fn fetch_main_loop(&mut self) -> ScanResult {
        let head = self.rdr.head().unwrap();
        let next = self.rdr.peek_nth(1);
        let next_blank = next.map_or(true, is_blank_or_break);
        match head {
            '[' => self.fetch_flow_collection_start(TokenType::FlowSequenceStart),
            '{' => self.fetch_flow_collection_start(TokenType::FlowMappingStart),
            ']' => self.fetch_flow_collection_end(TokenType::FlowSequenceEnd),
            '}' => self.fetch_flow_collection_end(TokenType::FlowMappingEnd),
            ',' => self.fetch_flow_entry(),
            '-' if next_blank => self.fetch_block_entry(),
            '?' if next_blank => self.fetch_key(),
            ':' if next_blank => self.fetch_value(),
            ':' if self.flow_level > 0
                && (next.map_or(false, is_flow)
                    || self.mark().pos == self.adjacent_value_allowed_at) =>
            {
                self.fetch_value()
            }
            '*' => self.fetch_anchor(true),
            '&' => self.fetch_anchor(false),
            '!' => self.fetch_tag(),
            '|' if self.flow_level == 0 => self.fetch_block_scalar(true),
            '>' if self.flow_level == 0 => self.fetch_block_scalar(false),
            '\'' => self.fetch_flow_scalar(true),
            '"' => self.fetch_flow_scalar(false),
            '%' | '@' | '`' => Err(YamlError::new(ErrorKind::InvalidToken, self.mark())),
            _ => self.fetch_plain_scalar(),
        }
    }

    fn fetch_stream_start(&mut self) -> ScanResult {
        self.rdr.advance().map_err(YamlError::from)?;
        let mark = self.mark();
        self.indent = 0;
        self.stream_start_produced = true;
        self.simple_key_allowed = true;
        self.tokens
            .push_back(Token::new(Span::empty(mark), TokenType::StreamStart));
        self.simple_keys.push(SimpleKey::new(Marker::start()));
        Ok(())
    }

    fn fetch_stream_end(&mut self) -> ScanResult {
        // No more context is coming: stall every candidate, but a required
        // one left unresolved is an error.
        for sk in &mut self.simple_keys {
            if sk.required && sk.possible {
                return Err(YamlError::new(ErrorKind::ExpectedKey, self.mark()));
            }
            sk.possible = false;
        }

        self.unroll_indent(0);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        self.stream_end_fetched = true;
        self.tokens
            .push_back(Token::new(Span::empty(self.mark()), TokenType::StreamEnd));
        Ok(())
    }

    fn fetch_document_indicator(&mut self, token_type: TokenType) -> ScanResult {
        self.unroll_indent(0);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;

        let mark = self.mark();
        self.skip_non_blank()?;
        self.skip_non_blank()?;
        self.skip_non_blank()?;

        self.tokens
            .push_back(Token::new(Span::new(mark, self.mark()), token_type));
        Ok(())
    }

    fn finish_document(&mut self) -> ScanResult {
        self.fetch_document_indicator(TokenType::DocumentEnd)?;
        self.skip_blanks()?;
        if !self.next_is_breakz() && !(self.rdr.next_is('#') && self.comment_separated()) {
            return Err(YamlError::new(ErrorKind::InvalidToken, self.mark()));
        }
        Ok(())
    }

    /// Skip blanks and line breaks between tokens, producing `Comment`
    /// tokens along the way.
    fn scan_to_next_token(&mut self) -> ScanResult {
        loop {
            match self.rdr.head() {
                // Tabs cannot make up block indentation; a tab there is
                // only legal on an otherwise empty line.
                Some('\t')
                    if !self.indents.is_empty()
                        && self.leading_whitespace
                        && self.mark().col < self.indent =>
                {
                    self.skip_blanks()?;
                    if !self.next_is_breakz() {
                        return Err(YamlError::new(ErrorKind::InvalidIndentation, self.mark()));
                    }
                }
                Some(' ' | '\t') => self.skip_blank()?,
                Some(chr) if is_break(chr) => {
                    self.skip_line_break()?;
                    if self.flow_level == 0 {
                        self.simple_key_allowed = true;
                    }
                }
                Some('#') if self.comment_separated() => self.scan_comment_token()?,
                _ => break,
            }
        }
        Ok(())
    }

    /// A `#` opens a comment only at line start or after whitespace.
    fn comment_separated(&self) -> bool {
        self.rdr.prev().map_or(true, is_blank_or_break)
    }

    fn scan_comment_token(&mut self) -> ScanResult {
        let start_mark = self.mark();
        self.skip_non_blank()?;
        let mut text = String::new();
        while let Some(chr) = self.rdr.head() {
            if is_break(chr) {
                break;
            }
            text.push(chr);
            self.skip_non_blank()?;
        }
        self.tokens.push_back(Token::new(
            Span::new(start_mark, self.mark()),
            TokenType::Comment(text),
        ));
        Ok(())
    }

    fn fetch_flow_collection_start(&mut self, token_type: TokenType) -> ScanResult {
        self.save_simple_key();
        self.roll_one_col_indent();
        self.increase_flow_level()?;
        self.simple_key_allowed = true;

        let start_mark = self.mark();
        self.skip_non_blank()?;

        self.tokens
            .push_back(Token::new(Span::new(start_mark, self.mark()), token_type));
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, token_type: TokenType) -> ScanResult {
        self.remove_simple_key()?;
        self.decrease_flow_level();
        self.simple_key_allowed = false;

        let start_mark = self.mark();
        self.skip_non_blank()?;
        let span = Span::new(start_mark, self.mark());

        self.skip_blanks()?;
        if self.flow_level > 0 {
            self.adjacent_value_allowed_at = self.mark().pos;
        }

        self.tokens.push_back(Token::new(span, token_type));
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> ScanResult {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;

        let start_mark = self.mark();
        self.skip_non_blank()?;

        self.tokens.push_back(Token::new(
            Span::new(start_mark, self.mark()),
            TokenType::FlowEntry,
        ));
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> ScanResult {
        if self.flow_level > 0 {
            return Err(YamlError::new(ErrorKind::InvalidToken, self.mark()));
        }
        if !self.simple_key_allowed {
            return Err(YamlError::new(ErrorKind::UnexpectedKey, self.mark()));
        }

        let mark = self.mark();
        self.skip_non_blank()?;
        let end_mark = self.mark();

        self.roll_indent(mark.col, None, TokenType::BlockSequenceStart, mark);

        let mut any_tabs = false;
        while let Some(chr @ (' ' | '\t')) = self.rdr.head() {
            any_tabs |= chr == '\t';
            self.skip_blank()?;
        }
        if any_tabs
            && self.rdr.next_is('-')
            && self.rdr.peek_nth(1).map_or(true, is_blank_or_break)
        {
            return Err(YamlError::new(ErrorKind::ExpectedWhitespace, self.mark()));
        }
        if self.next_is_breakz() || self.rdr.head().map_or(false, is_flow) {
            self.roll_one_col_indent();
        }

        self.remove_simple_key()?;
        self.simple_key_allowed = true;

        self.tokens
            .push_back(Token::new(Span::new(mark, end_mark), TokenType::BlockEntry));
        Ok(())
    }

    fn fetch_key(&mut self) -> ScanResult {
        let start_mark = self.mark();
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Err(YamlError::new(ErrorKind::UnexpectedKey, start_mark));
            }
            self.roll_indent(
                start_mark.col,
                None,
                TokenType::BlockMappingStart,
                start_mark,
            );
        }

        self.remove_simple_key()?;
        self.simple_key_allowed = self.flow_level == 0;

        self.skip_non_blank()?;
        self.tokens.push_back(Token::new(
            Span::new(start_mark, self.mark()),
            TokenType::Key,
        ));
        Ok(())
    }

    fn fetch_value(&mut self) -> ScanResult {
        let sk = *self.simple_keys.last().unwrap();
        let start_mark = self.mark();
        self.skip_non_blank()?;

        if sk.possible {
            // Resolve the candidate: a Key token lands at its saved index,
            // a BlockMappingStart possibly right before it.
            let tok = Token::new(Span::empty(sk.mark), TokenType::Key);
            self.insert_token(sk.token_number - self.tokens_taken, tok);
            self.roll_indent(
                sk.mark.col,
                Some(sk.token_number),
                TokenType::BlockMappingStart,
                sk.mark,
            );
            self.roll_one_col_indent();

            self.simple_keys.last_mut().unwrap().possible = false;
            self.simple_key_allowed = false;
        } else {
            if self.flow_level == 0 {
                if !self.simple_key_allowed {
                    return Err(YamlError::new(ErrorKind::UnexpectedValue, start_mark));
                }
                self.roll_indent(
                    start_mark.col,
                    None,
                    TokenType::BlockMappingStart,
                    start_mark,
                );
            }
            self.roll_one_col_indent();
            self.simple_key_allowed = self.flow_level == 0;
        }

        self.tokens.push_back(Token::new(
            Span::new(start_mark, self.mark()),
            TokenType::Value,
        ));
        Ok(())
    }

    fn fetch_anchor(&mut self, alias: bool) -> ScanResult {
        self.save_simple_key();
        self.simple_key_allowed = false;

        let tok = self.scan_anchor(alias)?;
        self.tokens.push_back(tok);
        Ok(())
    }

    fn scan_anchor(&mut self, alias: bool) -> YamlResult<Token> {
        let start_mark = self.mark();
        self.skip_non_blank()?;

        let mut string = String::new();
        while let Some(chr) = self.rdr.head() {
            if !is_anchor_char(chr) {
                break;
            }
            string.push(chr);
            self.skip_non_blank()?;
        }

        if string.is_empty() {
            return Err(YamlError::new(ErrorKind::AnchorFormat, start_mark));
        }

        let token_type = if alias {
            TokenType::Alias(string)
        } else {
            TokenType::Anchor(string)
        };
        Ok(Token::new(Span::new(start_mark, self.mark()), token_type))
    }

    fn fetch_tag(&mut self) -> ScanResult {
        self.save_simple_key();
        self.simple_key_allowed = false;

        let tok = self.scan_tag()?;
        self.tokens.push_back(tok);
        Ok(())
    }

    fn scan_tag(&mut self) -> YamlResult<Token> {
        let start_mark = self.mark();
        let mut handle;
        let mut suffix;

        if self.rdr.nth_is(1, '<') {
            handle = String::new();
            suffix = self.scan_verbatim_tag(start_mark)?;
        } else {
            handle = self.scan_tag_handle(false, start_mark)?;
            if handle.len() >= 2 && handle.starts_with('!') && handle.ends_with('!') {
                suffix = self.scan_tag_shorthand_suffix("", start_mark)?;
                if suffix.is_empty() {
                    return Err(YamlError::new(ErrorKind::TagFormat, start_mark));
                }
            } else {
                suffix = self.scan_tag_shorthand_suffix(&handle, start_mark)?;
                handle = String::from("!");
                // The bare `!` non-specific tag.
                if suffix.is_empty() {
                    handle.clear();
                    suffix.push('!');
                }
            }
        }

        let terminated = self.rdr.head().map_or(true, is_blank_or_break)
            || (self.flow_level > 0 && self.rdr.head().map_or(false, is_flow));
        if terminated {
            Ok(Token::new(
                Span::new(start_mark, self.mark()),
                TokenType::Tag { handle, suffix },
            ))
        } else {
            Err(YamlError::new(ErrorKind::TagFormat, start_mark))
        }
    }

    fn scan_verbatim_tag(&mut self, start_mark: Marker) -> YamlResult<String> {
        // Eat `!<`.
        self.skip_non_blank()?;
        self.skip_non_blank()?;

        let mut raw = String::new();
        self.scan_tag_uri_chars(is_uri_char, &mut raw, start_mark)?;

        if !self.rdr.next_is('>') {
            return Err(YamlError::new(ErrorKind::TagFormat, start_mark));
        }
        self.skip_non_blank()?;

        percent_decode(&raw, start_mark)
    }

    fn scan_tag_handle(&mut self, directive: bool, mark: Marker) -> YamlResult<String> {
        if !self.rdr.next_is('!') {
            return Err(YamlError::new(ErrorKind::TagFormat, mark));
        }
        let mut string = String::from("!");
        self.skip_non_blank()?;

        while let Some(chr) = self.rdr.head() {
            if !is_word_char(chr) {
                break;
            }
            string.push(chr);
            self.skip_non_blank()?;
        }

        if self.rdr.next_is('!') {
            string.push('!');
            self.skip_non_blank()?;
        } else if directive && string != "!" {
            // In a %TAG directive the handle must close with `!`; in a tag
            // token the remainder is part of the suffix.
            return Err(YamlError::new(ErrorKind::TagFormat, mark));
        }
        Ok(string)
    }

    fn scan_tag_shorthand_suffix(&mut self, head: &str, mark: Marker) -> YamlResult<String> {
        let mut raw = String::new();
        // A lone `!` handle keeps its trailing characters as the suffix.
        if head.len() > 1 {
            raw.push_str(&head[1..]);
        }
        self.scan_tag_uri_chars(is_tag_char, &mut raw, mark)?;
        percent_decode(&raw, mark)
    }

    fn scan_tag_uri_chars(
        &mut self,
        allowed: fn(char) -> bool,
        out: &mut String,
        mark: Marker,
    ) -> ScanResult {
        while let Some(chr) = self.rdr.head() {
            if !allowed(chr) {
                break;
            }
            if chr == '%' {
                let hex = self.rdr.peek_nth(1).zip(self.rdr.peek_nth(2));
                if !hex.map_or(false, |(a, b)| a.is_ascii_hexdigit() && b.is_ascii_hexdigit()) {
                    return Err(YamlError::new(ErrorKind::TagFormat, mark));
                }
            }
            out.push(chr);
            self.skip_non_blank()?;
        }
        Ok(())
    }

    fn fetch_plain_scalar(&mut self) -> ScanResult {
        self.save_simple_key();
        self.simple_key_allowed = false;

        let tok = self.scan_scalar(ScalarKind::Plain)?;
        self.tokens.push_back(tok);
        Ok(())
    }

    fn fetch_flow_scalar(&mut self, single: bool) -> ScanResult {
        self.save_simple_key();
        self.simple_key_allowed = false;

        let kind = if single {
            ScalarKind::SingleQuoted
        } else {
            ScalarKind::DoubleQuoted
        };
        let tok = self.scan_scalar(kind)?;

        // JSON compatibility: after a quoted key the `:` needs no space.
        self.skip_blanks()?;
        self.adjacent_value_allowed_at = self.mark().pos;

        self.tokens.push_back(tok);
        Ok(())
    }

    fn fetch_block_scalar(&mut self, literal: bool) -> ScanResult {
        self.save_simple_key();
        self.simple_key_allowed = true;

        let kind = if literal {
            ScalarKind::BlockLiteral
        } else {
            ScalarKind::BlockFolded
        };
        let tok = self.scan_scalar(kind)?;
        self.tokens.push_back(tok);
        Ok(())
    }

    fn fetch_directive(&mut self) -> ScanResult {
        self.unroll_indent(0);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;

        if let Some(tok) = self.scan_directive()? {
            self.tokens.push_back(tok);
        }
        Ok(())
    }

    fn scan_directive(&mut self) -> YamlResult<Option<Token>> {
        let start_mark = self.mark();
        self.skip_non_blank()?;

        let name = self.scan_directive_name(start_mark)?;
        let tok = match name.as_str() {
            "YAML" => Some(self.scan_version_directive_value(start_mark)?),
            "TAG" => Some(self.scan_tag_directive_value(start_mark)?),
            // Reserved directives are skipped to the end of the line.
            _ => {
                while !self.next_is_breakz() {
                    self.skip_non_blank()?;
                }
                None
            }
        };

        self.skip_blanks()?;
        if self.rdr.next_is('#') && self.comment_separated() {
            while !self.next_is_breakz() {
                self.skip_non_blank()?;
            }
        }
        if !self.next_is_breakz() {
            return Err(YamlError::new(ErrorKind::ExpectedWhitespace, self.mark()));
        }
        self.skip_line_break()?;
        Ok(tok)
    }

    fn scan_directive_name(&mut self, start_mark: Marker) -> YamlResult<String> {
        let mut string = String::new();
        while let Some(chr) = self.rdr.head() {
            if !is_word_char(chr) {
                break;
            }
            string.push(chr);
            self.skip_non_blank()?;
        }

        if string.is_empty() || !self.rdr.head().map_or(true, is_blank_or_break) {
            return Err(YamlError::new(ErrorKind::DirectiveFormat, start_mark));
        }
        Ok(string)
    }

    fn scan_version_directive_value(&mut self, start_mark: Marker) -> YamlResult<Token> {
        self.skip_blanks()?;

        let major = self.scan_version_number(start_mark)?;
        if !self.rdr.next_is('.') {
            return Err(YamlError::new(ErrorKind::DirectiveFormat, start_mark));
        }
        self.skip_non_blank()?;
        let minor = self.scan_version_number(start_mark)?;

        Ok(Token::new(
            Span::new(start_mark, self.mark()),
            TokenType::VersionDirective { major, minor },
        ))
    }

    fn scan_version_number(&mut self, mark: Marker) -> YamlResult<u32> {
        self.leading_whitespace = false;
        let value = self
            .rdr
            .scan_integer()
            .map_err(YamlError::from)?
            .ok_or_else(|| YamlError::new(ErrorKind::DirectiveFormat, mark))?;
        u32::try_from(value).map_err(|_| YamlError::new(ErrorKind::DirectiveFormat, mark))
    }

    fn scan_tag_directive_value(&mut self, start_mark: Marker) -> YamlResult<Token> {
        self.skip_blanks()?;
        let handle = self.scan_tag_handle(true, start_mark)?;
        self.skip_blanks()?;
        let prefix = self.scan_tag_prefix(start_mark)?;

        if self.rdr.head().map_or(true, is_blank_or_break) {
            Ok(Token::new(
                Span::new(start_mark, self.mark()),
                TokenType::TagDirective { handle, prefix },
            ))
        } else {
            Err(YamlError::new(ErrorKind::TagFormat, start_mark))
        }
    }

    fn scan_tag_prefix(&mut self, start_mark: Marker) -> YamlResult<String> {
        let mut raw = String::new();
        match self.rdr.head() {
            Some('!') => {
                raw.push('!');
                self.skip_non_blank()?;
            }
            Some(chr) if is_uri_char(chr) => {}
            _ => return Err(YamlError::new(ErrorKind::TagFormat, start_mark)),
        }
        self.scan_tag_uri_chars(is_uri_char, &mut raw, start_mark)?;
        percent_decode(&raw, start_mark)
    }

    // Simple-key bookkeeping.

    fn save_simple_key(&mut self) {
        if self.simple_key_allowed {
            let required = self.flow_level == 0
                && self.indent == self.mark().col
                && self.indents.last().is_some_and(|x| x.needs_block_end);
            let sk = SimpleKey {
                mark: self.mark(),
                required,
                possible: true,
                token_number: self.tokens_taken + self.tokens.len(),
            };
            self.simple_keys.pop();
            self.simple_keys.push(sk);
        }
    }

    /// A candidate dies when it would span a line break or stray more than
    /// 1024 bytes from its start.
    fn stale_simple_keys(&mut self) -> ScanResult {
        let mark = self.mark();
        for sk in &mut self.simple_keys {
            if sk.possible && (sk.mark.line < mark.line || sk.mark.pos + 1024 < mark.pos) {
                if sk.required {
                    return Err(YamlError::new(ErrorKind::ExpectedKey, mark));
                }
                sk.possible = false;
            }
        }
        Ok(())
    }

    fn remove_simple_key(&mut self) -> ScanResult {
        let last = self.simple_keys.last_mut().unwrap();
        if last.possible && last.required {
            return Err(YamlError::new(ErrorKind::ExpectedKey, self.mark()));
        }
        last.possible = false;
        Ok(())
    }

    fn increase_flow_level(&mut self) -> ScanResult {
        self.simple_keys.push(SimpleKey::new(Marker::start()));
        self.flow_level = self
            .flow_level
            .checked_add(1)
            .ok_or_else(|| YamlError::new(ErrorKind::InvalidToken, self.mark()))?;
        Ok(())
    }

    fn decrease_flow_level(&mut self) {
        if self.flow_level > 0 {
            self.flow_level -= 1;
            self.simple_keys.pop().unwrap();
        }
    }

    fn insert_token(&mut self, pos: usize, token: Token) {
        assert!(pos <= self.tokens.len());
        self.tokens.insert(pos, token);
    }

    // Indentation bookkeeping.

    fn roll_indent(&mut self, col: u32, number: Option<usize>, token_type: TokenType, mark: Marker) {
        if self.flow_level > 0 {
            return;
        }

        if self.indent <= col {
            if let Some(last) = self.indents.last() {
                if !last.needs_block_end {
                    self.indent = last.column;
                    self.indents.pop();
                }
            }
        }

        if self.indent < col {
            self.indents.push(Indent {
                column: self.indent,
                needs_block_end: true,
            });
            self.indent = col;
            let span = Span::empty(mark);
            match number {
                Some(n) => self.insert_token(n - self.tokens_taken, Token::new(span, token_type)),
                None => self.tokens.push_back(Token::new(span, token_type)),
            }
        }
    }

    fn unroll_indent(&mut self, col: u32) {
        if self.flow_level > 0 {
            return;
        }
        while self.indent > col {
            let Some(top) = self.indents.pop() else { break };
            self.indent = top.column;
            if top.needs_block_end {
                self.tokens
                    .push_back(Token::new(Span::empty(self.mark()), TokenType::BlockEnd));
            }
        }
    }

    fn roll_one_col_indent(&mut self) {
        if self.flow_level == 0 && self.indents.last().is_some_and(|x| x.needs_block_end) {
            self.indents.push(Indent {
                column: self.indent,
                needs_block_end: false,
            });
            self.indent += 1;
        }
    }

    pub(crate) fn unroll_non_block_indents(&mut self) {
        while let Some(top) = self.indents.last() {
            if top.needs_block_end {
                break;
            }
            self.indent = top.column;
            self.indents.pop();
        }
    }

    // Reader shims that keep the line-start flag honest.

    pub(crate) fn skip_blank(&mut self) -> ScanResult {
        self.rdr.advance().map_err(YamlError::from)?;
        Ok(())
    }

    pub(crate) fn skip_non_blank(&mut self) -> ScanResult {
        self.leading_whitespace = false;
        self.rdr.advance().map_err(YamlError::from)?;
        Ok(())
    }

    pub(crate) fn skip_blanks(&mut self) -> ScanResult {
        while self.rdr.head().map_or(false, is_blank) {
            self.skip_blank()?;
        }
        Ok(())
    }

    pub(crate) fn skip_line_break(&mut self) -> ScanResult {
        if self.rdr.skip_line_break().map_err(YamlError::from)? {
            self.leading_whitespace = true;
        }
        Ok(())
    }

    pub(crate) fn next_is_breakz(&self) -> bool {
        self.rdr.head().map_or(true, is_break)
    }

    fn blank_or_breakz_at(&self, n: usize) -> bool {
        self.rdr.peek_nth(n).map_or(true, is_blank_or_break)
    }
}

fn is_single_line(token_type: &TokenType) -> bool {
    matches!(
        token_type,
        TokenType::Scalar { .. }
            | TokenType::Value
            | TokenType::FlowSequenceEnd
            | TokenType::FlowMappingEnd
    )
}

fn join_comments(pending: &mut Vec<Comment>) -> Comment {
    let mut iter = pending.drain(..);
    let mut joined = iter.next().unwrap();
    for comment in iter {
        joined.text.push('\n');
        joined.text.push_str(&comment.text);
    }
    joined
}

fn percent_decode(raw: &str, mark: Marker) -> YamlResult<String> {
    if !raw.contains('%') {
        return Ok(String::from(raw));
    }
    let bytes = decode_binary(raw.as_bytes());
    match core::str::from_utf8(&bytes) {
        Ok(decoded) => Ok(String::from(decoded)),
        Err(_) => Err(YamlError::new(ErrorKind::TagFormat, mark)),
    }
}

impl Iterator for Scanner<'_> {
    type Item = YamlResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stream_end_produced || self.error.is_some() {
            return None;
        }
        match self.next_token() {
            Ok(tok) => Some(Ok(tok)),
            Err(err) => {
                self.error = Some(err);
                Some(Err(err))
            }
        }
    }
}
