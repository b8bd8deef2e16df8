//! The push-down parser: applies the YAML production rules to the token
//! stream and emits events, resolving tag handles and carrying comments
//! across to the events they belong to.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::reader::Encoding;
use crate::scanner::Scanner;
use skein_common::{CollectionStyle, Comment, ErrorKind, Event, EventKind, Marker, ScalarStyle,
                   Token, TokenType, YamlError, YamlResult};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum State {
    StreamStart,
    ImplicitDocumentStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    BlockSequenceFirstEntry,
    BlockSequenceEntry,
    IndentlessSequenceEntry,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingValue,
    FlowSequenceFirstEntry,
    FlowSequenceEntry,
    FlowSequenceEntryMappingKey,
    FlowSequenceEntryMappingValue,
    FlowSequenceEntryMappingEnd,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingValue,
    FlowMappingEmptyValue,
    End,
}

pub struct Parser<'input> {
    scanner: Scanner<'input>,
    /// One token of pushback beyond the scanner's queue.
    peeked: Option<Token>,
    state: State,
    states: Vec<State>,
    marks: Vec<Marker>,
    version: Option<(u32, u32)>,
    /// Per-document handle map, reseeded with `!` and `!!` each document.
    tag_map: Vec<(String, String)>,
    /// Comments from tokens the parser consumed silently, waiting for the
    /// next emitted event.
    pending_comments: Vec<Comment>,
    done: bool,
}

impl<'input> Parser<'input> {
    #[must_use]
    pub fn new(buf: &'input [u8], encoding: Option<Encoding>) -> Parser<'input> {
        Parser {
            scanner: Scanner::new(buf, encoding),
            peeked: None,
            state: State::StreamStart,
            states: Vec::new(),
            marks: Vec::new(),
            version: None,
            tag_map: Vec::new(),
            pending_comments: Vec::new(),
            done: false,
        }
    }

    /// Produce the next event. After the last `DocumentEnd` the parser
    /// reports `EndOfStream`, which consumers treat as normal termination.
    pub fn next_event(&mut self) -> YamlResult<Event> {
        loop {
            match self.state {
                State::StreamStart => {
                    let tok = self.pop_token()?;
                    if tok.token_type != TokenType::StreamStart {
                        return Err(YamlError::new(ErrorKind::InvalidToken, tok.span.start));
                    }
                    self.state = State::ImplicitDocumentStart;
                }
                State::ImplicitDocumentStart => return self.parse_document_start(true),
                State::DocumentStart => return self.parse_document_start(false),
                State::DocumentContent => return self.parse_document_content(),
                State::DocumentEnd => return self.parse_document_end(),
                State::BlockSequenceFirstEntry => return self.parse_block_sequence_entry(true),
                State::BlockSequenceEntry => return self.parse_block_sequence_entry(false),
                State::IndentlessSequenceEntry => return self.parse_indentless_sequence_entry(),
                State::BlockMappingFirstKey => return self.parse_block_mapping_key(true),
                State::BlockMappingKey => return self.parse_block_mapping_key(false),
                State::BlockMappingValue => return self.parse_block_mapping_value(),
                State::FlowSequenceFirstEntry => return self.parse_flow_sequence_entry(true),
                State::FlowSequenceEntry => return self.parse_flow_sequence_entry(false),
                State::FlowSequenceEntryMappingKey => {
                    return self.parse_flow_sequence_entry_mapping_key();
                }
                State::FlowSequenceEntryMappingValue => {
                    return self.parse_flow_sequence_entry_mapping_value();
                }
                State::FlowSequenceEntryMappingEnd => {
                    return self.parse_flow_sequence_entry_mapping_end();
                }
                State::FlowMappingFirstKey => return self.parse_flow_mapping_key(true),
                State::FlowMappingKey => return self.parse_flow_mapping_key(false),
                State::FlowMappingValue => return self.parse_flow_mapping_value(false),
                State::FlowMappingEmptyValue => return self.parse_flow_mapping_value(true),
                State::End => {
                    return Err(YamlError::new(ErrorKind::EndOfStream, self.scanner.mark()));
                }
            }
        }
    }

    /// The `%YAML` version of the current document, when one was declared.
    #[must_use]
    pub fn version(&self) -> Option<(u32, u32)> {
        self.version
    }

    fn pop_token(&mut self) -> YamlResult<Token> {
        match self.peeked.take() {
            Some(tok) => Ok(tok),
            None => self.scanner.next_token(),
        }
    }

    fn unread(&mut self, tok: Token) {
        self.peeked = Some(tok);
    }

    fn peek_token(&mut self) -> YamlResult<&Token> {
        if self.peeked.is_none() {
            self.peeked = Some(self.scanner.next_token()?);
        }
        Ok(self.peeked.as_ref().unwrap())
    }

    fn pop_state(&mut self) -> State {
        self.states.pop().unwrap()
    }

    /// Stash the comments of a token that produces no event of its own.
    fn defer_comments(&mut self, tok: &mut Token) {
        if let Some(comment) = tok.comment_before.take() {
            self.pending_comments.push(comment);
        }
        if let Some(comment) = tok.comment_after.take() {
            self.pending_comments.push(comment);
        }
    }

    fn take_pending(&mut self) -> Option<Comment> {
        let mut iter = self.pending_comments.drain(..);
        let mut joined = iter.next()?;
        for comment in iter {
            joined.text.push('\n');
            joined.text.push_str(&comment.text);
        }
        Some(joined)
    }

    fn emit(
        &mut self,
        kind: EventKind,
        mark: Marker,
        is_implicit: bool,
        before: Option<Comment>,
        after: Option<Comment>,
    ) -> Event {
        let mut event = Event::new(kind, mark, is_implicit);
        event.comment_before = match (self.take_pending(), before) {
            (Some(mut pending), Some(own)) => {
                pending.text.push('\n');
                pending.text.push_str(&own.text);
                Some(pending)
            }
            (Some(pending), None) => Some(pending),
            (None, own) => own,
        };
        event.comment_after = after;
        event
    }

    fn empty_scalar(&mut self, mark: Marker) -> Event {
        self.emit(
            EventKind::Scalar {
                anchor: None,
                tag: None,
                value: String::new(),
                style: ScalarStyle::Plain,
            },
            mark,
            true,
            None,
            None,
        )
    }

    fn parse_document_start(&mut self, implicit: bool) -> YamlResult<Event> {
        let mut tok = self.pop_token()?;
        if !implicit {
            // Any number of trailing `...` markers may precede the next
            // document.
            while tok.token_type == TokenType::DocumentEnd {
                self.defer_comments(&mut tok);
                tok = self.pop_token()?;
            }
        }

        if tok.token_type == TokenType::StreamEnd {
            if implicit {
                // An empty stream still frames one bare document.
                let mark = tok.span.start;
                self.unread(tok);
                self.process_directives()?;
                self.state = State::DocumentEnd;
                let event = self.emit(
                    EventKind::DocumentStart {
                        version: None,
                        tags: Vec::new(),
                    },
                    mark,
                    true,
                    None,
                    None,
                );
                return Ok(event);
            }
            self.state = State::End;
            return Err(YamlError::new(ErrorKind::EndOfStream, tok.span.start));
        }

        let bare_content = implicit
            && !matches!(
                tok.token_type,
                TokenType::VersionDirective { .. }
                    | TokenType::TagDirective { .. }
                    | TokenType::DocumentStart
            );
        if bare_content {
            let mark = tok.span.start;
            self.unread(tok);
            self.process_directives()?;
            self.states.push(State::DocumentEnd);
            self.state = State::DocumentContent;
            let event = self.emit(
                EventKind::DocumentStart {
                    version: None,
                    tags: Vec::new(),
                },
                mark,
                true,
                None,
                None,
            );
            return Ok(event);
        }

        self.unread(tok);
        let (version, tags) = self.process_directives()?;
        let mut tok = self.pop_token()?;
        if tok.token_type != TokenType::DocumentStart {
            // Directives must be followed by an explicit document start.
            return Err(YamlError::new(ErrorKind::InvalidToken, tok.span.start));
        }
        let mark = tok.span.start;
        let before = tok.comment_before.take();
        let after = tok.comment_after.take();
        self.states.push(State::DocumentEnd);
        self.state = State::DocumentContent;
        Ok(self.emit(
            EventKind::DocumentStart { version, tags },
            mark,
            false,
            before,
            after,
        ))
    }

    #[allow(clippy::type_complexity)]
    fn process_directives(&mut self) -> YamlResult<(Option<(u32, u32)>, Vec<(String, String)>)> {
        let mut version = None;
        let mut tags: Vec<(String, String)> = Vec::new();
        self.tag_map.clear();

        loop {
            let mut tok = self.pop_token()?;
            match &tok.token_type {
                TokenType::VersionDirective { major, minor } => {
                    if version.is_some() {
                        return Err(YamlError::new(
                            ErrorKind::UnexpectedDirective,
                            tok.span.start,
                        ));
                    }
                    if *major != 1 {
                        return Err(YamlError::new(ErrorKind::InvalidVersion, tok.span.start));
                    }
                    version = Some((*major, *minor));
                    self.defer_comments(&mut tok);
                }
                TokenType::TagDirective { handle, prefix } => {
                    if self.tag_map.iter().any(|(known, _)| known == handle) {
                        return Err(YamlError::new(
                            ErrorKind::UnexpectedDirective,
                            tok.span.start,
                        ));
                    }
                    self.tag_map.push((handle.clone(), prefix.clone()));
                    tags.push((handle.clone(), prefix.clone()));
                    self.defer_comments(&mut tok);
                }
                _ => {
                    self.unread(tok);
                    break;
                }
            }
        }

        for (handle, prefix) in [("!", "!"), ("!!", "tag:yaml.org,2002:")] {
            if !self.tag_map.iter().any(|(known, _)| known == handle) {
                self.tag_map
                    .push((String::from(handle), String::from(prefix)));
            }
        }
        self.version = version;
        Ok((version, tags))
    }

    fn parse_document_content(&mut self) -> YamlResult<Event> {
        let tok = self.pop_token()?;
        if matches!(
            tok.token_type,
            TokenType::VersionDirective { .. }
                | TokenType::TagDirective { .. }
                | TokenType::DocumentStart
                | TokenType::DocumentEnd
                | TokenType::StreamEnd
        ) {
            let mark = tok.span.start;
            self.unread(tok);
            self.state = self.pop_state();
            Ok(self.empty_scalar(mark))
        } else {
            self.unread(tok);
            self.parse_node(true, false)
        }
    }

    fn parse_document_end(&mut self) -> YamlResult<Event> {
        let mut tok = self.pop_token()?;
        let mark = tok.span.start;
        let mut implicit = true;
        let mut before = None;
        let mut after = None;
        if tok.token_type == TokenType::DocumentEnd {
            implicit = false;
            before = tok.comment_before.take();
            after = tok.comment_after.take();
        } else {
            // A trailing comment on the stream end still belongs to this
            // document.
            self.defer_comments(&mut tok);
            self.unread(tok);
        }

        self.tag_map.clear();
        self.version = None;
        self.state = State::DocumentStart;
        Ok(self.emit(EventKind::DocumentEnd, mark, implicit, before, after))
    }

    fn resolve_tag(&self, handle: &str, suffix: &str, mark: Marker) -> YamlResult<String> {
        // Verbatim tags (`!<uri>`) carry an empty handle and pass through.
        if handle.is_empty() {
            return Ok(String::from(suffix));
        }
        for (known, prefix) in &self.tag_map {
            if known == handle {
                return Ok(format!("{prefix}{suffix}"));
            }
        }
        Err(YamlError::new(ErrorKind::TagFormat, mark))
    }

    fn parse_node(&mut self, block: bool, indentless: bool) -> YamlResult<Event> {
        let mut tok = self.pop_token()?;
        let start_mark = tok.span.start;

        if matches!(tok.token_type, TokenType::Alias(_)) {
            self.state = self.pop_state();
            let TokenType::Alias(name) = tok.token_type else {
                unreachable!()
            };
            return Ok(self.emit(
                EventKind::Alias(name),
                start_mark,
                false,
                tok.comment_before,
                tok.comment_after,
            ));
        }

        // An anchor and a tag may precede the node in either order.
        let mut anchor: Option<String> = None;
        let mut tag: Option<String> = None;
        loop {
            match tok.token_type {
                TokenType::Anchor(name) if anchor.is_none() => {
                    anchor = Some(name);
                    if let Some(comment) = tok.comment_before {
                        self.pending_comments.push(comment);
                    }
                    if let Some(comment) = tok.comment_after {
                        self.pending_comments.push(comment);
                    }
                    tok = self.pop_token()?;
                }
                TokenType::Tag { handle, suffix } if tag.is_none() => {
                    tag = Some(self.resolve_tag(&handle, &suffix, tok.span.start)?);
                    if let Some(comment) = tok.comment_before {
                        self.pending_comments.push(comment);
                    }
                    if let Some(comment) = tok.comment_after {
                        self.pending_comments.push(comment);
                    }
                    tok = self.pop_token()?;
                }
                _ => break,
            }
        }

        let node_mark = tok.span.start;

        if indentless && tok.token_type == TokenType::BlockEntry {
            self.unread(tok);
            self.state = State::IndentlessSequenceEntry;
            return Ok(self.emit(
                EventKind::SequenceStart {
                    anchor,
                    tag,
                    style: CollectionStyle::Block,
                },
                start_mark,
                false,
                None,
                None,
            ));
        }

        match tok.token_type {
            TokenType::Scalar { style, value } => {
                self.state = self.pop_state();
                Ok(self.emit(
                    EventKind::Scalar {
                        anchor,
                        tag,
                        value,
                        style,
                    },
                    start_mark,
                    false,
                    tok.comment_before,
                    tok.comment_after,
                ))
            }
            TokenType::FlowSequenceStart => {
                let before = tok.comment_before.take();
                let after = tok.comment_after.take();
                self.unread(tok);
                self.state = State::FlowSequenceFirstEntry;
                Ok(self.emit(
                    EventKind::SequenceStart {
                        anchor,
                        tag,
                        style: CollectionStyle::Flow,
                    },
                    start_mark,
                    false,
                    before,
                    after,
                ))
            }
            TokenType::FlowMappingStart => {
                let before = tok.comment_before.take();
                let after = tok.comment_after.take();
                self.unread(tok);
                self.state = State::FlowMappingFirstKey;
                Ok(self.emit(
                    EventKind::MappingStart {
                        anchor,
                        tag,
                        style: CollectionStyle::Flow,
                    },
                    start_mark,
                    false,
                    before,
                    after,
                ))
            }
            TokenType::BlockSequenceStart if block => {
                let before = tok.comment_before.take();
                let after = tok.comment_after.take();
                self.unread(tok);
                self.state = State::BlockSequenceFirstEntry;
                Ok(self.emit(
                    EventKind::SequenceStart {
                        anchor,
                        tag,
                        style: CollectionStyle::Block,
                    },
                    start_mark,
                    false,
                    before,
                    after,
                ))
            }
            TokenType::BlockMappingStart if block => {
                let before = tok.comment_before.take();
                let after = tok.comment_after.take();
                self.unread(tok);
                self.state = State::BlockMappingFirstKey;
                Ok(self.emit(
                    EventKind::MappingStart {
                        anchor,
                        tag,
                        style: CollectionStyle::Block,
                    },
                    start_mark,
                    false,
                    before,
                    after,
                ))
            }
            _ if anchor.is_some() || tag.is_some() => {
                // A node with properties but no content is an empty scalar.
                self.unread(tok);
                self.state = self.pop_state();
                Ok(self.emit(
                    EventKind::Scalar {
                        anchor,
                        tag,
                        value: String::new(),
                        style: ScalarStyle::Plain,
                    },
                    start_mark,
                    true,
                    None,
                    None,
                ))
            }
            _ => Err(YamlError::new(ErrorKind::ExpectedValue, node_mark)),
        }
    }

    fn parse_block_sequence_entry(&mut self, first: bool) -> YamlResult<Event> {
        if first {
            let mut tok = self.pop_token()?;
            self.marks.push(tok.span.start);
            self.defer_comments(&mut tok);
        }

        let mut tok = self.pop_token()?;
        match tok.token_type {
            TokenType::BlockEntry => {
                let mark = tok.span.end;
                self.defer_comments(&mut tok);
                let next = self.peek_token()?;
                if matches!(next.token_type, TokenType::BlockEntry | TokenType::BlockEnd) {
                    self.state = State::BlockSequenceEntry;
                    Ok(self.empty_scalar(mark))
                } else {
                    self.states.push(State::BlockSequenceEntry);
                    self.parse_node(true, false)
                }
            }
            TokenType::BlockEnd => {
                self.state = self.pop_state();
                self.marks.pop();
                Ok(self.emit(
                    EventKind::SequenceEnd,
                    tok.span.start,
                    false,
                    tok.comment_before,
                    tok.comment_after,
                ))
            }
            _ => Err(YamlError::new(ErrorKind::InvalidToken, tok.span.start)),
        }
    }

    fn parse_indentless_sequence_entry(&mut self) -> YamlResult<Event> {
        let mut tok = self.pop_token()?;
        if tok.token_type == TokenType::BlockEntry {
            let mark = tok.span.end;
            self.defer_comments(&mut tok);
            let next = self.peek_token()?;
            if matches!(
                next.token_type,
                TokenType::BlockEntry | TokenType::Key | TokenType::Value | TokenType::BlockEnd
            ) {
                self.state = State::IndentlessSequenceEntry;
                Ok(self.empty_scalar(mark))
            } else {
                self.states.push(State::IndentlessSequenceEntry);
                self.parse_node(true, false)
            }
        } else {
            // An indentless sequence has no closing token.
            let mark = tok.span.start;
            self.unread(tok);
            self.state = self.pop_state();
            Ok(self.emit(EventKind::SequenceEnd, mark, true, None, None))
        }
    }

    fn parse_block_mapping_key(&mut self, first: bool) -> YamlResult<Event> {
        if first {
            let mut tok = self.pop_token()?;
            self.marks.push(tok.span.start);
            self.defer_comments(&mut tok);
        }

        let mut tok = self.pop_token()?;
        match tok.token_type {
            TokenType::Key => {
                let mark = tok.span.end;
                self.defer_comments(&mut tok);
                let next = self.peek_token()?;
                if matches!(
                    next.token_type,
                    TokenType::Key | TokenType::Value | TokenType::BlockEnd
                ) {
                    self.state = State::BlockMappingValue;
                    Ok(self.empty_scalar(mark))
                } else {
                    self.states.push(State::BlockMappingValue);
                    self.parse_node(true, true)
                }
            }
            TokenType::BlockEnd => {
                self.state = self.pop_state();
                self.marks.pop();
                Ok(self.emit(
                    EventKind::MappingEnd,
                    tok.span.start,
                    false,
                    tok.comment_before,
                    tok.comment_after,
                ))
            }
            _ => Err(YamlError::new(ErrorKind::ExpectedKey, tok.span.start)),
        }
    }

    fn parse_block_mapping_value(&mut self) -> YamlResult<Event> {
        let mut tok = self.pop_token()?;
        if tok.token_type == TokenType::Value {
            let mark = tok.span.end;
            self.defer_comments(&mut tok);
            let next = self.peek_token()?;
            if matches!(
                next.token_type,
                TokenType::Key | TokenType::Value | TokenType::BlockEnd
            ) {
                self.state = State::BlockMappingKey;
                Ok(self.empty_scalar(mark))
            } else {
                self.states.push(State::BlockMappingKey);
                self.parse_node(true, true)
            }
        } else {
            let mark = tok.span.start;
            self.unread(tok);
            self.state = State::BlockMappingKey;
            Ok(self.empty_scalar(mark))
        }
    }

    fn parse_flow_sequence_entry(&mut self, first: bool) -> YamlResult<Event> {
        if first {
            let mut tok = self.pop_token()?;
            self.marks.push(tok.span.start);
            self.defer_comments(&mut tok);
        }

        let mut tok = self.pop_token()?;
        if tok.token_type != TokenType::FlowSequenceEnd {
            if !first {
                if tok.token_type == TokenType::FlowEntry {
                    self.defer_comments(&mut tok);
                    tok = self.pop_token()?;
                } else {
                    return Err(YamlError::new(ErrorKind::InvalidToken, tok.span.start));
                }
            }
            if tok.token_type == TokenType::Key {
                let mark = tok.span.start;
                let before = tok.comment_before.take();
                let after = tok.comment_after.take();
                self.state = State::FlowSequenceEntryMappingKey;
                return Ok(self.emit(
                    EventKind::MappingStart {
                        anchor: None,
                        tag: None,
                        style: CollectionStyle::Flow,
                    },
                    mark,
                    true,
                    before,
                    after,
                ));
            } else if tok.token_type != TokenType::FlowSequenceEnd {
                self.unread(tok);
                self.states.push(State::FlowSequenceEntry);
                return self.parse_node(false, false);
            }
        }

        self.state = self.pop_state();
        self.marks.pop();
        Ok(self.emit(
            EventKind::SequenceEnd,
            tok.span.start,
            false,
            tok.comment_before,
            tok.comment_after,
        ))
    }

    fn parse_flow_sequence_entry_mapping_key(&mut self) -> YamlResult<Event> {
        let mut tok = self.pop_token()?;
        if matches!(
            tok.token_type,
            TokenType::Value | TokenType::FlowEntry | TokenType::FlowSequenceEnd
        ) {
            let mark = tok.span.end;
            self.defer_comments(&mut tok);
            self.state = State::FlowSequenceEntryMappingValue;
            Ok(self.empty_scalar(mark))
        } else {
            self.unread(tok);
            self.states.push(State::FlowSequenceEntryMappingValue);
            self.parse_node(false, false)
        }
    }

    fn parse_flow_sequence_entry_mapping_value(&mut self) -> YamlResult<Event> {
        let mut tok = self.pop_token()?;
        if tok.token_type == TokenType::Value {
            self.defer_comments(&mut tok);
            let (ends_entry, mark) = {
                let next = self.peek_token()?;
                (
                    matches!(
                        next.token_type,
                        TokenType::FlowEntry | TokenType::FlowSequenceEnd
                    ),
                    next.span.start,
                )
            };
            if !ends_entry {
                self.states.push(State::FlowSequenceEntryMappingEnd);
                return self.parse_node(false, false);
            }
            self.state = State::FlowSequenceEntryMappingEnd;
            Ok(self.empty_scalar(mark))
        } else {
            let mark = tok.span.start;
            self.unread(tok);
            self.state = State::FlowSequenceEntryMappingEnd;
            Ok(self.empty_scalar(mark))
        }
    }

    fn parse_flow_sequence_entry_mapping_end(&mut self) -> YamlResult<Event> {
        let mark = self.peek_token()?.span.start;
        self.state = State::FlowSequenceEntry;
        Ok(self.emit(EventKind::MappingEnd, mark, true, None, None))
    }

    fn parse_flow_mapping_key(&mut self, first: bool) -> YamlResult<Event> {
        if first {
            let mut tok = self.pop_token()?;
            self.marks.push(tok.span.start);
            self.defer_comments(&mut tok);
        }

        let mut tok = self.pop_token()?;
        if tok.token_type != TokenType::FlowMappingEnd {
            if !first {
                if tok.token_type == TokenType::FlowEntry {
                    self.defer_comments(&mut tok);
                    tok = self.pop_token()?;
                } else {
                    return Err(YamlError::new(ErrorKind::InvalidToken, tok.span.start));
                }
            }
            if tok.token_type == TokenType::Key {
                self.defer_comments(&mut tok);
                let (empty_key_value, mark) = {
                    let next = self.peek_token()?;
                    (
                        matches!(
                            next.token_type,
                            TokenType::Value | TokenType::FlowEntry | TokenType::FlowMappingEnd
                        ),
                        next.span.start,
                    )
                };
                if !empty_key_value {
                    self.states.push(State::FlowMappingValue);
                    return self.parse_node(false, false);
                }
                self.state = State::FlowMappingValue;
                return Ok(self.empty_scalar(mark));
            } else if tok.token_type != TokenType::FlowMappingEnd {
                self.unread(tok);
                self.states.push(State::FlowMappingEmptyValue);
                return self.parse_node(false, false);
            }
        }

        self.state = self.pop_state();
        self.marks.pop();
        Ok(self.emit(
            EventKind::MappingEnd,
            tok.span.start,
            false,
            tok.comment_before,
            tok.comment_after,
        ))
    }

    fn parse_flow_mapping_value(&mut self, empty: bool) -> YamlResult<Event> {
        let mut tok = self.pop_token()?;
        if empty {
            let mark = tok.span.start;
            self.unread(tok);
            self.state = State::FlowMappingKey;
            return Ok(self.empty_scalar(mark));
        }
        if tok.token_type == TokenType::Value {
            self.defer_comments(&mut tok);
            let (ends_entry, mark) = {
                let next = self.peek_token()?;
                (
                    matches!(
                        next.token_type,
                        TokenType::FlowEntry | TokenType::FlowMappingEnd
                    ),
                    next.span.start,
                )
            };
            if !ends_entry {
                self.states.push(State::FlowMappingKey);
                return self.parse_node(false, false);
            }
            self.state = State::FlowMappingKey;
            Ok(self.empty_scalar(mark))
        } else {
            let mark = tok.span.start;
            self.unread(tok);
            self.state = State::FlowMappingKey;
            Ok(self.empty_scalar(mark))
        }
    }
}

impl<'input> From<&'input str> for Parser<'input> {
    fn from(input: &'input str) -> Parser<'input> {
        Parser::new(input.as_bytes(), Some(Encoding::Utf8))
    }
}

impl Iterator for Parser<'_> {
    type Item = YamlResult<Event>;

    /// Yields events until the terminal `EndOfStream`, which ends the
    /// iteration; any other error is surfaced once and fuses the iterator.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_event() {
            Ok(event) => Some(Ok(event)),
            Err(err) => {
                self.done = true;
                if err.kind == ErrorKind::EndOfStream && self.state == State::End {
                    None
                } else {
                    Some(Err(err))
                }
            }
        }
    }
}

/// Assert that the input produces the expected indented event notation.
///
/// # Panics
///
/// Panics when the generated events differ from `expected_events`.
pub fn assert_eq_event(input: &str, expected_events: &str) {
    use core::fmt::Write;

    let mut line = String::with_capacity(expected_events.len());
    let mut indent = 1usize;
    for event in Parser::from(input) {
        line.push('\n');
        match event {
            Ok(event) => {
                if matches!(
                    event.kind,
                    EventKind::SequenceEnd | EventKind::MappingEnd | EventKind::DocumentEnd
                ) {
                    indent -= 1;
                }
                for _ in 0..indent {
                    line.push(' ');
                }
                write!(line, "{event}").unwrap();
                if matches!(
                    event.kind,
                    EventKind::DocumentStart { .. }
                        | EventKind::SequenceStart { .. }
                        | EventKind::MappingStart { .. }
                ) {
                    indent += 1;
                }
            }
            Err(_) => {
                for _ in 0..indent {
                    line.push(' ');
                }
                line.push_str("ERR");
            }
        }
    }

    assert_eq!(expected_events, line, "Error in {input}");
}
