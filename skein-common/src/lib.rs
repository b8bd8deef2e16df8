//! Shared data model for the `skein` event pipeline: stream positions,
//! lexer tokens, parser events and the error type every stage reports.

#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{Display, Formatter};

/// A position in the input stream: byte offset plus 1-based line and
/// column, the column counted in Unicode scalars.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Marker {
    pub pos: usize,
    pub line: u32,
    pub col: u32,
}

impl Marker {
    #[must_use]
    pub fn start() -> Marker {
        Marker {
            pos: 0,
            line: 1,
            col: 1,
        }
    }
}

impl Default for Marker {
    fn default() -> Marker {
        Marker::start()
    }
}

impl Display for Marker {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "line {} column {}", self.line, self.col)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Span {
    pub start: Marker,
    pub end: Marker,
}

impl Span {
    #[must_use]
    pub fn new(start: Marker, end: Marker) -> Span {
        Span { start, end }
    }

    #[must_use]
    pub fn empty(mark: Marker) -> Span {
        Span {
            start: mark,
            end: mark,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CollectionStyle {
    Block,
    Flow,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ChompIndicator {
    /// Keep the final line break, drop trailing empty lines.
    Clip,
    /// Drop the final line break and trailing empty lines.
    Strip,
    /// Keep the final line break and trailing empty lines.
    Keep,
}

/// A comment, detached from the surrounding tokens and re-attached to the
/// nearest one by the scanner.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Comment {
    pub text: String,
    pub mark: Marker,
}

#[derive(Clone, PartialEq, Debug)]
pub enum TokenType {
    StreamStart,
    StreamEnd,
    VersionDirective { major: u32, minor: u32 },
    TagDirective { handle: String, prefix: String },
    DocumentStart,
    DocumentEnd,
    BlockSequenceStart,
    BlockMappingStart,
    BlockEnd,
    FlowSequenceStart,
    FlowSequenceEnd,
    FlowMappingStart,
    FlowMappingEnd,
    BlockEntry,
    FlowEntry,
    Key,
    Value,
    Alias(String),
    Anchor(String),
    Tag { handle: String, suffix: String },
    Scalar { style: ScalarStyle, value: String },
    Comment(String),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Token {
    pub span: Span,
    pub token_type: TokenType,
    pub comment_before: Option<Comment>,
    pub comment_after: Option<Comment>,
}

impl Token {
    #[must_use]
    pub fn new(span: Span, token_type: TokenType) -> Token {
        Token {
            span,
            token_type,
            comment_before: None,
            comment_after: None,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum EventKind {
    DocumentStart {
        version: Option<(u32, u32)>,
        tags: Vec<(String, String)>,
    },
    DocumentEnd,
    SequenceStart {
        anchor: Option<String>,
        tag: Option<String>,
        style: CollectionStyle,
    },
    SequenceEnd,
    MappingStart {
        anchor: Option<String>,
        tag: Option<String>,
        style: CollectionStyle,
    },
    MappingEnd,
    Scalar {
        anchor: Option<String>,
        tag: Option<String>,
        value: String,
        style: ScalarStyle,
    },
    Alias(String),
}

/// A parser output. `is_implicit` marks events synthesized without a
/// dedicated source token (missing nodes, bare document boundaries).
#[derive(Clone, PartialEq, Debug)]
pub struct Event {
    pub kind: EventKind,
    pub mark: Marker,
    pub is_implicit: bool,
    pub comment_before: Option<Comment>,
    pub comment_after: Option<Comment>,
}

impl Event {
    #[must_use]
    pub fn new(kind: EventKind, mark: Marker, is_implicit: bool) -> Event {
        Event {
            kind,
            mark,
            is_implicit,
            comment_before: None,
            comment_after: None,
        }
    }
}

fn write_escaped(f: &mut Formatter<'_>, value: &str) -> core::fmt::Result {
    for chr in value.chars() {
        match chr {
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            '\u{8}' => write!(f, "\\b")?,
            _ => write!(f, "{chr}")?,
        }
    }
    Ok(())
}

fn write_props(
    f: &mut Formatter<'_>,
    anchor: &Option<String>,
    tag: &Option<String>,
) -> core::fmt::Result {
    if let Some(anchor) = anchor {
        write!(f, " &{anchor}")?;
    }
    if let Some(tag) = tag {
        write!(f, " <{tag}>")?;
    }
    Ok(())
}

impl Display for Event {
    /// Renders the yaml-test-suite notation (`+DOC`, `+SEQ`, `=VAL :x`, ...)
    /// the integration tests assert against.
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match &self.kind {
            EventKind::DocumentStart { .. } => {
                let exp_str = if self.is_implicit { "" } else { " ---" };
                write!(f, "+DOC{exp_str}")
            }
            EventKind::DocumentEnd => {
                let exp_str = if self.is_implicit { "" } else { " ..." };
                write!(f, "-DOC{exp_str}")
            }
            EventKind::SequenceStart { anchor, tag, style } => {
                write!(f, "+SEQ")?;
                if *style == CollectionStyle::Flow {
                    write!(f, " []")?;
                }
                write_props(f, anchor, tag)
            }
            EventKind::SequenceEnd => write!(f, "-SEQ"),
            EventKind::MappingStart { anchor, tag, style } => {
                write!(f, "+MAP")?;
                if *style == CollectionStyle::Flow {
                    write!(f, " {{}}")?;
                }
                write_props(f, anchor, tag)
            }
            EventKind::MappingEnd => write!(f, "-MAP"),
            EventKind::Scalar {
                anchor,
                tag,
                value,
                style,
            } => {
                write!(f, "=VAL")?;
                write_props(f, anchor, tag)?;
                match style {
                    ScalarStyle::Plain => write!(f, " :")?,
                    ScalarStyle::SingleQuoted => write!(f, " '")?,
                    ScalarStyle::DoubleQuoted => write!(f, " \"")?,
                    ScalarStyle::Literal => write!(f, " |")?,
                    ScalarStyle::Folded => write!(f, " >")?,
                }
                write_escaped(f, value)
            }
            EventKind::Alias(name) => write!(f, "=ALI *{name}"),
        }
    }
}

/// The flat error taxonomy shared by every pipeline stage.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    EndOfStream,
    InvalidEncoding,
    InvalidVersion,
    InvalidToken,
    InvalidIndentation,
    InvalidEscape,
    ExpectedKey,
    ExpectedValue,
    ExpectedWhitespace,
    UnexpectedKey,
    UnexpectedValue,
    UnexpectedDirective,
    DirectiveFormat,
    TagFormat,
    AnchorFormat,
}

impl ErrorKind {
    #[must_use]
    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::EndOfStream => "unexpected end of stream",
            ErrorKind::InvalidEncoding => "invalid code unit in input",
            ErrorKind::InvalidVersion => "unsupported YAML version",
            ErrorKind::InvalidToken => "character cannot start or continue a token",
            ErrorKind::InvalidIndentation => "invalid indentation",
            ErrorKind::InvalidEscape => "invalid escape sequence",
            ErrorKind::ExpectedKey => "expected a simple key",
            ErrorKind::ExpectedValue => "expected node content",
            ErrorKind::ExpectedWhitespace => "expected whitespace or a line break",
            ErrorKind::UnexpectedKey => "mapping key not allowed in this context",
            ErrorKind::UnexpectedValue => "mapping value not allowed in this context",
            ErrorKind::UnexpectedDirective => "duplicate or misplaced directive",
            ErrorKind::DirectiveFormat => "malformed directive",
            ErrorKind::TagFormat => "malformed tag",
            ErrorKind::AnchorFormat => "malformed anchor or alias name",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct YamlError {
    pub kind: ErrorKind,
    pub mark: Marker,
}

impl YamlError {
    #[must_use]
    pub fn new(kind: ErrorKind, mark: Marker) -> YamlError {
        YamlError { kind, mark }
    }
}

impl Display for YamlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} at {}", self.kind.as_str(), self.mark)
    }
}

/// A specialized `Result` type where the error is hard-wired to [`YamlError`].
pub type YamlResult<T> = Result<T, YamlError>;

/// Shorthand for scanner routines that only signal success or failure.
pub type ScanResult = YamlResult<()>;
