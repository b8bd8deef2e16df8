//! A streaming YAML 1.2 reader: a decoding [`Reader`], a context-sensitive
//! [`Scanner`] and a push-down [`Parser`], each a stateful iterator pulling
//! from the previous stage.
//!
//! ```
//! use skein::Parser;
//! use skein::EventKind;
//!
//! let events: Vec<_> = Parser::from("- a\n- b")
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//! assert!(matches!(events[1].kind, EventKind::SequenceStart { .. }));
//! ```

#![no_std]

extern crate alloc;

pub use parser::{assert_eq_event, Parser};
pub use reader::{Encoding, ReadError, Reader};
pub use scanner::{ScalarKind, Scanner};
pub use skein_common::{
    ChompIndicator, CollectionStyle, Comment, ErrorKind, Event, EventKind, Marker, ScalarStyle,
    ScanResult, Span, Token, TokenType, YamlError, YamlResult,
};

pub mod parser;
pub mod reader;
pub mod scanner;
