#![allow(dead_code)]

use skein::{Event, Parser, YamlResult};

pub use skein::assert_eq_event;

/// Collect the full event stream, panicking on any parse error.
pub fn events(input: &str) -> Vec<Event> {
    Parser::from(input)
        .collect::<YamlResult<Vec<Event>>>()
        .unwrap_or_else(|err| panic!("parse failed for {input:?}: {err}"))
}
