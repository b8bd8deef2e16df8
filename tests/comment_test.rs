mod common;

use crate::common::{assert_eq_event, events};
use skein::EventKind;

// Comments never disturb the event stream itself.
const COMMENTED_INPUT: &str = r#"
# top
hr: 65 # home runs
# between
avg: 0.278
"#;

const COMMENTED_EXPECTED: &str = r#"
 +DOC
  +MAP
   =VAL :hr
   =VAL :65
   =VAL :avg
   =VAL :0.278
  -MAP
 -DOC"#;

#[test]
fn comments_are_transparent() {
    assert_eq_event(COMMENTED_INPUT, COMMENTED_EXPECTED);
}

#[test]
fn leading_comment_attaches_before() {
    let events = events("# header\nkey: value");
    let mapping = &events[1];
    assert!(matches!(mapping.kind, EventKind::MappingStart { .. }));
    assert_eq!(mapping.comment_before.as_ref().unwrap().text, " header");
}

#[test]
fn trailing_comment_attaches_after() {
    let events = events("key: value # note");
    let value = &events[3];
    let EventKind::Scalar { value: text, .. } = &value.kind else {
        panic!("expected the value scalar");
    };
    assert_eq!(text, "value");
    let after = value.comment_after.as_ref().unwrap();
    assert_eq!(after.text, " note");
    assert_eq!(after.mark.line, 1);
}

#[test]
fn comment_between_entries_attaches_to_next() {
    let events = events("a: 1\n# middle\nb: 2");
    let key_b = &events[4];
    assert_eq!(key_b.comment_before.as_ref().unwrap().text, " middle");
}

#[test]
fn consecutive_comments_join() {
    let events = events("# one\n# two\nkey: 1");
    let mapping = &events[1];
    assert_eq!(mapping.comment_before.as_ref().unwrap().text, " one\n two");
}

#[test]
fn comment_marks_point_at_the_hash() {
    let events = events("key: value # note");
    let after = events[3].comment_after.as_ref().unwrap();
    assert_eq!(after.mark.col, 12);
}

#[test]
fn comment_inside_flow() {
    let events = events("[a, # c\n b]");
    let EventKind::Scalar { value, .. } = &events[3].kind else {
        panic!("expected a scalar");
    };
    assert_eq!(value, "b");
    assert_eq!(events[3].comment_before.as_ref().unwrap().text, " c");
}

// `#` without separating whitespace is scalar content.
#[test]
fn hash_without_separation_is_content() {
    let events = events("a#b: 1");
    let EventKind::Scalar { value, .. } = &events[2].kind else {
        panic!("expected the key scalar");
    };
    assert_eq!(value, "a#b");
}
