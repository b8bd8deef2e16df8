mod common;

use crate::common::assert_eq_event;

const LITERAL_INPUT: &str = "--- |\n  literal\n  text\n";

const LITERAL_EXPECTED: &str = r#"
 +DOC ---
  =VAL |literal\ntext\n
 -DOC"#;

#[test]
fn literal_scalar() {
    assert_eq_event(LITERAL_INPUT, LITERAL_EXPECTED);
}

const FOLDED_INPUT: &str = "--- >\n  folded\n  text\n";

const FOLDED_EXPECTED: &str = r#"
 +DOC ---
  =VAL >folded text\n
 -DOC"#;

#[test]
fn folded_scalar() {
    assert_eq_event(FOLDED_INPUT, FOLDED_EXPECTED);
}

const LITERAL_VALUE_INPUT: &str = "a: |\n  x\n  y\n";

const LITERAL_VALUE_EXPECTED: &str = r#"
 +DOC
  +MAP
   =VAL :a
   =VAL |x\ny\n
  -MAP
 -DOC"#;

#[test]
fn literal_as_map_value() {
    assert_eq_event(LITERAL_VALUE_INPUT, LITERAL_VALUE_EXPECTED);
}

const KEEP_INPUT: &str = "a: |+\n  x\n\n";

const KEEP_EXPECTED: &str = r#"
 +DOC
  +MAP
   =VAL :a
   =VAL |x\n\n
  -MAP
 -DOC"#;

#[test]
fn literal_keep_chomping() {
    assert_eq_event(KEEP_INPUT, KEEP_EXPECTED);
}

const STRIP_INPUT: &str = "a: |-\n  x\n";

const STRIP_EXPECTED: &str = r#"
 +DOC
  +MAP
   =VAL :a
   =VAL |x
  -MAP
 -DOC"#;

#[test]
fn literal_strip_chomping() {
    assert_eq_event(STRIP_INPUT, STRIP_EXPECTED);
}

const CLIP_INPUT: &str = "|\n  x\n\n\n";

const CLIP_EXPECTED: &str = r#"
 +DOC
  =VAL |x\n
 -DOC"#;

#[test]
fn literal_clip_drops_trailing_empties() {
    assert_eq_event(CLIP_INPUT, CLIP_EXPECTED);
}

const FOLDED_BLANK_LINE_INPUT: &str = ">\n  a\n\n  b\n";

const FOLDED_BLANK_LINE_EXPECTED: &str = r#"
 +DOC
  =VAL >a\nb\n
 -DOC"#;

#[test]
fn folded_blank_line_is_newline() {
    assert_eq_event(FOLDED_BLANK_LINE_INPUT, FOLDED_BLANK_LINE_EXPECTED);
}

const FOLDED_MORE_INDENTED_INPUT: &str = ">\n  folded\n   more\n  line\n";

const FOLDED_MORE_INDENTED_EXPECTED: &str = r#"
 +DOC
  =VAL >folded\n more\nline\n
 -DOC"#;

#[test]
fn folded_more_indented_keeps_breaks() {
    assert_eq_event(FOLDED_MORE_INDENTED_INPUT, FOLDED_MORE_INDENTED_EXPECTED);
}

const EXPLICIT_INDENT_INPUT: &str = "|2\n  x\n";

const EXPLICIT_INDENT_EXPECTED: &str = r#"
 +DOC
  =VAL |x\n
 -DOC"#;

#[test]
fn literal_explicit_indent() {
    assert_eq_event(EXPLICIT_INDENT_INPUT, EXPLICIT_INDENT_EXPECTED);
}

const HEADER_BOTH_INPUT: &str = "|1+\n x\n\n";

const HEADER_BOTH_EXPECTED: &str = r#"
 +DOC
  =VAL |x\n\n
 -DOC"#;

#[test]
fn literal_indent_and_chomping() {
    assert_eq_event(HEADER_BOTH_INPUT, HEADER_BOTH_EXPECTED);
}

const KEEP_EMPTY_INPUT: &str = "- |+\n";

const KEEP_EMPTY_EXPECTED: &str = r#"
 +DOC
  +SEQ
   =VAL |\n
  -SEQ
 -DOC"#;

#[test]
fn literal_keep_without_content() {
    assert_eq_event(KEEP_EMPTY_INPUT, KEEP_EMPTY_EXPECTED);
}

const ZERO_INDENT_INPUT: &str = "|0\nx";

const ZERO_INDENT_EXPECTED: &str = r#"
 ERR"#;

#[test]
fn literal_zero_indent_err() {
    assert_eq_event(ZERO_INDENT_INPUT, ZERO_INDENT_EXPECTED);
}

const TAB_INDENT_INPUT: &str = "|\n\tx\n";

#[test]
fn literal_tab_indent_err() {
    let err = skein::Parser::from(TAB_INDENT_INPUT)
        .find_map(Result::err)
        .expect("must fail");
    assert_eq!(err.kind, skein::ErrorKind::InvalidIndentation);
}
