mod common;

use crate::common::assert_eq_event;

const BLOCK1_INPUT: &str = r#"
 - x
 - y
"#;

const BLOCK2_INPUT: &str = r#"
- x
- y
"#;

const BLOCK_EXPECTED: &str = r#"
 +DOC
  +SEQ
   =VAL :x
   =VAL :y
  -SEQ
 -DOC"#;

#[test]
fn block_seq() {
    assert_eq_event(BLOCK1_INPUT, BLOCK_EXPECTED);
    assert_eq_event(BLOCK2_INPUT, BLOCK_EXPECTED);
}

const BLOCK_NESTED_SEQ_INPUT: &str = r#"
  - - a
    - b
  - c
"#;

const BLOCK_NESTED_SEQ_EXPECTED: &str = r#"
 +DOC
  +SEQ
   +SEQ
    =VAL :a
    =VAL :b
   -SEQ
   =VAL :c
  -SEQ
 -DOC"#;

#[test]
fn block_seq_nested() {
    assert_eq_event(BLOCK_NESTED_SEQ_INPUT, BLOCK_NESTED_SEQ_EXPECTED);
}

const BLOCK_MAP_INPUT: &str = "hr: 65\navg: 0.278";

const BLOCK_MAP_EXPECTED: &str = r#"
 +DOC
  +MAP
   =VAL :hr
   =VAL :65
   =VAL :avg
   =VAL :0.278
  -MAP
 -DOC"#;

#[test]
fn block_map() {
    assert_eq_event(BLOCK_MAP_INPUT, BLOCK_MAP_EXPECTED);
}

const BLOCK_NESTED_MAP_INPUT: &str = r#"
a:
  b: c
"#;

const BLOCK_NESTED_MAP_EXPECTED: &str = r#"
 +DOC
  +MAP
   =VAL :a
   +MAP
    =VAL :b
    =VAL :c
   -MAP
  -MAP
 -DOC"#;

#[test]
fn block_map_nested() {
    assert_eq_event(BLOCK_NESTED_MAP_INPUT, BLOCK_NESTED_MAP_EXPECTED);
}

const INDENTLESS_SEQ_INPUT: &str = "key:\n- a\n- b\n";

const INDENTLESS_SEQ_EXPECTED: &str = r#"
 +DOC
  +MAP
   =VAL :key
   +SEQ
    =VAL :a
    =VAL :b
   -SEQ
  -MAP
 -DOC"#;

#[test]
fn block_seq_indentless() {
    assert_eq_event(INDENTLESS_SEQ_INPUT, INDENTLESS_SEQ_EXPECTED);
}

const EMPTY_VALUES_INPUT: &str = "a:\nb:\n";

const EMPTY_VALUES_EXPECTED: &str = r#"
 +DOC
  +MAP
   =VAL :a
   =VAL :
   =VAL :b
   =VAL :
  -MAP
 -DOC"#;

#[test]
fn block_map_empty_values() {
    assert_eq_event(EMPTY_VALUES_INPUT, EMPTY_VALUES_EXPECTED);
}

const EMPTY_ENTRIES_INPUT: &str = "- \n- x\n";

const EMPTY_ENTRIES_EXPECTED: &str = r#"
 +DOC
  +SEQ
   =VAL :
   =VAL :x
  -SEQ
 -DOC"#;

#[test]
fn block_seq_empty_entry() {
    assert_eq_event(EMPTY_ENTRIES_INPUT, EMPTY_ENTRIES_EXPECTED);
}

const SEQ_OF_MAPS_INPUT: &str = r#"
- name: Mark
  hr: 65
- name: Sammy
"#;

const SEQ_OF_MAPS_EXPECTED: &str = r#"
 +DOC
  +SEQ
   +MAP
    =VAL :name
    =VAL :Mark
    =VAL :hr
    =VAL :65
   -MAP
   +MAP
    =VAL :name
    =VAL :Sammy
   -MAP
  -SEQ
 -DOC"#;

#[test]
fn block_seq_of_maps() {
    assert_eq_event(SEQ_OF_MAPS_INPUT, SEQ_OF_MAPS_EXPECTED);
}

const EXPLICIT_KEY_INPUT: &str = "? complex\n: value\n";

const EXPLICIT_KEY_EXPECTED: &str = r#"
 +DOC
  +MAP
   =VAL :complex
   =VAL :value
  -MAP
 -DOC"#;

#[test]
fn block_map_explicit_key() {
    assert_eq_event(EXPLICIT_KEY_INPUT, EXPLICIT_KEY_EXPECTED);
}

const MULTILINE_PLAIN_INPUT: &str = "- Mark McGwire\n- folds\n  onto one line\n";

const MULTILINE_PLAIN_EXPECTED: &str = r#"
 +DOC
  +SEQ
   =VAL :Mark McGwire
   =VAL :folds onto one line
  -SEQ
 -DOC"#;

#[test]
fn block_plain_folding() {
    assert_eq_event(MULTILINE_PLAIN_INPUT, MULTILINE_PLAIN_EXPECTED);
}

// A dedent below the open sequence closes the document; the stray second
// sequence is fatal.
const BLOCK_ERR_INPUT: &str = r#"
  - x
 - y
"#;

const BLOCK_ERR_EXPECTED: &str = r#"
 +DOC
  +SEQ
   =VAL :x
  -SEQ
 -DOC
 ERR"#;

#[test]
fn block_seq_dedent_err() {
    assert_eq_event(BLOCK_ERR_INPUT, BLOCK_ERR_EXPECTED);
}

// A simple key further than 1024 bytes from its `:` cannot resolve.
#[test]
fn overlong_simple_key_err() {
    let mut input = String::from("a: 1\n");
    input.push_str(&"b".repeat(1025));
    input.push_str(": 2");
    let err = skein::Parser::from(input.as_str())
        .find_map(Result::err)
        .expect("must fail");
    assert_eq!(err.kind, skein::ErrorKind::ExpectedKey);
}

#[test]
fn reserved_indicators_err() {
    for input in ["@foo", "`foo"] {
        let err = skein::Parser::from(input)
            .find_map(Result::err)
            .expect("must fail");
        assert_eq!(err.kind, skein::ErrorKind::InvalidToken);
    }
}

// A multi-line plain scalar can never become a mapping key.
const VALUE_ERR_INPUT: &str = "a\nb: c";

const VALUE_ERR_EXPECTED: &str = r#"
 +DOC
  =VAL :a b
  ERR"#;

#[test]
fn block_multiline_key_err() {
    assert_eq_event(VALUE_ERR_INPUT, VALUE_ERR_EXPECTED);
}
