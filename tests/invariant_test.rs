use proptest::prelude::*;

use skein::{Encoding, Event, EventKind, Parser, YamlResult};

fn fingerprint(buf: &[u8], encoding: Option<Encoding>) -> Vec<String> {
    Parser::new(buf, encoding)
        .map(|event| match event {
            Ok(event) => format!("{event} @{}:{}", event.mark.line, event.mark.col),
            Err(err) => format!("ERR {:?}", err.kind),
        })
        .collect()
}

fn utf16_le(input: &str) -> Vec<u8> {
    input
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect()
}

proptest! {
    #[test]
    fn arbitrary_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        for event in Parser::new(&data, None) {
            if event.is_err() {
                break;
            }
        }
    }

    #[test]
    fn yaml_shaped_input_never_panics(input in r#"[a-z0-9\-:#'" \n\[\]{},!&*|>?%.]{0,64}"#) {
        for event in Parser::from(input.as_str()) {
            if event.is_err() {
                break;
            }
        }
    }

    #[test]
    fn successful_parses_are_balanced(input in r#"[a-z\-: \n\[\]{},]{0,64}"#) {
        let events: YamlResult<Vec<Event>> = Parser::from(input.as_str()).collect();
        if let Ok(events) = events {
            let mut seq = 0i64;
            let mut map = 0i64;
            let mut doc = 0i64;
            for event in &events {
                match event.kind {
                    EventKind::SequenceStart { .. } => seq += 1,
                    EventKind::SequenceEnd => seq -= 1,
                    EventKind::MappingStart { .. } => map += 1,
                    EventKind::MappingEnd => map -= 1,
                    EventKind::DocumentStart { .. } => doc += 1,
                    EventKind::DocumentEnd => doc -= 1,
                    _ => {}
                }
                prop_assert!(seq >= 0 && map >= 0 && doc >= 0);
            }
            prop_assert_eq!(seq, 0);
            prop_assert_eq!(map, 0);
            prop_assert_eq!(doc, 0);

            for pair in events.windows(2) {
                prop_assert!(pair[0].mark.pos <= pair[1].mark.pos);
            }
        }
    }

    #[test]
    fn parsing_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..128)) {
        prop_assert_eq!(fingerprint(&data, None), fingerprint(&data, None));
    }

    #[test]
    fn ascii_input_is_encoding_invariant(input in r#"[ -~\n]{0,64}"#) {
        let utf8 = fingerprint(input.as_bytes(), Some(Encoding::Utf8));
        let utf16 = fingerprint(&utf16_le(&input), Some(Encoding::Utf16Le));
        prop_assert_eq!(utf8, utf16);
    }
}
