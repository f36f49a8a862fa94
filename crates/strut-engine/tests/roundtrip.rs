//! Round-trip property: a value coerced against a descriptor converts back
//! to plain data that coerces to an equal value

use proptest::prelude::*;
use serde_json::json;
use strut_engine::{Engine, to_plain};

proptest! {
    #[test]
    fn roundtrip_int(value in any::<i64>()) {
        let engine = Engine::default();
        let descriptor = engine.compile_type("int").unwrap();

        let typed = engine.coerce(&descriptor, json!(value)).unwrap();
        let plain = to_plain(&typed).unwrap();
        let again = engine.coerce(&descriptor, plain).unwrap();
        prop_assert_eq!(typed, again);
    }

    #[test]
    fn roundtrip_string(value in ".*") {
        let engine = Engine::default();
        let descriptor = engine.compile_type("string").unwrap();

        let typed = engine.coerce(&descriptor, json!(value)).unwrap();
        let plain = to_plain(&typed).unwrap();
        let again = engine.coerce(&descriptor, plain).unwrap();
        prop_assert_eq!(typed, again);
    }

    #[test]
    fn roundtrip_list_of_int(values in proptest::collection::vec(any::<i64>(), 0..16)) {
        let engine = Engine::default();
        let descriptor = engine.compile_type("list[int]").unwrap();

        let typed = engine.coerce(&descriptor, json!(values)).unwrap();
        let plain = to_plain(&typed).unwrap();
        let again = engine.coerce(&descriptor, plain).unwrap();
        prop_assert_eq!(typed, again);
    }

    #[test]
    fn roundtrip_nullable_bool(value in proptest::option::of(any::<bool>())) {
        let engine = Engine::default();
        let descriptor = engine.compile_type("?bool").unwrap();

        let typed = engine.coerce(&descriptor, json!(value)).unwrap();
        let plain = to_plain(&typed).unwrap();
        let again = engine.coerce(&descriptor, plain).unwrap();
        prop_assert_eq!(typed, again);
    }

    #[test]
    fn roundtrip_dict_of_string(
        entries in proptest::collection::btree_map("[a-z]{1,8}", ".*", 0..8)
    ) {
        let engine = Engine::default();
        let descriptor = engine.compile_type("dict[string]").unwrap();

        let typed = engine.coerce(&descriptor, json!(entries)).unwrap();
        let plain = to_plain(&typed).unwrap();
        let again = engine.coerce(&descriptor, plain).unwrap();
        prop_assert_eq!(typed, again);
    }
}
