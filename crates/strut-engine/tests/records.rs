//! Record lifecycle: construction, three-state slots, defaults,
//! inheritance merge, and serialization

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use strut_diagnostics::SchemaError;
use strut_engine::{Engine, EngineConfig, SchemaDef, Value};
use strut_types::DefaultValue;

fn user_engine(config: EngineConfig) -> Engine {
    let engine = Engine::new(config);
    engine
        .register(
            SchemaDef::new("User")
                .attr("id", "int")
                .attr("name", "string")
                .attr("age", "?int"),
        )
        .unwrap();
    engine
}

// Scenario: {id:int, name:string, age:?int} constructed without age
#[test]
fn test_uninitialized_nullable_reads_as_null() {
    let engine = user_engine(EngineConfig::default());
    let user = engine
        .record_from_plain("User", json!({"id": 1, "name": "A"}), false)
        .unwrap();

    assert!(!user.is_initialized());
    assert_eq!(user.uninitialized_attributes(), vec!["age"]);
    assert_eq!(user.get("age").unwrap(), Value::Null);
}

#[test]
fn test_uninitialized_read_fails_under_strict_read_policy() {
    let engine = user_engine(
        EngineConfig::default().with_uninitialized_nullable_reads_as_null(false),
    );
    let user = engine
        .record_from_plain("User", json!({"id": 1, "name": "A"}), false)
        .unwrap();

    assert!(matches!(
        user.get("age"),
        Err(SchemaError::UninitializedAccess { class, name })
            if class == "User" && name == "age"
    ));
}

#[test]
fn test_unset_non_nullable_read_always_fails() {
    let engine = user_engine(EngineConfig::default());
    let user = engine.new_record("User").unwrap();
    // id is non-nullable, so the nullable-reads-as-null policy does not apply.
    assert!(matches!(
        user.get("id"),
        Err(SchemaError::UninitializedAccess { .. })
    ));
}

#[test]
fn test_missing_attribute_when_uninitialized_disallowed() {
    let engine = user_engine(
        EngineConfig::default().with_allow_uninitialized_state(false),
    );
    let err = engine
        .record_from_plain("User", json!({"id": 1, "name": "A"}), false)
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::MissingAttribute { class, name } if class == "User" && name == "age"
    ));
}

#[test]
fn test_materialize_defaults_stores_zero_values() {
    let engine = Engine::new(
        EngineConfig::default()
            .with_allow_uninitialized_state(false)
            .with_materialize_defaults_when_missing(true),
    );
    engine
        .register(
            SchemaDef::new("Totals")
                .attr("count", "int")
                .attr("ratio", "float")
                .attr("label", "string")
                .attr("active", "bool")
                .attr("tags", "list[string]")
                .attr("note", "?string"),
        )
        .unwrap();

    let totals = engine.new_record("Totals").unwrap();
    assert!(totals.is_initialized());
    assert_eq!(totals.get("count").unwrap(), Value::Int(0));
    assert_eq!(totals.get("ratio").unwrap(), Value::Float(0.0));
    assert_eq!(totals.get("label").unwrap(), Value::String(String::new()));
    assert_eq!(totals.get("active").unwrap(), Value::Bool(false));
    assert_eq!(totals.get("tags").unwrap().as_list().unwrap().len(), 0);
    // Nullable attributes materialize as null.
    assert_eq!(totals.get("note").unwrap(), Value::Null);
}

#[test]
fn test_literal_default_is_coerced_and_stored() {
    let engine = Engine::default();
    engine
        .register(
            SchemaDef::new("Job")
                .attr("name", "string")
                .attr_default("retries", "int", DefaultValue::Value(json!(3))),
        )
        .unwrap();

    let job = engine.record_from_plain("Job", json!({"name": "sync"}), false).unwrap();
    assert_eq!(job.get("retries").unwrap(), Value::Int(3));
    assert!(job.is_initialized());
}

#[test]
fn test_supplied_value_beats_default() {
    let engine = Engine::default();
    engine
        .register(
            SchemaDef::new("Job")
                .attr("name", "string")
                .attr_default("retries", "int", DefaultValue::Value(json!(3))),
        )
        .unwrap();

    let job = engine
        .record_from_plain("Job", json!({"name": "sync", "retries": 5}), false)
        .unwrap();
    assert_eq!(job.get("retries").unwrap(), Value::Int(5));
}

// Scenario: instance-method default producing a fresh value per instance
#[test]
fn test_named_method_default_generates_fresh_values() {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let engine = Engine::default();
    engine
        .register(
            SchemaDef::new("Session")
                .attr_default("id", "string", DefaultValue::Named("generateId".into()))
                .method("generateId", |_record| {
                    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
                    json!(format!("session-{n}"))
                }),
        )
        .unwrap();

    let first = engine.new_record("Session").unwrap();
    let second = engine.new_record("Session").unwrap();

    let a = first.get("id").unwrap();
    let b = second.get("id").unwrap();
    assert!(a.as_str().unwrap().starts_with("session-"));
    assert_ne!(a, b);
}

#[test]
fn test_thunk_and_class_function_defaults() {
    let engine = Engine::default();
    engine
        .register(
            SchemaDef::new("Doc")
                .attr_default(
                    "version",
                    "int",
                    DefaultValue::Thunk(std::sync::Arc::new(|| json!(1))),
                )
                .attr_default("origin", "string", DefaultValue::Named("defaultOrigin".into()))
                .function("defaultOrigin", || json!("local")),
        )
        .unwrap();

    let doc = engine.new_record("Doc").unwrap();
    assert_eq!(doc.get("version").unwrap(), Value::Int(1));
    assert_eq!(doc.get("origin").unwrap(), Value::String("local".into()));
}

#[test]
fn test_unresolved_named_default_counts_as_no_default() {
    let engine = Engine::new(EngineConfig::default().with_allow_uninitialized_state(false));
    engine
        .register(
            SchemaDef::new("Broken")
                .attr_default("id", "string", DefaultValue::Named("missingMethod".into())),
        )
        .unwrap();

    assert!(matches!(
        engine.new_record("Broken"),
        Err(SchemaError::MissingAttribute { .. })
    ));
}

#[test]
fn test_strict_construction_rejects_unknown_keys() {
    let engine = user_engine(EngineConfig::default());

    // Lenient construction ignores unknown keys.
    let user = engine
        .record_from_plain("User", json!({"id": 1, "name": "A", "extra": true}), false)
        .unwrap();
    assert_eq!(user.get("id").unwrap(), Value::Int(1));

    let err = engine
        .record_from_plain("User", json!({"id": 1, "name": "A", "extra": true}), true)
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::UnknownAttribute { class, name } if class == "User" && name == "extra"
    ));
}

#[test]
fn test_from_pairs_later_pairs_overwrite() {
    let engine = user_engine(EngineConfig::default());
    let user = engine
        .record_from_pairs(
            "User",
            vec![
                ("id".to_string(), json!(1)),
                ("name".to_string(), json!("A")),
                ("name".to_string(), json!("B")),
            ],
        )
        .unwrap();
    assert_eq!(user.get("name").unwrap(), Value::String("B".into()));
}

#[test]
fn test_set_coerces_and_null_is_distinct_from_unset() {
    let engine = user_engine(EngineConfig::default());
    let mut user = engine
        .record_from_plain("User", json!({"id": 1, "name": "A"}), false)
        .unwrap();

    assert!(!user.is_set("age").unwrap());
    user.set("age", json!(30)).unwrap();
    assert_eq!(user.get("age").unwrap(), Value::Int(30));

    // Explicit null under a nullable descriptor is a held value.
    user.set("age", json!(null)).unwrap();
    assert!(user.is_set("age").unwrap());
    assert_eq!(
        user.attr_state("age").unwrap(),
        &strut_engine::AttrState::Set(Value::Null)
    );
    assert_eq!(user.get("age").unwrap(), Value::Null);
    assert!(user.is_initialized());

    // Unset returns the slot to the uninitialized state.
    user.unset("age").unwrap();
    assert!(!user.is_set("age").unwrap());
    assert!(!user.is_initialized());

    assert!(matches!(
        user.set("nope", json!(1)),
        Err(SchemaError::UnknownAttribute { .. })
    ));
    assert!(matches!(
        user.unset("nope"),
        Err(SchemaError::UnknownAttribute { .. })
    ));
    assert!(matches!(
        user.get("nope"),
        Err(SchemaError::UnknownAttribute { .. })
    ));
}

#[test]
fn test_set_rejects_wrong_kind() {
    let engine = user_engine(EngineConfig::default());
    let mut user = engine
        .record_from_plain("User", json!({"id": 1, "name": "A"}), false)
        .unwrap();
    assert!(matches!(
        user.set("id", json!("not-a-number")),
        Err(SchemaError::TypeMismatch { .. })
    ));
    // The failed write leaves the previous value in place.
    assert_eq!(user.get("id").unwrap(), Value::Int(1));
}

#[test]
fn test_inherited_attributes_come_first_in_declaration_order() {
    let engine = Engine::default();
    engine
        .register(SchemaDef::new("Base").attr("id", "int").attr("kind", "string"))
        .unwrap();
    engine
        .register(SchemaDef::new("Event").extends("Base").attr("payload", "?dict"))
        .unwrap();

    let schema = engine.schema("Event").unwrap();
    let names: Vec<&str> = schema.attributes.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["id", "kind", "payload"]);
}

#[test]
fn test_incompatible_redeclaration_shadows() {
    let engine = Engine::default();
    engine.register(SchemaDef::new("Base").attr("value", "int")).unwrap();
    engine
        .register(SchemaDef::new("Narrow").extends("Base").attr("value", "string"))
        .unwrap();
    engine
        .register(SchemaDef::new("Loose").extends("Base").attr("value", "?int"))
        .unwrap();
    engine
        .register(SchemaDef::new("Same").extends("Base").attr("value", "int"))
        .unwrap();

    assert!(matches!(
        engine.schema("Narrow"),
        Err(SchemaError::AttributeShadow { class, attribute, base })
            if class == "Narrow" && attribute == "value" && base == "Base"
    ));
    assert!(matches!(
        engine.schema("Loose"),
        Err(SchemaError::AttributeShadow { .. })
    ));
    // Redeclaring with an identical descriptor succeeds silently.
    assert!(engine.schema("Same").is_ok());
}

#[test]
fn test_cyclic_extends_is_detected() {
    let engine = Engine::default();
    engine.register(SchemaDef::new("A").extends("B").attr("x", "int")).unwrap();
    engine.register(SchemaDef::new("B").extends("A").attr("y", "int")).unwrap();
    assert!(matches!(
        engine.schema("A"),
        Err(SchemaError::CyclicInheritance { .. })
    ));
}

#[test]
fn test_duplicate_registration_fails() {
    let engine = Engine::default();
    engine.register(SchemaDef::new("A").attr("x", "int")).unwrap();
    assert!(matches!(
        engine.register(SchemaDef::new("A").attr("x", "int")),
        Err(SchemaError::DuplicateType { name }) if name == "A"
    ));
}

#[test]
fn test_recursive_schema_nesting() {
    let engine = Engine::default();
    engine
        .register(
            SchemaDef::new("Tree")
                .attr("label", "string")
                .attr("children", "list[Tree]"),
        )
        .unwrap();

    let tree = engine
        .record_from_plain(
            "Tree",
            json!({
                "label": "root",
                "children": [
                    {"label": "left", "children": []},
                    {"label": "right", "children": []},
                ],
            }),
            false,
        )
        .unwrap();

    let children = tree.get("children").unwrap();
    let list = children.as_list().unwrap();
    assert_eq!(list.len(), 2);
    let left = list.get(0).unwrap().as_record().unwrap();
    assert_eq!(left.get("label").unwrap(), Value::String("left".into()));
}

#[test]
fn test_serialization_round_trip() {
    let engine = user_engine(EngineConfig::default());
    let plain = json!({"id": 9, "name": "Ada", "age": 36});
    let user = engine.record_from_plain("User", plain.clone(), false).unwrap();

    assert_eq!(user.to_plain().unwrap(), plain);
    assert_eq!(
        user.to_json().unwrap(),
        r#"{"id":9,"name":"Ada","age":36}"#
    );
    assert!(user.to_json_pretty().unwrap().contains("\"name\": \"Ada\""));

    // Round-trip back through coercion reproduces an equal record.
    let again = engine
        .record_from_plain("User", user.to_plain().unwrap(), false)
        .unwrap();
    assert_eq!(user, again);
}

#[test]
fn test_serialization_applies_read_contract() {
    let engine = user_engine(
        EngineConfig::default().with_uninitialized_nullable_reads_as_null(false),
    );
    let user = engine
        .record_from_plain("User", json!({"id": 1, "name": "A"}), false)
        .unwrap();
    // age is unset and the read policy is strict, so serialization fails.
    assert!(matches!(
        user.to_plain(),
        Err(SchemaError::UninitializedAccess { .. })
    ));

    let relaxed = user_engine(EngineConfig::default());
    let user = relaxed
        .record_from_plain("User", json!({"id": 1, "name": "A"}), false)
        .unwrap();
    assert_eq!(
        user.to_plain().unwrap(),
        json!({"id": 1, "name": "A", "age": null})
    );
}
