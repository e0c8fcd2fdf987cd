//! Engine-level checks: coercion results and aggregated error details.

use hyperdoc_schema::{
    ArraySchema, ErrorDetail, IntegerSchema, ObjectSchema, Schema, StringSchema,
};
use indexmap::IndexMap;
use serde_json::json;

#[test]
fn missing_required_property_detail() {
    let schema = Schema::Object(
        ObjectSchema::new()
            .property("name", Schema::String(StringSchema::new()))
            .required(["name"]),
    );
    let err = schema.validate(&json!({})).unwrap_err();
    let mut expected = IndexMap::new();
    expected.insert(
        "name".to_string(),
        ErrorDetail::Message("This field is required.".to_string()),
    );
    assert_eq!(err.detail, ErrorDetail::Map(expected));
}

#[test]
fn two_bad_properties_both_reported() {
    let schema = Schema::Object(
        ObjectSchema::new()
            .property("a", Schema::Integer(IntegerSchema::new()))
            .property("b", Schema::Integer(IntegerSchema::new())),
    );
    let err = schema.validate(&json!({"a": "x", "b": false})).unwrap_err();
    let ErrorDetail::Map(entries) = &err.detail else {
        panic!("expected keyed detail");
    };
    assert_eq!(entries.len(), 2);
    assert!(entries.contains_key("a"));
    assert!(entries.contains_key("b"));
}

#[test]
fn nested_details_carry_the_full_path() {
    let schema = Schema::Object(
        ObjectSchema::new().property(
            "scores",
            Schema::Array(ArraySchema::new().items(Schema::Integer(IntegerSchema::new()))),
        ),
    );
    let err = schema
        .validate(&json!({"scores": [1, "two", 3]}))
        .unwrap_err();
    assert_eq!(
        err.detail.flatten(),
        vec![(
            vec!["scores".to_string(), "1".to_string()],
            "Must be an integer.".to_string()
        )]
    );
}

#[test]
fn coercion_returns_a_new_cleaned_value() {
    let schema = Schema::Object(
        ObjectSchema::new()
            .property("name", Schema::String(StringSchema::new()))
            .property("age", Schema::Integer(IntegerSchema::new())),
    );
    let out = schema
        .validate(&json!({"name": "  rex  ", "age": 3.0, "extra": true}))
        .unwrap();
    // Trimmed string, integral float coerced to an integer, unmatched key
    // dropped.
    assert_eq!(out, json!({"name": "rex", "age": 3}));
}
