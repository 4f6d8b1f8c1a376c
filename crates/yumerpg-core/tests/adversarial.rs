//! Adversarial input tests.
//!
//! Broken declarations and saves must come back as errors, never as panics,
//! partially built objects or unbounded recursion.

use yumerpg_core::constructor::ConstructorRegistry;
use yumerpg_core::context::SerializeContext;
use yumerpg_core::document::DocumentError;
use yumerpg_core::element::ElementRegistry;
use yumerpg_core::error::ObjectError;
use yumerpg_core::id::{Id, NameError};
use yumerpg_core::json;
use yumerpg_core::options::DecodeOptions;
use yumerpg_core::test_utils::*;

fn load(declarations: &str) -> (ElementRegistry, ConstructorRegistry) {
    let mut elements = ElementRegistry::new();
    let mut constructors = ConstructorRegistry::new();
    register_test_constructors(&mut constructors);
    elements.register_all(json::decode_elements(declarations).unwrap());
    (elements, constructors)
}

fn object_error(err: &DocumentError) -> &ObjectError {
    match err.root() {
        DocumentError::Object(inner) => inner,
        other => panic!("expected an object error, got {other:?}"),
    }
}

/// An Element whose defaults reference itself.
#[test]
fn self_referencing_default() {
    let link = link_constructor_id().0;
    let (elements, constructors) =
        load(&format!(r#"{{"id": 1, "constructor": {link}, "data": {{"next": 1}}}}"#));
    let codec = SerializeContext::new(&elements, &constructors);
    let err = json::decode_objects(codec, r#"{"element": 1}"#).unwrap_err();
    assert!(matches!(object_error(&err), ObjectError::CyclicReference { .. }));
}

/// A three-Element loop reached from a save that overrides nothing on the way.
#[test]
fn long_default_loop() {
    let link = link_constructor_id().0;
    let (elements, constructors) = load(&format!(
        r#"[
            {{"id": 1, "constructor": {link}, "data": {{"next": 2}}}},
            {{"id": 2, "constructor": {link}, "data": {{"next": 3}}}},
            {{"id": 3, "constructor": {link}, "data": {{"next": 1}}}}
        ]"#
    ));
    let codec = SerializeContext::new(&elements, &constructors);
    let err = json::decode_objects(codec, r#"[{"element": 2}]"#).unwrap_err();
    match object_error(&err) {
        ObjectError::CyclicReference { path } => {
            assert_eq!(path.first(), Some(&Id(2)));
            assert_eq!(path.last(), Some(&Id(2)));
        }
        other => panic!("unexpected {other:?}"),
    }
}

/// A loop entered through an inline override still terminates.
#[test]
fn loop_entered_through_save_data() {
    let link = link_constructor_id().0;
    let (elements, constructors) = load(&format!(
        r#"[
            {{"id": 1, "constructor": {link}, "data": {{"next": 2}}}},
            {{"id": 2, "constructor": {link}, "data": {{"next": 1}}}}
        ]"#
    ));
    let codec = SerializeContext::new(&elements, &constructors);
    let err = json::decode_objects(
        codec,
        r#"{"element": 1, "data": {"next": {"element": 2, "data": {}}}}"#,
    )
    .unwrap_err();
    assert!(matches!(object_error(&err), ObjectError::CyclicReference { .. }));
}

#[test]
fn unknown_element_in_save() {
    let (elements, constructors) = load(SCENARIO_DECLARATIONS);
    let codec = SerializeContext::new(&elements, &constructors);
    let err = json::decode_objects(codec, r#"{"element": "nobody"}"#).unwrap_err();
    assert_eq!(
        object_error(&err),
        &ObjectError::UnknownElement(Id::from_name("nobody").unwrap())
    );
}

#[test]
fn unknown_constructor_in_declaration() {
    let (elements, constructors) = load(r#"{"id": 4, "constructor": "Nothing"}"#);
    let codec = SerializeContext::new(&elements, &constructors);
    let err = json::decode_objects(codec, r#"{"element": 4}"#).unwrap_err();
    assert!(matches!(
        object_error(&err),
        ObjectError::UnknownConstructor { element: Id(4), .. }
    ));
}

#[test]
fn missing_element_field() {
    let (elements, constructors) = load(SCENARIO_DECLARATIONS);
    let codec = SerializeContext::new(&elements, &constructors);
    let err = json::decode_objects(codec, r#"{"data": {"value": 1}}"#).unwrap_err();
    assert!(matches!(err, DocumentError::Malformed(_)), "{err}");

    let err = json::decode_objects(codec, r#"[{"element": 1}, {"data": {}}]"#).unwrap_err();
    assert!(matches!(err, DocumentError::Entry { index: 1, .. }), "{err}");
    assert!(matches!(err.root(), DocumentError::Malformed(_)));
}

#[test]
fn data_that_is_not_an_object() {
    let (elements, constructors) = load(SCENARIO_DECLARATIONS);
    let codec = SerializeContext::new(&elements, &constructors);
    let err = json::decode_objects(codec, r#"{"element": 1, "data": [1, 2]}"#).unwrap_err();
    assert!(matches!(err, DocumentError::Malformed(_)), "{err}");

    let err = json::decode_objects(codec, r#"[{"element": 1}, {"element": 1, "data": 5}]"#)
        .unwrap_err();
    assert!(matches!(err.root(), DocumentError::Malformed(_)), "{err}");
}

#[test]
fn framing_is_checked_before_anything_is_built() {
    let (elements, constructors) = load(SCENARIO_DECLARATIONS);
    let codec = SerializeContext::new(&elements, &constructors);
    // Entry 0 would fail to construct, but entry 1's framing fails first.
    let err = json::decode_objects(codec, r#"[{"element": 999}, {"element": true}]"#)
        .unwrap_err();
    assert!(matches!(err, DocumentError::Entry { index: 1, .. }), "{err}");
    assert!(matches!(err.root(), DocumentError::Malformed(_)));
}

#[test]
fn nested_inline_without_element_is_an_invalid_reference() {
    let (elements, constructors) = load(SCENARIO_DECLARATIONS);
    let codec = SerializeContext::new(&elements, &constructors);
    let err = json::decode_objects(codec, r#"{"element": 2, "data": {"abilities": [{"data": {}}]}}"#)
        .unwrap_err();
    assert!(matches!(object_error(&err), ObjectError::InvalidReference(_)));
}

#[test]
fn wrong_kind_in_save() {
    let (elements, constructors) = load(SCENARIO_DECLARATIONS);
    let codec = SerializeContext::new(&elements, &constructors);
    let err = json::decode_objects(codec, r#"{"element": 1, "data": {"value": "many"}}"#)
        .unwrap_err();
    assert!(matches!(object_error(&err), ObjectError::Data(_)));
}

#[test]
fn fractional_value_is_not_a_long() {
    let (elements, constructors) = load(SCENARIO_DECLARATIONS);
    let codec = SerializeContext::new(&elements, &constructors);
    let err = json::decode_objects(codec, r#"{"element": 1, "data": {"value": 1.5}}"#)
        .unwrap_err();
    assert!(matches!(object_error(&err), ObjectError::Data(_)));
}

#[test]
fn overlong_names() {
    let name = "q".repeat(97);
    let err = json::decode_elements(&format!(r#"{{"name": "{name}", "constructor": 1}}"#))
        .unwrap_err();
    assert!(matches!(err, DocumentError::Name(NameError::TooLong { len: 97 })));

    let (elements, constructors) = load(SCENARIO_DECLARATIONS);
    let codec = SerializeContext::new(&elements, &constructors);
    let err = json::decode_objects(codec, &format!(r#"{{"element": "{name}"}}"#)).unwrap_err();
    assert!(matches!(object_error(&err), ObjectError::Name(_)));

    // Exactly 96 is fine.
    assert!(Id::from_name(&"q".repeat(96)).is_ok());
}

#[test]
fn not_json_at_all() {
    assert!(matches!(
        json::decode_elements("elements: []"),
        Err(DocumentError::Json(_))
    ));
}

#[test]
fn empty_documents() {
    let (elements, constructors) = load("[]");
    assert!(elements.is_empty());
    let codec = SerializeContext::new(&elements, &constructors);
    let object = json::decode_objects(codec, "[]").unwrap();
    assert!(object.as_array().unwrap().is_empty());
    assert_eq!(json::encode_objects(codec, object.as_ref()).unwrap(), "[]");
}

#[test]
fn skip_policy_survives_every_kind_of_bad_entry() {
    let (elements, constructors) = load(SCENARIO_DECLARATIONS);
    let codec = SerializeContext::new(&elements, &constructors);
    let save = r#"[
        null,
        "text",
        {"element": 99},
        {"element": 1, "data": {"value": false}},
        {"element": true},
        {"element": 1, "data": {"value": 7}}
    ]"#;
    let object = json::decode_objects_with(codec, save, &DecodeOptions::skip_failures()).unwrap();
    let array = object.as_array().unwrap();
    assert_eq!(array.len(), 1);
    assert_eq!(array.iter_of::<TestAbility>().next().unwrap().value, 7);

    let err = json::decode_objects(codec, save).unwrap_err();
    assert!(matches!(err, DocumentError::Entry { index: 0, .. }));
}

#[test]
fn redeclaration_replaces_earlier_element() {
    let (elements, constructors) = load(
        r#"[
            {"id": 1, "constructor": 1, "data": {"name": "Old"}},
            {"id": 1, "constructor": 1, "data": {"name": "New"}}
        ]"#,
    );
    assert_eq!(elements.len(), 1);
    let codec = SerializeContext::new(&elements, &constructors);
    let object = json::decode_objects(codec, r#"{"element": 1}"#).unwrap();
    assert_eq!(object.downcast_ref::<TestAbility>().unwrap().name, "New");
}
