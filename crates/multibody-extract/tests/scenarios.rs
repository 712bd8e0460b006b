//! End-to-end resolution scenarios.
//!
//! Each test builds a request context the way the body buffer stage leaves
//! it and resolves a handler's declared parameters against it.

use multibody_extract::{
    BodyTarget, CoercionPolicy, ErrorClass, ExtractionContext, ExtractionContextBuilder,
    ExtractionErrorKind, HandlerBindings, MultiBodyResolver, ParameterBinding, ResolverOptions,
};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
struct Point {
    x: i32,
}

impl BodyTarget for Point {}

fn json_request(body: &'static str) -> ExtractionContext {
    ExtractionContextBuilder::new()
        .uri(http::Uri::from_static("/shapes"))
        .header("content-type", "application/json")
        .body(body)
        .build()
}

#[test]
fn test_resolves_object_and_long_from_one_body() {
    let bindings = HandlerBindings::builder("draw")
        .param(ParameterBinding::of::<Point>("a"))
        .param(ParameterBinding::of::<i64>("b"))
        .build();
    let ctx = json_request(r#"{"a":{"x":1},"b":5}"#);
    let resolver = MultiBodyResolver::default();

    let a: Option<Point> = resolver.resolve(&ctx, bindings.get("a").unwrap()).unwrap();
    let b: Option<i64> = resolver.resolve(&ctx, bindings.get("b").unwrap()).unwrap();

    assert_eq!(a, Some(Point { x: 1 }));
    assert_eq!(b, Some(5_i64));
}

#[test]
fn test_missing_required_key_names_the_key() {
    let binding = ParameterBinding::of::<Point>("c");
    let err = MultiBodyResolver::default()
        .resolve::<Point>(&json_request("{}"), &binding)
        .unwrap_err();

    assert_eq!(err.kind(), ExtractionErrorKind::MissingRequired);
    assert_eq!(err.key(), Some("c"));
    assert_eq!(err.to_string(), "argument invalid: c is null");
}

#[test]
fn test_truncated_body_fails_every_parameter_structurally() {
    let bindings = HandlerBindings::builder("update")
        .param(ParameterBinding::of::<String>("d"))
        .param(ParameterBinding::of::<i32>("n").optional())
        .build();
    let ctx = json_request(r#"{"d":"not-json<<"#);

    let outcomes = MultiBodyResolver::default().resolve_all(&ctx, &bindings);

    assert_eq!(outcomes.len(), 2);
    for outcome in &outcomes {
        let err = outcome.as_ref().unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::StructuralDecode);
        assert_eq!(err.class(), ErrorClass::MediaTypeOrBody);
        assert!(err.to_string().contains("update(d: String, n: i32)"));
    }
}

#[test]
fn test_array_for_scalar_integer_is_type_mismatch() {
    let binding = ParameterBinding::of::<i32>("e");
    let err = MultiBodyResolver::default()
        .resolve::<i32>(&json_request(r#"{"e":[1,2,3]}"#), &binding)
        .unwrap_err();

    assert_eq!(err.kind(), ExtractionErrorKind::TypeMismatch);
    assert_eq!(err.key(), Some("e"));
    assert_eq!(err.attempted_value(), Some("[1,2,3]"));
}

#[test]
fn test_numeric_string_is_rejected_by_default() {
    let binding = ParameterBinding::of::<i32>("f").optional();
    let err = MultiBodyResolver::default()
        .resolve::<i32>(&json_request(r#"{"f":"42"}"#), &binding)
        .unwrap_err();

    assert_eq!(err.kind(), ExtractionErrorKind::TypeMismatch);
    assert_eq!(err.attempted_value(), Some("\"42\""));
    assert_eq!(err.target(), Some("int"));
}

#[test]
fn test_numeric_string_is_accepted_when_enabled() {
    let resolver = MultiBodyResolver::new(ResolverOptions {
        policy: CoercionPolicy::default().numeric_strings(true),
        ..ResolverOptions::default()
    });
    let binding = ParameterBinding::of::<i32>("f").optional();

    let f = resolver
        .resolve::<i32>(&json_request(r#"{"f":"42"}"#), &binding)
        .unwrap();
    assert_eq!(f, Some(42));
}

#[test]
fn test_absent_optional_resolves_to_none() {
    let binding = ParameterBinding::of::<Point>("p").optional();
    let p = MultiBodyResolver::default()
        .resolve::<Point>(&json_request(r#"{"p":null}"#), &binding)
        .unwrap();
    assert!(p.is_none());
}

#[test]
fn test_empty_body_is_an_empty_map() {
    let bindings = HandlerBindings::builder("h")
        .param(ParameterBinding::of::<i32>("a"))
        .param(ParameterBinding::of::<i32>("b").optional())
        .build();

    let outcomes = MultiBodyResolver::default().resolve_all(&json_request(""), &bindings);

    assert_eq!(outcomes[0].as_ref().unwrap_err().kind(), ExtractionErrorKind::MissingRequired);
    assert!(outcomes[1].as_ref().unwrap().is_null());
}

#[test]
fn test_float_beyond_f32_range_resolves_clamped() {
    let ctx = json_request(r#"{"f":1e39,"g":-1e39}"#);
    let resolver = MultiBodyResolver::default();

    let f: Option<f32> = resolver.resolve(&ctx, &ParameterBinding::of::<f32>("f")).unwrap();
    let g: Option<f32> = resolver.resolve(&ctx, &ParameterBinding::of::<f32>("g")).unwrap();

    assert_eq!(f, Some(f32::MAX));
    assert_eq!(g, Some(f32::MIN));
}

#[test]
fn test_number_beyond_f64_range_does_not_fail_siblings() {
    let ctx = json_request(r#"{"f":1e400,"g":1,"p":{"x":1e400}}"#);
    let resolver = MultiBodyResolver::default();

    let f: Option<f64> = resolver.resolve(&ctx, &ParameterBinding::of::<f64>("f")).unwrap();
    let g: Option<i32> = resolver.resolve(&ctx, &ParameterBinding::of::<i32>("g")).unwrap();
    assert_eq!(f, Some(f64::MAX));
    assert_eq!(g, Some(1));

    let err = resolver
        .resolve::<Point>(&ctx, &ParameterBinding::of::<Point>("p"))
        .unwrap_err();
    assert_eq!(err.kind(), ExtractionErrorKind::TypeMismatch);
    assert_eq!(err.key(), Some("p"));
}
