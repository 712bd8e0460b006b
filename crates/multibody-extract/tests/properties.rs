//! Property tests for the buffer, map and coercion laws.

use multibody_extract::{
    extract, BodyMap, Charset, CoercionPolicy, ParameterBinding, PrimitiveKind, ReplayableBody,
    TargetShape,
};
use proptest::prelude::*;
use serde_json::{Map, Value};
use std::io::Read;

// Strategy: JSON leaves and shallow arrays
fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[ -~]{0,12}".prop_map(Value::from),
        prop::collection::vec(any::<i32>(), 0..4).prop_map(Value::from),
    ]
}

fn arb_object() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-z]{1,8}", arb_value(), 1..8)
        .prop_map(|entries| entries.into_iter().collect())
}

proptest! {
    /// Decode, serialize and decode again gives the same shallow map.
    #[test]
    fn proptest_map_round_trip(object in arb_object()) {
        let text = Value::Object(object).to_string();
        let first = BodyMap::decode(text.as_bytes(), Charset::Utf8).unwrap();
        let second = BodyMap::decode(first.to_json_string().as_bytes(), Charset::Utf8).unwrap();

        prop_assert_eq!(first.keys().collect::<Vec<_>>(), second.keys().collect::<Vec<_>>());
        prop_assert_eq!(first, second);
    }

    /// Every open of the buffer sees the full captured bytes.
    #[test]
    fn proptest_buffer_replay(
        bytes in prop::collection::vec(any::<u8>(), 0..512),
        opens in 1usize..8,
        partial in 0usize..64,
    ) {
        let body = ReplayableBody::capture(bytes.as_slice(), 1024).unwrap();

        // A half-consumed reader must not disturb later ones
        let mut head = vec![0u8; partial.min(bytes.len())];
        body.open().read_exact(&mut head).unwrap();

        for _ in 0..opens {
            let mut out = Vec::new();
            body.open().read_to_end(&mut out).unwrap();
            prop_assert_eq!(&out, &bytes);
        }
    }

    /// Any JSON number coerces to an integer target by truncation.
    #[test]
    fn proptest_numbers_coerce_to_int(f in -1.0e9f64..1.0e9) {
        let coerced = CoercionPolicy::default()
            .coerce(&Value::from(f), PrimitiveKind::Int)
            .unwrap();
        prop_assert_eq!(coerced, Value::from(f as i64 as i32));
    }

    /// Any finite JSON number coerces to a float target, clamped to the
    /// f32 range.
    #[test]
    fn proptest_numbers_coerce_to_float(f in -1.0e300f64..1.0e300) {
        let coerced = CoercionPolicy::default()
            .coerce(&Value::from(f), PrimitiveKind::Float)
            .unwrap();
        let expected = f.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32;
        prop_assert_eq!(coerced, Value::from(expected));
    }

    /// A value that already has the target's exact shape is returned as is.
    #[test]
    fn proptest_identity_for_matching_shapes(object in arb_object()) {
        let map = BodyMap::from(object.clone());
        for (key, value) in &object {
            if value.is_null() {
                continue;
            }
            let binding = ParameterBinding::new(key.clone(), TargetShape::Opaque);
            prop_assert_eq!(&extract(&map, &binding, &CoercionPolicy::default()).unwrap(), value);
        }
    }
}
