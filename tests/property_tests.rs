//! Property-based tests for the wire codec.
//!
//! Round trips over generated scalars, vectors and map trees, plus the
//! guarantee that no proper prefix of a valid stream decodes.

use polyvalue::{
    deserialize, equals, from_slice, to_vec, Complex32, Complex64, Error, Value, ValueMap,
};
use proptest::prelude::*;

fn round_trips(value: &Value) -> bool {
    match to_vec(value) {
        Ok(bytes) => match from_slice(&bytes) {
            Ok(back) => back == *value,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

fn float_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<f32>().prop_map(Value::from),
        any::<f64>().prop_map(Value::from),
        (any::<f32>(), any::<f32>()).prop_map(|(re, im)| Value::from(Complex32::new(re, im))),
        (any::<f64>(), any::<f64>()).prop_map(|(re, im)| Value::from(Complex64::new(re, im))),
    ]
}

fn integer_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i8>().prop_map(Value::from),
        any::<i16>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<u8>().prop_map(Value::from),
        any::<u16>().prop_map(Value::from),
        any::<u32>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
    ]
}

fn vector_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::collection::vec(any::<f32>(), 0..8).prop_map(Value::from),
        prop::collection::vec(any::<i64>(), 0..8).prop_map(Value::from),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Value::from),
        prop::collection::vec((any::<f64>(), any::<f64>()), 0..4).prop_map(|pairs| {
            Value::from(
                pairs
                    .into_iter()
                    .map(|(re, im)| Complex64::new(re, im))
                    .collect::<Vec<_>>(),
            )
        }),
    ]
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![float_leaf(), integer_leaf(), vector_leaf()]
}

fn tree() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 48, 6, |inner| {
        prop::collection::vec(("[a-z]{0,6}", inner), 0..6).prop_map(|entries| {
            let map: ValueMap = entries.into_iter().collect();
            Value::from(map)
        })
    })
}

proptest! {
    #[test]
    fn prop_leaf_round_trip(value in leaf()) {
        prop_assert!(round_trips(&value));
    }

    #[test]
    fn prop_tree_round_trip(value in tree()) {
        prop_assert!(round_trips(&value));
    }

    #[test]
    fn prop_every_prefix_is_truncated(value in tree()) {
        let bytes = to_vec(&value).unwrap();
        for cut in 0..bytes.len() {
            let from_buffer = from_slice(&bytes[..cut]);
            prop_assert!(
                matches!(from_buffer, Err(Error::StreamTruncated { .. })),
                "slice cut at {}: {:?}", cut, from_buffer
            );
            let from_reader = deserialize(&bytes[..cut]);
            prop_assert!(
                matches!(from_reader, Err(Error::StreamTruncated { .. })),
                "reader cut at {}: {:?}", cut, from_reader
            );
        }
    }

    #[test]
    fn prop_i32_vector_equals_native(v in prop::collection::vec(any::<i32>(), 0..20)) {
        let value = Value::from(v.clone());
        prop_assert!(equals(&value, &v).unwrap());
        let widened: Vec<i64> = v.iter().map(|&x| i64::from(x)).collect();
        prop_assert!(!equals(&value, &widened).unwrap());
    }

    #[test]
    fn prop_decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = from_slice(&bytes);
        let _ = deserialize(&bytes[..]);
    }

    #[test]
    fn prop_format_is_stable_across_round_trip(value in tree()) {
        let back = from_slice(&to_vec(&value).unwrap()).unwrap();
        prop_assert_eq!(polyvalue::format(&value), polyvalue::format(&back));
    }
}
