//! proptest strategies for wrapped and plain value trees
//!
//! The paired strategies generate a wrapped tree together with the plain
//! tree it must unwrap to, so properties can be checked without an oracle.

use dewrap_format::{Mapping, Opaque, Value, Wrapper, WrapperKind};
use proptest::prelude::*;

/// Any wrapper kind
pub fn wrapper_kind() -> impl Strategy<Value = WrapperKind> {
    prop::sample::select(WrapperKind::ALL.to_vec())
}

/// A primitive value
pub fn primitive() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e9f64..1.0e9f64).prop_map(Value::from),
        "[a-zA-Z0-9 _-]{0,12}".prop_map(Value::from),
    ]
}

fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

/// A wrapper-free value tree (opaque leaves included)
pub fn plain_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        4 => primitive(),
        1 => ("[A-Z][a-z]{2,6}", primitive()).prop_map(|(class, data)| Value::from(Opaque::new(class, data))),
    ];
    leaf.prop_recursive(5, 64, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Sequence),
            prop::collection::btree_map(field_name(), inner, 0..5)
                .prop_map(|m: Mapping| Value::Mapping(m)),
        ]
    })
}

/// A wrapper-free mapping
pub fn plain_record() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(field_name(), plain_value(), 0..6)
        .prop_map(|m: Mapping| Value::Mapping(m))
}

/// Wrap `value` in the given kinds, innermost first
pub fn apply_layers(value: Value, kinds: &[WrapperKind]) -> Value {
    kinds
        .iter()
        .fold(value, |acc, kind| Value::Wrapped(Wrapper::new(*kind, acc)))
}

fn layers() -> impl Strategy<Value = Vec<WrapperKind>> {
    prop_oneof![
        2 => Just(Vec::new()),
        1 => prop::collection::vec(wrapper_kind(), 1..4),
    ]
}

/// A `(wrapped, plain)` pair: `plain` is `wrapped` with every wrapper collapsed
pub fn wrapped_pair() -> impl Strategy<Value = (Value, Value)> {
    let leaf = (primitive(), layers()).prop_map(|(plain, kinds)| (apply_layers(plain.clone(), &kinds), plain));
    leaf.prop_recursive(5, 64, 5, |inner| {
        prop_oneof![
            (prop::collection::vec(inner.clone(), 0..5), layers()).prop_map(|(items, kinds)| {
                let (wrapped, plain): (Vec<_>, Vec<_>) = items.into_iter().unzip();
                (
                    apply_layers(Value::Sequence(wrapped), &kinds),
                    Value::Sequence(plain),
                )
            }),
            (prop::collection::btree_map(field_name(), inner, 0..5), layers()).prop_map(
                |(entries, kinds)| {
                    let mut wrapped = Mapping::new();
                    let mut plain = Mapping::new();
                    for (key, (w, p)) in entries {
                        wrapped.insert(key.clone(), w);
                        plain.insert(key, p);
                    }
                    (
                        apply_layers(Value::Mapping(wrapped), &kinds),
                        Value::Mapping(plain),
                    )
                }
            ),
        ]
    })
}

/// A `(wrapped, plain)` pair whose plain side is a mapping
pub fn wrapped_record_pair() -> impl Strategy<Value = (Value, Value)> {
    (prop::collection::btree_map(field_name(), wrapped_pair(), 0..6), layers()).prop_map(
        |(entries, kinds)| {
            let mut wrapped = Mapping::new();
            let mut plain = Mapping::new();
            for (key, (w, p)) in entries {
                wrapped.insert(key.clone(), w);
                plain.insert(key, p);
            }
            (
                apply_layers(Value::Mapping(wrapped), &kinds),
                Value::Mapping(plain),
            )
        },
    )
}
