//! Non-destructive survey of a wrapped value tree

use crate::traverse::WrapperCounts;
use dewrap_format::{Value, ValueKind};
use std::collections::BTreeMap;

/// What a value tree contains
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Census {
    /// Number of values of each kind, wrappers included
    pub kinds: BTreeMap<ValueKind, usize>,
    /// Wrappers seen, by kind
    pub wrappers: WrapperCounts,
    /// Opaque instances seen, by class name
    pub opaque_classes: BTreeMap<String, usize>,
    /// Deepest container nesting, wrappers not counted
    pub max_depth: usize,
    /// Longest chain of directly nested wrappers
    pub max_layers: usize,
}

impl Census {
    /// Total number of values counted
    pub fn total_values(&self) -> usize {
        self.kinds.values().sum()
    }

    /// Fold another census into this one
    pub fn merge(&mut self, other: &Census) {
        for (kind, count) in &other.kinds {
            *self.kinds.entry(*kind).or_insert(0) += count;
        }
        self.wrappers += other.wrappers;
        for (class, count) in &other.opaque_classes {
            *self.opaque_classes.entry(class.clone()).or_insert(0) += count;
        }
        self.max_depth = self.max_depth.max(other.max_depth);
        self.max_layers = self.max_layers.max(other.max_layers);
    }
}

/// Survey `value`, looking through every wrapper
///
/// Like the traversal this assumes acyclic input.
pub fn census(value: &Value) -> Census {
    let mut out = Census::default();
    survey(value, 0, 0, &mut out);
    out
}

fn survey(value: &Value, depth: usize, layers: usize, out: &mut Census) {
    *out.kinds.entry(value.kind()).or_insert(0) += 1;

    if let Value::Wrapped(wrapper) = value {
        out.wrappers.record(Some(wrapper.kind()));
        wrapper.with(|inner| survey(inner, depth, layers + 1, out));
        return;
    }

    out.max_layers = out.max_layers.max(layers);
    out.max_depth = out.max_depth.max(depth);

    match value {
        Value::Sequence(items) => {
            for item in items {
                survey(item, depth + 1, 0, out);
            }
        }
        Value::Mapping(map) => {
            for item in map.values() {
                survey(item, depth + 1, 0, out);
            }
        }
        Value::Opaque(opaque) => {
            *out.opaque_classes.entry(opaque.class().to_string()).or_insert(0) += 1;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dewrap_format::{Mapping, Opaque, Wrapper, WrapperKind};

    #[test]
    fn counts_kinds_wrappers_and_classes() {
        let mut map = Mapping::new();
        map.insert("a".to_string(), Wrapper::reference(Wrapper::proxy(1i64)).into());
        map.insert(
            "b".to_string(),
            Value::Sequence(vec![Opaque::new("Date", 0i64).into(), Value::Null]),
        );
        let value: Value = Wrapper::reactive(map).into();

        let report = census(&value);
        assert_eq!(report.wrappers.get(WrapperKind::Ref), 1);
        assert_eq!(report.wrappers.get(WrapperKind::Proxy), 1);
        assert_eq!(report.wrappers.get(WrapperKind::Reactive), 1);
        assert_eq!(report.kinds[&ValueKind::Wrapped], 3);
        assert_eq!(report.kinds[&ValueKind::Opaque], 1);
        assert_eq!(report.opaque_classes["Date"], 1);
        assert_eq!(report.max_layers, 2);
        assert_eq!(report.max_depth, 2);
        // reactive, mapping, ref, proxy, 1, sequence, opaque, null
        assert_eq!(report.total_values(), 8);
    }

    #[test]
    fn census_of_primitive() {
        let report = census(&Value::from("x"));
        assert_eq!(report.total_values(), 1);
        assert_eq!(report.max_depth, 0);
        assert_eq!(report.wrappers.total(), 0);
    }

    #[test]
    fn merge_adds_counts() {
        let mut a = census(&Wrapper::reference(1i64).into());
        let b = census(&Value::Sequence(vec![Wrapper::reference(2i64).into()]));
        a.merge(&b);
        assert_eq!(a.wrappers.refs, 2);
        assert_eq!(a.kinds[&ValueKind::Number], 2);
        assert_eq!(a.max_depth, 1);
    }
}
