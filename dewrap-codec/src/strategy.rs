//! Wrapper classification strategies
//!
//! The traversal never decides on its own what counts as a wrapper. A
//! [`WrapperStrategy`] supplies the `is_wrapped` predicate and the
//! `unwrap_once` step, so foreign reactivity models can be plugged in.

use dewrap_format::{Value, WrapperKind};

/// Predicate / unwrap pair consulted by the traversal
pub trait WrapperStrategy {
    /// True when `value` should be unwrapped before anything else
    fn is_wrapped(&self, value: &Value) -> bool;

    /// Strip exactly one layer from a value for which `is_wrapped` returned true
    fn unwrap_once(&self, value: &Value) -> Value;

    /// Kind to attribute an unwrap to in statistics, if it has one
    fn kind_of(&self, value: &Value) -> Option<WrapperKind> {
        value.as_wrapper().map(|w| w.kind())
    }

    /// Strip one layer and pass the inner value to `visit` by reference
    ///
    /// The default goes through [`WrapperStrategy::unwrap_once`]. Strategies
    /// that can lend the inner value override it to skip the copy.
    fn visit_unwrapped(&self, value: &Value, visit: &mut dyn FnMut(&Value) -> Value) -> Value {
        visit(&self.unwrap_once(value))
    }
}

impl<S: WrapperStrategy + ?Sized> WrapperStrategy for &S {
    fn is_wrapped(&self, value: &Value) -> bool {
        (**self).is_wrapped(value)
    }

    fn unwrap_once(&self, value: &Value) -> Value {
        (**self).unwrap_once(value)
    }

    fn kind_of(&self, value: &Value) -> Option<WrapperKind> {
        (**self).kind_of(value)
    }

    fn visit_unwrapped(&self, value: &Value, visit: &mut dyn FnMut(&Value) -> Value) -> Value {
        (**self).visit_unwrapped(value, visit)
    }
}

/// Classifies every [`Value::Wrapped`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinStrategy;

impl WrapperStrategy for BuiltinStrategy {
    fn is_wrapped(&self, value: &Value) -> bool {
        matches!(value, Value::Wrapped(_))
    }

    fn unwrap_once(&self, value: &Value) -> Value {
        match value {
            Value::Wrapped(wrapper) => wrapper.get(),
            other => other.clone(),
        }
    }

    fn visit_unwrapped(&self, value: &Value, visit: &mut dyn FnMut(&Value) -> Value) -> Value {
        match value {
            Value::Wrapped(wrapper) => wrapper.with(|inner| visit(inner)),
            other => visit(other),
        }
    }
}

/// Classifies only wrappers of the selected kinds
///
/// Wrappers of any other kind are left alone and come back unchanged, the
/// same as any other value the traversal cannot classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindFilter {
    kinds: Vec<WrapperKind>,
}

impl KindFilter {
    /// Filter accepting `kinds`
    pub fn new(kinds: impl IntoIterator<Item = WrapperKind>) -> Self {
        let mut kinds: Vec<WrapperKind> = kinds.into_iter().collect();
        kinds.sort();
        kinds.dedup();
        Self { kinds }
    }

    /// Accepted kinds, sorted
    pub fn kinds(&self) -> &[WrapperKind] {
        &self.kinds
    }

    fn accepts(&self, kind: WrapperKind) -> bool {
        self.kinds.contains(&kind)
    }
}

impl WrapperStrategy for KindFilter {
    fn is_wrapped(&self, value: &Value) -> bool {
        match value {
            Value::Wrapped(wrapper) => self.accepts(wrapper.kind()),
            _ => false,
        }
    }

    fn unwrap_once(&self, value: &Value) -> Value {
        BuiltinStrategy.unwrap_once(value)
    }

    fn visit_unwrapped(&self, value: &Value, visit: &mut dyn FnMut(&Value) -> Value) -> Value {
        BuiltinStrategy.visit_unwrapped(value, visit)
    }
}

/// Strategy assembled from two closures
pub struct FnStrategy<P, U> {
    is_wrapped: P,
    unwrap_once: U,
}

impl<P, U> FnStrategy<P, U>
where
    P: Fn(&Value) -> bool,
    U: Fn(&Value) -> Value,
{
    /// Build a strategy from an `is_wrapped` predicate and an `unwrap_once` step
    pub fn new(is_wrapped: P, unwrap_once: U) -> Self {
        Self {
            is_wrapped,
            unwrap_once,
        }
    }
}

impl<P, U> WrapperStrategy for FnStrategy<P, U>
where
    P: Fn(&Value) -> bool,
    U: Fn(&Value) -> Value,
{
    fn is_wrapped(&self, value: &Value) -> bool {
        (self.is_wrapped)(value)
    }

    fn unwrap_once(&self, value: &Value) -> Value {
        (self.unwrap_once)(value)
    }
}
