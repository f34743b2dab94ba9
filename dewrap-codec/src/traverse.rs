//! Deep unwrap traversal
//!
//! Walks a value depth-first and returns a fresh copy in which every value
//! the strategy classifies as wrapped has been replaced by its recursively
//! unwrapped content. Dispatch order is fixed: wrapper, then sequence, then
//! mapping, then everything else unchanged. A wrapped sequence is therefore
//! unwrapped before it is treated as a sequence.
//!
//! # Cycles
//!
//! There is no visited set. A value that transitively contains itself (for
//! instance a wrapper whose slot was `set` to a structure holding the same
//! wrapper) recurses until the stack is exhausted. Shared, non-cyclic
//! references are copied once per occurrence.

use crate::strategy::WrapperStrategy;
use dewrap_format::{Value, WrapperKind};
use std::ops::AddAssign;

/// Unwrap every wrapper in `value`
///
/// The input is never mutated; opaque instances are returned as-is.
pub fn deep_unwrap<S: WrapperStrategy + ?Sized>(value: &Value, strategy: &S) -> Value {
    Traversal::new(strategy).visit(value)
}

/// Number of wrappers collapsed, by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WrapperCounts {
    /// Reference cells
    pub refs: usize,
    /// Tracked mutable objects
    pub reactive: usize,
    /// Interception proxies
    pub proxies: usize,
    /// Wrappers classified by a custom strategy without a kind
    pub custom: usize,
}

impl WrapperCounts {
    /// Count one wrapper of `kind`
    pub fn record(&mut self, kind: Option<WrapperKind>) {
        match kind {
            Some(WrapperKind::Ref) => self.refs += 1,
            Some(WrapperKind::Reactive) => self.reactive += 1,
            Some(WrapperKind::Proxy) => self.proxies += 1,
            None => self.custom += 1,
        }
    }

    /// Count for a given kind
    pub fn get(&self, kind: WrapperKind) -> usize {
        match kind {
            WrapperKind::Ref => self.refs,
            WrapperKind::Reactive => self.reactive,
            WrapperKind::Proxy => self.proxies,
        }
    }

    /// Total across all kinds
    pub fn total(&self) -> usize {
        self.refs + self.reactive + self.proxies + self.custom
    }
}

impl AddAssign for WrapperCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.refs += rhs.refs;
        self.reactive += rhs.reactive;
        self.proxies += rhs.proxies;
        self.custom += rhs.custom;
    }
}

/// Statistics gathered during a traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnwrapStats {
    /// Values visited, wrappers included
    pub nodes_visited: usize,
    /// Wrappers collapsed
    pub wrappers: WrapperCounts,
    /// Longest chain of directly nested wrappers collapsed
    pub max_layers: usize,
}

impl UnwrapStats {
    /// Fold another traversal's statistics into these
    pub fn merge(&mut self, other: &UnwrapStats) {
        self.nodes_visited += other.nodes_visited;
        self.wrappers += other.wrappers;
        self.max_layers = self.max_layers.max(other.max_layers);
    }
}

/// A traversal bound to a strategy, accumulating [`UnwrapStats`]
///
/// One `Traversal` may visit several values; its statistics accumulate.
pub struct Traversal<'s, S: WrapperStrategy + ?Sized> {
    strategy: &'s S,
    stats: UnwrapStats,
}

impl<'s, S: WrapperStrategy + ?Sized> Traversal<'s, S> {
    /// Create a traversal using `strategy`
    pub fn new(strategy: &'s S) -> Self {
        Self {
            strategy,
            stats: UnwrapStats::default(),
        }
    }

    /// Produce the unwrapped copy of `value`
    pub fn visit(&mut self, value: &Value) -> Value {
        self.visit_layer(value, 0)
    }

    /// Statistics so far
    pub fn stats(&self) -> &UnwrapStats {
        &self.stats
    }

    /// Consume the traversal, returning its statistics
    pub fn into_stats(self) -> UnwrapStats {
        self.stats
    }

    fn visit_layer(&mut self, value: &Value, layers: usize) -> Value {
        self.stats.nodes_visited += 1;

        if self.strategy.is_wrapped(value) {
            self.stats.wrappers.record(self.strategy.kind_of(value));
            let strategy = self.strategy;
            return strategy
                .visit_unwrapped(value, &mut |inner| self.visit_layer(inner, layers + 1));
        }

        self.stats.max_layers = self.stats.max_layers.max(layers);

        match value {
            Value::Sequence(items) => {
                Value::Sequence(items.iter().map(|item| self.visit_layer(item, 0)).collect())
            }
            Value::Mapping(map) => Value::Mapping(
                map.iter()
                    .map(|(key, item)| (key.clone(), self.visit_layer(item, 0)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}
