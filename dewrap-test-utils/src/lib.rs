//! dewrap Test Utilities
//!
//! Shared builders, fixtures and proptest strategies for the dewrap crates.

use dewrap_format::{Mapping, Opaque, Value, Wrapper, WrapperKind};

pub mod strategies;

/// Builder for state records with optional wrappers around each field
pub struct StateBuilder {
    fields: Mapping,
}

impl StateBuilder {
    /// Create a new state builder
    pub fn new() -> Self {
        Self {
            fields: Mapping::new(),
        }
    }

    /// Add a plain field
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Add a field held in a reference cell
    pub fn reference(self, key: &str, value: impl Into<Value>) -> Self {
        self.field(key, Wrapper::reference(value))
    }

    /// Add a field held in a tracked mutable object
    pub fn reactive(self, key: &str, value: impl Into<Value>) -> Self {
        self.field(key, Wrapper::reactive(value))
    }

    /// Add a field held behind an interception proxy
    pub fn proxy(self, key: &str, value: impl Into<Value>) -> Self {
        self.field(key, Wrapper::proxy(value))
    }

    /// Add an opaque class instance
    pub fn opaque(self, key: &str, class: &str, data: impl Into<Value>) -> Self {
        self.field(key, Opaque::new(class, data))
    }

    /// Add a null field
    pub fn null(self, key: &str) -> Self {
        self.field(key, Value::Null)
    }

    /// Build the record as a mapping value
    pub fn build(self) -> Value {
        Value::Mapping(self.fields)
    }

    /// Build the record as a tracked object around the mapping
    pub fn build_reactive(self) -> Value {
        Value::Wrapped(Wrapper::reactive(self.build()))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap `value` in `layers` wrappers, cycling through `kinds` from the inside out
pub fn wrap_layers(value: impl Into<Value>, kinds: &[WrapperKind], layers: usize) -> Value {
    let mut current = value.into();
    if kinds.is_empty() {
        return current;
    }
    for layer in 0..layers {
        current = Value::Wrapped(Wrapper::new(kinds[layer % kinds.len()], current));
    }
    current
}

/// Canned fixtures shaped like UI state trees
pub struct StateFixtures;

impl StateFixtures {
    /// Component props with every wrapper kind at different depths
    pub fn component_props() -> Value {
        StateBuilder::new()
            .reference("count", 3i64)
            .reactive(
                "user",
                StateBuilder::new()
                    .field("name", "Ada")
                    .reference("email", "ada@example.com")
                    .build(),
            )
            .field(
                "items",
                Value::Sequence(vec![
                    Value::from("a"),
                    Wrapper::proxy("b").into(),
                    Value::from("c"),
                ]),
            )
            .opaque("created", "Date", "2024-05-01T00:00:00Z")
            .null("selection")
            .build()
    }

    /// Expected plain form of [`StateFixtures::component_props`]
    pub fn component_props_plain() -> Value {
        StateBuilder::new()
            .field("count", 3i64)
            .field(
                "user",
                StateBuilder::new()
                    .field("name", "Ada")
                    .field("email", "ada@example.com")
                    .build(),
            )
            .field(
                "items",
                Value::Sequence(vec![Value::from("a"), Value::from("b"), Value::from("c")]),
            )
            .opaque("created", "Date", "2024-05-01T00:00:00Z")
            .null("selection")
            .build()
    }

    /// A wide record of `fields` reactive counters, for throughput tests
    pub fn wide_record(fields: usize) -> Value {
        let mut builder = StateBuilder::new();
        for i in 0..fields {
            builder = builder.reference(&format!("field_{}", i), i as i64);
        }
        builder.build_reactive()
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use dewrap_format::{encode, Value};

    /// Assert that two values are equal, printing both as envelope JSON on failure
    pub fn assert_value_equal(actual: &Value, expected: &Value, context: &str) {
        if actual != expected {
            panic!(
                "Value assertion failed in {}:\nExpected: {}\nActual: {}",
                context,
                serde_json::to_string_pretty(&encode(expected)).unwrap_or_default(),
                serde_json::to_string_pretty(&encode(actual)).unwrap_or_default()
            );
        }
    }

    /// Assert that a value holds no wrapper in its traversable structure
    pub fn assert_plain(value: &Value, context: &str) {
        if let Some(path) = value.find_wrapper() {
            panic!("{}: wrapper left at '{}'", context, path);
        }
    }
}
