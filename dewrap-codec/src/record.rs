//! Record-level entry point
//!
//! A record is the top-level state or props object handed over by a
//! reactive system: a mapping, or a tracked object around one. Unwrapping
//! a record must produce a plain mapping.

use crate::strategy::WrapperStrategy;
use crate::traverse::{Traversal, UnwrapStats};
use dewrap_format::{DewrapError, Mapping, Result, Value};
use tracing::debug;

/// Unwrap a record into a plain mapping
///
/// Fails with [`DewrapError::ShapeMismatch`] when the unwrapped result is
/// not a mapping, e.g. a reference cell around a number at the top level.
pub fn unwrap_record<S: WrapperStrategy + ?Sized>(record: &Value, strategy: &S) -> Result<Mapping> {
    unwrap_record_with_stats(record, strategy).map(|(map, _)| map)
}

/// Unwrap a record and report traversal statistics
pub fn unwrap_record_with_stats<S: WrapperStrategy + ?Sized>(
    record: &Value,
    strategy: &S,
) -> Result<(Mapping, UnwrapStats)> {
    let mut traversal = Traversal::new(strategy);
    let unwrapped = traversal.visit(record);
    let stats = traversal.into_stats();

    debug!(
        nodes = stats.nodes_visited,
        wrappers = stats.wrappers.total(),
        max_layers = stats.max_layers,
        "unwrapped record"
    );

    match unwrapped {
        Value::Mapping(map) => Ok((map, stats)),
        other => Err(DewrapError::ShapeMismatch {
            found: other.type_name().to_string(),
        }),
    }
}
