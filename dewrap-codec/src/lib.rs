//! dewrap Codec - Deep unwrap engine
//!
//! This crate provides the traversal that turns a tree of wrapped reactive
//! values into plain data:
//!
//! - Wrapper classification strategies (built-in, kind filter, closures)
//! - The depth-first deep unwrap traversal with statistics
//! - The record-level entry point with its shape check
//! - A census of what a wrapped tree contains

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod census;
pub mod record;
pub mod strategy;
pub mod traverse;

// Re-export commonly used types
pub use dewrap_format::{DewrapError, Limits, Mapping, Result, Value, Wrapper, WrapperKind};

// Re-export our own types
pub use census::{census, Census};
pub use record::{unwrap_record, unwrap_record_with_stats};
pub use strategy::{BuiltinStrategy, FnStrategy, KindFilter, WrapperStrategy};
pub use traverse::{deep_unwrap, Traversal, UnwrapStats, WrapperCounts};
