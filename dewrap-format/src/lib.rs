//! dewrap Format - Value model and wire primitives
//!
//! This crate provides the data model shared by every dewrap crate, with no
//! I/O dependencies. It includes:
//!
//! - The [`Value`] tree with wrappers and opaque instances
//! - Wrapper and value kind tags
//! - The JSON envelope codec
//! - JSON Pointer token escaping
//! - Error types
//! - Input limits

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod envelope;
pub mod error;
pub mod limits;
pub mod path;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use envelope::{decode, encode, mapping_to_plain_json, to_plain_json};
pub use error::{DewrapError, Result};
pub use limits::Limits;
pub use types::{ValueKind, WrapperKind};
pub use value::{Mapping, Opaque, Value, Wrapper};
