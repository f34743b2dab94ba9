//! Input limits and configuration

use crate::error::{DewrapError, Result};

/// Limits applied while reading wrapped documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum bytes per JSON document or NDJSON line (default: 64 MiB, hard: 1 GiB)
    pub max_document_bytes: usize,
    /// Maximum records per run (default: 10,000,000)
    pub max_records: usize,
    /// Maximum pointer string length (default: 256, hard: 2048)
    pub max_pointer_length: usize,
    /// Maximum pointer depth (default: 16, hard: 64)
    pub max_pointer_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_document_bytes: 64 * 1024 * 1024,
            max_records: 10_000_000,
            max_pointer_length: 256,
            max_pointer_depth: 16,
        }
    }
}

impl Limits {
    /// Hard maximum limits that cannot be exceeded
    pub fn hard_maximums() -> Self {
        Self {
            max_document_bytes: 1024 * 1024 * 1024,
            max_records: usize::MAX,
            max_pointer_length: 2048,
            max_pointer_depth: 64,
        }
    }

    /// Validate limits against hard maximums
    pub fn validate(&self) -> Result<()> {
        let hard = Self::hard_maximums();

        if self.max_document_bytes == 0 || self.max_document_bytes > hard.max_document_bytes {
            return Err(DewrapError::ConfigurationExceedsHardLimits {
                reason: format!(
                    "max_document_bytes {} must be between 1 and {}",
                    self.max_document_bytes, hard.max_document_bytes
                ),
            });
        }

        if self.max_pointer_length > hard.max_pointer_length {
            return Err(DewrapError::ConfigurationExceedsHardLimits {
                reason: format!(
                    "max_pointer_length {} exceeds hard limit {}",
                    self.max_pointer_length, hard.max_pointer_length
                ),
            });
        }

        if self.max_pointer_depth > hard.max_pointer_depth {
            return Err(DewrapError::ConfigurationExceedsHardLimits {
                reason: format!(
                    "max_pointer_depth {} exceeds hard limit {}",
                    self.max_pointer_depth, hard.max_pointer_depth
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_within_hard_max() {
        assert!(Limits::default().validate().is_ok());
    }

    #[test]
    fn pointer_depth_over_hard_max_rejected() {
        let limits = Limits {
            max_pointer_depth: 65,
            ..Limits::default()
        };
        let err = limits.validate().unwrap_err();
        assert!(err.to_string().contains("max_pointer_depth"));
    }

    #[test]
    fn zero_document_bytes_rejected() {
        let limits = Limits {
            max_document_bytes: 0,
            ..Limits::default()
        };
        assert!(matches!(
            limits.validate(),
            Err(DewrapError::ConfigurationExceedsHardLimits { .. })
        ));
    }
}
