//! Wrapper and value kind tags

use crate::constants::{MARKER_PROXY, MARKER_REACTIVE, MARKER_REF};
use std::fmt;
use std::str::FromStr;

/// The flavour of tracking a [`crate::Wrapper`] carries around its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WrapperKind {
    /// Single-slot reference cell
    Ref,
    /// Tracked mutable object
    Reactive,
    /// Transparent interception wrapper
    Proxy,
}

impl WrapperKind {
    /// All wrapper kinds in declaration order
    pub const ALL: [WrapperKind; 3] = [WrapperKind::Ref, WrapperKind::Reactive, WrapperKind::Proxy];

    /// Envelope marker key used on the wire
    pub fn marker(&self) -> &'static str {
        match self {
            WrapperKind::Ref => MARKER_REF,
            WrapperKind::Reactive => MARKER_REACTIVE,
            WrapperKind::Proxy => MARKER_PROXY,
        }
    }

    /// Look up a kind from its envelope marker key
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            MARKER_REF => Some(WrapperKind::Ref),
            MARKER_REACTIVE => Some(WrapperKind::Reactive),
            MARKER_PROXY => Some(WrapperKind::Proxy),
            _ => None,
        }
    }

    /// Short lowercase name (`ref`, `reactive`, `proxy`)
    pub fn name(&self) -> &'static str {
        match self {
            WrapperKind::Ref => "ref",
            WrapperKind::Reactive => "reactive",
            WrapperKind::Proxy => "proxy",
        }
    }
}

impl fmt::Display for WrapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WrapperKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ref" => Ok(WrapperKind::Ref),
            "reactive" => Ok(WrapperKind::Reactive),
            "proxy" => Ok(WrapperKind::Proxy),
            other => Err(format!(
                "unknown wrapper kind '{}' (expected ref, reactive or proxy)",
                other
            )),
        }
    }
}

/// Tag describing which variant a [`crate::Value`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    /// Null / absent marker
    Null,
    /// Boolean
    Bool,
    /// Number
    Number,
    /// String
    String,
    /// Ordered sequence
    Sequence,
    /// String-keyed mapping
    Mapping,
    /// Wrapper of any kind
    Wrapped,
    /// Untraversed class instance
    Opaque,
}

impl ValueKind {
    /// Human-readable type name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
            ValueKind::Wrapped => "wrapper",
            ValueKind::Opaque => "opaque",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_roundtrip() {
        for kind in WrapperKind::ALL {
            assert_eq!(WrapperKind::from_marker(kind.marker()), Some(kind));
        }
        assert_eq!(WrapperKind::from_marker("$map"), None);
        assert_eq!(WrapperKind::from_marker("ref"), None);
    }

    #[test]
    fn test_parse_kind_names() {
        assert_eq!("ref".parse::<WrapperKind>().unwrap(), WrapperKind::Ref);
        assert_eq!(" Reactive ".parse::<WrapperKind>().unwrap(), WrapperKind::Reactive);
        assert_eq!("PROXY".parse::<WrapperKind>().unwrap(), WrapperKind::Proxy);

        let err = "signal".parse::<WrapperKind>().unwrap_err();
        assert!(err.contains("signal"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(WrapperKind::Reactive.to_string(), "reactive");
        assert_eq!(ValueKind::Mapping.to_string(), "mapping");
        assert_eq!(ValueKind::Wrapped.name(), "wrapper");
    }
}
