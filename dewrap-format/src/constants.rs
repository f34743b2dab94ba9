//! Envelope marker keys for the dewrap JSON wire format

/// Marker key for a single-slot reference cell: `{"$ref": value}`.
pub const MARKER_REF: &str = "$ref";
/// Marker key for a tracked mutable object: `{"$reactive": value}`.
pub const MARKER_REACTIVE: &str = "$reactive";
/// Marker key for a transparent interception wrapper: `{"$proxy": value}`.
pub const MARKER_PROXY: &str = "$proxy";
/// Marker key carrying the class name of an opaque instance.
pub const MARKER_OPAQUE: &str = "$opaque";
/// Payload key paired with [`MARKER_OPAQUE`].
pub const OPAQUE_DATA_KEY: &str = "data";
/// Escape marker for a literal mapping whose keys collide with an envelope.
pub const MARKER_MAP: &str = "$map";

/// Every wrapper marker key, in [`crate::WrapperKind`] declaration order.
pub const WRAPPER_MARKERS: [&str; 3] = [MARKER_REF, MARKER_REACTIVE, MARKER_PROXY];
