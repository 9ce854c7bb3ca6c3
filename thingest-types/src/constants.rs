/// Topic segment marking a measure publication.
pub const ATTRS: &str = "attrs";

/// Default raw key devices use to embed their local observation timestamp.
pub const DEFAULT_TIMESTAMP_ALIAS: &str = "tt";

/// Compact device-local timestamp format, e.g. `20071103T131805`.
pub const COMPACT_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";
