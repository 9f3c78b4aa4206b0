/// Todo and file identifiers are random (v4) UUIDs generated at construction.
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
