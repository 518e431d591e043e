/// All entity identifiers (tasks, results, videos, users) are UUIDv7.
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
