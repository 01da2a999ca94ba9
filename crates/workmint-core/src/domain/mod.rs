//! Domain model (ids, draft records, on-storage schema, errors).

pub mod draft;
pub mod errors;
pub mod ids;
pub mod snapshot;

pub use self::draft::{DraftPush, DraftRecord, is_valid_quantity};
pub use self::errors::{ConfigError, PushError, StorageError, StoreError};
pub use self::ids::TaskId;
pub use self::snapshot::{CURRENT_SCHEMA_VERSION, DraftSnapshot};
