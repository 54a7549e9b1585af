// Key-value persistence module
// The plant store only needs string get/set against a single well-known key.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

use crate::error::Result;

/// String-keyed, string-valued persistence layer.
///
/// `get` returns `Ok(None)` when the key has never been written.
/// `set` replaces the whole value; there is no partial update.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
