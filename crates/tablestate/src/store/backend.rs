use crate::error::Result;

/// Abstract interface for raw key-value storage.
/// This trait handles the "how" of persistence (filesystem vs memory),
/// while ViewStateStore handles the "what" (defaults, validation, recovery).
///
/// Keys are full storage keys (`table_state_<pageId>`), values are JSON text.
pub trait StorageBackend {
    /// Read the value for `key`.
    /// Returns Ok(None) if nothing is stored under it (first use).
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    /// Repeating an identical write must leave the same result.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for &T {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
