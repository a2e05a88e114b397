use super::backend::StorageBackend;
use crate::error::{Result, TableError};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// In-memory storage backend, the analogue of browser local storage.
///
/// Uses `RefCell` for interior mutability since views are driven from a
/// single thread. This keeps `StorageBackend` at `&self` for all methods.
#[derive(Default)]
pub struct MemBackend {
    entries: RefCell<HashMap<String, String>>,
    simulate_read_error: Cell<bool>,
    simulate_write_error: Cell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable read error simulation for testing error handling.
    pub fn set_simulate_read_error(&self, simulate: bool) {
        self.simulate_read_error.set(simulate);
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Raw stored value, bypassing error simulation.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StorageBackend for MemBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        if self.simulate_read_error.get() {
            return Err(TableError::Store("Simulated read error".to_string()));
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(TableError::Store("Simulated write error".to_string()));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(TableError::Store("Simulated write error".to_string()));
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_missing_key_is_none() {
        let backend = MemBackend::new();
        assert_eq!(backend.read("table_state_users").unwrap(), None);
    }

    #[test]
    fn write_then_read() {
        let backend = MemBackend::new();
        backend.write("k", "{}").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("{}"));
        backend.write("k", "{}").unwrap();
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let backend = MemBackend::new();
        backend.write("k", "v").unwrap();
        backend.remove("k").unwrap();
        backend.remove("k").unwrap();
        assert!(backend.is_empty());
    }

    #[test]
    fn simulated_errors() {
        let backend = MemBackend::new();
        backend.write("k", "v").unwrap();

        backend.set_simulate_read_error(true);
        assert!(backend.read("k").is_err());
        backend.set_simulate_read_error(false);

        backend.set_simulate_write_error(true);
        assert!(backend.write("k", "w").is_err());
        assert_eq!(backend.raw("k").as_deref(), Some("v"));
    }

    #[test]
    fn works_through_a_reference() {
        fn store_via<B: StorageBackend>(backend: B) {
            backend.write("shared", "1").unwrap();
        }
        let backend = MemBackend::new();
        store_via(&backend);
        assert_eq!(backend.raw("shared").as_deref(), Some("1"));
    }
}
