//! Collaborator contracts for the remote API.
//!
//! The controller never talks to the network itself. Callers whose fetches are
//! blocking implement these traits and use the controller's `*_from` drivers;
//! callers with their own async runtime use the ticket API instead and only
//! need the types here for their completions.

use serde_json::Value;

use crate::error::Result;
use crate::model::{FieldDescriptor, Query};

/// The paginated query endpoint.
pub trait PageSource {
    /// Run one query. The response shape is not fixed; see [`crate::response`].
    fn fetch_page(&mut self, query: &Query) -> Result<Value>;
}

/// The "describe fields" endpoint.
pub trait CatalogSource {
    fn fetch_fields(&mut self) -> Result<Vec<FieldDescriptor>>;
}

impl<F> PageSource for F
where
    F: FnMut(&Query) -> Result<Value>,
{
    fn fetch_page(&mut self, query: &Query) -> Result<Value> {
        self(query)
    }
}

impl<F> CatalogSource for F
where
    F: FnMut() -> Result<Vec<FieldDescriptor>>,
{
    fn fetch_fields(&mut self) -> Result<Vec<FieldDescriptor>> {
        self()
    }
}
