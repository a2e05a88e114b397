//! # Configuration
//!
//! Table defaults are managed by [`clapfig`], which handles layered loading
//! from TOML files, environment variables, and programmatic overrides.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Environment variables**: `TABLESTATE__ITEMS_PER_PAGE`, `TABLESTATE__DEFAULT_SORT_FIELD`, etc.
//! 2. **Data-directory config**: `tablestate.toml` next to the persisted view files.
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `items_per_page` | `10` | Page size of a view with no saved preference |
//! | `max_items_per_page` | `100` | Upper bound page-size updates are clamped to |
//! | `default_sort_field` | `cdt` | Field sorted (descending) when no column is sorted |
//! | `storage_prefix` | `table_state_` | Prefix of the storage key of each view |

use confique::Config;
use serde::{Deserialize, Serialize};

use crate::model::DEFAULT_ITEMS_PER_PAGE;
use crate::query::DEFAULT_SORT_FIELD;

/// Configuration for table views, stored in `tablestate.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Page size used when a view has no saved preference.
    #[config(default = 10)]
    pub items_per_page: u32,

    /// Largest page size a view may request.
    #[config(default = 100)]
    pub max_items_per_page: u32,

    /// Field sorted descending when no column is actively sorted.
    #[config(default = "cdt")]
    pub default_sort_field: String,

    /// Prefix prepended to the page id to form the storage key.
    #[config(default = "table_state_")]
    pub storage_prefix: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            max_items_per_page: 100,
            default_sort_field: DEFAULT_SORT_FIELD.to_string(),
            storage_prefix: "table_state_".to_string(),
        }
    }
}

impl TableConfig {
    pub fn storage_key(&self, page_id: &str) -> String {
        format!("{}{}", self.storage_prefix, page_id)
    }

    /// Clamp a requested page size into `1..=max_items_per_page`.
    pub fn clamp_items_per_page(&self, requested: u32) -> u32 {
        requested.clamp(1, self.max_items_per_page.max(1))
    }

    /// Saved page size, or the default when it is missing or zero.
    pub fn items_per_page_or_default(&self, saved: Option<u64>) -> u32 {
        match saved {
            Some(n) if n > 0 => self.clamp_items_per_page(u32::try_from(n).unwrap_or(u32::MAX)),
            _ => self.items_per_page,
        }
    }
}
