//! # Context Initialization
//!
//! Wires a file-backed store and its configuration together for callers that
//! want the default on-disk setup.
//!
//! ## Data Directory Resolution
//!
//! 1. `TABLESTATE_DATA` environment variable, if set and non-empty.
//! 2. The `data_override` passed to [`initialize`].
//! 3. The OS data directory for the application (via the `directories` crate),
//!    e.g. `~/.local/share/tablestate` on Linux.
//!
//! The directory is created lazily by the first write.
//!
//! ## Configuration
//!
//! `tablestate.toml` is looked up in the data directory and merged over the
//! compiled defaults; `TABLESTATE__*` environment variables override both. A
//! config that fails to load is logged and replaced by the defaults.

use crate::config::TableConfig;
use crate::controller::{CatalogMode, RemoteTableController};
use crate::error::{Result, TableError};
use crate::model::ColumnSpec;
use crate::store::{FsBackend, ViewStateStore};
use clapfig::{Clapfig, SearchMode, SearchPath};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "TABLESTATE_DATA";
pub const CONFIG_FILE_NAME: &str = "tablestate.toml";

pub struct TableContext {
    pub backend: FsBackend,
    pub config: TableConfig,
    pub data_dir: PathBuf,
}

impl TableContext {
    /// Open the persisted state of one view.
    pub fn open_view(&self, page_id: &str, initial_columns: Vec<ColumnSpec>) -> ViewStateStore<&FsBackend> {
        ViewStateStore::open_with_config(&self.backend, page_id, initial_columns, self.config.clone())
    }

    pub fn controller(
        &self,
        page_id: &str,
        initial_columns: Vec<ColumnSpec>,
        mode: CatalogMode,
    ) -> RemoteTableController<&FsBackend> {
        RemoteTableController::new(self.open_view(page_id, initial_columns), mode)
    }
}

/// Pick the data directory from the environment value, an explicit override,
/// or the platform default, in that order.
pub fn resolve_data_dir(env_value: Option<PathBuf>, data_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = env_value.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(dir);
    }
    if let Some(dir) = data_override {
        return Ok(dir);
    }
    ProjectDirs::from("com", "tablestate", "tablestate")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| TableError::Config("could not determine a data directory".into()))
}

pub fn load_config(data_dir: &Path) -> TableConfig {
    let loaded: std::result::Result<TableConfig, _> = Clapfig::builder()
        .app_name("tablestate")
        .file_name(CONFIG_FILE_NAME)
        .search_paths(vec![SearchPath::Path(data_dir.to_path_buf())])
        .search_mode(SearchMode::Merge)
        .load();
    match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(dir = %data_dir.display(), error = %e, "failed to load config, using defaults");
            TableConfig::default()
        }
    }
}

/// Build a [`TableContext`] for the resolved data directory.
pub fn initialize(data_override: Option<PathBuf>) -> Result<TableContext> {
    let env_value = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
    let data_dir = resolve_data_dir(env_value, data_override)?;
    let config = load_config(&data_dir);
    tracing::debug!(dir = %data_dir.display(), "table state context ready");

    Ok(TableContext {
        backend: FsBackend::new(data_dir.clone()),
        config,
        data_dir,
    })
}
