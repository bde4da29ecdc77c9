//! Construction-time settings for backends produced by a [`crate::factory::Factory`].

use std::path::PathBuf;

use crate::column::ColumnName;

/// Settings for opening a single column's backend.
#[derive(Debug, Clone)]
pub struct Settings {
    pub name: ColumnName,
    pub path: PathBuf,
    /// Remove any existing data at `path` before opening.
    pub delete_on_start: bool,
    /// Whether this settings value is allowed to authorize deleting the
    /// containing folder at all (a safety latch, independent of
    /// `delete_on_start`, for callers that construct `Settings` from
    /// untrusted configuration).
    pub can_delete_folder: bool,
}

impl Settings {
    pub fn new(name: ColumnName, path: impl Into<PathBuf>) -> Self {
        Settings {
            name,
            path: path.into(),
            delete_on_start: false,
            can_delete_folder: true,
        }
    }

    pub fn with_delete_on_start(mut self, delete_on_start: bool) -> Self {
        self.delete_on_start = delete_on_start;
        self
    }

    pub fn with_can_delete_folder(mut self, can_delete_folder: bool) -> Self {
        self.can_delete_folder = can_delete_folder;
        self
    }

    /// Rename-clone: a copy of this value naming a different column,
    /// leaving `self` untouched. Takes `&self` rather than consuming it,
    /// so one shared base can be renamed repeatedly to build a per-column
    /// `Settings` for each variant of a column group or a provider.
    pub fn with_name(&self, name: ColumnName) -> Settings {
        Settings {
            name,
            ..self.clone()
        }
    }
}
