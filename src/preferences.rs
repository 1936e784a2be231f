use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::ListSiftError;

/// User preferences that outlive a single list view. Keys match the ones
/// the web client keeps in local storage, so a file can be shared.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    #[serde(
        rename = "/pagination/rowsperpage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rows_per_page: Option<usize>,

    /// Hidden column keys, per view id
    #[serde(rename = "/columns/hidden", default)]
    pub hidden_columns: BTreeMap<String, Vec<String>>,
}

/// Preferences bound to the JSON file they are read from and saved to.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
    prefs: Preferences,
}

impl PreferencesStore {
    pub const FILE_NAME: &str = "preferences.json";

    /// Reads `path`. A missing file yields defaults; an unreadable or
    /// corrupt file is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ListSiftError> {
        let path = path.into();
        let prefs = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No preferences at {}, using defaults", path.display());
                Preferences::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(PreferencesStore { path, prefs })
    }

    /// A store with no backing file. [`PreferencesStore::save`] on it is an
    /// error.
    pub fn in_memory(prefs: Preferences) -> Self {
        PreferencesStore {
            path: PathBuf::new(),
            prefs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    pub fn save(&self) -> Result<(), ListSiftError> {
        if self.path.as_os_str().is_empty() {
            return Err(ListSiftError::Error(
                "Preferences have no file to save to".into(),
            ));
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.prefs)?)?;
        info!("Saved preferences to {}", self.path.display());
        Ok(())
    }

    pub fn rows_per_page(&self) -> Option<usize> {
        self.prefs.rows_per_page
    }

    pub fn set_rows_per_page(&mut self, rows: usize) -> Result<(), ListSiftError> {
        if rows == 0 {
            return Err(ListSiftError::InvalidPageSize(rows));
        }
        self.prefs.rows_per_page = Some(rows);
        Ok(())
    }

    pub fn hidden_columns(&self, view_id: &str) -> &[String] {
        self.prefs
            .hidden_columns
            .get(view_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Flips a column between hidden and shown; returns whether it is now hidden.
    pub fn toggle_column(&mut self, view_id: &str, column: &str) -> bool {
        let hidden = self
            .prefs
            .hidden_columns
            .entry(view_id.to_owned())
            .or_default();

        match hidden.iter().position(|c| c == column) {
            Some(pos) => {
                hidden.remove(pos);
                if hidden.is_empty() {
                    self.prefs.hidden_columns.remove(view_id);
                }
                false
            }
            None => {
                hidden.push(column.to_owned());
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferencesStore::load(dir.path().join(PreferencesStore::FILE_NAME)).unwrap();
        assert_eq!(store.prefs(), &Preferences::default());
        assert_eq!(store.rows_per_page(), None);
        assert!(store.hidden_columns("stock").is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join(PreferencesStore::FILE_NAME);

        let mut store = PreferencesStore::load(&path).unwrap();
        store.set_rows_per_page(25).unwrap();
        assert!(store.toggle_column("stock", "batch"));
        assert!(store.toggle_column("stock", "expiry"));
        assert!(!store.toggle_column("stock", "batch"));
        store.save().unwrap();

        let reloaded = PreferencesStore::load(&path).unwrap();
        assert_eq!(reloaded.rows_per_page(), Some(25));
        assert_eq!(reloaded.hidden_columns("stock"), ["expiry".to_string()]);

        let json = fs::read_to_string(&path).unwrap();
        assert!(json.contains("/pagination/rowsperpage"));
        assert!(json.contains("/columns/hidden"));
    }

    #[test]
    fn test_showing_last_column_drops_view_entry() {
        let mut store = PreferencesStore::in_memory(Preferences::default());
        store.toggle_column("assets", "notes");
        store.toggle_column("assets", "notes");
        assert!(store.prefs().hidden_columns.is_empty());
    }

    #[test]
    fn test_save_without_file_is_an_error() {
        let mut store = PreferencesStore::in_memory(Preferences::default());
        store.set_rows_per_page(20).unwrap();
        assert!(matches!(store.save(), Err(ListSiftError::Error(_))));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PreferencesStore::FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            PreferencesStore::load(&path),
            Err(ListSiftError::JsonError(_))
        ));
    }

    #[test]
    fn test_zero_rows_per_page_rejected() {
        let mut store = PreferencesStore::in_memory(Preferences::default());
        assert!(store.set_rows_per_page(0).is_err());
        assert_eq!(store.rows_per_page(), None);
    }
}
