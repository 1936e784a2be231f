use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ListSiftError;
use crate::filter::SearchFields;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::sort::SortRule;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub listsift: String,
}

impl LoggingConfig {
    const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    const LISTSIFT_LEVEL: &str = "info";

    /// Log specification handed to the logger, e.g. `listsift=info`.
    pub fn log_spec(&self) -> String {
        format!("listsift={}", self.listsift)
    }

    fn ensure_valid(&mut self) {
        let str_original = self.listsift.clone();
        self.listsift = self.listsift.trim().to_ascii_lowercase();
        if !Self::LOG_LEVELS.contains(&self.listsift.as_str()) {
            eprintln!(
                "Config error: listsift log level of '{}' is invalid - using default of '{}'",
                str_original,
                Self::LISTSIFT_LEVEL
            );
            self.listsift = Self::LISTSIFT_LEVEL.to_owned();
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            listsift: Self::LISTSIFT_LEVEL.to_string(),
        }
    }
}

/// Per-view options: initial sort, searchable fields, search debounce and
/// page size.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ListViewConfig {
    pub initial_sort_by: SortRule,
    pub search_fields: SearchFields,
    /// Milliseconds of quiet before search input is applied
    pub debounce_time: u64,
    pub page_size: usize,
}

impl ListViewConfig {
    const DEBOUNCE_TIME_MS: u64 = 300;
    const SORT_KEY: &str = "id";

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_time)
    }

    fn ensure_valid(&mut self) {
        if self.page_size == 0 {
            eprintln!(
                "Config error: page_size of 0 is invalid - using default of {}",
                DEFAULT_PAGE_SIZE
            );
            self.page_size = DEFAULT_PAGE_SIZE;
        }

        let key_original = self.initial_sort_by.key.clone();
        self.initial_sort_by.key = key_original.trim().to_owned();
        if self.initial_sort_by.key.is_empty() {
            eprintln!(
                "Config error: initial_sort_by key of '{}' is invalid - using default of '{}'",
                key_original,
                Self::SORT_KEY
            );
            self.initial_sort_by.key = Self::SORT_KEY.to_owned();
        }

        self.search_fields = std::mem::take(&mut self.search_fields).dedup();
    }
}

impl Default for ListViewConfig {
    fn default() -> Self {
        ListViewConfig {
            initial_sort_by: SortRule::asc(Self::SORT_KEY),
            search_fields: SearchFields::default(),
            debounce_time: Self::DEBOUNCE_TIME_MS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub logging: LoggingConfig,
    pub list_view: ListViewConfig,
}

impl Config {
    pub const ENV_PREFIX: &str = "LISTSIFT_";
    pub const FILE_NAME: &str = "config.toml";

    /// Defaults, then the TOML file, then `LISTSIFT_` environment variables
    /// (`LISTSIFT_LIST_VIEW__PAGE_SIZE=25`).
    fn figment(config_path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
    }

    /// Loads an explicitly named config file. Unlike [`Config::load_config`]
    /// a missing or malformed file is an error.
    pub fn load_file(config_path: &Path) -> Result<Self, ListSiftError> {
        if !config_path.exists() {
            return Err(ListSiftError::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                format!("config file not found: {}", config_path.display()),
            )));
        }

        let mut config: Config = Self::figment(config_path)
            .extract()
            .map_err(Box::new)?;
        config.ensure_valid();

        Ok(config)
    }

    /// Loads the configuration from a TOML file located in the app's data directory.
    /// If the file is missing or fails to parse, defaults are used.
    /// Additionally, writes the default config to disk if no file exists.
    pub fn load_config(data_dir: &Path) -> Self {
        Self::load_or_init(&data_dir.join(Self::FILE_NAME))
    }

    fn load_or_init(config_path: &Path) -> Self {
        let default_config = Config::default();

        // If the config file doesn't exist, write the default configuration to disk.
        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    eprintln!(
                        "Failed to create configuration directory {}: {}",
                        parent.display(),
                        e
                    );
                }
            }
            if let Ok(toml_string) = toml::to_string_pretty(&default_config) {
                if let Err(e) = fs::write(config_path, toml_string) {
                    eprintln!(
                        "Failed to write default config to {}: {}",
                        config_path.display(),
                        e
                    );
                }
            } else {
                eprintln!("Failed to serialize default config.");
            }
        }

        // Attempt to extract the configuration; on error, report it and fall back to defaults.
        let mut config = Self::figment(config_path).extract().unwrap_or_else(|err| {
            eprintln!(
                "Could not load config file {}: {}. Using default configuration.",
                config_path.display(),
                err
            );
            default_config
        });

        config.ensure_valid();

        config
    }

    fn ensure_valid(&mut self) {
        self.logging.ensure_valid();
        self.list_view.ensure_valid();
    }
}
