//! The in-memory configuration document and its typed accessors.

use crate::error::{Result, SyncError};
use config::{Config, File, FileFormat};
use std::path::{Path, PathBuf};

/// File stem of the configuration file, resolved as `twitch-bot.yaml`.
pub const CONFIG_FILE_STEM: &str = "twitch-bot";

/// Directories searched for the configuration file, in order.
pub const CONFIG_SEARCH_DIRS: &[&str] = &["./config", "."];

/// A parsed YAML configuration document.
///
/// The document is replaced wholesale on every reload; there is no partial
/// or incremental update. Accessors never fail: a key that is absent, or a
/// value that cannot be coerced to the requested type, yields the type's
/// zero value (empty string, 0, false, empty list).
///
/// # Examples
///
/// ```rust
/// use twitch_bot_config::document::Document;
///
/// let doc = Document::from_yaml("irc:\n  nickname: streambot\n").unwrap();
/// assert_eq!(doc.get_string("irc.nickname"), "streambot");
/// assert_eq!(doc.get_int("irc.missing"), 0);
/// ```
pub struct Document {
    inner: Config,
}

impl Document {
    /// Load the document from a YAML file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::LoadError`] if the file does not exist and
    /// [`SyncError::ParseError`] if it cannot be parsed as YAML. Callers
    /// decide whether that is fatal (startup) or recoverable (reload).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SyncError::LoadError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let inner = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(true))
            .build()
            .map_err(|e| SyncError::ParseError(format!("{}: {}", path.display(), e)))?;

        Ok(Self { inner })
    }

    /// Parse a document from an in-memory YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let inner = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .map_err(|e| SyncError::ParseError(e.to_string()))?;

        Ok(Self { inner })
    }

    /// Read a string value, or `""` if absent.
    pub fn get_string(&self, key: &str) -> String {
        self.inner.get_string(key).unwrap_or_default()
    }

    /// Read an integer value, or `0` if absent or not coercible.
    pub fn get_int(&self, key: &str) -> i64 {
        self.inner.get_int(key).unwrap_or_default()
    }

    /// Read a boolean value, or `false` if absent or not coercible.
    pub fn get_bool(&self, key: &str) -> bool {
        self.inner.get_bool(key).unwrap_or_default()
    }

    /// Read a list of strings, or `[]` if absent or not coercible.
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        self.inner.get::<Vec<String>>(key).unwrap_or_default()
    }
}

/// Locate the configuration file by searching the default directories.
///
/// Checks `./config` then `.` for `twitch-bot.yaml` (or `.yml`) and returns
/// the first match. A missing file is a fatal startup condition for the
/// caller.
pub fn resolve_config_file() -> Result<PathBuf> {
    let dirs: Vec<PathBuf> = CONFIG_SEARCH_DIRS.iter().map(PathBuf::from).collect();
    resolve_config_file_in(&dirs)
}

/// Locate the configuration file in an explicit list of directories.
pub fn resolve_config_file_in(dirs: &[PathBuf]) -> Result<PathBuf> {
    for dir in dirs {
        for ext in ["yaml", "yml"] {
            let candidate = dir.join(format!("{CONFIG_FILE_STEM}.{ext}"));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(SyncError::LoadError(format!(
        "Configuration file {CONFIG_FILE_STEM}.yaml not found in: {}",
        dirs.iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    )))
}
