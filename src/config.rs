//! Logger configuration
//!
//! Read from environment variables by default, optionally backed by a
//! `.env` file. The same settings can also be embedded in an application's
//! TOML config.

use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::format::FormatFlags;
use crate::level::Severity;
use crate::root::DEFAULT_ROOT_MARKER;

pub const LOG_FILE: &str = "LOG_FILE";
pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const LOG_FORMAT: &str = "LOG_FORMAT";
pub const LOG_ROOT_MARKER: &str = "LOG_ROOT_MARKER";
pub const LOG_PREFIX: &str = "LOG_PREFIX";

/// Log file used when `LOG_FILE` is unset or empty
pub const DEFAULT_LOG_FILE: &str = "logfile.log";

/// Source of configuration values
pub trait EnvSource {
    /// Look up `key`; `Ok(None)` when unset
    ///
    /// Values are raw OS strings, so a file path need not be unicode.
    fn get(&self, key: &str) -> Result<Option<OsString>>;
}

/// Reads the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Result<Option<OsString>> {
        Ok(env::var_os(key))
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Result<Option<OsString>> {
        Ok(HashMap::get(self, key).map(OsString::from))
    }
}

impl EnvSource for HashMap<String, OsString> {
    fn get(&self, key: &str) -> Result<Option<OsString>> {
        Ok(HashMap::get(self, key).cloned())
    }
}

/// Looks in `primary` first, then in `fallback`
#[derive(Debug, Clone, Default)]
pub struct Layered<P, F> {
    pub primary: P,
    pub fallback: F,
}

impl<P: EnvSource, F: EnvSource> EnvSource for Layered<P, F> {
    fn get(&self, key: &str) -> Result<Option<OsString>> {
        match self.primary.get(key)? {
            Some(value) => Ok(Some(value)),
            None => self.fallback.get(key),
        }
    }
}

/// Read every `KEY=value` pair of a dotenv file
///
/// The process environment is left untouched. A missing, unreadable or
/// malformed file is an error.
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    let dotenv_error = |e: dotenvy::Error| Error::Config {
        key: path.display().to_string(),
        reason: e.to_string(),
    };

    dotenvy::from_path_iter(path)
        .map_err(dotenv_error)?
        .map(|item| item.map_err(dotenv_error))
        .collect()
}

/// Decode a value that only has meaning as text
///
/// A non-unicode value cannot name a level, flag, marker or prefix, so it is
/// treated like an unrecognized one.
fn text(value: Option<OsString>, key: &str) -> Option<String> {
    value.and_then(|v| match v.into_string() {
        Ok(s) => Some(s),
        Err(_) => {
            tracing::warn!(key, "Ignoring non-unicode configuration value");
            None
        }
    })
}

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Append target
    #[serde(default = "default_file")]
    pub file: PathBuf,

    /// Minimum severity written; unrecognized names mean all
    #[serde(default)]
    pub level: Severity,

    /// Display options
    #[serde(default)]
    pub format: FormatFlags,

    /// File whose presence marks the project root
    #[serde(default = "default_root_marker")]
    pub root_marker: String,

    /// Constant text at the start of every line
    #[serde(default)]
    pub prefix: String,
}

fn default_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

fn default_root_marker() -> String {
    DEFAULT_ROOT_MARKER.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: default_file(),
            level: Severity::All,
            format: FormatFlags::EMPTY,
            root_marker: default_root_marker(),
            prefix: String::new(),
        }
    }
}

impl Config {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        Self::from_env(&ProcessEnv)
    }

    /// Load from the process environment, backed by the dotenv file at `path`
    ///
    /// Variables already set in the process win over the file. The file
    /// must exist.
    pub fn load_dotenv(path: impl AsRef<Path>) -> Result<Self> {
        let file_vars = read_dotenv(path.as_ref())?;
        tracing::debug!(
            path = %path.as_ref().display(),
            count = file_vars.len(),
            "Loaded dotenv file"
        );
        Self::from_env(&Layered {
            primary: ProcessEnv,
            fallback: file_vars,
        })
    }

    /// Load from any [`EnvSource`]
    ///
    /// Missing or unrecognized values fall back to defaults. Only a source
    /// that cannot produce a value at all is an error.
    pub fn from_env(source: &impl EnvSource) -> Result<Self> {
        let mut config = Self::default();

        if let Some(file) = source.get(LOG_FILE)?.filter(|f| !f.is_empty()) {
            config.file = match file.to_str() {
                Some(s) => PathBuf::from(shellexpand::tilde(s).as_ref()),
                None => PathBuf::from(file),
            };
        }

        let level = text(source.get(LOG_LEVEL)?, LOG_LEVEL).unwrap_or_default();
        config.level = Severity::parse(&level);
        let format = text(source.get(LOG_FORMAT)?, LOG_FORMAT).unwrap_or_default();
        config.format = FormatFlags::parse(&format);

        if let Some(marker) =
            text(source.get(LOG_ROOT_MARKER)?, LOG_ROOT_MARKER).filter(|m| !m.is_empty())
        {
            config.root_marker = marker;
        }

        if let Some(prefix) = text(source.get(LOG_PREFIX)?, LOG_PREFIX) {
            config.prefix = prefix;
        }

        Ok(config)
    }

    /// Parse from a TOML table
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config {
            key: "toml".to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_env(&HashMap::<String, String>::new()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.file, PathBuf::from("logfile.log"));
        assert_eq!(config.level, Severity::All);
        assert!(config.format.is_empty());
        assert_eq!(config.root_marker, "main.rs");
    }

    #[test]
    fn test_empty_log_file_uses_default() {
        let config = Config::from_env(&env_of(&[(LOG_FILE, "")])).unwrap();
        assert_eq!(config.file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_reads_all_keys() {
        let config = Config::from_env(&env_of(&[
            (LOG_FILE, "/var/log/app.log"),
            (LOG_LEVEL, "warning"),
            (LOG_FORMAT, "date|time|shortfile"),
            (LOG_ROOT_MARKER, "Cargo.toml"),
            (LOG_PREFIX, "app: "),
        ]))
        .unwrap();

        assert_eq!(config.file, PathBuf::from("/var/log/app.log"));
        assert_eq!(config.level, Severity::Warning);
        assert_eq!(
            config.format,
            FormatFlags::DATE | FormatFlags::TIME | FormatFlags::SHORT_FILE
        );
        assert_eq!(config.root_marker, "Cargo.toml");
        assert_eq!(config.prefix, "app: ");
    }

    #[test]
    fn test_unknown_level_is_all() {
        let config = Config::from_env(&env_of(&[(LOG_LEVEL, "verbose")])).unwrap();
        assert_eq!(config.level, Severity::All);
    }

    #[test]
    fn test_tilde_expansion() {
        let config = Config::from_env(&env_of(&[(LOG_FILE, "~/app.log")])).unwrap();
        assert!(config.file.ends_with("app.log"));
        if std::env::var_os("HOME").is_some() {
            assert!(!config.file.starts_with("~"));
        }
    }

    #[test]
    fn test_source_error_propagates() {
        struct Broken;
        impl EnvSource for Broken {
            fn get(&self, key: &str) -> Result<Option<OsString>> {
                Err(Error::Config {
                    key: key.to_string(),
                    reason: "unavailable".to_string(),
                })
            }
        }

        let err = Config::from_env(&Broken).unwrap_err();
        assert!(err.to_string().contains(LOG_FILE));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_values_are_not_fatal() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let garbage = OsStr::from_bytes(b"\xff\xfe").to_os_string();
        let env: HashMap<String, OsString> = [
            (LOG_LEVEL.to_string(), garbage.clone()),
            (LOG_FORMAT.to_string(), garbage.clone()),
            (LOG_ROOT_MARKER.to_string(), garbage.clone()),
            (LOG_PREFIX.to_string(), garbage),
        ]
        .into_iter()
        .collect();

        let config = Config::from_env(&env).unwrap();
        assert_eq!(config.level, Severity::All);
        assert!(config.format.is_empty());
        assert_eq!(config.root_marker, DEFAULT_ROOT_MARKER);
        assert_eq!(config.prefix, "");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_log_file_is_kept() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = OsStr::from_bytes(b"/var/log/app-\xff.log");
        let env: HashMap<String, OsString> = [(LOG_FILE.to_string(), path.to_os_string())]
            .into_iter()
            .collect();

        let config = Config::from_env(&env).unwrap();
        assert_eq!(config.file.as_os_str(), path);
    }

    #[test]
    fn test_layered_primary_wins() {
        let layered = Layered {
            primary: env_of(&[(LOG_LEVEL, "error")]),
            fallback: env_of(&[(LOG_LEVEL, "debug"), (LOG_PREFIX, "svc: ")]),
        };

        let config = Config::from_env(&layered).unwrap();
        assert_eq!(config.level, Severity::Error);
        assert_eq!(config.prefix, "svc: ");
    }

    #[test]
    fn test_read_dotenv() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");
        fs::write(
            &path,
            "# logger settings\nLOG_LEVEL=warning\nLOG_FORMAT=\"date|shortfile\"\n",
        )
        .unwrap();

        let vars = read_dotenv(&path).unwrap();
        assert_eq!(vars.len(), 2);

        let config = Config::from_env(&vars).unwrap();
        assert_eq!(config.level, Severity::Warning);
        assert_eq!(config.format, FormatFlags::DATE | FormatFlags::SHORT_FILE);
    }

    #[test]
    fn test_missing_dotenv_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");

        let err = Config::load_dotenv(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains(".env"));
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml_str(
            r#"
            file = "service.log"
            level = "info"
            format = "stdflags|utc"
            "#,
        )
        .unwrap();

        assert_eq!(config.file, PathBuf::from("service.log"));
        assert_eq!(config.level, Severity::Info);
        assert_eq!(config.format, FormatFlags::STD_FLAGS | FormatFlags::UTC);
        assert_eq!(config.root_marker, DEFAULT_ROOT_MARKER);
    }

    #[test]
    fn test_toml_serialization() {
        let config = Config {
            level: Severity::Error,
            format: FormatFlags::parse("time|longfile"),
            ..Config::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains(r#"level = "error""#));
        assert!(toml_str.contains(r#"format = "time|longfile""#));

        let parsed = Config::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("level = [").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
