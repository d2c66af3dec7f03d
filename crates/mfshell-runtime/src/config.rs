//! Shell configuration – reads/writes `~/.mfshell/config.toml`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use mfshell_bus::{DEFAULT_CAPACITY, MAX_CAPACITY};
use mfshell_types::{MountFailurePolicy, ShellError};
use serde::{Deserialize, Serialize};

/// Log line formatting used by [`init_tracing`][crate::telemetry::init_tracing].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(ShellError::Config(format!("unknown log format '{other}'"))),
        }
    }
}

/// Persisted shell configuration stored in `~/.mfshell/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Broadcast capacity of the global bus and of every private bus.
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,

    /// What to do with an entry whose mount fails.
    #[serde(default)]
    pub mount_failure: MountFailurePolicy,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_bus_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            bus_capacity: default_bus_capacity(),
            mount_failure: MountFailurePolicy::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl ShellConfig {
    /// Defaults with `MFSHELL_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        apply_env_overrides(&mut cfg);
        cfg
    }

    /// Check values that parse but cannot be used.
    ///
    /// # Errors
    ///
    /// [`ShellError::Config`] when `bus_capacity` is zero or above
    /// [`MAX_CAPACITY`].
    pub fn validate(&self) -> Result<(), ShellError> {
        if !(1..=MAX_CAPACITY).contains(&self.bus_capacity) {
            return Err(ShellError::Config(format!(
                "bus_capacity must be between 1 and {MAX_CAPACITY}, got {}",
                self.bus_capacity
            )));
        }
        Ok(())
    }
}

/// Return the path to `~/.mfshell/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".mfshell").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<ShellConfig>, ShellError> {
    load_from(&config_path())
}

/// Load the config from a specific path, validate it, then apply
/// environment overrides.
pub fn load_from(path: &Path) -> Result<Option<ShellConfig>, ShellError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        ShellError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    let mut cfg: ShellConfig = toml::from_str(&raw)
        .map_err(|e| ShellError::Config(format!("failed to parse {}: {e}", path.display())))?;
    cfg.validate()?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `MFSHELL_*` environment variable overrides to `cfg`.
///
/// Unparseable values, and capacities outside `1..=MAX_CAPACITY`, are
/// ignored.
///
/// | Variable | Config field |
/// |---|---|
/// | `MFSHELL_BUS_CAPACITY` | `bus_capacity` |
/// | `MFSHELL_MOUNT_FAILURE` | `mount_failure` (`leave_mounted` / `rollback`) |
/// | `MFSHELL_LOG_FORMAT` | `log_format` (`compact` / `json`) |
pub fn apply_env_overrides(cfg: &mut ShellConfig) {
    apply_overrides(cfg, |key| std::env::var(key).ok());
}

fn apply_overrides(cfg: &mut ShellConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("MFSHELL_BUS_CAPACITY")
        && let Ok(capacity) = v.parse::<usize>()
        && (1..=MAX_CAPACITY).contains(&capacity)
    {
        cfg.bus_capacity = capacity;
    }
    if let Some(v) = var("MFSHELL_MOUNT_FAILURE")
        && let Ok(policy) = v.parse::<MountFailurePolicy>()
    {
        cfg.mount_failure = policy;
    }
    if let Some(v) = var("MFSHELL_LOG_FORMAT")
        && let Ok(format) = v.parse::<LogFormat>()
    {
        cfg.log_format = format;
    }
}

/// Save the config to `path`, creating its directory if necessary.
pub fn save_to(cfg: &ShellConfig, path: &Path) -> Result<(), ShellError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ShellError::Config(format!("failed to create {}: {e}", parent.display()))
        })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700)).map_err(|e| {
                ShellError::Config(format!("failed to restrict {}: {e}", parent.display()))
            })?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| ShellError::Config(format!("failed to serialize config: {e}")))?;
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| ShellError::Config(format!("failed to write {}: {e}", path.display())))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| ShellError::Config(format!("failed to write {}: {e}", path.display())))?;
    Ok(())
}
