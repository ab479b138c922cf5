//! Configuration types.
//!
//! Settings are read from `/etc/jqmon/config.toml`, then the user config file,
//! then `JQMON_*` environment variables. Invalid values are corrected to their
//! defaults and reported as warnings, unless `JQMON_STRICT_CONFIG` is set.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct JqmonConfig {
    pub connection: ConnectionConfig,

    pub refresh: RefreshConfig,

    pub display: DisplayConfig,

    pub behavior: BehaviorConfig,
}

/// How to reach the status service
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Path to the ssh binary. If not set, auto-detected via PATH
    pub ssh_path: Option<PathBuf>,

    /// Port the status service listens on, on the remote host
    pub remote_port: u16,

    /// Local end of the tunnel (0 = pick a free port)
    pub local_port: u16,

    /// Command ssh runs on the remote host to start the status service.
    /// If unset the service is assumed to be running already.
    pub remote_command: Option<String>,

    /// Per-request HTTP timeout in seconds
    pub request_timeout: u64,

    /// Seconds to wait for the forwarded port to come up
    pub connect_timeout: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            ssh_path: None,
            remote_port: 8765,
            local_port: 0,
            remote_command: None,
            request_timeout: 10,
            connect_timeout: 15,
        }
    }
}

impl ConnectionConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Jobs refresh interval in seconds
    pub jobs_interval: u64,

    /// Queues refresh interval in seconds
    pub queues_interval: u64,

    /// Enable idle slowdown
    pub idle_slowdown: bool,

    /// Seconds before considered idle
    pub idle_threshold: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            jobs_interval: 5,
            queues_interval: 10,
            idle_slowdown: true,
            idle_threshold: 30,
        }
    }
}

/// Minimum allowed refresh interval in seconds (prevents tight polling loops)
const MIN_REFRESH_INTERVAL: u64 = 1;

/// Minimum idle threshold in seconds
const MIN_IDLE_THRESHOLD: u64 = 1;

/// Validate that an interval value meets the minimum requirement.
/// In non-strict mode, corrects invalid values to the default and adds a warning.
fn validate_interval(
    value: &mut u64,
    field: &str,
    min: u64,
    default: u64,
    strict: bool,
    warnings: &mut Vec<String>,
) -> Result<()> {
    if *value < min {
        let msg = format!("{field} must be at least {min} second(s), got {value}");
        if strict {
            return Err(Error::Config(msg));
        }
        warnings.push(format!("{msg} - using default ({default})"));
        *value = default;
    }
    Ok(())
}

impl RefreshConfig {
    /// Validate refresh configuration values.
    /// Returns a list of warnings for invalid values that were corrected to defaults.
    pub fn validate(&mut self, strict: bool) -> Result<Vec<String>> {
        let mut warnings = Vec::new();
        let defaults = Self::default();

        validate_interval(
            &mut self.jobs_interval,
            "refresh.jobs_interval",
            MIN_REFRESH_INTERVAL,
            defaults.jobs_interval,
            strict,
            &mut warnings,
        )?;

        validate_interval(
            &mut self.queues_interval,
            "refresh.queues_interval",
            MIN_REFRESH_INTERVAL,
            defaults.queues_interval,
            strict,
            &mut warnings,
        )?;

        if self.idle_slowdown {
            validate_interval(
                &mut self.idle_threshold,
                "refresh.idle_threshold",
                MIN_IDLE_THRESHOLD,
                defaults.idle_threshold,
                strict,
                &mut warnings,
            )?;
        }

        Ok(warnings)
    }
}

impl ConnectionConfig {
    /// Validate timeouts and the remote port.
    pub fn validate(&mut self, strict: bool) -> Result<Vec<String>> {
        let mut warnings = Vec::new();
        let defaults = Self::default();

        validate_interval(
            &mut self.request_timeout,
            "connection.request_timeout",
            1,
            defaults.request_timeout,
            strict,
            &mut warnings,
        )?;
        validate_interval(
            &mut self.connect_timeout,
            "connection.connect_timeout",
            1,
            defaults.connect_timeout,
            strict,
            &mut warnings,
        )?;

        if self.remote_port == 0 {
            let msg = "connection.remote_port must not be 0".to_string();
            if strict {
                return Err(Error::Config(msg));
            }
            warnings.push(format!("{msg} - using default ({})", defaults.remote_port));
            self.remote_port = defaults.remote_port;
        }

        Ok(warnings)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// View shown on startup ("jobs" or "queues")
    pub default_view: String,

    /// Theme name
    pub theme: String,

    /// Maximum length for job names before truncation
    pub job_name_max_length: usize,

    /// Start searches in deep mode (match any nested attribute)
    pub deep_search: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_view: "jobs".to_string(),
            theme: "dark".to_string(),
            job_name_max_length: 35,
            deep_search: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Ask the status service to shut down when jqmon exits
    pub shutdown_on_exit: bool,

    /// Enable clipboard support
    pub copy_to_clipboard: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            shutdown_on_exit: true,
            copy_to_clipboard: true,
        }
    }
}

impl JqmonConfig {
    /// Get the user config file path, respecting XDG_CONFIG_HOME
    ///
    /// Resolution order:
    /// 1. $XDG_CONFIG_HOME/jqmon/config.toml (if XDG_CONFIG_HOME is set)
    /// 2. $HOME/.config/jqmon/config.toml (if HOME is set)
    /// 3. dirs::config_dir()/jqmon/config.toml
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
            && !xdg_config.is_empty()
        {
            return Some(PathBuf::from(xdg_config).join("jqmon/config.toml"));
        }

        if let Some(home) = std::env::var_os("HOME") {
            return Some(PathBuf::from(home).join(".config/jqmon/config.toml"));
        }

        dirs::config_dir().map(|dir| dir.join("jqmon/config.toml"))
    }

    /// Load configuration from files and environment.
    /// Returns the config and any warnings encountered during loading.
    pub fn load() -> Result<(Self, Vec<String>)> {
        let mut paths = vec![PathBuf::from("/etc/jqmon/config.toml")];
        if let Some(user_path) = Self::user_config_path() {
            paths.push(user_path);
        }

        Self::load_from(&paths, Self::is_strict_mode(), |name| std::env::var(name).ok())
    }

    /// Load from an explicit list of files and an environment lookup.
    pub fn load_from(
        paths: &[PathBuf],
        strict: bool,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<(Self, Vec<String>)> {
        let mut config = Self::default();
        let mut warnings = Vec::new();

        for path in paths {
            Self::load_config_file(&mut config, path, strict, &mut warnings)?;
        }

        config.apply_env_overrides(strict, &env, &mut warnings)?;

        warnings.extend(config.refresh.validate(strict)?);
        warnings.extend(config.connection.validate(strict)?);

        Ok((config, warnings))
    }

    /// Check if strict config mode is enabled via JQMON_STRICT_CONFIG
    fn is_strict_mode() -> bool {
        std::env::var("JQMON_STRICT_CONFIG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Load a config file, collecting warnings on parse errors but not on missing files.
    fn load_config_file(
        config: &mut Self,
        path: &Path,
        strict: bool,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<JqmonConfig>(&content) {
                Ok(parsed) => {
                    tracing::debug!(path = %path.display(), "loaded config file");
                    config.merge(parsed);
                }
                Err(e) => {
                    let msg = format!("Config parse error in '{}': {}", path.display(), e);
                    if strict {
                        return Err(Error::Config(msg));
                    }
                    warnings.push(msg);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                let msg = format!("Could not read config '{}': {}", path.display(), e);
                if strict {
                    return Err(Error::Config(msg));
                }
                warnings.push(msg);
            }
        }
        Ok(())
    }

    fn merge(&mut self, other: JqmonConfig) {
        // Prefer other's ssh_path if set, otherwise keep current
        let ssh_path = other
            .connection
            .ssh_path
            .clone()
            .or_else(|| self.connection.ssh_path.take());
        self.connection = other.connection;
        self.connection.ssh_path = ssh_path;
        self.refresh = other.refresh;
        self.display = other.display;
        self.behavior = other.behavior;
    }

    fn apply_env_overrides(
        &mut self,
        strict: bool,
        env: &impl Fn(&str) -> Option<String>,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        if let Some(val) = env("JQMON_SSH_PATH")
            && !val.is_empty()
        {
            self.connection.ssh_path = Some(PathBuf::from(val));
        }

        if let Some(val) = env("JQMON_REMOTE_PORT") {
            match val.parse::<u16>() {
                Ok(port) if port > 0 => self.connection.remote_port = port,
                _ => report_env_error(strict, "JQMON_REMOTE_PORT", &val, "expected a port number", warnings)?,
            }
        }

        if let Some(val) = env("JQMON_LOCAL_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.connection.local_port = port,
                Err(_) => report_env_error(strict, "JQMON_LOCAL_PORT", &val, "expected a port number", warnings)?,
            }
        }

        if let Some(val) = env("JQMON_REMOTE_COMMAND")
            && !val.is_empty()
        {
            self.connection.remote_command = Some(val);
        }

        for (var, target) in [
            ("JQMON_REFRESH_JOBS", &mut self.refresh.jobs_interval),
            ("JQMON_REFRESH_QUEUES", &mut self.refresh.queues_interval),
        ] {
            if let Some(val) = env(var) {
                match val.parse::<u64>() {
                    Ok(secs) if secs >= MIN_REFRESH_INTERVAL => *target = secs,
                    Ok(_) => report_env_error(
                        strict,
                        var,
                        &val,
                        &format!("must be at least {} second(s)", MIN_REFRESH_INTERVAL),
                        warnings,
                    )?,
                    Err(_) => report_env_error(
                        strict,
                        var,
                        &val,
                        "expected a positive integer (seconds)",
                        warnings,
                    )?,
                }
            }
        }

        if let Some(val) = env("JQMON_DEFAULT_VIEW") {
            self.display.default_view = val;
        }
        if let Some(val) = env("JQMON_THEME") {
            self.display.theme = val;
        }
        if env("JQMON_NO_CLIPBOARD").is_some() {
            self.behavior.copy_to_clipboard = false;
        }

        Ok(())
    }
}

/// Report an environment variable error; fatal in strict mode.
fn report_env_error(
    strict: bool,
    var_name: &str,
    value: &str,
    reason: &str,
    warnings: &mut Vec<String>,
) -> Result<()> {
    let msg = format!("Invalid value '{}' for {}: {}", value, var_name, reason);
    if strict {
        return Err(Error::Config(msg));
    }
    warnings.push(format!("{msg} - using default"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = JqmonConfig::default();
        assert_eq!(config.connection.remote_port, 8765);
        assert_eq!(config.connection.local_port, 0);
        assert_eq!(config.refresh.jobs_interval, 5);
        assert_eq!(config.refresh.queues_interval, 10);
        assert!(config.behavior.shutdown_on_exit);
    }

    #[test]
    fn test_refresh_config_validate_valid_values() {
        let mut config = RefreshConfig::default();
        let warnings = config.validate(false).unwrap();
        assert!(warnings.is_empty(), "No warnings expected for valid config");
    }

    #[test]
    fn test_refresh_config_validate_zero_jobs_interval() {
        let mut config = RefreshConfig {
            jobs_interval: 0,
            ..RefreshConfig::default()
        };

        let warnings = config.validate(false).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("jobs_interval"));
        assert!(warnings[0].contains("at least 1"));
        assert_eq!(config.jobs_interval, RefreshConfig::default().jobs_interval);
    }

    #[test]
    fn test_refresh_config_idle_threshold_ignored_without_slowdown() {
        let mut config = RefreshConfig {
            idle_slowdown: false,
            idle_threshold: 0,
            ..RefreshConfig::default()
        };
        assert!(config.validate(false).unwrap().is_empty());
    }

    #[test]
    fn test_refresh_config_validate_strict_mode_error() {
        let mut config = RefreshConfig {
            queues_interval: 0,
            ..RefreshConfig::default()
        };

        let err = config.validate(true).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("queues_interval"));
    }

    #[test]
    fn test_connection_validate_zero_remote_port() {
        let mut config = ConnectionConfig {
            remote_port: 0,
            ..ConnectionConfig::default()
        };
        let warnings = config.validate(false).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.remote_port, 8765);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[connection]\nremote_port = 9000\nremote_command = \"status-server --port 9000\"\n\n[refresh]\njobs_interval = 2\n"
        )
        .unwrap();

        let (config, warnings) =
            JqmonConfig::load_from(&[file.path().to_path_buf()], false, no_env).unwrap();

        assert!(warnings.is_empty());
        assert_eq!(config.connection.remote_port, 9000);
        assert_eq!(
            config.connection.remote_command.as_deref(),
            Some("status-server --port 9000")
        );
        assert_eq!(config.refresh.jobs_interval, 2);
        assert_eq!(config.refresh.queues_interval, 10);
    }

    #[test]
    fn test_missing_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let (_, warnings) = JqmonConfig::load_from(&[path], false, no_env).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_parse_error_is_warning_or_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[refresh\njobs_interval = ").unwrap();
        let paths = [file.path().to_path_buf()];

        let (_, warnings) = JqmonConfig::load_from(&paths, false, no_env).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Config parse error"));

        assert!(JqmonConfig::load_from(&paths, true, no_env).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("JQMON_REMOTE_PORT", "9100"),
            ("JQMON_REFRESH_QUEUES", "30"),
            ("JQMON_THEME", "light"),
            ("JQMON_NO_CLIPBOARD", "1"),
        ]
        .into_iter()
        .collect();

        let (config, warnings) =
            JqmonConfig::load_from(&[], false, |k| env.get(k).map(|v| v.to_string())).unwrap();

        assert!(warnings.is_empty());
        assert_eq!(config.connection.remote_port, 9100);
        assert_eq!(config.refresh.queues_interval, 30);
        assert_eq!(config.display.theme, "light");
        assert!(!config.behavior.copy_to_clipboard);
    }

    #[test]
    fn test_invalid_env_value_warns() {
        let (config, warnings) = JqmonConfig::load_from(&[], false, |k| {
            (k == "JQMON_REFRESH_JOBS").then(|| "0".to_string())
        })
        .unwrap();

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("JQMON_REFRESH_JOBS"));
        assert_eq!(config.refresh.jobs_interval, 5);
    }
}
