//! Profile configuration for dizqueTV clients.
//!
//! TOML profiles merged over built-in defaults and `DIZQUE_` environment
//! variables, and translation to `dizque_core::ClientConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dizque_core::{ClientConfig, ErrorHandling, TlsMode};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{name}'")]
    UnknownProfile { name: String },

    #[error("no profile selected and no default_profile configured")]
    NoProfile,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Timeout for the full channel listing, in seconds.
    #[serde(default = "default_channels_timeout")]
    pub channels_timeout: u64,

    /// Log at `info` rather than `error` when `RUST_LOG` is unset.
    #[serde(default)]
    pub verbose: bool,

    /// Repair conflicting channel creation requests instead of rejecting them.
    #[serde(default)]
    pub lenient: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            channels_timeout: default_channels_timeout(),
            verbose: false,
            lenient: false,
        }
    }
}

fn default_timeout() -> u64 {
    2
}
fn default_channels_timeout() -> u64 {
    5
}

/// A named dizqueTV server.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g., "http://localhost:8000").
    pub url: String,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid TLS certificates.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override channel listing timeout.
    pub channels_timeout: Option<u64>,

    /// Override error handling mode.
    pub lenient: Option<bool>,

    /// Override log verbosity.
    pub verbose: Option<bool>,
}

impl Profile {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ca_cert: None,
            insecure: None,
            timeout: None,
            channels_timeout: None,
            lenient: None,
            verbose: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("tv", "dizque", "dizquetv").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("dizquetv");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
///
/// Environment overrides use `__` between levels, e.g.
/// `DIZQUE_DEFAULTS__LENIENT=true`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DIZQUE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

impl Config {
    /// Look up `name`, or the default profile when `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .ok_or(ConfigError::NoProfile)?;
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }

    /// Effective log verbosity for a profile.
    pub fn verbose(&self, name: Option<&str>) -> Result<bool, ConfigError> {
        let (_, profile) = self.profile(name)?;
        Ok(profile.verbose.unwrap_or(self.defaults.verbose))
    }

    /// Install the tracing subscriber at the profile's verbosity. Returns
    /// `false` if a subscriber was already installed.
    pub fn init_logging(&self, name: Option<&str>) -> Result<bool, ConfigError> {
        Ok(dizque_core::logging::init_tracing(self.verbose(name)?))
    }

    /// Build a `ClientConfig` for a profile, applying global defaults to
    /// anything the profile leaves unset.
    pub fn profile_to_client_config(&self, name: Option<&str>) -> Result<ClientConfig, ConfigError> {
        let (_, profile) = self.profile(name)?;

        let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
            field: "url".into(),
            reason: format!("invalid URL: {}", profile.url),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "url".into(),
                reason: format!("expected an http(s) URL, got '{}'", profile.url),
            });
        }

        let tls = if profile.insecure.unwrap_or(false) {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = profile.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };

        let error_handling = if profile.lenient.unwrap_or(self.defaults.lenient) {
            ErrorHandling::Lenient
        } else {
            ErrorHandling::Strict
        };

        Ok(ClientConfig {
            url,
            tls,
            timeout: Duration::from_secs(profile.timeout.unwrap_or(self.defaults.timeout)),
            channels_timeout: Duration::from_secs(
                profile
                    .channels_timeout
                    .unwrap_or(self.defaults.channels_timeout),
            ),
            error_handling,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, body).expect("write config");
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_config_from(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 2);
        assert_eq!(cfg.defaults.channels_timeout, 5);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn profile_overrides_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            dir.path(),
            r#"
default_profile = "home"

[defaults]
timeout = 3
lenient = true

[profiles.home]
url = "http://tv.local:8000"
channels_timeout = 30

[profiles.strict]
url = "https://tv.example.com"
lenient = false
"#,
        );
        let cfg = load_config_from(&path).expect("load");

        let home = cfg.profile_to_client_config(None).expect("home");
        assert_eq!(home.url.as_str(), "http://tv.local:8000/");
        assert_eq!(home.timeout, Duration::from_secs(3));
        assert_eq!(home.channels_timeout, Duration::from_secs(30));
        assert_eq!(home.error_handling, ErrorHandling::Lenient);
        assert!(matches!(home.tls, TlsMode::System));

        let strict = cfg.profile_to_client_config(Some("strict")).expect("strict");
        assert_eq!(strict.error_handling, ErrorHandling::Strict);
    }

    #[test]
    fn invalid_url_is_a_validation_error() {
        let mut cfg = Config::default();
        cfg.profiles.insert("default".into(), Profile::new("not a url"));
        match cfg.profile_to_client_config(None) {
            Err(ConfigError::Validation { field, .. }) => assert_eq!(field, "url"),
            other => panic!("expected Validation, got {other:?}"),
        }

        cfg.profiles
            .insert("default".into(), Profile::new("ftp://tv.local"));
        assert!(matches!(
            cfg.profile_to_client_config(None),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn unknown_profile() {
        let cfg = Config::default();
        match cfg.profile_to_client_config(Some("nope")) {
            Err(ConfigError::UnknownProfile { name }) => assert_eq!(name, "nope"),
            other => panic!("expected UnknownProfile, got {other:?}"),
        }
    }

    #[test]
    fn insecure_wins_over_ca_cert() {
        let mut cfg = Config::default();
        let mut profile = Profile::new("https://tv.local");
        profile.ca_cert = Some(PathBuf::from("/etc/ca.pem"));
        profile.insecure = Some(true);
        cfg.profiles.insert("default".into(), profile);

        let client = cfg.profile_to_client_config(None).expect("config");
        assert!(matches!(client.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn verbose_follows_defaults_unless_profile_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            dir.path(),
            r#"
default_profile = "home"

[defaults]
verbose = true

[profiles.home]
url = "http://tv.local:8000"

[profiles.quiet]
url = "http://tv.local:8000"
verbose = false
"#,
        );
        let cfg = load_config_from(&path).expect("load");

        assert!(cfg.verbose(None).expect("home"));
        assert!(!cfg.verbose(Some("quiet")).expect("quiet"));
        assert!(matches!(
            cfg.verbose(Some("nope")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn init_logging_resolves_the_profile() {
        let mut cfg = Config::default();
        cfg.profiles
            .insert("default".into(), Profile::new("http://tv.local:8000"));

        cfg.init_logging(None).expect("installed or already present");
        assert!(!cfg.init_logging(None).expect("second call"));
        assert!(matches!(
            cfg.init_logging(Some("nope")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.defaults.verbose = true;
        cfg.profiles
            .insert("default".into(), Profile::new("http://tv.local:8000"));
        save_config_to(&cfg, &path).expect("save");

        let loaded = load_config_from(&path).expect("load");
        assert!(loaded.defaults.verbose);
        assert_eq!(loaded.profiles["default"].url, "http://tv.local:8000");
    }
}
