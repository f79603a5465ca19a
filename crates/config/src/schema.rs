use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_true() -> bool {
    true
}

fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_timeout() -> u64 {
    30
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// A required field is absent or empty.
    #[error("missing required configuration field: {0}")]
    Missing(&'static str),
}

/// Connection settings for the external identity store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the identity service (e.g. `https://thunder.internal`).
    #[serde(default)]
    pub endpoint: String,
    /// Gateway's own key for the identity service (HTTP basic user).
    #[serde(default)]
    pub user_key: String,
    /// Gateway's own secret for the identity service (HTTP basic password).
    #[serde(default)]
    pub user_secret: String,
}

fn default_graph_url() -> String {
    "https://graph.facebook.com/v2.10".to_string()
}
fn default_dialog_url() -> String {
    "https://www.facebook.com/v2.10/dialog/oauth".to_string()
}
fn default_scopes() -> Vec<String> {
    ["user_photos", "user_videos", "user_posts", "user_actions.video", "publish_actions"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Application credentials and endpoints for the bearer provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacebookConfig {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub app_secret: String,
    /// Versioned Graph API base URL.
    #[serde(default = "default_graph_url")]
    pub graph_url: String,
    /// Login dialog URL presented to new users.
    #[serde(default = "default_dialog_url")]
    pub dialog_url: String,
    /// Permissions requested by the login dialog.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

impl Default for FacebookConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            graph_url: default_graph_url(),
            dialog_url: default_dialog_url(),
            scopes: default_scopes(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.twitter.com".to_string()
}
fn default_upload_url() -> String {
    "https://upload.twitter.com".to_string()
}

/// Consumer credentials and endpoints for the three-legged provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    #[serde(default)]
    pub app_key: String,
    #[serde(default)]
    pub app_secret: String,
    /// API host serving `/oauth/*` and `/1.1/*`.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Media upload host.
    #[serde(default = "default_upload_url")]
    pub upload_url: String,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            app_secret: String::new(),
            api_url: default_api_url(),
            upload_url: default_upload_url(),
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive (overridden by `RUST_LOG`).
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Write logs to a daily-rolling file at this path instead of stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listen port (defaults to 8080).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Listen address (defaults to `127.0.0.1`).
    #[serde(default = "default_host")]
    pub host: String,
    /// Timeout applied to every outbound provider and store request.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Optional outbound HTTP proxy.
    #[serde(default)]
    pub proxy_url: Option<String>,
    /// Serialize concurrent credential refreshes for the same identity.
    #[serde(default = "default_true")]
    pub serialize_refreshes: bool,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub facebook: FacebookConfig,
    #[serde(default)]
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            request_timeout_secs: default_timeout(),
            proxy_url: None,
            serialize_refreshes: true,
            store: StoreConfig::default(),
            facebook: FacebookConfig::default(),
            twitter: TwitterConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Prefix of environment variables merged over the file configuration.
pub const ENV_PREFIX: &str = "CREDGATE_";

impl Config {
    /// Parses configuration from a YAML string, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .extract()
    }

    /// Loads configuration from a file path, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &Path) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .extract()
    }

    /// Loads defaults, then the optional YAML file, then `CREDGATE_*`
    /// environment variables (`__` separates nested keys), and validates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] on parse failure and
    /// [`ConfigError::Missing`] if a required field is empty.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        use figment::{
            Figment,
            providers::{Env, Format as _, Serialized, Yaml},
        };
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations missing any credential the gateway needs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first empty field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("store.endpoint", &self.store.endpoint),
            ("store.user_key", &self.store.user_key),
            ("store.user_secret", &self.store.user_secret),
            ("facebook.app_id", &self.facebook.app_id),
            ("facebook.app_secret", &self.facebook.app_secret),
            ("twitter.app_key", &self.twitter.app_key),
            ("twitter.app_secret", &self.twitter.app_secret),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(field));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r#"
port: 9000
host: "0.0.0.0"
store:
  endpoint: "http://thunder.local"
  user_key: "lightning"
  user_secret: "s3cret"
facebook:
  app_id: "fb-app"
  app_secret: "fb-secret"
twitter:
  app_key: "tw-key"
  app_secret: "tw-secret"
  api_url: "http://127.0.0.1:9999"
log:
  level: debug
  format: json
"#;

    #[test]
    fn test_default_config() {
        let c = Config::default();
        assert_eq!(c.port, 8080);
        assert_eq!(c.host, "127.0.0.1");
        assert!(c.serialize_refreshes);
        assert_eq!(c.log.format, LogFormat::Text);
        assert!(c.facebook.graph_url.starts_with("https://graph.facebook.com"));
    }

    #[test]
    fn test_from_yaml_sections() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(c.port, 9000);
        assert_eq!(c.store.endpoint, "http://thunder.local");
        assert_eq!(c.facebook.app_id, "fb-app");
        assert_eq!(c.twitter.api_url, "http://127.0.0.1:9999");
        assert_eq!(c.log.format, LogFormat::Json);
        assert_eq!(c.log.level, "debug");
    }

    #[test]
    fn test_from_yaml_defaults_applied() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(c.twitter.upload_url, "https://upload.twitter.com");
        assert_eq!(c.request_timeout_secs, 30);
        assert!(c.facebook.scopes.iter().any(|s| s == "user_photos"));
    }

    #[test]
    fn test_validate_sample_ok() {
        assert!(Config::from_yaml(SAMPLE_YAML).unwrap().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("store.endpoint")));

        let mut c = Config::from_yaml(SAMPLE_YAML).unwrap();
        c.twitter.app_secret = "  ".into();
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("twitter.app_secret"));
    }

    #[test]
    fn test_from_file() {
        use std::io::Write as _;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_YAML.as_bytes()).unwrap();
        let c = Config::from_file(file.path()).unwrap();
        assert_eq!(c.host, "0.0.0.0");
    }

    #[test]
    fn test_load_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("credgate.yaml", SAMPLE_YAML)?;
            jail.set_env("CREDGATE_PORT", "7777");
            jail.set_env("CREDGATE_STORE__ENDPOINT", "http://other-store");
            let c = Config::load(Some(Path::new("credgate.yaml")))
                .map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(c.port, 7777);
            assert_eq!(c.store.endpoint, "http://other-store");
            assert_eq!(c.facebook.app_id, "fb-app");
            Ok(())
        });
    }

    #[test]
    fn test_load_without_file_fails_validation() {
        figment::Jail::expect_with(|_jail| {
            let err = Config::load(None).unwrap_err();
            assert!(matches!(err, ConfigError::Missing(_)));
            Ok(())
        });
    }
}
