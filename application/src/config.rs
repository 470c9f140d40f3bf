//! [`Config`]-related definitions.

use std::{path::PathBuf, time};

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use derive_more::{Display, Error};
use secrecy::SecretBox;
use serde::Deserialize;
use service::domain::account::{self, Account, Email, Name, Password};
use smart_default::SmartDefault;
use url::Url;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Authentication configuration.
    #[serde(default)]
    pub auth: Auth,

    /// Session storage configuration.
    #[serde(default)]
    pub storage: Storage,

    /// User directory configuration.
    #[serde(default)]
    pub directory: Directory,

    /// Log configuration.
    #[serde(default)]
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

impl TryFrom<&Config> for service::Config {
    type Error = InvalidConfig;

    fn try_from(config: &Config) -> Result<Self, Self::Error> {
        let Auth {
            email,
            password,
            account_id,
            name,
            reset_token,
            google,
            latency,
        } = &config.auth;

        Ok(Self {
            account: account(
                account_id,
                email,
                name,
                ["auth.email", "auth.name"],
            )?,
            password: SecretBox::new(Box::new(
                Password::new(password.as_str())
                    .ok_or(InvalidConfig("auth.password"))?,
            )),
            reset_token: reset_token.as_str().into(),
            google_account: account(
                &google.id,
                &google.email,
                &google.name,
                ["auth.google.email", "auth.google.name"],
            )?,
            latency: *latency,
            storage_key: config.storage.key.as_str().into(),
        })
    }
}

/// Builds an [`Account`] out of the configured values, reporting the
/// provided `keys` of its email and name on failure.
fn account(
    id: &str,
    email: &str,
    name: &str,
    keys: [&'static str; 2],
) -> Result<Account, InvalidConfig> {
    let [email_key, name_key] = keys;
    Ok(Account {
        id: account::Id::from(id),
        email: Email::new(email).ok_or(InvalidConfig(email_key))?,
        name: Name::new(name).ok_or(InvalidConfig(name_key))?,
    })
}

/// Error of a [`Config`] value failing validation.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid `{_0}` configuration value")]
pub struct InvalidConfig(#[error(not(source))] pub &'static str);

/// Authentication configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Auth {
    /// Email of the only account accepted by the sign-in form.
    #[default("admin@example.com".to_owned())]
    pub email: String,

    /// Password of the only account accepted by the sign-in form.
    #[default("admin123".to_owned())]
    pub password: String,

    /// ID of the account accepted by the sign-in form.
    #[default("1".to_owned())]
    pub account_id: String,

    /// Display name of the account accepted by the sign-in form.
    #[default("Admin User".to_owned())]
    pub name: String,

    /// The only password reset token considered valid.
    #[default("valid-token".to_owned())]
    pub reset_token: String,

    /// Account yielded by a Google sign-in.
    pub google: GoogleAccount,

    /// Simulated latency of authentication round trips.
    #[default(time::Duration::from_secs(1))]
    #[serde(with = "humantime_serde")]
    pub latency: time::Duration,
}

/// Mock Google account configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct GoogleAccount {
    /// ID of the account.
    #[default("google-user".to_owned())]
    pub id: String,

    /// Email of the account.
    #[default("user@gmail.com".to_owned())]
    pub email: String,

    /// Display name of the account.
    #[default("Google User".to_owned())]
    pub name: String,
}

/// Session storage configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Storage {
    /// Kind of the storage backend.
    pub backend: StorageBackend,

    /// Path to the session file of the [`StorageBackend::File`].
    #[default(PathBuf::from("session.json"))]
    pub path: PathBuf,

    /// Key the session is persisted under.
    #[default("user".to_owned())]
    pub key: String,
}

/// Kind of a session storage backend.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Session is kept in memory and forgotten on exit.
    Memory,

    /// Session is kept in a JSON file and survives restarts.
    #[default]
    File,
}

/// User directory configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Directory {
    /// URL responding with a JSON array of users.
    #[default(Url::parse("https://jsonplaceholder.typicode.com/users")
        .unwrap_or_else(|_| unreachable!("valid URL")))]
    pub url: Url,

    /// Timeout of a whole request.
    #[default(time::Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<Directory> for service::infra::directory::http::Config {
    fn from(value: Directory) -> Self {
        let Directory { url, timeout } = value;
        Self { url, timeout }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::{fs, time::Duration};

    use super::{Config, StorageBackend};

    #[test]
    fn falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let config = Config::new(path.to_str().unwrap()).unwrap();

        assert_eq!(config.auth.email, "admin@example.com");
        assert_eq!(config.auth.reset_token, "valid-token");
        assert_eq!(config.auth.latency, Duration::from_secs(1));
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.key, "user");
        assert_eq!(
            config.directory.url.as_str(),
            "https://jsonplaceholder.typicode.com/users",
        );
    }

    #[test]
    fn reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        fs::write(
            &path,
            r#"
                [auth]
                email = "owner@shop.test"
                latency = "250ms"

                [auth.google]
                name = "Shop Owner"

                [storage]
                backend = "memory"

                [log]
                level = "DEBUG"
            "#,
        )
        .unwrap();

        let config = Config::new(path.to_str().unwrap()).unwrap();

        assert_eq!(config.auth.email, "owner@shop.test");
        assert_eq!(config.auth.password, "admin123");
        assert_eq!(config.auth.latency, Duration::from_millis(250));
        assert_eq!(config.auth.google.name, "Shop Owner");
        assert_eq!(config.auth.google.email, "user@gmail.com");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(matches!(
            tracing::Level::from(config.log.level),
            tracing::Level::DEBUG,
        ));
    }

    #[test]
    fn converts_into_session_config() {
        let mut config = Config::default();

        let converted = service::Config::try_from(&config).unwrap();
        assert_eq!(converted.account.email.as_ref(), "admin@example.com");
        assert_eq!(converted.google_account.name.as_ref(), "Google User");
        assert_eq!(converted.storage_key.as_ref(), "user");

        config.auth.password = "123".to_owned();
        let err = service::Config::try_from(&config).unwrap_err();
        assert_eq!(err.to_string(), "invalid `auth.password` configuration value");

        config.auth.password = "admin123".to_owned();
        config.auth.google.email = "not an email".to_owned();
        let err = service::Config::try_from(&config).unwrap_err();
        assert_eq!(err.0, "auth.google.email");
    }
}
