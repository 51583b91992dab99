//! # blog-config
//!
//! Layered settings for the server and the management CLI. Later layers win:
//!
//! 1. built-in defaults
//! 2. `config/default.toml` (optional)
//! 3. `config/local.toml` (optional, not committed)
//! 4. environment variables such as `BLOG__SERVER__PORT=9000`
//!
//! A `.env` file in the working directory is loaded into the environment
//! first.

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

const DEV_SESSION_SECRET: &str = "development-secret-change-in-production";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub media: MediaSettings,
    pub posts: PostSettings,
    pub cache: CacheSettings,
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    /// Directory uploads are written to.
    pub root: String,
    /// URL prefix `root` is served under.
    pub url_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostSettings {
    pub page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Lifetime of a cached index page, in seconds.
    pub index_ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    #[serde(deserialize_with = "deserialize_secret")]
    pub session_secret: SecretString,
    pub login_url: String,
    /// How long a signed session cookie stays valid, in seconds.
    pub session_max_age_secs: u64,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl Settings {
    /// Loads `.env`, then the layers rooted at `./config`.
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        Self::load_from(Path::new("config"))
    }

    pub fn load_from(config_dir: &Path) -> Result<Self, SettingsError> {
        let settings: Settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite://blog.db")?
            .set_default("media.root", "./media")?
            .set_default("media.url_prefix", "/media")?
            .set_default("posts.page_size", 10)?
            .set_default("cache.index_ttl_secs", 20)?
            .set_default("auth.session_secret", DEV_SESSION_SECRET)?
            .set_default("auth.login_url", "/auth/login/")?
            .set_default("auth.session_max_age_secs", 1_209_600)?
            .add_source(config::File::from(config_dir.join("default.toml")).required(false))
            .add_source(config::File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                config::Environment::with_prefix("BLOG")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.posts.page_size == 0 {
            return Err(SettingsError::Invalid {
                key: "posts.page_size",
                reason: "must be at least 1".into(),
            });
        }
        let secret = self.auth.session_secret.expose_secret();
        if secret.is_empty() {
            return Err(SettingsError::Invalid {
                key: "auth.session_secret",
                reason: "must not be empty".into(),
            });
        }
        if secret == DEV_SESSION_SECRET {
            log::warn!("using the development session secret; set BLOG__AUTH__SESSION_SECRET");
        }
        if self.auth.session_max_age_secs == 0 {
            return Err(SettingsError::Invalid {
                key: "auth.session_max_age_secs",
                reason: "must be at least 1".into(),
            });
        }
        if !self.auth.login_url.starts_with('/') {
            return Err(SettingsError::Invalid {
                key: "auth.login_url",
                reason: "must be an absolute path".into(),
            });
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(dir.path()).unwrap();
        assert_eq!(settings.posts.page_size, 10);
        assert_eq!(settings.cache.index_ttl_secs, 20);
        assert_eq!(settings.auth.login_url, "/auth/login/");
        assert_eq!(settings.media.url_prefix, "/media");
        assert_eq!(settings.auth.session_max_age_secs, 14 * 24 * 60 * 60);
    }

    #[test]
    fn test_local_file_overrides_default_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 9000\n\n[posts]\npage_size = 5\n",
        )
        .unwrap();
        fs::write(dir.path().join("local.toml"), "[posts]\npage_size = 3\n").unwrap();

        let settings = Settings::load_from(dir.path()).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.posts.page_size, 3);
    }

    #[test]
    fn test_zero_page_size_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("local.toml"), "[posts]\npage_size = 0\n").unwrap();

        let err = Settings::load_from(dir.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { key: "posts.page_size", .. }));
    }

    #[test]
    fn test_empty_secret_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("local.toml"), "[auth]\nsession_secret = \"\"\n").unwrap();

        let err = Settings::load_from(dir.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { key: "auth.session_secret", .. }));
    }

    #[test]
    fn test_zero_session_age_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("local.toml"), "[auth]\nsession_max_age_secs = 0\n").unwrap();

        let err = Settings::load_from(dir.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { key: "auth.session_max_age_secs", .. }));
    }
}
