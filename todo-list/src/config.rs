use axum_extra::extract::cookie::Key;
use serde::Deserialize;

/// Minimum length of `SECRET_KEY`, in bytes, before it is expanded into a cookie signing key.
pub const MIN_SECRET_KEY_LENGTH: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SECRET_KEY must be at least {min} bytes long, got {actual}")]
    SecretKeyTooShort { min: usize, actual: usize },
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub db_url: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub secret_key: String,
}

impl Config {
    /// Loads configuration from an optional `todo-list.toml` file, overridden by environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("todo-list").required(false))
            .add_source(config::Environment::default())
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.cookie_key()?;
        Ok(config)
    }

    /// Loads configuration from a single source.
    pub fn from_source<S>(source: S) -> anyhow::Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder().add_source(source).build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Address the web server binds to.
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Derives the key used to sign notice cookies from `secret_key`.
    pub fn cookie_key(&self) -> Result<Key, ConfigError> {
        let secret = self.secret_key.as_bytes();
        if secret.len() < MIN_SECRET_KEY_LENGTH {
            return Err(ConfigError::SecretKeyTooShort {
                min: MIN_SECRET_KEY_LENGTH,
                actual: secret.len(),
            });
        }
        Ok(Key::derive_from(secret))
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}
