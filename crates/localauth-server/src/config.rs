//! Server configuration.
//!
//! Layered with figment: built-in defaults, then an optional
//! `localauth.toml`, then `LOCALAUTH_`-prefixed environment variables.
//! Nested keys use a double underscore, e.g. `LOCALAUTH_AUTH__PEPPER`.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use localauth_auth::AuthConfig;
use localauth_db::DbConfig;
use serde::{Deserialize, Serialize};

/// Default config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "localauth.toml";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `main.sqlite` and every `app_<id>.sqlite`.
    pub data_dir: PathBuf,
    pub log_format: LogFormat,
    /// Allow any origin. The service is meant for local development.
    pub cors_permissive: bool,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3001,
            data_dir: PathBuf::from("./data"),
            log_format: LogFormat::default(),
            cors_permissive: true,
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from [`CONFIG_FILE`] and the environment.
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::figment(CONFIG_FILE).extract()?;
        Ok(config)
    }

    /// The provider stack, with the TOML layer read from `path` if it
    /// exists.
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("LOCALAUTH_").split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.data_dir)
    }
}
