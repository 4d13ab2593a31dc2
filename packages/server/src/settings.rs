use std::net::SocketAddr;
use std::sync::Arc;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use store::{FileStore, MemoryStore, RecordStore};

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
    /// Prefix all routes are nested under, e.g. `/api`. Empty serves them at the root.
    pub base_path: String,
}

impl Server {
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// `base_path` as `/segment[/segment]`, or `None` for the root.
    pub fn nest_path(&self) -> Option<String> {
        let trimmed = self.base_path.trim().trim_matches('/');
        (!trimmed.is_empty()).then(|| format!("/{trimmed}"))
    }
}

#[derive(Deserialize)]
pub struct Auth {
    pub anon_key: String,
    pub token_ttl_hours: i64,
}

impl Auth {
    /// Accepted range of `token_ttl_hours`: one hour to one year.
    pub const TOKEN_TTL_HOURS: std::ops::RangeInclusive<i64> = 1..=24 * 365;

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }
}

// The anonymous key stays out of the logs.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("anon_key", &if self.anon_key.is_empty() { "<unset>" } else { "<set>" })
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    File,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    pub backend: Backend,
    /// Directory of the file backend.
    pub path: String,
}

impl Storage {
    pub fn open(&self) -> Arc<dyn RecordStore> {
        match self.backend {
            Backend::Memory => Arc::new(MemoryStore::new()),
            Backend::File => Arc::new(FileStore::new(&self.path)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub auth: Auth,
    pub storage: Storage,
}

impl Settings {
    /// Defaults, then `config.toml` if present, then `RATINGS__*` environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load("config.toml", Environment::with_prefix("RATINGS"))
    }

    pub(crate) fn load(file: &str, env: Environment) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.base_path", "")?
            .set_default("auth.anon_key", "")?
            .set_default("auth.token_ttl_hours", 24 * 7)?
            .set_default("storage.backend", "memory")?
            .set_default("storage.path", "data")?
            .add_source(
                File::with_name(file)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(env.prefix_separator("__").separator("__").try_parsing(true))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !Auth::TOKEN_TTL_HOURS.contains(&self.auth.token_ttl_hours) {
            return Err(ConfigError::Message(format!(
                "auth.token_ttl_hours must be between {} and {}, got {}",
                Auth::TOKEN_TTL_HOURS.start(),
                Auth::TOKEN_TTL_HOURS.end(),
                self.auth.token_ttl_hours
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("RATINGS").source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load("does-not-exist.toml", env(&[])).unwrap();
        assert_eq!(settings.server.addr().unwrap().port(), 8000);
        assert_eq!(settings.server.nest_path(), None);
        assert_eq!(settings.auth.token_ttl(), chrono::Duration::hours(168));
        assert_eq!(settings.storage.backend, Backend::Memory);
    }

    #[test]
    fn test_environment_overrides() {
        let settings = Settings::load(
            "does-not-exist.toml",
            env(&[
                ("RATINGS__SERVER__PORT", "9100"),
                ("RATINGS__SERVER__BASE_PATH", "/make-server/"),
                ("RATINGS__AUTH__ANON_KEY", "public-key"),
                ("RATINGS__STORAGE__BACKEND", "file"),
            ]),
        )
        .unwrap();
        println!("Settings = {:?}", settings);

        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.nest_path().as_deref(), Some("/make-server"));
        assert_eq!(settings.auth.anon_key, "public-key");
        assert_eq!(settings.storage.backend, Backend::File);
        assert!(!format!("{:?}", settings).contains("public-key"));
    }

    #[test]
    fn test_token_ttl_out_of_range() {
        for hours in ["0", "-5", "8760000000000000"] {
            let err = Settings::load(
                "does-not-exist.toml",
                env(&[("RATINGS__AUTH__TOKEN_TTL_HOURS", hours)]),
            )
            .unwrap_err();
            assert!(err.to_string().contains("token_ttl_hours"), "{hours}: {err}");
        }

        let settings = Settings::load(
            "does-not-exist.toml",
            env(&[("RATINGS__AUTH__TOKEN_TTL_HOURS", "8760")]),
        )
        .unwrap();
        assert_eq!(settings.auth.token_ttl(), chrono::Duration::days(365));
    }
}
