use crate::constants::DEFAULT_DATABASE_NAME;
use crate::secret::Secret;
use serde::Deserialize;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

/// Resolved process configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub google: GoogleConfig,
    pub log: LogConfig,
}

/// Immutable, Arc-wrapped configuration built once at startup and shared by cloning.
///
/// No mutable access after construction.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl AppConfig {
    #[must_use]
    pub fn new(inner: AppConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Document store connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Engine endpoint, e.g. `ws://database:8000` or `mem://`.
    pub url: String,
    pub namespace: String,
    /// Database name; `test` when the `TEST` flag is set.
    pub name: String,
    pub credentials: Option<DatabaseCredentials>,
}

impl DatabaseConfig {
    /// The full connection target, `{url}/{name}`.
    #[must_use]
    pub fn target(&self) -> String {
        let url = match self.url.strip_suffix('/') {
            Some(base) if !base.ends_with(":/") => base,
            _ => self.url.as_str(),
        };
        format!("{url}/{}", self.name)
    }
}

/// Root credentials (optional for unauthenticated engines like `mem://`).
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: Secret,
}

/// Token signing settings consumed by the authentication layer.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: Secret,
}

/// Google OAuth client settings.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub client_secret: Secret,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level directive (`info`, `debug`, ...); `RUST_LOG` still applies on top.
    pub level: String,
    /// Rolling file output directory; console only when unset.
    pub dir: Option<PathBuf>,
    pub json: bool,
}

// --- Default ---

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "ws://database:8000".to_owned(),
            namespace: "planner".to_owned(),
            name: DEFAULT_DATABASE_NAME.to_owned(),
            credentials: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), dir: None, json: false }
    }
}
