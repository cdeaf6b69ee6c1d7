//! Layered configuration loading.
//!
//! [`ConfigProvider`] resolves the process [`AppConfig`] once at startup:
//!
//! 1. built-in defaults;
//! 2. an optional file (`toml`, `json`, `yaml`, picked by extension);
//! 3. `CPLAN__SECTION__KEY` overrides (e.g. `CPLAN__DATABASE__URL`);
//! 4. the deployment variables `TEST`, `JWT_SECRET` and `GOOGLE_CLIENT_SECRET`.
//!
//! Missing secrets fail the load instead of producing an empty configuration.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use cplan_domain::config::AppConfig;
use cplan_domain::constants::TEST_DATABASE_NAME;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix of structured environment overrides.
pub const ENV_PREFIX: &str = "CPLAN";
/// Selects the test database when set to a non-empty value.
pub const TEST_VAR: &str = "TEST";
/// Token signing secret.
pub const JWT_SECRET_VAR: &str = "JWT_SECRET";
/// Google OAuth client secret.
pub const GOOGLE_CLIENT_SECRET_VAR: &str = "GOOGLE_CLIENT_SECRET";

/// Custom error type for config loading.
#[cplan_derive::planner_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    /// A required setting resolved to nothing (or only whitespace).
    #[error("Missing required setting `{key}` (set {variable}){}", format_context(.context))]
    Missing { key: &'static str, variable: &'static str, context: Option<Cow<'static, str>> },
}

/// Where variables are read from.
#[derive(Debug, Clone)]
enum Vars {
    Process,
    Fixed(HashMap<String, String>),
}

impl Vars {
    /// A variable counts as set only when it is non-empty.
    fn get(&self, name: &str) -> Option<String> {
        let value = match self {
            Self::Process => std::env::var(name).ok(),
            Self::Fixed(map) => map.get(name).cloned(),
        };
        value.filter(|v| !v.is_empty())
    }

    fn environment(&self) -> Environment {
        let env = Environment::with_prefix(ENV_PREFIX).separator("__");
        match self {
            Self::Process => env,
            Self::Fixed(map) => {
                env.source(Some(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()))
            }
        }
    }
}

/// Builds the immutable [`AppConfig`] from the environment.
///
/// # Example
/// ```rust
/// use cplan_kernel::config::ConfigProvider;
/// use std::collections::HashMap;
///
/// let vars = HashMap::from([
///     ("TEST".to_owned(), "1".to_owned()),
///     ("JWT_SECRET".to_owned(), "signing-key".to_owned()),
///     ("GOOGLE_CLIENT_SECRET".to_owned(), "oauth-secret".to_owned()),
/// ]);
/// let cfg = ConfigProvider::with_vars(vars).load().unwrap();
/// assert!(cfg.database.target().ends_with("test"));
/// ```
#[must_use = "providers do nothing unless you call .load()"]
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    vars: Vars,
    file: Option<PathBuf>,
}

impl Default for ConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigProvider {
    /// Reads the process environment.
    pub const fn new() -> Self {
        Self { vars: Vars::Process, file: None }
    }

    /// Reads only the given variables; the process environment is ignored.
    pub const fn with_vars(vars: HashMap<String, String>) -> Self {
        Self { vars: Vars::Fixed(vars), file: None }
    }

    /// Layers a configuration file under the environment. A missing file is an error.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Resolves and validates the configuration.
    ///
    /// # Errors
    /// * [`ConfigError::Config`] if the file is unreadable or a value has the wrong shape.
    /// * [`ConfigError::Missing`] if the token signing secret or the OAuth client secret
    ///   is absent or blank.
    pub fn load(self) -> Result<AppConfig, ConfigError> {
        let test_mode = self.vars.get(TEST_VAR).is_some();

        let builder = layered(Config::builder(), self.file.as_deref(), self.vars.environment())
            .set_override_option("jwt.secret", self.vars.get(JWT_SECRET_VAR))
            .context("Applying JWT_SECRET")?
            .set_override_option("google.client_secret", self.vars.get(GOOGLE_CLIENT_SECRET_VAR))
            .context("Applying GOOGLE_CLIENT_SECRET")?;
        let builder = if test_mode {
            builder
                .set_override("database.name", TEST_DATABASE_NAME)
                .context("Selecting test database")?
        } else {
            builder
        };

        let config = builder
            .build()
            .context("Failed to build config")?
            .try_deserialize::<AppConfig>()
            .context("Failed to deserialize config")?;

        validate(&config)?;

        info!(
            namespace = %config.database.namespace,
            database = %config.database.name,
            test_mode,
            "Configuration loaded"
        );
        Ok(config)
    }
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.jwt.secret.is_blank() {
        return Err(ConfigError::Missing {
            key: "jwt.secret",
            variable: JWT_SECRET_VAR,
            context: None,
        });
    }
    if config.google.client_secret.is_blank() {
        return Err(ConfigError::Missing {
            key: "google.client_secret",
            variable: GOOGLE_CLIENT_SECRET_VAR,
            context: None,
        });
    }
    Ok(())
}

fn layered(
    builder: ConfigBuilder<DefaultState>,
    file: Option<&Path>,
    env: Environment,
) -> ConfigBuilder<DefaultState> {
    let builder = match file {
        Some(path) => {
            debug!("Loading config file {}", path.display());
            builder.add_source(File::from(path).required(true))
        }
        None => builder,
    };
    builder.add_source(env)
}

/// A reusable loader that combines a file with `CPLAN__` environment overrides.
///
/// Nested keys use double underscores (`CPLAN__DATABASE__URL` maps to `database.url`).
/// Unlike [`ConfigProvider`] it knows nothing about the deployment variables and performs
/// no validation, so it suits auxiliary structures.
///
/// # Errors
/// Returns an error if the file cannot be found or the content does not match `T`.
///
/// # Example
/// ```rust
/// use cplan_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct SeedConfig {
///     plans: u32,
/// }
///
/// let cfg: SeedConfig = load_config("config/seed").unwrap_or_default();
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();
    info!("Loading config from {}", path.display());

    layered(Config::builder(), Some(path), Vars::Process.environment())
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}
