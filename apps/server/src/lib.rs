//! # Course Planner Server
//!
//! Process bootstrap for the course planner backend: opens the database, applies the
//! schema of every feature slice and keeps the slices alive until shutdown.
//!
//! ## Example
//! ```no_run
//! use cplan_kernel::config::ConfigProvider;
//! use cplan_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cfg = ConfigProvider::new().load()?;
//!     Server::builder().config(cfg).build().await?.run().await
//! }
//! ```

use anyhow::{Context, Result};
use cplan_database::Database;
use cplan_domain::config::AppConfig;
use cplan_plans::Plans;
use tokio::signal;
use tracing::info;

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: AppConfig,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: AppConfig) -> Self {
        self.cfg = cfg;
        self
    }

    async fn init_database(&self) -> Result<Database> {
        let db_cfg = &self.cfg.database;
        let mut builder = Database::builder()
            .url(&db_cfg.url)
            .session(&db_cfg.namespace, &db_cfg.name)
            .migrations(cplan_plans::MIGRATIONS);

        if let Some(creds) = &db_cfg.credentials {
            builder = builder.auth(&creds.username, creds.password.expose());
        }

        builder.init().await.context("Failed to establish database connection")
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Establishes the database connection and applies slice migrations
    /// 2. Initializes the feature slices over the shared connection
    ///
    /// # Errors
    /// Returns an error if the database is unreachable, rejects the credentials or a
    /// migration fails.
    pub async fn build(self) -> Result<Server> {
        let db_cfg = &self.cfg.database;
        info!(namespace = %db_cfg.namespace, database = %db_cfg.name, "Initializing server");

        let db = self.init_database().await?;
        let plans = cplan_plans::init(db.clone());

        Ok(Server { cfg: self.cfg, db, plans })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    cfg: AppConfig,
    db: Database,
    plans: Plans,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Runs until the shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if the signal handlers cannot be installed.
    pub async fn run(self) -> Result<()> {
        info!(
            namespace = self.db.namespace(),
            database = self.db.name(),
            "Server running"
        );

        shutdown_signal().await?;
        info!("Shutdown signal received, server shutdown complete");
        Ok(())
    }

    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.cfg
    }

    #[must_use]
    pub const fn plans(&self) -> &Plans {
        &self.plans
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
