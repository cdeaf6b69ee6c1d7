use anyhow::Context;
use cplan_kernel::config::ConfigProvider;
use cplan_logger::{LevelFilter, Logger};
use cplan_server::Server;

/// Optional configuration file layered under the environment.
const CONFIG_FILE_VAR: &str = "CPLAN_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let provider = match std::env::var(CONFIG_FILE_VAR) {
        Ok(path) if !path.is_empty() => ConfigProvider::new().file(path),
        _ => ConfigProvider::new(),
    };
    let cfg = provider.load().context("Critical: Configuration is incomplete or malformed")?;

    let level = cfg
        .log
        .level
        .parse::<LevelFilter>()
        .with_context(|| format!("Invalid log level '{}'", cfg.log.level))?;
    let mut logger =
        Logger::builder().name(env!("CARGO_PKG_NAME")).level(level).json(cfg.log.json);
    if let Some(dir) = &cfg.log.dir {
        logger = logger.path(dir);
    }
    let _log = logger.init()?;

    Server::builder().config(cfg).build().await?.run().await
}
