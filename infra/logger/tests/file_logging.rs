use cplan_logger::{LevelFilter, Logger};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn json_file_logging_writes_structured_lines() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("cplan-file-logging")
        .console(false)
        .json(true)
        .path(&log_dir)
        .level(LevelFilter::INFO)
        .init()?;
    assert!(logger.guard().is_some());

    tracing::info!(plan_id = "plan:k2x9", "Plan created");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(&log_file)?;
    let line = contents.lines().find(|l| l.contains("Plan created")).expect("event logged");
    let parsed: serde_json::Value = serde_json::from_str(line)?;
    assert_eq!(parsed["fields"]["plan_id"], "plan:k2x9");

    Ok(())
}
