use cplan_kernel::config::{ConfigError, ConfigProvider, load_config};
use serial_test::serial;
use std::collections::HashMap;
use std::io::Write;

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

const SECRETS: [(&str, &str); 2] =
    [("JWT_SECRET", "signing-key"), ("GOOGLE_CLIENT_SECRET", "oauth-secret")];

#[test]
fn test_flag_selects_test_database() {
    let mut pairs = SECRETS.to_vec();
    pairs.push(("TEST", "true"));

    let cfg = ConfigProvider::with_vars(vars(&pairs)).load().expect("config loads");
    assert_eq!(cfg.database.name, "test");
    assert!(cfg.database.target().ends_with("test"));
}

#[test]
fn without_test_flag_uses_course_planner() {
    let cfg = ConfigProvider::with_vars(vars(&SECRETS)).load().expect("config loads");
    assert!(cfg.database.target().ends_with("course-planner"));
    assert_eq!(cfg.jwt.secret.expose(), "signing-key");
    assert_eq!(cfg.google.client_secret.expose(), "oauth-secret");
}

#[test]
fn empty_test_flag_is_not_test_mode() {
    let mut pairs = SECRETS.to_vec();
    pairs.push(("TEST", ""));

    let cfg = ConfigProvider::with_vars(vars(&pairs)).load().expect("config loads");
    assert!(cfg.database.target().ends_with("course-planner"));
}

#[test]
fn missing_jwt_secret_fails_fast() {
    let err = ConfigProvider::with_vars(vars(&[("GOOGLE_CLIENT_SECRET", "oauth-secret")]))
        .load()
        .expect_err("JWT_SECRET is required");
    assert!(matches!(err, ConfigError::Missing { variable: "JWT_SECRET", .. }));
}

#[test]
fn missing_google_secret_fails_fast() {
    let err = ConfigProvider::with_vars(vars(&[("JWT_SECRET", "signing-key")]))
        .load()
        .expect_err("GOOGLE_CLIENT_SECRET is required");
    assert!(matches!(err, ConfigError::Missing { variable: "GOOGLE_CLIENT_SECRET", .. }));
}

#[test]
fn nothing_set_fails_on_the_first_secret() {
    let err = ConfigProvider::with_vars(HashMap::new()).load().expect_err("secrets are required");
    assert!(matches!(err, ConfigError::Missing { key: "jwt.secret", .. }));
}

#[test]
fn blank_secret_is_missing() {
    let err = ConfigProvider::with_vars(vars(&[
        ("JWT_SECRET", "   "),
        ("GOOGLE_CLIENT_SECRET", "oauth-secret"),
    ]))
    .load()
    .expect_err("blank secret");
    assert_eq!(err.kind(), "missing");
}

#[test]
fn prefixed_overrides_reach_nested_sections() {
    let mut pairs = SECRETS.to_vec();
    pairs.push(("CPLAN__DATABASE__URL", "mem://"));
    pairs.push(("CPLAN__LOG__JSON", "true"));

    let cfg = ConfigProvider::with_vars(vars(&pairs)).load().expect("config loads");
    assert_eq!(cfg.database.url, "mem://");
    assert!(cfg.log.json);
    assert_eq!(cfg.database.target(), "mem:///course-planner");
}

#[test]
fn digit_only_overrides_stay_strings() {
    let pairs = vars(&[
        ("CPLAN__JWT__SECRET", "12345"),
        ("GOOGLE_CLIENT_SECRET", "oauth-secret"),
        ("CPLAN__DATABASE__NAME", "2024"),
        ("CPLAN__DATABASE__CREDENTIALS__USERNAME", "root"),
        ("CPLAN__DATABASE__CREDENTIALS__PASSWORD", "123456"),
    ]);

    let cfg = ConfigProvider::with_vars(pairs).load().expect("config loads");
    assert_eq!(cfg.jwt.secret.expose(), "12345");
    assert_eq!(cfg.database.name, "2024");
    let creds = cfg.database.credentials.as_ref().expect("credentials set");
    assert_eq!(creds.password.expose(), "123456");
}

#[test]
fn test_flag_wins_over_configured_name() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("planner.toml");
    let mut file = std::fs::File::create(&path)?;
    writeln!(file, "[database]\nurl = \"ws://db.internal:8000\"\nname = \"staging\"")?;

    let mut pairs = SECRETS.to_vec();
    pairs.push(("TEST", "1"));
    let cfg = ConfigProvider::with_vars(vars(&pairs)).file(&path).load()?;
    assert_eq!(cfg.database.url, "ws://db.internal:8000");
    assert_eq!(cfg.database.target(), "ws://db.internal:8000/test");

    let cfg = ConfigProvider::with_vars(vars(&SECRETS)).file(&path).load()?;
    assert_eq!(cfg.database.target(), "ws://db.internal:8000/staging");
    Ok(())
}

#[test]
fn secrets_can_come_from_the_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("planner.toml");
    std::fs::write(
        &path,
        "[jwt]\nsecret = \"from-file\"\n[google]\nclient_secret = \"file-oauth\"\n",
    )?;

    let cfg = ConfigProvider::with_vars(HashMap::new()).file(&path).load()?;
    assert_eq!(cfg.jwt.secret.expose(), "from-file");

    let cfg = ConfigProvider::with_vars(vars(&[("JWT_SECRET", "from-env")])).file(&path).load()?;
    assert_eq!(cfg.jwt.secret.expose(), "from-env");
    Ok(())
}

#[test]
fn missing_file_is_a_config_error() {
    let err = ConfigProvider::with_vars(vars(&SECRETS))
        .file("/definitely/not/here.toml")
        .load()
        .expect_err("file is required once named");
    assert!(matches!(err, ConfigError::Config { .. }));
}

#[derive(Debug, Default, serde::Deserialize)]
struct SeedConfig {
    plans: u32,
    owner: String,
}

#[test]
#[serial]
fn load_config_reads_arbitrary_structures() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("seed.json");
    std::fs::write(&path, r#"{ "plans": 3, "owner": "user:seed" }"#)?;

    let seed: SeedConfig = load_config(&path)?;
    assert_eq!(seed.plans, 3);
    assert_eq!(seed.owner, "user:seed");
    Ok(())
}
