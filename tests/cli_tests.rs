use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

// Helper function to set up a test Command instance
fn set_up_command(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("emodiary").unwrap();
    // Start from a clean environment so the developer's variables don't leak in
    cmd.env_clear().env("HOME", home.path());
    if let Ok(path) = std::env::var("PATH") {
        cmd.env("PATH", path);
    }
    cmd
}

#[test]
fn test_cli_help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    let mut cmd = set_up_command(&home);

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("init-db"));
}

#[test]
fn test_cli_requires_subcommand() {
    let home = TempDir::new().unwrap();
    let mut cmd = set_up_command(&home);

    cmd.assert().failure();
}

#[test]
#[serial]
fn test_init_db_creates_database() {
    let home = TempDir::new().unwrap();
    let db_path = home.path().join("nested").join("diary.db");
    let mut cmd = set_up_command(&home);

    cmd.arg("init-db")
        .arg("--db")
        .arg(&db_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized database"));

    assert!(db_path.exists());
}

#[test]
#[serial]
fn test_init_db_uses_env_path() {
    let home = TempDir::new().unwrap();
    let db_path = home.path().join("from-env.db");
    let mut cmd = set_up_command(&home);

    cmd.env("EMODIARY_DB", &db_path)
        .arg("init-db")
        .assert()
        .success();

    assert!(db_path.exists());
}

#[test]
#[serial]
fn test_serve_without_api_key_fails() {
    let home = TempDir::new().unwrap();
    let mut cmd = set_up_command(&home);

    cmd.env("EMODIARY_TOKEN_SECRET", "a-long-enough-token-secret")
        .arg("serve")
        .arg("--db")
        .arg(home.path().join("diary.db"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
#[serial]
fn test_serve_with_short_token_secret_fails() {
    let home = TempDir::new().unwrap();
    let mut cmd = set_up_command(&home);

    cmd.env("OPENAI_API_KEY", "sk-test")
        .env("EMODIARY_TOKEN_SECRET", "short")
        .arg("serve")
        .arg("--db")
        .arg(home.path().join("diary.db"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
#[serial]
fn test_serve_with_oversized_token_ttl_fails() {
    let home = TempDir::new().unwrap();
    let mut cmd = set_up_command(&home);

    cmd.env("OPENAI_API_KEY", "sk-test")
        .env("EMODIARY_TOKEN_SECRET", "a-long-enough-token-secret")
        .env("EMODIARY_TOKEN_TTL_SECS", "9000000000000")
        .arg("serve")
        .arg("--db")
        .arg(home.path().join("diary.db"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("EMODIARY_TOKEN_TTL_SECS"));
}

#[test]
fn test_invalid_log_format_rejected() {
    let home = TempDir::new().unwrap();
    let mut cmd = set_up_command(&home);

    cmd.args(["--log-format", "xml", "init-db"]).assert().failure();
}
