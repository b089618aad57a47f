use std::io::Write;
use std::process::{Output, Stdio};
use std::time::Duration;

use tempfile::NamedTempFile;
use tokio::time::timeout;

/// Create a minimal valid config with the liveness endpoint off
fn minimal_config() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[roles]
admin = 11
moderator = 22
owner = 33

[liveness]
enabled = false
"#
    )
    .unwrap();
    file
}

async fn run_bot(config_path: &std::path::Path) -> Output {
    let child = tokio::process::Command::new(env!("CARGO_BIN_EXE_warnbot"))
        .env("WARNBOT_CONFIG", config_path)
        .env_remove("DISCORD_TOKEN")
        .env("RUST_LOG", "error")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn bot");

    timeout(Duration::from_secs(30), child.wait_with_output())
        .await
        .expect("Bot did not exit")
        .expect("Failed to wait for bot")
}

#[tokio::test]
async fn test_missing_token_is_fatal() {
    let config = minimal_config();
    let output = run_bot(config.path()).await;
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("DISCORD_TOKEN"), "stderr: {}", stderr);
}

#[tokio::test]
async fn test_missing_config_is_fatal() {
    let output = run_bot(std::path::Path::new("/nonexistent/warnbot.toml")).await;
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load config"), "stderr: {}", stderr);
}
