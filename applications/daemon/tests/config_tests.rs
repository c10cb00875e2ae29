/// Configuration loading tests
use airtime_daemon::{DaemonConfig, DaemonError};
use airtime_rotation::RecencyPolicy;
use std::path::PathBuf;

#[test]
fn loads_partial_file_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("airtime.toml");
    std::fs::write(
        &path,
        r#"
[storage]
database_url = "sqlite:///var/lib/airtime/airtime.db"

[rotation]
recency_policy = "never_played_is_stalest"

[player]
command = "mpv"
args = ["--no-video", "{source}"]
"#,
    )
    .unwrap();

    let config = DaemonConfig::load(Some(&path)).unwrap();
    config.validate().unwrap();

    assert_eq!(config.storage.database_url, "sqlite:///var/lib/airtime/airtime.db");
    assert_eq!(config.storage.download_dir, PathBuf::from("./data/tracks"));
    assert_eq!(config.rotation.recency_policy, RecencyPolicy::NeverPlayedIsStalest);
    assert_eq!(config.rotation.max_duration_seconds, 720);
    assert_eq!(config.resolver.audio_format, "flac");
    assert_eq!(config.player.command, "mpv");
    assert_eq!(config.player.args, vec!["--no-video", "{source}"]);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = DaemonConfig::load(Some(&dir.path().join("missing.toml")));
    assert!(matches!(result, Err(DaemonError::Config(_))));
}

#[test]
fn zero_ceiling_in_file_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("airtime.toml");
    std::fs::write(&path, "[rotation]\nmax_duration_seconds = 0\n").unwrap();

    let config = DaemonConfig::load(Some(&path)).unwrap();
    assert!(matches!(config.validate(), Err(DaemonError::Config(_))));
}
