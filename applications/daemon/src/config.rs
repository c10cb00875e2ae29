/// Daemon configuration
use crate::error::{DaemonError, Result};
use airtime_rotation::RecencyPolicy;
use airtime_station::{StationConfig, DEFAULT_MAX_DURATION_SECONDS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "airtime.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DaemonConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_rotation")]
    pub rotation: RotationSettings,

    #[serde(default = "default_resolver")]
    pub resolver: ResolverSettings,

    #[serde(default = "default_player")]
    pub player: PlayerSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Where downloaded audio lands, one `<track id>.<ext>` file per track
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RotationSettings {
    #[serde(default)]
    pub recency_policy: RecencyPolicy,

    #[serde(default = "default_max_duration_seconds")]
    pub max_duration_seconds: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverSettings {
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,

    /// Audio format passed to `yt-dlp --audio-format`
    #[serde(default = "default_audio_format")]
    pub audio_format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerSettings {
    #[serde(default = "default_player_command")]
    pub command: String,

    /// Arguments; `{source}` is replaced by the item's locator, which is
    /// appended when no argument mentions it
    #[serde(default = "default_player_args")]
    pub args: Vec<String>,

    /// Pause between retries while the catalog is empty
    #[serde(default = "default_idle_seconds")]
    pub idle_seconds: u64,
}

impl DaemonConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `airtime.toml` is read if
    /// present. `AIRTIME_*` variables override both, with `__` between
    /// section and key (e.g. `AIRTIME_STORAGE__DATABASE_URL`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("AIRTIME")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(settings.build()?.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.database_url.trim().is_empty() {
            return Err(DaemonError::Config(
                "Database URL is required (set AIRTIME_STORAGE__DATABASE_URL)".to_string(),
            ));
        }

        if self.rotation.max_duration_seconds == 0 {
            return Err(DaemonError::Config(
                "rotation.max_duration_seconds must be greater than zero".to_string(),
            ));
        }

        if self.player.command.trim().is_empty() {
            return Err(DaemonError::Config("player.command is required".to_string()));
        }

        Ok(())
    }

    pub fn station_config(&self) -> StationConfig {
        StationConfig {
            max_duration_seconds: self.rotation.max_duration_seconds,
            recency_policy: self.rotation.recency_policy,
        }
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        download_dir: default_download_dir(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/airtime.db".to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./data/tracks")
}

fn default_rotation() -> RotationSettings {
    RotationSettings {
        recency_policy: RecencyPolicy::default(),
        max_duration_seconds: default_max_duration_seconds(),
    }
}

fn default_max_duration_seconds() -> u32 {
    DEFAULT_MAX_DURATION_SECONDS
}

fn default_resolver() -> ResolverSettings {
    ResolverSettings {
        ytdlp_path: default_ytdlp_path(),
        audio_format: default_audio_format(),
    }
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_audio_format() -> String {
    "flac".to_string()
}

fn default_player() -> PlayerSettings {
    PlayerSettings {
        command: default_player_command(),
        args: default_player_args(),
        idle_seconds: default_idle_seconds(),
    }
}

fn default_player_command() -> String {
    "ffplay".to_string()
}

fn default_player_args() -> Vec<String> {
    ["-nodisp", "-autoexit", "-loglevel", "error", "{source}"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_idle_seconds() -> u64 {
    5
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            rotation: default_rotation(),
            resolver: default_resolver(),
            player: default_player(),
        }
    }
}
