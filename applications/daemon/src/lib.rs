//! Airtime Daemon Library
//!
//! Process-level wiring for an Airtime station: configuration, the yt-dlp
//! resolver/downloader, the external player and the playback driver.
//!
//! This library exposes the core components for testing purposes.

pub mod config;
pub mod driver;
pub mod error;
pub mod player;
pub mod ytdlp;

// Re-export commonly used types for convenience
pub use config::DaemonConfig;
pub use driver::DriverOptions;
pub use error::{DaemonError, Result};
pub use player::{CommandPlayer, Playback};
pub use ytdlp::YtDlp;

use airtime_station::CatalogServer;
use airtime_storage::SqliteCatalogStore;
use std::sync::Arc;

/// Open the database and start the catalog server described by `config`
pub async fn start_station(config: &DaemonConfig) -> Result<CatalogServer> {
    let pool = airtime_storage::create_pool(&config.storage.database_url).await?;
    airtime_storage::run_migrations(&pool).await?;
    tracing::info!("Database connected");

    tokio::fs::create_dir_all(&config.storage.download_dir).await?;

    let ytdlp = Arc::new(YtDlp::new(
        config.resolver.ytdlp_path.clone(),
        config.storage.download_dir.clone(),
        config.resolver.audio_format.clone(),
    ));

    let server = CatalogServer::start(
        Arc::new(SqliteCatalogStore::new(pool)),
        ytdlp.clone(),
        ytdlp,
        config.station_config(),
    )
    .await?;

    Ok(server)
}
