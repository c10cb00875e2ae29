/// Playback driver
///
/// Explicit loop over the playback-driver contract: ask the catalog server
/// for the next item, record the play, hand the item to the player, repeat.
use crate::player::Playback;
use airtime_station::CatalogServer;
use std::time::Duration;

/// Driver settings
#[derive(Debug, Clone, Copy)]
pub struct DriverOptions {
    /// Pause before asking again when the catalog is empty
    pub idle: Duration,

    /// Stop after this many played items (`None` runs forever)
    pub limit: Option<usize>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            idle: Duration::from_secs(5),
            limit: None,
        }
    }
}

/// Drive playback until `limit` items have played
///
/// Returns the number of items handed to the player. Resolution and player
/// failures are logged and skipped; after a full catalog of consecutive
/// resolution failures the driver idles before trying again.
pub async fn run(server: &CatalogServer, player: &dyn Playback, options: DriverOptions) -> usize {
    let mut played = 0;
    let mut failures = 0;

    loop {
        if options.limit.is_some_and(|limit| played >= limit) {
            break;
        }

        let item = match server.next_item(None).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                tracing::info!("Catalog is empty, waiting {:?}", options.idle);
                tokio::time::sleep(options.idle).await;
                continue;
            }
            Err(e) => {
                tracing::warn!("Skipping unplayable track: {}", e);
                failures += 1;
                if failures >= server.catalog_len().max(1) {
                    tracing::warn!("No track could be resolved, waiting {:?}", options.idle);
                    tokio::time::sleep(options.idle).await;
                    failures = 0;
                }
                continue;
            }
        };
        failures = 0;

        // Exactly once per playback start
        if let Err(e) = server.mark_played(&item.track.id).await {
            tracing::warn!("Failed to record play of {}: {}", item.track.id, e);
        }

        tracing::info!("Now playing: {} ({})", item.track.title, item.track.id);
        if let Err(e) = player.play(&item).await {
            tracing::warn!("{}", e);
        }
        played += 1;
    }

    played
}
