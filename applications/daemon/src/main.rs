/// Airtime - rotation station daemon
use airtime_core::Track;
use airtime_daemon::{driver, CommandPlayer, DaemonConfig, DriverOptions};
use airtime_station::{BulkImporter, ImportError, TrackRequest};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "airtime")]
#[command(about = "Fairness-weighted rotation station", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./airtime.toml when present)
    #[arg(short, long, global = true, env = "AIRTIME_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the rotation until interrupted
    Run,
    /// Look up a track and add it to the catalog
    Add {
        /// Search terms or URL
        query: String,
    },
    /// Search the catalog by title
    Search {
        /// Case-insensitive title fragment
        term: String,
    },
    /// List every track in the catalog
    List,
    /// Import a JSON playlist of {id, url, title, duration, thumbnail} records
    Import {
        /// Playlist file
        playlist: PathBuf,
        /// Write entries that failed to import to this file
        #[arg(short, long)]
        failures: Option<PathBuf>,
    },
    /// Show what the rotation would play next
    Next {
        /// Number of tracks to show
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "airtime=info,airtime_daemon=info,airtime_station=info,airtime_rotation=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = DaemonConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Run => run(&config).await?,
        Commands::Add { query } => add(&config, query).await?,
        Commands::Search { term } => search(&config, &term).await?,
        Commands::List => list(&config).await?,
        Commands::Import { playlist, failures } => {
            import(&config, &playlist, failures.as_deref()).await?;
        }
        Commands::Next { count } => next(&config, count).await?,
    }

    Ok(())
}

async fn run(config: &DaemonConfig) -> anyhow::Result<()> {
    let server = airtime_daemon::start_station(config).await?;
    let player = CommandPlayer::from_settings(&config.player);
    let options = DriverOptions {
        idle: Duration::from_secs(config.player.idle_seconds),
        limit: None,
    };

    tracing::info!("Starting Airtime with {} tracks", server.catalog_len());
    tracing::info!("Player: {}", config.player.command);

    tokio::select! {
        played = driver::run(&server, &player, options) => {
            tracing::info!("Driver stopped after {} items", played);
        }
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}

async fn add(config: &DaemonConfig, query: String) -> anyhow::Result<()> {
    let server = airtime_daemon::start_station(config).await?;
    let track = server.add_track(TrackRequest::Query(query)).await?;

    println!("Added {} - {}", track.id, track.title);
    Ok(())
}

async fn search(config: &DaemonConfig, term: &str) -> anyhow::Result<()> {
    let server = airtime_daemon::start_station(config).await?;
    let tracks = server.search_track(term).await;

    if tracks.is_empty() {
        println!("No tracks match '{term}'");
    }
    for track in &tracks {
        print_track(track);
    }
    Ok(())
}

async fn list(config: &DaemonConfig) -> anyhow::Result<()> {
    let server = airtime_daemon::start_station(config).await?;

    println!("Tracks ({}):", server.catalog_len());
    for track in &server.tracks() {
        print_track(track);
    }
    Ok(())
}

async fn import(config: &DaemonConfig, playlist: &Path, failures: Option<&Path>) -> anyhow::Result<()> {
    let server = Arc::new(airtime_daemon::start_station(config).await?);
    let (mut rx, handle) = BulkImporter::new(server).import_file(playlist).await?;

    while let Some(progress) = rx.recv().await {
        if let Some(current) = &progress.current {
            tracing::debug!("{} / {}: {}", progress.processed, progress.total, current);
        }
    }

    let report = handle
        .await
        .map_err(|e| ImportError::Task(e.to_string()))??;

    println!(
        "Imported {}, skipped {}, failed {}",
        report.imported,
        report.skipped,
        report.failed.len()
    );
    for failure in &report.failed {
        println!("  {} - {}", failure.query, failure.reason);
    }

    if let Some(path) = failures {
        if !report.failed.is_empty() {
            report.write_failures(path).await?;
            println!("Failures written to {}", path.display());
        }
    }
    Ok(())
}

async fn next(config: &DaemonConfig, count: usize) -> anyhow::Result<()> {
    let server = airtime_daemon::start_station(config).await?;
    let rotation = server.rotation();
    if rotation.queue_len() == 0 {
        rotation.reshuffle();
    }

    let tracks: HashMap<_, _> = server
        .tracks()
        .into_iter()
        .map(|track| (track.id.clone(), track))
        .collect();

    for (position, id) in rotation.upcoming().iter().take(count).enumerate() {
        match tracks.get(id) {
            Some(track) => println!("{:>3}. {} - {}", position + 1, track.id, track.title),
            None => println!("{:>3}. {}", position + 1, id),
        }
    }
    Ok(())
}

fn print_track(track: &Track) {
    let played = track
        .last_played_at
        .map_or_else(|| "never".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string());
    println!("  {} - {} (last played: {})", track.id, track.title, played);
}
