/// yt-dlp wrapper for track lookup, source resolution and downloads
use airtime_core::{DownloadError, Downloader, LookupError, Resolver, Source, Track};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

const FORMAT: &str = "bestaudio/best";

/// Subset of `yt-dlp --dump-json` output that makes up a track
#[derive(Debug, Deserialize)]
struct VideoInfo {
    id: String,
    title: String,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    webpage_url: Option<String>,
}

impl VideoInfo {
    fn into_track(self) -> Track {
        let url = self
            .webpage_url
            .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={}", self.id));

        let mut track = Track::new(self.id, self.title).with_url(url);
        track.duration_seconds = self.duration.map(|d| d.max(0.0).round() as u32);
        track.thumbnail_url = self.thumbnail;
        track
    }
}

/// Resolver and downloader backed by the `yt-dlp` executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    ytdlp_path: PathBuf,
    download_dir: PathBuf,
    audio_format: String,
}

impl YtDlp {
    pub fn new(ytdlp_path: PathBuf, download_dir: PathBuf, audio_format: String) -> Self {
        Self {
            ytdlp_path,
            download_dir,
            audio_format,
        }
    }

    /// Where the downloaded audio for `track` lives
    pub fn file_path(&self, track: &Track) -> PathBuf {
        self.download_dir
            .join(format!("{}.{}", track.id, self.audio_format))
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.ytdlp_path);
        cmd.arg("--format")
            .arg(FORMAT)
            .arg("--no-playlist")
            .arg("--no-check-certificates")
            .arg("--no-warnings")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Run yt-dlp and return its stdout, or the last stderr line on failure
    async fn run(&self, mut cmd: Command) -> Result<Vec<u8>, String> {
        let output = cmd
            .output()
            .await
            .map_err(|e| format!("Failed to run {}: {}", self.ytdlp_path.display(), e))?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(last_line(&output.stderr))
        }
    }
}

#[async_trait]
impl Resolver for YtDlp {
    async fn lookup(&self, query: &str) -> Result<Track, LookupError> {
        let mut cmd = self.command();
        cmd.arg("--dump-json").arg(search_target(query));

        let stdout = self
            .run(cmd)
            .await
            .map_err(|reason| LookupError::new(query, reason))?;

        parse_info(&stdout).map_err(|reason| LookupError::new(query, reason))
    }

    async fn resolve_source(&self, track: &Track) -> Result<Source, LookupError> {
        let path = self.file_path(track);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(Source::File(path));
        }

        let mut cmd = self.command();
        cmd.arg("--get-url").arg(&track.url);

        let stdout = self
            .run(cmd)
            .await
            .map_err(|reason| LookupError::new(track.url.as_str(), reason))?;

        let stream_url = String::from_utf8_lossy(&stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string);

        stream_url
            .map(Source::Stream)
            .ok_or_else(|| LookupError::new(track.url.as_str(), "yt-dlp returned no stream URL"))
    }
}

#[async_trait]
impl Downloader for YtDlp {
    async fn download(&self, track: &Track) -> Result<Source, DownloadError> {
        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .map_err(|e| DownloadError::new(track.id.clone(), e.to_string()))?;

        let template = self.download_dir.join("%(id)s.%(ext)s");
        let mut cmd = self.command();
        cmd.arg("--extract-audio")
            .arg("--audio-format")
            .arg(&self.audio_format)
            .arg("--output")
            .arg(template)
            .arg(&track.url);

        self.run(cmd)
            .await
            .map_err(|reason| DownloadError::new(track.id.clone(), reason))?;

        tracing::info!("Downloaded {} ({})", track.id, track.title);
        Ok(Source::File(self.file_path(track)))
    }

    async fn is_downloaded(&self, track: &Track) -> bool {
        tokio::fs::try_exists(self.file_path(track))
            .await
            .unwrap_or(false)
    }

    async fn remove(&self, track: &Track) -> Result<(), DownloadError> {
        match tokio::fs::remove_file(self.file_path(track)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DownloadError::new(track.id.clone(), e.to_string())),
        }
    }
}

/// URLs are extracted directly; anything else is a search for the top hit
fn search_target(query: &str) -> String {
    let query = query.trim();
    if query.starts_with("http://") || query.starts_with("https://") {
        query.to_string()
    } else {
        format!("ytsearch1:{query}")
    }
}

fn parse_info(stdout: &[u8]) -> Result<Track, String> {
    // Searches print one JSON object per line; only the first hit counts
    let line = String::from_utf8_lossy(stdout)
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| "No results".to_string())?;

    let info: VideoInfo =
        serde_json::from_str(&line).map_err(|e| format!("Unexpected yt-dlp output: {e}"))?;
    Ok(info.into_track())
}

fn last_line(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map_or_else(|| "yt-dlp failed".to_string(), str::to_string)
}
