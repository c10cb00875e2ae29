use airtime_core::{error::Result, AirtimeError, Track, TrackId};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

const SELECT_COLUMNS: &str =
    "SELECT track_id, url, title, duration_seconds, thumbnail_url, last_played_at FROM tracks";

/// Get all tracks ordered by title, ignoring case
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Track>> {
    let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY title COLLATE NOCASE"))
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_track).collect()
}

/// Get track by ID
pub async fn get_by_id(pool: &SqlitePool, id: &TrackId) -> Result<Option<Track>> {
    let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE track_id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_track).transpose()
}

/// Whether a row with this id exists
pub async fn exists(pool: &SqlitePool, id: &TrackId) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracks WHERE track_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

/// Count all tracks
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracks")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Search tracks by title (case-insensitive substring match)
pub async fn search(pool: &SqlitePool, term: &str) -> Result<Vec<Track>> {
    let search_pattern = format!("%{}%", escape_like(term));

    let rows = sqlx::query(&format!(
        "{SELECT_COLUMNS} WHERE title LIKE ? ESCAPE '\\' ORDER BY title COLLATE NOCASE"
    ))
    .bind(search_pattern)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_track).collect()
}

/// Insert a single track
///
/// A primary-key conflict is reported as `AirtimeError::Duplicate`.
pub async fn insert(pool: &SqlitePool, track: &Track) -> Result<()> {
    let mut tx = pool.begin().await?;
    insert_row(&mut tx, track, false).await?;
    tx.commit().await?;
    Ok(())
}

/// Insert many tracks in a single transaction
///
/// With `skip_conflicts` existing ids are skipped (`ON CONFLICT DO NOTHING`).
/// Returns the number of rows inserted.
pub async fn insert_many(pool: &SqlitePool, tracks: &[Track], skip_conflicts: bool) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for track in tracks {
        inserted += insert_row(&mut tx, track, skip_conflicts).await?;
    }

    tx.commit().await?;
    Ok(inserted)
}

async fn insert_row(
    tx: &mut Transaction<'_, Sqlite>,
    track: &Track,
    skip_conflicts: bool,
) -> Result<u64> {
    let on_conflict = if skip_conflicts {
        " ON CONFLICT DO NOTHING"
    } else {
        ""
    };

    let result = sqlx::query(&format!(
        "INSERT INTO tracks (track_id, url, title, duration_seconds, thumbnail_url, last_played_at, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?){on_conflict}"
    ))
    .bind(&track.id)
    .bind(&track.url)
    .bind(&track.title)
    .bind(track.duration_seconds.map(i64::from))
    .bind(&track.thumbnail_url)
    .bind(track.last_played_at.map(|at| at.timestamp_millis()))
    .bind(Utc::now().timestamp_millis())
    .execute(&mut **tx)
    .await
    .map_err(|e| match e.as_database_error() {
        Some(db) if db.is_unique_violation() => AirtimeError::Duplicate(track.id.clone()),
        _ => AirtimeError::from(e),
    })?;

    Ok(result.rows_affected())
}

/// Record a play
///
/// The stored timestamp never moves backwards: an older `at` leaves the row
/// unchanged.
pub async fn mark_played(pool: &SqlitePool, id: &TrackId, at: DateTime<Utc>) -> Result<()> {
    let result = sqlx::query(
        "UPDATE tracks
         SET last_played_at = MAX(COALESCE(last_played_at, 0), ?)
         WHERE track_id = ?",
    )
    .bind(at.timestamp_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AirtimeError::not_found("Track", id.as_str()));
    }

    Ok(())
}

fn row_to_track(row: &SqliteRow) -> Result<Track> {
    let id: TrackId = row.try_get("track_id")?;

    let duration_seconds = row
        .try_get::<Option<i64>, _>("duration_seconds")?
        .map(|d| {
            u32::try_from(d).map_err(|_| {
                AirtimeError::storage(format!("Invalid duration {d} for track {id}"))
            })
        })
        .transpose()?;

    let last_played_at = row
        .try_get::<Option<i64>, _>("last_played_at")?
        .map(|ms| {
            DateTime::from_timestamp_millis(ms).ok_or_else(|| {
                AirtimeError::storage(format!("Invalid timestamp {ms} for track {id}"))
            })
        })
        .transpose()?;

    Ok(Track {
        title: row.try_get("title")?,
        url: row.try_get("url")?,
        thumbnail_url: row.try_get("thumbnail_url")?,
        duration_seconds,
        last_played_at,
        id,
    })
}

/// Escape `LIKE` wildcards so user input matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
