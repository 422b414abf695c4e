use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension};

use crate::verse::Verse;

/// Read-only handle to the verses database.
///
/// The connection is opened once and shared for the process lifetime; the
/// corpus never changes, so concurrent reads need no coordination beyond the
/// mutex. Every query runs on the blocking pool so callers treat it as a
/// suspend point.
#[derive(Clone)]
pub struct VerseStore {
    conn: Arc<Mutex<Connection>>,
}

impl VerseStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("opening verses database at {}", path.display()))?;
        Ok(Self::wrap(conn))
    }

    #[cfg(test)]
    pub(crate) fn from_connection(conn: Connection) -> Self {
        Self::wrap(conn)
    }

    fn wrap(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(conn: &Arc<Mutex<Connection>>) -> Result<MutexGuard<'_, Connection>> {
        conn.lock().map_err(|_| anyhow!("database connection poisoned"))
    }

    /// Translation identifier from the `meta` table, e.g. "KJV".
    pub async fn translation_shortname(&self) -> Result<Option<String>> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Self::lock(&conn)?;
            conn.query_row(
                "SELECT value FROM meta WHERE field = 'shortname'",
                [],
                |row| row.get(0),
            )
            .optional()
            .context("reading translation shortname")
        })
        .await?
    }

    /// Largest chapter number recorded for `book`.
    ///
    /// A valid book with no rows means a corrupted or partial corpus; the
    /// reader degrades to a bound of 1 and logs the anomaly instead of
    /// blocking navigation.
    pub async fn max_chapter(&self, book: u32) -> Result<u32> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Self::lock(&conn)?;
            let max: Option<u32> = conn.query_row(
                "SELECT MAX(chapter) FROM verses WHERE book = ?1",
                [book],
                |row| row.get(0),
            )?;
            Ok(max.unwrap_or_else(|| {
                log::warn!("no chapters recorded for book {book}, assuming 1");
                1
            }))
        })
        .await?
    }

    /// Largest verse number recorded for `(book, chapter)`. Same fallback
    /// policy as [`max_chapter`](Self::max_chapter).
    pub async fn max_verse(&self, book: u32, chapter: u32) -> Result<u32> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Self::lock(&conn)?;
            let max: Option<u32> = conn.query_row(
                "SELECT MAX(verse) FROM verses WHERE book = ?1 AND chapter = ?2",
                [book, chapter],
                |row| row.get(0),
            )?;
            Ok(max.unwrap_or_else(|| {
                log::warn!("no verses recorded for book {book} chapter {chapter}, assuming 1");
                1
            }))
        })
        .await?
    }

    /// Every verse of `(book, chapter)` in ascending verse order. An
    /// out-of-range chapter yields an empty list, not an error; callers that
    /// need to tell the two apart validate against the bounds first.
    pub async fn fetch_chapter(&self, book: u32, chapter: u32) -> Result<Vec<Verse>> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Self::lock(&conn)?;
            let mut stmt = conn.prepare(
                "SELECT id, verse, text FROM verses \
                 WHERE book = ?1 AND chapter = ?2 ORDER BY verse ASC",
            )?;
            let rows = stmt.query_map([book, chapter], |row| {
                Ok(Verse {
                    id: row.get(0)?,
                    book,
                    chapter,
                    verse: row.get(1)?,
                    text: row.get(2)?,
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<Verse>>>()
                .with_context(|| format!("fetching book {book} chapter {chapter}"))
        })
        .await?
    }
}
