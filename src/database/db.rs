//! SQLite storage for cards and their review history
//!
//! Handles schema initialization, card authoring (create/edit/delete/list),
//! the study queue queries and the atomic review write.

use super::store::{CardStore, DueFilter};
use crate::error::StoreError;
use crate::models::{Card, CardContent, Review, ReviewResult};
use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{Connection, OptionalExtension, Params, Row, params, params_from_iter};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, warn};

const CARD_COLUMNS: &str = "id, word, sentence, meaning, word_pronunciation, sentence_translation,
     sentence_pronunciation, streak, next_due_at, last_result, created_at, updated_at";

const REVIEW_COLUMNS: &str = "id, card_id, result, reviewed_at, next_due_at, streak";

/// SQLite-backed card store. Timestamps are stored as Unix milliseconds.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates the database file and makes sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        info!("Opening SQLite database at {:?}", path);

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        debug!("Opening in-memory SQLite database");
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&conn)
    }

    /// Exclusive access for work that needs a transaction
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError>,
    {
        let mut conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&mut conn)
    }

    /// Validates `content` and inserts a new card that is due immediately.
    /// `now` is kept at millisecond precision, like every stored timestamp.
    pub fn create_card(&self, content: CardContent, now: DateTime<Utc>) -> Result<Card, StoreError> {
        let now = now.trunc_subsecs(3);
        let card = Card::new(uuid::Uuid::new_v4().to_string(), content.normalized()?, now);

        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO cards ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    CARD_COLUMNS
                ),
                params![
                    card.id,
                    card.content.word,
                    card.content.sentence,
                    card.content.meaning,
                    card.content.word_pronunciation,
                    card.content.sentence_translation,
                    card.content.sentence_pronunciation,
                    card.streak,
                    card.next_due_at.timestamp_millis(),
                    card.last_result.map(ReviewResult::as_db_str),
                    card.created_at.timestamp_millis(),
                    card.updated_at.timestamp_millis(),
                ],
            )?;
            Ok(())
        })?;

        info!("Created card {} ({})", card.id, card.content.word);
        Ok(card)
    }

    /// Replaces the content of a card. Scheduling state is left untouched.
    pub fn update_card_content(
        &self,
        id: &str,
        content: CardContent,
        now: DateTime<Utc>,
    ) -> Result<Card, StoreError> {
        let content = content.normalized()?;

        let updated = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE cards
                 SET word = ?1, sentence = ?2, meaning = ?3, word_pronunciation = ?4,
                     sentence_translation = ?5, sentence_pronunciation = ?6, updated_at = ?7
                 WHERE id = ?8",
                params![
                    content.word,
                    content.sentence,
                    content.meaning,
                    content.word_pronunciation,
                    content.sentence_translation,
                    content.sentence_pronunciation,
                    now.timestamp_millis(),
                    id
                ],
            )?)
        })?;

        if updated == 0 {
            return Err(StoreError::CardNotFound(id.to_string()));
        }

        self.find_card(id)?
            .ok_or_else(|| StoreError::CardNotFound(id.to_string()))
    }

    /// Deletes a card together with its review history.
    pub fn delete_card(&self, id: &str) -> Result<(), StoreError> {
        let deleted =
            self.with_conn(|conn| Ok(conn.execute("DELETE FROM cards WHERE id = ?1", params![id])?))?;

        if deleted == 0 {
            return Err(StoreError::CardNotFound(id.to_string()));
        }
        info!("Deleted card {}", id);
        Ok(())
    }

    /// Newest cards first, optionally filtered by a substring of the word.
    pub fn list_cards(&self, query: Option<&str>, limit: usize) -> Result<Vec<Card>, StoreError> {
        let pattern = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", escape_like(q)));

        self.with_conn(|conn| match &pattern {
            Some(pattern) => query_cards(
                conn,
                &format!(
                    "SELECT {} FROM cards WHERE word LIKE ?1 ESCAPE '\\'
                     ORDER BY created_at DESC, rowid DESC LIMIT ?2",
                    CARD_COLUMNS
                ),
                params![pattern, sql_limit(limit)],
            ),
            None => query_cards(
                conn,
                &format!(
                    "SELECT {} FROM cards ORDER BY created_at DESC, rowid DESC LIMIT ?1",
                    CARD_COLUMNS
                ),
                params![sql_limit(limit)],
            ),
        })
    }

    /// Every card, oldest first.
    pub fn all_cards(&self) -> Result<Vec<Card>, StoreError> {
        self.with_conn(|conn| {
            query_cards(
                conn,
                &format!(
                    "SELECT {} FROM cards ORDER BY created_at ASC, rowid ASC",
                    CARD_COLUMNS
                ),
                [],
            )
        })
    }

    pub fn card_count(&self) -> Result<usize, StoreError> {
        let count: i64 =
            self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Review history of one card, newest first.
    pub fn reviews_for_card(&self, card_id: &str) -> Result<Vec<Review>, StoreError> {
        self.with_conn(|conn| {
            query_reviews(
                conn,
                &format!(
                    "SELECT {} FROM reviews WHERE card_id = ?1 ORDER BY reviewed_at DESC, rowid DESC",
                    REVIEW_COLUMNS
                ),
                params![card_id],
            )
        })
    }

    /// Reviews recorded at or after `from`, newest first, at most `limit`.
    pub fn reviews_since(&self, from: DateTime<Utc>, limit: usize) -> Result<Vec<Review>, StoreError> {
        self.with_conn(|conn| {
            query_reviews(
                conn,
                &format!(
                    "SELECT {} FROM reviews WHERE reviewed_at >= ?1
                     ORDER BY reviewed_at DESC, rowid DESC LIMIT ?2",
                    REVIEW_COLUMNS
                ),
                params![from.timestamp_millis(), sql_limit(limit)],
            )
        })
    }

    /// Inserts two starter cards when the store is empty. Returns how many were added.
    pub fn seed_sample_cards(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        if self.card_count()? > 0 {
            return Ok(0);
        }

        let samples = [
            ("both", "They both like cake after lunch.", "둘 다"),
            ("borrow", "Can I borrow your pen today?", "빌리다"),
        ];
        for (word, sentence, meaning) in samples {
            self.create_card(
                CardContent {
                    meaning: Some(meaning.to_string()),
                    ..CardContent::new(word, sentence)
                },
                now,
            )?;
        }
        Ok(samples.len())
    }
}

impl CardStore for SqliteStore {
    fn find_card(&self, id: &str) -> Result<Option<Card>, StoreError> {
        let row = self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM cards WHERE id = ?1", CARD_COLUMNS),
                    params![id],
                    CardRow::from_row,
                )
                .optional()?)
        })?;
        row.map(CardRow::into_card).transpose()
    }

    fn find_cards(&self, ids: &[String]) -> Result<Vec<Card>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        self.with_conn(|conn| {
            query_cards(
                conn,
                &format!(
                    "SELECT {} FROM cards WHERE id IN ({})",
                    CARD_COLUMNS, placeholders
                ),
                params_from_iter(ids.iter()),
            )
        })
    }

    fn due_cards(
        &self,
        now: DateTime<Utc>,
        filter: DueFilter,
        limit: usize,
    ) -> Result<Vec<Card>, StoreError> {
        let sql = match filter {
            DueFilter::Reviewed => format!(
                "SELECT {} FROM cards c
                 WHERE c.next_due_at <= ?1
                   AND EXISTS (SELECT 1 FROM reviews r WHERE r.card_id = c.id)
                 ORDER BY c.next_due_at ASC, c.created_at ASC, c.rowid ASC
                 LIMIT ?2",
                CARD_COLUMNS
            ),
            DueFilter::New => format!(
                "SELECT {} FROM cards c
                 WHERE c.next_due_at <= ?1
                   AND NOT EXISTS (SELECT 1 FROM reviews r WHERE r.card_id = c.id)
                 ORDER BY c.created_at ASC, c.rowid ASC
                 LIMIT ?2",
                CARD_COLUMNS
            ),
        };

        let cards = self.with_conn(|conn| {
            query_cards(conn, &sql, params![now.timestamp_millis(), sql_limit(limit)])
        })?;
        debug!("Fetched {} due {:?} cards (limit {})", cards.len(), filter, limit);
        Ok(cards)
    }

    fn retry_cards(&self, limit: usize) -> Result<Vec<Card>, StoreError> {
        self.with_conn(|conn| {
            query_cards(
                conn,
                &format!(
                    "SELECT {} FROM cards
                     WHERE last_result IN ('HOLD', 'WRONG')
                     ORDER BY updated_at DESC, next_due_at ASC, rowid ASC
                     LIMIT ?1",
                    CARD_COLUMNS
                ),
                params![sql_limit(limit)],
            )
        })
    }

    fn commit_review(&self, review: &Review) -> Result<(), StoreError> {
        self.with_conn_mut(|conn| {
            // Dropping `tx` without commit rolls back the insert.
            let tx = conn.transaction()?;

            tx.execute(
                &format!(
                    "INSERT INTO reviews ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    REVIEW_COLUMNS
                ),
                params![
                    review.id,
                    review.card_id,
                    review.result.as_db_str(),
                    review.reviewed_at.timestamp_millis(),
                    review.next_due_at.timestamp_millis(),
                    review.streak
                ],
            )?;

            let updated = tx.execute(
                "UPDATE cards
                 SET last_result = ?1, next_due_at = ?2, streak = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    review.result.as_db_str(),
                    review.next_due_at.timestamp_millis(),
                    review.streak,
                    review.reviewed_at.timestamp_millis(),
                    review.card_id
                ],
            )?;
            if updated == 0 {
                return Err(StoreError::CardNotFound(review.card_id.clone()));
            }

            tx.commit()?;
            Ok(())
        })
    }
}

/// Creates tables and indexes if they do not exist yet.
fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS cards (
            id TEXT PRIMARY KEY,
            word TEXT NOT NULL,
            sentence TEXT NOT NULL,
            meaning TEXT,
            word_pronunciation TEXT,
            sentence_translation TEXT,
            sentence_pronunciation TEXT,
            streak INTEGER NOT NULL DEFAULT 0,
            next_due_at INTEGER NOT NULL,
            last_result TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS reviews (
            id TEXT PRIMARY KEY,
            card_id TEXT NOT NULL,
            result TEXT NOT NULL,
            reviewed_at INTEGER NOT NULL,
            next_due_at INTEGER NOT NULL,
            streak INTEGER NOT NULL,
            FOREIGN KEY (card_id) REFERENCES cards(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_cards_next_due_at ON cards(next_due_at);
        CREATE INDEX IF NOT EXISTS idx_cards_last_result ON cards(last_result);
        CREATE INDEX IF NOT EXISTS idx_reviews_card_id ON reviews(card_id);
        CREATE INDEX IF NOT EXISTS idx_reviews_reviewed_at ON reviews(reviewed_at);",
    )?;
    Ok(())
}

/// Runs a multi-card query. A row that cannot be decoded is logged and
/// skipped so one damaged card does not block every queue.
fn query_cards<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Card>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, CardRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let cards = rows
        .into_iter()
        .filter_map(|row| {
            let id = row.id.clone();
            match row.into_card() {
                Ok(card) => Some(card),
                Err(e) => {
                    warn!("Skipping unreadable card {}: {}", id, e);
                    None
                }
            }
        })
        .collect();
    Ok(cards)
}

fn query_reviews<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Review>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, ReviewRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(ReviewRow::into_review).collect()
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn timestamp(millis: i64, column: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::Corrupt(format!("{} out of range: {}", column, millis)))
}

/// Negative streaks can only come from hand-edited rows; they count as 0.
fn streak(raw: i64, id: &str) -> u32 {
    if raw < 0 {
        warn!("Clamping negative streak {} to 0 for {}", raw, id);
        return 0;
    }
    u32::try_from(raw).unwrap_or(u32::MAX)
}

fn review_result(raw: &str) -> Result<ReviewResult, StoreError> {
    ReviewResult::from_db_str(raw)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown review result '{}'", raw)))
}

struct CardRow {
    id: String,
    word: String,
    sentence: String,
    meaning: Option<String>,
    word_pronunciation: Option<String>,
    sentence_translation: Option<String>,
    sentence_pronunciation: Option<String>,
    streak: i64,
    next_due_at: i64,
    last_result: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl CardRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            word: row.get(1)?,
            sentence: row.get(2)?,
            meaning: row.get(3)?,
            word_pronunciation: row.get(4)?,
            sentence_translation: row.get(5)?,
            sentence_pronunciation: row.get(6)?,
            streak: row.get(7)?,
            next_due_at: row.get(8)?,
            last_result: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    fn into_card(self) -> Result<Card, StoreError> {
        let last_result = self.last_result.as_deref().map(review_result).transpose()?;

        Ok(Card {
            streak: streak(self.streak, &self.id),
            next_due_at: timestamp(self.next_due_at, "next_due_at")?,
            last_result,
            created_at: timestamp(self.created_at, "created_at")?,
            updated_at: timestamp(self.updated_at, "updated_at")?,
            content: CardContent {
                word: self.word,
                sentence: self.sentence,
                meaning: self.meaning,
                word_pronunciation: self.word_pronunciation,
                sentence_translation: self.sentence_translation,
                sentence_pronunciation: self.sentence_pronunciation,
            },
            id: self.id,
        })
    }
}

struct ReviewRow {
    id: String,
    card_id: String,
    result: String,
    reviewed_at: i64,
    next_due_at: i64,
    streak: i64,
}

impl ReviewRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            card_id: row.get(1)?,
            result: row.get(2)?,
            reviewed_at: row.get(3)?,
            next_due_at: row.get(4)?,
            streak: row.get(5)?,
        })
    }

    fn into_review(self) -> Result<Review, StoreError> {
        Ok(Review {
            result: review_result(&self.result)?,
            reviewed_at: timestamp(self.reviewed_at, "reviewed_at")?,
            next_due_at: timestamp(self.next_due_at, "next_due_at")?,
            streak: streak(self.streak, &self.id),
            id: self.id,
            card_id: self.card_id,
        })
    }
}
