//! # Numbering Repository
//!
//! The storage half of the invoice numbering allocator: a per-day counter
//! row incremented atomically.
//!
//! ## Why Not COUNT(*)?
//! ```text
//! COUNT of today's invoices + 1        ← races: two creators read the
//!                                        same count, mint the same number
//!
//! upsert-increment RETURNING last_seq  ← single statement; SQLite's write
//!                                        lock serializes it, every caller
//!                                        sees a distinct sequence
//! ```
//!
//! Sequences only ever move forward; soft-deleting an invoice never frees
//! its number.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for the per-day invoice numbering counter.
#[derive(Debug, Clone)]
pub struct NumberingRepository {
    pool: SqlitePool,
}

impl NumberingRepository {
    /// Creates a new NumberingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NumberingRepository { pool }
    }

    /// Atomically allocates the next sequence for the given UTC calendar
    /// day. First call of a day returns 1.
    pub async fn next_sequence(&self, date: NaiveDate) -> DbResult<i64> {
        let day = date.format("%Y%m%d").to_string();

        let seq: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO invoice_day_counters (day, last_seq)
            VALUES (?1, 1)
            ON CONFLICT (day) DO UPDATE SET last_seq = last_seq + 1
            RETURNING last_seq
            "#,
        )
        .bind(&day)
        .fetch_one(&self.pool)
        .await?;

        debug!(day = %day, seq, "Allocated invoice sequence");
        Ok(seq)
    }
}
