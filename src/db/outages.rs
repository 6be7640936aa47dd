//! Outage events keyed by the provider's event id.

use crate::db::queries;
use crate::models::outage::OutageEvent;
use crate::models::provider::OutageRecord;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection};
use std::collections::BTreeSet;

/// Inserts or refreshes the event and marks it active.
///
/// `seen_at` is the cycle timestamp, so repeating the call within one cycle
/// leaves the row unchanged. `first_seen_at` is only written on insert.
pub async fn upsert(
    conn: &mut SqliteConnection,
    record: &OutageRecord,
    county: &str,
    seen_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(queries::UPSERT_OUTAGE)
        .bind(&record.event_id)
        .bind(county)
        .bind(i64::from(record.customers_affected))
        .bind(record.device_lat)
        .bind(record.device_lon)
        .bind(record.cause.as_deref())
        .bind(seen_at)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn active_ids(conn: &mut SqliteConnection) -> Result<BTreeSet<String>, sqlx::Error> {
    let rows = sqlx::query(queries::SELECT_ACTIVE_OUTAGE_IDS)
        .fetch_all(&mut *conn)
        .await?;
    rows.iter()
        .map(|row| row.try_get::<String, _>("event_id"))
        .collect()
}

pub async fn get(
    conn: &mut SqliteConnection,
    event_id: &str,
) -> Result<Option<OutageEvent>, sqlx::Error> {
    sqlx::query_as::<_, OutageEvent>(queries::SELECT_OUTAGE)
        .bind(event_id)
        .fetch_optional(&mut *conn)
        .await
}

/// Clears the active flag. Unknown or already inactive ids are left alone.
pub async fn deactivate(
    conn: &mut SqliteConnection,
    event_id: &str,
    at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(queries::DEACTIVATE_OUTAGE)
        .bind(event_id)
        .bind(at)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
