//! Boundary points of each outage's reported convex hull.
//!
//! Points always mirror the latest hull: `replace` clears whatever an event
//! had before. Deactivation flips the `active` flag and keeps the rows, so the
//! last known footprint of a cleared outage stays queryable. Rows only go away
//! through the foreign-key cascade when the owning outage is deleted.

use crate::db::queries;
use crate::models::provider::HullPoint;
use sqlx::SqliteConnection;

/// Replaces the event's points with `hull`, keeping arrival order in `point_index`.
///
/// Callers run this inside the same transaction as the outage upsert; the
/// owning row must exist or the foreign key rejects the insert.
pub async fn replace(
    conn: &mut SqliteConnection,
    event_id: &str,
    hull: &[HullPoint],
) -> Result<(), sqlx::Error> {
    sqlx::query(queries::DELETE_COORDINATES)
        .bind(event_id)
        .execute(&mut *conn)
        .await?;

    for (index, point) in hull.iter().enumerate() {
        sqlx::query(queries::INSERT_COORDINATE)
            .bind(event_id)
            .bind(index as i64)
            .bind(point.lat)
            .bind(point.lon)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn deactivate(conn: &mut SqliteConnection, event_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(queries::DEACTIVATE_COORDINATES)
        .bind(event_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
pub async fn points_for(
    conn: &mut SqliteConnection,
    event_id: &str,
) -> Result<Vec<crate::models::boundary_point::BoundaryPoint>, sqlx::Error> {
    sqlx::query_as(queries::SELECT_COORDINATES)
        .bind(event_id)
        .fetch_all(&mut *conn)
        .await
}
