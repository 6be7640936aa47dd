use crate::models::outage::OutageEvent;
use crate::models::provider::OutageRecord;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::collections::BTreeSet;
use std::str::FromStr;

pub mod coordinates;
pub mod outages;
pub mod queries;

pub type DbPool = Pool<Sqlite>;

pub async fn init_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full);

    // One writer; the reconciler never issues concurrent statements.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    for statement in [
        queries::CREATE_OUTAGES,
        queries::CREATE_OUTAGES_ACTIVE_INDEX,
        queries::CREATE_COORDINATES,
    ] {
        sqlx::query(statement).execute(&pool).await?;
    }
    Ok(pool)
}

/// An outage as stored right before it was deactivated.
#[derive(Debug)]
pub struct Deactivated {
    pub event: OutageEvent,
    pub points: u64,
}

/// Transactional access to the outage and coordinate tables.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

impl Store {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Upserts the event and replaces its hull in one transaction.
    pub async fn record_match(
        &self,
        record: &OutageRecord,
        county: &str,
        seen_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        outages::upsert(&mut tx, record, county, seen_at).await?;
        coordinates::replace(&mut tx, &record.event_id, &record.convex_hull).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn active_ids(&self) -> Result<BTreeSet<String>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        outages::active_ids(&mut conn).await
    }

    /// Marks the event and its boundary points inactive in one transaction.
    ///
    /// Returns `None` for an unknown id.
    pub async fn deactivate(
        &self,
        event_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Deactivated>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let Some(event) = outages::get(&mut tx, event_id).await? else {
            return Ok(None);
        };
        outages::deactivate(&mut tx, event_id, at).await?;
        let points = coordinates::deactivate(&mut tx, event_id).await?;
        tx.commit().await?;
        Ok(Some(Deactivated { event, points }))
    }

    #[cfg(test)]
    pub async fn get(&self, event_id: &str) -> Result<Option<OutageEvent>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        outages::get(&mut conn, event_id).await
    }

    #[cfg(test)]
    pub async fn points(
        &self,
        event_id: &str,
    ) -> Result<Vec<crate::models::boundary_point::BoundaryPoint>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        coordinates::points_for(&mut conn, event_id).await
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::provider::HullPoint;

    fn record(event_id: &str, hull: &[(f64, f64)]) -> OutageRecord {
        OutageRecord {
            event_id: event_id.to_string(),
            device_lat: 36.1,
            device_lon: -80.2,
            customers_affected: 12,
            convex_hull: hull
                .iter()
                .map(|&(lat, lon)| HullPoint { lat, lon })
                .collect(),
            cause: Some("weather".to_string()),
        }
    }

    #[tokio::test]
    async fn test_record_match_survives_reopen() {
        let (store, dir) = temp_store().await;
        let seen_at = Utc::now();
        store
            .record_match(&record("E1", &[(1.0, 2.0), (3.0, 4.0)]), "Forsyth", seen_at)
            .await
            .unwrap();
        drop(store);

        let reopened = Store::new(init_pool(&database_url(&dir)).await.unwrap());
        let event = reopened.get("E1").await.unwrap().unwrap();
        assert!(event.active);
        assert_eq!(event.county, "Forsyth");
        assert_eq!(reopened.points("E1").await.unwrap().len(), 2);
        assert_eq!(
            reopened.active_ids().await.unwrap(),
            BTreeSet::from(["E1".to_string()])
        );
    }

    #[tokio::test]
    async fn test_deactivate_marks_both_tables() {
        let (store, _dir) = temp_store().await;
        store
            .record_match(&record("E1", &[(1.0, 2.0), (3.0, 4.0)]), "Forsyth", Utc::now())
            .await
            .unwrap();

        let previous = store.deactivate("E1", Utc::now()).await.unwrap().unwrap();
        assert!(previous.event.active);
        assert_eq!(previous.points, 2);

        let event = store.get("E1").await.unwrap().unwrap();
        assert!(!event.active);
        assert!(event.deactivated_at.is_some());
        let points = store.points("E1").await.unwrap();
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| !p.active));
        assert!(store.active_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deactivate_unknown_is_noop() {
        let (store, _dir) = temp_store().await;
        assert!(store.deactivate("missing", Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rematch_reactivates_with_fresh_hull() {
        let (store, _dir) = temp_store().await;
        store
            .record_match(&record("E1", &[(1.0, 2.0), (3.0, 4.0)]), "Forsyth", Utc::now())
            .await
            .unwrap();
        store.deactivate("E1", Utc::now()).await.unwrap();

        store
            .record_match(&record("E1", &[(5.0, 6.0)]), "Forsyth", Utc::now())
            .await
            .unwrap();

        let event = store.get("E1").await.unwrap().unwrap();
        assert!(event.active);
        assert!(event.deactivated_at.is_none());
        let points = store.points("E1").await.unwrap();
        assert_eq!(points.len(), 1);
        assert!(points[0].active);
        assert_eq!((points[0].lat, points[0].lon), (5.0, 6.0));
    }
}
