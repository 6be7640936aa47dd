use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct OutageEvent {
    pub event_id: String,
    pub county: String,
    pub customers_affected: i64, // CHECK (customers_affected >= 0)
    pub active: bool,
    pub device_lat: Option<f64>,
    pub device_lon: Option<f64>,
    pub cause: Option<String>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub deactivated_at: Option<DateTime<Utc>>,
}
