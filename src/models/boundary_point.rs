use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct BoundaryPoint {
    pub event_id: String,
    pub point_index: i64, // position within the reported hull
    pub lat: f64,
    pub lon: f64,
    pub active: bool,
}
