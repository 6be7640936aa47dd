pub const CREATE_OUTAGES: &str = r#"
CREATE TABLE IF NOT EXISTS outages (
    event_id TEXT NOT NULL PRIMARY KEY,
    county TEXT NOT NULL,
    customers_affected INTEGER NOT NULL CHECK (customers_affected >= 0),
    active INTEGER NOT NULL,
    device_lat REAL,
    device_lon REAL,
    cause TEXT,
    first_seen_at TEXT NOT NULL,
    last_seen_at TEXT NOT NULL,
    deactivated_at TEXT
);
"#;

pub const CREATE_OUTAGES_ACTIVE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_outages_active ON outages (active);
"#;

pub const CREATE_COORDINATES: &str = r#"
CREATE TABLE IF NOT EXISTS coordinates (
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    event_id TEXT NOT NULL REFERENCES outages (event_id) ON DELETE CASCADE,
    point_index INTEGER NOT NULL,
    lat REAL NOT NULL,
    lon REAL NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    UNIQUE (event_id, point_index)
);
"#;

pub const UPSERT_OUTAGE: &str = r#"
INSERT INTO outages (
    event_id, county, customers_affected, active, device_lat, device_lon, cause,
    first_seen_at, last_seen_at, deactivated_at
) VALUES ($1, $2, $3, 1, $4, $5, $6, $7, $7, NULL)
ON CONFLICT (event_id) DO UPDATE
SET county = excluded.county,
    customers_affected = excluded.customers_affected,
    active = 1,
    device_lat = excluded.device_lat,
    device_lon = excluded.device_lon,
    cause = excluded.cause,
    last_seen_at = excluded.last_seen_at,
    deactivated_at = NULL;
"#;

pub const SELECT_ACTIVE_OUTAGE_IDS: &str = r#"
SELECT event_id FROM outages WHERE active = 1 ORDER BY event_id;
"#;

pub const SELECT_OUTAGE: &str = r#"
SELECT event_id, county, customers_affected, active, device_lat, device_lon, cause,
       first_seen_at, last_seen_at, deactivated_at
FROM outages
WHERE event_id = $1;
"#;

pub const DEACTIVATE_OUTAGE: &str = r#"
UPDATE outages
SET active = 0,
    deactivated_at = $2
WHERE event_id = $1 AND active = 1;
"#;

pub const DELETE_COORDINATES: &str = r#"
DELETE FROM coordinates WHERE event_id = $1;
"#;

pub const INSERT_COORDINATE: &str = r#"
INSERT INTO coordinates (event_id, point_index, lat, lon, active)
VALUES ($1, $2, $3, $4, 1);
"#;

pub const DEACTIVATE_COORDINATES: &str = r#"
UPDATE coordinates SET active = 0 WHERE event_id = $1 AND active = 1;
"#;

#[cfg(test)]
pub const SELECT_COORDINATES: &str = r#"
SELECT event_id, point_index, lat, lon, active
FROM coordinates
WHERE event_id = $1
ORDER BY point_index;
"#;
