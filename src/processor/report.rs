use crate::models::provider::{AreaOfInterest, OutageRecord};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;

/// Outcome of one reconciliation cycle, for display.
#[derive(Debug)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub areas: Vec<AreaReport>,
    pub matched: Vec<MatchedOutage>,
    pub skipped: Vec<SkippedEvent>,
    pub outside_service_area: usize,
    pub deactivated: Vec<ClearedOutage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AreaReport {
    pub name: String,
    pub customers_served: u64,
    pub active_events: u64,
    pub max_customers_affected: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchedOutage {
    pub event_id: String,
    pub county: String,
    pub customers_affected: u32,
    pub device_lat: f64,
    pub device_lon: f64,
    pub cause: Option<String>,
    pub boundary_points: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEvent {
    pub event_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClearedOutage {
    pub event_id: String,
    pub county: String,
    pub customers_affected: i64,
    pub first_seen_at: DateTime<Utc>,
    pub boundary_points: u64,
}

impl CycleReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            areas: Vec::new(),
            matched: Vec::new(),
            skipped: Vec::new(),
            outside_service_area: 0,
            deactivated: Vec::new(),
        }
    }
}

impl AreaReport {
    /// Keeps the areas whose county is one of the service areas.
    pub fn for_service_areas(
        areas: Vec<AreaOfInterest>,
        service_areas: &BTreeSet<String>,
    ) -> Vec<AreaReport> {
        areas
            .into_iter()
            .filter(|area| service_areas.contains(&area.county_name))
            .map(|area| {
                let summary = area.area_of_interest_summary.unwrap_or_default();
                AreaReport {
                    name: area.area_of_interest_name,
                    customers_served: area.customers_served,
                    active_events: summary.active_events_count,
                    max_customers_affected: summary.max_customers_affected,
                }
            })
            .collect()
    }
}

impl MatchedOutage {
    pub fn new(record: &OutageRecord, county: &str) -> Self {
        Self {
            event_id: record.event_id.clone(),
            county: county.to_string(),
            customers_affected: record.customers_affected,
            device_lat: record.device_lat,
            device_lon: record.device_lon,
            cause: record.cause.clone(),
            boundary_points: record.convex_hull.len(),
        }
    }

    pub fn map_url(&self) -> String {
        format!(
            "https://www.google.com/maps/search/{:.6},+{:.6}",
            self.device_lat, self.device_lon
        )
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cycle started at {}", self.started_at.to_rfc3339())?;

        for area in &self.areas {
            if area.active_events > 0 {
                writeln!(
                    f,
                    "{}, Customers Served: {}, Active Outage Count: {}, Customers Affected: {}",
                    area.name, area.customers_served, area.active_events, area.max_customers_affected
                )?;
            } else {
                writeln!(
                    f,
                    "{}, Customers Served: {} No Active Outages",
                    area.name, area.customers_served
                )?;
            }
        }

        writeln!(f, "Matched outages: {}", self.matched.len())?;
        for outage in &self.matched {
            writeln!(
                f,
                "  Event {} ({}): {} customers affected, cause: {}",
                outage.event_id,
                outage.county,
                outage.customers_affected,
                outage.cause.as_deref().unwrap_or("unknown")
            )?;
            writeln!(
                f,
                "    Location: {:.6}, {:.6} {}",
                outage.device_lat,
                outage.device_lon,
                outage.map_url()
            )?;
            writeln!(f, "    Boundary points: {}", outage.boundary_points)?;
        }

        if !self.skipped.is_empty() {
            writeln!(f, "Skipped events: {}", self.skipped.len())?;
            for skipped in &self.skipped {
                writeln!(
                    f,
                    "  Event {}: {}",
                    skipped.event_id.as_deref().unwrap_or("<unknown>"),
                    skipped.reason
                )?;
            }
        }
        writeln!(f, "Events outside service area: {}", self.outside_service_area)?;

        for cleared in &self.deactivated {
            writeln!(
                f,
                "  Cleared {} ({}): {} customers, first seen {}, {} boundary points deactivated",
                cleared.event_id,
                cleared.county,
                cleared.customers_affected,
                cleared.first_seen_at.to_rfc3339(),
                cleared.boundary_points
            )?;
        }
        write!(f, "Total count of outages cleared: {}", self.deactivated.len())
    }
}
