use crate::config::ServiceConfig;
use crate::db::Store;
use crate::error::CycleError;
use crate::geocode::Geocoder;
use crate::processor::classifier::classify;
use crate::processor::report::{AreaReport, ClearedOutage, CycleReport, MatchedOutage, SkippedEvent};
use crate::provider::OutageSource;
use chrono::Utc;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Runs polling cycles: fetch, classify, upsert, then deactivate what went stale.
///
/// Owns the store; nothing else writes to it while a cycle runs.
pub struct Reconciler<S, G> {
    service: ServiceConfig,
    source: S,
    geocoder: G,
    store: Store,
    geocode_interval: Duration,
}

impl<S: OutageSource, G: Geocoder> Reconciler<S, G> {
    pub fn new(
        service: ServiceConfig,
        source: S,
        geocoder: G,
        store: Store,
        geocode_interval: Duration,
    ) -> Self {
        Self {
            service,
            source,
            geocoder,
            store,
            geocode_interval,
        }
    }

    pub async fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        let span = info_span!(
            "cycle",
            cycle_id = %Uuid::new_v4(),
            jurisdiction = %self.service.jurisdiction
        );
        self.reconcile().instrument(span).await
    }

    async fn reconcile(&mut self) -> Result<CycleReport, CycleError> {
        let started_at = Utc::now();
        let mut report = CycleReport::new(started_at);

        // 1. Fetch
        self.source.authenticate().await.map_err(CycleError::Auth)?;

        match self.source.fetch_counties().await {
            Ok(areas) => {
                report.areas = AreaReport::for_service_areas(areas, &self.service.service_areas)
            }
            Err(e) => warn!("Counties fetch failed, area summary unavailable: {}", e),
        }

        // Without a trustworthy outage list every stored event would look stale.
        let batch = self.source.fetch_outages().await.map_err(CycleError::Fetch)?;
        info!(
            "Fetched {} outage events ({} rejected)",
            batch.events.len(),
            batch.rejected.len()
        );
        for rejected in batch.rejected {
            warn!(
                "Skipping outage record {:?}: {}",
                rejected.event_id, rejected.reason
            );
            report.skipped.push(SkippedEvent {
                event_id: rejected.event_id,
                reason: rejected.reason,
            });
        }

        // 2. Classify & upsert
        let mut matched_ids = BTreeSet::new();
        let mut processed = BTreeSet::new();
        let mut last_geocode = None;
        let mut geocoded = 0usize;
        let mut unreachable = None;

        for record in &batch.events {
            if !processed.insert(record.event_id.as_str()) {
                debug!("Event {} listed twice, keeping first report", record.event_id);
                continue;
            }

            self.throttle(last_geocode).await;
            let lookup = self
                .geocoder
                .reverse(record.device_lat, record.device_lon)
                .await;
            last_geocode = Some(Instant::now());
            let address = match lookup {
                Ok(address) => address,
                Err(e) => {
                    warn!("Geocode failed for event {}: {}", record.event_id, e);
                    report.skipped.push(SkippedEvent {
                        event_id: Some(record.event_id.clone()),
                        reason: format!("geocode failed: {}", e),
                    });
                    if e.is_transient() {
                        unreachable = Some(e);
                    }
                    continue;
                }
            };
            geocoded += 1;

            let Some(county) = classify(&address.county, &self.service.service_areas) else {
                debug!(
                    "Event {} in {:?} is outside the service area",
                    record.event_id, address.county
                );
                report.outside_service_area += 1;
                continue;
            };

            self.store.record_match(record, county, started_at).await?;
            info!(
                "Recorded outage {} in {} ({} customers, {} boundary points)",
                record.event_id,
                county,
                record.customers_affected,
                record.convex_hull.len()
            );
            matched_ids.insert(record.event_id.clone());
            report.matched.push(MatchedOutage::new(record, county));
        }

        // Nothing located and the geocoder looked down: every stored event
        // would look stale.
        if geocoded == 0 {
            if let Some(e) = unreachable {
                return Err(CycleError::Geocode(e));
            }
        }

        // 3. Reconcile
        let stale: Vec<String> = self
            .store
            .active_ids()
            .await?
            .difference(&matched_ids)
            .cloned()
            .collect();

        let deactivated_at = Utc::now();
        for event_id in stale {
            if let Some(cleared) = self.store.deactivate(&event_id, deactivated_at).await? {
                info!("Deactivated outage {}", event_id);
                report.deactivated.push(ClearedOutage {
                    event_id,
                    county: cleared.event.county,
                    customers_affected: cleared.event.customers_affected,
                    first_seen_at: cleared.event.first_seen_at,
                    boundary_points: cleared.points,
                });
            }
        }

        // 4. Report
        info!(
            "Cycle finished: {} matched, {} skipped, {} outside service area, {} cleared",
            report.matched.len(),
            report.skipped.len(),
            report.outside_service_area,
            report.deactivated.len()
        );
        Ok(report)
    }

    /// Waits until `geocode_interval` has passed since the previous lookup returned.
    async fn throttle(&self, last: Option<Instant>) {
        if let Some(previous) = last {
            let elapsed = previous.elapsed();
            if elapsed < self.geocode_interval {
                tokio::time::sleep(self.geocode_interval - elapsed).await;
            }
        }
    }
}
