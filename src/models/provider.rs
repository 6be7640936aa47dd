use crate::error::FetchError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Public outage-map configuration document. Only the API credentials matter here.
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    #[serde(rename = "consumer_key_emp")]
    pub consumer_key: String,
    #[serde(rename = "consumer_secret_emp")]
    pub consumer_secret: String,
}

/// Envelope shared by the counties and outages endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(rename = "errorMessages", default)]
    pub error_messages: Vec<Value>,
}

impl<T> Envelope<T> {
    /// Unwraps `data`. Any provider error message fails the request, since an
    /// error envelope carries an empty `data` array.
    pub fn into_data(self, url: &str) -> Result<Vec<T>, FetchError> {
        if self.error_messages.is_empty() {
            return Ok(self.data);
        }
        let messages = self
            .error_messages
            .iter()
            .map(|m| match m {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        Err(FetchError::Rejected {
            url: url.to_string(),
            messages,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaOfInterest {
    pub area_of_interest_name: String,
    #[serde(default)]
    pub county_name: String,
    #[serde(default)]
    pub customers_served: u64,
    pub area_of_interest_summary: Option<AreaSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaSummary {
    #[serde(default)]
    pub max_customers_affected: u64,
    #[serde(default)]
    pub active_events_count: u64,
}

/// One outage event as reported by the provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutageRecord {
    #[serde(rename = "sourceEventNumber", deserialize_with = "event_id_string")]
    pub event_id: String,
    #[serde(rename = "deviceLatitudeLocation")]
    pub device_lat: f64,
    #[serde(rename = "deviceLongitudeLocation")]
    pub device_lon: f64,
    #[serde(rename = "customersAffectedNumber", default)]
    pub customers_affected: u32,
    #[serde(default)]
    pub convex_hull: Vec<HullPoint>,
    #[serde(rename = "outageCause", default)]
    pub cause: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HullPoint {
    pub lat: f64,
    #[serde(rename = "lng")]
    pub lon: f64,
}

/// A record from the outages response that could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    pub event_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct OutageBatch {
    pub events: Vec<OutageRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl OutageBatch {
    /// Decodes the `data` array record by record so one bad entry does not
    /// discard the rest of the response.
    pub fn from_raw(raw: Vec<Value>) -> Self {
        let mut batch = OutageBatch::default();
        for value in raw {
            let event_id = value
                .get("sourceEventNumber")
                .and_then(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|id| !id.trim().is_empty());
            match serde_json::from_value::<OutageRecord>(value) {
                Ok(record) if record.event_id.trim().is_empty() => {
                    batch.rejected.push(RejectedRecord {
                        event_id: None,
                        reason: "empty event id".to_string(),
                    });
                }
                Ok(record) => batch.events.push(record),
                Err(e) => batch.rejected.push(RejectedRecord {
                    event_id,
                    reason: format!("malformed record: {}", e),
                }),
            }
        }
        batch
    }
}

/// Reverse geocoding reply. Only the county is used for classification.
#[derive(Debug, Default, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub address: Address,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub county: String,
}

fn event_id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => Ok(s),
        StringOrNumber::Number(n) => Ok(n.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsing_outages_payload() {
        let payload = r#"
        {
            "data": [
                {
                    "sourceEventNumber": "2409171234",
                    "deviceLatitudeLocation": 36.0999,
                    "deviceLongitudeLocation": -80.2442,
                    "customersAffectedNumber": 42,
                    "convexHull": [
                        {"lat": 36.10, "lng": -80.25},
                        {"lat": 36.11, "lng": -80.24},
                        {"lat": 36.09, "lng": -80.23}
                    ],
                    "outageCause": "tree-on-line",
                    "crewStatus": "ASSIGNED"
                },
                {
                    "sourceEventNumber": 2409175678,
                    "deviceLatitudeLocation": 35.2271,
                    "deviceLongitudeLocation": -80.8431,
                    "customersAffectedNumber": 3,
                    "convexHull": []
                },
                {
                    "sourceEventNumber": "2409179999",
                    "deviceLatitudeLocation": "not-a-number",
                    "deviceLongitudeLocation": -80.1,
                    "customersAffectedNumber": 1
                },
                {
                    "sourceEventNumber": "2409170000",
                    "deviceLatitudeLocation": 36.0,
                    "deviceLongitudeLocation": -80.1,
                    "customersAffectedNumber": -5
                },
                {
                    "sourceEventNumber": "  ",
                    "deviceLatitudeLocation": 36.0,
                    "deviceLongitudeLocation": -80.1,
                    "customersAffectedNumber": 7
                }
            ],
            "errorMessages": []
        }
        "#;

        let envelope: Envelope<Value> = serde_json::from_str(payload).unwrap();
        let batch = OutageBatch::from_raw(envelope.data);

        assert_eq!(batch.events.len(), 2);
        let first = &batch.events[0];
        assert_eq!(first.event_id, "2409171234");
        assert_eq!(first.customers_affected, 42);
        assert_eq!(first.convex_hull.len(), 3);
        assert_eq!(first.convex_hull[0], HullPoint { lat: 36.10, lon: -80.25 });
        assert_eq!(first.cause.as_deref(), Some("tree-on-line"));

        let second = &batch.events[1];
        assert_eq!(second.event_id, "2409175678");
        assert!(second.cause.is_none());

        assert_eq!(batch.rejected.len(), 3);
        assert_eq!(batch.rejected[0].event_id.as_deref(), Some("2409179999"));
        assert_eq!(batch.rejected[1].event_id.as_deref(), Some("2409170000"));
        assert_eq!(batch.rejected[2].event_id, None);
        assert_eq!(batch.rejected[2].reason, "empty event id");
    }

    #[test]
    fn test_parsing_counties_payload() {
        let payload = r#"
        {
            "data": [
                {
                    "areaOfInterestId": 109,
                    "areaOfInterestName": "Forsyth",
                    "customersServed": 171234,
                    "countyName": "Forsyth",
                    "state": "NC",
                    "jurisdiction": "DEC",
                    "areaOfInterestSummary": {
                        "areaOfInterestId": 109,
                        "maxCustomersAffected": 57,
                        "activeEventsCount": 4,
                        "restoredEventsCount": null
                    }
                },
                {
                    "areaOfInterestName": "Stokes",
                    "customersServed": 9000,
                    "countyName": "Stokes",
                    "areaOfInterestSummary": null
                }
            ],
            "errorMessages": []
        }
        "#;

        let envelope: Envelope<AreaOfInterest> = serde_json::from_str(payload).unwrap();
        assert_eq!(envelope.data.len(), 2);
        let forsyth = &envelope.data[0];
        assert_eq!(forsyth.county_name, "Forsyth");
        assert_eq!(forsyth.customers_served, 171234);
        let summary = forsyth.area_of_interest_summary.as_ref().unwrap();
        assert_eq!(summary.active_events_count, 4);
        assert_eq!(summary.max_customers_affected, 57);
        assert!(envelope.data[1].area_of_interest_summary.is_none());
    }

    #[test]
    fn test_counties_envelope_without_data() {
        let envelope: Envelope<AreaOfInterest> =
            serde_json::from_str(r#"{"errorMessages": []}"#).unwrap();
        assert!(envelope.into_data("https://provider.test/counties").unwrap().is_empty());
    }

    #[test]
    fn test_error_envelope_is_rejected() {
        let payload = r#"{
            "data": [],
            "errorMessages": ["Service temporarily unavailable", {"code": 42}]
        }"#;
        let envelope: Envelope<Value> = serde_json::from_str(payload).unwrap();

        let err = envelope
            .into_data("https://provider.test/outages")
            .unwrap_err();
        assert!(matches!(err, FetchError::Rejected { .. }));
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "https://provider.test/outages reported errors: Service temporarily unavailable; {\"code\":42}"
        );
    }

    #[test]
    fn test_parsing_geocode_payload() {
        let payload = r#"
        {
            "place_id": 332211,
            "licence": "Data © OpenStreetMap contributors, ODbL 1.0.",
            "osm_type": "way",
            "lat": "36.0999",
            "lon": "-80.2442",
            "display_name": "West 4th Street, Winston-Salem, Forsyth County, North Carolina, 27101, United States",
            "address": {
                "road": "West 4th Street",
                "city": "Winston-Salem",
                "county": "Forsyth County",
                "state": "North Carolina",
                "postcode": "27101",
                "country_code": "us"
            },
            "boundingbox": ["36.09", "36.10", "-80.25", "-80.24"]
        }
        "#;
        let reply: GeocodeResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(reply.address.county, "Forsyth County");

        let unresolved: GeocodeResponse =
            serde_json::from_str(r#"{"error": "Unable to geocode"}"#).unwrap();
        assert_eq!(unresolved.address.county, "");
    }

    #[test]
    fn test_parsing_provider_config() {
        let payload = r#"{
            "emp": "duke",
            "consumer_key_emp": "key",
            "consumer_secret_emp": "secret",
            "outages_url": "https://example.test"
        }"#;
        let config: ProviderConfig = serde_json::from_str(payload).unwrap();
        assert_eq!(config.consumer_key, "key");
        assert_eq!(config.consumer_secret, "secret");
    }
}
