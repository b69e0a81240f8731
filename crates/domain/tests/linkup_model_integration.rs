//! Integration tests for the LibreLinkUp model as seen by downstream crates.

use chrono::{TimeZone, Utc};
use glucolink_domain::{
    endpoint_by_region, parse_linkup_timestamp, CgmEntry, GlucolinkError, GraphData,
    SchedulerState, Settings, DEFAULT_ENDPOINT, ENDPOINTS,
};

#[test]
fn graph_samples_convert_to_entries() {
    let graph: GraphData = serde_json::from_str(
        r#"{
            "graphData": [
                { "FactoryTimestamp": "6/1/2023 10:05:35 AM", "Value": 3.7 },
                { "FactoryTimestamp": "6/1/2023 10:20:35 AM", "Value": 4.1 }
            ]
        }"#,
    )
    .unwrap();

    let entries: Vec<CgmEntry> = graph
        .graph_data
        .iter()
        .map(|m| CgmEntry::new(parse_linkup_timestamp(&m.factory_timestamp).unwrap(), m.value))
        .collect();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].timestamp, Utc.with_ymd_and_hms(2023, 6, 1, 10, 5, 35).unwrap());
    assert_eq!(entries[0].to_string(), "3.7@2023-06-01T10:05:35Z");
    assert!(entries[0].timestamp < entries[1].timestamp);
}

#[test]
fn malformed_timestamp_is_invalid_input() {
    let err = parse_linkup_timestamp("2023-06-01T10:05:35Z").unwrap_err();
    assert!(matches!(err, GlucolinkError::InvalidInput(_)));
}

#[test]
fn settings_region_resolves_through_catalog() {
    let settings = Settings::new("viewer@example.com", "secret", "ap");
    let endpoint = endpoint_by_region(&settings.libre_link_up_region).unwrap();

    assert_eq!(endpoint.hostname, "api-ap.libreview.io");
    assert_eq!(ENDPOINTS.len(), 10);
    assert_ne!(endpoint, DEFAULT_ENDPOINT);
}

#[test]
fn scheduler_state_labels_round_trip() {
    for state in [
        SchedulerState::Idle,
        SchedulerState::Running,
        SchedulerState::Stopping,
        SchedulerState::Stopped,
    ] {
        assert_eq!(state.to_string().parse::<SchedulerState>(), Ok(state));
    }
}
