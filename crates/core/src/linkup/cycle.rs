//! One scrape cycle: fetch the graph and convert samples, then persist the
//! batch as a separate step.

use glucolink_domain::{parse_linkup_timestamp, CgmEntry, GlucoseMeasurement, Session};
use tracing::{debug, warn};

use super::errors::ScrapeError;
use super::ports::LinkUpApi;
use crate::store::ports::GlucoseStore;

/// Samples that survived conversion plus the number dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertedBatch {
    pub entries: Vec<CgmEntry>,
    pub dropped: usize,
}

/// Outcome of a successful cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub stored: usize,
    pub dropped: usize,
}

/// Convert raw samples into canonical entries.
///
/// A sample whose factory timestamp does not parse is dropped and logged;
/// the rest of the batch is unaffected.
pub fn convert_measurements(samples: &[GlucoseMeasurement]) -> ConvertedBatch {
    let mut batch = ConvertedBatch { entries: Vec::with_capacity(samples.len()), dropped: 0 };

    for sample in samples {
        match parse_linkup_timestamp(&sample.factory_timestamp) {
            Ok(timestamp) => batch.entries.push(CgmEntry::new(timestamp, sample.value)),
            Err(_) => {
                let err = ScrapeError::TimestampParse { raw: sample.factory_timestamp.clone() };
                warn!(error = %err, "dropping glucose sample");
                batch.dropped += 1;
            }
        }
    }

    batch
}

/// Converted samples of one graph fetch, ready to persist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedBatch {
    /// Samples in the graph response, before conversion.
    pub fetched: usize,
    pub converted: ConvertedBatch,
}

/// Fetch the graph for `patient_id` and convert its samples.
pub async fn fetch_batch(
    api: &dyn LinkUpApi,
    session: &mut Session,
    patient_id: &str,
) -> Result<FetchedBatch, ScrapeError> {
    let graph = api.fetch_graph(session, patient_id).await?;

    if let Some(latest) = &graph.connection.glucose_measurement {
        debug!(
            patient_id = %patient_id,
            timestamp = %latest.factory_timestamp,
            value = latest.value,
            sensors = graph.active_sensors.len(),
            "latest LibreLinkUp reading"
        );
    }

    Ok(FetchedBatch {
        fetched: graph.graph_data.len(),
        converted: convert_measurements(&graph.graph_data),
    })
}

/// Hand the batch to the store in a single call, even when empty.
pub async fn persist_batch(
    store: &dyn GlucoseStore,
    batch: &FetchedBatch,
) -> Result<CycleReport, ScrapeError> {
    store.save_cgm(&batch.converted.entries).await?;

    Ok(CycleReport {
        fetched: batch.fetched,
        stored: batch.converted.entries.len(),
        dropped: batch.converted.dropped,
    })
}
