//! The extraction pipeline: resolve navigation targets, scrape course
//! pages, aggregate, persist.
//!
//! The pipeline is strictly sequential. Each course selection needs a fresh
//! single-use token, so there is no concurrent fan-out; parallel
//! submissions would invalidate tokens out of order.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;
use url::Url;

use crate::data::aggregate::augment;
use crate::data::records::MarkRecord;
use crate::data::store::{self, RecordStore};
use crate::emarks::EmarksClient;

/// The product of a successful extraction run.
#[derive(Debug)]
pub struct ExtractionOutcome {
    /// Resolved course page URLs, in navigation order.
    pub urls: Vec<Url>,
    /// The augmented record list, as persisted.
    pub records: Vec<MarkRecord>,
}

/// Run the full pipeline against the live site and persist the result.
///
/// The store is only touched once the whole pipeline has succeeded; a
/// failure anywhere leaves prior stored data intact. Success with zero
/// records is a valid outcome, not an error.
pub async fn run_extraction(
    client: &EmarksClient,
    record_store: &mut dyn RecordStore,
) -> Result<ExtractionOutcome> {
    let page = client
        .fetch_marks_page()
        .await
        .context("Failed to load the marks page")?;

    let urls = client
        .resolve_amendment_urls(&page)
        .await
        .context("Failed to resolve course page URLs")?;
    info!(urls = urls.len(), "Resolved course pages");

    let mut rows = Vec::new();
    for url in &urls {
        let page_rows = client
            .fetch_course_rows(url)
            .await
            .with_context(|| format!("Failed to extract course page {url}"))?;
        rows.extend(page_rows);
    }

    let records = augment(rows);
    store::persist_records(record_store, &records).context("Failed to persist records")?;

    info!(
        urls = urls.len(),
        records = records.len(),
        "Extraction complete"
    );
    Ok(ExtractionOutcome { urls, records })
}

/// Structured result reported to whatever triggered the run.
///
/// A failed run reports its error string here instead of crashing the
/// host; success does not imply a non-empty dataset.
#[derive(Debug, Serialize)]
pub struct ExtractionReport {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<MarkRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionReport {
    pub fn success(outcome: ExtractionOutcome) -> Self {
        Self {
            ok: true,
            urls: Some(outcome.urls.iter().map(Url::to_string).collect()),
            records: Some(outcome.records),
            error: None,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            ok: false,
            urls: None,
            records: None,
            error: Some(error),
        }
    }
}
