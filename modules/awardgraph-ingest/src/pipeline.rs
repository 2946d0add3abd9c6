use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use awardgraph_common::{
    AwardGraphError, ContractAward, ExtractionFailure, FeedEntry, SearchCriteria,
};
use awardgraph_feed::{build_query, extract, FeedFetcher};
use awardgraph_graph::AwardWriter;

/// How many award upserts run concurrently. Each holds one pooled store
/// connection for the duration of its transaction.
const MAX_CONCURRENT_UPSERTS: usize = 8;

/// Outcome of one feed poll. `processed_count` counts awards actually
/// persisted, which can be less than the number of entries fetched.
#[derive(Debug, Serialize)]
pub struct FeedReport {
    pub processed_count: usize,
    pub awards: Vec<ContractAward>,
    pub failures: Vec<EntryFailure>,
}

/// A single entry that did not make it into the graph, tagged with the
/// stage that rejected it so callers can build a retry policy.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum EntryFailure {
    Extraction(ExtractionFailure),
    Upsert { piid: String, message: String },
}

/// The fetch → extract → upsert pipeline, invoked once per poll.
pub struct FeedPipeline {
    fetcher: FeedFetcher,
    writer: AwardWriter,
    base_url: String,
    batch_size: usize,
}

impl FeedPipeline {
    pub fn new(writer: AwardWriter, base_url: impl Into<String>, batch_size: usize) -> Self {
        Self {
            fetcher: FeedFetcher::new(),
            writer,
            base_url: base_url.into(),
            batch_size,
        }
    }

    /// Run one full poll. A fetch failure aborts with nothing written;
    /// per-entry extraction and upsert failures are collected and never
    /// abort the batch.
    pub async fn process_feed(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<FeedReport, AwardGraphError> {
        let url = build_query(criteria, &self.base_url)?;
        let mut entries = self.fetcher.fetch(&url).await?;
        entries.truncate(self.batch_size);
        Ok(self.process_entries(entries).await)
    }

    /// Extract and upsert a batch of already-fetched entries.
    pub async fn process_entries(&self, entries: Vec<FeedEntry>) -> FeedReport {
        let fetched = entries.len();
        let mut awards = Vec::new();
        let mut failures = Vec::new();

        for entry in &entries {
            match extract(entry) {
                Ok(award) => awards.push(award),
                Err(failure) => {
                    warn!(
                        entry_id = failure.entry_id.as_str(),
                        problems = failure.problems.len(),
                        "Entry extraction failed"
                    );
                    failures.push(EntryFailure::Extraction(failure));
                }
            }
        }

        // Upserts are commutative per award (natural-key merges), so
        // completion order does not matter.
        let writer = &self.writer;
        let results: Vec<(ContractAward, Result<(), AwardGraphError>)> =
            stream::iter(awards.into_iter().map(|award| async move {
                let result = writer.upsert_award(&award).await;
                (award, result)
            }))
            .buffer_unordered(MAX_CONCURRENT_UPSERTS)
            .collect()
            .await;

        let mut persisted = Vec::new();
        for (award, result) in results {
            match result {
                Ok(()) => persisted.push(award),
                Err(e) => {
                    warn!(piid = award.piid.as_str(), error = %e, "Award upsert failed");
                    let message = match e {
                        AwardGraphError::Upsert { message, .. } => message,
                        other => other.to_string(),
                    };
                    failures.push(EntryFailure::Upsert {
                        piid: award.piid.clone(),
                        message,
                    });
                }
            }
        }

        info!(
            fetched,
            processed = persisted.len(),
            failed = failures.len(),
            "Feed batch complete"
        );

        FeedReport {
            processed_count: persisted.len(),
            awards: persisted,
            failures,
        }
    }
}
