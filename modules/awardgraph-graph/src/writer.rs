use chrono::{DateTime, Utc};
use neo4rs::query;
use tracing::debug;

use awardgraph_common::{AwardGraphError, ContractAward};

use crate::GraphClient;

/// Write-side wrapper for the graph. Used by the ingest pipeline only.
pub struct AwardWriter {
    client: GraphClient,
}

impl AwardWriter {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Merge an award and its vendor/NAICS linkage in one transaction.
    ///
    /// Natural keys (PIID, UEI, NAICS code) make this idempotent:
    /// re-running the same award overwrites scalar attributes in place and
    /// never duplicates nodes or relationships. Concurrent upserts sharing
    /// a vendor rely on the store's own MERGE locking; cage code is
    /// last-write-wins.
    ///
    /// A store-side failure rolls the transaction back (the award is not
    /// persisted) and surfaces tagged with the PIID.
    pub async fn upsert_award(&self, award: &ContractAward) -> Result<(), AwardGraphError> {
        self.run_upsert(award)
            .await
            .map_err(|e| AwardGraphError::Upsert {
                piid: award.piid.clone(),
                message: e.to_string(),
            })?;
        debug!(piid = award.piid.as_str(), "Upserted award");
        Ok(())
    }

    async fn run_upsert(&self, award: &ContractAward) -> Result<(), neo4rs::Error> {
        let mut txn = self.client.graph.start_txn().await?;

        let merge_award = query(
            "MERGE (a:Award {piid: $piid})
             SET a.agency_code = $agency_code,
                 a.agency_name = $agency_name,
                 a.award_status = $award_status,
                 a.date_signed = $date_signed,
                 a.obligated_amount = $obligated_amount
             MERGE (v:Vendor {uei: $vendor_uei})
             SET v.cage_code = CASE WHEN $cage_code = '' THEN null ELSE $cage_code END
             MERGE (a)-[:AWARDED_TO]->(v)",
        )
        .param("piid", award.piid.as_str())
        .param("agency_code", award.agency_code.as_str())
        .param("agency_name", award.agency_name.as_str())
        .param("award_status", award.award_status.as_str())
        .param("date_signed", format_datetime(&award.date_signed))
        .param("obligated_amount", award.obligated_amount)
        .param("vendor_uei", award.vendor_uei.as_str())
        .param("cage_code", award.cage_code.clone().unwrap_or_default());

        txn.run(merge_award).await?;

        if let Some(naics) = &award.naics_code {
            let merge_naics = query(
                "MATCH (a:Award {piid: $piid})
                 MERGE (n:NAICSCode {code: $naics_code})
                 MERGE (a)-[:CATEGORIZED_AS]->(n)",
            )
            .param("piid", award.piid.as_str())
            .param("naics_code", naics.as_str());

            txn.run(merge_naics).await?;
        }

        txn.commit().await
    }
}

/// Datetimes are stored as fixed-width UTC strings, so lexicographic
/// comparison in Cypher matches chronological order.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
