use chrono::{DateTime, NaiveDateTime, Utc};
use neo4rs::query;

use awardgraph_common::{
    AwardFilters, AwardGraphError, ContractAward, VendorSummary, SEARCH_RESULT_CAP,
};

use crate::writer::format_datetime;
use crate::GraphClient;

/// Read-only wrapper for the graph. Safe to run concurrently with upserts;
/// isolation comes from the store itself.
pub struct AwardReader {
    client: GraphClient,
}

impl AwardReader {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Search awards by optional date range, agency code, and vendor UEI.
    /// Ordered by signed date descending, capped at the fixed page size.
    /// An empty result is Ok, never an error.
    pub async fn search_awards(
        &self,
        filters: &AwardFilters,
    ) -> Result<Vec<ContractAward>, AwardGraphError> {
        let start = filters
            .start_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| format_datetime(&dt.and_utc()))
            .unwrap_or_default();
        let end = filters
            .end_date
            .and_then(|d| d.and_hms_micro_opt(23, 59, 59, 999_999))
            .map(|dt| format_datetime(&dt.and_utc()))
            .unwrap_or_default();

        let q = query(
            "MATCH (a:Award)-[:AWARDED_TO]->(v:Vendor)
             WHERE ($start_date = '' OR a.date_signed >= $start_date)
               AND ($end_date = '' OR a.date_signed <= $end_date)
               AND ($agency_code = '' OR a.agency_code = $agency_code)
               AND ($vendor_uei = '' OR v.uei = $vendor_uei)
             OPTIONAL MATCH (a)-[:CATEGORIZED_AS]->(n:NAICSCode)
             RETURN a, v.uei AS vendor_uei, v.cage_code AS cage_code, n.code AS naics_code
             ORDER BY a.date_signed DESC
             LIMIT $cap",
        )
        .param("start_date", start)
        .param("end_date", end)
        .param("agency_code", filters.agency_code.clone().unwrap_or_default())
        .param("vendor_uei", filters.vendor_uei.clone().unwrap_or_default())
        .param("cap", SEARCH_RESULT_CAP);

        let mut results = Vec::new();
        let mut stream = self.client.graph.execute(q).await.map_err(db_err)?;
        while let Some(row) = stream.next().await.map_err(db_err)? {
            if let Some(award) = row_to_award(&row) {
                results.push(award);
            }
        }

        Ok(results)
    }

    /// Aggregate a vendor's awards: count, total obligated, distinct
    /// agencies. None when the vendor has no associated awards.
    pub async fn vendor_summary(
        &self,
        uei: &str,
    ) -> Result<Option<VendorSummary>, AwardGraphError> {
        let q = query(
            "MATCH (v:Vendor {uei: $uei})<-[:AWARDED_TO]-(a:Award)
             WITH v,
                  count(a) AS award_count,
                  sum(a.obligated_amount) AS total_obligated,
                  collect(DISTINCT a.agency_code) AS agencies
             RETURN v.uei AS uei,
                    v.cage_code AS cage_code,
                    award_count,
                    total_obligated,
                    size(agencies) AS agency_count,
                    agencies",
        )
        .param("uei", uei);

        let mut stream = self.client.graph.execute(q).await.map_err(db_err)?;
        if let Some(row) = stream.next().await.map_err(db_err)? {
            let uei: String = row.get("uei").unwrap_or_default();
            let cage_code: Option<String> = row.get("cage_code").ok();
            let award_count: i64 = row.get("award_count").unwrap_or(0);
            let total_obligated: f64 = row.get("total_obligated").unwrap_or(0.0);
            let agency_count: i64 = row.get("agency_count").unwrap_or(0);
            let agencies: Vec<String> = row.get("agencies").unwrap_or_default();

            return Ok(Some(VendorSummary {
                uei,
                cage_code,
                award_count,
                total_obligated,
                agency_count,
                agencies,
            }));
        }

        Ok(None)
    }
}

fn db_err(e: neo4rs::Error) -> AwardGraphError {
    AwardGraphError::Database(e.to_string())
}

/// None when the row is missing its PIID or carries an unreadable signed
/// date; such rows are skipped rather than surfaced with fabricated values,
/// since date_signed drives both filtering and ordering.
fn row_to_award(row: &neo4rs::Row) -> Option<ContractAward> {
    let a: neo4rs::Node = row.get("a").ok()?;

    let piid: String = a.get("piid").ok()?;
    let agency_code: String = a.get("agency_code").unwrap_or_default();
    let agency_name: String = a.get("agency_name").unwrap_or_default();
    let award_status: String = a.get("award_status").unwrap_or_default();
    let date_signed = parse_datetime_prop(&a, "date_signed")?;
    let obligated_amount: f64 = a.get("obligated_amount").unwrap_or(0.0);

    let vendor_uei: String = row.get("vendor_uei").unwrap_or_default();
    let cage_code: Option<String> = row.get("cage_code").ok();
    let naics_code: Option<String> = row.get("naics_code").ok();

    Some(ContractAward {
        piid,
        agency_code,
        agency_name,
        award_status,
        date_signed,
        obligated_amount,
        vendor_uei,
        cage_code,
        naics_code,
    })
}

fn parse_datetime_prop(n: &neo4rs::Node, prop: &str) -> Option<DateTime<Utc>> {
    // Writer stores "%Y-%m-%dT%H:%M:%S%.6f" (no timezone, implicitly UTC)
    let s = n.get::<String>(prop).ok()?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
