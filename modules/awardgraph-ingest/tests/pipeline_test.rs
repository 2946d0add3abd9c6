// End-to-end batch processing: extract + upsert against a real Neo4j.
//
// Requirements: Docker (for Neo4j via testcontainers)

use awardgraph_common::FeedEntry;
use awardgraph_graph::{query, AwardWriter, GraphClient};
use awardgraph_ingest::{EntryFailure, FeedPipeline};

const WELL_FORMED: &str = r#"<ns1:award xmlns:ns1="https://www.fpds.gov/FPDS">
    <ns1:awardID>
        <ns1:PIID>W912DY24C0001</ns1:PIID>
        <ns1:agencyID name="DEPT OF DEFENSE">9700</ns1:agencyID>
    </ns1:awardID>
    <ns1:status description="Final"/>
    <ns1:signedDate>2024-03-01 00:00:00</ns1:signedDate>
    <ns1:obligatedAmount>125000.50</ns1:obligatedAmount>
    <ns1:UEI>ZQGGHJH74DW7</ns1:UEI>
    <ns1:cageCode>1ABC2</ns1:cageCode>
    <ns1:principalNAICSCode>541512</ns1:principalNAICSCode>
</ns1:award>"#;

const MISSING_AMOUNT: &str = r#"<ns1:award xmlns:ns1="https://www.fpds.gov/FPDS">
    <ns1:awardID>
        <ns1:PIID>W912DY24C0002</ns1:PIID>
        <ns1:agencyID name="DEPT OF DEFENSE">9700</ns1:agencyID>
    </ns1:awardID>
    <ns1:status description="Final"/>
    <ns1:signedDate>2024-03-02 00:00:00</ns1:signedDate>
    <ns1:UEI>ZQGGHJH74DW7</ns1:UEI>
</ns1:award>"#;

fn entry(id: &str, content: &str) -> FeedEntry {
    FeedEntry {
        id: id.to_string(),
        title: None,
        updated: None,
        content: content.to_string(),
    }
}

async fn count(client: &GraphClient, cypher: &str) -> i64 {
    let mut stream = client
        .inner()
        .execute(query(cypher))
        .await
        .expect("count query failed");
    let row = stream
        .next()
        .await
        .expect("count stream failed")
        .expect("count row missing");
    row.get("c").expect("count column missing")
}

#[tokio::test]
async fn malformed_entry_is_collected_without_aborting_the_batch() {
    let (_c, client) = awardgraph_graph::testutil::neo4j_container().await;
    let writer = AwardWriter::new(client.clone());
    let pipeline = FeedPipeline::new(writer, "https://feed.invalid/atom?q=", 100);

    let report = pipeline
        .process_entries(vec![
            entry("urn:fpds:award:GOOD", WELL_FORMED),
            entry("urn:fpds:award:BAD", MISSING_AMOUNT),
        ])
        .await;

    assert_eq!(report.processed_count, 1);
    assert_eq!(report.awards.len(), 1);
    assert_eq!(report.awards[0].piid, "W912DY24C0001");

    assert_eq!(report.failures.len(), 1);
    match &report.failures[0] {
        EntryFailure::Extraction(failure) => {
            assert_eq!(failure.entry_id, "urn:fpds:award:BAD");
            assert_eq!(failure.problems[0].field, "obligatedAmount");
        }
        other => panic!("expected extraction failure, got {other:?}"),
    }

    assert_eq!(count(&client, "MATCH (a:Award) RETURN count(a) AS c").await, 1);
    assert_eq!(count(&client, "MATCH (v:Vendor) RETURN count(v) AS c").await, 1);
}

#[tokio::test]
async fn store_rejection_of_one_award_does_not_abort_the_batch() {
    let (_c, client) = awardgraph_graph::testutil::neo4j_container().await;

    // An existence constraint the NAICS merge can never satisfy: the award
    // carrying a NAICS code fails store-side, the NAICS-less one is untouched.
    client
        .inner()
        .run(query(
            "CREATE CONSTRAINT FOR (n:NAICSCode) REQUIRE n.label IS NOT NULL",
        ))
        .await
        .expect("create constraint");

    let writer = AwardWriter::new(client.clone());
    let pipeline = FeedPipeline::new(writer, "https://feed.invalid/atom?q=", 100);

    let without_naics = WELL_FORMED
        .replace(
            "<ns1:principalNAICSCode>541512</ns1:principalNAICSCode>",
            "",
        )
        .replace("W912DY24C0001", "W912DY24C0002");

    let report = pipeline
        .process_entries(vec![
            entry("urn:fpds:award:NAICS", WELL_FORMED),
            entry("urn:fpds:award:PLAIN", &without_naics),
        ])
        .await;

    assert_eq!(report.processed_count, 1);
    assert_eq!(report.awards.len(), 1);
    assert_eq!(report.awards[0].piid, "W912DY24C0002");

    assert_eq!(report.failures.len(), 1);
    match &report.failures[0] {
        EntryFailure::Upsert { piid, .. } => assert_eq!(piid, "W912DY24C0001"),
        other => panic!("expected upsert failure, got {other:?}"),
    }

    assert_eq!(count(&client, "MATCH (a:Award) RETURN count(a) AS c").await, 1);
}

#[tokio::test]
async fn every_award_in_a_clean_batch_persists() {
    let (_c, client) = awardgraph_graph::testutil::neo4j_container().await;
    let writer = AwardWriter::new(client.clone());
    let pipeline = FeedPipeline::new(writer, "https://feed.invalid/atom?q=", 100);

    let entries: Vec<FeedEntry> = (0..3)
        .map(|i| {
            let content = WELL_FORMED.replace("W912DY24C0001", &format!("PIID-{i}"));
            entry(&format!("urn:fpds:award:{i}"), &content)
        })
        .collect();

    let report = pipeline.process_entries(entries).await;
    assert_eq!(report.processed_count, 3);
    assert_eq!(count(&client, "MATCH (a:Award) RETURN count(a) AS c").await, 3);
}
