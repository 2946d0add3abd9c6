use std::time::Duration;

use awardgraph_common::{AwardGraphError, FeedEntry};
use tracing::info;

const FEED_TIMEOUT_SECS: u64 = 15;

/// Atom feed fetcher using reqwest + feed-rs.
///
/// No retry logic lives here; the caller decides whether a fetch failure
/// is worth retrying.
pub struct FeedFetcher {
    client: reqwest::Client,
}

impl FeedFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FEED_TIMEOUT_SECS))
            .build()
            .expect("Failed to build feed HTTP client");
        Self { client }
    }

    /// Fetch the Atom feed at `url` and parse it into entries.
    /// Timeout expiry, non-success status, and parse failure all surface
    /// as a fetch error.
    pub async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>, AwardGraphError> {
        let resp = self
            .client
            .get(url)
            .header("User-Agent", "awardgraph/0.1")
            .send()
            .await
            .map_err(|e| AwardGraphError::Fetch(format!("feed request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AwardGraphError::Fetch(format!(
                "feed returned HTTP {status}"
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| AwardGraphError::Fetch(format!("failed to read feed body: {e}")))?;

        let entries = parse_entries(&bytes)?;
        info!(url, entries = entries.len(), "Parsed award feed");
        Ok(entries)
    }
}

impl Default for FeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse raw feed bytes into entries. Split from the network fetch so the
/// parse path is testable against fixture documents.
pub fn parse_entries(bytes: &[u8]) -> Result<Vec<FeedEntry>, AwardGraphError> {
    let feed = feed_rs::parser::parse(bytes)
        .map_err(|e| AwardGraphError::Fetch(format!("failed to parse Atom feed: {e}")))?;

    Ok(feed
        .entries
        .into_iter()
        .map(|entry| FeedEntry {
            id: entry.id,
            title: entry.title.map(|t| t.content),
            updated: entry
                .updated
                .or(entry.published)
                .map(|dt| dt.with_timezone(&chrono::Utc)),
            content: entry.content.and_then(|c| c.body).unwrap_or_default(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATOM_FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>FPDS Award Feed</title>
  <id>urn:fpds:feed</id>
  <updated>2024-03-02T08:00:00Z</updated>
  <entry>
    <id>urn:fpds:award:W912DY24C0001</id>
    <title>Contract W912DY24C0001</title>
    <updated>2024-03-01T12:00:00Z</updated>
    <content type="text">&lt;ns1:award xmlns:ns1="https://www.fpds.gov/FPDS"&gt;&lt;ns1:PIID&gt;W912DY24C0001&lt;/ns1:PIID&gt;&lt;/ns1:award&gt;</content>
  </entry>
  <entry>
    <id>urn:fpds:award:EMPTY</id>
    <title>Entry without content</title>
    <updated>2024-02-28T09:30:00Z</updated>
  </entry>
</feed>"#;

    #[test]
    fn parses_entries_with_embedded_payload() {
        let entries = parse_entries(ATOM_FIXTURE.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.id, "urn:fpds:award:W912DY24C0001");
        assert_eq!(first.title.as_deref(), Some("Contract W912DY24C0001"));
        assert!(first.updated.is_some());
        assert!(first.content.contains("<ns1:PIID>W912DY24C0001</ns1:PIID>"));
    }

    #[test]
    fn entry_without_content_yields_empty_payload() {
        let entries = parse_entries(ATOM_FIXTURE.as_bytes()).unwrap();
        assert_eq!(entries[1].content, "");
    }

    #[test]
    fn garbage_bytes_are_a_fetch_error() {
        let err = parse_entries(b"not a feed").unwrap_err();
        assert!(matches!(err, AwardGraphError::Fetch(_)));
    }
}
