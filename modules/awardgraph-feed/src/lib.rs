pub mod criteria;
pub mod extractor;
pub mod fetcher;

pub use criteria::build_query;
pub use extractor::{extract, FPDS_NS};
pub use fetcher::{parse_entries, FeedFetcher};
