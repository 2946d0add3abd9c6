pub mod pipeline;

pub use pipeline::{EntryFailure, FeedPipeline, FeedReport};
