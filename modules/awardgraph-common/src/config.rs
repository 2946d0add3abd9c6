use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Neo4j
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,

    // FPDS feed
    pub fpds_base_url: String,
    /// Maximum entries processed per feed poll.
    pub fpds_batch_size: usize,
    /// Feed requests per second in watch mode.
    pub fpds_rate_limit: f64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            neo4j_uri: required_env("NEO4J_URI"),
            neo4j_user: required_env("NEO4J_USER"),
            neo4j_password: required_env("NEO4J_PASSWORD"),
            fpds_base_url: required_env("FPDS_BASE_URL"),
            fpds_batch_size: env::var("FPDS_BATCH_SIZE")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .expect("FPDS_BATCH_SIZE must be a number"),
            fpds_rate_limit: env::var("FPDS_RATE_LIMIT")
                .unwrap_or_else(|_| "0.5".to_string())
                .parse()
                .expect("FPDS_RATE_LIMIT must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
