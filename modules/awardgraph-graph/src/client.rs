use awardgraph_common::Config;
use neo4rs::{ConfigBuilder, Graph};

/// Thin wrapper around neo4rs::Graph providing pooled connection setup.
/// Each upsert transaction checks a connection out of the pool and returns
/// it when the transaction completes or fails.
#[derive(Clone)]
pub struct GraphClient {
    pub(crate) graph: Graph,
}

impl GraphClient {
    /// Connect using application config.
    pub async fn connect(config: &Config) -> Result<Self, neo4rs::Error> {
        Self::connect_with(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password).await
    }

    /// Connect to Neo4j with explicit credentials.
    pub async fn connect_with(
        uri: &str,
        user: &str,
        password: &str,
    ) -> Result<Self, neo4rs::Error> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .fetch_size(500)
            .max_connections(10)
            .build()?;
        let graph = Graph::connect(config).await?;
        Ok(Self { graph })
    }

    /// Get a reference to the underlying neo4rs Graph.
    pub fn inner(&self) -> &Graph {
        &self.graph
    }
}
