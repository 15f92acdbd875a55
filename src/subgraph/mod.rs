use crate::types::AnalysisConfig;
use async_trait::async_trait;
use eyre::{Result, WrapErr};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Body of a GraphQL POST: `{ "query": ..., "variables": {...} }`.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest {
    pub query: String,
    pub variables: serde_json::Value,
}

impl GraphQlRequest {
    pub fn new<V: Serialize>(query: &str, variables: &V) -> Result<Self> {
        Ok(Self {
            query: query.to_string(),
            variables: serde_json::to_value(variables)?,
        })
    }
}

/// Sends a query document to a subgraph and hands back the undecoded body.
#[async_trait]
pub trait SubgraphTransport: Send + Sync {
    async fn send(&self, request: &GraphQlRequest) -> Result<Vec<u8>>;
}

pub struct SubgraphClient {
    client: Client,
    url: String,
}

impl SubgraphClient {
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            url: config.subgraph_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SubgraphTransport for SubgraphClient {
    async fn send(&self, request: &GraphQlRequest) -> Result<Vec<u8>> {
        debug!("POST {} variables={}", self.url, request.variables);

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .wrap_err_with(|| format!("subgraph request to {} failed", self.url))?
            .error_for_status()?;

        let body = response
            .bytes()
            .await
            .wrap_err("failed to read subgraph response body")?;

        Ok(body.to_vec())
    }
}
