//! Chain and account lookups against the chain registry service

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{OrchestrateError, Result};

const COMPONENT: &str = "chain-registry";
const TENANT_HEADER: &str = "X-Tenant-ID";

#[async_trait]
pub trait ChainRegistry: Send + Sync {
    /// Numeric chain id of `chain_uuid`; NotFound when the chain is unknown to the tenants
    async fn get_chain_id(&self, chain_uuid: Uuid, tenants: &[String]) -> Result<String>;
}

#[async_trait]
pub trait AccountRegistry: Send + Sync {
    async fn account_exists(&self, address: &str, tenants: &[String]) -> Result<bool>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChainResponse {
    #[serde(alias = "chainID")]
    chain_id: String,
}

#[derive(Clone)]
pub struct HttpRegistry {
    client: Client,
    base_url: String,
    chains: Arc<Cache<String, String>>,
}

impl HttpRegistry {
    pub fn new(base_url: String, cache_ttl: Duration) -> Self {
        let chains = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(cache_ttl)
            .build();

        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            chains: Arc::new(chains),
        }
    }

    async fn get(&self, path: &str, tenants: &[String]) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .get(&url)
            .header("accept", "application/json")
            .header(TENANT_HEADER, tenants.join(","))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, url = %url, "chain registry request failed");
                OrchestrateError::dependency_failure(format!("chain registry unreachable: {}", e))
                    .extend_component(COMPONENT)
            })
    }
}

#[async_trait]
impl ChainRegistry for HttpRegistry {
    async fn get_chain_id(&self, chain_uuid: Uuid, tenants: &[String]) -> Result<String> {
        let cache_key = format!("{}_{}", chain_uuid, tenants.join(","));
        if let Some(chain_id) = self.chains.get(&cache_key).await {
            tracing::debug!("Cache hit for chain {}", chain_uuid);
            return Ok(chain_id);
        }

        let response = self.get(&format!("/chains/{}", chain_uuid), tenants).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(OrchestrateError::not_found(format!("chain {} not found", chain_uuid))
                .extend_component(COMPONENT));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OrchestrateError::dependency_failure(format!(
                "chain registry error {}: {}",
                status, error_text
            ))
            .extend_component(COMPONENT));
        }

        let chain: ChainResponse = response.json().await.map_err(|e| {
            OrchestrateError::dependency_failure(format!("invalid chain registry response: {}", e))
                .extend_component(COMPONENT)
        })?;

        self.chains.insert(cache_key, chain.chain_id.clone()).await;
        Ok(chain.chain_id)
    }
}

#[async_trait]
impl AccountRegistry for HttpRegistry {
    async fn account_exists(&self, address: &str, tenants: &[String]) -> Result<bool> {
        let response = self.get(&format!("/accounts/{}", address), tenants).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(OrchestrateError::dependency_failure(format!(
                "chain registry error {} for account {}",
                status, address
            ))
            .extend_component(COMPONENT));
        }

        Ok(true)
    }
}
