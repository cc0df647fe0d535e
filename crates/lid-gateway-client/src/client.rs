//! Gateway HTTP client.

use crate::error::GatewayError;
use crate::types::LidLookupResponse;
use async_trait::async_trait;
use jid_resolver::{LidLookup, LookupError};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Client for the bridge gateway's live LID lookup API.
#[derive(Clone)]
pub struct LidGatewayClient {
    client: Client,
    base_url: String,
}

impl LidGatewayClient {
    /// Create a new gateway client.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the gateway is healthy.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Ask the gateway for the phone JID owning `lid_jid`.
    #[instrument(skip(self))]
    pub async fn get_pn_for_lid(&self, lid_jid: &str) -> Result<Option<String>, GatewayError> {
        let response = self
            .client
            .get(format!("{}/v1/lid/{}", self.base_url, encode(lid_jid)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Gateway has no mapping for {}", lid_jid);
            return Ok(None);
        }

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            warn!("LID lookup failed: {}", msg);
            return Err(GatewayError::Api(msg));
        }

        let body = response.bytes().await?;
        let lookup: LidLookupResponse = serde_json::from_slice(&body)?;
        if lookup.jid != lid_jid {
            warn!("Gateway answered for {} instead of {}", lookup.jid, lid_jid);
            return Err(GatewayError::Api(format!(
                "Response for {} does not match query {}",
                lookup.jid, lid_jid
            )));
        }

        Ok(lookup.pn.filter(|pn| !pn.is_empty()))
    }
}

#[async_trait]
impl LidLookup for LidGatewayClient {
    async fn lookup_pn(&self, lid_jid: &str) -> Result<Option<String>, LookupError> {
        Ok(self.get_pn_for_lid(lid_jid).await?)
    }
}
