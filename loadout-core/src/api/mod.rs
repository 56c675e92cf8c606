// File: loadout-core/src/api/mod.rs
//
// Reqwest-backed implementation of the outbound EBS HTTP collaborator.
// Always polled from the network context; callers treat any failure as
// "keep previous state, retry next poll".

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client as ReqwestClient;
use tracing::debug;

use loadout_common::traits::{ProductsResponse, TransactionsResponse, TwitchApi};

use crate::Error;
use crate::config::EbsApiConfig;

pub struct EbsApiClient {
    http: ReqwestClient,
    config: EbsApiConfig,
}

impl EbsApiClient {
    pub fn new(config: EbsApiConfig) -> Self {
        Self {
            http: ReqwestClient::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl TwitchApi for EbsApiClient {
    async fn get_ebs_transactions(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<TransactionsResponse, Error> {
        let mut request = self
            .http
            .get(self.url("transactions"))
            .bearer_auth(&self.config.auth_token);

        if let Some(since) = since {
            request = request.query(&[("since", since.to_rfc3339_opts(SecondsFormat::Millis, true))]);
        }

        debug!("[EbsApi] fetching transactions");
        let response = request.send().await?;
        Ok(response.json::<TransactionsResponse>().await?)
    }

    async fn get_ebs_products(&self) -> Result<ProductsResponse, Error> {
        debug!("[EbsApi] fetching products");
        let response = self
            .http
            .get(self.url("products"))
            .bearer_auth(&self.config.auth_token)
            .send()
            .await?;
        Ok(response.json::<ProductsResponse>().await?)
    }

    async fn get_configuration_segment(&self) -> Result<serde_json::Value, Error> {
        debug!("[EbsApi] fetching configuration segment");
        let response = self
            .http
            .get(self.url("configuration/broadcaster"))
            .bearer_auth(&self.config.auth_token)
            .send()
            .await?;
        Ok(response.json::<serde_json::Value>().await?)
    }
}
