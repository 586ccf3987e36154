//! HTTP gateway against the hosted REST store.

use async_trait::async_trait;
use serde_json::Value;

use mizan_core::EntityKind;

use crate::gateway::{SyncError, SyncGateway};

/// REST client for the remote store.
///
/// Talks to a PostgREST-style endpoint: one route per table, upserts via
/// `POST` with merge-duplicates resolution, deletes via an `id` filter.
pub struct HttpSyncGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpSyncGateway {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn table_url(&self, kind: EntityKind) -> String {
        format!("{}/rest/v1/{}", self.base_url, kind.table())
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Cheap reachability probe; no auth required.
    pub async fn check_connectivity(&self) -> bool {
        self.client
            .head(&self.base_url)
            .send()
            .await
            .is_ok()
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SyncError::Api(status.as_u16(), body))
}

#[async_trait]
impl SyncGateway for HttpSyncGateway {
    async fn fetch_all(&self, kind: EntityKind) -> Result<Vec<Value>, SyncError> {
        let req = self
            .client
            .get(self.table_url(kind))
            .query(&[("select", "*")]);
        let resp = self
            .authed(req)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| SyncError::Parse(e.to_string()))
    }

    async fn upsert(&self, kind: EntityKind, records: Vec<Value>) -> Result<(), SyncError> {
        if records.is_empty() {
            return Ok(());
        }
        let req = self
            .client
            .post(self.table_url(kind))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&records);
        let resp = self
            .authed(req)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        check_status(resp).await?;
        Ok(())
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), SyncError> {
        let req = self
            .client
            .delete(self.table_url(kind))
            .query(&[("id", format!("eq.{id}"))]);
        let resp = self
            .authed(req)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        check_status(resp).await?;
        Ok(())
    }
}
