use std::time::Duration;

use insightdesk_engine::QueryParams;
use insightdesk_runtime::{BackendError, DirectoryBackend, ListPage, ListQuery};
use insightdesk_types::{CreditStatus, Record, RecordId, SessionContext};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ApiConfig, DirectoryEndpoints};
use crate::error::{Error, Result};
use crate::wire;

/// [`DirectoryBackend`] over the insightdesk REST API.
///
/// Every request carries the session's bearer token and the tenant `domain`
/// query parameter.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    session: SessionContext,
    endpoints: DirectoryEndpoints,
    credit_status_path: String,
    credit_charge_path: String,
}

impl HttpBackend {
    pub fn new(api: &ApiConfig, session: SessionContext, endpoints: DirectoryEndpoints) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self::with_client(client, api, session, endpoints))
    }

    /// Share one connection pool across several directories.
    pub fn with_client(
        client: reqwest::Client,
        api: &ApiConfig,
        session: SessionContext,
        endpoints: DirectoryEndpoints,
    ) -> Self {
        Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            session,
            endpoints,
            credit_status_path: api.credit_status_path.clone(),
            credit_charge_path: api.credit_charge_path.clone(),
        }
    }

    pub fn endpoints(&self) -> &DirectoryEndpoints {
        &self.endpoints
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(&self.session.token)
            .query(&[("domain", self.session.scope.domain.as_str())])
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> std::result::Result<Vec<u8>, BackendError> {
        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;

        if status.is_success() {
            return Ok(body.to_vec());
        }

        if status == reqwest::StatusCode::FORBIDDEN
            && let Some(access) = wire::decode_access_status(&body)
        {
            debug!(%access, "access precondition not met");
            return Err(BackendError::AccessDenied(access));
        }

        let message = String::from_utf8_lossy(&body).trim().to_string();
        warn!(status = status.as_u16(), %message, "backend request failed");
        Err(BackendError::Status {
            code: status.as_u16(),
            message,
        })
    }

    async fn send_json(&self, builder: reqwest::RequestBuilder) -> std::result::Result<Value, BackendError> {
        let body = self.send(builder).await?;
        serde_json::from_slice(&body).map_err(|e| BackendError::Malformed(e.to_string()))
    }
}

fn transport(err: reqwest::Error) -> BackendError {
    BackendError::Transport(err.to_string())
}

fn pairs(params: &QueryParams) -> Vec<(&str, &str)> {
    params.iter().collect()
}

impl DirectoryBackend for HttpBackend {
    async fn fetch_list(&self, query: &ListQuery) -> std::result::Result<ListPage, BackendError> {
        let params = query.to_params();
        debug!(path = %self.endpoints.list, query = %params.to_query_string(), "fetching list");
        let builder = self
            .request(reqwest::Method::GET, &self.endpoints.list)
            .query(&pairs(&params));
        wire::decode_list(self.send_json(builder).await?)
    }

    async fn fetch_record(&self, id: RecordId) -> std::result::Result<Record, BackendError> {
        debug!(record = %id, "fetching record");
        let builder = self
            .request(reqwest::Method::GET, &self.endpoints.record)
            .query(&[("id", id.0)]);
        wire::decode_record(self.send_json(builder).await?)
    }

    async fn credit_status(&self) -> std::result::Result<CreditStatus, BackendError> {
        let builder = self.request(reqwest::Method::GET, &self.credit_status_path);
        let status = wire::decode_credit_status(self.send_json(builder).await?)?;
        debug!(status = status.as_str(), "credit status");
        Ok(status)
    }

    async fn charge(&self, id: RecordId) -> std::result::Result<(), BackendError> {
        debug!(record = %id, "charging credit");
        let builder = self
            .request(reqwest::Method::PUT, &self.credit_charge_path)
            .json(&serde_json::json!({ "target_id": id }));
        self.send(builder).await?;
        Ok(())
    }

    async fn export_csv(&self, params: &QueryParams) -> std::result::Result<Vec<u8>, BackendError> {
        debug!(path = %self.endpoints.export, query = %params.to_query_string(), "exporting");
        let builder = self
            .request(reqwest::Method::GET, &self.endpoints.export)
            .query(&pairs(params));
        self.send(builder).await
    }
}
