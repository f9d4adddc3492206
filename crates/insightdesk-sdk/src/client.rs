use std::path::PathBuf;
use std::time::Duration;

use insightdesk_runtime::{DirectoryBackend, DirectoryView};
use insightdesk_types::{CreditStatus, SessionContext, TenantScope};
use tracing::info;

use crate::config::{Config, DirectoryEndpoints};
use crate::error::{Error, Result};
use crate::http::HttpBackend;

/// A directory browser bound to the REST API.
pub type Directory = DirectoryView<HttpBackend>;

/// Entry point: one authenticated session against one tenant.
///
/// Directories opened from the same client share its connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    config: Config,
    session: SessionContext,
    http: reqwest::Client,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Resolve the config file the usual way and connect with it.
    pub fn connect_default() -> Result<Self> {
        Self::builder().build()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scope(&self) -> &TenantScope {
        &self.session.scope
    }

    fn backend(&self, endpoints: DirectoryEndpoints) -> HttpBackend {
        HttpBackend::with_client(
            self.http.clone(),
            &self.config.api,
            self.session.clone(),
            endpoints,
        )
    }

    /// Open a directory at `endpoints`, sized by `directory.default_page_size`.
    /// Nothing is fetched until [`DirectoryView::load`].
    pub fn directory(&self, endpoints: DirectoryEndpoints) -> Directory {
        info!(list = %endpoints.list, domain = %self.session.scope.domain, "opening directory");
        DirectoryView::new(self.backend(endpoints), self.config.directory.default_page_size)
    }

    /// The directory configured under `[directory.endpoints]`, or `/directory`.
    pub fn default_directory(&self) -> Directory {
        self.directory(self.config.directory_endpoints())
    }

    pub fn employees(&self, company_id: u64) -> Directory {
        self.directory(DirectoryEndpoints::company_employees(company_id))
    }

    pub fn leads(&self) -> Directory {
        self.directory(DirectoryEndpoints::leads())
    }

    pub fn sources(&self) -> Directory {
        self.directory(DirectoryEndpoints::sources())
    }

    /// Current credit status, outside any unlock flow.
    pub async fn credit_status(&self) -> Result<CreditStatus> {
        let backend = self.backend(self.config.directory_endpoints());
        Ok(backend.credit_status().await?)
    }
}

/// Overrides are applied on top of the loaded config file.
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: Option<Config>,
    config_path: Option<PathBuf>,
    base_url: Option<String>,
    token: Option<String>,
    domain: Option<String>,
}

impl ClientBuilder {
    /// Use this config instead of reading one from disk.
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn build(self) -> Result<Client> {
        let mut config = match self.config {
            Some(config) => config,
            None => {
                let path = self
                    .config_path
                    .as_deref()
                    .map(|path| path.to_string_lossy().into_owned());
                Config::load(path.as_deref())?
            }
        };

        if let Some(url) = self.base_url {
            config.api.base_url = url;
        }
        if let Some(domain) = self.domain {
            config.session.domain = Some(domain);
        }

        config.directory.validate()?;
        let session = config.session_context_with(self.token)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Client {
            config,
            session,
            http,
        })
    }
}
