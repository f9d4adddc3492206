use crate::error::{Error, Result};
use insightdesk_types::{DEFAULT_PAGE_SIZE, PAGE_SIZE_LADDER, SessionContext, TenantScope};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "INSIGHTDESK_CONFIG";
pub const TOKEN_ENV: &str = "INSIGHTDESK_TOKEN";

/// Resolve the config file path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. INSIGHTDESK_CONFIG environment variable (with tilde expansion)
/// 3. XDG config directory
/// 4. ~/.insightdesk/config.toml (fallback for systems without XDG)
pub fn resolve_config_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("insightdesk").join("config.toml"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".insightdesk").join("config.toml"));
    }

    Err(Error::Config(
        "Could not determine config path: no HOME directory or XDG config directory found"
            .to_string(),
    ))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_credit_status_path")]
    pub credit_status_path: String,
    #[serde(default = "default_credit_charge_path")]
    pub credit_charge_path: String,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_credit_status_path() -> String {
    "/credit-status".to_string()
}

fn default_credit_charge_path() -> String {
    "/credit-charge".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            credit_status_path: default_credit_status_path(),
            credit_charge_path: default_credit_charge_path(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    /// Overrides the `/directory` family of paths.
    #[serde(default)]
    pub endpoints: Option<DirectoryEndpoints>,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl DirectoryConfig {
    /// `default_page_size` must be a step of [`PAGE_SIZE_LADDER`].
    pub fn validate(&self) -> Result<()> {
        if PAGE_SIZE_LADDER.contains(&self.default_page_size) {
            return Ok(());
        }
        Err(Error::Config(format!(
            "directory.default_page_size must be one of {:?}, got {}",
            PAGE_SIZE_LADDER, self.default_page_size
        )))
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            endpoints: None,
        }
    }
}

/// Paths for one directory browser, relative to `api.base_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEndpoints {
    pub list: String,
    pub record: String,
    pub export: String,
}

impl Default for DirectoryEndpoints {
    fn default() -> Self {
        Self::under("/directory")
    }
}

impl DirectoryEndpoints {
    /// `<base>`, `<base>/record`, `<base>/export`.
    pub fn under(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            list: base.to_string(),
            record: format!("{}/record", base),
            export: format!("{}/export", base),
        }
    }

    pub fn company_employees(company_id: u64) -> Self {
        Self::under(&format!("/companies/{}/employees", company_id))
    }

    pub fn leads() -> Self {
        Self::under("/leads")
    }

    pub fn sources() -> Self {
        Self::under("/sources")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
}

impl Config {
    /// Load from the resolved path; a missing file yields the defaults.
    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        let config_path = resolve_config_path(explicit_path)?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.directory.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The session token, preferring `INSIGHTDESK_TOKEN` over the file.
    pub fn token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|token| !token.is_empty())
            .or_else(|| self.session.token.clone())
    }

    pub fn session_context(&self) -> Result<SessionContext> {
        self.session_context_with(None)
    }

    /// Like [`session_context`](Self::session_context), with `token` taking
    /// precedence over both the environment and the file.
    pub fn session_context_with(&self, token: Option<String>) -> Result<SessionContext> {
        let token = token
            .or_else(|| self.token())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Config(format!("no session token (set session.token or {})", TOKEN_ENV)))?;
        let domain = self
            .session
            .domain
            .clone()
            .filter(|domain| !domain.is_empty())
            .ok_or_else(|| Error::Config("no tenant domain (set session.domain)".to_string()))?;
        Ok(SessionContext::new(token, TenantScope::new(domain)))
    }

    pub fn directory_endpoints(&self) -> DirectoryEndpoints {
        self.directory.endpoints.clone().unwrap_or_default()
    }
}
