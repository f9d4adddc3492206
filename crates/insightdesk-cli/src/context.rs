use anyhow::Result;
use insightdesk_sdk::{Client, Config};
use insightdesk_types::PAGE_SIZE_LADDER;

use crate::types::OutputFormat;

/// Global flags every handler needs.
#[derive(Debug, Clone)]
pub struct Context {
    pub config_path: Option<String>,
    pub base_url: Option<String>,
    pub domain: Option<String>,
    pub format: OutputFormat,
}

impl Context {
    pub fn load_config(&self) -> Result<Config> {
        Ok(Config::load(self.config_path.as_deref())?)
    }

    /// Connect with the config file plus command-line overrides.
    pub fn client(&self, page_size: Option<usize>) -> Result<Client> {
        let mut config = self.load_config()?;
        if let Some(size) = page_size {
            anyhow::ensure!(
                PAGE_SIZE_LADDER.contains(&size),
                "--per-page must be one of {}",
                PAGE_SIZE_LADDER.map(|step| step.to_string()).join(", ")
            );
            config.directory.default_page_size = size;
        }

        let mut builder = Client::builder().config(config);
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url.clone());
        }
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        Ok(builder.build()?)
    }
}
