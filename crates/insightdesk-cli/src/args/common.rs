use anyhow::{Context, Result};
use clap::Args;
use insightdesk_sdk::{Config, DirectoryEndpoints, FilterLabel, SortDirection, SortState};

#[derive(Debug, Clone, Default, Args)]
#[group(id = "directory", multiple = false)]
pub struct DirectoryArgs {
    #[arg(long, value_name = "ID", help = "Employees of one company")]
    pub company: Option<u64>,

    #[arg(long, help = "The leads directory")]
    pub leads: bool,

    #[arg(long, help = "The sources directory")]
    pub sources: bool,

    #[arg(long, value_name = "PATH", help = "Any directory path under the API base URL")]
    pub endpoint: Option<String>,
}

impl DirectoryArgs {
    /// Falls back to `[directory.endpoints]` from the config.
    pub fn endpoints(&self, config: &Config) -> DirectoryEndpoints {
        if let Some(company) = self.company {
            DirectoryEndpoints::company_employees(company)
        } else if self.leads {
            DirectoryEndpoints::leads()
        } else if self.sources {
            DirectoryEndpoints::sources()
        } else if let Some(path) = &self.endpoint {
            DirectoryEndpoints::under(path)
        } else {
            config.directory_endpoints()
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    #[arg(long, help = "Comma separated, e.g. \"Sales, Engineering\"")]
    pub department: Option<String>,

    #[arg(long)]
    pub seniority: Option<String>,

    #[arg(long)]
    pub job_title: Option<String>,

    #[arg(long)]
    pub regions: Option<String>,

    #[arg(long, help = "Free-text search")]
    pub search: Option<String>,

    #[arg(long = "filter", value_name = "LABEL=VALUE", help = "Filter by label, e.g. \"Job Title=CTO\"")]
    pub extra: Vec<String>,
}

impl FilterArgs {
    pub fn entries(&self) -> Result<Vec<(FilterLabel, String)>> {
        let named = [
            (FilterLabel::Department, &self.department),
            (FilterLabel::Seniority, &self.seniority),
            (FilterLabel::JobTitle, &self.job_title),
            (FilterLabel::Regions, &self.regions),
            (FilterLabel::Search, &self.search),
        ];
        let mut entries: Vec<(FilterLabel, String)> = named
            .into_iter()
            .filter_map(|(label, value)| value.clone().map(|value| (label, value)))
            .collect();

        for raw in &self.extra {
            let (label, value) = raw
                .split_once('=')
                .with_context(|| format!("expected LABEL=VALUE, got {:?}", raw))?;
            let label: FilterLabel = label.trim().parse()?;
            entries.push((label, value.to_string()));
        }
        Ok(entries)
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct SortArgs {
    #[arg(long, value_name = "FIELD", help = "Sort by this field")]
    pub sort: Option<String>,

    #[arg(long, requires = "sort", help = "Sort descending")]
    pub desc: bool,
}

impl SortArgs {
    pub fn state(&self) -> Option<SortState> {
        let direction = if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.sort
            .as_ref()
            .map(|field| SortState::by(field.clone(), direction))
    }
}
