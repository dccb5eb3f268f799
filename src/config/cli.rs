use crate::config::toml_config::{WcsConfig, DEFAULT_VERSION};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, WcsError};
use crate::utils::validation::Validate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "wcs-client")]
#[command(about = "Query OGC Web Coverage Services (1.0.0 and 1.1.x)")]
pub struct CliConfig {
    #[arg(long, help = "Base URL of the WCS endpoint")]
    pub url: Option<String>,

    #[arg(long = "version", help = "Protocol version (1.0.0, 1.1.0, 1.1.1, 1.1.2)")]
    pub wcs_version: Option<String>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Cookie header forwarded with every request")]
    pub cookie: Option<String>,

    #[arg(long, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the service metadata and the coverage list
    Capabilities,
    /// Print the DescribeCoverage answer and time limits of one coverage
    Describe { identifier: String },
    /// Request a coverage and store the response body
    GetCoverage(GetCoverageArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct GetCoverageArgs {
    #[arg(required = true)]
    pub identifier: Vec<String>,

    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub bbox: Vec<f64>,

    #[arg(long, value_delimiter = ',')]
    pub time: Vec<String>,

    #[arg(long)]
    pub format: Option<String>,

    #[arg(long, help = "Ask a 1.1.x server to store the result")]
    pub store: bool,

    #[arg(long, help = "CRS of the bounding box (1.0.0)")]
    pub crs: Option<String>,

    #[arg(long, help = "Output width in pixels (1.0.0)")]
    pub width: Option<u32>,

    #[arg(long, help = "Output height in pixels (1.0.0)")]
    pub height: Option<u32>,

    #[arg(long, help = "File name under the output directory")]
    pub output: Option<String>,

    #[arg(long = "param", value_name = "KEY=VALUE", help = "Extra request parameter")]
    pub params: Vec<String>,
}

impl GetCoverageArgs {
    pub fn extra_params(&self) -> Result<Vec<(String, String)>> {
        self.params
            .iter()
            .map(|raw| match raw.split_once('=') {
                Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
                _ => Err(WcsError::InvalidParameter {
                    field: "param".to_string(),
                    reason: format!("expected KEY=VALUE, got '{}'", raw),
                }),
            })
            .collect()
    }

    /// WCS 1.0.0 只接受單一 coverage
    pub fn single_coverage(&self) -> Result<String> {
        match self.identifier.as_slice() {
            [] => Ok(String::new()),
            [coverage] => Ok(coverage.clone()),
            _ => Err(WcsError::InvalidParameter {
                field: "identifier".to_string(),
                reason: "WCS 1.0.0 accepts a single coverage per request".to_string(),
            }),
        }
    }

    pub fn output_file(&self) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| format!("{}.bin", self.identifier.join("_")))
    }
}

impl CliConfig {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn resolve(&self) -> Result<WcsConfig> {
        let mut config = match &self.config {
            Some(path) => WcsConfig::from_file(path)?,
            None => {
                let url = self.url.clone().ok_or_else(|| WcsError::MissingConfigError {
                    field: "url".to_string(),
                })?;
                WcsConfig::new(url, DEFAULT_VERSION)
            }
        };

        if let Some(url) = &self.url {
            config.service.url = url.clone();
        }
        if let Some(version) = &self.wcs_version {
            config.service.version = version.clone();
        }
        if let Some(cookie) = &self.cookie {
            config.service.cookie = Some(cookie.clone());
        }
        if let Some(timeout) = self.timeout {
            config.service.timeout_seconds = Some(timeout);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Writes response bodies under a base directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        Ok(full_path.display().to_string())
    }
}
