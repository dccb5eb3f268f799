use crate::adapters::http::DEFAULT_TIMEOUT;
use crate::domain::model::ProtocolVersion;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, WcsError};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_VERSION: &str = "1.1.0";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WcsConfig {
    pub service: ServiceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub url: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub timeout_seconds: Option<u64>,
    pub cookie: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

impl WcsConfig {
    pub fn new(url: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: ServiceConfig {
                url: url.into(),
                version: version.into(),
                timeout_seconds: None,
                cookie: None,
            },
            output: OutputConfig::default(),
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(WcsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| WcsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${WCS_COOKIE})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| WcsError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_url("service.url", &self.service.url)?;

        if ProtocolVersion::from_version(&self.service.version).is_err() {
            return Err(WcsError::InvalidConfigValueError {
                field: "service.version".to_string(),
                value: self.service.version.clone(),
                reason: "Supported versions: 1.0.0, 1.1.0, 1.1.1, 1.1.2".to_string(),
            });
        }

        if let Some(timeout) = self.service.timeout_seconds {
            validate_range("service.timeout_seconds", timeout, 1, 600)?;
        }

        if let Some(cookie) = &self.service.cookie {
            validate_non_empty_string("service.cookie", cookie)?;
        }

        validate_non_empty_string("output.path", &self.output.path)?;

        Ok(())
    }
}

impl ConfigProvider for WcsConfig {
    fn service_url(&self) -> &str {
        &self.service.url
    }

    fn version(&self) -> &str {
        &self.service.version
    }

    fn timeout(&self) -> Duration {
        self.service
            .timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    fn cookie(&self) -> Option<&str> {
        self.service.cookie.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }
}

impl Validate for WcsConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
