use crate::adapters::http::{HttpClient, DEFAULT_TIMEOUT};
use crate::core::describe::DescribeCoverage;
use crate::core::wcs100::WebCoverageService100;
use crate::core::wcs110::WebCoverageService11x;
use crate::domain::model::{Operation, ProtocolVersion, ServiceIdentification, ServiceProvider};
use crate::domain::ports::{ConfigProvider, CoverageService};
use crate::utils::error::Result;
use crate::utils::xml::Element;
use async_trait::async_trait;
use std::time::Duration;

/// Connection settings shared by both protocol families.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub cookie: Option<String>,
    pub timeout: Duration,
    pub client: HttpClient,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            cookie: None,
            timeout: DEFAULT_TIMEOUT,
            client: HttpClient::new(),
        }
    }
}

impl ServiceOptions {
    pub fn from_config(config: &dyn ConfigProvider) -> Self {
        Self {
            cookie: config.cookie().map(str::to_string),
            timeout: config.timeout(),
            ..Default::default()
        }
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A connected WCS endpoint, whichever protocol family it speaks.
#[derive(Debug)]
pub enum WebCoverageService {
    V100(WebCoverageService100),
    V11x(WebCoverageService11x),
}

impl WebCoverageService {
    /// 依版本字串選擇對應的實作並讀取 GetCapabilities
    pub async fn connect(url: &str, version: &str, options: ServiceOptions) -> Result<Self> {
        match ProtocolVersion::from_version(version)? {
            ProtocolVersion::V100 => Ok(Self::V100(
                WebCoverageService100::connect(url, options).await?,
            )),
            ProtocolVersion::V11x => Ok(Self::V11x(
                WebCoverageService11x::connect(url, version, options).await?,
            )),
        }
    }

    pub fn from_xml(url: &str, xml: &str, version: &str, options: ServiceOptions) -> Result<Self> {
        match ProtocolVersion::from_version(version)? {
            ProtocolVersion::V100 => Ok(Self::V100(WebCoverageService100::from_xml(
                url, xml, options,
            )?)),
            ProtocolVersion::V11x => Ok(Self::V11x(WebCoverageService11x::from_xml(
                url, xml, version, options,
            )?)),
        }
    }

    pub async fn from_config(config: &dyn ConfigProvider) -> Result<Self> {
        Self::connect(
            config.service_url(),
            config.version(),
            ServiceOptions::from_config(config),
        )
        .await
    }

    pub fn protocol(&self) -> ProtocolVersion {
        match self {
            Self::V100(_) => ProtocolVersion::V100,
            Self::V11x(_) => ProtocolVersion::V11x,
        }
    }

    pub fn capabilities(&self) -> &Element {
        match self {
            Self::V100(wcs) => wcs.capabilities(),
            Self::V11x(wcs) => wcs.capabilities(),
        }
    }

    fn inner(&self) -> &dyn CoverageService {
        match self {
            Self::V100(wcs) => wcs as &dyn CoverageService,
            Self::V11x(wcs) => wcs,
        }
    }
}

#[async_trait]
impl CoverageService for WebCoverageService {
    fn url(&self) -> &str {
        self.inner().url()
    }

    fn version(&self) -> &str {
        self.inner().version()
    }

    fn identification(&self) -> &ServiceIdentification {
        self.inner().identification()
    }

    fn provider(&self) -> &ServiceProvider {
        self.inner().provider()
    }

    fn operations(&self) -> &[Operation] {
        self.inner().operations()
    }

    fn coverage_ids(&self) -> Vec<String> {
        self.inner().coverage_ids()
    }

    async fn describe_coverage(&mut self, identifier: &str) -> Result<&DescribeCoverage> {
        match self {
            Self::V100(wcs) => wcs.describe_coverage(identifier).await,
            Self::V11x(wcs) => wcs.describe_coverage(identifier).await,
        }
    }
}
