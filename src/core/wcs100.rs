use crate::adapters::http::{HttpClient, HttpMethod};
use crate::core::capabilities::CapabilitiesReader;
use crate::core::describe::{parse_envelope, DescribeCoverage, DescribeCoverageCache, DescribeCoverageReader};
use crate::core::query::ServiceQuery;
use crate::core::service::ServiceOptions;
use crate::domain::contents::Contents;
use crate::domain::model::{
    find_operation, ContactMetadata, Envelope, Operation, OperationMethod, ServiceIdentification,
    ServiceProvider,
};
use crate::domain::ports::CoverageService;
use crate::utils::error::{Result, WcsError};
use crate::utils::namespaces;
use crate::utils::xml::Element;
use async_trait::async_trait;
use reqwest::Response;
use serde::Serialize;
use std::time::Duration;

/// `wcs:CoverageOfferingBrief` entry of a 1.0.0 capabilities document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageOfferingBrief {
    pub name: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub lon_lat_envelope: Option<Envelope>,
}

impl CoverageOfferingBrief {
    pub fn from_element(elem: &Element) -> Self {
        Self {
            name: elem.find_text("wcs:name"),
            label: elem.find_text("wcs:label"),
            description: elem.find_text("wcs:description"),
            keywords: elem.findall_text("wcs:keywords/wcs:keyword"),
            lon_lat_envelope: elem.find("wcs:lonLatEnvelope").map(parse_envelope),
        }
    }
}

fn parse_identification(service: Option<&Element>) -> ServiceIdentification {
    let text = |path: &str| service.and_then(|e| e.find_text(path));
    ServiceIdentification {
        service: text("wcs:name").unwrap_or_else(|| "WCS".to_string()),
        version: "1.0.0".to_string(),
        title: text("wcs:label"),
        r#abstract: text("wcs:description"),
        keywords: service
            .map(|e| e.findall_text("wcs:keywords/wcs:keyword"))
            .unwrap_or_default(),
        fees: text("wcs:fees"),
        access_constraints: text("wcs:accessConstraints"),
    }
}

fn parse_provider(service: Option<&Element>) -> ServiceProvider {
    let party = service.and_then(|e| e.find("wcs:responsibleParty"));
    let text = |path: &str| party.and_then(|e| e.find_text(path));
    let name = text("wcs:organisationName").or_else(|| text("wcs:individualName"));

    ServiceProvider {
        url: name.clone(),
        name,
        contact: ContactMetadata {
            name: text("wcs:individualName"),
            organization: text("wcs:organisationName"),
            address: text("wcs:contactInfo/wcs:address/wcs:deliveryPoint"),
            city: text("wcs:contactInfo/wcs:address/wcs:city"),
            region: text("wcs:contactInfo/wcs:address/wcs:administrativeArea"),
            postcode: text("wcs:contactInfo/wcs:address/wcs:postalCode"),
            country: text("wcs:contactInfo/wcs:address/wcs:country"),
            email: text("wcs:contactInfo/wcs:address/wcs:electronicMailAddress"),
        },
    }
}

/// Each child of `wcs:Capability/wcs:Request` names one operation.
fn parse_operation(elem: &Element) -> Operation {
    let methods = elem
        .findall("wcs:DCPType/wcs:HTTP/*")
        .into_iter()
        .filter_map(|verb| {
            verb.find("wcs:OnlineResource")
                .and_then(|r| r.attribute_ns(namespaces::XLINK, "href"))
                .map(|url| OperationMethod {
                    binding: verb.name().to_string(),
                    url: url.to_string(),
                })
        })
        .collect();

    Operation {
        name: Some(elem.name().to_string()),
        methods,
        ..Default::default()
    }
}

/// Parameters of a WCS 1.0.0 GetCoverage request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetCoverageRequest100 {
    pub coverage: String,
    pub bbox: Option<Vec<f64>>,
    pub time: Option<Vec<String>>,
    pub crs: Option<String>,
    pub response_crs: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resx: Option<f64>,
    pub resy: Option<f64>,
    pub resz: Option<f64>,
    pub format: Option<String>,
    pub interpolation: Option<String>,
    pub extra: Vec<(String, String)>,
}

impl GetCoverageRequest100 {
    pub fn new(coverage: impl Into<String>) -> Self {
        Self {
            coverage: coverage.into(),
            ..Default::default()
        }
    }

    pub fn bbox(mut self, bbox: impl Into<Vec<f64>>) -> Self {
        self.bbox = Some(bbox.into());
        self
    }

    pub fn crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    pub fn to_query(&self) -> Result<ServiceQuery> {
        if self.coverage.trim().is_empty() {
            return Err(WcsError::InvalidParameter {
                field: "coverage".to_string(),
                reason: "a coverage name is required".to_string(),
            });
        }

        let mut query = ServiceQuery::new();
        query.push("service", "WCS");
        query.push("request", "GetCoverage");
        query.push("version", "1.0.0");
        query.push("coverage", self.coverage.as_str());

        if let Some(bbox) = self.bbox.as_ref().filter(|b| !b.is_empty()) {
            let joined: Vec<String> = bbox.iter().map(|v| v.to_string()).collect();
            query.push("bbox", joined.join(","));
        }
        if let Some(time) = self.time.as_ref().filter(|t| !t.is_empty()) {
            query.push("time", time.join(","));
        }
        if let Some(crs) = &self.crs {
            query.push("crs", crs.as_str());
        }
        if let Some(response_crs) = &self.response_crs {
            query.push("response_crs", response_crs.as_str());
        }
        if let Some(format) = &self.format {
            query.push("format", format.as_str());
        }

        let numbers = [
            ("width", self.width.map(|v| v.to_string())),
            ("height", self.height.map(|v| v.to_string())),
            ("resx", self.resx.map(|v| v.to_string())),
            ("resy", self.resy.map(|v| v.to_string())),
            ("resz", self.resz.map(|v| v.to_string())),
        ];
        for (key, value) in numbers {
            if let Some(value) = value {
                query.push(key, value);
            }
        }

        if let Some(interpolation) = &self.interpolation {
            query.push("interpolation", interpolation.as_str());
        }

        for (key, value) in &self.extra {
            query.set(key.as_str(), value.as_str());
        }

        Ok(query)
    }
}

/// WCS 1.0.0 service.
#[derive(Debug)]
pub struct WebCoverageService100 {
    url: String,
    cookie: Option<String>,
    timeout: Duration,
    client: HttpClient,
    capabilities: Element,
    pub identification: ServiceIdentification,
    pub provider: ServiceProvider,
    pub operations: Vec<Operation>,
    pub exceptions: Vec<String>,
    pub contents: Contents<CoverageOfferingBrief>,
    describe_cache: DescribeCoverageCache,
}

impl WebCoverageService100 {
    pub const VERSION: &'static str = "1.0.0";

    pub async fn connect(url: &str, options: ServiceOptions) -> Result<Self> {
        let reader = CapabilitiesReader::new(Some(Self::VERSION))
            .with_cookie(options.cookie.clone())
            .with_client(options.client.clone());
        let document = reader.read(url, options.timeout).await?;
        Ok(Self::from_document(url, options, document))
    }

    pub fn from_xml(url: &str, xml: &str, options: ServiceOptions) -> Result<Self> {
        let document = CapabilitiesReader::new(Some(Self::VERSION)).read_string(xml)?;
        Ok(Self::from_document(url, options, document))
    }

    fn from_document(url: &str, options: ServiceOptions, document: Element) -> Self {
        let service = document.find("wcs:Service");
        let operations = document
            .findall("wcs:Capability/wcs:Request/*")
            .into_iter()
            .map(parse_operation)
            .collect();

        let mut contents = Contents::new();
        for elem in document.findall("wcs:ContentMetadata/wcs:CoverageOfferingBrief") {
            let brief = CoverageOfferingBrief::from_element(elem);
            contents.insert(brief.name.clone().unwrap_or_default(), brief);
        }

        tracing::info!(
            "✅ WCS 1.0.0 service at {}: {} coverage(s)",
            url,
            contents.len()
        );

        Self {
            url: url.to_string(),
            cookie: options.cookie,
            timeout: options.timeout,
            client: options.client,
            identification: parse_identification(service),
            provider: parse_provider(service),
            operations,
            exceptions: document.findall_text("wcs:Capability/wcs:Exception/wcs:Format"),
            contents,
            capabilities: document,
            describe_cache: DescribeCoverageCache::new(),
        }
    }

    pub fn capabilities(&self) -> &Element {
        &self.capabilities
    }

    pub fn operation_by_name(&self, name: &str) -> Result<&Operation> {
        find_operation(&self.operations, name)
    }

    pub fn content(&self, name: &str) -> Result<&CoverageOfferingBrief> {
        self.contents.lookup(name)
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, &CoverageOfferingBrief)> {
        self.contents.iter()
    }

    /// 未宣告 GetCoverage 端點時退回服務 URL
    pub async fn get_coverage(&self, request: &GetCoverageRequest100) -> Result<Response> {
        tracing::debug!("WCS 1.0.0 GetCoverage parameters: {:?}", request);

        let query = request.to_query()?;
        let base_url = self
            .operation_by_name("GetCoverage")
            .ok()
            .and_then(|op| op.method_url("Get"))
            .unwrap_or(&self.url)
            .to_string();

        let data = query.encode();
        self.client
            .open(
                &base_url,
                Some(&data),
                HttpMethod::Get,
                self.cookie.as_deref(),
                self.timeout,
            )
            .await
    }

    pub async fn describe_coverage(&mut self, name: &str) -> Result<&DescribeCoverage> {
        let reader = DescribeCoverageReader::new(Self::VERSION, name)
            .with_cookie(self.cookie.clone())
            .with_client(self.client.clone());
        self.describe_cache
            .get_or_fetch(reader, &self.url, self.timeout)
            .await
    }
}

#[async_trait]
impl CoverageService for WebCoverageService100 {
    fn url(&self) -> &str {
        &self.url
    }

    fn version(&self) -> &str {
        Self::VERSION
    }

    fn identification(&self) -> &ServiceIdentification {
        &self.identification
    }

    fn provider(&self) -> &ServiceProvider {
        &self.provider
    }

    fn operations(&self) -> &[Operation] {
        &self.operations
    }

    fn coverage_ids(&self) -> Vec<String> {
        self.contents.keys().map(str::to_string).collect()
    }

    async fn describe_coverage(&mut self, identifier: &str) -> Result<&DescribeCoverage> {
        WebCoverageService100::describe_coverage(self, identifier).await
    }
}
