use crate::adapters::http::{HttpClient, HttpMethod};
use crate::core::capabilities::CapabilitiesReader;
use crate::core::describe::{DescribeCoverage, DescribeCoverageCache, DescribeCoverageReader};
use crate::core::query::ServiceQuery;
use crate::core::service::ServiceOptions;
use crate::domain::contents::Contents;
use crate::domain::model::{
    find_operation, AllowedValues, BoundingBox, ContactMetadata, CrsBoundingBox, Operation,
    OperationMethod, ServiceIdentification, ServiceProvider,
};
use crate::domain::ports::CoverageService;
use crate::utils::error::{Result, WcsError};
use crate::utils::namespaces;
use crate::utils::xml::Element;
use async_trait::async_trait;
use reqwest::Response;
use serde::Serialize;
use std::time::Duration;

/// Looks `path` up under the summary itself, then under its parent summary.
///
/// A path that exists on the child wins even when its text is empty; the
/// parent is only consulted when the child has no such node.
pub fn check_child_and_parent(
    elem: &Element,
    parent: Option<&Element>,
    path: &str,
) -> Option<String> {
    match elem.find(path) {
        Some(found) => found.text().map(str::to_string),
        None => parent
            .and_then(|p| p.find(path))
            .and_then(|found| found.text())
            .map(str::to_string),
    }
}

/// Coverage summary from a WCS 1.1.x capabilities document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentMetadata {
    pub id: Option<String>,
    pub description: Option<String>,
    pub title: Option<String>,
    pub r#abstract: Option<String>,
    /// Own keywords first, then the ones inherited from the parent summary.
    pub keywords: Vec<String>,
    pub bounding_box_wgs84: Option<BoundingBox>,
    pub bounding_boxes: Vec<CrsBoundingBox>,
    pub supported_crs: Vec<String>,
    pub supported_formats: Vec<String>,
}

impl ContentMetadata {
    pub fn from_element(elem: &Element, parent: Option<&Element>) -> Result<Self> {
        let mut keywords = elem.findall_text("Keywords/Keyword");
        if let Some(parent) = parent {
            keywords.extend(parent.findall_text("Keywords/Keyword"));
        }

        // WGS84 框格式錯誤時直接回報錯誤
        let bounding_box_wgs84 = match elem.find("WGS84BoundingBox") {
            Some(b) => Some(parse_wgs84_box(b)?),
            None => None,
        };

        let mut bounding_boxes = Vec::new();
        for b in elem.findall("BoundingBox") {
            match parse_crs_box(b) {
                Ok(bbox) => bounding_boxes.push(bbox),
                Err(e) => tracing::warn!("⚠️ Skipping bounding box: {}", e),
            }
        }

        Ok(Self {
            id: check_child_and_parent(elem, parent, "Identifier"),
            description: check_child_and_parent(elem, parent, "Description"),
            title: check_child_and_parent(elem, parent, "Title"),
            r#abstract: check_child_and_parent(elem, parent, "Abstract"),
            keywords,
            bounding_box_wgs84,
            bounding_boxes,
            supported_crs: elem.findall_text("SupportedCRS"),
            supported_formats: elem.findall_text("SupportedFormat"),
        })
    }

    /// Capabilities summaries do not list time positions.
    pub fn time_positions(&self) -> Vec<String> {
        Vec::new()
    }
}

fn corner_text(b: &Element, corner: &str) -> Result<String> {
    b.find_text(corner).ok_or_else(|| WcsError::BoundingBoxError {
        value: b.tag(),
        reason: format!("missing {}", corner),
    })
}

fn parse_wgs84_box(b: &Element) -> Result<BoundingBox> {
    BoundingBox::from_corners(&corner_text(b, "LowerCorner")?, &corner_text(b, "UpperCorner")?)
}

fn parse_crs_box(b: &Element) -> Result<CrsBoundingBox> {
    let bbox = parse_wgs84_box(b)?;
    let crs = b.attribute("crs").ok_or_else(|| WcsError::BoundingBoxError {
        value: b.tag(),
        reason: "missing crs attribute".to_string(),
    })?;
    Ok(CrsBoundingBox {
        bbox,
        crs: crs.to_string(),
    })
}

pub(crate) fn parse_identification(elem: Option<&Element>, version: &str) -> ServiceIdentification {
    let text = |path: &str| elem.and_then(|e| e.find_text(path));
    ServiceIdentification {
        service: "WCS".to_string(),
        version: version.to_string(),
        title: text("Title"),
        r#abstract: text("Abstract"),
        keywords: elem
            .map(|e| e.findall_text("Keywords/Keyword"))
            .unwrap_or_default(),
        fees: text("Fees"),
        access_constraints: text("AccessConstraints"),
    }
}

pub(crate) fn parse_provider(elem: Option<&Element>) -> ServiceProvider {
    let text = |path: &str| elem.and_then(|e| e.find_text(path));
    let name = text("ProviderName");
    ServiceProvider {
        url: name.clone(),
        name,
        contact: ContactMetadata {
            name: text("ServiceContact/IndividualName"),
            organization: text("ProviderName"),
            address: text("ServiceContact/ContactInfo/Address/DeliveryPoint"),
            city: text("ServiceContact/ContactInfo/Address/City"),
            region: text("ServiceContact/ContactInfo/Address/AdministrativeArea"),
            postcode: text("ServiceContact/ContactInfo/Address/PostalCode"),
            country: text("ServiceContact/ContactInfo/Address/Country"),
            email: text("ServiceContact/ContactInfo/Address/ElectronicMailAddress"),
        },
    }
}

pub(crate) fn parse_operation(elem: &Element) -> Operation {
    let methods = elem
        .findall("DCP/HTTP/*")
        .into_iter()
        .filter_map(|verb| {
            verb.attribute_ns(namespaces::XLINK, "href")
                .map(|url| OperationMethod {
                    binding: verb.name().to_string(),
                    url: url.to_string(),
                })
        })
        .collect();

    let parameters = elem
        .findall("Parameter")
        .into_iter()
        .map(|p| AllowedValues {
            name: p.attribute("name").map(str::to_string),
            values: p.findall_text("AllowedValues/Value"),
        })
        .collect();

    let constraints = elem
        .findall("Constraint")
        .into_iter()
        .map(|c| {
            let mut values = c.findall_text("AllowedValues/Values");
            if values.is_empty() {
                values = c.findall_text("Values");
            }
            AllowedValues {
                name: c.attribute("name").map(str::to_string),
                values,
            }
        })
        .collect();

    Operation {
        name: elem.attribute("name").map(str::to_string),
        format_options: elem.findall_text("Parameter/AllowedValues/Value"),
        methods,
        parameters,
        constraints,
    }
}

/// Hierarchical layout first (one top summary holding the real ones), flat otherwise.
pub(crate) fn parse_contents(root: &Element) -> Result<Contents<ContentMetadata>> {
    let mut contents = Contents::new();

    let top = root.find("Contents/CoverageSummary");
    for elem in root.findall("Contents/CoverageSummary/CoverageSummary") {
        let metadata = ContentMetadata::from_element(elem, top)?;
        contents.insert(metadata.id.clone().unwrap_or_default(), metadata);
    }

    if contents.is_empty() {
        for elem in root.findall("Contents/CoverageSummary") {
            let metadata = ContentMetadata::from_element(elem, None)?;
            contents.insert(metadata.id.clone().unwrap_or_default(), metadata);
        }
    }

    Ok(contents)
}

/// Parameters of a WCS 1.1.x GetCoverage request.
#[derive(Debug, Clone, PartialEq)]
pub struct GetCoverageRequest {
    pub identifier: Vec<String>,
    pub bbox: Option<Vec<f64>>,
    pub time: Option<Vec<String>>,
    pub format: Option<String>,
    pub store: bool,
    pub range_subset: Option<String>,
    pub grid_base_crs: Option<String>,
    pub grid_type: Option<String>,
    pub grid_cs: Option<String>,
    pub grid_origin: Option<String>,
    pub grid_offsets: Option<String>,
    /// DCP binding to use, matched case-insensitively (`Get`, `Post`).
    pub method: String,
    /// Vendor parameters, passed through verbatim.
    pub extra: Vec<(String, String)>,
}

impl Default for GetCoverageRequest {
    fn default() -> Self {
        Self {
            identifier: Vec::new(),
            bbox: None,
            time: None,
            format: None,
            store: false,
            range_subset: None,
            grid_base_crs: None,
            grid_type: None,
            grid_cs: None,
            grid_origin: None,
            grid_offsets: None,
            method: "Get".to_string(),
            extra: Vec::new(),
        }
    }
}

impl GetCoverageRequest {
    pub fn new<I, S>(identifier: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifier: identifier.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn bbox(mut self, bbox: impl Into<Vec<f64>>) -> Self {
        self.bbox = Some(bbox.into());
        self
    }

    pub fn time<I, S>(mut self, time: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.time = Some(time.into_iter().map(Into::into).collect());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn store(mut self, store: bool) -> Self {
        self.store = store;
        self
    }

    pub fn range_subset(mut self, range_subset: impl Into<String>) -> Self {
        self.range_subset = Some(range_subset.into());
        self
    }

    pub fn grid_base_crs(mut self, crs: impl Into<String>) -> Self {
        self.grid_base_crs = Some(crs.into());
        self
    }

    pub fn grid_type(mut self, grid_type: impl Into<String>) -> Self {
        self.grid_type = Some(grid_type.into());
        self
    }

    pub fn grid_cs(mut self, grid_cs: impl Into<String>) -> Self {
        self.grid_cs = Some(grid_cs.into());
        self
    }

    pub fn grid_origin(mut self, origin: impl Into<String>) -> Self {
        self.grid_origin = Some(origin.into());
        self
    }

    pub fn grid_offsets(mut self, offsets: impl Into<String>) -> Self {
        self.grid_offsets = Some(offsets.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// 組出請求參數；identifier 為空時在任何網路呼叫前就失敗
    pub fn to_query(&self, version: &str) -> Result<ServiceQuery> {
        if self.identifier.is_empty() {
            return Err(WcsError::InvalidParameter {
                field: "identifier".to_string(),
                reason: "at least one coverage identifier is required".to_string(),
            });
        }

        let mut query = ServiceQuery::new();
        query.push("version", version);
        query.push("request", "GetCoverage");
        query.push("service", "WCS");
        query.push("identifier", self.identifier.join(","));

        if let Some(bbox) = self.bbox.as_ref().filter(|b| !b.is_empty()) {
            let joined: Vec<String> = bbox.iter().map(|v| v.to_string()).collect();
            query.push("boundingbox", joined.join(","));
        }
        if let Some(time) = self.time.as_ref().filter(|t| !t.is_empty()) {
            query.push("timesequence", time.join(","));
        }
        if let Some(format) = &self.format {
            query.push("format", format.as_str());
        }
        query.push("store", self.store.to_string());

        let optional = [
            ("RangeSubset", &self.range_subset),
            ("gridbaseCRS", &self.grid_base_crs),
            ("gridtype", &self.grid_type),
            ("gridCS", &self.grid_cs),
            ("gridorigin", &self.grid_origin),
            ("gridoffsets", &self.grid_offsets),
        ];
        for (key, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query.push(key, value);
            }
        }

        for (key, value) in &self.extra {
            query.set(key.as_str(), value.as_str());
        }

        Ok(query)
    }
}

/// WCS 1.1.x service.
///
/// Not meant to be shared between tasks: DescribeCoverage answers are cached
/// behind `&mut self`.
#[derive(Debug)]
pub struct WebCoverageService11x {
    url: String,
    version: String,
    cookie: Option<String>,
    timeout: Duration,
    client: HttpClient,
    capabilities: Element,
    pub identification: ServiceIdentification,
    pub provider: ServiceProvider,
    pub operations: Vec<Operation>,
    pub exceptions: Vec<String>,
    pub contents: Contents<ContentMetadata>,
    describe_cache: DescribeCoverageCache,
}

impl WebCoverageService11x {
    pub async fn connect(url: &str, version: &str, options: ServiceOptions) -> Result<Self> {
        let reader = CapabilitiesReader::new(Some(version))
            .with_cookie(options.cookie.clone())
            .with_client(options.client.clone());
        let document = reader.read(url, options.timeout).await?;
        Self::from_document(url, version, options, document)
    }

    /// Builds the service from a capabilities document already at hand.
    pub fn from_xml(url: &str, xml: &str, version: &str, options: ServiceOptions) -> Result<Self> {
        let document = CapabilitiesReader::new(Some(version)).read_string(xml)?;
        Self::from_document(url, version, options, document)
    }

    fn from_document(
        url: &str,
        version: &str,
        options: ServiceOptions,
        document: Element,
    ) -> Result<Self> {
        let identification = parse_identification(document.find("ServiceIdentification"), version);
        let provider = parse_provider(document.find("ServiceProvider"));
        let operations = document
            .findall("OperationsMetadata/Operation")
            .into_iter()
            .map(parse_operation)
            .collect();
        let exceptions = document.findall_text("Capability/Exception/Format");
        let contents = parse_contents(&document)?;

        tracing::info!(
            "✅ WCS {} service at {}: {} coverage(s)",
            version,
            url,
            contents.len()
        );

        Ok(Self {
            url: url.to_string(),
            version: version.to_string(),
            cookie: options.cookie,
            timeout: options.timeout,
            client: options.client,
            capabilities: document,
            identification,
            provider,
            operations,
            exceptions,
            contents,
            describe_cache: DescribeCoverageCache::new(),
        })
    }

    pub fn capabilities(&self) -> &Element {
        &self.capabilities
    }

    pub fn operation_by_name(&self, name: &str) -> Result<&Operation> {
        find_operation(&self.operations, name)
    }

    pub fn content(&self, identifier: &str) -> Result<&ContentMetadata> {
        self.contents.lookup(identifier)
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, &ContentMetadata)> {
        self.contents.iter()
    }

    /// Requests a coverage and hands back the open response without decoding it.
    pub async fn get_coverage(&self, request: &GetCoverageRequest) -> Result<Response> {
        tracing::debug!("WCS {} GetCoverage parameters: {:?}", self.version, request);

        let query = request.to_query(&self.version)?;
        let binding = request.method.as_str();
        let base_url = self
            .operation_by_name("GetCoverage")?
            .method_url(binding)
            .unwrap_or(&self.url)
            .to_string();
        let method = HttpMethod::from_binding(binding).unwrap_or(HttpMethod::Get);

        let data = query.encode();
        self.client
            .open(&base_url, Some(&data), method, self.cookie.as_deref(), self.timeout)
            .await
    }

    pub async fn describe_coverage(&mut self, identifier: &str) -> Result<&DescribeCoverage> {
        let reader = DescribeCoverageReader::new(&self.version, identifier)
            .with_cookie(self.cookie.clone())
            .with_client(self.client.clone());
        self.describe_cache
            .get_or_fetch(reader, &self.url, self.timeout)
            .await
    }

    pub async fn time_limits(&mut self, identifier: &str) -> Result<Vec<String>> {
        Ok(self.describe_coverage(identifier).await?.time_limits())
    }
}

#[async_trait]
impl CoverageService for WebCoverageService11x {
    fn url(&self) -> &str {
        &self.url
    }

    fn version(&self) -> &str {
        &self.version
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
        WebCoverageService11x::describe_coverage(self, identifier).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIERARCHICAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Capabilities xmlns="http://www.opengis.net/wcs/1.1" xmlns:ows="http://www.opengis.net/ows/1.1"
              xmlns:xlink="http://www.w3.org/1999/xlink" version="1.1.0">
  <ows:ServiceIdentification>
    <ows:Title>Ocean WCS</ows:Title>
    <ows:Abstract>Gridded ocean products</ows:Abstract>
    <ows:Keywords><ows:Keyword>ocean</ows:Keyword><ows:Keyword>sst</ows:Keyword></ows:Keywords>
    <ows:ServiceType>WCS</ows:ServiceType>
    <ows:Fees>NONE</ows:Fees>
    <ows:AccessConstraints>NONE</ows:AccessConstraints>
  </ows:ServiceIdentification>
  <ows:ServiceProvider>
    <ows:ProviderName>Ocean Lab</ows:ProviderName>
    <ows:ServiceContact>
      <ows:IndividualName>Jane Doe</ows:IndividualName>
      <ows:ContactInfo>
        <ows:Address>
          <ows:City>Hobart</ows:City>
          <ows:Country>Australia</ows:Country>
          <ows:ElectronicMailAddress>jane@example.com</ows:ElectronicMailAddress>
        </ows:Address>
      </ows:ContactInfo>
    </ows:ServiceContact>
  </ows:ServiceProvider>
  <ows:OperationsMetadata>
    <ows:Operation name="GetCapabilities">
      <ows:DCP><ows:HTTP><ows:Get xlink:href="http://example.com/wcs?"/></ows:HTTP></ows:DCP>
    </ows:Operation>
    <ows:Operation name="GetCoverage">
      <ows:DCP><ows:HTTP>
        <ows:Get xlink:href="http://example.com/coverage?"/>
        <ows:Post xlink:href="http://example.com/coverage/post"/>
      </ows:HTTP></ows:DCP>
      <ows:Parameter name="Format">
        <ows:AllowedValues>
          <ows:Value>application/netcdf</ows:Value>
          <ows:Value>image/tiff</ows:Value>
        </ows:AllowedValues>
      </ows:Parameter>
      <ows:Constraint name="PostEncoding">
        <ows:Values>XML</ows:Values>
      </ows:Constraint>
      <ows:Constraint name="Store">
        <ows:AllowedValues><ows:Values>true</ows:Values></ows:AllowedValues>
        <ows:Values>ignored</ows:Values>
      </ows:Constraint>
    </ows:Operation>
  </ows:OperationsMetadata>
  <Contents>
    <CoverageSummary>
      <ows:Title>All products</ows:Title>
      <ows:Abstract>Parent abstract</ows:Abstract>
      <ows:Keywords><ows:Keyword>parent</ows:Keyword></ows:Keywords>
      <CoverageSummary>
        <ows:Title>Sea surface temperature</ows:Title>
        <ows:Keywords><ows:Keyword>sst</ows:Keyword></ows:Keywords>
        <ows:WGS84BoundingBox>
          <ows:LowerCorner>-180 -90</ows:LowerCorner>
          <ows:UpperCorner>180 90</ows:UpperCorner>
        </ows:WGS84BoundingBox>
        <ows:BoundingBox crs="urn:ogc:def:crs:EPSG::3857">
          <ows:LowerCorner>-2.0E7 -2.0E7</ows:LowerCorner>
          <ows:UpperCorner>2.0E7 2.0E7</ows:UpperCorner>
        </ows:BoundingBox>
        <ows:BoundingBox crs="urn:ogc:def:crs:EPSG::4326">
          <ows:LowerCorner>broken</ows:LowerCorner>
          <ows:UpperCorner>90 180</ows:UpperCorner>
        </ows:BoundingBox>
        <Identifier>sst</Identifier>
        <SupportedCRS>urn:ogc:def:crs:EPSG::4326</SupportedCRS>
        <SupportedFormat>application/netcdf</SupportedFormat>
      </CoverageSummary>
      <CoverageSummary>
        <ows:Keywords><ows:Keyword>chl</ows:Keyword><ows:Keyword>biology</ows:Keyword></ows:Keywords>
        <Identifier>chlorophyll</Identifier>
      </CoverageSummary>
    </CoverageSummary>
  </Contents>
</Capabilities>"#;

    const FLAT: &str = r#"<Capabilities xmlns="http://www.opengis.net/wcs/1.1" xmlns:ows="http://www.opengis.net/ows/1.1">
  <Contents>
    <CoverageSummary>
      <ows:Keywords><ows:Keyword>a</ows:Keyword></ows:Keywords>
      <Identifier>first</Identifier>
    </CoverageSummary>
    <CoverageSummary><Identifier>second</Identifier></CoverageSummary>
    <CoverageSummary><Identifier>third</Identifier></CoverageSummary>
  </Contents>
</Capabilities>"#;

    fn service(xml: &str) -> WebCoverageService11x {
        WebCoverageService11x::from_xml("http://example.com/wcs", xml, "1.1.0", ServiceOptions::default())
            .unwrap()
    }

    #[test]
    fn test_identification_and_provider() {
        let wcs = service(HIERARCHICAL);
        assert_eq!(wcs.identification.title.as_deref(), Some("Ocean WCS"));
        assert_eq!(wcs.identification.keywords, vec!["ocean", "sst"]);
        assert_eq!(wcs.identification.fees.as_deref(), Some("NONE"));
        assert_eq!(wcs.identification.version, "1.1.0");

        assert_eq!(wcs.provider.name.as_deref(), Some("Ocean Lab"));
        assert_eq!(wcs.provider.url, wcs.provider.name);
        assert_eq!(wcs.provider.contact.name.as_deref(), Some("Jane Doe"));
        assert_eq!(wcs.provider.contact.city.as_deref(), Some("Hobart"));
        assert_eq!(wcs.provider.contact.postcode, None);
    }

    #[test]
    fn test_missing_sections_yield_absent_fields() {
        let wcs = service(FLAT);
        assert_eq!(wcs.identification, parse_identification(None, "1.1.0"));
        assert_eq!(wcs.identification.title, None);
        assert_eq!(wcs.provider, ServiceProvider::default());
        assert!(wcs.operations.is_empty());
    }

    #[test]
    fn test_operations() {
        let wcs = service(HIERARCHICAL);
        assert_eq!(wcs.operations.len(), 2);

        let op = wcs.operation_by_name("GetCoverage").unwrap();
        assert_eq!(op.format_options, vec!["application/netcdf", "image/tiff"]);
        assert_eq!(op.method_url("Get"), Some("http://example.com/coverage?"));
        assert_eq!(op.method_url("post"), Some("http://example.com/coverage/post"));
        assert_eq!(op.parameter("Format").unwrap().values.len(), 2);

        assert_eq!(op.constraints[0].name.as_deref(), Some("PostEncoding"));
        assert_eq!(op.constraints[0].values, vec!["XML"]);
        assert_eq!(op.constraints[1].values, vec!["true"]);
    }

    #[test]
    fn test_operation_by_name_not_found() {
        let wcs = service(FLAT);
        assert!(matches!(
            wcs.operation_by_name("GetCoverage"),
            Err(WcsError::OperationNotFound { ref name }) if name == "GetCoverage"
        ));
    }

    #[test]
    fn test_hierarchical_contents_inherit_parent_keywords() {
        let wcs = service(HIERARCHICAL);
        let ids: Vec<&str> = wcs.items().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["sst", "chlorophyll"]);

        let sst = wcs.content("sst").unwrap();
        assert_eq!(sst.keywords, vec!["sst", "parent"]);
        assert_eq!(sst.title.as_deref(), Some("Sea surface temperature"));
        assert_eq!(sst.r#abstract.as_deref(), Some("Parent abstract"));

        let chl = wcs.content("chlorophyll").unwrap();
        assert_eq!(chl.keywords, vec!["chl", "biology", "parent"]);
        assert_eq!(chl.title.as_deref(), Some("All products"));
    }

    #[test]
    fn test_flat_contents_fallback() {
        let wcs = service(FLAT);
        assert_eq!(wcs.contents.len(), 3);
        assert_eq!(wcs.content("first").unwrap().keywords, vec!["a"]);
        assert!(wcs.content("second").unwrap().keywords.is_empty());
    }

    #[test]
    fn test_content_not_found() {
        let wcs = service(FLAT);
        assert!(matches!(
            wcs.content("nope"),
            Err(WcsError::CoverageNotFound { ref identifier }) if identifier == "nope"
        ));
    }

    #[test]
    fn test_bounding_boxes() {
        let wcs = service(HIERARCHICAL);
        let sst = wcs.content("sst").unwrap();
        assert_eq!(
            sst.bounding_box_wgs84.unwrap().as_tuple(),
            (-180.0, -90.0, 180.0, 90.0)
        );
        // 格式錯誤的次要框被略過
        assert_eq!(sst.bounding_boxes.len(), 1);
        assert_eq!(sst.bounding_boxes[0].crs, "urn:ogc:def:crs:EPSG::3857");
        assert_eq!(sst.bounding_boxes[0].bbox.maxx, 2.0e7);
        assert_eq!(sst.supported_crs, vec!["urn:ogc:def:crs:EPSG::4326"]);
        assert_eq!(sst.supported_formats, vec!["application/netcdf"]);
        assert!(sst.time_positions().is_empty());
    }

    #[test]
    fn test_malformed_wgs84_box_is_an_error() {
        let xml = r#"<Capabilities xmlns="http://www.opengis.net/wcs/1.1" xmlns:ows="http://www.opengis.net/ows/1.1">
  <Contents><CoverageSummary>
    <Identifier>bad</Identifier>
    <ows:WGS84BoundingBox><ows:LowerCorner>-180</ows:LowerCorner><ows:UpperCorner>180 90</ows:UpperCorner></ows:WGS84BoundingBox>
  </CoverageSummary></Contents>
</Capabilities>"#;
        let result =
            WebCoverageService11x::from_xml("http://example.com/wcs", xml, "1.1.0", ServiceOptions::default());
        assert!(matches!(result, Err(WcsError::BoundingBoxError { .. })));
    }

    #[test]
    fn test_check_child_and_parent() {
        let xml = r#"<Root>
  <Parent><Title>parent title</Title><Abstract>parent abstract</Abstract></Parent>
  <Child><Title>child title</Title><Abstract/></Child>
</Root>"#;
        let root = Element::parse(xml).unwrap();
        let parent = root.find("Parent");
        let child = root.find("Child").unwrap();

        assert_eq!(
            check_child_and_parent(child, parent, "Title").as_deref(),
            Some("child title")
        );
        assert_eq!(
            check_child_and_parent(child, parent, "Abstract"),
            None,
            "a present but empty child node does not fall back"
        );
        let bare = root.find("Child").unwrap();
        assert_eq!(check_child_and_parent(bare, parent, "Missing"), None);

        let only_parent = Element::parse("<Child><Other/></Child>").unwrap();
        assert_eq!(
            check_child_and_parent(&only_parent, parent, "Title").as_deref(),
            Some("parent title")
        );
        assert_eq!(check_child_and_parent(&only_parent, None, "Title"), None);
    }

    #[test]
    fn test_get_coverage_query() {
        let request = GetCoverageRequest::new(["cov1"])
            .bbox([-112.0, 36.0, -106.0, 41.0])
            .format("application/netcdf")
            .store(true);
        let query = request.to_query("1.1.0").unwrap();

        assert_eq!(query.get("boundingbox"), Some("-112,36,-106,41"));
        assert_eq!(query.get("store"), Some("true"));
        assert_eq!(query.get("identifier"), Some("cov1"));
        assert_eq!(query.get("request"), Some("GetCoverage"));
        assert_eq!(query.get("service"), Some("WCS"));
        assert_eq!(query.get("version"), Some("1.1.0"));
        assert!(!query.has("timesequence"));
        assert!(!query.has("gridbaseCRS"));
    }

    #[test]
    fn test_get_coverage_query_optional_and_extra_params() {
        let request = GetCoverageRequest::new(["a", "b"])
            .time(["2001-01-01T00:00:00Z", "2001-02-01T00:00:00Z"])
            .range_subset("temp[depth[0]]")
            .grid_base_crs("urn:ogc:def:crs:EPSG::4326")
            .param("store", "overridden")
            .param("vendor", "x");
        let query = request.to_query("1.1.0").unwrap();

        assert_eq!(query.get("identifier"), Some("a,b"));
        assert_eq!(
            query.get("timesequence"),
            Some("2001-01-01T00:00:00Z,2001-02-01T00:00:00Z")
        );
        assert_eq!(query.get("RangeSubset"), Some("temp[depth[0]]"));
        assert_eq!(query.get("gridbaseCRS"), Some("urn:ogc:def:crs:EPSG::4326"));
        assert_eq!(query.get("store"), Some("overridden"));
        assert_eq!(query.pairs().last().unwrap().0, "vendor");
    }

    #[test]
    fn test_get_coverage_grid_setters() {
        let query = GetCoverageRequest::new(["sst"])
            .grid_type("urn:ogc:def:method:WCS:1.1:2dSimpleGrid")
            .grid_cs("urn:ogc:def:cs:OGC:0.0:Grid2dSquareCS")
            .grid_origin("-180,90")
            .grid_offsets("0.5,-0.5")
            .grid_base_crs("")
            .to_query("1.1.0")
            .unwrap();

        assert_eq!(query.get("gridtype"), Some("urn:ogc:def:method:WCS:1.1:2dSimpleGrid"));
        assert_eq!(query.get("gridCS"), Some("urn:ogc:def:cs:OGC:0.0:Grid2dSquareCS"));
        assert_eq!(query.get("gridorigin"), Some("-180,90"));
        assert_eq!(query.get("gridoffsets"), Some("0.5,-0.5"));
        assert!(!query.has("gridbaseCRS"));
    }

    #[test]
    fn test_operation_without_name_attribute() {
        let elem = Element::parse(
            r#"<Operation xmlns:xlink="http://www.w3.org/1999/xlink"><DCP><HTTP><Get xlink:href="http://h/wcs?"/></HTTP></DCP></Operation>"#,
        )
        .unwrap();
        let op = parse_operation(&elem);
        assert_eq!(op.name, None);
        assert_eq!(op.method_url("Get"), Some("http://h/wcs?"));
    }

    #[test]
    fn test_get_coverage_requires_identifier() {
        let request = GetCoverageRequest::default().format("image/tiff");
        assert!(matches!(
            request.to_query("1.1.0"),
            Err(WcsError::InvalidParameter { ref field, .. }) if field == "identifier"
        ));
    }
}
