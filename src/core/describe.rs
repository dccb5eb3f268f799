use crate::adapters::http::HttpClient;
use crate::core::capabilities::check_for_exception;
use crate::core::query::ServiceQuery;
use crate::domain::model::{BoundingBox, Envelope, ProtocolVersion, TimePeriod};
use crate::utils::error::{Result, WcsError};
use crate::utils::xml::Element;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Builds, fetches and parses a DescribeCoverage request for one coverage.
#[derive(Debug, Clone)]
pub struct DescribeCoverageReader {
    version: String,
    identifier: String,
    cookie: Option<String>,
    xml: Option<String>,
    client: HttpClient,
}

impl DescribeCoverageReader {
    pub fn new(version: &str, identifier: &str) -> Self {
        Self {
            version: version.to_string(),
            identifier: identifier.to_string(),
            cookie: None,
            xml: None,
            client: HttpClient::new(),
        }
    }

    pub fn with_cookie(mut self, cookie: Option<String>) -> Self {
        self.cookie = cookie;
        self
    }

    /// Uses an already fetched document instead of calling the server.
    pub fn with_xml(mut self, xml: impl Into<String>) -> Self {
        self.xml = Some(xml.into());
        self
    }

    pub fn with_client(mut self, client: HttpClient) -> Self {
        self.client = client;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn describe_url(&self, service_url: &str) -> String {
        let mut query = ServiceQuery::from_url(service_url);
        query.push_missing("service", "WCS");
        query.push_missing("request", "DescribeCoverage");
        query.push_missing("version", self.version.as_str());

        match ProtocolVersion::from_version(&self.version) {
            Ok(ProtocolVersion::V100) => {
                query.push_missing("coverage", self.identifier.as_str());
            }
            Ok(ProtocolVersion::V11x) => {
                // WCS 1.1 的規範對 identifier / identifiers 說法不一，兩個都送
                query.push_missing("identifiers", self.identifier.as_str());
                if query.push_missing("identifier", self.identifier.as_str()) {
                    query.push("format", "text/xml");
                }
            }
            Err(_) => {}
        }

        query.to_url()
    }

    pub async fn read(&self, service_url: &str, timeout: Duration) -> Result<DescribeCoverage> {
        if let Some(xml) = &self.xml {
            return self.parse(xml);
        }

        let request = self.describe_url(service_url);
        tracing::debug!("📡 DescribeCoverage: {}", request);
        let xml = self
            .client
            .get_text(&request, self.cookie.as_deref(), timeout)
            .await?;
        tracing::info!(
            "📄 Received coverage description for {} ({} bytes)",
            self.identifier,
            xml.len()
        );

        self.parse(&xml)
    }

    pub fn parse(&self, xml: &str) -> Result<DescribeCoverage> {
        let document = Element::parse(xml)?;
        check_for_exception(&document, xml)?;
        Ok(DescribeCoverage::from_document(document))
    }
}

/// A parsed DescribeCoverage response.
///
/// WCS 1.0.0 answers fill `offerings`, 1.1.x answers fill `descriptions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescribeCoverage {
    #[serde(skip)]
    pub document: Element,
    pub offerings: Vec<CoverageOffering>,
    pub descriptions: Vec<CoverageDescription>,
}

impl DescribeCoverage {
    pub fn from_document(document: Element) -> Self {
        // 只看根節點下一層，不遞迴
        let offerings = document
            .findall("wcs:CoverageOffering")
            .into_iter()
            .map(CoverageOffering::from_element)
            .collect();
        let descriptions = document
            .findall("CoverageDescription")
            .into_iter()
            .map(CoverageDescription::from_element)
            .collect();

        Self {
            document,
            offerings,
            descriptions,
        }
    }

    /// Begin and end of the coverage's temporal extent, empty when unknown.
    ///
    /// WCS 1.1.x: the first two children of the last `TimePeriod`.
    /// WCS 1.0.0: the time period of the first offering, or its first and last
    /// time positions.
    pub fn time_limits(&self) -> Vec<String> {
        let mut limits = Vec::new();
        for period in self
            .document
            .findall("CoverageDescription/Domain/TemporalDomain/TimePeriod")
        {
            if let [begin, end, ..] = period.children() {
                limits = vec![
                    begin.text().unwrap_or_default().to_string(),
                    end.text().unwrap_or_default().to_string(),
                ];
            }
        }
        if !limits.is_empty() {
            return limits;
        }

        let Some(domain) = self
            .offerings
            .first()
            .and_then(|o| o.temporal_domain.as_ref())
        else {
            return limits;
        };

        match (&domain.period.begin, &domain.period.end) {
            (Some(begin), Some(end)) => vec![begin.clone(), end.clone()],
            _ => match (domain.positions.first(), domain.positions.last()) {
                (Some(first), Some(last)) => vec![first.clone(), last.clone()],
                _ => limits,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Grid {
    pub kind: String,
    pub dimension: Option<String>,
    pub low: Option<String>,
    pub high: Option<String>,
    pub axis_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpatialDomain {
    pub envelope: Option<Envelope>,
    pub grid: Option<Grid>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemporalDomain {
    pub period: TimePeriod,
    pub positions: Vec<String>,
}

/// WCS 1.0.0 `CoverageOffering`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageOffering {
    pub description: Option<String>,
    pub name: Option<String>,
    pub label: Option<String>,
    pub envelope: Option<Envelope>,
    pub spatial_domain: Option<SpatialDomain>,
    pub temporal_domain: Option<TemporalDomain>,
    /// Kind of support (`requestResponseCRSs`, `nativeCRSs`, ...) → CRS values.
    pub supported_crs: BTreeMap<String, Vec<String>>,
    pub supported_formats: Vec<String>,
    pub supported_interpolations: Vec<String>,
}

fn push_unique(values: &mut Vec<String>, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }
}

pub(crate) fn parse_envelope(envelope: &Element) -> Envelope {
    let positions = envelope.findall("gml:pos");
    Envelope {
        min_pos: positions.first().and_then(|p| p.text()).map(str::to_string),
        max_pos: positions.get(1).and_then(|p| p.text()).map(str::to_string),
        srs_urn: envelope.attribute("srsName").unwrap_or_default().to_string(),
    }
}

fn parse_grid(grid: &Element) -> Grid {
    Grid {
        kind: grid.name().to_string(),
        dimension: grid.attribute("dimension").map(str::to_string),
        low: grid.find_text("gml:limits/gml:GridEnvelope/gml:low"),
        high: grid.find_text("gml:limits/gml:GridEnvelope/gml:high"),
        axis_names: grid.findall_text("gml:axisName"),
    }
}

impl CoverageOffering {
    pub fn from_element(elem: &Element) -> Self {
        let spatial_domain = elem
            .find("wcs:domainSet/wcs:spatialDomain")
            .map(|spatial| SpatialDomain {
                envelope: spatial.find("gml:Envelope").map(parse_envelope),
                grid: spatial
                    .find("gml:RectifiedGrid")
                    .or_else(|| spatial.find("gml:Grid"))
                    .map(parse_grid),
            });

        let temporal_domain = elem
            .find("wcs:domainSet/wcs:temporalDomain")
            .map(|temporal| TemporalDomain {
                period: temporal
                    .find("wcs:timePeriod")
                    .map(|period| TimePeriod {
                        begin: period.find_text("wcs:beginPosition"),
                        end: period.find_text("wcs:endPosition"),
                    })
                    .unwrap_or_default(),
                positions: temporal.findall_text("gml:timePosition"),
            });

        let mut supported_crs: BTreeMap<String, Vec<String>> = BTreeMap::new();
        if let Some(crss) = elem.find("wcs:supportedCRSs") {
            for child in crss.children() {
                if let Some(text) = child.text() {
                    supported_crs
                        .entry(child.name().to_string())
                        .or_default()
                        .push(text.to_string());
                }
            }
        }

        let mut supported_formats = Vec::new();
        if let Some(formats) = elem.find("wcs:supportedFormats") {
            push_unique(&mut supported_formats, formats.attribute("nativeFormat"));
            for child in formats.children() {
                push_unique(&mut supported_formats, child.text());
            }
        }

        let mut supported_interpolations = Vec::new();
        if let Some(interpolations) = elem.find("wcs:supportedInterpolations") {
            push_unique(&mut supported_interpolations, interpolations.attribute("default"));
            for child in interpolations.children() {
                push_unique(&mut supported_interpolations, child.text());
            }
        }

        Self {
            description: elem.find_text("wcs:description"),
            name: elem.find_text("wcs:name"),
            label: elem.find_text("wcs:label"),
            envelope: elem.find("wcs:lonLatEnvelope").map(parse_envelope),
            spatial_domain,
            temporal_domain,
            supported_crs,
            supported_formats,
            supported_interpolations,
        }
    }
}

/// WCS 1.1.x `CoverageDescription`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageDescription {
    pub identifier: Option<String>,
    pub title: Option<String>,
    pub r#abstract: Option<String>,
    pub keywords: Vec<String>,
    pub bounding_box_wgs84: Option<BoundingBox>,
    pub time_periods: Vec<TimePeriod>,
    pub time_positions: Vec<String>,
    pub supported_crs: Vec<String>,
    pub supported_formats: Vec<String>,
}

impl CoverageDescription {
    pub fn from_element(elem: &Element) -> Self {
        let bounding_box_wgs84 = elem
            .find("Domain/SpatialDomain/WGS84BoundingBox")
            .and_then(|b| {
                let lower = b.find_text("LowerCorner")?;
                let upper = b.find_text("UpperCorner")?;
                BoundingBox::from_corners(&lower, &upper).ok()
            });

        let time_periods = elem
            .findall("Domain/TemporalDomain/TimePeriod")
            .into_iter()
            .map(|period| TimePeriod {
                begin: period.find_text("BeginPosition"),
                end: period.find_text("EndPosition"),
            })
            .collect();

        Self {
            identifier: elem.find_text("Identifier"),
            title: elem.find_text("Title"),
            r#abstract: elem.find_text("Abstract"),
            keywords: elem.findall_text("Keywords/Keyword"),
            bounding_box_wgs84,
            time_periods,
            time_positions: elem.findall_text("Domain/TemporalDomain/TimePosition"),
            supported_crs: elem.findall_text("SupportedCRS"),
            supported_formats: elem.findall_text("SupportedFormat"),
        }
    }
}

/// Per-service memo of DescribeCoverage answers, one entry per identifier.
#[derive(Debug, Clone, Default)]
pub struct DescribeCoverageCache {
    entries: HashMap<String, DescribeCoverage>,
}

impl DescribeCoverageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_fetch(
        &mut self,
        reader: DescribeCoverageReader,
        service_url: &str,
        timeout: Duration,
    ) -> Result<&DescribeCoverage> {
        let identifier = reader.identifier().to_string();
        if !self.entries.contains_key(&identifier) {
            let description = reader.read(service_url, timeout).await?;
            self.entries.insert(identifier.clone(), description);
        } else {
            tracing::debug!("📦 DescribeCoverage cache hit for {}", identifier);
        }

        self.entries
            .get(&identifier)
            .ok_or(WcsError::CoverageNotFound { identifier })
    }

    pub fn get(&self, identifier: &str) -> Option<&DescribeCoverage> {
        self.entries.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
