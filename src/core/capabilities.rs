use crate::adapters::http::HttpClient;
use crate::core::query::ServiceQuery;
use crate::utils::error::{Result, WcsError};
use crate::utils::namespaces;
use crate::utils::xml::Element;
use std::time::Duration;

/// Fetches and parses a WCS GetCapabilities document.
#[derive(Debug, Clone, Default)]
pub struct CapabilitiesReader {
    version: Option<String>,
    cookie: Option<String>,
    client: HttpClient,
}

impl CapabilitiesReader {
    pub fn new(version: Option<&str>) -> Self {
        Self {
            version: version.map(str::to_string),
            cookie: None,
            client: HttpClient::new(),
        }
    }

    pub fn with_cookie(mut self, cookie: Option<String>) -> Self {
        self.cookie = cookie;
        self
    }

    pub fn with_client(mut self, client: HttpClient) -> Self {
        self.client = client;
        self
    }

    /// 只補上原 URL 沒有的 service / request / version
    pub fn capabilities_url(&self, service_url: &str) -> String {
        let mut query = ServiceQuery::from_url(service_url);
        query.push_missing("service", "WCS");
        query.push_missing("request", "GetCapabilities");
        if let Some(version) = &self.version {
            query.push_missing("version", version.as_str());
        }
        query.to_url()
    }

    pub async fn read(&self, service_url: &str, timeout: Duration) -> Result<Element> {
        let request = self.capabilities_url(service_url);
        tracing::debug!("📡 GetCapabilities: {}", request);

        let xml = self
            .client
            .get_text(&request, self.cookie.as_deref(), timeout)
            .await?;
        tracing::info!("📄 Received capabilities document ({} bytes)", xml.len());

        self.read_string(&xml)
    }

    /// Parses a capabilities document that was obtained elsewhere.
    pub fn read_string(&self, xml: &str) -> Result<Element> {
        let document = Element::parse(xml)?;
        check_for_exception(&document, xml)?;
        Ok(document)
    }
}

/// Fails with [`WcsError::ServiceException`] when the document embeds an OGC
/// exception: an OWS `Exception` anywhere in the tree, or a WCS 1.0.0
/// `ServiceException`.
pub fn check_for_exception(document: &Element, raw: &str) -> Result<()> {
    let exception = document.descendants().into_iter().find(|e| {
        let ns = e.namespace().unwrap_or_default();
        (e.name() == "Exception" && namespaces::is_ows(ns))
            || (e.name() == "ServiceException" && (ns.is_empty() || ns == namespaces::OGC))
    });

    match exception {
        Some(exception) => {
            let message = exception_message(exception);
            tracing::warn!("⚠️ Server returned an exception report: {}", message);
            Err(WcsError::ServiceException {
                message,
                xml: raw.to_string(),
            })
        }
        None => Ok(()),
    }
}

fn exception_message(exception: &Element) -> String {
    match exception.text() {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => exception.findall_text("ExceptionText").join("; "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_url_adds_missing_params() {
        let reader = CapabilitiesReader::new(Some("1.1.0"));
        assert_eq!(
            reader.capabilities_url("http://host/wcs"),
            "http://host/wcs?service=WCS&request=GetCapabilities&version=1.1.0"
        );
    }

    #[test]
    fn test_capabilities_url_does_not_duplicate_params() {
        let reader = CapabilitiesReader::new(Some("1.1.0"));
        let url = reader.capabilities_url(
            "http://host/wcs?service=WCS&request=GetCapabilities&version=1.1.2",
        );
        assert_eq!(
            url,
            "http://host/wcs?service=WCS&request=GetCapabilities&version=1.1.2"
        );
    }

    #[test]
    fn test_capabilities_url_key_match_is_case_sensitive() {
        let reader = CapabilitiesReader::new(None);
        let url = reader.capabilities_url("http://host/wcs?SERVICE=WCS&map=a.map");
        assert_eq!(
            url,
            "http://host/wcs?SERVICE=WCS&map=a.map&service=WCS&request=GetCapabilities"
        );
    }

    #[test]
    fn test_capabilities_url_blank_params_count_as_missing() {
        let reader = CapabilitiesReader::new(Some("1.1.0"));
        let url = reader.capabilities_url("http://h/wcs?service&map=x");
        assert_eq!(
            url,
            "http://h/wcs?map=x&service=WCS&request=GetCapabilities&version=1.1.0"
        );
    }

    #[test]
    fn test_exception_nested_deep_in_document() {
        let xml = r#"<Capabilities xmlns="http://www.opengis.net/wcs/1.1" xmlns:ows="http://www.opengis.net/ows/1.1">
  <Contents>
    <Wrapper>
      <ows:Exception exceptionCode="NoApplicableCode">
        <ows:ExceptionText>Backend store unavailable</ows:ExceptionText>
      </ows:Exception>
    </Wrapper>
  </Contents>
</Capabilities>"#;

        match CapabilitiesReader::new(Some("1.1.0")).read_string(xml) {
            Err(WcsError::ServiceException { message, .. }) => {
                assert_eq!(message, "Backend store unavailable")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_read_string_raises_on_ows_exception() {
        let xml = r#"<ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows/1.1" version="1.1.0">
  <ows:Exception exceptionCode="InvalidParameterValue" locator="version">
    <ows:ExceptionText>Version 9.9 is not supported</ows:ExceptionText>
  </ows:Exception>
</ows:ExceptionReport>"#;

        let reader = CapabilitiesReader::new(Some("1.1.0"));
        match reader.read_string(xml) {
            Err(WcsError::ServiceException { message, xml: raw }) => {
                assert_eq!(message, "Version 9.9 is not supported");
                assert_eq!(raw, xml);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_read_string_raises_on_wcs100_service_exception() {
        let xml = r#"<ServiceExceptionReport xmlns="http://www.opengis.net/ogc" version="1.2.0">
  <ServiceException code="CoverageNotDefined">No such coverage</ServiceException>
</ServiceExceptionReport>"#;

        let err = CapabilitiesReader::new(Some("1.0.0"))
            .read_string(xml)
            .unwrap_err();
        assert!(
            matches!(err, WcsError::ServiceException { ref message, .. } if message == "No such coverage")
        );
    }

    #[test]
    fn test_read_string_accepts_capabilities() {
        let xml = r#"<Capabilities xmlns="http://www.opengis.net/wcs/1.1" xmlns:ows="http://www.opengis.net/ows/1.1">
  <ows:ServiceIdentification><ows:Title>Test</ows:Title></ows:ServiceIdentification>
</Capabilities>"#;
        let document = CapabilitiesReader::new(Some("1.1.0"))
            .read_string(xml)
            .unwrap();
        assert_eq!(document.name(), "Capabilities");
    }
}
