use anyhow::Result;
use httpmock::prelude::*;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use wcs_client::utils::validation::Validate;
use wcs_client::{ConfigProvider, CoverageService, LocalStorage, Storage, WcsConfig, WebCoverageService};

#[tokio::test]
async fn test_service_from_toml_config() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/geoserver/wcs")
            .query_param("version", "1.1.2")
            .header("Cookie", "JSESSIONID=abc");
        then.status(200).body(
            r#"<Capabilities xmlns="http://www.opengis.net/wcs/1.1" xmlns:ows="http://www.opengis.net/ows/1.1">
  <Contents><CoverageSummary><Identifier>nurc:Img_Sample</Identifier></CoverageSummary></Contents>
</Capabilities>"#,
        );
    });

    std::env::set_var("WCS_CONFIG_TEST_COOKIE", "JSESSIONID=abc");
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[service]
url = "{}"
version = "1.1.2"
timeout_seconds = 5
cookie = "${{WCS_CONFIG_TEST_COOKIE}}"
"#,
        server.url("/geoserver/wcs")
    )?;

    let config = WcsConfig::from_file(file.path())?;
    config.validate()?;
    std::env::remove_var("WCS_CONFIG_TEST_COOKIE");

    let wcs = WebCoverageService::from_config(&config).await?;

    mock.assert();
    assert_eq!(wcs.coverage_ids(), vec!["nurc:Img_Sample"]);
    assert_eq!(wcs.version(), "1.1.2");
    Ok(())
}

#[tokio::test]
async fn test_coverage_body_lands_in_output_path() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = WcsConfig::new("https://example.com/wcs", "1.1.0");
    config.output.path = temp_dir.path().to_string_lossy().to_string();

    let storage = LocalStorage::new(config.output_path().to_string());
    let written = storage.write_file("sst.nc", b"CDF\x01").await?;

    assert!(std::path::Path::new(&written).exists());
    assert_eq!(std::fs::read(temp_dir.path().join("sst.nc"))?, b"CDF\x01");
    Ok(())
}
