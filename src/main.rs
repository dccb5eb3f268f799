use clap::Parser;
use serde_json::json;
use wcs_client::config::{Command, GetCoverageArgs};
use wcs_client::utils::error::{ErrorSeverity, WcsError};
use wcs_client::utils::logger;
use wcs_client::{
    CliConfig, ConfigProvider, CoverageService, GetCoverageRequest, GetCoverageRequest100,
    LocalStorage, Result, Storage, WcsConfig, WebCoverageService,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting wcs-client");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&cli.command, &config).await {
        tracing::error!("❌ Request failed: {} (Severity: {:?})", e, e.severity());
        eprintln!("❌ {}", e.user_friendly_message());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

async fn run(command: &Command, config: &WcsConfig) -> Result<()> {
    let mut service = WebCoverageService::from_config(config).await?;

    match command {
        Command::Capabilities => {
            let summary = json!({
                "url": service.url(),
                "version": service.version(),
                "identification": service.identification(),
                "provider": service.provider(),
                "operations": service.operations(),
                "coverages": service.coverage_ids(),
            });
            print_json(&summary)
        }
        Command::Describe { identifier } => {
            let description = serde_json::to_value(service.describe_coverage(identifier).await?)?;
            let time_limits = service.time_limits(identifier).await?;
            print_json(&json!({
                "identifier": identifier,
                "time_limits": time_limits,
                "description": description,
            }))
        }
        Command::GetCoverage(args) => get_coverage(&service, args, config).await,
    }
}

async fn get_coverage(
    service: &WebCoverageService,
    args: &GetCoverageArgs,
    config: &WcsConfig,
) -> Result<()> {
    let extra = args.extra_params()?;

    let response = match service {
        WebCoverageService::V100(wcs) => {
            let coverage = args.single_coverage()?;
            let mut request = GetCoverageRequest100::new(coverage);
            if !args.bbox.is_empty() {
                request = request.bbox(args.bbox.clone());
            }
            if !args.time.is_empty() {
                request.time = Some(args.time.clone());
            }
            request.crs = args.crs.clone();
            request.format = args.format.clone();
            request.width = args.width;
            request.height = args.height;
            request.extra = extra;
            wcs.get_coverage(&request).await?
        }
        WebCoverageService::V11x(wcs) => {
            let mut request = GetCoverageRequest::new(args.identifier.clone()).store(args.store);
            if !args.bbox.is_empty() {
                request = request.bbox(args.bbox.clone());
            }
            if !args.time.is_empty() {
                request = request.time(args.time.clone());
            }
            request.format = args.format.clone();
            request.extra = extra;
            wcs.get_coverage(&request).await?
        }
    };

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let body = response.bytes().await.map_err(WcsError::HttpError)?;

    let storage = LocalStorage::new(config.output_path().to_string());
    let written = storage.write_file(&args.output_file(), &body).await?;

    tracing::info!("📁 Saved {} bytes ({}) to {}", body.len(), content_type, written);
    print_json(&json!({
        "path": written,
        "bytes": body.len(),
        "content_type": content_type,
    }))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
