pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, LocalStorage};

pub use config::WcsConfig;
pub use core::{
    CapabilitiesReader, DescribeCoverage, DescribeCoverageReader, GetCoverageRequest,
    GetCoverageRequest100, ServiceOptions, WebCoverageService, WebCoverageService100,
    WebCoverageService11x,
};
pub use domain::ports::{ConfigProvider, CoverageService, Storage};
pub use utils::error::{Result, WcsError};
