pub mod capabilities;
pub mod describe;
pub mod query;
pub mod service;
pub mod wcs100;
pub mod wcs110;

pub use capabilities::CapabilitiesReader;
pub use describe::{DescribeCoverage, DescribeCoverageReader};
pub use service::{ServiceOptions, WebCoverageService};
pub use wcs100::{GetCoverageRequest100, WebCoverageService100};
pub use wcs110::{ContentMetadata, GetCoverageRequest, WebCoverageService11x};
