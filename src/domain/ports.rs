use crate::core::describe::DescribeCoverage;
use crate::domain::model::{find_operation, Operation, ServiceIdentification, ServiceProvider};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn service_url(&self) -> &str;
    fn version(&self) -> &str;
    fn timeout(&self) -> Duration;
    fn cookie(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
}

/// Version-independent view over a connected WCS endpoint.
///
/// DescribeCoverage answers are memoized inside the service, which is why the
/// fetching methods take `&mut self`: one owner per service object.
#[async_trait]
pub trait CoverageService: Send {
    fn url(&self) -> &str;
    fn version(&self) -> &str;
    fn identification(&self) -> &ServiceIdentification;
    fn provider(&self) -> &ServiceProvider;
    fn operations(&self) -> &[Operation];
    fn coverage_ids(&self) -> Vec<String>;

    fn operation_by_name(&self, name: &str) -> Result<&Operation> {
        find_operation(self.operations(), name)
    }

    async fn describe_coverage(&mut self, identifier: &str) -> Result<&DescribeCoverage>;

    async fn time_limits(&mut self, identifier: &str) -> Result<Vec<String>> {
        Ok(self.describe_coverage(identifier).await?.time_limits())
    }
}
