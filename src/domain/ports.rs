use crate::domain::model::{ExtractionReport, LoadSummary, ToolOutput};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub trait Storage: Send + Sync {
    /// 建立目錄；已存在時視為成功
    fn ensure_dir(&self, path: &Path) -> impl std::future::Future<Output = Result<()>> + Send;
    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn network_url(&self) -> &str;
    fn template_path(&self) -> &Path;
    fn work_dir(&self) -> &Path;
    fn keep_temp(&self) -> bool;
    fn substitutions(&self) -> std::collections::HashMap<String, String>;
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<ToolOutput>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<String>;
    async fn transform(&self, raw: String) -> Result<ExtractionReport>;
    async fn load(&self, report: ExtractionReport) -> Result<LoadSummary>;
    async fn cleanup(&self);
}
