use crate::core::Pipeline;
use crate::domain::model::LoadSummary;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// 依序執行三個階段；不論成功與否都會清除暫存檔
    pub async fn run(&self) -> Result<LoadSummary> {
        let result = self.run_stages().await;
        self.pipeline.cleanup().await;
        result
    }

    async fn run_stages(&self) -> Result<LoadSummary> {
        tracing::info!("Starting module fetch...");

        // Extract
        tracing::info!("Fetching module code...");
        let raw = self.pipeline.extract().await?;
        tracing::debug!("Tool returned {} bytes", raw.len());

        // Transform
        let report = self.pipeline.transform(raw).await?;
        tracing::info!(
            "Extracted {} modules ({} records skipped)",
            report.modules.len(),
            report.skipped.len()
        );

        // Load
        let summary = self.pipeline.load(report).await?;
        tracing::info!(
            "Wrote {} module files ({} failed)",
            summary.written.len(),
            summary.failed.len()
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ExtractionReport;
    use crate::utils::error::FetchError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FailingPipeline {
        cleaned: AtomicBool,
    }

    #[async_trait]
    impl Pipeline for FailingPipeline {
        async fn extract(&self) -> Result<String> {
            Err(FetchError::MissingNetworkKey("https://testnet.mindsend.xyz".to_string()))
        }

        async fn transform(&self, _raw: String) -> Result<ExtractionReport> {
            unreachable!("transform must not run after a failed extract")
        }

        async fn load(&self, _report: ExtractionReport) -> Result<LoadSummary> {
            unreachable!("load must not run after a failed extract")
        }

        async fn cleanup(&self) {
            self.cleaned.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_cleanup_runs_after_failure() {
        let engine = EtlEngine::new(FailingPipeline {
            cleaned: AtomicBool::new(false),
        });

        assert!(engine.run().await.is_err());
        assert!(engine.pipeline.cleaned.load(Ordering::SeqCst));
    }
}
