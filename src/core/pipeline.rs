use crate::core::runner::KdaTool;
use crate::core::{extract, template};
use crate::core::{CommandRunner, ConfigProvider, Pipeline, Storage};
use crate::config::{RENDERED_TEMPLATE_FILE, REQUEST_FILE};
use crate::domain::model::{ExtractionReport, LoadSummary};
use crate::utils::error::{FetchError, Result};
use std::path::PathBuf;

/// template → `kda gen` → `kda local` → 解析 → 寫出 .pact 檔
pub struct ModuleFetchPipeline<S: Storage, R: CommandRunner, C: ConfigProvider> {
    storage: S,
    tool: KdaTool<R>,
    config: C,
}

impl<S: Storage, R: CommandRunner, C: ConfigProvider> ModuleFetchPipeline<S, R, C> {
    pub fn new(storage: S, tool: KdaTool<R>, config: C) -> Self {
        Self {
            storage,
            tool,
            config,
        }
    }

    fn rendered_path(&self) -> PathBuf {
        self.config.work_dir().join(RENDERED_TEMPLATE_FILE)
    }

    fn request_path(&self) -> PathBuf {
        self.config.work_dir().join(REQUEST_FILE)
    }

    async fn render_template(&self) -> Result<PathBuf> {
        let template_path = self.config.template_path();

        if !tokio::fs::metadata(template_path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            return Err(FetchError::TemplateMissing {
                path: template_path.to_path_buf(),
            });
        }

        let content = tokio::fs::read_to_string(template_path)
            .await
            .map_err(|source| FetchError::TemplateReadError {
                path: template_path.to_path_buf(),
                source,
            })?;

        let rendered = template::render(&content, &self.config.substitutions());

        let rendered_path = self.rendered_path();
        tokio::fs::write(&rendered_path, rendered)
            .await
            .map_err(|source| FetchError::RenderedWriteError {
                path: rendered_path.clone(),
                source,
            })?;

        tracing::debug!("Rendered template written to {}", rendered_path.display());
        Ok(rendered_path)
    }
}

#[async_trait::async_trait]
impl<S: Storage, R: CommandRunner, C: ConfigProvider> Pipeline for ModuleFetchPipeline<S, R, C> {
    async fn extract(&self) -> Result<String> {
        let rendered_path = self.render_template().await?;
        let request_path = self.request_path();

        // 上次 --keep-temp 留下的請求檔不能冒充這次 gen 的輸出
        match tokio::fs::remove_file(&request_path).await {
            Ok(()) => tracing::debug!("Removed stale request file {}", request_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(FetchError::IoError(e)),
        }

        self.tool.generate(&rendered_path, &request_path).await?;

        tracing::debug!("Executing request against {}", self.config.network_url());
        self.tool
            .execute_local(&request_path, self.config.network_url())
            .await
    }

    async fn transform(&self, raw: String) -> Result<ExtractionReport> {
        extract::parse_response(&raw, self.config.network_url())
    }

    async fn load(&self, report: ExtractionReport) -> Result<LoadSummary> {
        let mut summary = LoadSummary {
            skipped: report.skipped.len(),
            ..LoadSummary::default()
        };

        for module in report.modules {
            let directory = PathBuf::from(&module.namespace);
            if let Err(e) = self.storage.ensure_dir(&directory).await {
                if !e.is_per_record() {
                    return Err(e);
                }
                tracing::warn!("Skipping module '{}': {}", module.qualified_name, e);
                summary.failed.push(e);
                continue;
            }

            let path = module.relative_path();
            let written = self.storage.write_file(&path, module.code.as_bytes()).await;
            match written {
                Ok(()) => {
                    tracing::debug!("Wrote {}", path.display());
                    summary.written.push(path);
                }
                Err(e) if e.is_per_record() => {
                    tracing::warn!("Skipping module '{}': {}", module.qualified_name, e);
                    summary.failed.push(e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(summary)
    }

    async fn cleanup(&self) {
        if self.config.keep_temp() {
            tracing::info!(
                "Keeping temporary files in {}",
                self.config.work_dir().display()
            );
            return;
        }

        for path in [self.request_path(), self.rendered_path()] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!("Deleted temporary file {}", path.display()),
                // 流程提早中止時檔案可能還沒建立
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    "Failed to delete temporary file '{}': {}",
                    path.display(),
                    e
                ),
            }
        }
    }
}
