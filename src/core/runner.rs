use crate::core::CommandRunner;
use crate::domain::model::ToolOutput;
use crate::utils::error::{FetchError, Result, ToolStep};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// 以 tokio::process 執行外部程式，參數直接傳遞不經過 shell
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<ToolOutput> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        tracing::debug!("Running: {} {}", program, args.join(" "));

        let output = command
            .output()
            .await
            .map_err(|source| FetchError::ToolSpawnError {
                program: program.to_string(),
                source,
            })?;

        Ok(ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// kda 的 gen / local 兩個子指令
#[derive(Debug, Clone)]
pub struct KdaTool<R: CommandRunner> {
    runner: R,
    program: String,
    cwd: Option<PathBuf>,
}

impl<R: CommandRunner> KdaTool<R> {
    pub fn new(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
            cwd: None,
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// `kda gen -t <template> -o <output>`；失敗或沒有產生輸出檔都會中止
    pub async fn generate(&self, template: &Path, output: &Path) -> Result<()> {
        let args = vec![
            "gen".to_string(),
            "-t".to_string(),
            template.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
        ];
        self.run_step(ToolStep::Generate, &args).await?;

        // 相對路徑以工具的工作目錄為基準
        let produced = match &self.cwd {
            Some(dir) => dir.join(output),
            None => output.to_path_buf(),
        };
        if !tokio::fs::metadata(&produced)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            return Err(FetchError::MissingToolOutput {
                path: output.to_path_buf(),
            });
        }

        Ok(())
    }

    /// `kda local <request> -n <network_url>`，回傳 stdout
    pub async fn execute_local(&self, request: &Path, network_url: &str) -> Result<String> {
        let args = vec![
            "local".to_string(),
            request.display().to_string(),
            "-n".to_string(),
            network_url.to_string(),
        ];
        let output = self.run_step(ToolStep::Local, &args).await?;
        Ok(output.stdout)
    }

    async fn run_step(&self, step: ToolStep, args: &[String]) -> Result<ToolOutput> {
        let output = self
            .runner
            .run(&self.program, args, self.cwd.as_deref())
            .await?;

        if !output.is_success() {
            return Err(FetchError::ToolFailed {
                program: self.program.clone(),
                step,
                status: output.status_description(),
                stderr: output.stderr,
            });
        }

        tracing::debug!("{} {} finished ({} bytes of output)", self.program, step, output.stdout.len());
        Ok(output)
    }
}
