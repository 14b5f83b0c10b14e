use crate::utils::error::{FetchError, SkipReason};
use std::path::PathBuf;

pub const MODULE_EXTENSION: &str = "pact";
pub const DEFAULT_LEAF_NAME: &str = "KDA";

/// 一次外部指令的執行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// 被訊號終止時為 None
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn status_description(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// 從回應中取出、通過檢查的模組
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedModule {
    pub qualified_name: String,
    pub namespace: String,
    pub leaf_name: String,
    pub code: String,
}

impl ExtractedModule {
    /// `<namespace>/<leaf>.pact`，相對於輸出目錄
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.namespace).join(format!("{}.{}", self.leaf_name, MODULE_EXTENSION))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// 網路 URL 底下的第幾筆 entry
    pub entry: usize,
    /// entry 內 data 列表的第幾個模組；整筆 entry 被略過時為 None
    pub module: Option<usize>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub modules: Vec<ExtractedModule>,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Default)]
pub struct LoadSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<FetchError>,
    /// 解析階段略過的記錄數
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_uses_namespace_directory() {
        let module = ExtractedModule {
            qualified_name: "ns.foo.Thing".to_string(),
            namespace: "ns.foo".to_string(),
            leaf_name: "Thing".to_string(),
            code: "(module Thing GOV)".to_string(),
        };
        assert_eq!(module.relative_path(), PathBuf::from("ns.foo").join("Thing.pact"));
    }

    #[test]
    fn test_signal_termination_is_failure() {
        let output = ToolOutput {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(!output.is_success());
        assert_eq!(output.status_description(), "terminated by signal");
    }
}
