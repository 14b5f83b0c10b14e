use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// 外部工具的兩個呼叫步驟
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStep {
    Generate,
    Local,
}

impl fmt::Display for ToolStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolStep::Generate => write!(f, "gen"),
            ToolStep::Local => write!(f, "local"),
        }
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("KDA template file '{}' does not exist", .path.display())]
    TemplateMissing { path: PathBuf },

    #[error("Failed to read template file '{}': {source}", .path.display())]
    TemplateReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write substituted template '{}': {source}", .path.display())]
    RenderedWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch '{program}': {source}")]
    ToolSpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program} {step}' failed ({status})\n{stderr}")]
    ToolFailed {
        program: String,
        step: ToolStep,
        status: String,
        stderr: String,
    },

    #[error("Request file '{}' was not created by the generate step", .path.display())]
    MissingToolOutput { path: PathBuf },

    #[error("Failed to parse tool output as JSON: {0}")]
    ResponseParseError(#[from] serde_json::Error),

    #[error("Network URL '{0}' not found in tool output")]
    MissingNetworkKey(String),

    #[error("Expected a list under network URL '{0}'")]
    NotASequence(String),

    #[error("Failed to create directory '{}': {source}", .path.display())]
    CreateDirError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to file '{}': {source}", .path.display())]
    WriteFileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl FetchError {
    /// 只影響單一模組的錯誤，其餘情況整個流程中止
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            FetchError::CreateDirError { .. } | FetchError::WriteFileError { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FetchError::TemplateMissing { .. } => {
                "Run from the directory containing fetch-modules.ktpl or pass --template"
            }
            FetchError::TemplateReadError { .. } => "Check the template file permissions",
            FetchError::RenderedWriteError { .. } | FetchError::IoError(_) => {
                "Check that the work directory exists and is writable"
            }
            FetchError::ToolSpawnError { .. } => {
                "Install the kda CLI or point --kda-bin at the executable"
            }
            FetchError::ToolFailed { .. } | FetchError::MissingToolOutput { .. } => {
                "Inspect the tool output above and verify the template renders a valid request"
            }
            FetchError::ResponseParseError(_)
            | FetchError::MissingNetworkKey(_)
            | FetchError::NotASequence(_) => {
                "Verify --network-url matches the network the request was executed against"
            }
            FetchError::CreateDirError { .. } | FetchError::WriteFileError { .. } => {
                "Check that the output directory is writable"
            }
            FetchError::ConfigError { .. } | FetchError::InvalidConfigValueError { .. } => {
                "Fix the command-line flags or the --config file"
            }
        }
    }
}

/// 單筆記錄被略過的原因（警告，不中止）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("missing expected key '{key}' in JSON entry")]
    MissingKey { key: &'static str },

    #[error("'data' field is not a list")]
    DataNotSequence,

    #[error("missing or empty '{field}' in module entry")]
    MissingField { field: &'static str },

    #[error("module name '{name}' is not filesystem-safe: {reason}")]
    UnsafeName { name: String, reason: &'static str },

    #[error("output path '{}' already claimed by an earlier module", .path.display())]
    DuplicatePath { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failure_message_includes_stderr() {
        let err = FetchError::ToolFailed {
            program: "kda".to_string(),
            step: ToolStep::Generate,
            status: "exit code 2".to_string(),
            stderr: "bad template".to_string(),
        };
        let message = err.to_string();
        assert!(message.starts_with("'kda gen' failed (exit code 2)"));
        assert!(message.ends_with("bad template"));
        assert!(!err.is_per_record());
    }

    #[test]
    fn test_write_errors_are_per_record() {
        let err = FetchError::WriteFileError {
            path: PathBuf::from("ns/Thing.pact"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.is_per_record());
        assert_eq!(
            err.recovery_suggestion(),
            "Check that the output directory is writable"
        );
    }
}
