use crate::utils::error::{FetchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `--config` 檔案；每個欄位都可省略，省略時沿用預設值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    pub network: NetworkSection,
    pub template: TemplateSection,
    pub tool: ToolSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkSection {
    pub url: Option<String>,
    pub chain: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateSection {
    pub path: Option<PathBuf>,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSection {
    pub program: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub dir: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
    pub keep_temp: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| FetchError::ConfigError {
            message: format!(
                "failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FetchError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${KDA_NAMESPACE})，未設定的保留原文
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[network]
url = "https://api.testnet.chainweb.com"
chain = "1"

[template]
path = "templates/fetch-modules.ktpl"
namespace = "free"

[tool]
program = "/usr/local/bin/kda"

[output]
dir = "./modules"
work_dir = "/tmp"
keep_temp = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.network.url.as_deref(), Some("https://api.testnet.chainweb.com"));
        assert_eq!(config.network.chain.as_deref(), Some("1"));
        assert_eq!(config.template.namespace.as_deref(), Some("free"));
        assert_eq!(config.tool.program.as_deref(), Some("/usr/local/bin/kda"));
        assert_eq!(config.output.dir, Some(PathBuf::from("./modules")));
        assert_eq!(config.output.keep_temp, Some(true));
    }

    #[test]
    fn test_sections_are_optional() {
        let config = TomlConfig::from_toml_str("[network]\nchain = \"2\"\n").unwrap();
        assert_eq!(config.network.chain.as_deref(), Some("2"));
        assert!(config.network.url.is_none());
        assert!(config.template.path.is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("KDA_FETCH_TEST_NAMESPACE", "n_from_env");

        let config = TomlConfig::from_toml_str(
            "[template]\nnamespace = \"${KDA_FETCH_TEST_NAMESPACE}\"\n",
        )
        .unwrap();
        assert_eq!(config.template.namespace.as_deref(), Some("n_from_env"));

        std::env::remove_var("KDA_FETCH_TEST_NAMESPACE");
    }

    #[test]
    fn test_unset_env_var_left_literal() {
        let config = TomlConfig::from_toml_str(
            "[template]\nnamespace = \"${KDA_FETCH_TEST_UNSET_VAR}\"\n",
        )
        .unwrap();
        assert_eq!(
            config.template.namespace.as_deref(),
            Some("${KDA_FETCH_TEST_UNSET_VAR}")
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = TomlConfig::from_toml_str("[network]\nretries = 3\n").unwrap_err();
        assert!(matches!(err, FetchError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[tool]\nprogram = \"kda-dev\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.tool.program.as_deref(), Some("kda-dev"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = TomlConfig::from_file("/nonexistent/kda-fetch.toml").unwrap_err();
        assert!(matches!(err, FetchError::ConfigError { .. }));
    }
}
