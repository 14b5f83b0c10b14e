pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_url, Validate};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_NETWORK_URL: &str = "https://testnet.mindsend.xyz";
pub const DEFAULT_CHAIN: &str = "0";
pub const DEFAULT_NAMESPACE: &str = "n_9b079bebc8a0d688e4b2f4279a114148d6760edf";
pub const DEFAULT_TEMPLATE: &str = "fetch-modules.ktpl";
pub const DEFAULT_KDA_BIN: &str = "kda";
pub const RENDERED_TEMPLATE_FILE: &str = "substituted_config.ktpl";
pub const REQUEST_FILE: &str = "temp_fetch_module_code.json";

/// 單次執行的完整配置，建立一次後傳入各階段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub network_url: String,
    pub chain: String,
    pub namespace: String,
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
    pub work_dir: PathBuf,
    pub kda_bin: String,
    pub keep_temp: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            network_url: DEFAULT_NETWORK_URL.to_string(),
            chain: DEFAULT_CHAIN.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            template_path: PathBuf::from(DEFAULT_TEMPLATE),
            output_dir: PathBuf::from("."),
            work_dir: PathBuf::from("."),
            kda_bin: DEFAULT_KDA_BIN.to_string(),
            keep_temp: false,
        }
    }
}

impl FetchConfig {
    /// 把配置檔中有設定的欄位套用到目前的值
    pub fn apply_file(&mut self, file: TomlConfig) {
        let TomlConfig {
            network,
            template,
            tool,
            output,
        } = file;

        if let Some(url) = network.url {
            self.network_url = url;
        }
        if let Some(chain) = network.chain {
            self.chain = chain;
        }
        if let Some(path) = template.path {
            self.template_path = path;
        }
        if let Some(namespace) = template.namespace {
            self.namespace = namespace;
        }
        if let Some(program) = tool.program {
            self.kda_bin = program;
        }
        if let Some(dir) = output.dir {
            self.output_dir = dir;
        }
        if let Some(work_dir) = output.work_dir {
            self.work_dir = work_dir;
        }
        if let Some(keep_temp) = output.keep_temp {
            self.keep_temp = keep_temp;
        }
    }
}

impl Validate for FetchConfig {
    fn validate(&self) -> Result<()> {
        validate_url("network_url", &self.network_url)?;
        validate_non_empty_string("chain", &self.chain)?;
        validate_non_empty_string("namespace", &self.namespace)?;
        validate_non_empty_string("kda_bin", &self.kda_bin)?;
        validate_path("template", &self.template_path.to_string_lossy())?;
        validate_path("output_dir", &self.output_dir.to_string_lossy())?;
        validate_path("work_dir", &self.work_dir.to_string_lossy())?;
        Ok(())
    }
}

impl ConfigProvider for FetchConfig {
    fn network_url(&self) -> &str {
        &self.network_url
    }

    fn template_path(&self) -> &Path {
        &self.template_path
    }

    fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn keep_temp(&self) -> bool {
        self.keep_temp
    }

    fn substitutions(&self) -> HashMap<String, String> {
        HashMap::from([
            ("chain".to_string(), self.chain.clone()),
            ("namespace".to_string(), self.namespace.clone()),
        ])
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "kda-module-fetch")]
#[command(about = "Fetch the Pact modules of a namespace and write them as .pact files")]
pub struct CliArgs {
    #[arg(short = 'n', long, alias = "network_url", help = "Network URL to query [default: https://testnet.mindsend.xyz]")]
    pub network_url: Option<String>,

    #[arg(long, help = "Value substituted for {{{chain}}} in the template [default: 0]")]
    pub chain: Option<String>,

    #[arg(long, help = "Value substituted for {{{namespace}}} in the template")]
    pub namespace: Option<String>,

    #[arg(long, help = "KDA template file [default: fetch-modules.ktpl]")]
    pub template: Option<PathBuf>,

    #[arg(long, help = "Directory the namespace folders are written into [default: .]")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, help = "Directory for temporary files [default: .]")]
    pub work_dir: Option<PathBuf>,

    #[arg(long, help = "kda executable [default: kda]")]
    pub kda_bin: Option<String>,

    #[arg(long, help = "TOML file with default settings")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Keep the rendered template and request file")]
    pub keep_temp: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliArgs {
    /// 優先序：命令列 > 配置檔 > 預設值
    pub fn resolve(&self) -> Result<FetchConfig> {
        let mut config = FetchConfig::default();

        if let Some(path) = &self.config {
            tracing::debug!("Loading config file: {}", path.display());
            config.apply_file(TomlConfig::from_file(path)?);
        }

        if let Some(url) = &self.network_url {
            config.network_url = url.clone();
        }
        if let Some(chain) = &self.chain {
            config.chain = chain.clone();
        }
        if let Some(namespace) = &self.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(template) = &self.template {
            config.template_path = template.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(work_dir) = &self.work_dir {
            config.work_dir = work_dir.clone();
        }
        if let Some(kda_bin) = &self.kda_bin {
            config.kda_bin = kda_bin.clone();
        }
        if self.keep_temp {
            config.keep_temp = true;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = FetchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.template_path, PathBuf::from("fetch-modules.ktpl"));
        assert!(!config.keep_temp);
    }

    #[test]
    fn test_substitutions_has_chain_and_namespace() {
        let config = FetchConfig {
            chain: "1".to_string(),
            namespace: "n_test".to_string(),
            ..FetchConfig::default()
        };
        let subs = config.substitutions();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs["chain"], "1");
        assert_eq!(subs["namespace"], "n_test");
    }

    #[test]
    fn test_invalid_network_url_rejected() {
        let config = FetchConfig {
            network_url: "testnet.mindsend.xyz".to_string(),
            ..FetchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_chain_rejected() {
        let config = FetchConfig {
            chain: " ".to_string(),
            ..FetchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_file_overrides_only_set_fields() {
        let mut config = FetchConfig::default();
        let file = TomlConfig::from_toml_str(
            "[network]\nchain = \"5\"\n[output]\ndir = \"modules\"\n",
        )
        .unwrap();

        config.apply_file(file);

        assert_eq!(config.chain, "5");
        assert_eq!(config.output_dir, PathBuf::from("modules"));
        assert_eq!(config.network_url, DEFAULT_NETWORK_URL);
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_parses_short_network_flag() {
        let args = CliArgs::parse_from([
            "kda-module-fetch",
            "-n",
            "https://api.chainweb.com",
            "--chain",
            "2",
            "--namespace",
            "free",
        ]);
        let config = args.resolve().unwrap();

        assert_eq!(config.network_url, "https://api.chainweb.com");
        assert_eq!(config.chain, "2");
        assert_eq!(config.namespace, "free");
        assert_eq!(config.kda_bin, DEFAULT_KDA_BIN);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_overrides_config_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[network]\nchain = \"7\"\nurl = \"https://file.example\"\n")
            .unwrap();

        let args = CliArgs::parse_from([
            "kda-module-fetch",
            "--config",
            file.path().to_str().unwrap(),
            "--chain",
            "3",
        ]);
        let config = args.resolve().unwrap();

        assert_eq!(config.chain, "3");
        assert_eq!(config.network_url, "https://file.example");
    }
}
