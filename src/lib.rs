pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, FetchConfig};

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use self::core::{
    etl::EtlEngine,
    pipeline::ModuleFetchPipeline,
    runner::{KdaTool, ProcessRunner},
};
pub use utils::error::{FetchError, Result, SkipReason};
