use clap::Parser;
use kda_module_fetch::utils::{logger, validation::Validate};
use kda_module_fetch::{
    CliArgs, EtlEngine, KdaTool, LocalStorage, ModuleFetchPipeline, ProcessRunner,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose, args.json_logs);

    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    // 解析並驗證配置
    let config = match args.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("Error: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        "Fetching modules of namespace {} on chain {} from {}",
        config.namespace,
        config.chain,
        config.network_url
    );

    let storage = LocalStorage::new(config.output_dir.clone());
    let tool = KdaTool::new(ProcessRunner, config.kda_bin.clone());
    let pipeline = ModuleFetchPipeline::new(storage, tool, config);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            println!(
                "✅ Wrote {} module files ({} records skipped, {} writes failed)",
                summary.written.len(),
                summary.skipped,
                summary.failed.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("❌ Module fetch failed: {}", e);
            eprintln!("Error: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            ExitCode::FAILURE
        }
    }
}
