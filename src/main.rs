// ==========================================
// 供应商目录导入 - 命令行入口
// ==========================================
// 用法:
//   vendor-catalog-import import --config vendor.json [--single-pass] [--fresh] [--log-json]
//   vendor-catalog-import check  --config vendor.json
//   vendor-catalog-import show   --config vendor.json
// ==========================================

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use vendor_catalog_import::{logging, ImportApi, ImportMode, VendorConfig};

#[derive(Parser)]
#[command(name = "vendor-catalog-import")]
#[command(about = "供应商商品表 → 电商目录行")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 执行导入（默认按窗口批量，失败后重新运行可续传）
    Import {
        /// 供应商配置文件（JSON）
        #[arg(long)]
        config: PathBuf,
        /// 整表一次处理，不写检查点
        #[arg(long)]
        single_pass: bool,
        /// 忽略已有检查点，从第一条数据开始
        #[arg(long)]
        fresh: bool,
        /// JSON 行格式日志
        #[arg(long)]
        log_json: bool,
    },
    /// 检查配置与数据源，不写入任何数据
    Check {
        #[arg(long)]
        config: PathBuf,
    },
    /// 显示配置概览与续传状态
    Show {
        #[arg(long)]
        config: PathBuf,
    },
}

fn load_config(path: &PathBuf) -> anyhow::Result<VendorConfig> {
    VendorConfig::from_json_file(path)
        .with_context(|| format!("无法加载配置: {}", path.display()))
}

fn init_logging(config: &VendorConfig, json: bool) {
    let level = if config.debug_mode { "debug" } else { "info" };
    if json {
        logging::init_json(level);
    } else {
        logging::init_with_level(level);
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let api = ImportApi::new();

    match cli.command {
        Commands::Import {
            config,
            single_pass,
            fresh,
            log_json,
        } => {
            let config = load_config(&config)?;
            init_logging(&config, log_json);

            tracing::info!("{} v{}", vendor_catalog_import::APP_NAME, vendor_catalog_import::VERSION);

            let mode = if single_pass {
                ImportMode::SinglePass
            } else {
                ImportMode::Batched
            };
            let summary = api.import(&config, mode, fresh)?;
            println!("{}", summary);
            Ok(summary.is_success())
        }
        Commands::Check { config } => {
            let config = load_config(&config)?;
            init_logging(&config, false);

            let report = api.check_configuration(&config);
            println!("{}", report);
            Ok(report.is_ready())
        }
        Commands::Show { config } => {
            let config = load_config(&config)?;
            init_logging(&config, false);

            println!("{}", api.show_configuration(&config)?);
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}
