mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uptime_operator_config::OperatorConfig;

#[derive(Parser)]
#[command(name = "uptime-operator")]
#[command(about = "宣言した監視を、UptimeRobot に。", long_about = None)]
struct Cli {
    /// マニフェストのパス（省略時は uptime.kdl を自動検出）
    #[arg(short, long, global = true, env = "UPTIME_OPERATOR_MANIFEST")]
    manifest: Option<PathBuf>,

    /// デバッグログを出力
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// コントロールループを起動（Ctrl-C で停止）
    Run,
    /// マニフェストを検証
    Validate,
    /// 保存済みの観測状態を表示
    Status,
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Version => {
            println!("uptime-operator {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Validate => {
            commands::validate::handle(cli.manifest)?;
        }
        Commands::Status => {
            let config = OperatorConfig::load()?;
            commands::status::handle(&config).await?;
        }
        Commands::Run => {
            let config = OperatorConfig::load()?;
            commands::run::handle(config, cli.manifest).await?;
        }
    }

    Ok(())
}
