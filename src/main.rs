use anyhow::Result;
use caption_review::orchestrator::{App, DecisionPolicy, ReviewRunner};
use caption_review::session::SessionMode;
use caption_review::utils::logging;
use caption_review::{Config, ReviewApiClient};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "caption_review", about = "图片描述生成与人工审核")]
struct Cli {
    /// TOML 配置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 启动 HTTP 服务
    Serve,
    /// 上传图片、审核描述并导出历史
    Review {
        /// 待审核的图片
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// 后端地址，覆盖配置
        #[arg(long)]
        api_base_url: Option<String>,
        /// 多图模式，导出 imageDetails.json
        #[arg(long)]
        multi: bool,
        /// 导出文件路径
        #[arg(long)]
        export: Option<PathBuf>,
        /// 全部通过
        #[arg(long, conflicts_with = "reject_all")]
        approve_all: bool,
        /// 全部拒绝
        #[arg(long)]
        reject_all: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(cli.config.as_deref())?;
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    match cli.command {
        Command::Serve => App::initialize(config)?.run().await?,
        Command::Review {
            images,
            api_base_url,
            multi,
            export,
            approve_all,
            reject_all,
        } => {
            if let Some(url) = api_base_url {
                config.api_base_url = url;
            }
            let policy = if approve_all {
                DecisionPolicy::ApproveAll
            } else if reject_all {
                DecisionPolicy::RejectAll
            } else {
                DecisionPolicy::Interactive
            };
            let mode = if multi {
                SessionMode::Multi
            } else {
                SessionMode::Single
            };

            let client = ReviewApiClient::new(&config)?;
            let mut runner = ReviewRunner::new(client, mode, policy);
            runner.run(&images).await?;
            runner.export(export.as_deref()).await?;
        }
    }

    Ok(())
}
