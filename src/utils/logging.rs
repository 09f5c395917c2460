/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则按 `verbose` 选择 debug 或 info。
/// 重复调用不会报错，测试里可以多次调用。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录服务启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 图片描述审核服务启动");
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 监听地址: {}", config.bind_addr);
    info!("📁 上传目录: {}", config.upload_dir.display());
    info!("⏱️ 描述服务超时: {} 秒", config.caption_timeout_secs);
    info!("{}", "=".repeat(60));
}

/// 打印审核会话统计
///
/// # 参数
/// - `approved`: 通过数量
/// - `rejected`: 拒绝数量
/// - `failed`: 描述失败数量
/// - `total`: 图片总数
pub fn print_review_stats(approved: usize, rejected: usize, failed: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 审核完成统计");
    info!("{}", "=".repeat(60));
    info!("✅ 通过: {}/{}", approved, total);
    info!("🚫 拒绝: {}", rejected);
    info!("❌ 描述失败: {}", failed);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
