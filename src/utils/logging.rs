/// 日志工具模块
///
/// 提供日志初始化以及格式化输出的辅助函数
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::orchestrator::RunStats;

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；未设置时默认 `info`，`verbose` 为真时默认 `debug`。
/// 重复初始化会被忽略。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 生效的配置
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - SKU 存在性检查");
    info!("🌐 搜索地址: {}", config.search_url);
    info!(
        "📊 会话池大小: {} ({})",
        config.pool_size, config.session_kind
    );
    info!("🧭 分类模式: {}", config.mode);
    info!("{}", "=".repeat(60));
}

/// 记录输入加载信息
///
/// # 参数
/// - `total`: SKU 总数
/// - `input`: 输入文件路径
pub fn log_rows_loaded(total: usize, input: &Path) {
    info!("✓ 从 {} 读取到 {} 个 SKU", input.display(), total);
}

/// 记录处理进度
pub fn log_progress(processed: usize, total: usize) {
    info!("📈 已处理 {}/{}", processed, total);
}

/// 打印最终统计信息
///
/// # 参数
/// - `stats`: 本次运行的统计
/// - `output`: 结果文件路径
pub fn print_final_stats(stats: &RunStats, output: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!("开始时间: {}", stats.started_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(finished_at) = stats.finished_at {
        info!("完成时间: {}", finished_at.format("%Y-%m-%d %H:%M:%S"));
    }
    info!("耗时: {:.2} 秒", stats.elapsed().as_secs_f64());
    info!("{}", "=".repeat(60));
    info!("✅ 找到: {}/{}", stats.found, stats.total);
    info!("🚫 无结果: {}", stats.not_found);
    info!("❔ 无法判断: {}", stats.indeterminate);
    info!("❌ 错误: {}", stats.errors);
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
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
