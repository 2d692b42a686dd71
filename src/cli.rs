//! 命令行参数
//!
//! 命令行只覆盖显式给出的选项，其余沿用配置文件 / 环境变量 / 默认值。

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, SessionKind};
use crate::error::AppResult;
use crate::models::ClassificationMode;

#[derive(Debug, Parser)]
#[command(name = "sku_exist_check", version, about = "批量检查 SKU 在商品搜索页上是否存在")]
pub struct Cli {
    /// 输入文件（.xlsx 或 .csv）
    pub input: Option<PathBuf>,

    /// 结果文件（.xlsx 或 .csv）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 配置文件（TOML）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// SKU 所在列的列名
    #[arg(long)]
    pub column: Option<String>,

    /// 并发会话数
    #[arg(short = 'n', long)]
    pub pool_size: Option<usize>,

    /// 分类模式: four-way | existence-only
    #[arg(long)]
    pub mode: Option<ClassificationMode>,

    /// 会话类型: browser | http
    #[arg(long)]
    pub session: Option<SessionKind>,

    /// 显示浏览器窗口
    #[arg(long)]
    pub visible: bool,

    /// 连接到已开启远程调试端口的浏览器
    #[arg(long)]
    pub debug_port: Option<u16>,

    /// 每个 SKU 处理完后的等待时间（毫秒）
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// 等待结果标记的超时时间（秒）
    #[arg(long)]
    pub timeout: Option<u64>,

    /// 输出调试日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 加载配置文件和环境变量，再叠加命令行参数
    pub fn into_config(self) -> AppResult<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(self, config: &mut Config) {
        if let Some(input) = self.input {
            config.input_path = input;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(column) = self.column {
            config.sku_column = column;
        }
        if let Some(pool_size) = self.pool_size {
            config.pool_size = pool_size;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(session) = self.session {
            config.session_kind = session;
        }
        if self.visible {
            config.headless = false;
        }
        if let Some(port) = self.debug_port {
            config.browser_debug_port = Some(port);
        }
        if let Some(delay) = self.delay_ms {
            config.request_delay_ms = delay;
        }
        if let Some(timeout) = self.timeout {
            config.wait_timeout_secs = timeout;
        }
        if self.verbose {
            config.verbose_logging = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "sku_exist_check",
            "items.csv",
            "-o",
            "out.csv",
            "--column",
            "SKU",
            "-n",
            "3",
            "--mode",
            "existence-only",
            "--session",
            "http",
            "--visible",
            "--delay-ms",
            "1000",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.input_path, PathBuf::from("items.csv"));
        assert_eq!(config.output_path, PathBuf::from("out.csv"));
        assert_eq!(config.sku_column, "SKU");
        assert_eq!(config.pool_size, 3);
        assert_eq!(config.mode, ClassificationMode::ExistenceOnly);
        assert_eq!(config.session_kind, SessionKind::Http);
        assert!(!config.headless);
        assert_eq!(config.request_delay_ms, 1000);
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let cli = Cli::try_parse_from(["sku_exist_check"]).unwrap();
        let mut config = Config::default();
        cli.apply(&mut config);

        let default = Config::default();
        assert_eq!(config.input_path, default.input_path);
        assert_eq!(config.pool_size, default.pool_size);
        assert!(config.headless);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["sku_exist_check", "--mode", "maybe"]).is_err());
    }
}
