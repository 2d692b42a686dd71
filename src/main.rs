use anyhow::Result;
use clap::Parser;
use sku_exist_check::utils::logging;
use sku_exist_check::{App, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行并加载配置
    let config = Cli::parse().into_config()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
