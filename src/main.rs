use anyhow::Context;
use cudabox_lib::config::{default_config_path, load_config};
use cudabox_lib::database::init_database;
use cudabox_lib::server;
use cudabox_lib::session::SessionCoordinator;
use cudabox_lib::task::SimulatedWorkload;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("加载配置失败: {:?}", config_path))?;
    config.validate()?;

    let level = config
        .logging
        .tracing_level()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let db = init_database(&config.storage.database_path)
        .with_context(|| format!("初始化数据库失败: {:?}", config.storage.database_path))?;
    let coordinator = SessionCoordinator::new(db, &config, Arc::new(SimulatedWorkload))?;

    server::run_server(&config.server, Arc::new(coordinator), async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("收到退出信号，正在关闭服务器");
    })
    .await
    .map_err(|e| anyhow::anyhow!("服务器异常退出: {}", e))?;

    Ok(())
}
