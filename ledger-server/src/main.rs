use ledger_server::{Config, LedgerState, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境变量与日志
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(
        Some(&config.log_level),
        // 生产环境总是输出 JSON
        Some(config.log_json || config.is_production()),
        config.log_dir.as_deref(),
    );

    tracing::info!(
        environment = %config.environment,
        database = %config.database_path,
        timezone = %config.business_timezone,
        "Branch ledger starting..."
    );

    // 2. 打开数据库并组装服务
    let state = LedgerState::initialize(&config).await?;
    tracing::info!(
        undoable = ?state.undo.registry().entity_types(),
        "Ledger ready, waiting for shutdown signal"
    );

    // 3. 等待退出信号
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    state.pool().close().await;
    Ok(())
}
