use anyhow::{anyhow, Result};
use geomag_gateway::config::{self, LogConfig};
use geomag_gateway::server::{shutdown_signal, ServerBuilder};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化配置
    let app_config = config::init_config()?;

    // 初始化日誌系統
    init_logging(&app_config.log)?;

    // 組裝快取、上游客戶端與路由
    let server = ServerBuilder::new(app_config.clone()).build()?;

    info!("伺服器初始化完成，等待請求...");
    info!("監聽端口: {}", app_config.server.port);

    // 運行直到收到關閉信號，結束時會關閉上游客戶端
    server.run(shutdown_signal()).await?;

    info!("伺服器已退出");
    Ok(())
}

// 初始化日誌系統
fn init_logging(log_config: &LogConfig) -> Result<()> {
    // RUST_LOG 優先，否則使用配置中的級別
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_config.level.to_lowercase()))
        .map_err(|e| anyhow!("無效的日誌級別: {}", e))?;

    let builder = FmtSubscriber::builder().with_env_filter(filter);

    let result = if log_config.is_json() {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.pretty().finish())
    };
    result.map_err(|e| anyhow!("設置日誌系統失敗: {}", e))?;

    info!("日誌系統初始化完成");
    Ok(())
}
