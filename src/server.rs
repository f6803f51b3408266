// server.rs - 伺服器核心組件，宣告子模組
//
// 伺服器模組負責組裝快取、上游客戶端與 HTTP 路由，並管理生命週期：
// - 構建器模式的伺服器組裝
// - 伺服器啟動與優雅關閉

/// 伺服器構建器實現
pub mod builder;
/// 伺服器級別錯誤處理
pub mod error;

use tokio::signal;
use tracing::{error, info};

// 重新導出核心組件，簡化外部使用
pub use crate::config::types::ServerConfig;
pub use builder::{Server, ServerBuilder};
pub use error::{ServerError, ServerResult};

/// 伺服器狀態枚舉
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// 伺服器正在初始化
    Initializing,
    /// 伺服器正在運行
    Running,
    /// 伺服器正在關閉
    ShuttingDown,
    /// 伺服器已停止
    Stopped,
}

/// 等待 Ctrl+C 或 SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("無法監聽關閉信號: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("無法監聽 SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("接收到關閉信號，正在退出...");
}
