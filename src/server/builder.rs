use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::api::{AppState, RestApi};
use crate::cache::{CacheStore, ResponseCache};
use crate::config::types::ApplicationConfig;
use crate::config::validation::Validator;
use crate::server::{ServerError, ServerResult, ServerState};
use crate::upstream::{DataSource, TildeClient};

/// 伺服器構建器
///
/// 未指定快取或資料來源時，依配置建立 `ResponseCache` 與 `TildeClient`。
pub struct ServerBuilder {
    config: ApplicationConfig,
    cache: Option<Arc<dyn CacheStore>>,
    source: Option<Arc<dyn DataSource>>,
}

impl ServerBuilder {
    pub fn new(config: ApplicationConfig) -> Self {
        Self {
            config,
            cache: None,
            source: None,
        }
    }

    /// 使用自訂快取
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// 使用自訂資料來源
    pub fn with_source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn build(self) -> ServerResult<Server> {
        self.config
            .validate()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let cache = match self.cache {
            Some(cache) => cache,
            None => Arc::new(ResponseCache::from_config(&self.config.cache)),
        };

        let (source, client): (Arc<dyn DataSource>, Option<Arc<TildeClient>>) = match self.source {
            Some(source) => (source, None),
            None => {
                let client = Arc::new(TildeClient::from_config(&self.config.upstream)?);
                let source: Arc<dyn DataSource> = client.clone();
                (source, Some(client))
            }
        };

        Ok(Server {
            config: self.config,
            state: Arc::new(RwLock::new(ServerState::Initializing)),
            app_state: AppState::new(cache, source),
            client,
        })
    }
}

/// 伺服器實例
pub struct Server {
    config: ApplicationConfig,
    /// 伺服器狀態
    state: Arc<RwLock<ServerState>>,
    app_state: AppState,
    /// 由構建器建立的上游客戶端，關閉時釋放連線池
    client: Option<Arc<TildeClient>>,
}

impl Server {
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    pub fn state(&self) -> ServerState {
        *self.state.read()
    }

    pub fn app_state(&self) -> &AppState {
        &self.app_state
    }

    /// 綁定配置中的位址並運行，直到 `shutdown` 完成
    pub async fn run<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.server.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Initialization(format!("無法綁定 {}: {}", addr, e)))?;
        self.run_with_listener(listener, shutdown).await
    }

    /// 在既有的監聽器上運行
    pub async fn run_with_listener<F>(self, listener: TcpListener, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = RestApi::new(self.config.rest_api.clone()).build_app(self.app_state.clone());
        let local_addr = listener.local_addr()?;

        *self.state.write() = ServerState::Running;
        info!("伺服器已啟動，監聽 {}", local_addr);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        // 無論服務是否正常結束都要釋放上游連線
        self.shutdown();

        result.map_err(|e| {
            error!("伺服器運行錯誤: {}", e);
            ServerError::Runtime(e.to_string())
        })
    }

    /// 關閉上游客戶端並標記為已停止
    pub fn shutdown(&self) {
        *self.state.write() = ServerState::ShuttingDown;
        info!("正在關閉伺服器...");

        if let Some(client) = &self.client {
            client.close();
        }

        *self.state.write() = ServerState::Stopped;
        info!("伺服器已停止");
    }

    /// 構建器建立的上游客戶端
    pub fn client(&self) -> Option<&Arc<TildeClient>> {
        self.client.as_ref()
    }
}
