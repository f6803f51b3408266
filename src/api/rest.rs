// src/api/rest.rs
use axum::http::{HeaderValue, StatusCode};
use axum::Router;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowHeaders, AllowMethods, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn};

use super::{
    error::handle_panic,
    routes::{api_routes, system::root_routes},
    state::AppState,
};
use crate::config::RestApiConfig;

pub struct RestApi {
    api_config: RestApiConfig,
}

impl RestApi {
    pub fn new(api_config: RestApiConfig) -> Self {
        Self { api_config }
    }

    /// 建立完整應用：API 路由、根路由與中間件
    pub fn build_app(&self, state: AppState) -> Router {
        let base_path = self.api_config.base_path.trim_end_matches('/');
        info!(base_path, "建立 REST API 路由");

        let router = if base_path.is_empty() {
            Router::new().merge(api_routes())
        } else {
            Router::new().nest(base_path, api_routes())
        };

        let mut app = router
            .merge(root_routes())
            // 將 panic 轉為 500 回應
            .layer(CatchPanicLayer::custom(handle_panic))
            // 超時設置
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.api_config.request_timeout(),
            ));

        // 壓縮
        if self.api_config.enable_compression {
            app = app.layer(CompressionLayer::new());
        }

        app
            // CORS
            .layer(self.build_cors_layer())
            // 追蹤層
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_response(DefaultOnResponse::new().include_headers(true)),
            )
            .with_state(state)
    }

    fn build_cors_layer(&self) -> CorsLayer {
        let origin = self.api_config.cors_origin.trim();

        // 任意來源時不可同時允許憑證
        if origin == "*" {
            return CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
        }

        match origin.parse::<HeaderValue>() {
            Ok(origin) => CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request()),
            Err(err) => {
                warn!(origin, error = %err, "無效的 CORS 來源，停用跨來源存取");
                CorsLayer::new()
            }
        }
    }
}
