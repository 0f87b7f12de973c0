//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口
//! - [`medicines`] - 药品目录接口
//! - [`prescriptions`] - 处方上传与审核接口
//! - [`orders`] - 订单生命周期接口
//! - [`delivery`] - 配送履约接口
//! - [`inventory`] - 库存台账接口
//! - [`billing`] - 账单查询接口

pub mod auth;
pub mod billing;
pub mod delivery;
pub mod health;
pub mod inventory;
pub mod medicines;
pub mod orders;
pub mod prescriptions;

use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResult, ApiResponse};

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum application with all routers and middleware
pub fn build_app(state: ServerState) -> Router {
    Router::<ServerState>::new()
        // Core APIs
        .merge(auth::router())
        .merge(health::router())
        // Domain APIs
        .merge(medicines::router())
        .merge(prescriptions::router())
        .merge(orders::router())
        .merge(delivery::router())
        .merge(inventory::router())
        .merge(billing::router())
        // JWT 认证中间件 - 在 Router 级别应用，require_auth 内部会跳过公共路由
        // 使用 from_fn_with_state 以便中间件可以访问 ServerState
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        // Tower HTTP 中间件
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        // HTTP 请求日志中间件
        .layer(middleware::from_fn(log_request))
}
