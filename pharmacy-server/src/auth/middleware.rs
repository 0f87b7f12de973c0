//! 认证中间件
//!
//! 为 JWT 认证和角色鉴权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::Role;

use crate::AppError;
use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// 公共路由判定（无需认证即可访问）
///
/// - `/api/health` 健康检查
/// - `/api/auth/login`、`/api/auth/register` 登录注册
/// - `GET /api/medicines*` 药品目录公开浏览
fn is_public_route(method: &http::Method, path: &str) -> bool {
    if path == "/api/health" || path == "/api/auth/login" || path == "/api/auth/register" {
        return true;
    }
    method == http::Method::GET && path.starts_with("/api/medicines")
}

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展 (`req.extensions_mut().insert(user)`)。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径
/// - 公共路由（见 [`is_public_route`]）
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 Unauthorized |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过认证 (让它们正常返回 404)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if is_public_route(req.method(), path) {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.get_jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    // 验证令牌
    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// 药房工作人员中间件 - 药剂师或管理员
pub async fn require_pharmacy_staff(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if !user.is_pharmacy_staff() {
        security_log!(
            "WARN",
            "pharmacist_required",
            user_id = user.id.clone(),
            username = user.username.clone(),
            user_role = user.role.to_string()
        );
        return Err(AppError::new(shared::ErrorCode::PharmacistRequired));
    }

    Ok(next.run(req).await)
}

/// 配送员中间件
pub async fn require_delivery_agent(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if user.role != Role::DeliveryAgent {
        security_log!(
            "WARN",
            "delivery_agent_required",
            user_id = user.id.clone(),
            username = user.username.clone(),
            user_role = user.role.to_string()
        );
        return Err(AppError::with_message(
            shared::ErrorCode::RoleRequired,
            "Access restricted to delivery agents",
        ));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_routes() {
        assert!(is_public_route(&http::Method::GET, "/api/health"));
        assert!(is_public_route(&http::Method::POST, "/api/auth/login"));
        assert!(is_public_route(&http::Method::GET, "/api/medicines"));
        assert!(is_public_route(&http::Method::GET, "/api/medicines/abc"));
        assert!(!is_public_route(&http::Method::POST, "/api/medicines"));
        assert!(!is_public_route(&http::Method::GET, "/api/orders"));
    }
}
