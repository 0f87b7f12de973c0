use thiserror::Error;

/// 服务器启动/运行期错误
///
/// 请求处理期间的错误统一使用 [`crate::utils::AppError`]；
/// 本类型只用于 `Server::run()` 的启动路径。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

/// 服务器的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
