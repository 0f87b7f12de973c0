//! Pharmacy Server - 多角色药房订购平台服务端
//!
//! # 架构概述
//!
//! 本模块是服务端主入口，提供以下核心功能：
//!
//! - **认证** (`auth`): JWT + Argon2 认证体系，闭合角色枚举鉴权
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储（目录、订单、处方、库存、账单）
//! - **订单生命周期** (`db/repository/order`): 库存预留、处方校验、OTP 交付
//! - **HTTP API** (`api`): RESTful API 接口
//! - **服务** (`services`): 短信通知、处方图片存储与文字提取
//!
//! # 模块结构
//!
//! ```text
//! pharmacy-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、角色中间件
//! ├── db/            # 数据库层（模型 + 仓储）
//! ├── services/      # 通知、处方存储
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use shared::{AppError, AppResult, ErrorCode, Role};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境：加载 .env、初始化日志
///
/// 日志目录存在时输出到按天滚动的文件，否则输出到终端。
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    // .env 不存在不算错误
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();

    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ___  __
  / _ \/ /  ___ ________ _  ___ _______ __
 / ___/ _ \/ _ `/ __/  ' \/ _ `/ __/ // /
/_/  /_//_/\_,_/_/ /_/_/_/\_,_/\__/\_, /
                                  /___/
    "#
    );
}
