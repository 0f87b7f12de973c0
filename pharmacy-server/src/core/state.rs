use std::path::PathBuf;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::UserRepository;
use crate::services::{LogNotifier, NoopExtractor, Notifier, PrescriptionStore, TextExtractor};

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是药房服务端的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | notifier | Arc<dyn Notifier> | 订单通知服务 |
/// | prescriptions | PrescriptionStore | 处方图片存储 |
/// | text_extractor | Arc<dyn TextExtractor> | 处方 OCR 后端 |
///
/// # 使用示例
///
/// ```ignore
/// // 获取数据库连接
/// let db = state.get_db();
///
/// // 发送订单状态通知 (fire-and-forget)
/// state.notify_order_status(&order, OrderStatus::Verified);
/// ```
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 订单通知服务
    pub notifier: Arc<dyn Notifier>,
    /// 处方图片存储
    pub prescriptions: PrescriptionStore,
    /// 处方 OCR 后端
    pub text_extractor: Arc<dyn TextExtractor>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`initialize()`](Self::initialize) 方法代替
    pub fn new(
        config: Config,
        db: Surreal<Db>,
        jwt_service: Arc<JwtService>,
        notifier: Arc<dyn Notifier>,
        prescriptions: PrescriptionStore,
        text_extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            config,
            db,
            jwt_service,
            notifier,
            prescriptions,
            text_extractor,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保 database/uploads/logs 目录存在)
    /// 2. 数据库 (work_dir/database/pharmacy.db) 并应用 schema
    /// 3. 各服务 (JWT, Notifier, PrescriptionStore)
    /// 4. 种子管理员账号 (不存在时创建)
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Initialize DB
        // Use work_dir/database/pharmacy.db for database path
        let db_dir = config.database_dir();
        let db_path = db_dir.join("pharmacy.db");
        let db_path_str = db_path.to_string_lossy();

        let db_service = DbService::new(&db_path_str)
            .await
            .expect("Failed to initialize database");
        let db = db_service.db;

        // 2. Initialize Services
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier::default());
        let prescriptions = PrescriptionStore::new(config.uploads_dir());
        let text_extractor: Arc<dyn TextExtractor> = Arc::new(NoopExtractor);

        let state = Self::new(
            config.clone(),
            db,
            jwt_service,
            notifier,
            prescriptions,
            text_extractor,
        );

        // 3. Seed admin account if missing
        state
            .seed_admin()
            .await
            .expect("Failed to seed admin account");

        state
    }

    /// 种子管理员账号
    ///
    /// 首次启动时按配置创建管理员；已存在时不做任何修改。
    /// 生产环境必须显式设置 ADMIN_PASSWORD。
    async fn seed_admin(&self) -> Result<(), crate::utils::AppError> {
        let password = match &self.config.admin_password {
            Some(p) => p.clone(),
            None if self.config.is_production() => {
                return Err(crate::utils::AppError::with_message(
                    crate::utils::ErrorCode::ConfigError,
                    "ADMIN_PASSWORD must be set in production",
                ));
            }
            // Development fallback
            None => "admin123".to_string(),
        };

        let repo = UserRepository::new(self.db.clone());
        let created = repo
            .ensure_admin(&self.config.admin_username, &password)
            .await?;
        if created {
            tracing::info!(
                "Seeded admin account '{}' (change the password after first login)",
                self.config.admin_username
            );
        }
        Ok(())
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 获取通知服务
    pub fn get_notifier(&self) -> Arc<dyn Notifier> {
        self.notifier.clone()
    }

    /// 获取处方图片存储
    pub fn prescription_store(&self) -> &PrescriptionStore {
        &self.prescriptions
    }

    /// 获取处方 OCR 后端
    pub fn get_text_extractor(&self) -> Arc<dyn TextExtractor> {
        self.text_extractor.clone()
    }
}
