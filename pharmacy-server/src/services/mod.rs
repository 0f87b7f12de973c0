//! 服务层 - 通知与处方图片存储

pub mod notifications;
pub mod storage;

pub use notifications::{LogNotifier, Notifier, NotifyError, dispatch_status_update, order_status_message};
pub use storage::{MAX_UPLOAD_BYTES, NoopExtractor, PrescriptionStore, TextExtractor};
