//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] / [`ErrorCode`] - 应用错误类型
//! - [`ApiResponse`] - API 响应结构
//! - 日志等工具

pub mod error;
pub mod logger;

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};

/// Current wall-clock time as unix epoch milliseconds
///
/// All persisted timestamps in this codebase are epoch millis (i64).
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
