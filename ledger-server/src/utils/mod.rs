//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`LedgerError`] - 账本核心错误类型
//! - 日志初始化、业务时区换算、输入校验

pub mod error;
pub mod logger;
pub mod time;
pub mod validation;

pub use error::{LedgerError, LedgerResult};
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
