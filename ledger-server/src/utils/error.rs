//! 账本错误类型
//!
//! 核心操作统一返回 [`LedgerError`]，分类固定为：
//!
//! | 变体 | 说明 |
//! |------|------|
//! | NotFound | 审计记录 / 实体 / 分店 / 商品不存在 |
//! | Conflict | 重复撤销、重复入库、月结已存在 |
//! | Forbidden | 操作者的分店范围不包含目标记录 |
//! | Unsupported | 无法撤销的动作或未注册的实体类型 |
//! | Validation | 输入格式或取值非法 |
//! | Persistence | 存储层故障 |
//!
//! 每个变体携带一个 [`ErrorCode`]，在客户端边界转换为 [`AppError`]。

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::db::repository::RepoError;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{1}")]
    NotFound(ErrorCode, String),

    #[error("{1}")]
    Conflict(ErrorCode, String),

    #[error("{1}")]
    Forbidden(ErrorCode, String),

    #[error("{1}")]
    Unsupported(ErrorCode, String),

    #[error("{1}")]
    Validation(ErrorCode, String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(ErrorCode::ValidationFailed, msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(ErrorCode::BranchScopeDenied, msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// 错误码
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(code, _)
            | Self::Conflict(code, _)
            | Self::Forbidden(code, _)
            | Self::Unsupported(code, _)
            | Self::Validation(code, _) => *code,
            Self::Persistence(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<RepoError> for LedgerError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => Self::NotFound(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => Self::Conflict(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => Self::Validation(ErrorCode::ValidationFailed, msg),
            RepoError::Database(msg) => Self::Persistence(msg),
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::from(err).into()
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let code = err.code();
        match err {
            LedgerError::Persistence(msg) => {
                tracing::error!(error = %msg, "Ledger persistence error");
                AppError::new(code)
            }
            other => AppError::with_message(code, other.to_string()),
        }
    }
}

/// 账本操作的 Result 类型别名
pub type LedgerResult<T> = Result<T, LedgerError>;
