//! 审计日志与撤销
//!
//! - [`AuditJournal`] 追加写入审计记录并提供查询
//! - [`UndoRegistry`] 实体类型 → 撤销处理器 的注册表
//! - [`UndoDispatcher`] 按动作类型执行撤销 (单事务、恰好一次)

pub mod journal;
pub mod registry;
pub mod types;
pub mod undo;

pub use journal::AuditJournal;
pub use registry::{UndoHandler, UndoRegistry, decode_snapshot};
pub use types::{AuditEntry, WriteMode};
pub use undo::{UndoDispatcher, UndoOutcome};
