//! 财务模块 (支出、收银流水)
//!
//! 非库存路径：实体先提交，审计随后以 `BestEffort` 写入，
//! 审计失败只记录日志，不影响已提交的业务数据。

pub mod handlers;
pub mod service;

use std::sync::Arc;

pub use service::FinanceService;

use crate::audit::UndoRegistry;
use crate::utils::LedgerResult;

/// 注册财务实体的撤销处理器
pub fn register_undo_handlers(registry: &mut UndoRegistry) -> LedgerResult<()> {
    registry.register(Arc::new(handlers::ExpenseUndo))?;
    registry.register(Arc::new(handlers::CashMovementUndo))?;
    Ok(())
}
