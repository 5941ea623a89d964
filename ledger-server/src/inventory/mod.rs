//! 库存模块
//!
//! - [`MovementRecorder`]: 盘点、中央配送、到货单、报损、月初/月末快照的写入
//!   (实体 + 审计同事务)
//! - [`StockDerivationEngine`]: 当前库存、月度用量、两次盘点间用量、快照月报
//! - [`derivation`]: 派生计算纯函数
//! - [`handlers`]: 各库存实体的撤销映射

pub mod derivation;
pub mod engine;
pub mod handlers;
pub mod quantity;
pub mod recorder;

use std::sync::Arc;

pub use engine::StockDerivationEngine;
pub use recorder::MovementRecorder;

use crate::audit::UndoRegistry;
use crate::utils::LedgerResult;

/// 注册库存实体的撤销处理器
pub fn register_undo_handlers(registry: &mut UndoRegistry) -> LedgerResult<()> {
    registry.register(Arc::new(handlers::StockEntryUndo))?;
    registry.register(Arc::new(handlers::CenterShipmentUndo))?;
    registry.register(Arc::new(handlers::ShipmentUndo))?;
    registry.register(Arc::new(handlers::WasteEntryUndo))?;
    registry.register(Arc::new(handlers::StockSnapshotUndo))?;
    Ok(())
}
