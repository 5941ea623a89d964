use std::sync::Arc;

use chrono_tz::Tz;
use sqlx::SqlitePool;

use crate::audit::{AuditJournal, UndoDispatcher, UndoRegistry};
use crate::core::Config;
use crate::db::DbService;
use crate::finance::{self, FinanceService};
use crate::inventory::{self, MovementRecorder, StockDerivationEngine};
use crate::utils::LedgerResult;

/// 账本状态 - 持有所有服务
///
/// | 字段 | 说明 |
/// |------|------|
/// | db | SQLite 连接池 |
/// | journal | 审计日志 |
/// | undo | 撤销调度 (持有注册表) |
/// | recorder | 库存变动记录 |
/// | engine | 库存派生引擎 |
/// | finance | 支出 / 收银流水 |
///
/// 所有字段都是浅拷贝，可以自由 clone 到各个任务中。
#[derive(Clone)]
pub struct LedgerState {
    pub db: DbService,
    pub journal: AuditJournal,
    pub undo: UndoDispatcher,
    pub recorder: MovementRecorder,
    pub engine: StockDerivationEngine,
    pub finance: FinanceService,
}

impl LedgerState {
    /// 打开数据库、执行迁移并组装各服务
    pub async fn initialize(config: &Config) -> LedgerResult<Self> {
        let db = DbService::new(
            &config.database_path,
            config.db_max_connections,
            config.db_busy_timeout_ms,
        )
        .await?;
        Self::from_db(db, config.business_timezone)
    }

    /// 使用已打开的数据库组装服务
    pub fn from_db(db: DbService, tz: Tz) -> LedgerResult<Self> {
        let mut registry = UndoRegistry::new();
        inventory::register_undo_handlers(&mut registry)?;
        finance::register_undo_handlers(&mut registry)?;
        tracing::info!(entity_types = ?registry.entity_types(), "Undo registry ready");

        let pool = db.pool.clone();
        let journal = AuditJournal::new(pool.clone());
        Ok(Self {
            undo: UndoDispatcher::new(pool.clone(), Arc::new(registry)),
            recorder: MovementRecorder::new(pool.clone(), journal.clone()),
            engine: StockDerivationEngine::new(pool.clone(), tz),
            finance: FinanceService::new(pool, journal.clone()),
            journal,
            db,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }
}
