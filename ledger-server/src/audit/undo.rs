//! 撤销调度
//!
//! 一次撤销在单个事务内完成：
//! 1. 条件更新抢占原记录 (`is_undone = 0 → 1`)，失败即冲突，保证恰好一次
//! 2. 通过注册表按动作类型执行反向操作
//! 3. 追加一条 `undo` 记录 (before/after 与原记录互换)
//!
//! 任一步失败整个事务回滚，原记录保持未撤销。

use std::sync::Arc;

use shared::error::ErrorCode;
use shared::models::{AuditAction, AuditRecord};
use sqlx::SqlitePool;

use super::registry::UndoRegistry;
use super::types::AuditEntry;
use crate::auth::Actor;
use crate::db::repository::audit_log;
use crate::utils::validation::validate_id;
use crate::utils::{LedgerError, LedgerResult};

/// 撤销结果
#[derive(Debug, Clone)]
pub struct UndoOutcome {
    /// 新追加的 undo 记录
    pub undo_record: AuditRecord,
    /// 撤销 delete 时新插入实体的 id
    pub recreated_id: Option<i64>,
    /// 反向操作是否找到了目标实体 (create/update 的目标已被删除时为 false)
    pub entity_existed: bool,
}

#[derive(Clone)]
pub struct UndoDispatcher {
    pool: SqlitePool,
    registry: Arc<UndoRegistry>,
}

impl UndoDispatcher {
    pub fn new(pool: SqlitePool, registry: Arc<UndoRegistry>) -> Self {
        Self { pool, registry }
    }

    pub fn registry(&self) -> &UndoRegistry {
        &self.registry
    }

    pub async fn undo(&self, record_id: i64, actor: &Actor, now: i64) -> LedgerResult<UndoOutcome> {
        validate_id(record_id, "record_id")?;

        let mut tx = self.pool.begin().await?;

        // 先写后读：抢占成功前不读取原记录，避免并发撤销读到同一快照
        let claimed =
            audit_log::claim_for_undo(&mut tx, record_id, actor.id, &actor.name, now).await?;
        let record = audit_log::find_by_id(&mut *tx, record_id)
            .await?
            .ok_or_else(|| {
                LedgerError::NotFound(
                    ErrorCode::AuditRecordNotFound,
                    format!("Audit record {record_id} not found"),
                )
            })?;
        actor.ensure_can_act_on(record.branch_id)?;

        if !claimed {
            return Err(rejection(&record));
        }

        let handler = self.registry.get(&record.entity_type).ok_or_else(|| {
            LedgerError::Unsupported(
                ErrorCode::UndoNotSupported,
                format!("Entity type '{}' has no undo mapping", record.entity_type),
            )
        })?;

        let (entity_existed, recreated_id) = match record.action {
            AuditAction::Create => (handler.delete_by_id(&mut tx, record.entity_id).await?, None),
            AuditAction::Update => {
                let before = record.before().ok_or_else(|| missing_snapshot(&record, "before"))?;
                let restored = handler
                    .restore_fields(&mut tx, record.entity_id, &before, now)
                    .await?;
                (restored, None)
            }
            AuditAction::Delete => {
                // delete 记录的实体状态在 before 中；若调用方提供了 after 则优先使用
                let snapshot = record
                    .after()
                    .or_else(|| record.before())
                    .ok_or_else(|| missing_snapshot(&record, "after"))?;
                let new_id = handler.recreate(&mut tx, &snapshot, now).await?;
                (true, Some(new_id))
            }
            AuditAction::Undo => return Err(rejection(&record)),
        };

        let mut entry = AuditEntry::new(
            actor,
            record.branch_id,
            record.entity_type.clone(),
            recreated_id.unwrap_or(record.entity_id),
            AuditAction::Undo,
            now,
        )
        .describe(format!(
            "Undo {} #{}: {}",
            record.action, record.id, record.description
        ))
        .reverting(record.id);
        entry.before = record.after();
        entry.after = record.before();

        let undo_record = audit_log::insert(&mut *tx, &entry).await?;
        tx.commit().await?;

        tracing::info!(
            record_id,
            undo_record_id = undo_record.id,
            entity_type = %record.entity_type,
            entity_id = record.entity_id,
            action = %record.action,
            actor_id = actor.id,
            entity_existed,
            "Audit record undone"
        );
        if !entity_existed {
            tracing::warn!(
                record_id,
                entity_type = %record.entity_type,
                entity_id = record.entity_id,
                "Undo target no longer exists, reversal was a no-op"
            );
        }

        Ok(UndoOutcome {
            undo_record,
            recreated_id,
            entity_existed,
        })
    }
}

/// 抢占失败的原因
fn rejection(record: &AuditRecord) -> LedgerError {
    if !record.action.is_reversible() {
        LedgerError::Unsupported(
            ErrorCode::UndoNotSupported,
            format!("Audit record {} is an undo and cannot be reversed", record.id),
        )
    } else {
        LedgerError::Conflict(
            ErrorCode::AlreadyUndone,
            format!("Audit record {} has already been undone", record.id),
        )
    }
}

fn missing_snapshot(record: &AuditRecord, which: &str) -> LedgerError {
    LedgerError::Validation(
        ErrorCode::SnapshotInvalid,
        format!("Audit record {} has no {which} snapshot", record.id),
    )
}
