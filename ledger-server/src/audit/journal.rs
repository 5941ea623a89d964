//! 审计日志服务
//!
//! `AuditJournal` 只负责写入与查询，从不解释快照内容。

use shared::error::ErrorCode;
use shared::models::{AuditListResponse, AuditQuery, AuditRecord};
use sqlx::SqlitePool;

use super::types::{AuditEntry, WriteMode};
use crate::auth::Actor;
use crate::db::repository::audit_log;
use crate::utils::validation::validate_id;
use crate::utils::{LedgerError, LedgerResult};

#[derive(Clone)]
pub struct AuditJournal {
    pool: SqlitePool,
}

impl AuditJournal {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 写入一条审计记录
    ///
    /// `BestEffort` 从不返回错误 (失败时返回 `Ok(None)` 并记录 warn)；
    /// `MustCommitWithEntity` 在调用方事务内写入并传播错误。
    pub async fn record(
        &self,
        entry: AuditEntry,
        mode: WriteMode<'_>,
    ) -> LedgerResult<Option<AuditRecord>> {
        match mode {
            WriteMode::BestEffort => match audit_log::insert(&self.pool, &entry).await {
                Ok(record) => Ok(Some(record)),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        entity_type = %entry.entity_type,
                        entity_id = entry.entity_id,
                        action = %entry.action,
                        "Audit write failed, business operation kept"
                    );
                    Ok(None)
                }
            },
            WriteMode::MustCommitWithEntity(conn) => {
                let record = audit_log::insert(&mut *conn, &entry).await?;
                Ok(Some(record))
            }
        }
    }

    pub async fn find(&self, id: i64) -> LedgerResult<AuditRecord> {
        validate_id(id, "record_id")?;
        audit_log::find_by_id(&self.pool, id).await?.ok_or_else(|| {
            LedgerError::NotFound(
                ErrorCode::AuditRecordNotFound,
                format!("Audit record {id} not found"),
            )
        })
    }

    pub async fn is_undone(&self, id: i64) -> LedgerResult<bool> {
        Ok(self.find(id).await?.is_undone)
    }

    /// 实体的创建记录 (派生引擎据此判断是否已被撤销)
    pub async fn creation_record(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> LedgerResult<Option<AuditRecord>> {
        Ok(audit_log::find_creation(&self.pool, entity_type, entity_id).await?)
    }

    /// 活动列表，最新在前
    ///
    /// 分店管理员只能看到本分店的记录，传入的 branch 过滤条件会被覆盖。
    pub async fn list(
        &self,
        actor: &Actor,
        mut query: AuditQuery,
    ) -> LedgerResult<AuditListResponse> {
        if !actor.is_super_admin() {
            query.branch_id = Some(actor.resolve_branch(query.branch_id)?);
        }
        let (items, total) = audit_log::list(&self.pool, &query).await?;
        Ok(AuditListResponse { items, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use serde_json::json;
    use shared::models::AuditAction;

    async fn journal() -> AuditJournal {
        let db = DbService::in_memory().await.unwrap();
        AuditJournal::new(db.pool)
    }

    fn entry(actor: &Actor, branch: i64, entity_id: i64, now: i64) -> AuditEntry {
        AuditEntry::new(actor, Some(branch), "expense", entity_id, AuditAction::Create, now)
            .describe(format!("Expense {entity_id} created"))
            .with_after(&json!({ "id": entity_id, "amount": 10.0 }))
    }

    #[tokio::test]
    async fn test_record_best_effort_and_find() {
        let journal = journal().await;
        let actor = Actor::super_admin(1, "admin");

        let record = journal
            .record(entry(&actor, 1, 42, 1_000), WriteMode::BestEffort)
            .await
            .unwrap()
            .unwrap();

        let found = journal.find(record.id).await.unwrap();
        assert_eq!(found.entity_id, 42);
        assert_eq!(found.action, AuditAction::Create);
        assert_eq!(found.actor_name, "admin");
        assert!(found.before_data.is_none());
        assert_eq!(found.after().unwrap()["amount"], 10.0);
        assert!(!journal.is_undone(record.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_must_commit_rolls_back_with_entity() {
        let journal = journal().await;
        let actor = Actor::super_admin(1, "admin");

        let mut tx = journal.pool.begin().await.unwrap();
        let record = journal
            .record(entry(&actor, 1, 7, 1_000), WriteMode::MustCommitWithEntity(&mut *tx))
            .await
            .unwrap()
            .unwrap();
        tx.rollback().await.unwrap();

        assert!(matches!(
            journal.find(record.id).await,
            Err(LedgerError::NotFound(ErrorCode::AuditRecordNotFound, _))
        ));
    }

    #[tokio::test]
    async fn test_best_effort_swallows_failures() {
        let journal = journal().await;
        let actor = Actor::super_admin(1, "admin");
        sqlx::query("DROP TABLE audit_log")
            .execute(&journal.pool)
            .await
            .unwrap();

        let result = journal
            .record(entry(&actor, 1, 1, 1_000), WriteMode::BestEffort)
            .await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_list_filters_and_order() {
        let journal = journal().await;
        let admin = Actor::super_admin(1, "admin");
        for (i, branch) in [1, 2, 1, 1].into_iter().enumerate() {
            let id = i as i64 + 1;
            journal
                .record(entry(&admin, branch, id, 1_000 + id), WriteMode::BestEffort)
                .await
                .unwrap();
        }

        let page = journal
            .list(&admin, AuditQuery { branch_id: Some(1), limit: 2, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].entity_id, 4);
        assert_eq!(page.items[1].entity_id, 3);

        // 分店管理员被限制在本分店
        let manager = Actor::branch_admin(9, "manager", 2);
        let page = journal
            .list(&manager, AuditQuery { limit: 50, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].branch_id, Some(2));
        assert!(journal
            .list(&manager, AuditQuery { branch_id: Some(1), limit: 50, ..Default::default() })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_creation_record_lookup() {
        let journal = journal().await;
        let admin = Actor::super_admin(1, "admin");
        journal
            .record(entry(&admin, 1, 5, 1_000), WriteMode::BestEffort)
            .await
            .unwrap();

        let found = journal.creation_record("expense", 5).await.unwrap().unwrap();
        assert_eq!(found.entity_id, 5);
        assert!(journal.creation_record("expense", 6).await.unwrap().is_none());
        assert!(journal.creation_record("cash_movement", 5).await.unwrap().is_none());
    }
}
