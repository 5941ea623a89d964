//! 审计日志类型定义

use serde::Serialize;
use serde_json::Value;
use shared::models::AuditAction;
use sqlx::SqliteConnection;

use crate::auth::Actor;

/// 审计写入模式
///
/// - `BestEffort`: 实体已提交后单独写入，失败只记录 warn，不影响业务操作
/// - `MustCommitWithEntity`: 在调用方事务内写入，失败则整个操作回滚
///   (影响库存的操作必须使用此模式，派生引擎依赖审计记录判断撤销状态)
pub enum WriteMode<'c> {
    BestEffort,
    MustCommitWithEntity(&'c mut SqliteConnection),
}

/// 待写入的审计条目
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub created_at: i64,
    pub branch_id: Option<i64>,
    pub actor_id: i64,
    pub actor_name: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub action: AuditAction,
    pub description: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
    pub undo_of: Option<i64>,
}

impl AuditEntry {
    pub fn new(
        actor: &Actor,
        branch_id: Option<i64>,
        entity_type: impl Into<String>,
        entity_id: i64,
        action: AuditAction,
        now: i64,
    ) -> Self {
        Self {
            created_at: now,
            branch_id,
            actor_id: actor.id,
            actor_name: actor.name.clone(),
            entity_type: entity_type.into(),
            entity_id,
            action,
            description: String::new(),
            before: None,
            after: None,
            undo_of: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 序列化实体作为 before 快照
    pub fn with_before<T: Serialize>(mut self, value: &T) -> Self {
        self.before = Some(snapshot(value));
        self
    }

    /// 序列化实体作为 after 快照
    pub fn with_after<T: Serialize>(mut self, value: &T) -> Self {
        self.after = Some(snapshot(value));
        self
    }

    /// 撤销记录: 指向被撤销的原记录
    pub fn reverting(mut self, record_id: i64) -> Self {
        self.undo_of = Some(record_id);
        self
    }
}

/// 序列化快照；失败时记录 JSON null，不阻塞业务写入
pub fn snapshot<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to serialize audit snapshot, storing null");
        Value::Null
    })
}

/// 快照的存储文本；缺失时为 NULL
pub fn snapshot_text(value: &Option<Value>) -> Option<String> {
    value.as_ref().map(Value::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use std::collections::HashMap;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("boom"))
        }
    }

    #[test]
    fn test_entry_builder() {
        let actor = Actor::new(3, "Ayse", Role::BranchAdmin, Some(2));
        let mut before = HashMap::new();
        before.insert("amount", 10.0);
        let entry = AuditEntry::new(&actor, Some(2), "expense", 11, AuditAction::Update, 1_000)
            .describe("Expense updated")
            .with_before(&before);

        assert_eq!(entry.actor_id, 3);
        assert_eq!(entry.actor_name, "Ayse");
        assert_eq!(entry.before.as_ref().unwrap()["amount"], 10.0);
        assert!(entry.after.is_none());
        assert_eq!(snapshot_text(&entry.after), None);
    }

    #[test]
    fn test_failed_snapshot_is_null() {
        assert_eq!(snapshot(&Unserializable), Value::Null);
        assert_eq!(snapshot_text(&Some(Value::Null)).as_deref(), Some("null"));
    }
}
