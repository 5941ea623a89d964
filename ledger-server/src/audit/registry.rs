//! 撤销处理器注册表
//!
//! 每个可撤销的实体类型注册一个 [`UndoHandler`]，提供三种映射：
//! 按 id 删除、按固定字段子集恢复、按快照重新插入。
//! [`UndoDispatcher`](super::UndoDispatcher) 只依赖此接口，不认识任何具体实体。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::error::ErrorCode;
use sqlx::SqliteConnection;

use crate::utils::{LedgerError, LedgerResult};

/// 单个实体类型的撤销映射
///
/// 所有方法都在撤销事务内执行，不得自行开启新连接。
#[async_trait]
pub trait UndoHandler: Send + Sync {
    /// 审计记录中的实体类型标签
    fn entity_type(&self) -> &'static str;

    /// 撤销 create: 删除实体。实体已不存在时返回 `Ok(false)`
    async fn delete_by_id(&self, conn: &mut SqliteConnection, id: i64) -> LedgerResult<bool>;

    /// 撤销 update: 从 before 快照恢复固定字段子集。实体已不存在时返回 `Ok(false)`
    async fn restore_fields(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        before: &Value,
        now: i64,
    ) -> LedgerResult<bool>;

    /// 撤销 delete: 按快照插入新实体，返回新 id (不复用原 id)
    async fn recreate(
        &self,
        conn: &mut SqliteConnection,
        snapshot: &Value,
        now: i64,
    ) -> LedgerResult<i64>;
}

/// 实体类型标签 → 处理器
#[derive(Default)]
pub struct UndoRegistry {
    handlers: HashMap<&'static str, Arc<dyn UndoHandler>>,
}

impl UndoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册处理器，同一标签重复注册返回 Conflict
    pub fn register(&mut self, handler: Arc<dyn UndoHandler>) -> LedgerResult<()> {
        let tag = handler.entity_type();
        if self.handlers.contains_key(tag) {
            return Err(LedgerError::Conflict(
                ErrorCode::AlreadyExists,
                format!("Undo handler for '{tag}' is already registered"),
            ));
        }
        self.handlers.insert(tag, handler);
        tracing::debug!(entity_type = tag, "Undo handler registered");
        Ok(())
    }

    pub fn get(&self, entity_type: &str) -> Option<Arc<dyn UndoHandler>> {
        self.handlers.get(entity_type).cloned()
    }

    pub fn contains(&self, entity_type: &str) -> bool {
        self.handlers.contains_key(entity_type)
    }

    /// 已注册的标签 (排序)
    pub fn entity_types(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.handlers.keys().copied().collect();
        tags.sort_unstable();
        tags
    }
}

/// 把快照解码为处理器自己的字段结构，多余字段忽略
pub fn decode_snapshot<T: DeserializeOwned>(
    entity_type: &str,
    snapshot: &Value,
) -> LedgerResult<T> {
    serde_json::from_value(snapshot.clone()).map_err(|e| {
        LedgerError::Validation(
            ErrorCode::SnapshotInvalid,
            format!("Snapshot of '{entity_type}' cannot be applied: {e}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    struct NoopHandler(&'static str);

    #[async_trait]
    impl UndoHandler for NoopHandler {
        fn entity_type(&self) -> &'static str {
            self.0
        }

        async fn delete_by_id(&self, _: &mut SqliteConnection, _: i64) -> LedgerResult<bool> {
            Ok(true)
        }

        async fn restore_fields(
            &self,
            _: &mut SqliteConnection,
            _: i64,
            _: &Value,
            _: i64,
        ) -> LedgerResult<bool> {
            Ok(true)
        }

        async fn recreate(&self, _: &mut SqliteConnection, _: &Value, _: i64) -> LedgerResult<i64> {
            Ok(1)
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = UndoRegistry::new();
        registry.register(Arc::new(NoopHandler("waste_entry"))).unwrap();
        registry.register(Arc::new(NoopHandler("expense"))).unwrap();

        assert!(registry.contains("expense"));
        assert!(registry.get("bank_account").is_none());
        assert_eq!(registry.entity_types(), vec!["expense", "waste_entry"]);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = UndoRegistry::new();
        registry.register(Arc::new(NoopHandler("expense"))).unwrap();
        assert!(matches!(
            registry.register(Arc::new(NoopHandler("expense"))),
            Err(LedgerError::Conflict(ErrorCode::AlreadyExists, _))
        ));
    }

    #[test]
    fn test_decode_snapshot_ignores_extra_fields() {
        #[derive(Debug, Deserialize)]
        struct Fields {
            amount: f64,
        }

        let fields: Fields =
            decode_snapshot("expense", &json!({ "id": 3, "amount": 9.5, "extra": true })).unwrap();
        assert_eq!(fields.amount, 9.5);

        let err = decode_snapshot::<Fields>("expense", &json!({ "id": 3 })).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(ErrorCode::SnapshotInvalid, _)));
    }
}
