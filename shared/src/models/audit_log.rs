//! Audit Log Model (审计日志)
//!
//! Append-only journal of reversible operations. `before_data` /
//! `after_data` hold the JSON snapshot of the entity, stored as text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of operation an audit record documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Undo,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Undo => "undo",
        }
    }

    /// Only create/update/delete records may be reversed
    pub fn is_reversible(&self) -> bool {
        !matches!(self, Self::Undo)
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit record row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AuditRecord {
    pub id: i64,
    pub created_at: i64,
    /// Owning branch, None for cross-branch/system actions
    pub branch_id: Option<i64>,
    pub actor_id: i64,
    /// Denormalized actor display name
    pub actor_name: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub action: AuditAction,
    pub description: String,
    /// JSON snapshot before the operation (None for create)
    pub before_data: Option<String>,
    /// JSON snapshot after the operation (None for delete)
    pub after_data: Option<String>,
    pub is_undone: bool,
    pub undone_by_id: Option<i64>,
    pub undone_by_name: Option<String>,
    pub undone_at: Option<i64>,
    /// For undo records: the record that was reversed
    pub undo_of: Option<i64>,
}

impl AuditRecord {
    /// Parsed `before` snapshot; JSON `null` and unparsable text read as None
    pub fn before(&self) -> Option<Value> {
        parse_snapshot(self.before_data.as_deref())
    }

    /// Parsed `after` snapshot; JSON `null` and unparsable text read as None
    pub fn after(&self) -> Option<Value> {
        parse_snapshot(self.after_data.as_deref())
    }
}

fn parse_snapshot(raw: Option<&str>) -> Option<Value> {
    raw.and_then(|s| serde_json::from_str::<Value>(s).ok())
        .filter(|v| !v.is_null())
}

/// Audit list query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditQuery {
    pub branch_id: Option<i64>,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub actor_id: Option<i64>,
    pub action: Option<AuditAction>,
    /// Pagination offset
    #[serde(default)]
    pub offset: i64,
    /// Page size (default 50)
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            branch_id: None,
            entity_type: None,
            entity_id: None,
            actor_id: None,
            action: None,
            offset: 0,
            limit: default_limit(),
        }
    }
}

/// Audit list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditListResponse {
    pub items: Vec<AuditRecord>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(before: Option<&str>, after: Option<&str>) -> AuditRecord {
        AuditRecord {
            id: 1,
            created_at: 0,
            branch_id: Some(1),
            actor_id: 1,
            actor_name: "admin".into(),
            entity_type: "expense".into(),
            entity_id: 9,
            action: AuditAction::Create,
            description: String::new(),
            before_data: before.map(String::from),
            after_data: after.map(String::from),
            is_undone: false,
            undone_by_id: None,
            undone_by_name: None,
            undone_at: None,
            undo_of: None,
        }
    }

    #[test]
    fn test_snapshot_parsing() {
        let r = record(Some("null"), Some(r#"{"amount":12.5}"#));
        assert!(r.before().is_none());
        assert_eq!(r.after().unwrap()["amount"], 12.5);

        let r = record(None, Some("not json"));
        assert!(r.after().is_none());
    }

    #[test]
    fn test_action_serde() {
        assert_eq!(
            serde_json::to_string(&AuditAction::Undo).unwrap(),
            "\"undo\""
        );
        assert!(AuditAction::Delete.is_reversible());
        assert!(!AuditAction::Undo.is_reversible());
    }

    #[test]
    fn test_query_defaults() {
        let q: AuditQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.limit, 50);
        assert_eq!(q.offset, 0);
        assert_eq!(AuditQuery::default().limit, 50);
    }
}
