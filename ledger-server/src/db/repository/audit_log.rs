//! Audit Log Repository

use super::{RepoError, RepoResult};
use crate::audit::types::{AuditEntry, snapshot_text};
use shared::models::{AuditQuery, AuditRecord};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, created_at, branch_id, actor_id, actor_name, entity_type, entity_id, \
                       action, description, before_data, after_data, is_undone, undone_by_id, \
                       undone_by_name, undone_at, undo_of";

/// Append one record
pub async fn insert<'e>(
    exec: impl SqliteExecutor<'e>,
    entry: &AuditEntry,
) -> RepoResult<AuditRecord> {
    let sql = format!(
        "INSERT INTO audit_log \
         (created_at, branch_id, actor_id, actor_name, entity_type, entity_id, action, \
         description, before_data, after_data, undo_of) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) RETURNING {COLUMNS}"
    );
    let record = sqlx::query_as::<_, AuditRecord>(&sql)
        .bind(entry.created_at)
        .bind(entry.branch_id)
        .bind(entry.actor_id)
        .bind(&entry.actor_name)
        .bind(&entry.entity_type)
        .bind(entry.entity_id)
        .bind(entry.action)
        .bind(&entry.description)
        .bind(snapshot_text(&entry.before))
        .bind(snapshot_text(&entry.after))
        .bind(entry.undo_of)
        .fetch_one(exec)
        .await?;
    Ok(record)
}

pub async fn find_by_id<'e>(
    exec: impl SqliteExecutor<'e>,
    id: i64,
) -> RepoResult<Option<AuditRecord>> {
    let sql = format!("SELECT {COLUMNS} FROM audit_log WHERE id = ?");
    let record = sqlx::query_as::<_, AuditRecord>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(record)
}

/// Latest creation record of an entity
pub async fn find_creation<'e>(
    exec: impl SqliteExecutor<'e>,
    entity_type: &str,
    entity_id: i64,
) -> RepoResult<Option<AuditRecord>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM audit_log \
         WHERE entity_type = ? AND entity_id = ? AND action = 'create' ORDER BY id DESC LIMIT 1"
    );
    let record = sqlx::query_as::<_, AuditRecord>(&sql)
        .bind(entity_type)
        .bind(entity_id)
        .fetch_optional(exec)
        .await?;
    Ok(record)
}

/// Atomically flip `is_undone` false → true
///
/// Returns false when the record does not exist, is already undone, or is
/// itself an undo record. Only one caller can ever observe `true`.
pub async fn claim_for_undo(
    conn: &mut SqliteConnection,
    id: i64,
    undone_by_id: i64,
    undone_by_name: &str,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE audit_log \
         SET is_undone = 1, undone_by_id = ?1, undone_by_name = ?2, undone_at = ?3 \
         WHERE id = ?4 AND is_undone = 0 AND action <> 'undo'",
    )
    .bind(undone_by_id)
    .bind(undone_by_name)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() == 1)
}

fn push_filters<'a>(qb: &mut QueryBuilder<'a, Sqlite>, query: &'a AuditQuery) {
    qb.push(" WHERE 1 = 1");
    if let Some(branch_id) = query.branch_id {
        qb.push(" AND branch_id = ").push_bind(branch_id);
    }
    if let Some(entity_type) = &query.entity_type {
        qb.push(" AND entity_type = ").push_bind(entity_type.as_str());
    }
    if let Some(entity_id) = query.entity_id {
        qb.push(" AND entity_id = ").push_bind(entity_id);
    }
    if let Some(actor_id) = query.actor_id {
        qb.push(" AND actor_id = ").push_bind(actor_id);
    }
    if let Some(action) = query.action {
        qb.push(" AND action = ").push_bind(action);
    }
}

/// Filtered page, newest first, plus the total match count
pub async fn list(pool: &SqlitePool, query: &AuditQuery) -> RepoResult<(Vec<AuditRecord>, i64)> {
    if query.limit <= 0 || query.offset < 0 {
        return Err(RepoError::Validation(format!(
            "Invalid page: limit {} offset {}",
            query.limit, query.offset
        )));
    }

    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM audit_log");
    push_filters(&mut count_qb, query);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM audit_log"));
    push_filters(&mut qb, query);
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(query.limit)
        .push(" OFFSET ")
        .push_bind(query.offset);
    let items = qb.build_query_as::<AuditRecord>().fetch_all(pool).await?;

    Ok((items, total))
}
