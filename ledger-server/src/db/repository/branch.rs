//! Branch Repository

use super::{RepoError, RepoResult};
use shared::models::{Branch, BranchCreate};
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, address, phone, created_at";

pub async fn find_by_id<'e>(exec: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Branch>> {
    let sql = format!("SELECT {COLUMNS} FROM branch WHERE id = ?");
    let branch = sqlx::query_as::<_, Branch>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(branch)
}

pub async fn create(pool: &SqlitePool, data: BranchCreate, now: i64) -> RepoResult<Branch> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO branch (name, address, phone, created_at) VALUES (?1, ?2, ?3, ?4) \
         RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.address)
    .bind(&data.phone)
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create branch".into()))
}
