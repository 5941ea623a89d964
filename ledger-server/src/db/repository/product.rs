//! Product Repository

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCreate};
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, unit, stock_code, is_center_product, created_at";

/// All products ordered by name
pub async fn find_all<'e>(exec: impl SqliteExecutor<'e>) -> RepoResult<Vec<Product>> {
    let sql = format!("SELECT {COLUMNS} FROM product ORDER BY name, id");
    let products = sqlx::query_as::<_, Product>(&sql).fetch_all(exec).await?;
    Ok(products)
}

/// Products supplied by the central kitchen, ordered by name
pub async fn find_center_products<'e>(exec: impl SqliteExecutor<'e>) -> RepoResult<Vec<Product>> {
    let sql =
        format!("SELECT {COLUMNS} FROM product WHERE is_center_product = 1 ORDER BY name, id");
    let products = sqlx::query_as::<_, Product>(&sql).fetch_all(exec).await?;
    Ok(products)
}

pub async fn find_by_id<'e>(exec: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Product>> {
    let sql = format!("SELECT {COLUMNS} FROM product WHERE id = ?");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(product)
}

pub async fn create(pool: &SqlitePool, data: ProductCreate, now: i64) -> RepoResult<Product> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO product (name, unit, stock_code, is_center_product, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.unit)
    .bind(&data.stock_code)
    .bind(data.is_center_product)
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}
