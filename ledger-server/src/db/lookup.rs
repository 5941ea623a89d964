//! 引用实体存在性检查
//!
//! 写入前确认分店、商品存在，返回带具体错误码的 NotFound，
//! 而不是等外键约束失败后得到笼统的校验错误。

use shared::error::ErrorCode;
use shared::models::{Branch, Product};
use sqlx::SqlitePool;

use super::repository::{branch, product};
use crate::utils::validation::validate_id;
use crate::utils::{LedgerError, LedgerResult};

pub async fn require_branch(pool: &SqlitePool, branch_id: i64) -> LedgerResult<Branch> {
    validate_id(branch_id, "branch_id")?;
    branch::find_by_id(pool, branch_id).await?.ok_or_else(|| {
        LedgerError::NotFound(ErrorCode::BranchNotFound, format!("Branch {branch_id} not found"))
    })
}

pub async fn require_product(pool: &SqlitePool, product_id: i64) -> LedgerResult<Product> {
    validate_id(product_id, "product_id")?;
    product::find_by_id(pool, product_id).await?.ok_or_else(|| {
        LedgerError::NotFound(ErrorCode::ProductNotFound, format!("Product {product_id} not found"))
    })
}
