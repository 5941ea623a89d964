//! 财务实体的撤销映射

use async_trait::async_trait;
use serde_json::Value;
use shared::models::{CashMovement, Expense};
use sqlx::SqliteConnection;

use crate::audit::{UndoHandler, decode_snapshot};
use crate::db::repository::cash_movement::{self, CashMovementFields};
use crate::db::repository::expense::{self, ExpenseFields};
use crate::utils::LedgerResult;

pub const EXPENSE: &str = "expense";
pub const CASH_MOVEMENT: &str = "cash_movement";

pub struct ExpenseUndo;

#[async_trait]
impl UndoHandler for ExpenseUndo {
    fn entity_type(&self) -> &'static str {
        EXPENSE
    }

    async fn delete_by_id(&self, conn: &mut SqliteConnection, id: i64) -> LedgerResult<bool> {
        Ok(expense::delete(&mut *conn, id).await?)
    }

    async fn restore_fields(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        before: &Value,
        now: i64,
    ) -> LedgerResult<bool> {
        let fields: ExpenseFields = decode_snapshot(EXPENSE, before)?;
        Ok(expense::update(&mut *conn, id, &fields, now).await?)
    }

    async fn recreate(
        &self,
        conn: &mut SqliteConnection,
        snapshot: &Value,
        now: i64,
    ) -> LedgerResult<i64> {
        let row: Expense = decode_snapshot(EXPENSE, snapshot)?;
        Ok(expense::recreate(&mut *conn, &row, now).await?)
    }
}

pub struct CashMovementUndo;

#[async_trait]
impl UndoHandler for CashMovementUndo {
    fn entity_type(&self) -> &'static str {
        CASH_MOVEMENT
    }

    async fn delete_by_id(&self, conn: &mut SqliteConnection, id: i64) -> LedgerResult<bool> {
        Ok(cash_movement::delete(&mut *conn, id).await?)
    }

    async fn restore_fields(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        before: &Value,
        now: i64,
    ) -> LedgerResult<bool> {
        let fields: CashMovementFields = decode_snapshot(CASH_MOVEMENT, before)?;
        Ok(cash_movement::update(&mut *conn, id, &fields, now).await?)
    }

    async fn recreate(
        &self,
        conn: &mut SqliteConnection,
        snapshot: &Value,
        now: i64,
    ) -> LedgerResult<i64> {
        let row: CashMovement = decode_snapshot(CASH_MOVEMENT, snapshot)?;
        Ok(cash_movement::recreate(&mut *conn, &row, now).await?)
    }
}
