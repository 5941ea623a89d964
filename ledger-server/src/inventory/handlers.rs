//! 库存实体的撤销映射
//!
//! 每种实体只恢复固定字段子集，避免覆盖其他路径之后修改过的列。
//! 重建时保留快照中的 `created_at` (中央配送以此作为入库时间)，
//! `updated_at` 取撤销时间，id 由数据库重新分配。

use async_trait::async_trait;
use serde_json::Value;
use shared::models::{CenterShipment, Shipment, StockEntry, StockSnapshot, WasteEntry};
use sqlx::SqliteConnection;

use crate::audit::{UndoHandler, decode_snapshot};
use crate::db::repository::center_shipment::{self, CenterShipmentRestore};
use crate::db::repository::shipment::{self, ShipmentRestore};
use crate::db::repository::stock_entry::{self, StockEntryFields};
use crate::db::repository::stock_snapshot::{self, StockSnapshotFields};
use crate::db::repository::waste_entry::{self, WasteEntryRestore};
use crate::utils::LedgerResult;

pub const STOCK_ENTRY: &str = "stock_entry";
pub const CENTER_SHIPMENT: &str = "center_shipment";
pub const SHIPMENT: &str = "shipment";
pub const WASTE_ENTRY: &str = "waste_entry";
pub const STOCK_SNAPSHOT: &str = "stock_snapshot";

pub struct StockEntryUndo;

#[async_trait]
impl UndoHandler for StockEntryUndo {
    fn entity_type(&self) -> &'static str {
        STOCK_ENTRY
    }

    async fn delete_by_id(&self, conn: &mut SqliteConnection, id: i64) -> LedgerResult<bool> {
        Ok(stock_entry::delete(conn, id).await?)
    }

    async fn restore_fields(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        before: &Value,
        now: i64,
    ) -> LedgerResult<bool> {
        let fields: StockEntryFields = decode_snapshot(STOCK_ENTRY, before)?;
        Ok(stock_entry::update(conn, id, &fields, now).await?)
    }

    async fn recreate(
        &self,
        conn: &mut SqliteConnection,
        snapshot: &Value,
        now: i64,
    ) -> LedgerResult<i64> {
        let entry: StockEntry = decode_snapshot(STOCK_ENTRY, snapshot)?;
        Ok(stock_entry::recreate(conn, &entry, now).await?)
    }
}

pub struct CenterShipmentUndo;

#[async_trait]
impl UndoHandler for CenterShipmentUndo {
    fn entity_type(&self) -> &'static str {
        CENTER_SHIPMENT
    }

    async fn delete_by_id(&self, conn: &mut SqliteConnection, id: i64) -> LedgerResult<bool> {
        Ok(center_shipment::delete(conn, id).await?)
    }

    async fn restore_fields(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        before: &Value,
        now: i64,
    ) -> LedgerResult<bool> {
        let fields: CenterShipmentRestore = decode_snapshot(CENTER_SHIPMENT, before)?;
        Ok(center_shipment::restore(conn, id, &fields, now).await?)
    }

    async fn recreate(
        &self,
        conn: &mut SqliteConnection,
        snapshot: &Value,
        now: i64,
    ) -> LedgerResult<i64> {
        let shipment: CenterShipment = decode_snapshot(CENTER_SHIPMENT, snapshot)?;
        Ok(center_shipment::recreate(conn, &shipment, now).await?)
    }
}

/// 到货单：删除时明细随之级联删除；重建只恢复单头，明细不恢复
pub struct ShipmentUndo;

#[async_trait]
impl UndoHandler for ShipmentUndo {
    fn entity_type(&self) -> &'static str {
        SHIPMENT
    }

    async fn delete_by_id(&self, conn: &mut SqliteConnection, id: i64) -> LedgerResult<bool> {
        Ok(shipment::delete(conn, id).await?)
    }

    async fn restore_fields(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        before: &Value,
        now: i64,
    ) -> LedgerResult<bool> {
        let fields: ShipmentRestore = decode_snapshot(SHIPMENT, before)?;
        Ok(shipment::restore(conn, id, &fields, now).await?)
    }

    async fn recreate(
        &self,
        conn: &mut SqliteConnection,
        snapshot: &Value,
        now: i64,
    ) -> LedgerResult<i64> {
        let header: Shipment = decode_snapshot(SHIPMENT, snapshot)?;
        if !header.items.is_empty() {
            tracing::warn!(
                shipment_id = header.id,
                items = header.items.len(),
                "Recreating shipment without its item lines"
            );
        }
        Ok(shipment::recreate(conn, &header, now).await?)
    }
}

pub struct WasteEntryUndo;

#[async_trait]
impl UndoHandler for WasteEntryUndo {
    fn entity_type(&self) -> &'static str {
        WASTE_ENTRY
    }

    async fn delete_by_id(&self, conn: &mut SqliteConnection, id: i64) -> LedgerResult<bool> {
        Ok(waste_entry::delete(conn, id).await?)
    }

    async fn restore_fields(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        before: &Value,
        now: i64,
    ) -> LedgerResult<bool> {
        let fields: WasteEntryRestore = decode_snapshot(WASTE_ENTRY, before)?;
        Ok(waste_entry::restore(conn, id, &fields, now).await?)
    }

    async fn recreate(
        &self,
        conn: &mut SqliteConnection,
        snapshot: &Value,
        now: i64,
    ) -> LedgerResult<i64> {
        let entry: WasteEntry = decode_snapshot(WASTE_ENTRY, snapshot)?;
        Ok(waste_entry::recreate(conn, &entry, now).await?)
    }
}

pub struct StockSnapshotUndo;

#[async_trait]
impl UndoHandler for StockSnapshotUndo {
    fn entity_type(&self) -> &'static str {
        STOCK_SNAPSHOT
    }

    async fn delete_by_id(&self, conn: &mut SqliteConnection, id: i64) -> LedgerResult<bool> {
        Ok(stock_snapshot::delete(conn, id).await?)
    }

    async fn restore_fields(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        before: &Value,
        now: i64,
    ) -> LedgerResult<bool> {
        let fields: StockSnapshotFields = decode_snapshot(STOCK_SNAPSHOT, before)?;
        Ok(stock_snapshot::restore(conn, id, &fields, now).await?)
    }

    async fn recreate(
        &self,
        conn: &mut SqliteConnection,
        snapshot: &Value,
        now: i64,
    ) -> LedgerResult<i64> {
        let row: StockSnapshot = decode_snapshot(STOCK_SNAPSHOT, snapshot)?;
        Ok(stock_snapshot::recreate(conn, &row, now).await?)
    }
}
