//! 库存变动记录器
//!
//! 所有影响库存的写操作 (盘点、中央配送、到货单及其入库、报损) 都在
//! 同一事务内写入实体和审计记录 (`WriteMode::MustCommitWithEntity`)。
//! 派生引擎依赖审计记录判断变动是否已撤销，审计写入失败必须回滚实体写入。
//!
//! 输入校验与引用检查在事务开始前完成；事务内的第一条语句总是写操作。

use rust_decimal::Decimal;
use shared::error::ErrorCode;
use shared::models::{
    AuditAction, CenterShipment, CenterShipmentCreate, Shipment, ShipmentCreate, StockEntry,
    StockEntryCreate, StockEntryUpdate, StockSnapshot, StockSnapshotCreate, WasteEntry,
    WasteEntryCreate,
};
use sqlx::SqlitePool;

use super::handlers::{CENTER_SHIPMENT, SHIPMENT, STOCK_ENTRY, STOCK_SNAPSHOT, WASTE_ENTRY};
use super::quantity::{line_total, money_to_f64, sum};
use crate::audit::{AuditEntry, AuditJournal, WriteMode};
use crate::auth::Actor;
use crate::db::lookup::{require_branch, require_product};
use crate::db::repository::center_shipment::CenterShipmentRow;
use crate::db::repository::shipment::ShipmentItemRow;
use crate::db::repository::stock_entry::StockEntryFields;
use crate::db::repository::stock_snapshot::StockSnapshotFields;
use crate::db::repository::{center_shipment, shipment, stock_entry, stock_snapshot, waste_entry};
use crate::utils::time::parse_date;
use crate::utils::validation::{
    MAX_NOTE_LEN, validate_amount, validate_count_quantity, validate_id, validate_movement_quantity,
    validate_optional_text, validate_price, validate_text_len,
};
use crate::utils::{LedgerError, LedgerResult};

/// Maximum item lines in one shipment
pub const MAX_SHIPMENT_ITEMS: usize = 200;

#[derive(Clone)]
pub struct MovementRecorder {
    pool: SqlitePool,
    journal: AuditJournal,
}

impl MovementRecorder {
    pub fn new(pool: SqlitePool, journal: AuditJournal) -> Self {
        Self { pool, journal }
    }

    /// 记录盘点
    pub async fn record_stock_count(
        &self,
        actor: &Actor,
        data: StockEntryCreate,
        now: i64,
    ) -> LedgerResult<StockEntry> {
        let branch_id = actor.resolve_branch(data.branch_id)?;
        validate_count_quantity(data.quantity, "quantity")?;
        validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;
        let count_date = parse_date(&data.count_date)?.to_string();
        require_branch(&self.pool, branch_id).await?;
        let product = require_product(&self.pool, data.product_id).await?;

        let mut tx = self.pool.begin().await?;
        let entry = stock_entry::insert(
            &mut tx,
            branch_id,
            product.id,
            &count_date,
            data.quantity,
            data.note.as_deref(),
            now,
        )
        .await?;

        let audit = AuditEntry::new(
            actor,
            Some(branch_id),
            STOCK_ENTRY,
            entry.id,
            AuditAction::Create,
            now,
        )
        .describe(format!(
            "Stock count {} {}: {}",
            product.name, product.unit, entry.quantity
        ))
        .with_after(&entry);
        self.journal
            .record(audit, WriteMode::MustCommitWithEntity(&mut *tx))
            .await?;
        tx.commit().await?;

        tracing::info!(
            branch_id,
            product_id = product.id,
            entity_id = entry.id,
            quantity = entry.quantity,
            actor_id = actor.id,
            "Stock count recorded"
        );
        Ok(entry)
    }

    /// 修正盘点的日期或数量
    pub async fn update_stock_count(
        &self,
        actor: &Actor,
        id: i64,
        data: StockEntryUpdate,
        now: i64,
    ) -> LedgerResult<StockEntry> {
        validate_id(id, "stock_entry_id")?;
        let before = stock_entry::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| stock_entry_not_found(id))?;
        actor.ensure_can_act_on(Some(before.branch_id))?;

        let quantity = data.quantity.unwrap_or(before.quantity);
        validate_count_quantity(quantity, "quantity")?;
        let count_date = match &data.count_date {
            Some(date) => parse_date(date)?.to_string(),
            None => before.count_date.clone(),
        };
        let fields = StockEntryFields {
            branch_id: before.branch_id,
            product_id: before.product_id,
            count_date,
            quantity,
        };

        let mut tx = self.pool.begin().await?;
        if !stock_entry::update(&mut tx, id, &fields, now).await? {
            return Err(stock_entry_not_found(id));
        }
        let after = stock_entry::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| stock_entry_not_found(id))?;

        let audit = AuditEntry::new(
            actor,
            Some(after.branch_id),
            STOCK_ENTRY,
            id,
            AuditAction::Update,
            now,
        )
        .describe(format!(
            "Stock count {} corrected: {} -> {}",
            after.count_date, before.quantity, after.quantity
        ))
        .with_before(&before)
        .with_after(&after);
        self.journal
            .record(audit, WriteMode::MustCommitWithEntity(&mut *tx))
            .await?;
        tx.commit().await?;

        tracing::info!(
            branch_id = after.branch_id,
            entity_id = id,
            actor_id = actor.id,
            "Stock count corrected"
        );
        Ok(after)
    }

    pub async fn delete_stock_count(
        &self,
        actor: &Actor,
        id: i64,
        now: i64,
    ) -> LedgerResult<StockEntry> {
        validate_id(id, "stock_entry_id")?;
        let existing = stock_entry::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| stock_entry_not_found(id))?;
        actor.ensure_can_act_on(Some(existing.branch_id))?;

        let mut tx = self.pool.begin().await?;
        if !stock_entry::delete(&mut tx, id).await? {
            return Err(stock_entry_not_found(id));
        }
        let audit = AuditEntry::new(
            actor,
            Some(existing.branch_id),
            STOCK_ENTRY,
            id,
            AuditAction::Delete,
            now,
        )
        .describe(format!("Stock count {} deleted", existing.count_date))
        .with_before(&existing);
        self.journal
            .record(audit, WriteMode::MustCommitWithEntity(&mut *tx))
            .await?;
        tx.commit().await?;

        tracing::info!(
            branch_id = existing.branch_id,
            entity_id = id,
            actor_id = actor.id,
            "Stock count deleted"
        );
        Ok(existing)
    }

    /// 记录中央配送 (记录即入库)
    pub async fn record_center_shipment(
        &self,
        actor: &Actor,
        data: CenterShipmentCreate,
        now: i64,
    ) -> LedgerResult<CenterShipment> {
        let branch_id = actor.resolve_branch(data.branch_id)?;
        validate_movement_quantity(data.quantity, "quantity")?;
        validate_price(data.unit_price, "unit_price")?;
        validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;
        let date = parse_date(&data.date)?.to_string();
        require_branch(&self.pool, branch_id).await?;
        let product = require_product(&self.pool, data.product_id).await?;

        let row = CenterShipmentRow {
            branch_id,
            product_id: product.id,
            date: &date,
            quantity: data.quantity,
            unit_price: data.unit_price,
            total_price: line_total(data.quantity, data.unit_price),
            note: data.note.as_deref(),
        };

        let mut tx = self.pool.begin().await?;
        let shipment = center_shipment::insert(&mut tx, &row, now).await?;

        let audit = AuditEntry::new(
            actor,
            Some(branch_id),
            CENTER_SHIPMENT,
            shipment.id,
            AuditAction::Create,
            now,
        )
        .describe(format!(
            "Center shipment {} {} {}",
            product.name, shipment.quantity, product.unit
        ))
        .with_after(&shipment);
        self.journal
            .record(audit, WriteMode::MustCommitWithEntity(&mut *tx))
            .await?;
        tx.commit().await?;

        tracing::info!(
            branch_id,
            product_id = product.id,
            entity_id = shipment.id,
            quantity = shipment.quantity,
            actor_id = actor.id,
            "Center shipment recorded"
        );
        Ok(shipment)
    }

    pub async fn delete_center_shipment(
        &self,
        actor: &Actor,
        id: i64,
        now: i64,
    ) -> LedgerResult<CenterShipment> {
        validate_id(id, "center_shipment_id")?;
        let existing = center_shipment::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| center_shipment_not_found(id))?;
        actor.ensure_can_act_on(Some(existing.branch_id))?;

        let mut tx = self.pool.begin().await?;
        if !center_shipment::delete(&mut tx, id).await? {
            return Err(center_shipment_not_found(id));
        }
        let audit = AuditEntry::new(
            actor,
            Some(existing.branch_id),
            CENTER_SHIPMENT,
            id,
            AuditAction::Delete,
            now,
        )
        .describe(format!("Center shipment {} deleted", existing.date))
        .with_before(&existing);
        self.journal
            .record(audit, WriteMode::MustCommitWithEntity(&mut *tx))
            .await?;
        tx.commit().await?;

        tracing::info!(
            branch_id = existing.branch_id,
            entity_id = id,
            actor_id = actor.id,
            "Center shipment deleted"
        );
        Ok(existing)
    }

    /// 创建到货单 (待入库状态，不影响库存)
    pub async fn create_shipment(
        &self,
        actor: &Actor,
        data: ShipmentCreate,
        now: i64,
    ) -> LedgerResult<Shipment> {
        let branch_id = actor.resolve_branch(data.branch_id)?;
        if data.items.is_empty() {
            return Err(LedgerError::Validation(
                ErrorCode::ShipmentEmpty,
                "Shipment must have at least one item".into(),
            ));
        }
        if data.items.len() > MAX_SHIPMENT_ITEMS {
            return Err(LedgerError::validation(format!(
                "Shipment has too many items ({}, max {MAX_SHIPMENT_ITEMS})",
                data.items.len()
            )));
        }
        validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;
        let date = parse_date(&data.date)?.to_string();
        require_branch(&self.pool, branch_id).await?;

        let mut rows = Vec::with_capacity(data.items.len());
        for (i, item) in data.items.iter().enumerate() {
            validate_id(item.product_id, &format!("items[{i}].product_id"))?;
            validate_movement_quantity(item.quantity, &format!("items[{i}].quantity"))?;
            validate_amount(item.unit_price, &format!("items[{i}].unit_price"))?;
            require_product(&self.pool, item.product_id).await?;
            rows.push(ShipmentItemRow {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                total_price: line_total(item.quantity, item.unit_price),
            });
        }
        let total: Decimal = sum(rows.iter().map(|r| r.total_price));
        let total_amount = money_to_f64(total);

        let mut tx = self.pool.begin().await?;
        let created = shipment::insert(
            &mut tx,
            branch_id,
            &date,
            data.note.as_deref(),
            total_amount,
            &rows,
            now,
        )
        .await?;

        let audit = AuditEntry::new(
            actor,
            Some(branch_id),
            SHIPMENT,
            created.id,
            AuditAction::Create,
            now,
        )
        .describe(format!(
            "Shipment {} with {} items, total {}",
            created.date,
            created.items.len(),
            created.total_amount
        ))
        .with_after(&created);
        self.journal
            .record(audit, WriteMode::MustCommitWithEntity(&mut *tx))
            .await?;
        tx.commit().await?;

        tracing::info!(
            branch_id,
            entity_id = created.id,
            items = created.items.len(),
            total_amount = created.total_amount,
            actor_id = actor.id,
            "Shipment created (pending)"
        );
        Ok(created)
    }

    /// 到货单入库: pending → booked，从 `now` 起计入库存
    pub async fn book_shipment(
        &self,
        actor: &Actor,
        shipment_id: i64,
        now: i64,
    ) -> LedgerResult<Shipment> {
        validate_id(shipment_id, "shipment_id")?;
        let mut conn = self.pool.acquire().await?;
        let before = shipment::find_with_items(&mut conn, shipment_id)
            .await?
            .ok_or_else(|| shipment_not_found(shipment_id))?;
        drop(conn);

        actor.ensure_can_act_on(Some(before.branch_id))?;
        if before.is_stocked {
            return Err(already_stocked(shipment_id));
        }

        let mut tx = self.pool.begin().await?;
        // 条件更新保证并发入库只有一个成功
        if !shipment::mark_booked(&mut tx, shipment_id, now).await? {
            return Err(already_stocked(shipment_id));
        }
        let after = shipment::find_with_items(&mut tx, shipment_id)
            .await?
            .ok_or_else(|| shipment_not_found(shipment_id))?;

        let audit = AuditEntry::new(
            actor,
            Some(after.branch_id),
            SHIPMENT,
            shipment_id,
            AuditAction::Update,
            now,
        )
        .describe(format!("Shipment {} booked to stock", after.date))
        .with_before(&before)
        .with_after(&after);
        self.journal
            .record(audit, WriteMode::MustCommitWithEntity(&mut *tx))
            .await?;
        tx.commit().await?;

        tracing::info!(
            branch_id = after.branch_id,
            entity_id = shipment_id,
            booked_at = now,
            actor_id = actor.id,
            "Shipment booked to stock"
        );
        Ok(after)
    }

    /// 删除到货单及其明细，before 快照包含明细
    pub async fn delete_shipment(
        &self,
        actor: &Actor,
        id: i64,
        now: i64,
    ) -> LedgerResult<Shipment> {
        validate_id(id, "shipment_id")?;
        let mut conn = self.pool.acquire().await?;
        let existing = shipment::find_with_items(&mut conn, id)
            .await?
            .ok_or_else(|| shipment_not_found(id))?;
        drop(conn);
        actor.ensure_can_act_on(Some(existing.branch_id))?;

        let mut tx = self.pool.begin().await?;
        if !shipment::delete(&mut tx, id).await? {
            return Err(shipment_not_found(id));
        }
        let audit = AuditEntry::new(
            actor,
            Some(existing.branch_id),
            SHIPMENT,
            id,
            AuditAction::Delete,
            now,
        )
        .describe(format!(
            "Shipment {} with {} items deleted",
            existing.date,
            existing.items.len()
        ))
        .with_before(&existing);
        self.journal
            .record(audit, WriteMode::MustCommitWithEntity(&mut *tx))
            .await?;
        tx.commit().await?;

        tracing::info!(
            branch_id = existing.branch_id,
            entity_id = id,
            actor_id = actor.id,
            "Shipment deleted"
        );
        Ok(existing)
    }

    /// 记录报损 (仅用于报表，不参与库存派生)
    pub async fn record_waste(
        &self,
        actor: &Actor,
        data: WasteEntryCreate,
        now: i64,
    ) -> LedgerResult<WasteEntry> {
        let branch_id = actor.resolve_branch(data.branch_id)?;
        validate_movement_quantity(data.quantity, "quantity")?;
        validate_text_len(&data.note, "note", MAX_NOTE_LEN)?;
        let date = parse_date(&data.date)?.to_string();
        require_branch(&self.pool, branch_id).await?;
        let product = require_product(&self.pool, data.product_id).await?;

        let mut tx = self.pool.begin().await?;
        let entry = waste_entry::insert(
            &mut tx,
            branch_id,
            product.id,
            &date,
            data.quantity,
            &data.note,
            now,
        )
        .await?;

        let audit = AuditEntry::new(
            actor,
            Some(branch_id),
            WASTE_ENTRY,
            entry.id,
            AuditAction::Create,
            now,
        )
        .describe(format!("Waste {} {} {}", product.name, entry.quantity, product.unit))
        .with_after(&entry);
        self.journal
            .record(audit, WriteMode::MustCommitWithEntity(&mut *tx))
            .await?;
        tx.commit().await?;

        tracing::info!(branch_id, entity_id = entry.id, actor_id = actor.id, "Waste recorded");
        Ok(entry)
    }

    /// 删除报损，审计记录保存删除前的完整实体 (before)
    pub async fn delete_waste(&self, actor: &Actor, id: i64, now: i64) -> LedgerResult<WasteEntry> {
        validate_id(id, "waste_entry_id")?;
        let existing = waste_entry::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| waste_not_found(id))?;
        actor.ensure_can_act_on(Some(existing.branch_id))?;

        let mut tx = self.pool.begin().await?;
        if !waste_entry::delete(&mut tx, id).await? {
            return Err(waste_not_found(id));
        }

        let audit = AuditEntry::new(
            actor,
            Some(existing.branch_id),
            WASTE_ENTRY,
            id,
            AuditAction::Delete,
            now,
        )
        .describe(format!("Waste {} deleted", existing.date))
        .with_before(&existing);
        self.journal
            .record(audit, WriteMode::MustCommitWithEntity(&mut *tx))
            .await?;
        tx.commit().await?;

        tracing::info!(
            branch_id = existing.branch_id,
            entity_id = id,
            actor_id = actor.id,
            "Waste deleted"
        );
        Ok(existing)
    }
    /// 记录月初或月末库存快照
    pub async fn record_stock_snapshot(
        &self,
        actor: &Actor,
        data: StockSnapshotCreate,
        now: i64,
    ) -> LedgerResult<StockSnapshot> {
        let branch_id = actor.resolve_branch(data.branch_id)?;
        validate_id(data.product_id, "product_id")?;
        validate_count_quantity(data.quantity, "quantity")?;
        let snapshot_date = parse_date(&data.snapshot_date)?.to_string();
        require_branch(&self.pool, branch_id).await?;
        let product = require_product(&self.pool, data.product_id).await?;

        let fields = StockSnapshotFields {
            branch_id,
            product_id: product.id,
            snapshot_date,
            snapshot_type: data.snapshot_type,
            quantity: data.quantity,
        };

        let mut tx = self.pool.begin().await?;
        let snapshot = stock_snapshot::insert(&mut tx, &fields, now).await?;

        let audit = AuditEntry::new(
            actor,
            Some(branch_id),
            STOCK_SNAPSHOT,
            snapshot.id,
            AuditAction::Create,
            now,
        )
        .describe(format!(
            "Stock snapshot {} {}: {} {}",
            snapshot.snapshot_date, product.name, snapshot.quantity, product.unit
        ))
        .with_after(&snapshot);
        self.journal
            .record(audit, WriteMode::MustCommitWithEntity(&mut *tx))
            .await?;
        tx.commit().await?;

        tracing::info!(
            branch_id,
            product_id = product.id,
            entity_id = snapshot.id,
            snapshot_type = ?snapshot.snapshot_type,
            actor_id = actor.id,
            "Stock snapshot recorded"
        );
        Ok(snapshot)
    }

    pub async fn delete_stock_snapshot(
        &self,
        actor: &Actor,
        id: i64,
        now: i64,
    ) -> LedgerResult<StockSnapshot> {
        validate_id(id, "stock_snapshot_id")?;
        let existing = stock_snapshot::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| snapshot_not_found(id))?;
        actor.ensure_can_act_on(Some(existing.branch_id))?;

        let mut tx = self.pool.begin().await?;
        if !stock_snapshot::delete(&mut tx, id).await? {
            return Err(snapshot_not_found(id));
        }
        let audit = AuditEntry::new(
            actor,
            Some(existing.branch_id),
            STOCK_SNAPSHOT,
            id,
            AuditAction::Delete,
            now,
        )
        .describe(format!("Stock snapshot {} deleted", existing.snapshot_date))
        .with_before(&existing);
        self.journal
            .record(audit, WriteMode::MustCommitWithEntity(&mut *tx))
            .await?;
        tx.commit().await?;

        tracing::info!(
            branch_id = existing.branch_id,
            entity_id = id,
            actor_id = actor.id,
            "Stock snapshot deleted"
        );
        Ok(existing)
    }
}

fn stock_entry_not_found(id: i64) -> LedgerError {
    LedgerError::NotFound(ErrorCode::StockEntryNotFound, format!("Stock entry {id} not found"))
}

fn center_shipment_not_found(id: i64) -> LedgerError {
    LedgerError::NotFound(
        ErrorCode::CenterShipmentNotFound,
        format!("Center shipment {id} not found"),
    )
}

fn shipment_not_found(id: i64) -> LedgerError {
    LedgerError::NotFound(ErrorCode::ShipmentNotFound, format!("Shipment {id} not found"))
}

fn already_stocked(id: i64) -> LedgerError {
    LedgerError::Conflict(
        ErrorCode::ShipmentAlreadyStocked,
        format!("Shipment {id} is already booked to stock"),
    )
}

fn waste_not_found(id: i64) -> LedgerError {
    LedgerError::NotFound(ErrorCode::WasteEntryNotFound, format!("Waste entry {id} not found"))
}

fn snapshot_not_found(id: i64) -> LedgerError {
    LedgerError::NotFound(
        ErrorCode::StockSnapshotNotFound,
        format!("Stock snapshot {id} not found"),
    )
}
