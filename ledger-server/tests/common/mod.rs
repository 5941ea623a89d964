#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use ledger_server::db::repository::{branch, product};
use ledger_server::{Actor, DbService, LedgerState};
use shared::models::{
    BranchCreate, CenterShipmentCreate, ProductCreate, ShipmentCreate, ShipmentItemInput,
    SnapshotType, StockEntryCreate, StockSnapshotCreate,
};
use tempfile::TempDir;

/// Unix millis of a UTC wall-clock time
pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> i64 {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0)
        .unwrap()
        .timestamp_millis()
}

pub struct Fixture {
    pub state: LedgerState,
    /// Holds the database directory of file-backed fixtures
    pub dir: Option<TempDir>,
    pub branch_id: i64,
    pub other_branch_id: i64,
    pub flour: i64,
    pub sugar: i64,
    pub admin: Actor,
    pub manager: Actor,
}

/// Single-connection in-memory ledger
pub async fn fixture() -> Fixture {
    seed(DbService::in_memory().await.unwrap(), None).await
}

/// WAL database file with a multi-connection pool
pub async fn file_fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");
    let db = DbService::new(path.to_str().unwrap(), 8, 5_000).await.unwrap();
    seed(db, Some(dir)).await
}

async fn seed(db: DbService, dir: Option<TempDir>) -> Fixture {
    let created = at(2023, 12, 1, 0, 0);

    let b = branch::create(
        &db.pool,
        BranchCreate { name: "Moda".into(), address: None, phone: None },
        created,
    )
    .await
    .unwrap();
    let other = branch::create(
        &db.pool,
        BranchCreate { name: "Besiktas".into(), address: None, phone: None },
        created,
    )
    .await
    .unwrap();
    let flour = product::create(
        &db.pool,
        ProductCreate {
            name: "Flour".into(),
            unit: "kg".into(),
            stock_code: None,
            is_center_product: true,
        },
        created,
    )
    .await
    .unwrap();
    let sugar = product::create(
        &db.pool,
        ProductCreate {
            name: "Sugar".into(),
            unit: "kg".into(),
            stock_code: None,
            is_center_product: false,
        },
        created,
    )
    .await
    .unwrap();

    Fixture {
        state: LedgerState::from_db(db, Tz::UTC).unwrap(),
        dir,
        branch_id: b.id,
        other_branch_id: other.id,
        flour: flour.id,
        sugar: sugar.id,
        admin: Actor::super_admin(1, "Head Office"),
        manager: Actor::branch_admin(2, "Selin", b.id),
    }
}

pub fn count(product_id: i64, date: &str, quantity: f64) -> StockEntryCreate {
    StockEntryCreate {
        branch_id: None,
        product_id,
        count_date: date.into(),
        quantity,
        note: None,
    }
}

pub fn center(product_id: i64, date: &str, quantity: f64) -> CenterShipmentCreate {
    CenterShipmentCreate {
        branch_id: None,
        product_id,
        date: date.into(),
        quantity,
        unit_price: 12.5,
        note: None,
    }
}

pub fn shipment(date: &str, items: &[(i64, f64)]) -> ShipmentCreate {
    ShipmentCreate {
        branch_id: None,
        date: date.into(),
        note: Some("supplier delivery".into()),
        items: items
            .iter()
            .map(|&(product_id, quantity)| ShipmentItemInput {
                product_id,
                quantity,
                unit_price: 4.0,
            })
            .collect(),
    }
}

pub fn snapshot(
    product_id: i64,
    date: &str,
    snapshot_type: SnapshotType,
    quantity: f64,
) -> StockSnapshotCreate {
    StockSnapshotCreate {
        branch_id: None,
        product_id,
        snapshot_date: date.into(),
        snapshot_type,
        quantity,
    }
}
