mod common;

use common::{at, center, count, fixture, shipment};
use ledger_server::{ErrorCode, LedgerError};
use shared::models::{AuditAction, WasteEntryCreate};

#[tokio::test]
async fn test_usage_between_counts_with_reversed_movement() {
    let f = fixture().await;
    let rec = &f.state.recorder;

    rec.record_stock_count(&f.manager, count(f.flour, "2024-01-01", 20.0), at(2024, 1, 1, 10, 0))
        .await
        .unwrap();

    // X: supplier shipment dated Jan 5, booked Jan 5 09:00
    let x = rec
        .create_shipment(
            &f.manager,
            shipment("2024-01-05", &[(f.flour, 8.0)]),
            at(2024, 1, 4, 16, 0),
        )
        .await
        .unwrap();
    rec.book_shipment(&f.manager, x.id, at(2024, 1, 5, 9, 0)).await.unwrap();

    // Y: center shipment booked Jan 10 09:00
    let y = rec
        .record_center_shipment(
            &f.manager,
            center(f.flour, "2024-01-10", 3.0),
            at(2024, 1, 10, 9, 0),
        )
        .await
        .unwrap();

    rec.record_stock_count(&f.manager, count(f.flour, "2024-01-15", 25.0), at(2024, 1, 15, 10, 0))
        .await
        .unwrap();

    let usage = f
        .state
        .engine
        .usage_between_counts(f.branch_id, f.flour)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(usage.previous_count, 20.0);
    assert_eq!(usage.current_count, 25.0);
    assert_eq!(usage.shipments_between, 11.0);
    assert_eq!(usage.usage, 6.0);

    let creation = f
        .state
        .journal
        .creation_record("center_shipment", y.id)
        .await
        .unwrap()
        .unwrap();
    f.state.undo.undo(creation.id, &f.manager, at(2024, 1, 16, 8, 0)).await.unwrap();

    let usage = f
        .state
        .engine
        .usage_between_counts(f.branch_id, f.flour)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(usage.shipments_between, 8.0);
    assert_eq!(usage.usage, 3.0);
}

#[tokio::test]
async fn test_current_stock_excludes_undone_movement() {
    let f = fixture().await;
    let rec = &f.state.recorder;

    rec.record_stock_count(&f.manager, count(f.flour, "2024-01-01", 10.0), at(2024, 1, 1, 10, 0))
        .await
        .unwrap();
    let movement = rec
        .record_center_shipment(
            &f.manager,
            center(f.flour, "2024-01-02", 5.0),
            at(2024, 1, 2, 10, 0),
        )
        .await
        .unwrap();

    let stock = f.state.engine.current_stock(f.branch_id, f.flour).await.unwrap();
    assert_eq!(stock.quantity, 15.0);
    assert_eq!(stock.incoming_since_count, 5.0);
    assert_eq!(stock.last_count_date.as_deref(), Some("2024-01-01"));

    let creation = f
        .state
        .journal
        .creation_record("center_shipment", movement.id)
        .await
        .unwrap()
        .unwrap();
    f.state.undo.undo(creation.id, &f.manager, at(2024, 1, 3, 10, 0)).await.unwrap();

    let stock = f.state.engine.current_stock(f.branch_id, f.flour).await.unwrap();
    assert_eq!(stock.quantity, 10.0);
}

#[tokio::test]
async fn test_pending_shipment_is_inert_until_booked() {
    let f = fixture().await;
    let rec = &f.state.recorder;

    rec.record_stock_count(&f.manager, count(f.sugar, "2024-01-01", 2.0), at(2024, 1, 1, 10, 0))
        .await
        .unwrap();
    let pending = rec
        .create_shipment(
            &f.manager,
            shipment("2024-01-02", &[(f.sugar, 4.0)]),
            at(2024, 1, 2, 10, 0),
        )
        .await
        .unwrap();
    assert!(!pending.is_stocked);
    assert_eq!(pending.total_amount, 16.0);

    let stock = f.state.engine.current_stock(f.branch_id, f.sugar).await.unwrap();
    assert_eq!(stock.quantity, 2.0);

    let booked = rec.book_shipment(&f.manager, pending.id, at(2024, 1, 3, 10, 0)).await.unwrap();
    assert!(booked.is_stocked);
    assert_eq!(booked.booked_at, Some(at(2024, 1, 3, 10, 0)));

    let stock = f.state.engine.current_stock(f.branch_id, f.sugar).await.unwrap();
    assert_eq!(stock.quantity, 6.0);
}

#[tokio::test]
async fn test_booking_counts_from_booking_time_not_shipment_date() {
    let f = fixture().await;
    let rec = &f.state.recorder;

    rec.record_stock_count(&f.manager, count(f.flour, "2024-01-01", 10.0), at(2024, 1, 1, 10, 0))
        .await
        .unwrap();
    // Dated Jan 30, booked to stock on Feb 2
    let late = rec
        .create_shipment(
            &f.manager,
            shipment("2024-01-30", &[(f.flour, 6.0)]),
            at(2024, 1, 30, 12, 0),
        )
        .await
        .unwrap();
    rec.book_shipment(&f.manager, late.id, at(2024, 2, 2, 9, 0)).await.unwrap();
    // Control: dated and booked in January
    rec.record_center_shipment(
        &f.manager,
        center(f.flour, "2024-01-20", 1.5),
        at(2024, 1, 20, 9, 0),
    )
    .await
    .unwrap();

    let january = f.state.engine.monthly_usage(f.branch_id, f.flour, 2024, 1).await.unwrap();
    assert_eq!(january.incoming_qty, 1.5);

    let stock = f.state.engine.current_stock(f.branch_id, f.flour).await.unwrap();
    assert_eq!(stock.quantity, 17.5);
}

#[tokio::test]
async fn test_monthly_usage_for_branch() {
    let f = fixture().await;
    let rec = &f.state.recorder;

    let opening = count_in(f.branch_id, f.flour, "2023-12-31", 20.0);
    rec.record_stock_count(&f.admin, opening, at(2023, 12, 31, 22, 0))
        .await
        .unwrap();
    let mut delivery = center(f.flour, "2024-01-05", 10.0);
    delivery.branch_id = Some(f.branch_id);
    rec.record_center_shipment(&f.admin, delivery, at(2024, 1, 5, 9, 0))
        .await
        .unwrap();
    let closing = count_in(f.branch_id, f.flour, "2024-01-31", 8.0);
    rec.record_stock_count(&f.admin, closing, at(2024, 1, 31, 21, 0))
        .await
        .unwrap();

    let report = f
        .state
        .engine
        .monthly_usage_for_branch(f.branch_id, 2024, 1)
        .await
        .unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].product_name, "Flour");
    assert_eq!(report[0].start_qty, 20.0);
    assert_eq!(report[0].incoming_qty, 10.0);
    assert_eq!(report[0].end_qty, 8.0);
    assert_eq!(report[0].used_qty, 22.0);
    assert_eq!(report[0].incoming_cost, 125.0);

    // Other branch sees nothing
    let other = f
        .state
        .engine
        .monthly_usage_for_branch(f.other_branch_id, 2024, 1)
        .await
        .unwrap();
    assert!(other.iter().all(|u| u.start_qty == 0.0 && u.incoming_qty == 0.0));
}

#[tokio::test]
async fn test_usage_reports_cover_center_products_only() {
    let f = fixture().await;
    let rec = &f.state.recorder;

    for (product, date, qty, day) in [
        (f.flour, "2024-01-01", 5.0, 1),
        (f.flour, "2024-01-08", 1.0, 8),
        (f.sugar, "2024-01-01", 9.0, 1),
        (f.sugar, "2024-01-08", 3.0, 8),
    ] {
        rec.record_stock_count(&f.manager, count(product, date, qty), at(2024, 1, day, 10, 0))
            .await
            .unwrap();
    }
    let delivery = rec
        .create_shipment(
            &f.manager,
            shipment("2024-01-03", &[(f.sugar, 2.0)]),
            at(2024, 1, 3, 8, 0),
        )
        .await
        .unwrap();
    rec.book_shipment(&f.manager, delivery.id, at(2024, 1, 3, 9, 0))
        .await
        .unwrap();

    // Sugar is not a central-kitchen product
    let between = f
        .state
        .engine
        .usage_between_counts_for_branch(f.branch_id)
        .await
        .unwrap();
    assert_eq!(between.len(), 1);
    assert_eq!(between[0].product_id, f.flour);
    assert_eq!(between[0].usage, 4.0);

    let monthly = f
        .state
        .engine
        .monthly_usage_for_branch(f.branch_id, 2024, 1)
        .await
        .unwrap();
    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0].product_id, f.flour);
    assert!(monthly.iter().all(|u| u.product_id != f.sugar));

    // Single-product readers and current stock still cover every product
    let sugar = f
        .state
        .engine
        .usage_between_counts(f.branch_id, f.sugar)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sugar.usage, 8.0);

    let stock = f.state.engine.current_stock_for_branch(f.branch_id).await.unwrap();
    assert_eq!(stock.len(), 2);
    assert_eq!(stock[0].product_id, f.flour);
    assert_eq!(stock[0].quantity, 1.0);
    assert_eq!(stock[1].product_id, f.sugar);
    assert_eq!(stock[1].quantity, 3.0);
}

#[tokio::test]
async fn test_double_booking_is_conflict_and_undo_returns_to_pending() {
    let f = fixture().await;
    let rec = &f.state.recorder;

    let s = rec
        .create_shipment(
            &f.manager,
            shipment("2024-01-02", &[(f.flour, 4.0), (f.sugar, 1.0)]),
            at(2024, 1, 2, 8, 0),
        )
        .await
        .unwrap();
    rec.book_shipment(&f.manager, s.id, at(2024, 1, 2, 9, 0)).await.unwrap();

    let err = rec.book_shipment(&f.manager, s.id, at(2024, 1, 2, 10, 0)).await.unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(ErrorCode::ShipmentAlreadyStocked, _)));
    assert_eq!(f.state.engine.current_stock(f.branch_id, f.flour).await.unwrap().quantity, 4.0);

    let page = f
        .state
        .journal
        .list(
            &f.manager,
            shared::models::AuditQuery {
                entity_type: Some("shipment".into()),
                action: Some(AuditAction::Update),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 1);

    f.state.undo.undo(page.items[0].id, &f.manager, at(2024, 1, 3, 9, 0)).await.unwrap();
    assert_eq!(f.state.engine.current_stock(f.branch_id, f.flour).await.unwrap().quantity, 0.0);

    // Pending again, so it can be booked once more
    let rebooked = rec.book_shipment(&f.manager, s.id, at(2024, 1, 4, 9, 0)).await.unwrap();
    assert_eq!(rebooked.items.len(), 2);
    assert_eq!(f.state.engine.current_stock(f.branch_id, f.sugar).await.unwrap().quantity, 1.0);
}

#[tokio::test]
async fn test_waste_does_not_change_derived_stock() {
    let f = fixture().await;
    let rec = &f.state.recorder;

    rec.record_stock_count(&f.manager, count(f.flour, "2024-01-01", 9.0), at(2024, 1, 1, 10, 0))
        .await
        .unwrap();
    let waste = rec
        .record_waste(
            &f.manager,
            WasteEntryCreate {
                branch_id: None,
                product_id: f.flour,
                date: "2024-01-02".into(),
                quantity: 2.0,
                note: "spilled".into(),
            },
            at(2024, 1, 2, 10, 0),
        )
        .await
        .unwrap();
    assert_eq!(waste.note, "spilled");
    assert_eq!(f.state.engine.current_stock(f.branch_id, f.flour).await.unwrap().quantity, 9.0);
}

#[tokio::test]
async fn test_derivation_input_errors() {
    let f = fixture().await;
    let engine = &f.state.engine;

    let err = engine.monthly_usage(f.branch_id, f.flour, 2024, 13).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPeriod);
    let err = engine.monthly_usage(f.branch_id, f.flour, 1999, 5).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPeriod);

    let err = engine.current_stock(f.branch_id, 999).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProductNotFound);
    let err = engine.current_stock(999, f.flour).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::BranchNotFound);
    let err = engine.current_stock(0, f.flour).await.unwrap_err();
    assert!(matches!(err, LedgerError::Validation(..)));

    // No history is not an error
    let empty = engine.current_stock(f.branch_id, f.sugar).await.unwrap();
    assert_eq!(empty.quantity, 0.0);
    assert!(empty.last_count_date.is_none());
    assert!(engine.usage_between_counts(f.branch_id, f.sugar).await.unwrap().is_none());
}

#[tokio::test]
async fn test_recorder_validation() {
    let f = fixture().await;
    let rec = &f.state.recorder;

    let err = rec
        .record_stock_count(&f.manager, count(f.flour, "2024-01-01", -1.0), at(2024, 1, 1, 0, 0))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidQuantity);

    let err = rec
        .record_center_shipment(
            &f.manager,
            center(f.flour, "2024-01-01", 0.0),
            at(2024, 1, 1, 0, 0),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidQuantity);

    let err = rec
        .create_shipment(&f.manager, shipment("2024-01-01", &[]), at(2024, 1, 1, 0, 0))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ShipmentEmpty);

    let err = rec
        .record_stock_count(&f.manager, count(f.flour, "2024-02-30", 1.0), at(2024, 1, 1, 0, 0))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidFormat);

    // Super admins must name the branch
    let err = rec
        .record_stock_count(&f.admin, count(f.flour, "2024-01-01", 1.0), at(2024, 1, 1, 0, 0))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::BranchNotSelected);

    // Branch admins cannot write into another branch
    let err = rec
        .record_stock_count(
            &f.manager,
            count_in(f.other_branch_id, f.flour, "2024-01-01", 1.0),
            at(2024, 1, 1, 0, 0),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden(..)));

    let total = f
        .state
        .journal
        .list(&f.admin, Default::default())
        .await
        .unwrap()
        .total;
    assert_eq!(total, 0);
}

fn count_in(
    branch_id: i64,
    product_id: i64,
    date: &str,
    quantity: f64,
) -> shared::models::StockEntryCreate {
    let mut input = count(product_id, date, quantity);
    input.branch_id = Some(branch_id);
    input
}
