mod common;

use common::{at, center, count, fixture, shipment};
use ledger_server::reports::{close_month, monthly_reports};
use ledger_server::{Actor, ErrorCode, LedgerError};
use shared::models::{AuditQuery, CashDirection, CashMethod, CashMovementCreate, ExpenseCreate};

fn cash(date: &str, direction: CashDirection, amount: f64) -> CashMovementCreate {
    CashMovementCreate {
        branch_id: None,
        date: date.into(),
        method: CashMethod::Pos,
        direction,
        amount,
        description: String::new(),
    }
}

#[tokio::test]
async fn test_close_month_aggregates_and_purges() {
    let f = fixture().await;
    let rec = &f.state.recorder;
    let finance = &f.state.finance;
    let now = at(2024, 1, 10, 9, 0);

    finance
        .record_cash_movement(&f.manager, cash("2024-01-10", CashDirection::In, 1000.0), now)
        .await
        .unwrap();
    finance
        .record_cash_movement(&f.manager, cash("2024-01-11", CashDirection::Out, 100.0), now)
        .await
        .unwrap();
    finance
        .record_expense(
            &f.manager,
            ExpenseCreate {
                branch_id: None,
                category_id: 1,
                date: "2024-01-12".into(),
                amount: 200.0,
                description: "Rent share".into(),
            },
            now,
        )
        .await
        .unwrap();
    // 4 × 12.5 = 50
    rec.record_center_shipment(&f.manager, center(f.flour, "2024-01-05", 4.0), now).await.unwrap();
    // 10 × 4.0 = 40, booked
    let booked = rec
        .create_shipment(&f.manager, shipment("2024-01-06", &[(f.sugar, 10.0)]), now)
        .await
        .unwrap();
    rec.book_shipment(&f.manager, booked.id, now).await.unwrap();
    // pending shipments are not a cost
    rec.create_shipment(&f.manager, shipment("2024-01-07", &[(f.sugar, 99.0)]), now).await.unwrap();
    rec.record_stock_count(&f.manager, count(f.flour, "2024-01-31", 2.0), now).await.unwrap();
    // February rows survive
    rec.record_stock_count(&f.manager, count(f.flour, "2024-02-01", 1.0), at(2024, 2, 1, 9, 0))
        .await
        .unwrap();

    let audit_before = f.state.journal.list(&f.admin, AuditQuery::default()).await.unwrap().total;

    let report = close_month(f.state.pool(), &f.manager, None, 2024, 1, at(2024, 2, 1, 12, 0))
        .await
        .unwrap();
    assert_eq!(report.branch_id, f.branch_id);
    assert_eq!(report.total_revenue, 1000.0);
    assert_eq!(report.total_expenses, 300.0);
    assert_eq!(report.total_shipments, 90.0);
    assert_eq!(report.net_profit, 610.0);
    assert_eq!(report.closed_by_id, f.manager.id);

    let remaining: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM cash_movement) + (SELECT COUNT(*) FROM expense) \
         + (SELECT COUNT(*) FROM shipment) + (SELECT COUNT(*) FROM shipment_item) \
         + (SELECT COUNT(*) FROM center_shipment) + (SELECT COUNT(*) FROM stock_entry)",
    )
    .fetch_one(f.state.pool())
    .await
    .unwrap();
    // only the February count is left
    assert_eq!(remaining, 1);

    let audit_after = f.state.journal.list(&f.admin, AuditQuery::default()).await.unwrap().total;
    assert_eq!(audit_after, audit_before);

    // Purged history is simply absent for derivation
    let stock = f.state.engine.current_stock(f.branch_id, f.flour).await.unwrap();
    assert_eq!(stock.quantity, 1.0);

    let reports = monthly_reports(f.state.pool(), &f.manager, None).await.unwrap();
    assert_eq!(reports.len(), 1);
}

#[tokio::test]
async fn test_close_month_twice_is_conflict() {
    let f = fixture().await;
    close_month(f.state.pool(), &f.admin, Some(f.branch_id), 2024, 3, at(2024, 4, 1, 0, 0))
        .await
        .unwrap();
    let err = close_month(f.state.pool(), &f.manager, None, 2024, 3, at(2024, 4, 2, 0, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(ErrorCode::MonthlyReportExists, _)));

    // a different branch may still close the same month
    close_month(f.state.pool(), &f.admin, Some(f.other_branch_id), 2024, 3, at(2024, 4, 1, 0, 0))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_close_month_input_errors() {
    let f = fixture().await;

    let err = close_month(f.state.pool(), &f.manager, None, 2024, 0, at(2024, 4, 1, 0, 0))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPeriod);

    let outsider = Actor::branch_admin(5, "Can", f.other_branch_id);
    let err = close_month(
        f.state.pool(),
        &outsider,
        Some(f.branch_id),
        2024,
        1,
        at(2024, 4, 1, 0, 0),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden(..)));

    let err = close_month(f.state.pool(), &f.admin, Some(777), 2024, 1, at(2024, 4, 1, 0, 0))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::BranchNotFound);
}
