//! 支出与收银流水的增删改
//!
//! 写入实体后立即提交，再以 `WriteMode::BestEffort` 写审计。

use shared::error::ErrorCode;
use shared::models::{
    AuditAction, CashMovement, CashMovementCreate, CashMovementUpdate, Expense, ExpenseCreate,
    ExpenseUpdate,
};
use sqlx::SqlitePool;

use super::handlers::{CASH_MOVEMENT, EXPENSE};
use crate::audit::{AuditEntry, AuditJournal, WriteMode};
use crate::auth::Actor;
use crate::db::lookup::require_branch;
use crate::db::repository::cash_movement::{self, CashMovementFields};
use crate::db::repository::expense::{self, ExpenseFields};
use crate::utils::time::parse_date;
use crate::utils::validation::{MAX_NOTE_LEN, validate_amount, validate_id, validate_text_len};
use crate::utils::{LedgerError, LedgerResult};

#[derive(Clone)]
pub struct FinanceService {
    pool: SqlitePool,
    journal: AuditJournal,
}

impl FinanceService {
    pub fn new(pool: SqlitePool, journal: AuditJournal) -> Self {
        Self { pool, journal }
    }

    // ── Expense ─────────────────────────────────────────────────────

    pub async fn record_expense(
        &self,
        actor: &Actor,
        data: ExpenseCreate,
        now: i64,
    ) -> LedgerResult<Expense> {
        let fields = ExpenseFields {
            branch_id: actor.resolve_branch(data.branch_id)?,
            category_id: data.category_id,
            date: data.date,
            amount: data.amount,
            description: data.description,
        };
        let fields = validate_expense(fields)?;
        require_branch(&self.pool, fields.branch_id).await?;

        let created = expense::insert(&self.pool, &fields, now).await?;

        let entry = AuditEntry::new(
            actor,
            Some(created.branch_id),
            EXPENSE,
            created.id,
            AuditAction::Create,
            now,
        )
        .describe(format!("Expense {} {}", created.date, created.amount))
        .with_after(&created);
        self.journal.record(entry, WriteMode::BestEffort).await?;

        tracing::info!(
            branch_id = created.branch_id,
            entity_id = created.id,
            actor_id = actor.id,
            "Expense recorded"
        );
        Ok(created)
    }

    pub async fn update_expense(
        &self,
        actor: &Actor,
        id: i64,
        data: ExpenseUpdate,
        now: i64,
    ) -> LedgerResult<Expense> {
        let before = self.load_expense(actor, id).await?;
        let fields = validate_expense(ExpenseFields {
            branch_id: before.branch_id,
            category_id: data.category_id.unwrap_or(before.category_id),
            date: data.date.unwrap_or_else(|| before.date.clone()),
            amount: data.amount.unwrap_or(before.amount),
            description: data.description.unwrap_or_else(|| before.description.clone()),
        })?;

        if !expense::update(&self.pool, id, &fields, now).await? {
            return Err(expense_not_found(id));
        }
        let after = expense::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| expense_not_found(id))?;

        let entry = AuditEntry::new(
            actor,
            Some(after.branch_id),
            EXPENSE,
            id,
            AuditAction::Update,
            now,
        )
        .describe(format!("Expense {} updated", after.date))
        .with_before(&before)
        .with_after(&after);
        self.journal.record(entry, WriteMode::BestEffort).await?;

        tracing::info!(
            branch_id = after.branch_id,
            entity_id = id,
            actor_id = actor.id,
            "Expense updated"
        );
        Ok(after)
    }

    pub async fn delete_expense(&self, actor: &Actor, id: i64, now: i64) -> LedgerResult<Expense> {
        let existing = self.load_expense(actor, id).await?;
        if !expense::delete(&self.pool, id).await? {
            return Err(expense_not_found(id));
        }

        let entry = AuditEntry::new(
            actor,
            Some(existing.branch_id),
            EXPENSE,
            id,
            AuditAction::Delete,
            now,
        )
        .describe(format!("Expense {} {} deleted", existing.date, existing.amount))
        .with_before(&existing);
        self.journal.record(entry, WriteMode::BestEffort).await?;

        tracing::info!(
            branch_id = existing.branch_id,
            entity_id = id,
            actor_id = actor.id,
            "Expense deleted"
        );
        Ok(existing)
    }

    async fn load_expense(&self, actor: &Actor, id: i64) -> LedgerResult<Expense> {
        validate_id(id, "expense_id")?;
        let existing = expense::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| expense_not_found(id))?;
        actor.ensure_can_act_on(Some(existing.branch_id))?;
        Ok(existing)
    }

    // ── Cash movement ───────────────────────────────────────────────

    pub async fn record_cash_movement(
        &self,
        actor: &Actor,
        data: CashMovementCreate,
        now: i64,
    ) -> LedgerResult<CashMovement> {
        let fields = validate_cash(CashMovementFields {
            branch_id: actor.resolve_branch(data.branch_id)?,
            date: data.date,
            method: data.method,
            direction: data.direction,
            amount: data.amount,
            description: data.description,
        })?;
        require_branch(&self.pool, fields.branch_id).await?;

        let created = cash_movement::insert(&self.pool, &fields, now).await?;

        let entry = AuditEntry::new(
            actor,
            Some(created.branch_id),
            CASH_MOVEMENT,
            created.id,
            AuditAction::Create,
            now,
        )
        .describe(format!(
            "Cash movement {} {:?} {}",
            created.date, created.direction, created.amount
        ))
        .with_after(&created);
        self.journal.record(entry, WriteMode::BestEffort).await?;

        tracing::info!(
            branch_id = created.branch_id,
            entity_id = created.id,
            actor_id = actor.id,
            "Cash movement recorded"
        );
        Ok(created)
    }

    pub async fn update_cash_movement(
        &self,
        actor: &Actor,
        id: i64,
        data: CashMovementUpdate,
        now: i64,
    ) -> LedgerResult<CashMovement> {
        let before = self.load_cash_movement(actor, id).await?;
        let fields = validate_cash(CashMovementFields {
            branch_id: before.branch_id,
            date: data.date.unwrap_or_else(|| before.date.clone()),
            method: data.method.unwrap_or(before.method),
            direction: data.direction.unwrap_or(before.direction),
            amount: data.amount.unwrap_or(before.amount),
            description: data.description.unwrap_or_else(|| before.description.clone()),
        })?;

        if !cash_movement::update(&self.pool, id, &fields, now).await? {
            return Err(cash_not_found(id));
        }
        let after = cash_movement::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| cash_not_found(id))?;

        let entry = AuditEntry::new(
            actor,
            Some(after.branch_id),
            CASH_MOVEMENT,
            id,
            AuditAction::Update,
            now,
        )
        .describe(format!("Cash movement {} updated", after.date))
        .with_before(&before)
        .with_after(&after);
        self.journal.record(entry, WriteMode::BestEffort).await?;

        tracing::info!(
            branch_id = after.branch_id,
            entity_id = id,
            actor_id = actor.id,
            "Cash movement updated"
        );
        Ok(after)
    }

    pub async fn delete_cash_movement(
        &self,
        actor: &Actor,
        id: i64,
        now: i64,
    ) -> LedgerResult<CashMovement> {
        let existing = self.load_cash_movement(actor, id).await?;
        if !cash_movement::delete(&self.pool, id).await? {
            return Err(cash_not_found(id));
        }

        let entry = AuditEntry::new(
            actor,
            Some(existing.branch_id),
            CASH_MOVEMENT,
            id,
            AuditAction::Delete,
            now,
        )
        .describe(format!("Cash movement {} {} deleted", existing.date, existing.amount))
        .with_before(&existing);
        self.journal.record(entry, WriteMode::BestEffort).await?;

        tracing::info!(
            branch_id = existing.branch_id,
            entity_id = id,
            actor_id = actor.id,
            "Cash movement deleted"
        );
        Ok(existing)
    }

    async fn load_cash_movement(&self, actor: &Actor, id: i64) -> LedgerResult<CashMovement> {
        validate_id(id, "cash_movement_id")?;
        let existing = cash_movement::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| cash_not_found(id))?;
        actor.ensure_can_act_on(Some(existing.branch_id))?;
        Ok(existing)
    }
}

/// 校验并规范化日期
fn validate_expense(mut fields: ExpenseFields) -> LedgerResult<ExpenseFields> {
    validate_id(fields.category_id, "category_id")?;
    validate_amount(fields.amount, "amount")?;
    validate_description(&fields.description)?;
    fields.date = parse_date(&fields.date)?.to_string();
    Ok(fields)
}

fn validate_cash(mut fields: CashMovementFields) -> LedgerResult<CashMovementFields> {
    validate_amount(fields.amount, "amount")?;
    validate_description(&fields.description)?;
    fields.date = parse_date(&fields.date)?.to_string();
    Ok(fields)
}

fn validate_description(description: &str) -> LedgerResult<()> {
    validate_text_len(description, "description", MAX_NOTE_LEN)
}

fn expense_not_found(id: i64) -> LedgerError {
    LedgerError::NotFound(ErrorCode::ExpenseNotFound, format!("Expense {id} not found"))
}

fn cash_not_found(id: i64) -> LedgerError {
    LedgerError::NotFound(ErrorCode::CashMovementNotFound, format!("Cash movement {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::branch;
    use shared::models::{BranchCreate, CashDirection, CashMethod};

    const NOW: i64 = 1_704_103_200_000;

    async fn setup() -> (FinanceService, AuditJournal, Actor) {
        let db = DbService::in_memory().await.unwrap();
        let b = branch::create(
            &db.pool,
            BranchCreate { name: "Kadikoy".into(), address: None, phone: None },
            NOW,
        )
        .await
        .unwrap();
        let journal = AuditJournal::new(db.pool.clone());
        let actor = Actor::branch_admin(7, "Mert", b.id);
        (FinanceService::new(db.pool, journal.clone()), journal, actor)
    }

    fn expense_input(amount: f64) -> ExpenseCreate {
        ExpenseCreate {
            branch_id: None,
            category_id: 3,
            date: "2024-01-02".into(),
            amount,
            description: "Electricity".into(),
        }
    }

    #[tokio::test]
    async fn test_record_expense_writes_audit() {
        let (finance, journal, actor) = setup().await;
        let created = finance.record_expense(&actor, expense_input(120.5), NOW).await.unwrap();
        assert_eq!(created.branch_id, actor.branch_id.unwrap());

        let record = journal.creation_record(EXPENSE, created.id).await.unwrap().unwrap();
        assert_eq!(record.action, AuditAction::Create);
        assert!(record.before().is_none());
        assert_eq!(record.after().unwrap()["amount"], 120.5);
    }

    #[tokio::test]
    async fn test_record_expense_validation() {
        let (finance, _, actor) = setup().await;
        let err = finance.record_expense(&actor, expense_input(0.0), NOW).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidAmount);

        let mut bad_date = expense_input(10.0);
        bad_date.date = "02/01/2024".into();
        let err = finance.record_expense(&actor, bad_date, NOW).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidFormat);
    }

    #[tokio::test]
    async fn test_update_expense_keeps_unset_fields() {
        let (finance, journal, actor) = setup().await;
        let created = finance.record_expense(&actor, expense_input(50.0), NOW).await.unwrap();

        let update = ExpenseUpdate { amount: Some(75.0), ..Default::default() };
        let updated = finance.update_expense(&actor, created.id, update, NOW + 1).await.unwrap();
        assert_eq!(updated.amount, 75.0);
        assert_eq!(updated.description, "Electricity");
        assert_eq!(updated.updated_at, NOW + 1);

        let page = journal
            .list(
                &actor,
                shared::models::AuditQuery { entity_id: Some(created.id), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].action, AuditAction::Update);
        assert_eq!(page.items[0].before().unwrap()["amount"], 50.0);
    }

    #[tokio::test]
    async fn test_cross_branch_update_is_forbidden() {
        let (finance, _, actor) = setup().await;
        let created = finance.record_expense(&actor, expense_input(50.0), NOW).await.unwrap();

        let other = Actor::branch_admin(8, "Deniz", actor.branch_id.unwrap() + 1);
        let err = finance
            .update_expense(&other, created.id, ExpenseUpdate::default(), NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Forbidden(..)));
    }

    #[tokio::test]
    async fn test_cash_movement_lifecycle() {
        let (finance, journal, actor) = setup().await;
        let created = finance
            .record_cash_movement(
                &actor,
                CashMovementCreate {
                    branch_id: None,
                    date: "2024-01-03".into(),
                    method: CashMethod::Pos,
                    direction: CashDirection::In,
                    amount: 900.0,
                    description: String::new(),
                },
                NOW,
            )
            .await
            .unwrap();

        let update = CashMovementUpdate {
            direction: Some(CashDirection::Out),
            ..Default::default()
        };
        let updated = finance
            .update_cash_movement(&actor, created.id, update, NOW + 1)
            .await
            .unwrap();
        assert_eq!(updated.direction, CashDirection::Out);
        assert_eq!(updated.method, CashMethod::Pos);

        finance.delete_cash_movement(&actor, created.id, NOW + 2).await.unwrap();
        let err = finance.delete_cash_movement(&actor, created.id, NOW + 3).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CashMovementNotFound);

        let page = journal
            .list(
                &actor,
                shared::models::AuditQuery {
                    entity_type: Some(CASH_MOVEMENT.into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items[0].action, AuditAction::Delete);
        assert!(page.items[0].after().is_none());
    }
}
