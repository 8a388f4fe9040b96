//! Payment ledger (SINPE)
//!
//! A payment is `Received` (unsynchronized) until acknowledged, then
//! `Synchronized` for good. Registration resolves the destination register by
//! its SINPE phone and refuses inactive registers.

use shared::error::{AppError, ErrorCode};
use shared::models::{CashRegister, PaymentCreate, SinpePayment, SyncOutcome};
use sqlx::SqlitePool;
use validator::Validate;

use crate::db::{RepoError, cash_registers, payments};
use crate::error::{ServiceError, ServiceResult, audited};

const TABLE: &str = "sinpe_payments";

pub const REGISTER_NOT_FOUND: &str = "No existe una caja con ese teléfono SINPE.";
pub const REGISTER_INACTIVE: &str = "No se permite pagar a una caja inactiva.";
pub const PAYMENT_NOT_FOUND: &str = "El SINPE no existe.";
pub const FOREIGN_REGISTER: &str = "La caja pertenece a otro comercio.";
pub const SYNCHRONIZED: &str = "SINPE sincronizado correctamente.";
pub const ALREADY_SYNCHRONIZED: &str = "El SINPE ya estaba sincronizado.";

pub fn outcome_message(outcome: SyncOutcome) -> &'static str {
    match outcome {
        SyncOutcome::Synchronized => SYNCHRONIZED,
        SyncOutcome::AlreadySynchronized => ALREADY_SYNCHRONIZED,
    }
}

/// Register resolved from a SINPE phone, confined to `scope` when given
pub async fn register_for_phone(
    pool: &SqlitePool,
    sinpe_phone: &str,
    scope: Option<i64>,
) -> ServiceResult<CashRegister> {
    let register = cash_registers::find_by_phone(pool, sinpe_phone)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::CashRegisterNotFound, REGISTER_NOT_FOUND)
                .with_detail("field", "destination_phone")
        })?;

    if scope.is_some_and(|merchant_id| merchant_id != register.merchant_id) {
        tracing::warn!(register_id = register.id, "Register outside the caller's merchant");
        return Err(AppError::with_message(ErrorCode::CashRegisterForeign, FOREIGN_REGISTER).into());
    }
    Ok(register)
}

/// Record a received payment
///
/// Order: field rules, register lookup, register active. The server stamps
/// `registered_at` and the payment starts unsynchronized.
pub async fn register_payment(
    pool: &SqlitePool,
    form: PaymentCreate,
    scope: Option<i64>,
    now: i64,
) -> ServiceResult<SinpePayment> {
    let form = form.trimmed();
    form.validate()?;

    let register = register_for_phone(pool, &form.destination_phone, scope).await?;
    if !register.active {
        return Err(
            AppError::with_message(ErrorCode::CashRegisterInactive, REGISTER_INACTIVE).into(),
        );
    }

    let payment = audited(pool, TABLE, payments::create(pool, &form, now).await).await?;
    tracing::info!(
        payment_id = payment.id,
        register_id = register.id,
        amount = %payment.amount,
        "SINPE payment registered"
    );
    Ok(payment)
}

pub async fn find_payment(pool: &SqlitePool, id: i64) -> ServiceResult<SinpePayment> {
    payments::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::PaymentNotFound, PAYMENT_NOT_FOUND).into())
}

/// Payments routed to a register, newest first
pub async fn payments_for_register(
    pool: &SqlitePool,
    sinpe_phone: &str,
    scope: Option<i64>,
) -> ServiceResult<Vec<SinpePayment>> {
    let register = register_for_phone(pool, sinpe_phone, scope).await?;
    Ok(payments::list_by_destination(pool, &register.sinpe_phone).await?)
}

/// Mark a payment synchronized; a second call is an informational no-op
///
/// System failures are written to the audit log and leave the payment unchanged.
pub async fn synchronize(pool: &SqlitePool, id: i64) -> ServiceResult<SyncOutcome> {
    match payments::mark_synchronized(pool, id).await {
        Ok(outcome) => {
            if outcome == SyncOutcome::Synchronized {
                tracing::info!(payment_id = id, "SINPE payment synchronized");
            }
            Ok(outcome)
        }
        Err(RepoError::NotFound(_)) => {
            Err(AppError::with_message(ErrorCode::PaymentNotFound, PAYMENT_NOT_FOUND).into())
        }
        Err(err) => Err(ServiceError::from(err).audited(pool, TABLE).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{audit, testing};
    use rust_decimal::Decimal;
    use shared::models::CashRegisterUpdate;

    fn app(err: ServiceError) -> AppError {
        match err {
            ServiceError::App(app) => app,
            ServiceError::Db(db) => panic!("unexpected system error: {db}"),
        }
    }

    async fn payment_rows(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM sinpe_payments")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_payment_trims_and_stamps() {
        let pool = testing::pool().await;
        let merchant = testing::merchant(&pool, "3-101-000001").await;
        testing::register(&pool, merchant.id, "88887777").await;

        let mut form = testing::payment_form(" 88887777 ", Decimal::new(100050, 2));
        form.origin_name = "  Luis  ".into();
        let payment = register_payment(&pool, form, None, 1_234).await.unwrap();

        assert_eq!(payment.destination_phone, "88887777");
        assert_eq!(payment.origin_name, "Luis");
        assert_eq!(payment.registered_at, 1_234);
        assert!(!payment.synchronized);
    }

    #[tokio::test]
    async fn test_unknown_phone_inserts_nothing() {
        let pool = testing::pool().await;
        let err = register_payment(
            &pool,
            testing::payment_form("80000000", Decimal::ONE),
            None,
            1,
        )
        .await
        .unwrap_err();

        let err = app(err);
        assert_eq!(err.code, ErrorCode::CashRegisterNotFound);
        assert_eq!(err.message, REGISTER_NOT_FOUND);
        assert_eq!(payment_rows(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_inactive_register_inserts_nothing() {
        let pool = testing::pool().await;
        let merchant = testing::merchant(&pool, "3-101-000001").await;
        let register = testing::register(&pool, merchant.id, "88887777").await;
        let form = CashRegisterUpdate {
            name: register.name.clone(),
            description: None,
            sinpe_phone: register.sinpe_phone.clone(),
            active: false,
        };
        cash_registers::update(&pool, register.id, &form, 2).await.unwrap();

        let err = register_payment(
            &pool,
            testing::payment_form("88887777", Decimal::ONE),
            None,
            3,
        )
        .await
        .unwrap_err();
        assert_eq!(app(err).code, ErrorCode::CashRegisterInactive);
        assert_eq!(payment_rows(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_invalid_fields_come_first() {
        let pool = testing::pool().await;
        let err = register_payment(
            &pool,
            testing::payment_form("123", Decimal::ZERO),
            None,
            1,
        )
        .await
        .unwrap_err();
        assert_eq!(app(err).code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_cashier_scope_is_enforced() {
        let pool = testing::pool().await;
        let own = testing::merchant(&pool, "3-101-000001").await;
        let other = testing::merchant(&pool, "3-101-000002").await;
        testing::register(&pool, other.id, "88887777").await;

        let err = payments_for_register(&pool, "88887777", Some(own.id))
            .await
            .unwrap_err();
        assert_eq!(app(err).code, ErrorCode::CashRegisterForeign);
        assert!(
            payments_for_register(&pool, "88887777", Some(other.id))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_synchronize_is_idempotent() {
        let pool = testing::pool().await;
        let payment = testing::payment_at(&pool, "88887777", Decimal::TEN, 1).await;

        assert_eq!(
            synchronize(&pool, payment.id).await.unwrap(),
            SyncOutcome::Synchronized
        );
        assert_eq!(
            synchronize(&pool, payment.id).await.unwrap(),
            SyncOutcome::AlreadySynchronized
        );
        assert!(find_payment(&pool, payment.id).await.unwrap().synchronized);

        let edits = audit::list(&pool)
            .await
            .unwrap()
            .into_iter()
            .filter(|e| e.event_type == "Editar")
            .count();
        assert_eq!(edits, 1);
    }

    #[tokio::test]
    async fn test_synchronize_missing_payment() {
        let pool = testing::pool().await;
        let err = app(synchronize(&pool, 404).await.unwrap_err());
        assert_eq!(err.code, ErrorCode::PaymentNotFound);
        assert_eq!(err.message, PAYMENT_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_storage_failure_is_audited() {
        let pool = testing::pool().await;
        let payment = testing::payment_at(&pool, "88887777", Decimal::TEN, 1).await;
        sqlx::query("ALTER TABLE sinpe_payments RENAME COLUMN synchronized TO synced")
            .execute(&pool)
            .await
            .unwrap();

        let err = synchronize(&pool, payment.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Db(_)));

        let entries = audit::list(&pool).await.unwrap();
        assert_eq!(entries[0].event_type, "Error");
        assert_eq!(entries[0].event_table, "sinpe_payments");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_synchronize_on_file_database() {
        let (_dir, pool) = testing::file_pool().await;
        let mut ids = Vec::new();
        for n in 0..20 {
            ids.push(testing::payment_at(&pool, "88887777", Decimal::ONE, n).await.id);
        }

        let mut tasks = tokio::task::JoinSet::new();
        for id in ids.iter().copied() {
            for _ in 0..2 {
                let pool = pool.clone();
                tasks.spawn(async move { synchronize(&pool, id).await });
            }
        }

        let mut synchronized = 0;
        let mut already = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined.unwrap() {
                Ok(SyncOutcome::Synchronized) => synchronized += 1,
                Ok(SyncOutcome::AlreadySynchronized) => already += 1,
                Err(err) => panic!("concurrent synchronize failed: {err:?}"),
            }
        }
        assert_eq!(synchronized, ids.len());
        assert_eq!(already, ids.len());

        let entries = audit::list(&pool).await.unwrap();
        assert!(entries.iter().all(|e| e.event_type != "Error"));
        let edits = entries.iter().filter(|e| e.event_type == "Editar").count();
        assert_eq!(edits, ids.len());
    }
}
