//! Employee Repository

use super::audit::{self, AuditEvent};
use super::{RepoError, RepoResult, begin_write};
use shared::models::{Employee, EmployeeCreate, EmployeeUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

const TABLE: &str = "employees";

const COLUMNS: &str = "id, merchant_id, identity_account_id, names, surname1, surname2, national_id, email, registered_at, modified_at, active";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Employee>> {
    let rows = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {COLUMNS} FROM employees ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Employee>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {COLUMNS} FROM employees WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

/// First employee registered with this email, compared case-insensitively
pub async fn find_by_email<'e, E>(executor: E, email: &str) -> RepoResult<Option<Employee>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {COLUMNS} FROM employees WHERE lower(email) = lower(?) ORDER BY id LIMIT 1"
    ))
    .bind(email)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

/// Employee linked to an identity account
pub async fn find_by_identity(pool: &SqlitePool, account_id: &str) -> RepoResult<Option<Employee>> {
    let row = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {COLUMNS} FROM employees WHERE identity_account_id = ? ORDER BY id LIMIT 1"
    ))
    .bind(account_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: &EmployeeCreate, now: i64) -> RepoResult<Employee> {
    let mut tx = begin_write(pool).await?;

    let employee = sqlx::query_as::<_, Employee>(&format!(
        "INSERT INTO employees (merchant_id, names, surname1, surname2, national_id, email, registered_at, active) VALUES (?, ?, ?, ?, ?, ?, ?, 1) RETURNING {COLUMNS}"
    ))
    .bind(data.merchant_id)
    .bind(&data.names)
    .bind(&data.surname1)
    .bind(&data.surname2)
    .bind(&data.national_id)
    .bind(&data.email)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let event = AuditEvent::created(
        TABLE,
        format!("Usuario {} registrado", employee.id),
        &employee,
    )?;
    audit::record(&mut *tx, &event).await?;

    tx.commit().await?;
    Ok(employee)
}

/// The identity link is left untouched
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &EmployeeUpdate,
    now: i64,
) -> RepoResult<Employee> {
    let mut tx = begin_write(pool).await?;

    let before = find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))?;

    let after = sqlx::query_as::<_, Employee>(&format!(
        "UPDATE employees SET merchant_id = ?, names = ?, surname1 = ?, surname2 = ?, national_id = ?, email = ?, active = ?, modified_at = ? WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(data.merchant_id)
    .bind(&data.names)
    .bind(&data.surname1)
    .bind(&data.surname2)
    .bind(&data.national_id)
    .bind(&data.email)
    .bind(data.active)
    .bind(now)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))?;

    let event = AuditEvent::edited(TABLE, format!("Usuario {id} editado"), &before, &after)?;
    audit::record(&mut *tx, &event).await?;

    tx.commit().await?;
    Ok(after)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<Employee> {
    let mut tx = begin_write(pool).await?;

    let before = find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))?;

    sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let event = AuditEvent::deleted(TABLE, format!("Usuario {id} eliminado"), &before)?;
    audit::record(&mut *tx, &event).await?;

    tx.commit().await?;
    Ok(before)
}

/// Point an employee at its identity account (registration of a Cashier)
pub async fn link_identity<'e, E>(
    executor: E,
    employee: &Employee,
    account_id: &str,
    now: i64,
) -> RepoResult<Employee>
where
    E: SqliteExecutor<'e>,
{
    let linked = sqlx::query_as::<_, Employee>(&format!(
        "UPDATE employees SET identity_account_id = ?, modified_at = ? WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(account_id)
    .bind(now)
    .bind(employee.id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Employee {} not found", employee.id)))?;
    Ok(linked)
}
