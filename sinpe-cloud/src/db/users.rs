//! Identity Account Repository

use super::RepoResult;
use sqlx::{FromRow, SqliteExecutor, SqlitePool};

/// Identity account row (`password_hash` never leaves the server)
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    /// Stored role name, see [`shared::models::Role`]
    pub role: String,
    pub created_at: i64,
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, role, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, role, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Insert an account; a taken email fails with `Duplicate("users.email")`
pub async fn create<'e, E>(executor: E, user: &User) -> RepoResult<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.role)
    .bind(user.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{RepoError, testing};

    fn user(id: &str, email: &str) -> User {
        User {
            id: id.into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
            role: "Administrador".into(),
            created_at: 1,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = testing::pool().await;
        create(&pool, &user("u-1", "admin@example.com")).await.unwrap();

        let by_email = find_by_email(&pool, "admin@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, "u-1");
        assert_eq!(by_email.role, "Administrador");
        assert!(find_by_id(&pool, "u-1").await.unwrap().is_some());
        assert!(find_by_id(&pool, "u-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_email_is_unique() {
        let pool = testing::pool().await;
        create(&pool, &user("u-1", "admin@example.com")).await.unwrap();
        let err = create(&pool, &user("u-2", "admin@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(ref cols) if cols == "users.email"));
    }
}
