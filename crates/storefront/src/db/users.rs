//! `PostgreSQL` account storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use playtech_core::{Email, PhoneNumber, Role, UserId};

use super::{RepositoryError, UserStore, map_unique_violation};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, name, username, email, phone_number, role, password_hash, \
     password_reset_token, password_reset_expires, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    username: String,
    email: String,
    phone_number: Option<String>,
    role: String,
    password_hash: String,
    password_reset_token: Option<String>,
    password_reset_expires: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let phone_number = row
            .phone_number
            .as_deref()
            .map(PhoneNumber::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid phone number in database: {e}"))
            })?;
        let role = row.role.parse::<Role>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            username: row.username,
            email,
            phone_number,
            role,
            password_hash: row.password_hash,
            password_reset_token: row.password_reset_token,
            password_reset_expires: row.password_reset_expires,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Account storage backed by the `users` table.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn select_where(column: &str) -> String {
    format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1")
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(&select_where("id"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(&select_where("username"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(&select_where("email"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(&select_where("password_reset_token"))
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users (name, username, email, role, password_hash) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.name)
            .bind(&user.username)
            .bind(user.email.as_str())
            .bind(Role::Customer.as_str())
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        User::try_from(row)
    }

    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET password_hash = $2,
                password_reset_token = NULL,
                password_reset_expires = NULL,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: UserId,
        token: Option<(&str, DateTime<Utc>)>,
    ) -> Result<(), RepositoryError> {
        let (hash, expires) = token.unzip();
        let result = sqlx::query(
            r"
            UPDATE users
            SET password_reset_token = $2,
                password_reset_expires = $3,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(hash)
        .bind(expires)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_name(&self, id: UserId, name: &str) -> Result<User, RepositoryError> {
        let sql = format!(
            "UPDATE users SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        User::try_from(row)
    }

    async fn set_phone_number(
        &self,
        id: UserId,
        phone: &PhoneNumber,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            "UPDATE users SET phone_number = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(phone.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        User::try_from(row)
    }
}
