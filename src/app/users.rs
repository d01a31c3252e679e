use anyhow::{anyhow, Result};
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use sqlx::Row;
use time::OffsetDateTime;

use crate::domain::user::{NewUser, User};
use crate::domain::{timestamp_from_micros, timestamp_micros};
use crate::infra::db::Db;

#[derive(Clone)]
pub struct UserService {
    db: Db,
}

impl UserService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, first_name, is_staff, is_superuser, created_at \
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(map_user))
    }

    /// Insert a user unless one with the same username exists. Returns the
    /// resolved user and whether it was created by this call; an existing
    /// user's attributes are never touched.
    pub async fn get_or_create(&self, new_user: NewUser) -> Result<(User, bool)> {
        if let Some(existing) = self.find_by_username(&new_user.username).await? {
            return Ok((existing, false));
        }

        let password_hash = hash_password(&new_user.password)?;
        // Stored precision, so the returned user matches later reads.
        let created_at = timestamp_from_micros(timestamp_micros(OffsetDateTime::now_utc()));

        let result = sqlx::query(
            "INSERT INTO users (username, email, first_name, is_staff, is_superuser, password_hash, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(new_user.is_staff)
        .bind(new_user.is_superuser)
        .bind(&password_hash)
        .bind(timestamp_micros(created_at))
        .execute(self.db.pool())
        .await?;

        let user = User {
            id: result.last_insert_rowid(),
            username: new_user.username,
            email: new_user.email,
            first_name: new_user.first_name,
            is_staff: new_user.is_staff,
            is_superuser: new_user.is_superuser,
            created_at,
        };

        Ok((user, true))
    }

    /// Delete a user; comments referencing it go with it via ON DELETE CASCADE.
    pub async fn delete_user(&self, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_user(row: sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        is_staff: row.get("is_staff"),
        is_superuser: row.get("is_superuser"),
        created_at: timestamp_from_micros(row.get("created_at")),
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {}", err))?;
    Ok(hash.to_string())
}
