use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
}

impl User {
    /// Upserted on every interaction so names stay current.
    pub async fn upsert(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        first_name: &str,
        last_name: &str,
        username: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT OR REPLACE INTO users (user_id, first_name, last_name, username)
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(first_name)
        .bind(last_name)
        .bind(username)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn all(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, first_name, last_name, username
             FROM users
             ORDER BY first_name, last_name",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, first_name, last_name, username FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Phone number from the contact-sharing onboarding step, if on file.
    pub async fn phone(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT phone FROM user_contacts WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(pool)
                .await?;
        Ok(row.map(|(phone,)| phone))
    }

    pub async fn set_phone(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        phone: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT OR REPLACE INTO user_contacts (user_id, phone) VALUES (?, ?)")
            .bind(user_id)
            .bind(phone)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Display name fallback chain: full name, then handle, then raw id.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string();
        if !name.is_empty() {
            return name;
        }
        match &self.username {
            Some(username) if !username.is_empty() => username.clone(),
            _ => format!("ID: {}", self.user_id),
        }
    }
}
