use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::info;

/// Admin roster entry joined with whatever user info exists. An admin may be
/// seeded before they ever talk to the bot, so all user columns are optional.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AdminInfo {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl AdminInfo {
    /// Display name fallback chain: full name, then handle, then raw id.
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        let name = format!("{first} {last}").trim().to_string();
        if !name.is_empty() {
            return name;
        }
        match &self.username {
            Some(username) if !username.is_empty() => username.clone(),
            _ => format!("ID: {}", self.user_id),
        }
    }
}

pub struct Admin;

impl Admin {
    pub async fn is_admin(pool: &sqlx::SqlitePool, user_id: i64) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM admins WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    pub async fn add(pool: &sqlx::SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO admins (user_id) VALUES (?)")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Removing a non-admin is a silent no-op.
    pub async fn remove(pool: &sqlx::SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM admins WHERE user_id = ?")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn list_with_info(pool: &sqlx::SqlitePool) -> Result<Vec<AdminInfo>, sqlx::Error> {
        sqlx::query_as::<_, AdminInfo>(
            "SELECT a.user_id, u.first_name, u.last_name, u.username
             FROM admins a
             LEFT JOIN users u ON a.user_id = u.user_id
             ORDER BY a.user_id",
        )
        .fetch_all(pool)
        .await
    }

    /// Idempotent startup seeding of the configured administrator.
    pub async fn seed(pool: &sqlx::SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT OR IGNORE INTO admins (user_id) VALUES (?)")
            .bind(user_id)
            .execute(pool)
            .await?;
        info!("Seed administrator {} ensured", user_id);
        Ok(())
    }
}
