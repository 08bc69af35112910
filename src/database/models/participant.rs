use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Outcome of a join attempt. The composite primary key on
/// (event_id, user_id) makes the second insert of the same pair fail; that
/// failure is an expected "already registered" answer, not an error. A join
/// against a full event inserts nothing and reports `Full`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyRegistered,
    Full,
}

/// Roster line for the admin participant list.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RosterEntry {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub phone: Option<String>,
}

pub struct Participant;

impl Participant {
    /// The capacity check and the insert are one statement, so two users
    /// racing for the last slot cannot both get in: SQLite runs the whole
    /// INSERT...SELECT atomically and the loser inserts zero rows.
    pub async fn add(
        pool: &sqlx::SqlitePool,
        event_id: i64,
        user_id: i64,
    ) -> Result<JoinOutcome, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO participants (event_id, user_id)
             SELECT ?1, ?2
             WHERE (SELECT max_participants FROM events WHERE id = ?1) = 0
                OR (SELECT COUNT(*) FROM participants WHERE event_id = ?1)
                   < (SELECT max_participants FROM events WHERE id = ?1)",
        )
        .bind(event_id)
        .bind(user_id)
        .execute(pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Ok(JoinOutcome::Full),
            Ok(_) => Ok(JoinOutcome::Joined),
            Err(e) if is_unique_violation(&e) => Ok(JoinOutcome::AlreadyRegistered),
            Err(e) => Err(e),
        }
    }

    /// Leaving an event the user never joined is a no-op.
    pub async fn remove(
        pool: &sqlx::SqlitePool,
        event_id: i64,
        user_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM participants WHERE event_id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn roster(
        pool: &sqlx::SqlitePool,
        event_id: i64,
    ) -> Result<Vec<RosterEntry>, sqlx::Error> {
        sqlx::query_as::<_, RosterEntry>(
            "SELECT u.username, u.first_name, uc.phone
             FROM participants p
             JOIN users u ON p.user_id = u.user_id
             LEFT JOIN user_contacts uc ON p.user_id = uc.user_id
             WHERE p.event_id = ?
             ORDER BY u.first_name, u.last_name",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    pub async fn user_ids(
        pool: &sqlx::SqlitePool,
        event_id: i64,
    ) -> Result<Vec<i64>, sqlx::Error> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT user_id FROM participants WHERE event_id = ?")
                .bind(event_id)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

/// SQLite reports a primary-key clash as extended code 1555 (or 2067 for
/// plain unique indexes).
fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .map_or(false, |code| code == "1555" || code == "2067")
}
