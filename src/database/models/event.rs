use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub name: String,
    pub description: String,
    pub creator_id: i64,
    pub max_participants: i64,
}

/// One row of a date's event list.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: i64,
    pub time: Option<String>,
    pub name: String,
}

/// Everything the single-event view needs in one fetch.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EventDetail {
    pub id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub description: String,
    pub max_participants: i64,
    pub participant_count: i64,
    pub viewer_registered: bool,
}

impl EventDetail {
    /// Capacity gate: 0 means unlimited.
    pub fn has_free_slot(&self) -> bool {
        self.max_participants == 0 || self.participant_count < self.max_participants
    }
}

impl Event {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        date: NaiveDate,
        time: Option<&str>,
        name: &str,
        description: &str,
        creator_id: i64,
        max_participants: i64,
    ) -> Result<Self, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO events (date, time, name, description, creator_id, max_participants)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(date)
        .bind(time)
        .bind(name)
        .bind(description)
        .bind(creator_id)
        .bind(max_participants)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();
        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        event_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            "SELECT id, date, time, name, description, creator_id, max_participants
             FROM events WHERE id = ?",
        )
        .bind(event_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_name(
        pool: &sqlx::SqlitePool,
        event_id: i64,
        name: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE events SET name = ? WHERE id = ?")
            .bind(name)
            .bind(event_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn set_description(
        pool: &sqlx::SqlitePool,
        event_id: i64,
        description: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE events SET description = ? WHERE id = ?")
            .bind(description)
            .bind(event_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn set_time(
        pool: &sqlx::SqlitePool,
        event_id: i64,
        time: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE events SET time = ? WHERE id = ?")
            .bind(time)
            .bind(event_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn set_date(
        pool: &sqlx::SqlitePool,
        event_id: i64,
        date: NaiveDate,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE events SET date = ? WHERE id = ?")
            .bind(date)
            .bind(event_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn set_max_participants(
        pool: &sqlx::SqlitePool,
        event_id: i64,
        max_participants: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE events SET max_participants = ? WHERE id = ?")
            .bind(max_participants)
            .bind(event_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Deletes an event together with its participant rows. The schema has no
    /// foreign keys, so the cascade is an explicit transaction.
    pub async fn delete(pool: &sqlx::SqlitePool, event_id: i64) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM participants WHERE event_id = ?")
            .bind(event_id)
            .execute(&mut tx)
            .await?;
        sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(event_id)
            .execute(&mut tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Events on one date, untimed rows first, then by time, id as tiebreaker
    /// so the ordering is stable.
    pub async fn for_date(
        pool: &sqlx::SqlitePool,
        date: NaiveDate,
    ) -> Result<Vec<EventSummary>, sqlx::Error> {
        sqlx::query_as::<_, EventSummary>(
            "SELECT id, time, name FROM events
             WHERE date = ?
             ORDER BY time IS NOT NULL, time, id",
        )
        .bind(date)
        .fetch_all(pool)
        .await
    }

    pub async fn detail(
        pool: &sqlx::SqlitePool,
        event_id: i64,
        viewer_id: i64,
    ) -> Result<Option<EventDetail>, sqlx::Error> {
        sqlx::query_as::<_, EventDetail>(
            "SELECT e.id, e.name, e.date, e.time, e.description, e.max_participants,
                    COUNT(p.user_id) AS participant_count,
                    EXISTS(SELECT 1 FROM participants
                           WHERE event_id = e.id AND user_id = ?) AS viewer_registered
             FROM events e
             LEFT JOIN participants p ON e.id = p.event_id
             WHERE e.id = ?
             GROUP BY e.id",
        )
        .bind(viewer_id)
        .bind(event_id)
        .fetch_optional(pool)
        .await
    }

    /// Distinct dates with at least one event in the given month.
    pub async fn dates_in_month(
        pool: &sqlx::SqlitePool,
        year: i32,
        month: u32,
    ) -> Result<Vec<NaiveDate>, sqlx::Error> {
        let month_str = format!("{year}-{month:02}");
        let rows: Vec<(NaiveDate,)> = sqlx::query_as(
            "SELECT DISTINCT date FROM events WHERE strftime('%Y-%m', date) = ?",
        )
        .bind(month_str)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(date,)| date).collect())
    }

    /// Distinct dates in the month on which the given user participates.
    pub async fn user_dates_in_month(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<NaiveDate>, sqlx::Error> {
        let month_str = format!("{year}-{month:02}");
        let rows: Vec<(NaiveDate,)> = sqlx::query_as(
            "SELECT DISTINCT e.date
             FROM events e
             JOIN participants p ON e.id = p.event_id
             WHERE p.user_id = ? AND strftime('%Y-%m', e.date) = ?",
        )
        .bind(user_id)
        .bind(month_str)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(date,)| date).collect())
    }

    /// All events on a date, for the daily notification fan-out.
    pub async fn on_date(
        pool: &sqlx::SqlitePool,
        date: NaiveDate,
    ) -> Result<Vec<EventSummary>, sqlx::Error> {
        sqlx::query_as::<_, EventSummary>(
            "SELECT id, time, name FROM events WHERE date = ? ORDER BY id",
        )
        .bind(date)
        .fetch_all(pool)
        .await
    }
}
