//! Daily event notifications.
//!
//! Every morning, at the configured local wall-clock time, each participant
//! of an event taking place that day gets a private reminder message.

use std::sync::Arc;

use chrono::{NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::database::connection::DatabaseManager;
use crate::database::models::{Event, EventSummary, Participant};
use crate::utils::logging::log_notify_failure;

type ServiceResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub struct NotificationService {
    bot: Bot,
    db: Arc<DatabaseManager>,
    scheduler: JobScheduler,
    timezone: Tz,
    notify_time: NaiveTime,
}

impl NotificationService {
    pub async fn new(
        bot: Bot,
        db: Arc<DatabaseManager>,
        timezone: Tz,
        notify_time: NaiveTime,
    ) -> ServiceResult<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            bot,
            db,
            scheduler,
            timezone,
            notify_time,
        })
    }

    pub async fn start(&mut self) -> ServiceResult<()> {
        let bot = self.bot.clone();
        let db = self.db.clone();
        let timezone = self.timezone;

        // The scheduler fires in UTC; the configured local time is translated
        // using the zone's current offset. A DST switch shifts the firing by
        // the offset delta until the next restart.
        let utc_time = local_time_as_utc(self.timezone, self.notify_time);
        let cron = format!("0 {} {} * * *", utc_time.minute(), utc_time.hour());

        let notify_job = Job::new_async(cron.as_str(), move |_uuid, _l| {
            let bot = bot.clone();
            let db = db.clone();
            Box::pin(async move {
                if let Err(e) = send_daily_notifications(bot, db, timezone).await {
                    tracing::error!("Daily notification run failed: {}", e);
                }
            })
        })?;

        self.scheduler.add(notify_job).await?;
        self.scheduler.start().await?;

        tracing::info!(
            "Notification service started - daily at {} {} ({} UTC)",
            self.notify_time.format("%H:%M"),
            self.timezone,
            utc_time.format("%H:%M")
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> ServiceResult<()> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    // Manual trigger for testing
    pub async fn run_now(&self) -> ServiceResult<()> {
        send_daily_notifications(self.bot.clone(), self.db.clone(), self.timezone).await
    }
}

fn local_time_as_utc(timezone: Tz, local: NaiveTime) -> NaiveTime {
    let today = Utc::now().with_timezone(&timezone).date_naive();
    match timezone
        .from_local_datetime(&today.and_time(local))
        .earliest()
    {
        Some(local_dt) => local_dt.with_timezone(&Utc).time(),
        // Only possible when the wall-clock time falls into a DST gap.
        None => local,
    }
}

async fn send_daily_notifications(
    bot: Bot,
    db: Arc<DatabaseManager>,
    timezone: Tz,
) -> ServiceResult<()> {
    let today = Utc::now().with_timezone(&timezone).date_naive();
    let events = Event::on_date(&db.pool, today).await?;

    if events.is_empty() {
        tracing::debug!("No events on {}, nothing to notify", today);
        return Ok(());
    }

    let mut sent = 0usize;
    for event in &events {
        let recipients = Participant::user_ids(&db.pool, event.id).await?;
        let text = notification_text(event);
        for user_id in recipients {
            // One refused chat must not starve the rest of the fan-out.
            match bot.send_message(ChatId(user_id), &text).await {
                Ok(_) => sent += 1,
                Err(e) => log_notify_failure(user_id, event.id, &e.to_string()),
            }
        }
    }

    tracing::info!(
        "Daily notifications for {}: {} events, {} messages sent",
        today,
        events.len(),
        sent
    );
    Ok(())
}

fn notification_text(event: &EventSummary) -> String {
    match event.time.as_deref() {
        Some(time) => format!("⏰ Напоминание: сегодня в {} - {}", time, event.name),
        None => format!("⏰ Напоминание: сегодня - {}", event.name),
    }
}
