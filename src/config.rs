use anyhow::{anyhow, Result};
use chrono::NaiveTime;
use chrono_tz::Tz;
use std::env;
use std::str::FromStr;

/// Runtime configuration, resolved once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    /// Optional administrator seeded into the admins table on startup.
    pub seed_admin_id: Option<i64>,
    /// IANA timezone the daily notification job runs in.
    pub timezone: Tz,
    /// Local wall-clock time at which the daily notification job fires.
    pub notify_time: NaiveTime,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/events.db".to_string());
        let database_url = if database_url.trim().is_empty() {
            "sqlite:./data/events.db".to_string()
        } else {
            database_url
        };

        let seed_admin_id = match env::var("ADMIN_ID") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| anyhow!("ADMIN_ID must be an integer user id"))?,
            ),
            _ => None,
        };

        let tz_name = env::var("TIMEZONE").unwrap_or_else(|_| "Europe/Moscow".to_string());
        let timezone = Tz::from_str(tz_name.trim())
            .map_err(|_| anyhow!("TIMEZONE '{}' is not a valid IANA timezone", tz_name))?;

        let notify_raw = env::var("NOTIFY_TIME").unwrap_or_else(|_| "07:00".to_string());
        let notify_time = NaiveTime::parse_from_str(notify_raw.trim(), "%H:%M")
            .map_err(|_| anyhow!("NOTIFY_TIME must be in HH:MM format"))?;

        Ok(Config {
            telegram_bot_token: token,
            database_url,
            seed_admin_id,
            timezone,
            notify_time,
        })
    }
}
