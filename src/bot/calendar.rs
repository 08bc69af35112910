//! Month-grid renderer.
//!
//! `build` is pure over its inputs; `build_for` is the convenience wrapper
//! that fetches the per-month date sets from the store first. Every day cell
//! carries the absolute ISO date it represents, so the callback side never
//! needs session memory to interpret a press.

use std::collections::HashSet;

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::bot::callback_data::CallbackData;
use crate::database::models::Event;

const MONTHS_RU: [&str; 12] = [
    "Январь",
    "Февраль",
    "Март",
    "Апрель",
    "Май",
    "Июнь",
    "Июль",
    "Август",
    "Сентябрь",
    "Октябрь",
    "Ноябрь",
    "Декабрь",
];

const WEEKDAYS_RU: [&str; 7] = ["Пн", "Вт", "Ср", "Чт", "Пт", "Сб", "Вс"];

/// Renders the grid for one month. Marker precedence on a day cell:
/// participating (📌) over has-events (|n|) over plain.
pub fn build(
    year: i32,
    month: u32,
    event_dates: &HashSet<NaiveDate>,
    user_dates: &HashSet<NaiveDate>,
) -> Result<InlineKeyboardMarkup> {
    let first_day = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow!("invalid calendar month: {year}-{month}"))?;
    let month_name = MONTHS_RU
        .get(month as usize - 1)
        .ok_or_else(|| anyhow!("invalid calendar month: {year}-{month}"))?;

    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = vec![
        vec![ignore_button(format!("{month_name} {year}"))],
        WEEKDAYS_RU.iter().map(|d| ignore_button(*d)).collect(),
    ];

    // Weeks start Monday; leading cells before the 1st stay blank.
    let mut week: Vec<InlineKeyboardButton> = (0..first_day.weekday().num_days_from_monday())
        .map(|_| ignore_button(" "))
        .collect();

    for day in 1..=days_in_month(first_day) {
        let date = first_day
            .with_day(day)
            .ok_or_else(|| anyhow!("invalid day {day} in {year}-{month}"))?;

        let participating = user_dates.contains(&date);
        let has_events = event_dates.contains(&date);
        let label = if participating {
            format!("📌{day}")
        } else if has_events {
            format!("|{day}|")
        } else {
            day.to_string()
        };

        week.push(InlineKeyboardButton::callback(
            label,
            CallbackData::ViewDate(date).encode(),
        ));
        if week.len() == 7 {
            keyboard.push(std::mem::take(&mut week));
        }
    }

    if !week.is_empty() {
        while week.len() < 7 {
            week.push(ignore_button(" "));
        }
        keyboard.push(week);
    }

    let (prev_year, prev_month) = if month == 1 { (year - 1, 12) } else { (year, month - 1) };
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    keyboard.push(vec![
        InlineKeyboardButton::callback(
            "<",
            CallbackData::Navigate { year: prev_year, month: prev_month }.encode(),
        ),
        InlineKeyboardButton::callback(
            ">",
            CallbackData::Navigate { year: next_year, month: next_month }.encode(),
        ),
    ]);

    Ok(InlineKeyboardMarkup::new(keyboard))
}

/// Fetches the month's date sets and renders the grid. With a viewer the
/// dates they participate in get the pin marker.
pub async fn build_for(
    pool: &sqlx::SqlitePool,
    year: i32,
    month: u32,
    viewer: Option<i64>,
) -> Result<InlineKeyboardMarkup> {
    let event_dates: HashSet<NaiveDate> = Event::dates_in_month(pool, year, month)
        .await?
        .into_iter()
        .collect();
    let user_dates: HashSet<NaiveDate> = match viewer {
        Some(user_id) => Event::user_dates_in_month(pool, user_id, year, month)
            .await?
            .into_iter()
            .collect(),
        None => HashSet::new(),
    };
    build(year, month, &event_dates, &user_dates)
}

/// Today's year and month, the default grid target.
pub fn current_month() -> (i32, u32) {
    let today = chrono::Local::now().date_naive();
    (today.year(), today.month())
}

fn days_in_month(first_day: NaiveDate) -> u32 {
    let (next_year, next_month) = if first_day.month() == 12 {
        (first_day.year() + 1, 1)
    } else {
        (first_day.year(), first_day.month() + 1)
    };
    match NaiveDate::from_ymd_opt(next_year, next_month, 1) {
        Some(next_first) => next_first.pred_opt().map_or(31, |d| d.day()),
        None => 31,
    }
}

fn ignore_button(label: impl Into<String>) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label.into(), CallbackData::Ignore.encode())
}
