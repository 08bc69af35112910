use std::collections::HashSet;

use anyhow::Result;
use chrono::NaiveDate;
use event_calendar_bot::bot::calendar;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardButtonKind, InlineKeyboardMarkup};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn callback_data(button: &InlineKeyboardButton) -> &str {
    match &button.kind {
        InlineKeyboardButtonKind::CallbackData(data) => data,
        other => panic!("expected a callback button, got {other:?}"),
    }
}

fn rows(markup: &InlineKeyboardMarkup) -> &Vec<Vec<InlineKeyboardButton>> {
    &markup.inline_keyboard
}

fn find_day<'a>(markup: &'a InlineKeyboardMarkup, label: &str) -> &'a InlineKeyboardButton {
    rows(markup)
        .iter()
        .flatten()
        .find(|b| b.text == label)
        .unwrap_or_else(|| panic!("no cell labelled {label:?}"))
}

#[test]
fn grid_has_header_weekdays_and_nav() -> Result<()> {
    // September 2026: starts on Tuesday, 30 days -> 5 week rows.
    let markup = calendar::build(2026, 9, &HashSet::new(), &HashSet::new())?;
    let rows = rows(&markup);

    assert_eq!(rows.len(), 1 + 1 + 5 + 1);
    assert_eq!(rows[0][0].text, "Сентябрь 2026");
    assert_eq!(rows[1].len(), 7);
    assert_eq!(rows[1][0].text, "Пн");
    assert_eq!(rows[1][6].text, "Вс");

    // Every week row is exactly seven cells wide.
    for week in &rows[2..rows.len() - 1] {
        assert_eq!(week.len(), 7);
    }

    Ok(())
}

#[test]
fn leading_and_trailing_blanks_are_inert() -> Result<()> {
    let markup = calendar::build(2026, 9, &HashSet::new(), &HashSet::new())?;
    let rows = rows(&markup);

    // September 1st 2026 is a Tuesday: one leading blank on Monday.
    let first_week = &rows[2];
    assert_eq!(first_week[0].text, " ");
    assert_eq!(callback_data(&first_week[0]), "ignore");
    assert_eq!(first_week[1].text, "1");

    // 30 days + 1 lead = 31 cells, so the last row ends in blanks.
    let last_week = &rows[rows.len() - 2];
    assert_eq!(callback_data(&last_week[6]), "ignore");

    Ok(())
}

#[test]
fn day_cells_carry_absolute_dates() -> Result<()> {
    let markup = calendar::build(2026, 9, &HashSet::new(), &HashSet::new())?;

    assert_eq!(callback_data(find_day(&markup, "1")), "view_2026-09-01");
    assert_eq!(callback_data(find_day(&markup, "30")), "view_2026-09-30");

    Ok(())
}

#[test]
fn marker_precedence_participation_over_events() -> Result<()> {
    let event_dates: HashSet<NaiveDate> = [date(2026, 9, 5), date(2026, 9, 20)].into();
    let user_dates: HashSet<NaiveDate> = [date(2026, 9, 20)].into();

    let markup = calendar::build(2026, 9, &event_dates, &user_dates)?;

    // Has events only: pipes. Participating: pin wins over pipes.
    assert_eq!(callback_data(find_day(&markup, "|5|")), "view_2026-09-05");
    assert_eq!(callback_data(find_day(&markup, "📌20")), "view_2026-09-20");
    assert_eq!(callback_data(find_day(&markup, "7")), "view_2026-09-07");

    Ok(())
}

#[test]
fn navigation_wraps_december_to_january() -> Result<()> {
    let markup = calendar::build(2026, 12, &HashSet::new(), &HashSet::new())?;
    let nav = rows(&markup).last().unwrap();

    assert_eq!(callback_data(&nav[0]), "nav_2026-11");
    assert_eq!(callback_data(&nav[1]), "nav_2027-1");

    Ok(())
}

#[test]
fn navigation_wraps_january_to_december() -> Result<()> {
    let markup = calendar::build(2026, 1, &HashSet::new(), &HashSet::new())?;
    let nav = rows(&markup).last().unwrap();

    assert_eq!(callback_data(&nav[0]), "nav_2025-12");
    assert_eq!(callback_data(&nav[1]), "nav_2026-2");

    Ok(())
}

#[test]
fn leap_february_has_29_cells() -> Result<()> {
    let markup = calendar::build(2028, 2, &HashSet::new(), &HashSet::new())?;

    assert_eq!(callback_data(find_day(&markup, "29")), "view_2028-02-29");
    assert!(rows(&markup).iter().flatten().all(|b| b.text != "30"));

    Ok(())
}

#[test]
fn invalid_month_is_rejected() {
    assert!(calendar::build(2026, 13, &HashSet::new(), &HashSet::new()).is_err());
    assert!(calendar::build(2026, 0, &HashSet::new(), &HashSet::new()).is_err());
}
