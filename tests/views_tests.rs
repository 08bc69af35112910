use chrono::NaiveDate;
use event_calendar_bot::bot::views::{self, Origin};
use event_calendar_bot::database::models::{AdminInfo, EventDetail, EventSummary, RosterEntry, User};
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

fn all_callbacks(markup: &InlineKeyboardMarkup) -> Vec<&str> {
    markup
        .inline_keyboard
        .iter()
        .flatten()
        .map(callback_data)
        .collect()
}

fn detail(max: i64, count: i64, registered: bool) -> EventDetail {
    EventDetail {
        id: 7,
        name: "Покер".to_string(),
        date: date(2026, 9, 12),
        time: Some("19:30".to_string()),
        description: "Вечер покера".to_string(),
        max_participants: max,
        participant_count: count,
        viewer_registered: registered,
    }
}

fn summary(id: i64, time: Option<&str>, name: &str) -> EventSummary {
    EventSummary {
        id,
        time: time.map(String::from),
        name: name.to_string(),
    }
}

#[test]
fn empty_date_list_offers_only_back_for_regular_users() {
    let (text, markup) = views::date_list(date(2026, 9, 12), &[], false);

    assert!(text.contains("нет событий"));
    assert_eq!(all_callbacks(&markup), vec!["nav_2026-9"]);
}

#[test]
fn empty_date_list_still_offers_create_to_admins() {
    let (_, markup) = views::date_list(date(2026, 9, 12), &[], true);

    assert_eq!(
        all_callbacks(&markup),
        vec!["create_2026-09-12", "nav_2026-9"]
    );
}

#[test]
fn date_list_rows_open_event_details() {
    let events = vec![
        summary(1, Some("10:00"), "Завтрак"),
        summary(2, None, "Очень длинное название события без времени"),
    ];
    let (text, markup) = views::date_list(date(2026, 9, 12), &events, false);

    assert!(text.contains("2026-09-12"));
    let callbacks = all_callbacks(&markup);
    assert_eq!(callbacks[0], "event_details_1");
    assert_eq!(callbacks[1], "event_details_2");

    let first_label = &markup.inline_keyboard[0][0].text;
    assert!(first_label.starts_with("10:00 - "));
    // Untimed rows show the name alone, truncated.
    let second_label = &markup.inline_keyboard[1][0].text;
    assert_eq!(second_label.chars().count(), 20);
}

#[test]
fn detail_shows_capped_count_and_register_button() {
    let (text, markup) = views::event_detail(&detail(5, 0, false), false, &[], Origin::List);

    assert!(text.contains("🏷 Название: Покер"));
    assert!(text.contains("⏰ Время: 19:30"));
    assert!(text.contains("👥 Записано: 0/5"));

    let callbacks = all_callbacks(&markup);
    assert_eq!(callbacks, vec!["event_join_7", "view_2026-09-12"]);
}

#[test]
fn detail_shows_plain_count_without_limit() {
    let (text, _) = views::event_detail(&detail(0, 3, false), false, &[], Origin::List);
    assert!(text.contains("👥 Записано: 3"));
    assert!(!text.contains("3/"));
}

#[test]
fn detail_missing_time_is_spelled_out() {
    let mut d = detail(0, 0, false);
    d.time = None;
    let (text, _) = views::event_detail(&d, false, &[], Origin::List);
    assert!(text.contains("⏰ Время: Не указано"));
}

#[test]
fn registered_viewer_gets_leave_instead_of_join() {
    let (_, markup) = views::event_detail(&detail(5, 1, true), false, &[], Origin::List);

    let callbacks = all_callbacks(&markup);
    assert!(callbacks.contains(&"event_leave_7"));
    assert!(!callbacks.contains(&"event_join_7"));
}

#[test]
fn full_event_hides_join_button() {
    let (_, markup) = views::event_detail(&detail(2, 2, false), false, &[], Origin::List);

    let callbacks = all_callbacks(&markup);
    assert!(!callbacks.contains(&"event_join_7"));
    assert!(!callbacks.contains(&"event_leave_7"));
}

#[test]
fn admin_detail_has_roster_and_management_row() {
    let roster = vec![
        RosterEntry {
            username: Some("anna".to_string()),
            first_name: Some("Анна".to_string()),
            phone: Some("+79990001122".to_string()),
        },
        RosterEntry {
            username: None,
            first_name: Some("Борис".to_string()),
            phone: None,
        },
    ];
    let (text, markup) = views::event_detail(&detail(5, 2, false), true, &roster, Origin::List);

    assert!(text.contains("👥 Участники:"));
    assert!(text.contains("• @anna (+79990001122)"));
    assert!(text.contains("• Борис"));

    let callbacks = all_callbacks(&markup);
    assert!(callbacks.contains(&"edit_7"));
    assert!(callbacks.contains(&"delete_7"));
}

#[test]
fn back_target_matches_arrival_path() {
    let (_, from_grid) = views::event_detail(&detail(0, 0, false), false, &[], Origin::Grid);
    let (_, from_list) = views::event_detail(&detail(0, 0, false), false, &[], Origin::List);

    assert!(all_callbacks(&from_grid).contains(&"nav_2026-9"));
    assert!(all_callbacks(&from_list).contains(&"view_2026-09-12"));
}

#[test]
fn edit_menu_covers_every_field_and_cancel() {
    let (_, markup) = views::edit_menu(7);
    let callbacks = all_callbacks(&markup);

    for expected in ["edit_name", "edit_desc", "edit_date", "edit_time", "edit_max", "delete_7", "cancel_edit"] {
        assert!(callbacks.contains(&expected), "missing {expected}");
    }
}

#[test]
fn confirm_delete_has_both_answers() {
    let (text, markup) = views::confirm_delete();
    assert!(text.contains("удалить"));
    assert_eq!(all_callbacks(&markup), vec!["confirm_delete", "cancel_delete"]);
}

#[test]
fn admin_menu_lists_names_with_ids() {
    let admins = vec![
        AdminInfo {
            user_id: 42,
            first_name: None,
            last_name: None,
            username: None,
        },
        AdminInfo {
            user_id: 100,
            first_name: Some("Анна".to_string()),
            last_name: Some("Иванова".to_string()),
            username: Some("anna".to_string()),
        },
    ];
    let (text, markup) = views::admin_menu(&admins);

    assert!(text.contains("• ID: 42 (ID: 42)"));
    assert!(text.contains("• Анна Иванова (ID: 100)"));
    assert_eq!(
        all_callbacks(&markup),
        vec!["admin_add", "admin_remove", "admin_close"]
    );
}

#[test]
fn admin_add_picker_pairs_users_per_row() {
    let users: Vec<User> = (1..=3)
        .map(|i| User {
            user_id: i,
            first_name: format!("U{i}"),
            last_name: String::new(),
            username: None,
        })
        .collect();
    let (_, markup) = views::admin_add_picker(&users);

    assert_eq!(markup.inline_keyboard[0].len(), 2);
    assert_eq!(markup.inline_keyboard[1].len(), 1);
    assert_eq!(callback_data(&markup.inline_keyboard[0][0]), "add_admin_1");
    assert_eq!(callback_data(&markup.inline_keyboard[1][0]), "add_admin_3");
    assert_eq!(
        callback_data(markup.inline_keyboard.last().unwrap().first().unwrap()),
        "admin_back"
    );
}

#[test]
fn admin_add_picker_handles_empty_user_list() {
    let (text, markup) = views::admin_add_picker(&[]);
    assert!(text.contains("Нет зарегистрированных пользователей"));
    assert_eq!(all_callbacks(&markup), vec!["admin_back"]);
}

#[test]
fn admin_remove_picker_targets_each_admin() {
    let admins = vec![AdminInfo {
        user_id: 42,
        first_name: None,
        last_name: None,
        username: Some("boss".to_string()),
    }];
    let (_, markup) = views::admin_remove_picker(&admins);

    let callbacks = all_callbacks(&markup);
    assert_eq!(callbacks, vec!["remove_admin_42", "admin_back"]);
    assert!(markup.inline_keyboard[0][0].text.contains("boss"));
}
