//! View assembly: texts and button grids for the date list, the single-event
//! view, and the administrator menu. Pure over already-fetched data, so the
//! layouts are unit-testable without a transport.

use chrono::NaiveDate;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::bot::callback_data::{AdminAction, CallbackData, EditField, EventAction};
use crate::database::models::{AdminInfo, EventDetail, EventSummary, RosterEntry, User};

/// Where the viewer came from, tracked explicitly so the back button matches
/// the way in. `Grid` is the single-event short-circuit straight from a day
/// cell; `List` is the normal path through a date's event list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Grid,
    List,
}

/// The event list for one date. With no events only the back action remains
/// (plus the admin create action).
pub fn date_list(
    date: NaiveDate,
    events: &[EventSummary],
    viewer_is_admin: bool,
) -> (String, InlineKeyboardMarkup) {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    let text = if events.is_empty() {
        format!("На {date} нет событий")
    } else {
        for event in events {
            let label = match &event.time {
                Some(time) => format!("{} - {}...", time, truncate(&event.name, 15)),
                None => truncate(&event.name, 20),
            };
            keyboard.push(vec![InlineKeyboardButton::callback(
                label,
                CallbackData::Event {
                    action: EventAction::Details,
                    event_id: event.id,
                }
                .encode(),
            )]);
        }
        format!("📅 События на {date}:")
    };

    if viewer_is_admin {
        keyboard.push(vec![InlineKeyboardButton::callback(
            "➕ Создать событие",
            CallbackData::CreateOnDate(date).encode(),
        )]);
    }
    keyboard.push(vec![InlineKeyboardButton::callback(
        "🔙 Назад к календарю",
        CallbackData::navigate_to(date).encode(),
    )]);

    (text, InlineKeyboardMarkup::new(keyboard))
}

/// The single-event view. Admins see the full roster, everyone else a count
/// (capped form when a limit is set). Action rows depend on role and on the
/// viewer's registration state.
pub fn event_detail(
    detail: &EventDetail,
    viewer_is_admin: bool,
    roster: &[RosterEntry],
    origin: Origin,
) -> (String, InlineKeyboardMarkup) {
    let participants_text = if viewer_is_admin {
        let lines: Vec<String> = roster.iter().map(roster_line).collect();
        format!("👥 Участники:\n{}", lines.join("\n"))
    } else if detail.max_participants > 0 {
        format!(
            "👥 Записано: {}/{}",
            detail.participant_count, detail.max_participants
        )
    } else {
        format!("👥 Записано: {}", detail.participant_count)
    };

    let text = format!(
        "🏷 Название: {}\n📅 Дата: {}\n⏰ Время: {}\n📄 Описание: {}\n{}",
        detail.name,
        detail.date,
        detail.time.as_deref().unwrap_or("Не указано"),
        detail.description,
        participants_text
    );

    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    if detail.viewer_registered {
        keyboard.push(vec![InlineKeyboardButton::callback(
            "❌ Отменить запись",
            CallbackData::Event {
                action: EventAction::Leave,
                event_id: detail.id,
            }
            .encode(),
        )]);
    } else if detail.has_free_slot() {
        keyboard.push(vec![InlineKeyboardButton::callback(
            "✅ Записаться",
            CallbackData::Event {
                action: EventAction::Join,
                event_id: detail.id,
            }
            .encode(),
        )]);
    }

    if viewer_is_admin {
        keyboard.push(vec![
            InlineKeyboardButton::callback("✏️ Редактировать", CallbackData::Edit(detail.id).encode()),
            InlineKeyboardButton::callback("🗑 Удалить", CallbackData::Delete(detail.id).encode()),
        ]);
    }

    // Back target mirrors how the viewer arrived: the collapsed short-circuit
    // returns to the grid of the event's own month, the list path to the list.
    let back = match origin {
        Origin::Grid => InlineKeyboardButton::callback(
            "🔙 Назад к календарю",
            CallbackData::navigate_to(detail.date).encode(),
        ),
        Origin::List => InlineKeyboardButton::callback(
            "🔙 Назад",
            CallbackData::ViewDate(detail.date).encode(),
        ),
    };
    keyboard.push(vec![back]);

    (text, InlineKeyboardMarkup::new(keyboard))
}

/// Field-choice keyboard of the edit wizard.
pub fn edit_menu(event_id: i64) -> (String, InlineKeyboardMarkup) {
    let keyboard = vec![
        vec![
            InlineKeyboardButton::callback("Название", CallbackData::EditField(EditField::Name).encode()),
            InlineKeyboardButton::callback(
                "Описание",
                CallbackData::EditField(EditField::Description).encode(),
            ),
        ],
        vec![
            InlineKeyboardButton::callback("Дату", CallbackData::EditField(EditField::Date).encode()),
            InlineKeyboardButton::callback("Время", CallbackData::EditField(EditField::Time).encode()),
        ],
        vec![
            InlineKeyboardButton::callback(
                "Участников",
                CallbackData::EditField(EditField::MaxParticipants).encode(),
            ),
            InlineKeyboardButton::callback("Удалить", CallbackData::Delete(event_id).encode()),
        ],
        vec![InlineKeyboardButton::callback("Отмена", CallbackData::CancelEdit.encode())],
    ];
    (
        "✏️ Выберите что редактировать:".to_string(),
        InlineKeyboardMarkup::new(keyboard),
    )
}

/// Delete requires an explicit affirmative press.
pub fn confirm_delete() -> (String, InlineKeyboardMarkup) {
    let keyboard = vec![vec![
        InlineKeyboardButton::callback("Да", CallbackData::ConfirmDelete.encode()),
        InlineKeyboardButton::callback("Нет", CallbackData::CancelDelete.encode()),
    ]];
    (
        "❌ Вы уверены что хотите удалить событие?".to_string(),
        InlineKeyboardMarkup::new(keyboard),
    )
}

/// After a single-field commit: back to the event's current date. The date is
/// re-read after the write, so a date edit points at the new month.
pub fn back_to_event(date: NaiveDate) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "🔙 К событию",
        CallbackData::ViewDate(date).encode(),
    )]])
}

/// Administrator menu: the roster with the numeric identity always shown.
pub fn admin_menu(admins: &[AdminInfo]) -> (String, InlineKeyboardMarkup) {
    let mut text = "👑 Список администраторов:\n\n".to_string();
    for admin in admins {
        text.push_str(&format!(
            "• {} (ID: {})\n",
            admin.display_name(),
            admin.user_id
        ));
    }

    let keyboard = vec![
        vec![
            InlineKeyboardButton::callback("➕ Добавить", CallbackData::Admin(AdminAction::Add).encode()),
            InlineKeyboardButton::callback(
                "➖ Удалить",
                CallbackData::Admin(AdminAction::Remove).encode(),
            ),
        ],
        vec![InlineKeyboardButton::callback(
            "❌ Закрыть",
            CallbackData::Admin(AdminAction::Close).encode(),
        )],
    ];
    (text, InlineKeyboardMarkup::new(keyboard))
}

/// Add picker: every known user, two per row. Already-admin users are listed
/// too; the redundant add is rejected at write time.
pub fn admin_add_picker(users: &[User]) -> (String, InlineKeyboardMarkup) {
    if users.is_empty() {
        return (
            "❌ Нет зарегистрированных пользователей".to_string(),
            InlineKeyboardMarkup::new(vec![back_to_admin_menu_row()]),
        );
    }

    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    for pair in users.chunks(2) {
        keyboard.push(
            pair.iter()
                .map(|user| {
                    InlineKeyboardButton::callback(
                        user.display_name(),
                        CallbackData::AddAdmin(user.user_id).encode(),
                    )
                })
                .collect(),
        );
    }
    keyboard.push(back_to_admin_menu_row());

    (
        "Выберите пользователя из списка:".to_string(),
        InlineKeyboardMarkup::new(keyboard),
    )
}

/// Remove picker: current admins, one per row.
pub fn admin_remove_picker(admins: &[AdminInfo]) -> (String, InlineKeyboardMarkup) {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = admins
        .iter()
        .map(|admin| {
            vec![InlineKeyboardButton::callback(
                format!("❌ {}", admin.display_name()),
                CallbackData::RemoveAdmin(admin.user_id).encode(),
            )]
        })
        .collect();
    keyboard.push(back_to_admin_menu_row());

    (
        "Выберите администратора для удаления:".to_string(),
        InlineKeyboardMarkup::new(keyboard),
    )
}

/// The common "return" target from every admin sub-view.
pub fn back_to_admin_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![back_to_admin_menu_row()])
}

fn back_to_admin_menu_row() -> Vec<InlineKeyboardButton> {
    vec![InlineKeyboardButton::callback(
        "🔙 Назад",
        CallbackData::Admin(AdminAction::Back).encode(),
    )]
}

/// Roster line fallback chain: handle+phone, name+phone, handle, name.
fn roster_line(entry: &RosterEntry) -> String {
    let username = entry.username.as_deref().filter(|u| !u.is_empty());
    let first_name = entry.first_name.as_deref().unwrap_or("");
    let phone = entry.phone.as_deref().filter(|p| !p.is_empty());
    match (username, phone) {
        (Some(un), Some(ph)) => format!("• @{un} ({ph})"),
        (None, Some(ph)) => format!("• {first_name} ({ph})"),
        (Some(un), None) => format!("• @{un}"),
        (None, None) => format!("• {first_name}"),
    }
}

/// Char-safe truncation; event names can be arbitrary UTF-8.
fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
