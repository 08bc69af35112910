use anyhow::Result;
use chrono::NaiveDate;
use teloxide::prelude::*;
use teloxide::types::InlineKeyboardMarkup;
use teloxide::{ApiError, RequestError};

use crate::bot::callback_data::{AdminAction, CallbackData, EditField, EventAction};
use crate::bot::views::Origin;
use crate::bot::wizard::{CreateStep, SessionStore, WizardState};
use crate::bot::{calendar, views};
use crate::database::connection::DatabaseManager;
use crate::database::models::{Admin, Event, JoinOutcome, Participant, User};
use crate::utils::logging::{log_callback, log_callback_error, log_denied, log_wizard_step};

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    db: DatabaseManager,
    sessions: SessionStore,
) -> ResponseResult<()> {
    let user_id = q.from.id.0 as i64;
    let data = q.data.clone().unwrap_or_default();
    log_callback(&data, &q.from.first_name, user_id);

    if let Err(e) = handle_callback(&bot, &q, &data, &db, &sessions).await {
        log_callback_error(&data, user_id, &e.to_string());
        bot.answer_callback_query(q.id.clone())
            .text("⚠️ Произошла ошибка")
            .await?;
    }
    Ok(())
}

async fn handle_callback(
    bot: &Bot,
    q: &CallbackQuery,
    data: &str,
    db: &DatabaseManager,
    sessions: &SessionStore,
) -> Result<()> {
    let user = &q.from;
    let user_id = user.id.0 as i64;
    User::upsert(
        &db.pool,
        user_id,
        &user.first_name,
        user.last_name.as_deref().unwrap_or(""),
        user.username.as_deref(),
    )
    .await?;

    // Decode once at the boundary; anything unrecognized is a stale or
    // malformed button and gets a harmless toast.
    let token = match CallbackData::parse(data) {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!("Rejected callback token: {}", e);
            answer(bot, q, Some("⚠️ Неизвестное действие")).await?;
            return Ok(());
        }
    };

    match token {
        CallbackData::Ignore => answer(bot, q, None).await?,

        CallbackData::Navigate { year, month } => {
            answer(bot, q, None).await?;
            // Inside a date-picking wizard step the grid is rendered without
            // the viewer's participation marks, as a plain picker.
            let markup = match sessions.get(user_id) {
                Some(WizardState::CreateEvent(draft))
                    if draft.next_step() == CreateStep::Date =>
                {
                    calendar::build_for(&db.pool, year, month, None).await?
                }
                Some(WizardState::EditEvent {
                    field: Some(EditField::Date),
                    ..
                }) => calendar::build_for(&db.pool, year, month, None).await?,
                _ => calendar::build_for(&db.pool, year, month, Some(user_id)).await?,
            };
            edit_view(bot, q, "Выберите дату:", Some(markup)).await?;
        }

        CallbackData::ViewDate(date) => {
            answer(bot, q, None).await?;
            match sessions.get(user_id) {
                Some(WizardState::CreateEvent(mut draft))
                    if draft.next_step() == CreateStep::Date =>
                {
                    let step = draft.set_date(date);
                    sessions.set(user_id, WizardState::CreateEvent(draft));
                    log_wizard_step("create", &format!("{step:?}"), user_id);
                    edit_view(bot, q, step.prompt(), None).await?;
                }
                Some(WizardState::EditEvent {
                    event_id,
                    field: Some(EditField::Date),
                }) => {
                    commit_date_edit(bot, q, db, sessions, user_id, event_id, date).await?;
                }
                _ => show_date(bot, q, db, date, user_id).await?,
            }
        }

        CallbackData::CreateOnDate(date) => {
            if !require_admin(bot, q, db, user_id, "create event").await? {
                return Ok(());
            }
            answer(bot, q, None).await?;
            sessions.begin(
                user_id,
                WizardState::CreateEvent(crate::bot::wizard::EventDraft::with_date(date)),
            );
            log_wizard_step("create", "Name", user_id);
            edit_view(bot, q, CreateStep::Name.prompt(), None).await?;
        }

        CallbackData::Event { action, event_id } => match action {
            EventAction::Details => {
                answer(bot, q, None).await?;
                render_detail(bot, q, db, event_id, user_id, Origin::List).await?;
            }
            EventAction::Join => join_event(bot, q, db, event_id, user_id).await?,
            EventAction::Leave => leave_event(bot, q, db, event_id, user_id).await?,
        },

        CallbackData::Edit(event_id) => {
            if !require_admin(bot, q, db, user_id, "edit event").await? {
                return Ok(());
            }
            if Event::find_by_id(&db.pool, event_id).await?.is_none() {
                answer(bot, q, None).await?;
                edit_view(bot, q, "Событие не найдено", None).await?;
                return Ok(());
            }
            answer(bot, q, None).await?;
            sessions.begin(user_id, WizardState::EditEvent { event_id, field: None });
            let (text, markup) = views::edit_menu(event_id);
            edit_view(bot, q, &text, Some(markup)).await?;
        }

        CallbackData::EditField(field) => {
            let Some(WizardState::EditEvent { event_id, field: None }) = sessions.get(user_id)
            else {
                // Stale button from a finished wizard.
                answer(bot, q, Some("⚠️ Нет активного редактирования")).await?;
                return Ok(());
            };
            answer(bot, q, None).await?;
            sessions.set(user_id, WizardState::EditEvent { event_id, field: Some(field) });
            log_wizard_step("edit", &format!("choice {field:?}"), user_id);
            match field {
                EditField::Name => edit_view(bot, q, "📝 Введите новое название:", None).await?,
                EditField::Description => {
                    edit_view(bot, q, "📄 Введите новое описание:", None).await?
                }
                EditField::Time => edit_view(bot, q, "⏰ Введите новое время (ЧЧ:ММ):", None).await?,
                EditField::MaxParticipants => {
                    edit_view(bot, q, "👥 Введите новое макс. количество участников:", None).await?
                }
                EditField::Date => {
                    let (year, month) = calendar::current_month();
                    let markup = calendar::build_for(&db.pool, year, month, None).await?;
                    edit_view(bot, q, "📅 Выберите новую дату:", Some(markup)).await?;
                }
            }
        }

        CallbackData::Delete(event_id) => {
            if !require_admin(bot, q, db, user_id, "delete event").await? {
                return Ok(());
            }
            answer(bot, q, None).await?;
            sessions.begin(user_id, WizardState::ConfirmDelete { event_id });
            let (text, markup) = views::confirm_delete();
            edit_view(bot, q, &text, Some(markup)).await?;
        }

        CallbackData::ConfirmDelete => {
            let Some(WizardState::ConfirmDelete { event_id }) = sessions.get(user_id) else {
                answer(bot, q, Some("⚠️ Нет активного удаления")).await?;
                return Ok(());
            };
            answer(bot, q, None).await?;
            Event::delete(&db.pool, event_id).await?;
            sessions.clear(user_id);
            log_wizard_step("delete", "committed", user_id);
            edit_view(bot, q, "🗑 Событие успешно удалено!", None).await?;
        }

        CallbackData::CancelDelete => {
            match sessions.get(user_id) {
                Some(WizardState::ConfirmDelete { .. }) => {
                    sessions.clear(user_id);
                    answer(bot, q, None).await?;
                    edit_view(bot, q, "❌ Удаление отменено", None).await?;
                }
                _ => answer(bot, q, Some("⚠️ Нет активного удаления")).await?,
            }
        }

        CallbackData::CancelEdit => {
            match sessions.get(user_id) {
                Some(WizardState::EditEvent { .. }) | Some(WizardState::ConfirmDelete { .. }) => {
                    sessions.clear(user_id);
                    answer(bot, q, None).await?;
                    edit_view(bot, q, "✖️ Редактирование отменено", None).await?;
                }
                _ => answer(bot, q, Some("⚠️ Нет активного редактирования")).await?,
            }
        }

        CallbackData::Admin(action) => {
            if !require_admin(bot, q, db, user_id, "admin menu").await? {
                return Ok(());
            }
            answer(bot, q, None).await?;
            match action {
                AdminAction::Add => {
                    let users = User::all(&db.pool).await?;
                    let (text, markup) = views::admin_add_picker(&users);
                    edit_view(bot, q, &text, Some(markup)).await?;
                }
                AdminAction::Remove => {
                    let admins = Admin::list_with_info(&db.pool).await?;
                    let (text, markup) = views::admin_remove_picker(&admins);
                    edit_view(bot, q, &text, Some(markup)).await?;
                }
                AdminAction::Back => {
                    let admins = Admin::list_with_info(&db.pool).await?;
                    let (text, markup) = views::admin_menu(&admins);
                    edit_view(bot, q, &text, Some(markup)).await?;
                }
                AdminAction::Close => {
                    if let Some(message) = q.message.as_ref() {
                        bot.delete_message(message.chat.id, message.id).await?;
                    }
                }
            }
        }

        CallbackData::AddAdmin(target_id) => {
            if !require_admin(bot, q, db, user_id, "add admin").await? {
                return Ok(());
            }
            answer(bot, q, None).await?;
            // Listed users may already be admins; the redundant add is
            // rejected here with a warning instead of being filtered out.
            if Admin::is_admin(&db.pool, target_id).await? {
                edit_view(
                    bot,
                    q,
                    "⚠️ Этот пользователь уже администратор!",
                    Some(views::back_to_admin_menu()),
                )
                .await?;
                return Ok(());
            }
            Admin::add(&db.pool, target_id).await?;
            let name = match User::find_by_id(&db.pool, target_id).await? {
                Some(target) => target.display_name(),
                None => format!("ID: {target_id}"),
            };
            edit_view(
                bot,
                q,
                &format!("✅ {name} успешно добавлен в администраторы!"),
                Some(views::back_to_admin_menu()),
            )
            .await?;
        }

        CallbackData::RemoveAdmin(target_id) => {
            if !require_admin(bot, q, db, user_id, "remove admin").await? {
                return Ok(());
            }
            answer(bot, q, None).await?;
            Admin::remove(&db.pool, target_id).await?;
            edit_view(
                bot,
                q,
                &format!("✅ Администратор {target_id} удален!"),
                Some(views::back_to_admin_menu()),
            )
            .await?;
        }
    }

    Ok(())
}

/// Date cell pressed: list the date's events, or jump straight to the single
/// event when the list would have exactly one row.
async fn show_date(
    bot: &Bot,
    q: &CallbackQuery,
    db: &DatabaseManager,
    date: NaiveDate,
    viewer_id: i64,
) -> Result<()> {
    let events = Event::for_date(&db.pool, date).await?;
    if events.len() == 1 {
        return render_detail(bot, q, db, events[0].id, viewer_id, Origin::Grid).await;
    }

    let viewer_is_admin = Admin::is_admin(&db.pool, viewer_id).await?;
    let (text, markup) = views::date_list(date, &events, viewer_is_admin);
    edit_view(bot, q, &text, Some(markup)).await
}

async fn render_detail(
    bot: &Bot,
    q: &CallbackQuery,
    db: &DatabaseManager,
    event_id: i64,
    viewer_id: i64,
    origin: Origin,
) -> Result<()> {
    let Some(detail) = Event::detail(&db.pool, event_id, viewer_id).await? else {
        edit_view(bot, q, "Событие не найдено", None).await?;
        return Ok(());
    };
    let viewer_is_admin = Admin::is_admin(&db.pool, viewer_id).await?;
    let roster = if viewer_is_admin {
        Participant::roster(&db.pool, event_id).await?
    } else {
        Vec::new()
    };
    let (text, markup) = views::event_detail(&detail, viewer_is_admin, &roster, origin);
    edit_view(bot, q, &text, Some(markup)).await
}

async fn join_event(
    bot: &Bot,
    q: &CallbackQuery,
    db: &DatabaseManager,
    event_id: i64,
    viewer_id: i64,
) -> Result<()> {
    let Some(detail) = Event::detail(&db.pool, event_id, viewer_id).await? else {
        answer(bot, q, None).await?;
        edit_view(bot, q, "Событие не найдено", None).await?;
        return Ok(());
    };

    // The store decides atomically; the button may be stale either way.
    match Participant::add(&db.pool, event_id, viewer_id).await? {
        JoinOutcome::Joined => answer(bot, q, Some("✅ Вы успешно записались!")).await?,
        JoinOutcome::AlreadyRegistered => answer(bot, q, Some("⚠️ Вы уже записаны")).await?,
        JoinOutcome::Full => answer(bot, q, Some("⚠️ Свободных мест больше нет")).await?,
    }

    rerender_after_mutation(bot, q, db, event_id, viewer_id, detail.date).await
}

async fn leave_event(
    bot: &Bot,
    q: &CallbackQuery,
    db: &DatabaseManager,
    event_id: i64,
    viewer_id: i64,
) -> Result<()> {
    let Some(detail) = Event::detail(&db.pool, event_id, viewer_id).await? else {
        answer(bot, q, None).await?;
        edit_view(bot, q, "Событие не найдено", None).await?;
        return Ok(());
    };

    Participant::remove(&db.pool, event_id, viewer_id).await?;
    answer(bot, q, Some("✅ Запись отменена")).await?;

    rerender_after_mutation(bot, q, db, event_id, viewer_id, detail.date).await
}

/// Re-fetch and re-render after a participant change so the shown count is
/// never stale. The back target is recomputed the same way the viewer would
/// reach the view now.
async fn rerender_after_mutation(
    bot: &Bot,
    q: &CallbackQuery,
    db: &DatabaseManager,
    event_id: i64,
    viewer_id: i64,
    date: NaiveDate,
) -> Result<()> {
    let siblings = Event::for_date(&db.pool, date).await?;
    let origin = if siblings.len() == 1 { Origin::Grid } else { Origin::List };
    render_detail(bot, q, db, event_id, viewer_id, origin).await
}

async fn commit_date_edit(
    bot: &Bot,
    q: &CallbackQuery,
    db: &DatabaseManager,
    sessions: &SessionStore,
    user_id: i64,
    event_id: i64,
    date: NaiveDate,
) -> Result<()> {
    answer(bot, q, None).await?;
    if Event::find_by_id(&db.pool, event_id).await?.is_none() {
        sessions.clear(user_id);
        edit_view(bot, q, "Событие не найдено", None).await?;
        return Ok(());
    }
    Event::set_date(&db.pool, event_id, date).await?;
    sessions.clear(user_id);
    log_wizard_step("edit", "Date", user_id);
    edit_view(bot, q, "✅ Дата обновлена!", None).await?;
    if let Some(message) = q.message.as_ref() {
        bot.send_message(message.chat.id, "🔙 К событию:")
            .reply_markup(views::back_to_event(date))
            .await?;
    }
    Ok(())
}

/// Authorization gate for admin-only actions; rejects with a visible alert
/// and terminates the flow.
async fn require_admin(
    bot: &Bot,
    q: &CallbackQuery,
    db: &DatabaseManager,
    user_id: i64,
    action: &str,
) -> Result<bool> {
    if Admin::is_admin(&db.pool, user_id).await? {
        return Ok(true);
    }
    log_denied(action, user_id);
    bot.answer_callback_query(q.id.clone())
        .text("⛔ Доступ запрещён!")
        .show_alert(true)
        .await?;
    Ok(false)
}

async fn answer(bot: &Bot, q: &CallbackQuery, text: Option<&str>) -> Result<()> {
    let request = bot.answer_callback_query(q.id.clone());
    match text {
        Some(text) => request.text(text).await?,
        None => request.await?,
    };
    Ok(())
}

/// Replaces the message the pressed button was attached to. Telegram rejects
/// an edit that would not change anything; identical re-renders are fine.
async fn edit_view(
    bot: &Bot,
    q: &CallbackQuery,
    text: &str,
    markup: Option<InlineKeyboardMarkup>,
) -> Result<()> {
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let request = bot.edit_message_text(message.chat.id, message.id, text);
    let result = match markup {
        Some(markup) => request.reply_markup(markup).await,
        None => request.await,
    };
    match result {
        Ok(_) => Ok(()),
        Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
