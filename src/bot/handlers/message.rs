use anyhow::{anyhow, Result};
use teloxide::prelude::*;
use teloxide::types::{ButtonRequest, KeyboardButton, KeyboardMarkup, KeyboardRemove};

use crate::bot::callback_data::EditField;
use crate::bot::commands::{Command, HELP_TEXT};
use crate::bot::wizard::{CreateStep, EventDraft, SessionStore, WizardState};
use crate::bot::{calendar, views};
use crate::database::connection::DatabaseManager;
use crate::database::models::{Admin, Event, User};
use crate::utils::logging::{log_command, log_denied, log_wizard_step};
use crate::utils::validation::{
    validate_event_description, validate_event_name, validate_event_time,
    validate_max_participants,
};

const WELCOME_TEXT: &str = "Привет! Я бот для управления событиями.\n\
Админы могут создавать события через /addevent\n\
Все пользователи могут просматривать и записываться на события через /events";

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    db: DatabaseManager,
    sessions: SessionStore,
) -> ResponseResult<()> {
    if let Err(e) = handle_command(&bot, &msg, &cmd, &db, &sessions).await {
        tracing::error!("Command {:?} failed: {}", cmd, e);
        bot.send_message(msg.chat.id, "⚠️ Произошла ошибка").await?;
    }
    Ok(())
}

async fn handle_command(
    bot: &Bot,
    msg: &Message,
    cmd: &Command,
    db: &DatabaseManager,
    sessions: &SessionStore,
) -> Result<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    upsert_sender(db, user).await?;
    log_command(&format!("{cmd:?}"), &user.first_name, user_id);

    // A command always interrupts whatever wizard the user abandoned, so the
    // next flow starts from a clean draft.
    sessions.clear(user_id);

    match cmd {
        Command::Start => start(bot, msg, user_id, db, sessions).await?,
        Command::Help => {
            bot.send_message(msg.chat.id, HELP_TEXT).await?;
        }
        Command::Events => {
            let (year, month) = calendar::current_month();
            let markup = calendar::build_for(&db.pool, year, month, Some(user_id)).await?;
            bot.send_message(msg.chat.id, "Выберите дату для просмотра событий:")
                .reply_markup(markup)
                .await?;
        }
        Command::AddEvent => {
            if !Admin::is_admin(&db.pool, user_id).await? {
                log_denied("addevent", user_id);
                bot.send_message(msg.chat.id, "⛔ У вас нет прав для создания событий!")
                    .await?;
                return Ok(());
            }
            sessions.begin(user_id, WizardState::CreateEvent(EventDraft::new()));
            log_wizard_step("create", "date", user_id);
            let (year, month) = calendar::current_month();
            let markup = calendar::build_for(&db.pool, year, month, None).await?;
            bot.send_message(msg.chat.id, CreateStep::Date.prompt())
                .reply_markup(markup)
                .await?;
        }
        Command::Admins => {
            if !Admin::is_admin(&db.pool, user_id).await? {
                log_denied("admins", user_id);
                bot.send_message(msg.chat.id, "⛔ У вас нет прав доступа к этому меню!")
                    .await?;
                return Ok(());
            }
            let admins = Admin::list_with_info(&db.pool).await?;
            let (text, markup) = views::admin_menu(&admins);
            bot.send_message(msg.chat.id, text).reply_markup(markup).await?;
        }
        Command::Cancel => {
            bot.send_message(msg.chat.id, "Действие отменено")
                .reply_markup(KeyboardRemove::new())
                .await?;
        }
    }
    Ok(())
}

/// Onboarding gate: without a phone on file the user is parked in the
/// awaiting-contact state; with one, /start goes straight to the welcome.
async fn start(
    bot: &Bot,
    msg: &Message,
    user_id: i64,
    db: &DatabaseManager,
    sessions: &SessionStore,
) -> Result<()> {
    if User::phone(&db.pool, user_id).await?.is_none() {
        sessions.begin(user_id, WizardState::AwaitingContact);
        let button = KeyboardButton::new("📱 Поделиться контактом").request(ButtonRequest::Contact);
        let markup = KeyboardMarkup::new(vec![vec![button]]).one_time_keyboard(true);
        bot.send_message(
            msg.chat.id,
            "Для использования бота необходимо поделиться контактом:",
        )
        .reply_markup(markup)
        .await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, WELCOME_TEXT)
        .reply_markup(KeyboardRemove::new())
        .await?;
    Ok(())
}

pub async fn contact_handler(
    bot: Bot,
    msg: Message,
    db: DatabaseManager,
    sessions: SessionStore,
) -> ResponseResult<()> {
    if let Err(e) = handle_contact(&bot, &msg, &db, &sessions).await {
        tracing::error!("Contact intake failed: {}", e);
        bot.send_message(msg.chat.id, "⚠️ Произошла ошибка").await?;
    }
    Ok(())
}

async fn handle_contact(
    bot: &Bot,
    msg: &Message,
    db: &DatabaseManager,
    sessions: &SessionStore,
) -> Result<()> {
    let (Some(user), Some(contact)) = (msg.from(), msg.contact()) else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    upsert_sender(db, user).await?;
    User::set_phone(&db.pool, user_id, &contact.phone_number).await?;
    sessions.clear(user_id);

    bot.send_message(msg.chat.id, "✅ Спасибо! Теперь вы можете использовать бота.")
        .reply_markup(KeyboardRemove::new())
        .await?;
    bot.send_message(msg.chat.id, WELCOME_TEXT).await?;
    Ok(())
}

pub async fn text_handler(
    bot: Bot,
    msg: Message,
    db: DatabaseManager,
    sessions: SessionStore,
) -> ResponseResult<()> {
    if let Err(e) = handle_text(&bot, &msg, &db, &sessions).await {
        tracing::error!("Text step failed: {}", e);
        bot.send_message(msg.chat.id, "⚠️ Произошла ошибка").await?;
    }
    Ok(())
}

/// Free text is meaningful only as a wizard step; outside a wizard it gets
/// the fallback reply.
async fn handle_text(
    bot: &Bot,
    msg: &Message,
    db: &DatabaseManager,
    sessions: &SessionStore,
) -> Result<()> {
    let (Some(user), Some(text)) = (msg.from(), msg.text()) else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    upsert_sender(db, user).await?;

    match sessions.get(user_id) {
        Some(WizardState::CreateEvent(mut draft)) => {
            match draft.fill_text(text) {
                Err(e) => {
                    // Validation failed: same step, corrective reply.
                    bot.send_message(msg.chat.id, e.to_string()).await?;
                }
                Ok(CreateStep::Ready) => {
                    commit_draft(db, user_id, draft).await?;
                    sessions.clear(user_id);
                    log_wizard_step("create", "committed", user_id);
                    bot.send_message(msg.chat.id, CreateStep::Ready.prompt()).await?;
                }
                Ok(step) => {
                    sessions.set(user_id, WizardState::CreateEvent(draft));
                    log_wizard_step("create", &format!("{step:?}"), user_id);
                    bot.send_message(msg.chat.id, step.prompt()).await?;
                }
            }
        }
        Some(WizardState::EditEvent {
            event_id,
            field: Some(field),
        }) => {
            apply_text_edit(bot, msg, db, sessions, user_id, event_id, field, text).await?;
        }
        Some(WizardState::EditEvent { field: None, .. }) => {
            bot.send_message(msg.chat.id, "Выберите поле кнопками выше").await?;
        }
        Some(WizardState::ConfirmDelete { .. }) => {
            bot.send_message(msg.chat.id, "Подтвердите удаление кнопками выше")
                .await?;
        }
        Some(WizardState::AwaitingContact) => {
            bot.send_message(
                msg.chat.id,
                "Для использования бота необходимо поделиться контактом:",
            )
            .await?;
        }
        None => {
            bot.send_message(
                msg.chat.id,
                "Я не понимаю текстовые сообщения. Используйте команды из меню.",
            )
            .await?;
        }
    }
    Ok(())
}

/// Validates and commits one edited field, then points back at the event's
/// current date (which is the new one when the date itself was edited).
#[allow(clippy::too_many_arguments)]
async fn apply_text_edit(
    bot: &Bot,
    msg: &Message,
    db: &DatabaseManager,
    sessions: &SessionStore,
    user_id: i64,
    event_id: i64,
    field: EditField,
    text: &str,
) -> Result<()> {
    if Event::find_by_id(&db.pool, event_id).await?.is_none() {
        sessions.clear(user_id);
        bot.send_message(msg.chat.id, "Событие не найдено").await?;
        return Ok(());
    }

    let confirmation = match field {
        EditField::Name => match validate_event_name(text) {
            Ok(name) => {
                Event::set_name(&db.pool, event_id, &name).await?;
                "✅ Название обновлено!"
            }
            Err(e) => {
                bot.send_message(msg.chat.id, e.to_string()).await?;
                return Ok(());
            }
        },
        EditField::Description => match validate_event_description(text) {
            Ok(description) => {
                Event::set_description(&db.pool, event_id, &description).await?;
                "✅ Описание обновлено!"
            }
            Err(e) => {
                bot.send_message(msg.chat.id, e.to_string()).await?;
                return Ok(());
            }
        },
        EditField::Time => match validate_event_time(text) {
            Ok(time) => {
                Event::set_time(&db.pool, event_id, &time).await?;
                "✅ Время обновлено!"
            }
            Err(e) => {
                bot.send_message(msg.chat.id, e.to_string()).await?;
                return Ok(());
            }
        },
        EditField::MaxParticipants => match validate_max_participants(text) {
            Ok(max) => {
                Event::set_max_participants(&db.pool, event_id, max).await?;
                "✅ Лимит участников обновлен!"
            }
            Err(e) => {
                bot.send_message(msg.chat.id, e.to_string()).await?;
                return Ok(());
            }
        },
        // The date is picked from the calendar, not typed.
        EditField::Date => {
            bot.send_message(msg.chat.id, "Выберите дату в календаре выше").await?;
            return Ok(());
        }
    };

    let event = Event::find_by_id(&db.pool, event_id)
        .await?
        .ok_or_else(|| anyhow!("event {event_id} vanished during edit"))?;
    sessions.clear(user_id);
    log_wizard_step("edit", &format!("{field:?}"), user_id);
    bot.send_message(msg.chat.id, confirmation)
        .reply_markup(views::back_to_event(event.date))
        .await?;
    Ok(())
}

async fn commit_draft(db: &DatabaseManager, user_id: i64, draft: EventDraft) -> Result<Event> {
    let (Some(date), Some(name), Some(description), Some(time), Some(max)) = (
        draft.date,
        draft.name,
        draft.description,
        draft.time,
        draft.max_participants,
    ) else {
        return Err(anyhow!("draft committed before all steps were filled"));
    };
    let event = Event::create(
        &db.pool,
        date,
        Some(&time),
        &name,
        &description,
        user_id,
        max,
    )
    .await?;
    Ok(event)
}

async fn upsert_sender(db: &DatabaseManager, user: &teloxide::types::User) -> Result<()> {
    User::upsert(
        &db.pool,
        user.id.0 as i64,
        &user.first_name,
        user.last_name.as_deref().unwrap_or(""),
        user.username.as_deref(),
    )
    .await?;
    Ok(())
}
