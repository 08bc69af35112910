use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Команды бота:")]
pub enum Command {
    #[command(description = "Начать работу с ботом")]
    Start,
    #[command(description = "Помощь и список команд")]
    Help,
    #[command(description = "Просмотр событий")]
    Events,
    #[command(description = "Создать событие (админ)")]
    AddEvent,
    #[command(description = "Меню админов")]
    Admins,
    #[command(description = "Отменить действие")]
    Cancel,
}

/// /help body, mirroring the registered command menu.
pub const HELP_TEXT: &str = "📖 Доступные команды:\n\n\
/start - Начать работу с ботом\n\
/help - Показать это сообщение\n\
/events - Просмотреть доступные события\n\
/cancel - Отменить текущее действие\n\n\
⚙️ Админ-команды:\n\
/addevent - Создать новое событие\n\
/admins - Управление администраторами";
