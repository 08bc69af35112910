//! # Event Calendar Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database, seeds the
//! initial administrator, starts the notification service, and runs the
//! Telegram bot dispatcher.

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use event_calendar_bot::bot::commands::Command;
use event_calendar_bot::bot::handlers::BotHandler;
use event_calendar_bot::config::Config;
use event_calendar_bot::database::connection::DatabaseManager;
use event_calendar_bot::database::models::Admin;
use event_calendar_bot::services::notifier::NotificationService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "event_calendar_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Event Calendar Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, Timezone: {}, Notify time: {}",
        config.database_url,
        config.timezone,
        config.notify_time.format("%H:%M")
    );

    // Initialize database
    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db_arc = Arc::new(db_manager);
    info!("Database initialized successfully");

    if let Some(admin_id) = config.seed_admin_id {
        Admin::seed(&db_arc.pool, admin_id).await?;
    }

    // Initialize bot
    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.telegram_bot_token);
    bot.set_my_commands(Command::bot_commands()).await?;
    let handler = BotHandler::new(db_arc.as_ref().clone());
    info!("Telegram bot initialized successfully");

    // Initialize and start notification service
    info!("Initializing notification service...");
    let mut notification_service = match NotificationService::new(
        bot.clone(),
        db_arc.clone(),
        config.timezone,
        config.notify_time,
    )
    .await
    {
        Ok(service) => {
            info!("Notification service initialized successfully");
            service
        }
        Err(e) => {
            tracing::error!("Failed to create notification service: {}", e);
            return Err(anyhow::anyhow!("Failed to create notification service: {}", e));
        }
    };

    if let Err(e) = notification_service.start().await {
        tracing::error!("Failed to start notification service: {}", e);
    } else {
        info!("Notification service started successfully");
    }

    Dispatcher::builder(bot, handler.schema())
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    // Stop notification service on shutdown
    if let Err(e) = notification_service.stop().await {
        tracing::warn!("Error stopping notification service: {}", e);
    }

    info!("Application stopped");
    Ok(())
}
