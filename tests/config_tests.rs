use chrono::NaiveTime;
use event_calendar_bot::config::Config;
use std::env;
use std::sync::Mutex;

// Mutex to ensure config tests run sequentially to avoid environment variable conflicts
static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

fn clear_env() {
    env::remove_var("TELEGRAM_BOT_TOKEN");
    env::remove_var("DATABASE_URL");
    env::remove_var("ADMIN_ID");
    env::remove_var("TIMEZONE");
    env::remove_var("NOTIFY_TIME");
}

#[test]
fn test_config_from_env_with_all_vars() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token_123");
    env::set_var("DATABASE_URL", "sqlite:test.db");
    env::set_var("ADMIN_ID", "424242");
    env::set_var("TIMEZONE", "Europe/Berlin");
    env::set_var("NOTIFY_TIME", "08:30");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "test_token_123");
    assert_eq!(config.database_url, "sqlite:test.db");
    assert_eq!(config.seed_admin_id, Some(424242));
    assert_eq!(config.timezone, chrono_tz::Europe::Berlin);
    assert_eq!(config.notify_time, NaiveTime::from_hms_opt(8, 30, 0).unwrap());

    clear_env();
}

#[test]
fn test_config_from_env_with_defaults() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    // Only set required token, let others use defaults
    env::set_var("TELEGRAM_BOT_TOKEN", "required_token");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "required_token");
    assert_eq!(config.database_url, "sqlite:./data/events.db");
    assert_eq!(config.seed_admin_id, None);
    assert_eq!(config.timezone, chrono_tz::Europe::Moscow);
    assert_eq!(config.notify_time, NaiveTime::from_hms_opt(7, 0, 0).unwrap());

    clear_env();
}

#[test]
fn test_config_missing_required_token() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    let result = Config::from_env();
    assert!(result.is_err());

    let error_msg = result.unwrap_err().to_string();
    assert!(error_msg.contains("TELEGRAM_BOT_TOKEN must be set"));
}

#[test]
fn test_config_empty_values() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    // Empty token (should fail)
    env::set_var("TELEGRAM_BOT_TOKEN", "");
    assert!(Config::from_env().is_err());

    // Valid token with empty database URL and admin id (defaults apply)
    env::set_var("TELEGRAM_BOT_TOKEN", "valid_token");
    env::set_var("DATABASE_URL", "");
    env::set_var("ADMIN_ID", "");
    let config = Config::from_env().unwrap();
    assert_eq!(config.database_url, "sqlite:./data/events.db");
    assert_eq!(config.seed_admin_id, None);

    clear_env();
}

#[test]
fn test_config_invalid_admin_id() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("ADMIN_ID", "not_a_number");

    let result = Config::from_env();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("ADMIN_ID"));

    clear_env();
}

#[test]
fn test_config_invalid_timezone() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("TIMEZONE", "Mars/Olympus_Mons");

    let result = Config::from_env();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("TIMEZONE"));

    clear_env();
}

#[test]
fn test_config_invalid_notify_time() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("NOTIFY_TIME", "25:99");

    let result = Config::from_env();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("NOTIFY_TIME"));

    clear_env();
}

#[test]
fn test_config_whitespace_handling() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "token");
    env::set_var("ADMIN_ID", "  42  ");
    env::set_var("TIMEZONE", "  UTC  ");
    env::set_var("NOTIFY_TIME", "  09:15  ");

    let config = Config::from_env().unwrap();

    assert_eq!(config.seed_admin_id, Some(42));
    assert_eq!(config.timezone, chrono_tz::UTC);
    assert_eq!(config.notify_time, NaiveTime::from_hms_opt(9, 15, 0).unwrap());

    clear_env();
}
