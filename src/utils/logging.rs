use tracing::{error, info, warn};

/// Logs an inbound command with consistent format
pub fn log_command(command: &str, user: &str, user_id: i64) {
    info!("CMD: {} by {}({})", command, user, user_id);
}

/// Logs an inbound callback token with consistent format
pub fn log_callback(token: &str, user: &str, user_id: i64) {
    info!("CALLBACK: '{}' by {}({})", token, user, user_id);
}

/// Logs callback handling failures with the offending token for diagnosis
pub fn log_callback_error(token: &str, user_id: i64, error: &str) {
    error!("CALLBACK_ERROR: '{}' by user {} - {}", token, user_id, error);
}

/// Logs wizard transitions with consistent format
pub fn log_wizard_step(wizard: &str, step: &str, user_id: i64) {
    info!("WIZARD: {} at '{}' for user {}", wizard, step, user_id);
}

/// Logs rejected admin-only attempts with consistent format
pub fn log_denied(action: &str, user_id: i64) {
    warn!("DENIED: {} attempted by non-admin {}", action, user_id);
}

/// Logs per-recipient notification failures; the fan-out loop continues
pub fn log_notify_failure(user_id: i64, event_id: i64, error: &str) {
    error!(
        "NOTIFY_ERROR: user {} for event {} - {}",
        user_id, event_id, error
    );
}
