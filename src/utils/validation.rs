use anyhow::{anyhow, Result};
use chrono::NaiveTime;

/// Wizard gate: event names must be non-empty after trimming.
pub fn validate_event_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("❌ Название не может быть пустым!"));
    }
    Ok(name.to_string())
}

/// Wizard gate: descriptions must be non-empty after trimming.
pub fn validate_event_description(description: &str) -> Result<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(anyhow!("❌ Описание не может быть пустым!"));
    }
    Ok(description.to_string())
}

/// Wizard gate: a 24-hour HH:MM value, echoed back in canonical form.
pub fn validate_event_time(time: &str) -> Result<String> {
    let time = time.trim();
    let parsed = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| anyhow!("❌ Неверный формат времени. Используйте ЧЧ:ММ (например 14:30)"))?;
    Ok(parsed.format("%H:%M").to_string())
}

/// Wizard gate: max participants is a non-negative integer, 0 = unlimited.
pub fn validate_max_participants(input: &str) -> Result<i64> {
    input
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n >= 0)
        .ok_or_else(|| anyhow!("❌ Введите целое число больше или равное 0"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_event_name() {
        assert_eq!(validate_event_name("  Standup  ").unwrap(), "Standup");
        assert!(validate_event_name("").is_err());
        assert!(validate_event_name("   ").is_err());
        assert!(validate_event_name("\t\n").is_err());
    }

    #[test]
    fn test_validate_event_description() {
        assert_eq!(validate_event_description(" daily ").unwrap(), "daily");
        assert!(validate_event_description("   ").is_err());
    }

    #[test]
    fn test_validate_event_time() {
        assert_eq!(validate_event_time("09:30").unwrap(), "09:30");
        assert_eq!(validate_event_time(" 23:59 ").unwrap(), "23:59");
        assert_eq!(validate_event_time("0:05").unwrap(), "00:05");
        assert!(validate_event_time("24:00").is_err());
        assert!(validate_event_time("12:60").is_err());
        assert!(validate_event_time("noon").is_err());
        assert!(validate_event_time("").is_err());
    }

    #[test]
    fn test_validate_max_participants() {
        assert_eq!(validate_max_participants("0").unwrap(), 0);
        assert_eq!(validate_max_participants(" 25 ").unwrap(), 25);
        assert!(validate_max_participants("-1").is_err());
        assert!(validate_max_participants("three").is_err());
        assert!(validate_max_participants("2.5").is_err());
        assert!(validate_max_participants("").is_err());
    }
}
