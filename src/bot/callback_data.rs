//! Typed callback-token grammar.
//!
//! Every inline button round-trips one of these tokens. They are decoded
//! exactly once, at the callback boundary; a token that does not parse is
//! answered with a harmless toast instead of reaching any handler.

use anyhow::{anyhow, bail, Result};
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Details,
    Join,
    Leave,
}

/// Field choice inside the edit wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Name,
    Description,
    Time,
    Date,
    MaxParticipants,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Add,
    Remove,
    Close,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackData {
    /// Decorative, non-interactive cell.
    Ignore,
    /// Jump the month grid to an absolute year/month.
    Navigate { year: i32, month: u32 },
    /// Open the event list for an absolute date.
    ViewDate(NaiveDate),
    /// Admin action: start the creation wizard with the date pre-filled.
    CreateOnDate(NaiveDate),
    Event { action: EventAction, event_id: i64 },
    /// Open the edit wizard for an event.
    Edit(i64),
    /// Field choice inside an active edit wizard.
    EditField(EditField),
    /// Ask for delete confirmation.
    Delete(i64),
    ConfirmDelete,
    CancelEdit,
    CancelDelete,
    Admin(AdminAction),
    AddAdmin(i64),
    RemoveAdmin(i64),
}

impl CallbackData {
    pub fn parse(data: &str) -> Result<Self> {
        match data {
            "ignore" => return Ok(Self::Ignore),
            "confirm_delete" => return Ok(Self::ConfirmDelete),
            "cancel_edit" => return Ok(Self::CancelEdit),
            "cancel_delete" => return Ok(Self::CancelDelete),
            "admin_add" => return Ok(Self::Admin(AdminAction::Add)),
            "admin_remove" => return Ok(Self::Admin(AdminAction::Remove)),
            "admin_close" => return Ok(Self::Admin(AdminAction::Close)),
            "admin_back" => return Ok(Self::Admin(AdminAction::Back)),
            _ => {}
        }

        if let Some(payload) = data.strip_prefix("nav_") {
            let (year, month) = payload
                .split_once('-')
                .ok_or_else(|| anyhow!("nav token without year-month: {data}"))?;
            let year: i32 = year.parse()?;
            let month: u32 = month.parse()?;
            if !(1..=12).contains(&month) {
                bail!("nav token with month out of range: {data}");
            }
            return Ok(Self::Navigate { year, month });
        }
        if let Some(payload) = data.strip_prefix("view_") {
            return Ok(Self::ViewDate(parse_date(payload)?));
        }
        if let Some(payload) = data.strip_prefix("create_") {
            return Ok(Self::CreateOnDate(parse_date(payload)?));
        }
        // These come before the event/edit prefixes: "add_admin_5" must not
        // be shadowed by anything shorter.
        if let Some(payload) = data.strip_prefix("add_admin_") {
            return Ok(Self::AddAdmin(payload.parse()?));
        }
        if let Some(payload) = data.strip_prefix("remove_admin_") {
            return Ok(Self::RemoveAdmin(payload.parse()?));
        }
        if let Some(payload) = data.strip_prefix("event_") {
            let (action, event_id) = payload
                .split_once('_')
                .ok_or_else(|| anyhow!("event token without action: {data}"))?;
            let action = match action {
                "details" => EventAction::Details,
                "join" => EventAction::Join,
                "leave" => EventAction::Leave,
                other => bail!("unknown event action '{other}' in token: {data}"),
            };
            return Ok(Self::Event {
                action,
                event_id: event_id.parse()?,
            });
        }
        // "edit_" carries either an event id or a field name.
        if let Some(payload) = data.strip_prefix("edit_") {
            if let Ok(event_id) = payload.parse::<i64>() {
                return Ok(Self::Edit(event_id));
            }
            let field = match payload {
                "name" => EditField::Name,
                "desc" => EditField::Description,
                "time" => EditField::Time,
                "date" => EditField::Date,
                "max" => EditField::MaxParticipants,
                other => bail!("unknown edit field '{other}' in token: {data}"),
            };
            return Ok(Self::EditField(field));
        }
        if let Some(payload) = data.strip_prefix("delete_") {
            return Ok(Self::Delete(payload.parse()?));
        }

        bail!("unrecognized callback token: {data}")
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Ignore => "ignore".to_string(),
            Self::Navigate { year, month } => format!("nav_{year}-{month}"),
            Self::ViewDate(date) => format!("view_{date}"),
            Self::CreateOnDate(date) => format!("create_{date}"),
            Self::Event { action, event_id } => {
                let action = match action {
                    EventAction::Details => "details",
                    EventAction::Join => "join",
                    EventAction::Leave => "leave",
                };
                format!("event_{action}_{event_id}")
            }
            Self::Edit(event_id) => format!("edit_{event_id}"),
            Self::EditField(field) => {
                let field = match field {
                    EditField::Name => "name",
                    EditField::Description => "desc",
                    EditField::Time => "time",
                    EditField::Date => "date",
                    EditField::MaxParticipants => "max",
                };
                format!("edit_{field}")
            }
            Self::Delete(event_id) => format!("delete_{event_id}"),
            Self::ConfirmDelete => "confirm_delete".to_string(),
            Self::CancelEdit => "cancel_edit".to_string(),
            Self::CancelDelete => "cancel_delete".to_string(),
            Self::Admin(action) => {
                let action = match action {
                    AdminAction::Add => "add",
                    AdminAction::Remove => "remove",
                    AdminAction::Close => "close",
                    AdminAction::Back => "back",
                };
                format!("admin_{action}")
            }
            Self::AddAdmin(user_id) => format!("add_admin_{user_id}"),
            Self::RemoveAdmin(user_id) => format!("remove_admin_{user_id}"),
        }
    }

    /// Token pointing back at the month grid containing the given date.
    pub fn navigate_to(date: NaiveDate) -> Self {
        Self::Navigate {
            year: date.year(),
            month: date.month(),
        }
    }
}

fn parse_date(payload: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(payload, "%Y-%m-%d")
        .map_err(|_| anyhow!("token with malformed date: {payload}"))
}
