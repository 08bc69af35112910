//! Per-user multi-step dialogue state.
//!
//! One entry per user identity, held in process memory for the duration of a
//! wizard and cleared on every terminal transition. Starting a new wizard
//! replaces whatever unfinished draft the user abandoned, so fields never
//! leak between unrelated flows. In-flight wizards do not survive restarts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use crate::bot::callback_data::EditField;
use crate::utils::validation::{
    validate_event_description, validate_event_name, validate_event_time,
    validate_max_participants,
};

/// Which wizard a user is currently inside, with its transient draft.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardState {
    /// Onboarding: waiting for the user to share their contact.
    AwaitingContact,
    CreateEvent(EventDraft),
    /// Edit wizard: field is `None` until a choice is made.
    EditEvent {
        event_id: i64,
        field: Option<EditField>,
    },
    ConfirmDelete { event_id: i64 },
}

/// Position in the creation sequence, derived from which draft fields are
/// already filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateStep {
    Date,
    Name,
    Description,
    Time,
    MaxParticipants,
    Ready,
}

impl CreateStep {
    /// The prompt shown when this step is reached (or re-prompted).
    pub fn prompt(&self) -> &'static str {
        match self {
            CreateStep::Date => "Выберите дату для события:",
            CreateStep::Name => "📝 Введите название события:",
            CreateStep::Description => "📄 Введите описание события:",
            CreateStep::Time => "⏰ Введите время события в формате ЧЧ:ММ (например 14:30):",
            CreateStep::MaxParticipants => {
                "👥 Введите максимальное количество участников (0 - без ограничений):"
            }
            CreateStep::Ready => "✅ Событие успешно создано!",
        }
    }
}

/// Partially collected event, committed in a single insert at the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub date: Option<NaiveDate>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub time: Option<String>,
    pub max_participants: Option<i64>,
}

impl EventDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft entered from a date's event list, date already chosen.
    pub fn with_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn next_step(&self) -> CreateStep {
        if self.date.is_none() {
            CreateStep::Date
        } else if self.name.is_none() {
            CreateStep::Name
        } else if self.description.is_none() {
            CreateStep::Description
        } else if self.time.is_none() {
            CreateStep::Time
        } else if self.max_participants.is_none() {
            CreateStep::MaxParticipants
        } else {
            CreateStep::Ready
        }
    }

    pub fn set_date(&mut self, date: NaiveDate) -> CreateStep {
        self.date = Some(date);
        self.next_step()
    }

    /// Feeds one text message into the current step. On success the draft
    /// advances; on a validation error it stays on the same step and the
    /// error carries the corrective reply.
    pub fn fill_text(&mut self, input: &str) -> Result<CreateStep> {
        match self.next_step() {
            CreateStep::Date => Err(anyhow!("Выберите дату в календаре выше")),
            CreateStep::Name => {
                self.name = Some(validate_event_name(input)?);
                Ok(self.next_step())
            }
            CreateStep::Description => {
                self.description = Some(validate_event_description(input)?);
                Ok(self.next_step())
            }
            CreateStep::Time => {
                self.time = Some(validate_event_time(input)?);
                Ok(self.next_step())
            }
            CreateStep::MaxParticipants => {
                self.max_participants = Some(validate_max_participants(input)?);
                Ok(self.next_step())
            }
            CreateStep::Ready => Err(anyhow!("Событие уже заполнено")),
        }
    }
}

/// Session-keyed wizard table: user identity → current state. Shared between
/// the message and callback handlers.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<i64, WizardState>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, WizardState>> {
        // A poisoned lock only means another handler panicked mid-update;
        // the map itself is still usable.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Starts (or restarts) a wizard, discarding any unfinished draft.
    pub fn begin(&self, user_id: i64, state: WizardState) {
        self.lock().insert(user_id, state);
    }

    pub fn get(&self, user_id: i64) -> Option<WizardState> {
        self.lock().get(&user_id).cloned()
    }

    /// Replaces the state of an in-progress wizard.
    pub fn set(&self, user_id: i64, state: WizardState) {
        self.lock().insert(user_id, state);
    }

    /// Terminal transition: completion, cancellation, or abandonment.
    pub fn clear(&self, user_id: i64) {
        self.lock().remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_advances_through_steps_in_order() {
        let mut draft = EventDraft::new();
        assert_eq!(draft.next_step(), CreateStep::Date);

        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(draft.set_date(date), CreateStep::Name);
        assert_eq!(draft.fill_text("Standup").unwrap(), CreateStep::Description);
        assert_eq!(draft.fill_text("daily").unwrap(), CreateStep::Time);
        assert_eq!(draft.fill_text("09:30").unwrap(), CreateStep::MaxParticipants);
        assert_eq!(draft.fill_text("5").unwrap(), CreateStep::Ready);

        assert_eq!(draft.name.as_deref(), Some("Standup"));
        assert_eq!(draft.time.as_deref(), Some("09:30"));
        assert_eq!(draft.max_participants, Some(5));
    }

    #[test]
    fn test_invalid_input_stays_on_the_same_step() {
        let mut draft = EventDraft::with_date(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert!(draft.fill_text("   ").is_err());
        assert_eq!(draft.next_step(), CreateStep::Name);

        draft.fill_text("Standup").unwrap();
        draft.fill_text("daily").unwrap();
        assert!(draft.fill_text("25:99").is_err());
        assert_eq!(draft.next_step(), CreateStep::Time);

        draft.fill_text("09:30").unwrap();
        assert!(draft.fill_text("-3").is_err());
        assert_eq!(draft.next_step(), CreateStep::MaxParticipants);
    }

    #[test]
    fn test_begin_replaces_abandoned_draft() {
        let sessions = SessionStore::new();
        let user = 42;

        let mut stale = EventDraft::with_date(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        stale.fill_text("Left half-done").unwrap();
        sessions.begin(user, WizardState::CreateEvent(stale));

        // A new wizard of a different kind starts clean.
        sessions.begin(user, WizardState::EditEvent { event_id: 7, field: None });
        assert_eq!(
            sessions.get(user),
            Some(WizardState::EditEvent { event_id: 7, field: None })
        );

        // And restarting creation gets a fresh draft with no leaked fields.
        sessions.begin(user, WizardState::CreateEvent(EventDraft::new()));
        match sessions.get(user) {
            Some(WizardState::CreateEvent(draft)) => {
                assert_eq!(draft, EventDraft::new());
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_clear_is_terminal() {
        let sessions = SessionStore::new();
        sessions.begin(1, WizardState::AwaitingContact);
        sessions.clear(1);
        assert_eq!(sessions.get(1), None);
        // Clearing an absent session is a no-op.
        sessions.clear(1);
    }

    #[test]
    fn test_sessions_are_isolated_per_user() {
        let sessions = SessionStore::new();
        sessions.begin(1, WizardState::ConfirmDelete { event_id: 3 });
        sessions.begin(2, WizardState::AwaitingContact);

        sessions.clear(1);
        assert_eq!(sessions.get(1), None);
        assert_eq!(sessions.get(2), Some(WizardState::AwaitingContact));
    }
}
