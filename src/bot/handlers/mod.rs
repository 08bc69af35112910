pub mod callback;
pub mod message;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;

use crate::bot::wizard::SessionStore;
use crate::database::connection::DatabaseManager;

pub struct BotHandler {
    pub db: DatabaseManager,
    pub sessions: SessionStore,
}

impl BotHandler {
    pub fn new(db: DatabaseManager) -> Self {
        Self {
            db,
            sessions: SessionStore::new(),
        }
    }

    pub fn schema(&self) -> UpdateHandler<teloxide::RequestError> {
        let (db_cmd, sessions_cmd) = (self.db.clone(), self.sessions.clone());
        let (db_contact, sessions_contact) = (self.db.clone(), self.sessions.clone());
        let (db_text, sessions_text) = (self.db.clone(), self.sessions.clone());
        let (db_callback, sessions_callback) = (self.db.clone(), self.sessions.clone());

        dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<crate::bot::commands::Command>()
                    .endpoint(move |bot, msg, cmd| {
                        let db = db_cmd.clone();
                        let sessions = sessions_cmd.clone();
                        async move { message::command_handler(bot, msg, cmd, db, sessions).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.contact().is_some())
                    .endpoint(move |bot, msg| {
                        let db = db_contact.clone();
                        let sessions = sessions_contact.clone();
                        async move { message::contact_handler(bot, msg, db, sessions).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.text().is_some())
                    .endpoint(move |bot, msg| {
                        let db = db_text.clone();
                        let sessions = sessions_text.clone();
                        async move { message::text_handler(bot, msg, db, sessions).await }
                    }),
            )
            .branch(Update::filter_callback_query().endpoint(move |bot, q| {
                let db = db_callback.clone();
                let sessions = sessions_callback.clone();
                async move { callback::callback_handler(bot, q, db, sessions).await }
            }))
    }
}
