pub mod admin;
pub mod event;
pub mod participant;
pub mod user;

pub use admin::*;
pub use event::*;
pub use participant::*;
pub use user::*;
