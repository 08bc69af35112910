pub mod callback_data;
pub mod calendar;
pub mod commands;
pub mod handlers;
pub mod views;
pub mod wizard;
