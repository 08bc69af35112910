//! # Event Calendar Bot
//!
//! A Telegram bot for browsing and managing scheduled events.
//!
//! ## Features
//! - Inline month calendar with event and participation markers
//! - Per-date event lists and single-event detail views
//! - Self-service registration with optional capacity limits
//! - Admin-only event creation, editing and deletion wizards
//! - Admin roster management
//! - Daily reminder fan-out to registered participants
//! - Persistent storage with SQLite

/// Bot command handlers, keyboards and message processing
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Background services like the daily notification job
pub mod services;
/// Utility functions for validation and logging
pub mod utils;
