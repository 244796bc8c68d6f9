//! SeaORM entities, one module per table.

pub mod account_settings;
pub mod ambassadors;
pub mod announcements;
pub mod communities;
pub mod connections;
pub mod events;
pub mod follows;
pub mod forums;
pub mod messages;
pub mod notifications;
pub mod post_votes;
pub mod posts;
pub mod reports;
pub mod threads;
pub mod users;
