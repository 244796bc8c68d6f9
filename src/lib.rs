pub mod ambassadors;
pub mod app_config;
pub mod auth;
pub mod connections;
pub mod content;
pub mod db;
pub mod error;
pub mod feed;
pub mod messages;
pub mod middleware;
pub mod moderation;
pub mod notifications;
pub mod orm;
pub mod paging;
pub mod presence;
pub mod settings;
pub mod user;
pub mod votes;
pub mod web;
