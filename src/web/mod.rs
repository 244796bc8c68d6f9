pub mod account;
pub mod account_settings;
pub mod ambassadors;
pub mod body;
pub mod community;
pub mod connections;
pub mod error;
pub mod feed;
pub mod login;
pub mod logout;
pub mod messages;
pub mod notifications;
pub mod reports;
pub mod thread;
pub mod votes;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.5.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    error::configure(conf);

    // Descending order. Order is important.
    // Route resolution will stop at the first match.
    account::configure(conf);
    login::configure(conf);
    logout::configure(conf);
    account_settings::configure(conf);
    reports::configure(conf);
    notifications::configure(conf);
    ambassadors::configure(conf);
    community::configure(conf);
    thread::configure(conf);
    votes::configure(conf);
    connections::configure(conf);
    messages::configure(conf);
    feed::configure(conf);
}
