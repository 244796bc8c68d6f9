use actix_cors::Cors;
use actix_session::{config::PersistentSession, storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::{self, Data};
use actix_web::{App, HttpServer};
use agora::app_config;
use agora::middleware::ClientCtx;
use anyhow::Context;
use env_logger::Env;
use rand::{distributions::Alphanumeric, Rng};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_lib_mods();
    app_config::init();
    let config = app_config::get_config();

    let db = agora::db::connect(&config.database.url, config.database.max_connections)
        .await
        .context("Unable to connect to the database")?;
    if config.database.create_schema {
        agora::db::create_schema(&db)
            .await
            .context("Unable to create the database schema")?;
    }

    if let (Ok(username), Ok(password)) = (
        std::env::var("AGORA_ADMIN_USERNAME"),
        std::env::var("AGORA_ADMIN_PASSWORD"),
    ) {
        agora::user::ensure_super_admin(&db, &username, &password)
            .await
            .map_err(|e| anyhow::anyhow!("Unable to create super-admin: {}", e))?;
    }

    let secret_key = match std::env::var("SECRET_KEY") {
        Ok(key) if key.len() >= 64 => Key::from(key.as_bytes()),
        other => {
            let random_string: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(128)
                .map(char::from)
                .collect();
            log::warn!("SECRET_KEY was invalid. Reason: {:?}\r\nThis means the key used for signing session cookies will invalidate every time the application is restarted. A secret key must be at least 64 bytes to be accepted.", other.err());
            Key::from(random_string.as_bytes())
        }
    };

    let db = Data::new(db);
    let session_config = config.session.clone();
    let cors_config = config.cors.clone();

    let mut server = HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(cors_config.max_age_seconds);
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(db.clone())
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(ClientCtx::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_name(session_config.cookie_name.clone())
                    .cookie_same_site(SameSite::Lax)
                    .cookie_secure(session_config.cookie_secure)
                    .session_lifecycle(PersistentSession::default())
                    .build(),
            )
            .wrap(cors)
            .wrap(Logger::new("%a %r %s %Dms"))
            .configure(agora::web::configure)
            .default_service(web::to(agora::web::error::render_404))
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    log::info!("Listening on {}", config.server.bind);
    server.bind(&config.server.bind)?.run().await?;
    Ok(())
}

/// Initialize third party crates we rely on but don't have control over.
pub fn init_lib_mods() {
    if let Err(e) = dotenv::dotenv() {
        eprintln!("No .env file loaded: {}", e);
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
