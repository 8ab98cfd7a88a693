use actix::Actor;
use actix_session::{config::PersistentSession, storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpServer};
use env_logger::Env;
use folio::db::{create_schema, get_db_pool, init_db};
use folio::email::Relay;
use folio::settings::create_settings;
use folio::web::moderation_ws::ModerationServer;
use folio::web::AppServices;
use rand::{distributions::Alphanumeric, Rng};
use std::time::Duration;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_lib_mods();
    init_our_mods();
    init_db(std::env::var("DATABASE_URL").expect("DATABASE_URL must be set.")).await;

    create_schema(get_db_pool())
        .await
        .expect("Failed to create database schema");

    // Settings shown to the site live in the database
    let settings = create_settings();
    settings
        .load_from_database(get_db_pool())
        .await
        .expect("Failed to load settings from database");

    let config = folio::app_config::get_config();
    folio::rate_limit::init_rate_limits(&config.rate_limit);

    let secret_key = match std::env::var("SECRET_KEY") {
        Ok(key) if key.len() >= 64 => Key::from(key.as_bytes()),
        other => {
            let random_string: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(128)
                .map(char::from)
                .collect();
            log::warn!("SECRET_KEY was invalid ({:?}). This means the key used for signing session cookies will invalidate every time the application is restarted. A secret key must be at least 64 bytes to be accepted.\r\n\r\nNeed a key? How about:\r\n{}", other.map(|k| k.len()), random_string);
            Key::from(random_string.as_bytes())
        }
    };

    // Start the live moderation WebSocket server
    let moderation_server = ModerationServer::new().start();

    let services = AppServices::new(
        get_db_pool().clone(),
        settings,
        Relay::from_app_config(),
        Duration::from_secs(config.comments.public_cache_ttl_seconds),
    )
    .with_live_feed(moderation_server);

    // Spawn rate limiter cleanup task
    actix_web::rt::spawn(async {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(300)); // Every 5 minutes
        loop {
            interval.tick().await;
            folio::rate_limit::cleanup_old_entries_public();
            log::debug!("Rate limiter cleanup completed");
        }
    });

    let cookie_secure = config.server.cookie_secure;
    log::info!("Listening on {}", config.server.bind);

    HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .configure(|conf| services.register(conf))
            // Security headers - applied to all responses
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("X-XSS-Protection", "0")) // Disable legacy XSS filter
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
                    .add((
                        "Permissions-Policy",
                        "geolocation=(), microphone=(), camera=()",
                    )),
            )
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_same_site(SameSite::Strict)
                    .cookie_secure(cookie_secure)
                    .session_lifecycle(PersistentSession::default())
                    .build(),
            )
            .wrap(Logger::new("%a %r %s %T"))
            .configure(folio::web::configure)
    })
    .bind(&config.server.bind)?
    .run()
    .await
}

/// Initialize third party crates we rely on but don't have control over.
pub fn init_lib_mods() {
    if let Err(e) = dotenv::dotenv() {
        eprintln!("No .env file loaded: {}", e);
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Initialize all local mods.
pub fn init_our_mods() {
    folio::app_config::init();
}
