use actix_identity::{CookieIdentityPolicy, IdentityService};
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use streamflix::catalogue::Catalogue;
use streamflix::config::{Config, DEFAULT_LOG_FILTER};
use streamflix::handlers::{routes, AppState};

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    let config = Config::from_env();
    let tera = tera::Tera::new(&config.templates)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
    // Visits live only as long as the process.
    let db = sled::Config::new()
        .temporary(true)
        .open()
        .map_err(std::io::Error::from)?;

    let bind = config.bind.clone();
    let cookie_key = config.cookie_key.clone();
    let tera = web::Data::new(tera);
    let db = web::Data::new(db);
    let state = web::Data::new(AppState {
        catalogue: Catalogue::builtin(),
        config,
    });

    info!("StreamFlix listening on {}", bind);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(IdentityService::new(
                CookieIdentityPolicy::new(&cookie_key)
                    .name("streamflix-visitor")
                    .secure(false),
            ))
            .app_data(tera.clone())
            .app_data(db.clone())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind(bind)?
    .run()
    .await
}
