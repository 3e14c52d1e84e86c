use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod auth;
mod config;
mod controllers;
mod models;
mod store;

use auth::{IdentityCheck, TokenAuthority, UserRegistry};
use config::Config;
use store::TaskStore;

pub struct AppState {
    /// Sole owner of the task file
    pub store: Arc<TaskStore>,
    /// Gate for create/update/delete
    pub identity: Arc<dyn IdentityCheck>,
    pub config: Config,
    /// Server start time for uptime calculation
    pub started_at: std::time::Instant,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let store = Arc::new(TaskStore::new(
        config.tasks_file.clone(),
        config.schema_version,
    ));
    log::info!(
        "Using task file {:?} (new files get schema v{})",
        store.path(),
        store.default_schema().as_number()
    );

    // Surface a broken task file at boot instead of on the first request
    match store.count() {
        Ok(n) => log::info!("[TASKS] {} tasks on disk", n),
        Err(e) => log::warn!("[TASKS] Task file is not readable yet: {}", e),
    }

    let registry = UserRegistry::load_or_demo(config.users_file.as_deref());
    let identity: Arc<dyn IdentityCheck> = Arc::new(TokenAuthority::new(registry));

    let bind_address = config.bind_address.clone();
    let port = config.port;
    let started_at = std::time::Instant::now();

    log::info!("Starting Tasks API on {}:{}", bind_address, port);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                store: Arc::clone(&store),
                identity: Arc::clone(&identity),
                config: config.clone(),
                started_at,
            }))
            .app_data(controllers::json_config())
            .app_data(controllers::query_config())
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config_routes)
            .configure(controllers::auth::config)
            .configure(controllers::tasks::config)
    })
    .bind((bind_address.as_str(), port))?
    .run();

    let server_handle = server.handle();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        log::info!("Received Ctrl+C, shutting down...");

        let server_stop = server_handle.stop(true);
        if tokio::time::timeout(std::time::Duration::from_secs(5), server_stop)
            .await
            .is_err()
        {
            log::warn!("Timeout waiting for HTTP server to stop, forcing exit...");
        }

        log::info!("Shutdown complete");
    });

    server.await
}
