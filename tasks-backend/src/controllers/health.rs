use actix_web::{web, HttpResponse, Responder};

use crate::AppState;

/// Version from Cargo.toml, available at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(root)));
    cfg.service(web::resource("/api/health").route(web::get().to(health_check)));
    cfg.service(web::resource("/api/version").route(web::get().to(get_version)));
}

async fn root() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Task Application"
    }))
}

async fn health_check(state: web::Data<AppState>) -> impl Responder {
    // A task file that can't be read degrades health but doesn't fail the probe
    let (status, task_count) = match state.store.count() {
        Ok(n) => ("ok", Some(n)),
        Err(e) => {
            log::warn!("Health check could not read tasks: {}", e);
            ("degraded", None)
        }
    };

    HttpResponse::Ok().json(serde_json::json!({
        "status": status,
        "version": VERSION,
        "task_count": task_count,
        "tasks_file": state.config.tasks_file,
        "schema_version": state.config.schema_version.as_number(),
        "uptime_secs": state.started_at.elapsed().as_secs()
    }))
}

async fn get_version() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "version": VERSION
    }))
}
