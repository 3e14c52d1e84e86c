//! Login and caller-identity endpoints.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use super::authorize_request;
use crate::models::TokenResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

/// Exchange a username/password form for a bearer token
async fn login(data: web::Data<AppState>, form: web::Form<LoginForm>) -> impl Responder {
    match data.identity.login(&form.username, &form.password) {
        Some(access_token) => {
            log::info!("[AUTH] Issued token for {}", form.username);
            HttpResponse::Ok().json(TokenResponse {
                access_token,
                token_type: "bearer".to_string(),
            })
        }
        None => HttpResponse::BadRequest().json(serde_json::json!({
            "detail": "Incorrect username or password"
        })),
    }
}

/// The user the presented token belongs to
async fn current_user(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    match authorize_request(&data, &req) {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(resp) => resp,
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/token", web::post().to(login))
        .route("/users/me", web::get().to(current_user));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TokenAuthority, UserRegistry};
    use crate::config::Config;
    use crate::store::{SchemaVersion, TaskStore};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn state() -> web::Data<AppState> {
        let config = Config::default();
        web::Data::new(AppState {
            store: Arc::new(TaskStore::new(config.tasks_file.clone(), SchemaVersion::V1)),
            identity: Arc::new(TokenAuthority::new(UserRegistry::demo())),
            config,
            started_at: std::time::Instant::now(),
        })
    }

    #[actix_web::test]
    async fn test_login_then_whoami() {
        let app = test::init_service(App::new().app_data(state()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/token")
            .set_form([("username", "johndoe"), ("password", "secret")])
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"access_token": "tokenizedjohndoe", "token_type": "bearer"}));

        let req = test::TestRequest::get()
            .uri("/users/me")
            .insert_header(("Authorization", "Bearer tokenizedjohndoe"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"username": "johndoe"}));
    }

    #[actix_web::test]
    async fn test_login_rejects_bad_password() {
        let app = test::init_service(App::new().app_data(state()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/token")
            .set_form([("username", "johndoe"), ("password", "wrong")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_whoami_without_token() {
        let app = test::init_service(App::new().app_data(state()).configure(config)).await;

        let req = test::TestRequest::get().uri("/users/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"detail": "Not authenticated"}));
    }
}
