//! HTTP controllers. Each module exposes a `config` function that registers
//! its routes; the helpers here are shared by all of them.

pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::models::User;
use crate::store::StoreError;
use crate::AppState;

fn detail(message: impl Into<String>) -> serde_json::Value {
    serde_json::json!({ "detail": message.into() })
}

fn unauthorized(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
        .json(detail(message))
}

/// Resolve the caller from the `Authorization: Bearer <token>` header
pub fn authorize_request(
    state: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<User, HttpResponse> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty());

    let Some(token) = token else {
        return Err(unauthorized("Not authenticated"));
    };

    state
        .identity
        .resolve(token)
        .ok_or_else(|| unauthorized("Invalid authentication credentials"))
}

/// Log a store failure and hide its details from the client
pub fn store_error_response(context: &str, e: &StoreError) -> HttpResponse {
    log::error!("{}: {}", context, e);
    HttpResponse::InternalServerError().json(detail("Internal server error"))
}

pub fn not_found(message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(detail(message))
}

/// Malformed JSON bodies are answered with 422 and the parser's message
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        let response = HttpResponse::UnprocessableEntity().json(detail(err.to_string()));
        InternalError::from_response(err, response).into()
    })
}

/// Missing or malformed query parameters are answered with 422
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        let response = HttpResponse::UnprocessableEntity().json(detail(err.to_string()));
        InternalError::from_response(err, response).into()
    })
}

/// Candidate rejected before it reached the store
pub fn unprocessable(message: &str) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(detail(message))
}
