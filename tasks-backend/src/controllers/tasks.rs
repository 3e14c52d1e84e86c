//! Tasks REST API: CRUD, filtering, and keyword search.
//!
//! The same handlers serve two route families: the root routes speak the
//! version 1 shape (no priority) and `/v2` speaks the version 2 shape.
//! Reads are open; create/update/delete require a bearer token.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{authorize_request, not_found, store_error_response, unprocessable};
use crate::models::{NewTask, NewTaskV2, Task, TaskDraft, TaskV1};
use crate::store::TaskFilter;
use crate::AppState;

const TASK_NOT_FOUND: &str = "Task not found";

#[derive(Debug, Deserialize)]
struct SearchQuery {
    keyword: String,
}

fn render<V: From<Task>>(tasks: Vec<Task>) -> Vec<V> {
    tasks.into_iter().map(V::from).collect()
}

/// List tasks, optionally filtered by `status` and/or `title`
async fn list_tasks<V>(data: web::Data<AppState>, query: web::Query<TaskFilter>) -> HttpResponse
where
    V: Serialize + From<Task> + 'static,
{
    match data.store.list(&query) {
        Ok(tasks) => HttpResponse::Ok().json(render::<V>(tasks)),
        Err(e) => store_error_response("Failed to list tasks", &e),
    }
}

/// Tasks whose title or description contains `keyword`
async fn search_tasks<V>(data: web::Data<AppState>, query: web::Query<SearchQuery>) -> HttpResponse
where
    V: Serialize + From<Task> + 'static,
{
    match data.store.search(&query.keyword) {
        Ok(tasks) => HttpResponse::Ok().json(render::<V>(tasks)),
        Err(e) => store_error_response("Failed to search tasks", &e),
    }
}

async fn get_task<V>(data: web::Data<AppState>, path: web::Path<u64>) -> HttpResponse
where
    V: Serialize + From<Task> + 'static,
{
    match data.store.get_by_id(path.into_inner()) {
        Ok(Some(task)) => HttpResponse::Ok().json(V::from(task)),
        Ok(None) => not_found(TASK_NOT_FOUND),
        Err(e) => store_error_response("Failed to get task", &e),
    }
}

async fn create_task<D, V>(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<D>,
) -> HttpResponse
where
    D: DeserializeOwned + Into<TaskDraft> + 'static,
    V: Serialize + From<Task> + 'static,
{
    let user = match authorize_request(&data, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let draft: TaskDraft = body.into_inner().into();
    if let Err(e) = draft.validate() {
        return unprocessable(&e);
    }

    match data.store.create(draft) {
        Ok(task) => {
            log::info!("[TASKS] {} created task {}", user.username, task.id);
            HttpResponse::Ok().json(V::from(task))
        }
        Err(e) => store_error_response("Failed to create task", &e),
    }
}

/// Replace a task's fields with the request body
async fn update_task<D, V>(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<u64>,
    body: web::Json<D>,
) -> HttpResponse
where
    D: DeserializeOwned + Into<TaskDraft> + 'static,
    V: Serialize + From<Task> + 'static,
{
    let user = match authorize_request(&data, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let draft: TaskDraft = body.into_inner().into();
    if let Err(e) = draft.validate() {
        return unprocessable(&e);
    }

    let id = path.into_inner();
    match data.store.update(id, draft) {
        Ok(Some(task)) => {
            log::info!("[TASKS] {} updated task {}", user.username, id);
            HttpResponse::Ok().json(V::from(task))
        }
        Ok(None) => not_found(TASK_NOT_FOUND),
        Err(e) => store_error_response("Failed to update task", &e),
    }
}

async fn delete_task<V>(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<u64>,
) -> HttpResponse
where
    V: Serialize + From<Task> + 'static,
{
    let user = match authorize_request(&data, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let id = path.into_inner();
    match data.store.delete(id) {
        Ok(Some(task)) => {
            log::info!("[TASKS] {} deleted task {}", user.username, id);
            HttpResponse::Ok().json(V::from(task))
        }
        Ok(None) => not_found(TASK_NOT_FOUND),
        Err(e) => store_error_response("Failed to delete task", &e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/tasks", web::get().to(list_tasks::<TaskV1>))
        .route("/tasks/search", web::get().to(search_tasks::<TaskV1>))
        .route("/task", web::post().to(create_task::<NewTask, TaskV1>))
        .service(
            web::resource("/task/{task_id}")
                .route(web::get().to(get_task::<TaskV1>))
                .route(web::put().to(update_task::<NewTask, TaskV1>))
                .route(web::delete().to(delete_task::<TaskV1>)),
        );

    cfg.service(
        web::scope("/v2")
            .route("/tasks", web::get().to(list_tasks::<Task>))
            .route("/tasks/search", web::get().to(search_tasks::<Task>))
            .route("/task", web::post().to(create_task::<NewTaskV2, Task>))
            .service(
                web::resource("/task/{task_id}")
                    .route(web::get().to(get_task::<Task>))
                    .route(web::put().to(update_task::<NewTaskV2, Task>))
                    .route(web::delete().to(delete_task::<Task>)),
            ),
    );
}
