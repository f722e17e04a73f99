use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

pub mod config;
pub mod errors;
pub mod http;
pub mod logging;
pub mod store;

use store::TodoStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    pub home_template: Arc<Path>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>, home_template: impl Into<PathBuf>) -> Self {
        Self {
            store,
            home_template: Arc::from(home_template.into()),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(http::handlers::home))
        .nest("/todo/", todo_router())
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}

fn todo_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(http::handlers::list_todos).post(http::handlers::create_todo),
        )
        .route(
            "/{id}",
            put(http::handlers::update_todo).delete(http::handlers::delete_todo),
        )
}
