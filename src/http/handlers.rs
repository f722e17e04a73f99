//! Axum HTTP handlers for the todo API
//!
//! Each handler is a single pass: validate input, run one bounded store
//! operation, shape a JSON response.

use std::future::Future;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::store::{StoreError, Todo, TodoId, TodoUpdate};
use crate::AppState;

/// Upper bound on any single store operation. The timeout future is dropped
/// when the handler returns, cancelling the operation with it.
const STORE_TIMEOUT: Duration = Duration::from_secs(10);

async fn bounded<T>(
    operation: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(STORE_TIMEOUT, operation).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::new(format!(
            "operation timed out after {}s",
            STORE_TIMEOUT.as_secs()
        ))),
    }
}

#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    pub data: Vec<Todo>,
}

#[derive(Debug, Serialize)]
pub struct TodoCreatedResponse {
    pub message: &'static str,
    pub todo_id: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
struct CreateTodoRequest {
    title: String,
}

#[derive(Debug, Deserialize)]
struct UpdateTodoRequest {
    title: String,
    completed: bool,
}

pub async fn list_todos(State(state): State<AppState>) -> Result<Json<TodoListResponse>, AppError> {
    let todos = bounded(state.store.list())
        .await
        .map_err(|err| AppError::store("Failed to fetch todo", err))?;

    Ok(Json(TodoListResponse { data: todos }))
}

pub async fn create_todo(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let request: CreateTodoRequest = serde_json::from_slice(&body)
        .map_err(|err| AppError::validation(format!("invalid request body: {err}")))?;

    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::validation("The title is required"));
    }

    let id = bounded(state.store.create(title))
        .await
        .map_err(|err| AppError::store("Failed to save todo", err))?;

    Ok((
        StatusCode::CREATED,
        Json(TodoCreatedResponse {
            message: "Todo created successfully",
            todo_id: id.to_hex(),
        }),
    )
        .into_response())
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let id = TodoId::parse(&id).map_err(|_| AppError::validation("Invalid ID"))?;

    let request: UpdateTodoRequest = serde_json::from_slice(&body)
        .map_err(|err| AppError::validation(format!("invalid request body: {err}")))?;

    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::validation("The title is required"));
    }

    let update = TodoUpdate {
        title,
        completed: request.completed,
    };
    let matched = bounded(state.store.update_by_id(id, update))
        .await
        .map_err(|err| AppError::store("Failed to update todo", err))?;

    if !matched {
        return Err(AppError::not_found("Todo not found"));
    }

    Ok(Json(MessageResponse {
        message: "Todo updated successfully",
    }))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = TodoId::parse(&id).map_err(|_| AppError::validation("Invalid ID"))?;

    let matched = bounded(state.store.delete_by_id(id))
        .await
        .map_err(|err| AppError::store("Failed to delete todo", err))?;

    if !matched {
        return Err(AppError::not_found("Todo not found"));
    }

    Ok(Json(MessageResponse {
        message: "Todo deleted successfully",
    }))
}

pub async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let page = tokio::fs::read_to_string(state.home_template.as_ref())
        .await
        .map_err(|err| {
            AppError::render(format!(
                "failed to read {}: {err}",
                state.home_template.display()
            ))
        })?;

    Ok(Html(page))
}
