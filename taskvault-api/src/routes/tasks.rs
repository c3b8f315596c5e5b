/// Task endpoints
///
/// CRUD plus status transitions on per-user tasks. Every query is scoped
/// to the authenticated owner; a task owned by someone else is
/// indistinguishable from one that does not exist (404, never 403).
///
/// # Endpoints
///
/// - `POST /api/tasks` - Create task
/// - `GET /api/tasks` - List tasks (paginated, filterable)
/// - `GET /api/tasks/:id` - Get task
/// - `PATCH /api/tasks/:id` - Update title/description
/// - `DELETE /api/tasks/:id` - Delete task
/// - `PATCH /api/tasks/:id/toggle` - Move task to a new status

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskvault_shared::{
    auth::middleware::AuthContext,
    models::task::{CreateTask, Task, TaskFilter, TaskStatus, UpdateTask},
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Optional description
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// Update task request (partial)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    /// New description; explicit null clears it
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

/// Status transition request
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    /// Target status
    pub status: TaskStatus,
}

/// List query parameters
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Page number (1-based)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Page size
    #[serde(default = "default_limit")]
    pub limit: i64,

    /// Exact status filter
    pub status: Option<TaskStatus>,

    /// Case-insensitive title substring filter
    pub search: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

/// List response
#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
    /// Tasks on this page, newest-created first
    pub tasks: Vec<Task>,

    /// Total matching tasks across all pages
    pub total: i64,

    /// Page number (1-based)
    pub page: i64,

    /// Page size
    pub limit: i64,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
    /// Confirmation message
    pub message: String,
}

/// Distinguishes an absent field from an explicit null
fn double_option<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}

/// Create a new task
///
/// Status always starts at `TODO`.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid access token
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let task = Task::create(
        &state.db,
        CreateTask {
            owner_id: auth.user_id,
            title: req.title,
            description: req.description,
        },
    )
    .await?;

    tracing::debug!(task_id = %task.id, owner_id = %auth.user_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// List the caller's tasks
///
/// Supports offset pagination (`page`/`limit`), an exact status filter
/// and a case-insensitive title search.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid pagination parameters
/// - `401 Unauthorized`: Missing or invalid access token
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<ListTasksResponse>> {
    if query.page < 1 {
        return Err(ApiError::BadRequest("Page must be at least 1".to_string()));
    }
    if query.limit < 1 || query.limit > 100 {
        return Err(ApiError::BadRequest(
            "Limit must be between 1 and 100".to_string(),
        ));
    }

    let filter = TaskFilter {
        status: query.status,
        search: query.search,
    };

    // page is attacker-controlled; the offset multiplication must not wrap
    let offset = query
        .page
        .checked_sub(1)
        .and_then(|page| page.checked_mul(query.limit))
        .ok_or_else(|| ApiError::BadRequest("Page is out of range".to_string()))?;
    let tasks = Task::list_by_owner(&state.db, auth.user_id, &filter, query.limit, offset).await?;
    let total = Task::count_by_owner(&state.db, auth.user_id, &filter).await?;

    Ok(Json(ListTasksResponse {
        tasks,
        total,
        page: query.page,
        limit: query.limit,
    }))
}

/// Get a single task
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid access token
/// - `404 Not Found`: Unknown task, or owned by another user
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id_and_owner(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Partially update a task's title or description
///
/// Status changes go through the toggle endpoint, never through here.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid access token
/// - `404 Not Found`: Unknown task, or owned by another user
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(ApiError::from_validation)?;

    // Ownership check before touching the row
    let existing = Task::find_by_id_and_owner(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if req.title.is_none() && req.description.is_none() {
        return Ok(Json(existing));
    }

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            title: req.title,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Delete a task permanently
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid access token
/// - `404 Not Found`: Unknown task, or owned by another user
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    let deleted = Task::delete_by_owner(&state.db, id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::debug!(task_id = %id, owner_id = %auth.user_id, "Task deleted");

    Ok(Json(DeleteTaskResponse {
        message: "Task deleted".to_string(),
    }))
}

/// Move a task to a new status
///
/// Allowed transitions:
///
/// ```text
/// TODO        -> IN_PROGRESS | ARCHIVED
/// IN_PROGRESS -> DONE | ARCHIVED
/// DONE        -> ARCHIVED
/// ARCHIVED    -> (terminal)
/// ```
///
/// Same-state transitions are rejected. The update is conditional on the
/// current status, so two concurrent transitions on the same task cannot
/// both succeed.
///
/// # Errors
///
/// - `400 Bad Request`: Transition not allowed from the current status
/// - `401 Unauthorized`: Missing or invalid access token
/// - `404 Not Found`: Unknown task, or owned by another user
pub async fn toggle_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ToggleRequest>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id_and_owner(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if !task.status.can_transition_to(req.status) {
        return Err(ApiError::InvalidTransition {
            from: task.status,
            to: req.status,
        });
    }

    // Conditional on the status we just read. A concurrent transition
    // that got there first leaves no matching row.
    let updated = Task::update_status(&state.db, id, task.status, req.status)
        .await?
        .ok_or(ApiError::InvalidTransition {
            from: task.status,
            to: req.status,
        })?;

    tracing::debug!(
        task_id = %id,
        from = %task.status.as_str(),
        to = %req.status.as_str(),
        "Task status changed"
    );

    Ok(Json(updated))
}
