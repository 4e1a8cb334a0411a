use askama::Template;
use axum::{
    Form, Router,
    extract::{FromRef, FromRequestParts, Path, Query, State},
    http::{StatusCode, request::Parts},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use serde::Deserialize;
use std::sync::Arc;

use crate::notice::{Notice, push_notice, take_notice};
use crate::todo::{SeaOrmTodoRepository, Todo, TodoPage, TodoService, TodoServiceError};

/// Form submitted when creating or editing a todo.
#[derive(Debug, Deserialize)]
pub struct TodoForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    desc: String,
}

/// Query string of the list page.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    page: Option<String>,
}

impl ListQuery {
    /// The requested 1-based page; anything missing, malformed or below 1 means the first page.
    pub fn page_number(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|page| page.trim().parse::<u64>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1)
    }
}

#[derive(Clone)]
pub struct TodoState {
    pub db: Arc<sea_orm::DatabaseConnection>,
    pub cookie_key: Key,
}

impl FromRef<TodoState> for Key {
    fn from_ref(state: &TodoState) -> Self {
        state.cookie_key.clone()
    }
}

impl TodoState {
    fn todo_service(&self) -> TodoService<SeaOrmTodoRepository<'_>> {
        TodoService::new(SeaOrmTodoRepository::new(&self.db))
    }
}

/// Custom error type for todo handler operations.
#[derive(Debug, thiserror::Error)]
enum TodoError {
    /// Represents an error during template rendering.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
    /// Represents a todo service error.
    #[error("Todo service error")]
    Service(#[from] TodoServiceError),
    /// Represents a path segment that cannot name any todo.
    #[error("Invalid todo ID '{0}'")]
    InvalidId(String),
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let (status_code, title, user_facing_error_message) = match &self {
            TodoError::Service(TodoServiceError::NotFound(_)) | TodoError::InvalidId(_) => (
                StatusCode::NOT_FOUND,
                "Not Found",
                "The requested todo does not exist.",
            ),
            _ => {
                tracing::error!("Request failed: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "An unexpected error occurred while processing your request. Please try again later.",
                )
            }
        };

        (
            status_code,
            Html(format!("<h1>{}</h1><p>{}</p>", title, user_facing_error_message)),
        )
            .into_response()
    }
}

/// Todo ID taken from the `{id}` path segment.
///
/// Segments that are not a valid ID are answered like an unknown todo.
#[derive(Debug, Clone, Copy)]
struct TodoId(u32);

impl<S> FromRequestParts<S> for TodoId
where
    S: Send + Sync,
{
    type Rejection = TodoError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(segment) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| TodoError::InvalidId(rejection.body_text()))?;
        segment
            .parse::<u32>()
            .map(TodoId)
            .map_err(|_| TodoError::InvalidId(segment))
    }
}

/// Maps a recoverable service error to the notice shown to the user.
fn rejection_notice(err: &TodoServiceError) -> Option<Notice> {
    match err {
        TodoServiceError::EmptyField => Some(Notice::MissingFields),
        TodoServiceError::FieldTooLong { .. } => Some(Notice::FieldTooLong),
        TodoServiceError::DuplicateTitle(_) => Some(Notice::DuplicateTitle),
        _ => None,
    }
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    page: TodoPage,
    notice: Option<Notice>,
}

impl IndexTemplate {
    pub fn new(page: TodoPage, notice: Option<Notice>) -> Self {
        Self { page, notice }
    }
}

#[derive(Template)]
#[template(path = "update.html")]
struct UpdateTemplate {
    todo: Todo,
    notice: Option<Notice>,
}

impl UpdateTemplate {
    pub fn new(todo: Todo, notice: Option<Notice>) -> Self {
        Self { todo, notice }
    }
}

/// Renders one page of the todo list with an optional notice.
async fn render_list_page(
    state: &TodoState,
    page: u64,
    notice: Option<Notice>,
) -> Result<Html<String>, TodoError> {
    let todos = state.todo_service().list_todos(page).await?;
    let template = IndexTemplate::new(todos, notice);
    template.render().map(Html).map_err(TodoError::from)
}

/// Handler for GET / that lists one page of todos.
#[tracing::instrument(skip(state, jar))]
async fn list_todos_handler(
    State(state): State<TodoState>,
    jar: SignedCookieJar,
    Query(query): Query<ListQuery>,
) -> Result<(SignedCookieJar, Html<String>), TodoError> {
    let (jar, notice) = take_notice(jar);
    let html = render_list_page(&state, query.page_number(), notice).await?;
    Ok((jar, html))
}

/// Handler for POST / that creates a todo.
///
/// Invalid input re-renders the requested page with a notice instead of redirecting.
#[tracing::instrument(skip(state, jar))]
async fn create_todo_handler(
    State(state): State<TodoState>,
    jar: SignedCookieJar,
    Query(query): Query<ListQuery>,
    Form(form): Form<TodoForm>,
) -> Result<Response, TodoError> {
    match state.todo_service().create_todo(&form.title, &form.desc).await {
        Ok(_) => {
            let jar = push_notice(jar, Notice::TodoAdded);
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(err) => {
            let Some(notice) = rejection_notice(&err) else {
                return Err(TodoError::Service(err));
            };
            tracing::warn!("Rejected new todo: {}", err);
            let (jar, _) = take_notice(jar);
            let html = render_list_page(&state, query.page_number(), Some(notice)).await?;
            Ok((jar, html).into_response())
        }
    }
}

/// Handler for GET /update/{id} that serves the edit form.
#[tracing::instrument(skip(state, jar))]
async fn edit_todo_handler(
    State(state): State<TodoState>,
    jar: SignedCookieJar,
    TodoId(id): TodoId,
) -> Result<(SignedCookieJar, Html<String>), TodoError> {
    let todo = state.todo_service().get_todo_by_id(id).await?;
    let (jar, notice) = take_notice(jar);
    let template = UpdateTemplate::new(todo, notice);
    let html = template.render().map(Html).map_err(TodoError::from)?;
    Ok((jar, html))
}

/// Handler for POST /update/{id} that applies an edit.
#[tracing::instrument(skip(state, jar))]
async fn update_todo_handler(
    State(state): State<TodoState>,
    jar: SignedCookieJar,
    TodoId(id): TodoId,
    Form(form): Form<TodoForm>,
) -> Result<(SignedCookieJar, Redirect), TodoError> {
    match state
        .todo_service()
        .edit_todo_by_id(id, &form.title, &form.desc)
        .await
    {
        Ok(_) => Ok((push_notice(jar, Notice::TodoUpdated), Redirect::to("/"))),
        Err(err) => match rejection_notice(&err) {
            Some(notice) => {
                tracing::warn!("Rejected edit of todo {}: {}", id, err);
                Ok((
                    push_notice(jar, notice),
                    Redirect::to(&format!("/update/{}", id)),
                ))
            }
            None => Err(TodoError::Service(err)),
        },
    }
}

/// Handler for GET /delete/{id} that removes a todo.
#[tracing::instrument(skip(state, jar))]
async fn delete_todo_handler(
    State(state): State<TodoState>,
    jar: SignedCookieJar,
    TodoId(id): TodoId,
) -> Result<(SignedCookieJar, Redirect), TodoError> {
    state.todo_service().delete_todo_by_id(id).await?;
    Ok((push_notice(jar, Notice::TodoDeleted), Redirect::to("/")))
}

/// Creates and returns the todo router with all todo-related routes.
pub fn create_todo_router(state: TodoState) -> Router {
    Router::new()
        .route("/", get(list_todos_handler).post(create_todo_handler))
        .route(
            "/update/{id}",
            get(edit_todo_handler).post(update_todo_handler),
        )
        .route("/delete/{id}", get(delete_todo_handler))
        .with_state(state)
}
