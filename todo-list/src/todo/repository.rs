//! Storage access for todos.
//!
//! [`TodoRepository`] is the narrow interface the service layer depends on;
//! [`SeaOrmTodoRepository`] implements it on top of a sea-orm connection.

use async_trait::async_trait;
use sea_orm::*;

use super::{Todo, TodoDraft, TodoPage, TodoServiceError};
use crate::entities::*;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn find_by_id(&self, id: u32) -> Result<Option<Todo>, TodoServiceError>;

    /// Finds the todo stored under exactly this title, if any.
    async fn find_by_title(&self, title: &str) -> Result<Option<Todo>, TodoServiceError>;

    /// Stores a new todo. A title already present in storage yields `DuplicateTitle`.
    async fn insert(&self, draft: TodoDraft) -> Result<Todo, TodoServiceError>;

    /// Persists the title and description of an existing todo.
    async fn update(&self, todo: Todo) -> Result<Todo, TodoServiceError>;

    /// Deletes a todo, returning whether a row was removed.
    async fn delete(&self, id: u32) -> Result<bool, TodoServiceError>;

    /// Fetches the 1-based `page` of todos ordered by ID.
    async fn page(&self, page: u64, per_page: u64) -> Result<TodoPage, TodoServiceError>;
}

pub struct SeaOrmTodoRepository<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl SeaOrmTodoRepository<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> SeaOrmTodoRepository<'_> {
        SeaOrmTodoRepository { db }
    }
}

/// Converts a todo ID to the primary key type; IDs outside its range cannot exist.
fn primary_key(id: u32) -> Option<i32> {
    i32::try_from(id).ok()
}

/// Maps a unique index violation on `title` to `DuplicateTitle`.
fn map_write_error(err: DbErr, title: &str) -> TodoServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::warn!("Title '{}' rejected by storage: {}", title, detail);
            TodoServiceError::DuplicateTitle(title.to_string())
        }
        _ => TodoServiceError::Database(err),
    }
}

#[async_trait]
impl TodoRepository for SeaOrmTodoRepository<'_> {
    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: u32) -> Result<Option<Todo>, TodoServiceError> {
        let Some(key) = primary_key(id) else {
            return Ok(None);
        };
        let model = todo::Entity::find_by_id(key).one(self.db).await?;
        Ok(model.map(Todo::from))
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_title(&self, title: &str) -> Result<Option<Todo>, TodoServiceError> {
        let model = todo::Entity::find()
            .filter(todo::Column::Title.eq(title))
            .one(self.db)
            .await?;
        Ok(model.map(Todo::from))
    }

    #[tracing::instrument(skip(self))]
    async fn insert(&self, draft: TodoDraft) -> Result<Todo, TodoServiceError> {
        let active_model = todo::ActiveModel {
            title: ActiveValue::Set(draft.title.clone()),
            description: ActiveValue::Set(draft.description.clone()),
            created_at: ActiveValue::Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };
        let created_model = active_model
            .insert(self.db)
            .await
            .map_err(|err| map_write_error(err, &draft.title))?;
        Ok(Todo::from(created_model))
    }

    #[tracing::instrument(skip(self))]
    async fn update(&self, todo: Todo) -> Result<Todo, TodoServiceError> {
        let key = primary_key(todo.id()).ok_or(TodoServiceError::NotFound(todo.id()))?;
        let active_model = todo::ActiveModel {
            id: ActiveValue::Unchanged(key),
            title: ActiveValue::Set(todo.title().to_string()),
            description: ActiveValue::Set(todo.description().to_string()),
            ..Default::default()
        };
        match active_model.update(self.db).await {
            Ok(updated_model) => Ok(Todo::from(updated_model)),
            Err(DbErr::RecordNotUpdated) => Err(TodoServiceError::NotFound(todo.id())),
            Err(err) => Err(map_write_error(err, todo.title())),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: u32) -> Result<bool, TodoServiceError> {
        let Some(key) = primary_key(id) else {
            return Ok(false);
        };
        let result = todo::Entity::delete_by_id(key).exec(self.db).await?;
        Ok(result.rows_affected > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn page(&self, page: u64, per_page: u64) -> Result<TodoPage, TodoServiceError> {
        let paginator = todo::Entity::find()
            .order_by_asc(todo::Column::Id)
            .paginate(self.db, per_page);
        let ItemsAndPagesNumber {
            number_of_items,
            number_of_pages,
        } = paginator.num_items_and_pages().await?;
        // Pages past the end are empty; skipping the query also keeps the offset from overflowing.
        let items = if page == 0 || page > number_of_pages {
            Vec::new()
        } else {
            paginator
                .fetch_page(page - 1)
                .await?
                .into_iter()
                .map(Todo::from)
                .collect()
        };
        Ok(TodoPage::new(
            items,
            page,
            per_page,
            number_of_items,
            number_of_pages,
        ))
    }
}
