use chrono::NaiveDateTime;
use std::fmt;

use crate::entities::*;

pub mod repository;
pub mod web;

pub use repository::{SeaOrmTodoRepository, TodoRepository};

/// Number of todos shown on one list page.
pub const PAGE_SIZE: u64 = 5;
/// Maximum title length, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;
/// Maximum description length, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct Todo {
    id: u32,
    title: String,
    description: String,
    created_at: NaiveDateTime,
}

impl Todo {
    pub fn new(id: u32, title: String, description: String, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            title,
            description,
            created_at,
        }
    }

    /// Returns the ID of the todo.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the moment the todo was created.
    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    /// Replaces the editable fields with an already validated draft.
    pub fn apply(&mut self, draft: TodoDraft) {
        self.title = draft.title;
        self.description = draft.description;
    }
}

impl fmt::Display for Todo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.id, self.title)
    }
}

impl From<todo::Model> for Todo {
    fn from(model: todo::Model) -> Self {
        Todo::new(
            model.id as u32,
            model.title,
            model.description,
            model.created_at,
        )
    }
}

/// A trimmed, validated title and description that is ready to be stored.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct TodoDraft {
    title: String,
    description: String,
}

impl TodoDraft {
    /// Trims both fields and checks that they are present and fit their columns.
    pub fn parse(title: &str, description: &str) -> Result<Self, TodoServiceError> {
        let title = title.trim();
        let description = description.trim();

        if title.is_empty() || description.is_empty() {
            return Err(TodoServiceError::EmptyField);
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(TodoServiceError::FieldTooLong {
                field: "title",
                max: MAX_TITLE_LENGTH,
            });
        }
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(TodoServiceError::FieldTooLong {
                field: "description",
                max: MAX_DESCRIPTION_LENGTH,
            });
        }

        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Decides whether a title is taken.
///
/// `holder` is the record currently stored under the requested title, if any, and
/// `editing` is the record being updated (`None` when creating). A record never
/// conflicts with itself.
pub fn title_conflicts(holder: Option<&Todo>, editing: Option<&Todo>) -> bool {
    match (holder, editing) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(holder), Some(editing)) => holder.id() != editing.id(),
    }
}

/// One window of the todo list.
#[derive(Debug, PartialEq, Clone)]
pub struct TodoPage {
    items: Vec<Todo>,
    page: u64,
    per_page: u64,
    total: u64,
    pages: u64,
}

impl TodoPage {
    pub fn new(items: Vec<Todo>, page: u64, per_page: u64, total: u64, pages: u64) -> Self {
        Self {
            items,
            page,
            per_page,
            total,
            pages,
        }
    }

    pub fn items(&self) -> &[Todo] {
        &self.items
    }

    /// The 1-based number of this page.
    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Total number of todos across all pages.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Total number of pages.
    pub fn pages(&self) -> u64 {
        self.pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether more todos exist after this page.
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn prev_page(&self) -> u64 {
        self.page.saturating_sub(1).max(1)
    }

    pub fn next_page(&self) -> u64 {
        self.page.saturating_add(1)
    }
}

/// Error type for TodoService operations.
#[derive(Debug, thiserror::Error)]
pub enum TodoServiceError {
    /// Title or description is blank after trimming.
    #[error("Title and description must not be empty")]
    EmptyField,
    /// A field is longer than its column allows.
    #[error("The {field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },
    /// Another todo already uses the title.
    #[error("A todo titled '{0}' already exists")]
    DuplicateTitle(String),
    #[error("Todo with ID {0} not found")]
    NotFound(u32),
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Create, list, update and delete operations over a [`TodoRepository`].
pub struct TodoService<R> {
    repository: R,
}

impl<R: TodoRepository> TodoService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Creates a new todo after validating the input.
    ///
    /// # Arguments
    ///
    /// * `title` - The raw title as submitted.
    /// * `description` - The raw description as submitted.
    ///
    /// # Returns
    ///
    /// The created `Todo`, or a validation error if the input is blank, too long or the title is taken.
    #[tracing::instrument(skip(self))]
    pub async fn create_todo(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Todo, TodoServiceError> {
        let draft = TodoDraft::parse(title, description)?;

        let holder = self.repository.find_by_title(draft.title()).await?;
        if title_conflicts(holder.as_ref(), None) {
            return Err(TodoServiceError::DuplicateTitle(draft.title));
        }

        let created = self.repository.insert(draft).await?;
        tracing::info!("Created todo {}", created);
        Ok(created)
    }

    /// Retrieves a todo by its ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_todo_by_id(&self, id: u32) -> Result<Todo, TodoServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(TodoServiceError::NotFound(id))
    }

    /// Edits the title and description of a todo.
    ///
    /// Keeping the current title is always allowed; a new title must not belong to another todo.
    ///
    /// # Returns
    ///
    /// The updated `Todo`, `NotFound` if the ID does not exist, or a validation error.
    #[tracing::instrument(skip(self))]
    pub async fn edit_todo_by_id(
        &self,
        id: u32,
        title: &str,
        description: &str,
    ) -> Result<Todo, TodoServiceError> {
        let mut todo = self.get_todo_by_id(id).await?;
        let draft = TodoDraft::parse(title, description)?;

        if draft.title() != todo.title() {
            let holder = self.repository.find_by_title(draft.title()).await?;
            if title_conflicts(holder.as_ref(), Some(&todo)) {
                return Err(TodoServiceError::DuplicateTitle(draft.title));
            }
        }

        todo.apply(draft);
        let updated = self.repository.update(todo).await?;
        tracing::info!("Updated todo {}", updated);
        Ok(updated)
    }

    /// Deletes a todo by its ID and returns the removed record.
    #[tracing::instrument(skip(self))]
    pub async fn delete_todo_by_id(&self, id: u32) -> Result<Todo, TodoServiceError> {
        let todo = self.get_todo_by_id(id).await?;
        if !self.repository.delete(id).await? {
            return Err(TodoServiceError::NotFound(id));
        }
        tracing::info!("Deleted todo {}", todo);
        Ok(todo)
    }

    /// Retrieves one page of todos in creation order.
    ///
    /// Page numbers start at 1; pages past the end are empty rather than an error.
    #[tracing::instrument(skip(self))]
    pub async fn list_todos(&self, page: u64) -> Result<TodoPage, TodoServiceError> {
        self.repository.page(page.max(1), PAGE_SIZE).await
    }
}
