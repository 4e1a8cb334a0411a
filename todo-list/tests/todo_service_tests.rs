use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use todo_list::entities::todo;
use todo_list::todo::{
    SeaOrmTodoRepository, TodoDraft, TodoRepository, TodoService, TodoServiceError,
};

mod common;

fn service(db: &DatabaseConnection) -> TodoService<SeaOrmTodoRepository<'_>> {
    TodoService::new(SeaOrmTodoRepository::new(db))
}

async fn count_todos(db: &DatabaseConnection) -> u64 {
    todo::Entity::find()
        .count(db)
        .await
        .expect("Failed to count todos")
}

#[tokio::test]
async fn can_create_and_read_todo() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let todo_service = service(&db);

    let created = todo_service
        .create_todo("Task 1", "Description 1")
        .await
        .expect("Failed to create todo");

    let stored = todo_service
        .get_todo_by_id(created.id())
        .await
        .expect("Failed to read todo");
    assert_eq!(stored, created);
    assert_eq!(stored.title(), "Task 1");
    assert_eq!(stored.description(), "Description 1");
    assert_eq!(count_todos(&db).await, 1);
}

#[tokio::test]
async fn can_reject_blank_title_without_storing() {
    let db = common::setup_db().await.expect("Failed to setup database");

    let result = service(&db).create_todo(" ", "Some description").await;

    assert!(matches!(result, Err(TodoServiceError::EmptyField)));
    assert_eq!(count_todos(&db).await, 0);
}

#[tokio::test]
async fn can_reject_second_todo_with_same_title() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let todo_service = service(&db);

    todo_service
        .create_todo("Unique Task", "Some description")
        .await
        .expect("Failed to create todo");
    let result = todo_service
        .create_todo("Unique Task", "Another description")
        .await;

    assert!(matches!(result, Err(TodoServiceError::DuplicateTitle(_))));
    assert_eq!(count_todos(&db).await, 1);
}

#[tokio::test]
async fn can_treat_titles_as_case_sensitive() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let todo_service = service(&db);

    todo_service
        .create_todo("Groceries", "Milk")
        .await
        .expect("Failed to create todo");
    todo_service
        .create_todo("groceries", "Eggs")
        .await
        .expect("Titles differing in case should both be accepted");

    assert_eq!(count_todos(&db).await, 2);
}

#[tokio::test]
async fn can_update_todo_keeping_its_title() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let todo_service = service(&db);
    let created = todo_service
        .create_todo("Update Task", "Initial description")
        .await
        .expect("Failed to create todo");

    let updated = todo_service
        .edit_todo_by_id(created.id(), "Update Task", "New description")
        .await
        .expect("Failed to update todo");

    assert_eq!(updated.id(), created.id());
    assert_eq!(updated.title(), "Update Task");
    assert_eq!(updated.description(), "New description");
    assert_eq!(updated.created_at(), created.created_at());
}

#[tokio::test]
async fn can_reject_rename_to_existing_title() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let todo_service = service(&db);
    todo_service
        .create_todo("Task One", "Description One")
        .await
        .expect("Failed to create first todo");
    let second = todo_service
        .create_todo("Task Two", "Description Two")
        .await
        .expect("Failed to create second todo");

    let result = todo_service
        .edit_todo_by_id(second.id(), "Task One", "New Description")
        .await;

    assert!(matches!(result, Err(TodoServiceError::DuplicateTitle(_))));
    let unchanged = todo_service
        .get_todo_by_id(second.id())
        .await
        .expect("Failed to read todo");
    assert_eq!(unchanged.title(), "Task Two");
    assert_eq!(unchanged.description(), "Description Two");
}

#[tokio::test]
async fn can_handle_update_when_todo_not_found() {
    let db = common::setup_db().await.expect("Failed to setup database");

    let result = service(&db)
        .edit_todo_by_id(99, "Title", "Description")
        .await;

    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.to_string(), "Todo with ID 99 not found");
    }
}

#[tokio::test]
async fn can_report_not_found_for_ids_beyond_storage_range() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let todo_service = service(&db);
    todo_service
        .create_todo("Task", "Description")
        .await
        .expect("Failed to create todo");
    let beyond = i32::MAX as u32 + 1;

    let read = todo_service.get_todo_by_id(beyond).await;
    let edit = todo_service
        .edit_todo_by_id(u32::MAX, "Title", "Description")
        .await;
    let delete = todo_service.delete_todo_by_id(beyond).await;

    assert!(matches!(read, Err(TodoServiceError::NotFound(id)) if id == beyond));
    assert!(matches!(edit, Err(TodoServiceError::NotFound(id)) if id == u32::MAX));
    assert!(matches!(delete, Err(TodoServiceError::NotFound(id)) if id == beyond));
    assert_eq!(count_todos(&db).await, 1);
}

#[tokio::test]
async fn can_delete_todo_permanently() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let todo_service = service(&db);
    let created = todo_service
        .create_todo("Task to Delete", "Delete me")
        .await
        .expect("Failed to create todo");

    let deleted = todo_service
        .delete_todo_by_id(created.id())
        .await
        .expect("Failed to delete todo");

    assert_eq!(deleted, created);
    let result = todo_service.get_todo_by_id(created.id()).await;
    assert!(matches!(result, Err(TodoServiceError::NotFound(_))));
}

#[tokio::test]
async fn can_report_not_found_when_deleting_twice() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let todo_service = service(&db);
    let created = todo_service
        .create_todo("Task", "Description")
        .await
        .expect("Failed to create todo");

    todo_service
        .delete_todo_by_id(created.id())
        .await
        .expect("Failed to delete todo");
    let second = todo_service.delete_todo_by_id(created.id()).await;

    assert!(matches!(second, Err(TodoServiceError::NotFound(id)) if id == created.id()));
}

#[tokio::test]
async fn can_not_reuse_ids_after_deletion() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let todo_service = service(&db);
    let first = todo_service
        .create_todo("First", "Description")
        .await
        .expect("Failed to create todo");
    let second = todo_service
        .create_todo("Second", "Description")
        .await
        .expect("Failed to create todo");
    todo_service
        .delete_todo_by_id(second.id())
        .await
        .expect("Failed to delete todo");

    let third = todo_service
        .create_todo("Third", "Description")
        .await
        .expect("Failed to create todo");

    assert!(third.id() > second.id());
    assert!(second.id() > first.id());
}

#[tokio::test]
async fn can_paginate_todos_in_creation_order() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let todo_service = service(&db);
    for number in 1..=7 {
        todo_service
            .create_todo(&format!("Task {}", number), "Description")
            .await
            .expect("Failed to create todo");
    }

    let first = todo_service.list_todos(1).await.expect("Failed to list page 1");
    let second = todo_service.list_todos(2).await.expect("Failed to list page 2");
    let third = todo_service.list_todos(3).await.expect("Failed to list page 3");

    let titles: Vec<&str> = first.items().iter().map(|todo| todo.title()).collect();
    assert_eq!(titles, ["Task 1", "Task 2", "Task 3", "Task 4", "Task 5"]);
    assert!(first.has_next());
    assert_eq!(first.total(), 7);
    assert_eq!(first.pages(), 2);

    assert_eq!(second.items().len(), 2);
    assert!(!second.has_next());
    assert!(second.has_prev());

    assert!(third.is_empty());
    assert_eq!(third.page(), 3);
}

#[tokio::test]
async fn can_page_far_past_the_end() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let repository = SeaOrmTodoRepository::new(&db);
    for number in 1..=7 {
        repository
            .insert(
                TodoDraft::parse(&format!("Task {}", number), "Description")
                    .expect("Valid draft"),
            )
            .await
            .expect("Failed to insert todo");
    }

    let page = repository
        .page(u64::MAX, 5)
        .await
        .expect("Failed to fetch page");

    assert!(page.is_empty());
    assert_eq!(page.page(), u64::MAX);
    assert_eq!(page.total(), 7);
    assert!(page.has_prev());
    assert!(!page.has_next());
}

#[tokio::test]
async fn can_handle_empty_todo_list() {
    let db = common::setup_db().await.expect("Failed to setup database");

    let page = service(&db).list_todos(1).await.expect("Failed to list todos");

    assert!(page.is_empty());
    assert_eq!(page.total(), 0);
    assert!(!page.has_prev());
    assert!(!page.has_next());
}

#[tokio::test]
async fn can_surface_storage_unique_violation_as_duplicate_title() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let repository = SeaOrmTodoRepository::new(&db);
    let draft = TodoDraft::parse("Racing Task", "Description").expect("Valid draft");

    repository
        .insert(draft.clone())
        .await
        .expect("Failed to insert todo");
    // Bypasses the service pre-check, as a concurrent request would.
    let result = repository.insert(draft).await;

    assert!(matches!(
        result,
        Err(TodoServiceError::DuplicateTitle(title)) if title == "Racing Task"
    ));
    assert_eq!(count_todos(&db).await, 1);
}

#[tokio::test]
async fn can_surface_storage_unique_violation_on_update() {
    let db = common::setup_db().await.expect("Failed to setup database");
    let repository = SeaOrmTodoRepository::new(&db);
    repository
        .insert(TodoDraft::parse("Taken", "Description").expect("Valid draft"))
        .await
        .expect("Failed to insert todo");
    let mut other = repository
        .insert(TodoDraft::parse("Other", "Description").expect("Valid draft"))
        .await
        .expect("Failed to insert todo");

    other.apply(TodoDraft::parse("Taken", "Changed").expect("Valid draft"));
    let result = repository.update(other).await;

    assert!(matches!(result, Err(TodoServiceError::DuplicateTitle(_))));
}
