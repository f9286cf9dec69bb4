use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::repository::{Repository, TodoRepositoryLike, UpdateTodoFields};
use shared::{
    error::CommonError,
    primitives::{WrappedChronoDateTime, WrappedUuidV4},
};

// Domain model for Todo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: WrappedUuidV4,
    pub text: String,
    pub completed: bool,
    pub created_at: WrappedChronoDateTime,
}

pub struct WithTodoId<T> {
    pub todo_id: WrappedUuidV4,
    pub inner: T,
}

fn todo_not_found(todo_id: &WrappedUuidV4) -> CommonError {
    CommonError::NotFound {
        msg: "Todo not found".to_string(),
        lookup_id: todo_id.to_string(),
        source: None,
    }
}

pub type ListTodosResponse = Vec<Todo>;

pub async fn list_todos(repository: &Repository) -> Result<ListTodosResponse, CommonError> {
    let todos = repository.get_todos().await?;
    Ok(todos)
}

pub type GetTodoResponse = Todo;

pub async fn get_todo(
    repository: &Repository,
    todo_id: WrappedUuidV4,
) -> Result<GetTodoResponse, CommonError> {
    let todo = repository.get_todo_by_id(&todo_id).await?;

    match todo {
        Some(todo) => Ok(todo),
        None => Err(todo_not_found(&todo_id)),
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub text: Option<String>,
}

pub type CreateTodoResponse = Todo;

pub async fn create_todo(
    repository: &Repository,
    request: CreateTodoRequest,
) -> Result<CreateTodoResponse, CommonError> {
    let text = match request.text.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => {
            return Err(CommonError::InvalidRequest {
                msg: "Todo text is required".to_string(),
                source: None,
            });
        }
    };

    let todo = Todo {
        id: WrappedUuidV4::new(),
        text,
        completed: false,
        created_at: WrappedChronoDateTime::now(),
    };
    repository.create_todo(&todo.clone().into()).await?;

    Ok(todo)
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

pub type UpdateTodoResponse = Todo;

pub async fn update_todo(
    repository: &Repository,
    request: WithTodoId<UpdateTodoRequest>,
) -> Result<UpdateTodoResponse, CommonError> {
    let existing = repository.get_todo_by_id(&request.todo_id).await?;
    if existing.is_none() {
        return Err(todo_not_found(&request.todo_id));
    }

    // A provided text must satisfy the same non-empty rule as create; the
    // record's text invariant holds for its whole lifetime.
    let text = match request.inner.text.as_deref().map(str::trim) {
        Some(text) if text.is_empty() => {
            return Err(CommonError::InvalidRequest {
                msg: "Todo text is required".to_string(),
                source: None,
            });
        }
        Some(text) => Some(text.to_string()),
        None => None,
    };

    repository
        .update_todo_fields(&UpdateTodoFields {
            id: request.todo_id.clone(),
            text,
            completed: request.inner.completed,
        })
        .await?;

    get_todo(repository, request.todo_id).await
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ToggleTodoRequest {
    #[serde(default)]
    pub completed: Option<bool>,
}

pub type ToggleTodoResponse = Todo;

pub async fn toggle_todo(
    repository: &Repository,
    request: WithTodoId<ToggleTodoRequest>,
) -> Result<ToggleTodoResponse, CommonError> {
    let todo = match repository.get_todo_by_id(&request.todo_id).await? {
        Some(todo) => todo,
        None => return Err(todo_not_found(&request.todo_id)),
    };

    // A supplied value always wins, even `false`; flipping the stored value
    // only applies when the field is wholly absent from the request.
    let completed = request.inner.completed.unwrap_or(!todo.completed);

    repository
        .update_todo_fields(&UpdateTodoFields {
            id: request.todo_id.clone(),
            text: None,
            completed: Some(completed),
        })
        .await?;

    get_todo(repository, request.todo_id).await
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteTodoResponse {
    pub message: String,
}

pub async fn delete_todo(
    repository: &Repository,
    todo_id: WrappedUuidV4,
) -> Result<DeleteTodoResponse, CommonError> {
    let existing = repository.get_todo_by_id(&todo_id).await?;
    if existing.is_none() {
        return Err(todo_not_found(&todo_id));
    }

    repository.delete_todo(&todo_id).await?;

    Ok(DeleteTodoResponse {
        message: "Todo deleted successfully".to_string(),
    })
}
