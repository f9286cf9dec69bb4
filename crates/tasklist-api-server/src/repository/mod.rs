mod sqlite;

use tracing::debug;
use url::Url;

pub use sqlite::Repository;

use crate::logic::todo::Todo;
use shared::{
    error::CommonError,
    libsql::establish_db_connection,
    primitives::{SqlMigrationLoader, WrappedChronoDateTime, WrappedUuidV4},
};

// Repository parameter structs
#[derive(Debug)]
pub struct CreateTodo {
    pub id: WrappedUuidV4,
    pub text: String,
    pub completed: bool,
    pub created_at: WrappedChronoDateTime,
}

impl From<Todo> for CreateTodo {
    fn from(todo: Todo) -> Self {
        CreateTodo {
            id: todo.id,
            text: todo.text,
            completed: todo.completed,
            created_at: todo.created_at,
        }
    }
}

/// Only the fields carried as `Some` are overwritten.
#[derive(Debug)]
pub struct UpdateTodoFields {
    pub id: WrappedUuidV4,
    pub text: Option<String>,
    pub completed: Option<bool>,
}

// Repository trait
pub trait TodoRepositoryLike {
    async fn create_todo(&self, params: &CreateTodo) -> Result<(), CommonError>;
    async fn get_todos(&self) -> Result<Vec<Todo>, CommonError>;
    async fn get_todo_by_id(&self, id: &WrappedUuidV4) -> Result<Option<Todo>, CommonError>;
    async fn update_todo_fields(&self, params: &UpdateTodoFields) -> Result<u64, CommonError>;
    async fn delete_todo(&self, id: &WrappedUuidV4) -> Result<u64, CommonError>;
}

/// Sets up the database repository and runs migrations
pub async fn setup_repository(
    conn_string: &Url,
) -> Result<(libsql::Database, shared::libsql::Connection, Repository), CommonError> {
    debug!("conn_string: {}", conn_string);
    let migrations = Repository::load_sql_migrations();
    let (db, conn) = establish_db_connection(conn_string, Some(migrations)).await?;

    let repo = Repository::new(conn.clone());
    Ok((db, conn, repo))
}
