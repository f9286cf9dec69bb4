use std::collections::BTreeMap;

use anyhow::Context;
use libsql::Value;

use crate::logic::todo::Todo;
use crate::repository::{CreateTodo, TodoRepositoryLike, UpdateTodoFields};
use shared::{
    error::CommonError,
    primitives::{SqlMigrationLoader, WrappedChronoDateTime, WrappedUuidV4},
};

#[derive(Clone)]
pub struct Repository {
    conn: shared::libsql::Connection,
}

impl Repository {
    pub fn new(conn: shared::libsql::Connection) -> Self {
        Self { conn }
    }
}

// Column order matches the SELECT lists below
impl TryFrom<&libsql::Row> for Todo {
    type Error = CommonError;
    fn try_from(row: &libsql::Row) -> Result<Self, Self::Error> {
        Ok(Todo {
            id: row.get::<WrappedUuidV4>(0)?,
            text: row.get::<String>(1)?,
            completed: row.get::<i64>(2)? != 0,
            created_at: row.get::<WrappedChronoDateTime>(3)?,
        })
    }
}

impl TodoRepositoryLike for Repository {
    async fn create_todo(&self, params: &CreateTodo) -> Result<(), CommonError> {
        self.conn
            .execute(
                r#"INSERT INTO todo (
    id,
    text,
    completed,
    created_at
) VALUES (
    ?1,
    ?2,
    ?3,
    ?4
)"#,
                libsql::params![
                    Value::from(params.id.clone()),
                    Value::from(params.text.clone()),
                    Value::from(params.completed as i64),
                    Value::from(params.created_at),
                ],
            )
            .await
            .context("Failed to create todo")
            .map_err(|e| CommonError::Repository {
                msg: e.to_string(),
                source: Some(e),
            })?;
        Ok(())
    }

    async fn get_todos(&self) -> Result<Vec<Todo>, CommonError> {
        let mut rows = self
            .conn
            .query(
                r#"SELECT id, text, completed, created_at
FROM todo
ORDER BY created_at DESC"#,
                (),
            )
            .await
            .context("Failed to get todos")
            .map_err(|e| CommonError::Repository {
                msg: e.to_string(),
                source: Some(e),
            })?;

        let mut items = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .context("Failed to read todo row")
            .map_err(|e| CommonError::Repository {
                msg: e.to_string(),
                source: Some(e),
            })?
        {
            items.push(Todo::try_from(&row)?);
        }

        Ok(items)
    }

    async fn get_todo_by_id(&self, id: &WrappedUuidV4) -> Result<Option<Todo>, CommonError> {
        let mut rows = self
            .conn
            .query(
                r#"SELECT id, text, completed, created_at
FROM todo
WHERE id = ?1"#,
                libsql::params![Value::from(id.clone())],
            )
            .await
            .context("Failed to get todo by id")
            .map_err(|e| CommonError::Repository {
                msg: e.to_string(),
                source: Some(e),
            })?;

        let row_opt = rows
            .next()
            .await
            .context("Failed to read todo row")
            .map_err(|e| CommonError::Repository {
                msg: e.to_string(),
                source: Some(e),
            })?;

        match row_opt {
            Some(row) => Ok(Some(Todo::try_from(&row)?)),
            None => Ok(None),
        }
    }

    async fn update_todo_fields(&self, params: &UpdateTodoFields) -> Result<u64, CommonError> {
        let text = params
            .text
            .clone()
            .map(Value::from)
            .unwrap_or(Value::Null);
        let completed = params
            .completed
            .map(|completed| Value::from(completed as i64))
            .unwrap_or(Value::Null);

        let changed = self
            .conn
            .execute(
                r#"UPDATE todo SET
    text = COALESCE(?2, text),
    completed = COALESCE(?3, completed)
WHERE id = ?1"#,
                libsql::params![Value::from(params.id.clone()), text, completed],
            )
            .await
            .context("Failed to update todo fields")
            .map_err(|e| CommonError::Repository {
                msg: e.to_string(),
                source: Some(e),
            })?;

        Ok(changed)
    }

    async fn delete_todo(&self, id: &WrappedUuidV4) -> Result<u64, CommonError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM todo WHERE id = ?1",
                libsql::params![Value::from(id.clone())],
            )
            .await
            .context("Failed to delete todo")
            .map_err(|e| CommonError::Repository {
                msg: e.to_string(),
                source: Some(e),
            })?;

        Ok(removed)
    }
}

impl SqlMigrationLoader for Repository {
    fn load_sql_migrations() -> BTreeMap<&'static str, BTreeMap<&'static str, &'static str>> {
        BTreeMap::from([(
            "sqlite",
            BTreeMap::from([
                (
                    "0001_create_todo.up.sql",
                    include_str!("../../../migrations/0001_create_todo.up.sql"),
                ),
                (
                    "0001_create_todo.down.sql",
                    include_str!("../../../migrations/0001_create_todo.down.sql"),
                ),
            ]),
        )])
    }
}

#[cfg(test)]
mod unit_test {
    use super::*;
    use shared::test_utils::repository::setup_in_memory_database;

    async fn setup_test_repo() -> (libsql::Database, Repository) {
        let (db, conn) = setup_in_memory_database(Repository::load_sql_migrations())
            .await
            .unwrap();
        (db, Repository::new(conn))
    }

    fn new_todo(text: &str) -> Todo {
        Todo {
            id: WrappedUuidV4::new(),
            text: text.to_string(),
            completed: false,
            created_at: WrappedChronoDateTime::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_todo() {
        let (_db, repo) = setup_test_repo().await;

        let todo = new_todo("Buy milk");
        repo.create_todo(&todo.clone().into()).await.unwrap();

        let fetched = repo.get_todo_by_id(&todo.id).await.unwrap();
        assert_eq!(fetched, Some(todo));
    }

    #[tokio::test]
    async fn test_get_todo_by_id_not_found() {
        let (_db, repo) = setup_test_repo().await;

        let fetched = repo.get_todo_by_id(&WrappedUuidV4::new()).await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_get_todos_orders_by_created_at_desc() {
        let (_db, repo) = setup_test_repo().await;

        use std::thread::sleep;
        use std::time::Duration;
        let mut created = Vec::new();
        for i in 0..3 {
            let todo = new_todo(&format!("Todo {i}"));
            repo.create_todo(&todo.clone().into()).await.unwrap();
            created.push(todo);
            sleep(Duration::from_millis(10)); // Ensure different timestamps
        }

        let todos = repo.get_todos().await.unwrap();
        assert_eq!(todos.len(), 3);
        assert_eq!(todos[0].id, created[2].id);
        assert_eq!(todos[1].id, created[1].id);
        assert_eq!(todos[2].id, created[0].id);
    }

    #[tokio::test]
    async fn test_update_todo_fields_partial() {
        let (_db, repo) = setup_test_repo().await;

        let todo = new_todo("Original");
        repo.create_todo(&todo.clone().into()).await.unwrap();

        // Completed only; text stays
        let changed = repo
            .update_todo_fields(&UpdateTodoFields {
                id: todo.id.clone(),
                text: None,
                completed: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(changed, 1);

        let fetched = repo.get_todo_by_id(&todo.id).await.unwrap().unwrap();
        assert_eq!(fetched.text, "Original");
        assert!(fetched.completed);

        // Text only; completed stays
        let changed = repo
            .update_todo_fields(&UpdateTodoFields {
                id: todo.id.clone(),
                text: Some("Renamed".to_string()),
                completed: None,
            })
            .await
            .unwrap();
        assert_eq!(changed, 1);

        let fetched = repo.get_todo_by_id(&todo.id).await.unwrap().unwrap();
        assert_eq!(fetched.text, "Renamed");
        assert!(fetched.completed);
        assert_eq!(fetched.created_at, todo.created_at);
    }

    #[tokio::test]
    async fn test_update_todo_fields_missing_row_changes_nothing() {
        let (_db, repo) = setup_test_repo().await;

        let changed = repo
            .update_todo_fields(&UpdateTodoFields {
                id: WrappedUuidV4::new(),
                text: Some("Ghost".to_string()),
                completed: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(changed, 0);
    }

    #[tokio::test]
    async fn test_delete_todo_reports_removed_rows() {
        let (_db, repo) = setup_test_repo().await;

        let todo = new_todo("Remove me");
        repo.create_todo(&todo.clone().into()).await.unwrap();

        let removed = repo.delete_todo(&todo.id).await.unwrap();
        assert_eq!(removed, 1);
        assert!(repo.get_todo_by_id(&todo.id).await.unwrap().is_none());

        let removed = repo.delete_todo(&todo.id).await.unwrap();
        assert_eq!(removed, 0);
    }
}
