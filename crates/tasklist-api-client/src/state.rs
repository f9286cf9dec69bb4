use tracing::error;

use crate::client::ApiClient;
use crate::models::Todo;
use shared::primitives::WrappedUuidV4;

const LOAD_FAILED: &str = "Failed to load todos. Please refresh the page.";
const ADD_FAILED: &str = "Failed to add todo. Please try again.";
const DELETE_FAILED: &str = "Failed to delete todo. Please try again.";
const UPDATE_FAILED: &str = "Failed to update todo. Please try again.";

/// In-memory mirror of the server's todo list.
///
/// The server is the source of truth: the list is replaced wholesale on the
/// initial load and patched from individual responses afterwards. `pending`
/// is a single client-wide flag — while any mutating call is outstanding,
/// all mutating controls are meant to be disabled.
#[derive(Debug)]
pub struct TodoListState {
    pub todos: Vec<Todo>,
    pub draft: String,
    pub pending: bool,
    pub last_error: Option<String>,
    pub initializing: bool,
}

impl Default for TodoListState {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoListState {
    pub fn new() -> Self {
        Self {
            todos: Vec::new(),
            draft: String::new(),
            pending: false,
            last_error: None,
            initializing: true,
        }
    }

    /// Initial load: replace the list wholesale. On failure the list stays
    /// as it was (empty on startup) and only the error message changes.
    pub async fn load(&mut self, client: &ApiClient) {
        self.last_error = None;
        match client.list_todos().await {
            Ok(todos) => {
                self.todos = todos;
            }
            Err(e) => {
                error!("Error fetching todos: {e:?}");
                self.last_error = Some(LOAD_FAILED.to_string());
            }
        }
        self.initializing = false;
    }

    pub async fn add_todo(&mut self, client: &ApiClient) {
        if self.draft.trim().is_empty() {
            return;
        }

        self.pending = true;
        self.last_error = None;
        match client.create_todo(&self.draft).await {
            Ok(todo) => {
                self.todos.push(todo);
                self.draft.clear();
            }
            Err(e) => {
                error!("Error adding todo: {e:?}");
                self.last_error = Some(ADD_FAILED.to_string());
            }
        }
        self.pending = false;
    }

    pub async fn delete_todo(&mut self, client: &ApiClient, todo_id: &WrappedUuidV4) {
        self.pending = true;
        self.last_error = None;
        match client.delete_todo(todo_id).await {
            Ok(_response) => {
                self.todos.retain(|todo| &todo.id != todo_id);
            }
            Err(e) => {
                error!("Error deleting todo: {e:?}");
                self.last_error = Some(DELETE_FAILED.to_string());
            }
        }
        self.pending = false;
    }

    /// Request the negation of the *cached* completion value, then adopt the
    /// server's returned snapshot rather than flipping locally.
    pub async fn toggle_todo(&mut self, client: &ApiClient, todo_id: &WrappedUuidV4) {
        let Some(current) = self
            .todos
            .iter()
            .find(|todo| &todo.id == todo_id)
            .map(|todo| todo.completed)
        else {
            return;
        };

        self.pending = true;
        self.last_error = None;
        match client.toggle_todo(todo_id, Some(!current)).await {
            Ok(updated) => {
                if let Some(slot) = self.todos.iter_mut().find(|todo| &todo.id == todo_id) {
                    *slot = updated;
                }
            }
            Err(e) => {
                error!("Error updating todo: {e:?}");
                self.last_error = Some(UPDATE_FAILED.to_string());
            }
        }
        self.pending = false;
    }
}
