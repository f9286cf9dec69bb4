use std::sync::Arc;

use crate::{repository::Repository, router::todo::TodoService};

pub mod logic;
pub mod repository;
pub mod router;

#[derive(Clone)]
pub struct ApiService {
    pub todo_service: Arc<TodoService>,
}

impl ApiService {
    pub fn new(repository: Repository) -> Self {
        Self {
            todo_service: Arc::new(TodoService::new(repository)),
        }
    }
}
