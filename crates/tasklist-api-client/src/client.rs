use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::models::{
    CreateTodoRequest, DeleteTodoResponse, Todo, ToggleTodoRequest, UpdateTodoRequest,
};
use shared::{
    error::{CommonError, ErrorResponse},
    primitives::WrappedUuidV4,
};

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    fn todos_url(&self) -> Result<Url, CommonError> {
        Ok(self.base_url.join("/api/todos")?)
    }

    fn todo_url(&self, todo_id: &WrappedUuidV4) -> Result<Url, CommonError> {
        Ok(self.base_url.join(&format!("/api/todos/{todo_id}"))?)
    }

    pub async fn list_todos(&self) -> Result<Vec<Todo>, CommonError> {
        let response = self.http.get(self.todos_url()?).send().await?;
        decode_json(response).await
    }

    pub async fn get_todo(&self, todo_id: &WrappedUuidV4) -> Result<Todo, CommonError> {
        let response = self.http.get(self.todo_url(todo_id)?).send().await?;
        decode_json(response).await
    }

    pub async fn create_todo(&self, text: &str) -> Result<Todo, CommonError> {
        let response = self
            .http
            .post(self.todos_url()?)
            .json(&CreateTodoRequest {
                text: text.to_string(),
            })
            .send()
            .await?;
        decode_json(response).await
    }

    pub async fn update_todo(
        &self,
        todo_id: &WrappedUuidV4,
        request: &UpdateTodoRequest,
    ) -> Result<Todo, CommonError> {
        let response = self
            .http
            .put(self.todo_url(todo_id)?)
            .json(request)
            .send()
            .await?;
        decode_json(response).await
    }

    pub async fn toggle_todo(
        &self,
        todo_id: &WrappedUuidV4,
        completed: Option<bool>,
    ) -> Result<Todo, CommonError> {
        let response = self
            .http
            .patch(self.todo_url(todo_id)?)
            .json(&ToggleTodoRequest { completed })
            .send()
            .await?;
        decode_json(response).await
    }

    pub async fn delete_todo(
        &self,
        todo_id: &WrappedUuidV4,
    ) -> Result<DeleteTodoResponse, CommonError> {
        let response = self.http.delete(self.todo_url(todo_id)?).send().await?;
        decode_json(response).await
    }
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CommonError> {
    let status = response.status();
    let url = response.url().clone();

    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    // Error bodies carry `{message}`; fall back to the status line when the
    // body does not parse.
    let message = response
        .json::<ErrorResponse>()
        .await
        .map(|body| body.message)
        .unwrap_or_else(|_e| format!("unexpected status {status}"));

    Err(match status {
        StatusCode::NOT_FOUND => CommonError::NotFound {
            msg: message,
            lookup_id: url.to_string(),
            source: None,
        },
        StatusCode::BAD_REQUEST => CommonError::InvalidRequest {
            msg: message,
            source: None,
        },
        _ => CommonError::InvalidResponse {
            msg: message,
            source: None,
        },
    })
}
