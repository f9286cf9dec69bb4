use axum::extract::{Json, Path, State};
use std::sync::Arc;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{
    logic::todo::{
        CreateTodoRequest, CreateTodoResponse, DeleteTodoResponse, GetTodoResponse,
        ListTodosResponse, ToggleTodoRequest, ToggleTodoResponse, UpdateTodoRequest,
        UpdateTodoResponse, WithTodoId, create_todo, delete_todo, get_todo, list_todos,
        toggle_todo, update_todo,
    },
    repository::Repository,
};
use shared::{
    adapters::openapi::{CreatedResponse, JsonResponse},
    error::CommonError,
    primitives::WrappedUuidV4,
};

pub const PATH_PREFIX: &str = "/api";
pub const SERVICE_ROUTE_KEY: &str = "todos";

pub fn create_router() -> OpenApiRouter<Arc<TodoService>> {
    OpenApiRouter::new()
        .routes(routes!(route_list_todos))
        .routes(routes!(route_create_todo))
        .routes(routes!(route_get_todo))
        .routes(routes!(route_update_todo))
        .routes(routes!(route_toggle_todo))
        .routes(routes!(route_delete_todo))
}

#[utoipa::path(
    get,
    path = format!("{}/{}", PATH_PREFIX, SERVICE_ROUTE_KEY),
    tags = [SERVICE_ROUTE_KEY],
    responses(
        (status = 200, description = "List todos, newest first", body = ListTodosResponse),
        (status = 500, description = "Internal Server Error", body = CommonError),
    ),
    summary = "List todos",
    description = "List all todos ordered by creation time, newest first",
    operation_id = "list-todos",
)]
async fn route_list_todos(
    State(ctx): State<Arc<TodoService>>,
) -> JsonResponse<ListTodosResponse, CommonError> {
    let res = list_todos(&ctx.repository).await;
    JsonResponse::from(res)
}

#[utoipa::path(
    post,
    path = format!("{}/{}", PATH_PREFIX, SERVICE_ROUTE_KEY),
    tags = [SERVICE_ROUTE_KEY],
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Create todo", body = CreateTodoResponse),
        (status = 400, description = "Bad Request", body = CommonError),
        (status = 500, description = "Internal Server Error", body = CommonError),
    ),
    summary = "Create todo",
    description = "Create a new todo from non-empty text",
    operation_id = "create-todo",
)]
async fn route_create_todo(
    State(ctx): State<Arc<TodoService>>,
    Json(request): Json<CreateTodoRequest>,
) -> CreatedResponse<CreateTodoResponse, CommonError> {
    let res = create_todo(&ctx.repository, request).await;
    CreatedResponse::from(res)
}

#[utoipa::path(
    get,
    path = format!("{}/{}/{{todo_id}}", PATH_PREFIX, SERVICE_ROUTE_KEY),
    tags = [SERVICE_ROUTE_KEY],
    params(
        ("todo_id" = WrappedUuidV4, Path, description = "Todo ID"),
    ),
    responses(
        (status = 200, description = "Get todo by id", body = GetTodoResponse),
        (status = 404, description = "Not Found", body = CommonError),
        (status = 500, description = "Internal Server Error", body = CommonError),
    ),
    summary = "Get todo",
    description = "Retrieve a todo by its unique identifier",
    operation_id = "get-todo-by-id",
)]
async fn route_get_todo(
    State(ctx): State<Arc<TodoService>>,
    Path(todo_id): Path<WrappedUuidV4>,
) -> JsonResponse<GetTodoResponse, CommonError> {
    let res = get_todo(&ctx.repository, todo_id).await;
    JsonResponse::from(res)
}

#[utoipa::path(
    put,
    path = format!("{}/{}/{{todo_id}}", PATH_PREFIX, SERVICE_ROUTE_KEY),
    tags = [SERVICE_ROUTE_KEY],
    params(
        ("todo_id" = WrappedUuidV4, Path, description = "Todo ID"),
    ),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Update todo", body = UpdateTodoResponse),
        (status = 400, description = "Bad Request", body = CommonError),
        (status = 404, description = "Not Found", body = CommonError),
        (status = 500, description = "Internal Server Error", body = CommonError),
    ),
    summary = "Update todo",
    description = "Overwrite the given fields of a todo",
    operation_id = "update-todo",
)]
async fn route_update_todo(
    State(ctx): State<Arc<TodoService>>,
    Path(todo_id): Path<WrappedUuidV4>,
    Json(request): Json<UpdateTodoRequest>,
) -> JsonResponse<UpdateTodoResponse, CommonError> {
    let res = update_todo(
        &ctx.repository,
        WithTodoId {
            todo_id,
            inner: request,
        },
    )
    .await;
    JsonResponse::from(res)
}

#[utoipa::path(
    patch,
    path = format!("{}/{}/{{todo_id}}", PATH_PREFIX, SERVICE_ROUTE_KEY),
    tags = [SERVICE_ROUTE_KEY],
    params(
        ("todo_id" = WrappedUuidV4, Path, description = "Todo ID"),
    ),
    request_body = ToggleTodoRequest,
    responses(
        (status = 200, description = "Toggle todo completion", body = ToggleTodoResponse),
        (status = 404, description = "Not Found", body = CommonError),
        (status = 500, description = "Internal Server Error", body = CommonError),
    ),
    summary = "Toggle todo",
    description = "Set the completion flag when supplied, otherwise flip the stored value",
    operation_id = "toggle-todo",
)]
async fn route_toggle_todo(
    State(ctx): State<Arc<TodoService>>,
    Path(todo_id): Path<WrappedUuidV4>,
    Json(request): Json<ToggleTodoRequest>,
) -> JsonResponse<ToggleTodoResponse, CommonError> {
    let res = toggle_todo(
        &ctx.repository,
        WithTodoId {
            todo_id,
            inner: request,
        },
    )
    .await;
    JsonResponse::from(res)
}

#[utoipa::path(
    delete,
    path = format!("{}/{}/{{todo_id}}", PATH_PREFIX, SERVICE_ROUTE_KEY),
    tags = [SERVICE_ROUTE_KEY],
    params(
        ("todo_id" = WrappedUuidV4, Path, description = "Todo ID"),
    ),
    responses(
        (status = 200, description = "Delete todo", body = DeleteTodoResponse),
        (status = 404, description = "Not Found", body = CommonError),
        (status = 500, description = "Internal Server Error", body = CommonError),
    ),
    summary = "Delete todo",
    description = "Permanently remove a todo",
    operation_id = "delete-todo",
)]
async fn route_delete_todo(
    State(ctx): State<Arc<TodoService>>,
    Path(todo_id): Path<WrappedUuidV4>,
) -> JsonResponse<DeleteTodoResponse, CommonError> {
    let res = delete_todo(&ctx.repository, todo_id).await;
    JsonResponse::from(res)
}

pub struct TodoService {
    repository: Repository,
}

impl TodoService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

#[cfg(test)]
mod unit_test {
    use axum::Router;
    use axum::body::Body;
    use http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::ApiService;
    use crate::logic::todo::Todo;
    use crate::repository::Repository;
    use shared::primitives::SqlMigrationLoader;
    use shared::test_utils::repository::setup_in_memory_database;

    async fn setup_test_app() -> (libsql::Database, Router) {
        let (db, conn) = setup_in_memory_database(Repository::load_sql_migrations())
            .await
            .unwrap();
        let api_service = ApiService::new(Repository::new(conn));
        (db, crate::router::initiate_api_router(api_service))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_via_api(app: &Router, text: &str) -> Todo {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/todos", json!({ "text": text })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        serde_json::from_value(read_json(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_list_returns_single_entry() {
        let (_db, app) = setup_test_app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/todos",
                json!({ "text": "Buy milk" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let created = read_json(response).await;
        assert_eq!(created["text"], "Buy milk");
        assert_eq!(created["completed"], false);
        assert!(created["id"].is_string());
        assert!(created["createdAt"].is_string());

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/todos"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let todos = read_json(response).await;
        assert_eq!(todos.as_array().unwrap().len(), 1);
        assert_eq!(todos[0]["id"], created["id"]);
    }

    #[tokio::test]
    async fn test_list_returns_newest_created_first() {
        let (_db, app) = setup_test_app().await;

        let a = create_via_api(&app, "A").await;
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        let b = create_via_api(&app, "B").await;

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/todos"))
            .await
            .unwrap();
        let todos: Vec<Todo> = serde_json::from_value(read_json(response).await).unwrap();

        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].id, b.id);
        assert_eq!(todos[1].id, a.id);
    }

    #[tokio::test]
    async fn test_create_with_missing_or_blank_text_is_rejected() {
        let (_db, app) = setup_test_app().await;

        for body in [json!({}), json!({ "text": "" }), json!({ "text": "   " })] {
            let response = app
                .clone()
                .oneshot(json_request("POST", "/api/todos", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(read_json(response).await["message"], "Todo text is required");
        }

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/todos"))
            .await
            .unwrap();
        assert_eq!(read_json(response).await.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_get_todo_by_id() {
        let (_db, app) = setup_test_app().await;
        let created = create_via_api(&app, "Find me").await;

        let response = app
            .clone()
            .oneshot(empty_request("GET", &format!("/api/todos/{}", created.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let fetched: Todo = serde_json::from_value(read_json(response).await).unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let (_db, app) = setup_test_app().await;

        let response = app
            .clone()
            .oneshot(empty_request(
                "GET",
                &format!("/api/todos/{}", shared::primitives::WrappedUuidV4::new()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(read_json(response).await["message"], "Todo not found");
    }

    #[tokio::test]
    async fn test_put_overwrites_given_fields() {
        let (_db, app) = setup_test_app().await;
        let created = create_via_api(&app, "Old text").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/todos/{}", created.id),
                json!({ "text": "New text", "completed": true }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let updated = read_json(response).await;
        assert_eq!(updated["text"], "New text");
        assert_eq!(updated["completed"], true);
        assert_eq!(updated["id"], json!(created.id));
    }

    #[tokio::test]
    async fn test_patch_with_empty_body_flips_completion() {
        let (_db, app) = setup_test_app().await;
        let created = create_via_api(&app, "Flip me").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/todos/{}", created.id),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["completed"], true);

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/todos/{}", created.id),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(read_json(response).await["completed"], false);
    }

    #[tokio::test]
    async fn test_patch_with_explicit_false_is_honored() {
        let (_db, app) = setup_test_app().await;
        let created = create_via_api(&app, "Already incomplete").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/todos/{}", created.id),
                json!({ "completed": false }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["completed"], false);
    }

    #[tokio::test]
    async fn test_delete_removes_todo() {
        let (_db, app) = setup_test_app().await;
        let created = create_via_api(&app, "Remove me").await;

        let response = app
            .clone()
            .oneshot(empty_request(
                "DELETE",
                &format!("/api/todos/{}", created.id),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            read_json(response).await["message"],
            "Todo deleted successfully"
        );

        let response = app
            .clone()
            .oneshot(empty_request("GET", &format!("/api/todos/{}", created.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let (_db, app) = setup_test_app().await;

        let response = app
            .clone()
            .oneshot(empty_request(
                "DELETE",
                &format!("/api/todos/{}", shared::primitives::WrappedUuidV4::new()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(read_json(response).await["message"], "Todo not found");
    }

    #[test]
    fn test_openapi_spec_covers_all_routes() {
        let spec = crate::router::generate_openapi_spec();
        let paths = &spec.paths.paths;
        assert!(paths.contains_key("/api/todos"));
        assert!(paths.contains_key("/api/todos/{todo_id}"));
    }
}
