use axum::Router;
use utoipa::openapi::tag::TagBuilder;
use utoipa::openapi::{Info, OpenApi};

use crate::ApiService;

pub(crate) mod todo;

pub use todo::TodoService;

pub fn initiate_api_router(api_service: ApiService) -> Router {
    let (todo_router, _) = todo::create_router().split_for_parts();
    let todo_router = todo_router.with_state(api_service.todo_service);

    Router::new().merge(todo_router)
}

pub fn generate_openapi_spec() -> OpenApi {
    let (_, mut spec) = todo::create_router().split_for_parts();

    // Update OpenAPI metadata
    let mut info = Info::new("tasklist", "v1");
    info.description = Some("A minimal todo list service".to_string());
    spec.info = info;

    // Add tag descriptions
    spec.tags = Some(vec![
        TagBuilder::new()
            .name(todo::SERVICE_ROUTE_KEY)
            .description(Some(
                "Todo endpoints for creating, listing, updating, toggling, and deleting todos",
            ))
            .build(),
    ]);

    spec
}
