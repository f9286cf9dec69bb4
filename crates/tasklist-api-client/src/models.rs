use serde::{Deserialize, Serialize};
use shared::primitives::{WrappedChronoDateTime, WrappedUuidV4};

// Wire models mirroring the server's JSON shapes; the client talks to the
// HTTP surface only and does not link the server crate.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: WrappedUuidV4,
    pub text: String,
    pub completed: bool,
    pub created_at: WrappedChronoDateTime,
}

#[derive(Debug, Serialize)]
pub struct CreateTodoRequest {
    pub text: String,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateTodoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// An absent `completed` asks the server to flip the stored value; a present
/// one (even `false`) sets it verbatim.
#[derive(Debug, Serialize)]
pub struct ToggleTodoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTodoResponse {
    pub message: String,
}
