pub mod client;
pub mod models;
pub mod state;

pub use client::ApiClient;
pub use state::TodoListState;
