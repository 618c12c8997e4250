//! Store-level operations behind the `ingest-users` subcommands, with their JSON response bodies.
//!
//! | Subcommand | Function        | Body                                       |
//! |------------|-----------------|--------------------------------------------|
//! | `process`  | [`crate::pipeline::process_path`] | `{success, message, inserted, report}` |
//! | `report`   | [`report`]      | `{message}` or `{distribution}`            |
//! | `users`    | [`list_users`]  | `{success, count, users}`                  |
//! | `clear`    | [`clear_users`] | `{success, message}`                       |
//! | `health`   | [`health`]      | `{status, database}` or `{status, error}`  |

use serde::Serialize;

use crate::error::{IngestionError, IngestionResult};
use crate::report::{age_distribution, AgeReport};
use crate::store::RowStore;
use crate::types::StoredUser;

/// Message in the `clear` response body.
pub const USERS_CLEARED_MESSAGE: &str = "All users deleted";

/// Every stored row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub count: usize,
    pub users: Vec<StoredUser>,
}

/// Acknowledgement of a mutating command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Store health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HealthResponse {
    Ok { status: &'static str, database: &'static str },
    Unavailable { status: &'static str, error: String },
}

impl HealthResponse {
    /// True when the store opened and answered the ping.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// Body printed when a command fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl From<&IngestionError> for ErrorResponse {
    fn from(e: &IngestionError) -> Self {
        Self {
            success: false,
            error: e.to_string(),
        }
    }
}

/// Age distribution over everything currently stored.
pub fn report(store: &dyn RowStore) -> IngestionResult<AgeReport> {
    age_distribution(&store.table()?)
}

/// Every stored row in id order.
pub fn list_users(store: &dyn RowStore) -> IngestionResult<UsersResponse> {
    let users = store.users()?;
    Ok(UsersResponse {
        success: true,
        count: users.len(),
        users,
    })
}

/// Remove every stored row; ids restart at 1.
pub fn clear_users(store: &mut dyn RowStore) -> IngestionResult<MessageResponse> {
    store.clear()?;
    tracing::info!("all users deleted");
    Ok(MessageResponse {
        success: true,
        message: USERS_CLEARED_MESSAGE.to_string(),
    })
}

/// Open the store if needed and ping it. Never fails; failures are reported in the body.
pub fn health(store: &mut dyn RowStore) -> HealthResponse {
    let checked = if store.is_open() { Ok(()) } else { store.initialize() };
    match checked.and_then(|()| store.ping()) {
        Ok(()) => HealthResponse::Ok {
            status: "OK",
            database: "Connected",
        },
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            HealthResponse::Unavailable {
                status: "Error",
                error: e.to_string(),
            }
        }
    }
}
