use std::sync::Arc;
use axum::http::StatusCode;
use crate::circulation::domain::locks::PatronLocks;
use crate::core::command::CommandError;
use crate::core::domain::Configuration;
use crate::core::repository::{LibraryStore, RepositoryStore};

// AppState is shared by all requests: the store and the patron locks must
// outlive a single request for the in-memory store and the quota gate to work.
#[derive(Clone)]
pub struct AppState {
    pub config: Configuration,
    pub store_kind: RepositoryStore,
    pub store: Arc<dyn LibraryStore>,
    pub locks: Arc<PatronLocks>,
}

impl AppState {
    pub fn new(config: Configuration, store_kind: RepositoryStore, store: Arc<dyn LibraryStore>) -> AppState {
        AppState {
            config,
            store_kind,
            store,
            locks: Arc::new(PatronLocks::new()),
        }
    }
}

pub type ServerError = (StatusCode, String);

pub fn json_to_server_error(err: serde_json::Error) -> ServerError {
    (StatusCode::BAD_REQUEST, format!("{}", err))
}

impl From<CommandError> for ServerError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Database { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{:?}", err))
            }
            CommandError::Conflict { .. } => {
                (StatusCode::CONFLICT, format!("{:?}", err))
            }
            CommandError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, format!("{:?}", err))
            }
            CommandError::Rejected { .. } => {
                (StatusCode::CONFLICT, format!("{:?}", err))
            }
            CommandError::Runtime { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{:?}", err))
            }
            CommandError::Serialization { .. } => {
                (StatusCode::BAD_REQUEST, format!("{:?}", err))
            }
            CommandError::Validation { .. } => {
                (StatusCode::BAD_REQUEST, format!("{:?}", err))
            }
        }
    }
}
