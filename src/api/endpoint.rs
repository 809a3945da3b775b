//! The route handlers for the API endpoint and the health check.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    api::{
        operation::{Operation, OperationRequest},
        resolvers::resolve,
    },
    auth::{AuthService, RequestIdentity},
};

/// The state needed to run API operations.
#[derive(Debug, Clone)]
pub struct ApiState {
    /// Hashes passwords and issues tokens for signup and login.
    pub auth: AuthService,
    /// The database connection for reading and writing users and their data.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            auth: state.auth.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Run the operation in the request body for the caller resolved by the
/// identity middleware.
///
/// The body is parsed here rather than with the `Json` extractor so that
/// malformed requests get the same error envelope as every other failure.
/// Callers without an identity are turned away before the variables of a
/// protected operation are looked at.
pub async fn api_endpoint(
    State(state): State<ApiState>,
    Extension(identity): Extension<RequestIdentity>,
    body: Bytes,
) -> Response {
    let operation = match parse_operation(&body, &identity) {
        Ok(operation) => operation,
        Err(error) => return error.into_response(),
    };

    let operation_name = operation.name();

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match resolve(operation, &identity, &state.auth, &connection) {
        Ok(response) => response,
        Err(error) => {
            tracing::debug!("Operation {operation_name} failed: {error}");
            error.into_response()
        }
    }
}

fn parse_operation(body: &[u8], identity: &RequestIdentity) -> Result<Operation, Error> {
    let request = OperationRequest::from_json(body)?;

    if request.requires_identity() {
        identity.require()?;
    }

    request.into_operation()
}

/// Report that the server is up.
pub async fn get_health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
