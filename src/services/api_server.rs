// src/services/api_server.rs
//! API Server for the document ledger
//!
//! Exposes the contract dispatcher over HTTP. Each request runs inside its
//! own ledger transaction, which is committed only when the invocation
//! succeeds.
//!
//! Endpoints:
//! - `POST /invoke` - run a contract operation by name
//! - `GET  /health` - liveness probe listing routable operations

use crate::contracts::dispatcher::{Dispatcher, Response};
use crate::models::error::{RegistryError, ALREADY_EXIST_ERROR, NOT_FOUND_ERROR};
use crate::storage::memory_ledger::InMemoryLedger;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

// API request and response structures

/// Request payload for a contract invocation
#[derive(Serialize, Deserialize)]
struct InvokeRequest {
    function: String,
    #[serde(default)]
    args: Vec<String>,
}

/// Response for a contract invocation
#[derive(Serialize, Deserialize, Debug)]
struct InvokeResponse {
    status: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<String>,
}

impl From<Response> for InvokeResponse {
    fn from(response: Response) -> Self {
        let ok = response.is_ok();
        InvokeResponse {
            status: response.status,
            code: response.code,
            message: (!response.message.is_empty()).then_some(response.message),
            payload: ok.then(|| String::from_utf8_lossy(&response.payload).into_owned()),
        }
    }
}

/// Response for the health probe
#[derive(Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    operations: Vec<String>,
    keys: usize,
}

/// API server state: the ledger and the dispatcher routing into the contract
#[derive(Clone)]
pub struct ApiServer {
    /// Ledger backing every invocation
    ledger: Arc<InMemoryLedger>,

    /// Operation-name router
    dispatcher: Dispatcher,
}

impl ApiServer {
    /// Creates a new instance of the API server
    ///
    /// # Arguments
    /// * `ledger` - Ledger shared by all requests
    pub fn new(ledger: Arc<InMemoryLedger>) -> Self {
        ApiServer {
            ledger,
            dispatcher: Dispatcher::new(),
        }
    }

    /// Runs `initLedger` once and commits it, as the platform does on instantiation.
    pub fn init_ledger(&self) -> Result<(), RegistryError> {
        let mut tx = self.ledger.begin();
        self.dispatcher.invoke(&mut tx, "initLedger", &[])?;
        tx.commit()?;
        Ok(())
    }

    /// Builds the router with all endpoints
    pub fn router(&self) -> Router {
        Router::new()
            .route("/invoke", post(Self::invoke_handler))
            .route("/health", get(Self::health_handler))
            .with_state(Arc::new(self.clone()))
    }

    /// Starts the API server and begins listening for requests
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "127.0.0.1:3000")
    pub async fn run(&self, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("API server listening on http://{}", addr);

        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    /// Runs one contract operation in a fresh transaction.
    ///
    /// # Endpoint
    /// POST /invoke
    ///
    /// # Request Body
    /// `{"function": "registerDocument", "args": ["doc1", ...]}`
    ///
    /// # Responses
    /// - 200 OK: operation succeeded, `payload` holds its result
    /// - 400 Bad Request: bad arguments or unknown function
    /// - 404 Not Found: no document under the key
    /// - 409 Conflict: document already registered
    /// - 500 Internal Server Error: ledger or serialization failure
    async fn invoke_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<InvokeRequest>,
    ) -> impl IntoResponse {
        let mut tx = state.ledger.begin();
        let mut response = state.dispatcher.respond(&mut tx, &payload.function, &payload.args);

        if response.is_ok() {
            debug!("committing {} with {} staged writes", payload.function, tx.pending_writes());
            if let Err(e) = tx.commit() {
                warn!("commit of {} rejected: {}", payload.function, e);
                response = Response::error(&RegistryError::StoreFailure(e));
            }
        }

        (status_for(response.code.as_deref()), Json(InvokeResponse::from(response)))
    }

    /// Liveness probe
    ///
    /// # Endpoint
    /// GET /health
    ///
    /// # Responses
    /// - 200 OK: routable operations and the number of keys on the ledger
    /// - 503 Service Unavailable: the ledger cannot be read
    async fn health_handler(State(state): State<Arc<ApiServer>>) -> impl IntoResponse {
        let operations = state
            .dispatcher
            .operations()
            .into_iter()
            .map(str::to_string)
            .collect();

        match state.ledger.key_count() {
            Ok(keys) => (
                StatusCode::OK,
                Json(HealthResponse { status: "ok".to_string(), operations, keys }),
            ),
            Err(e) => {
                warn!("health check failed: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(HealthResponse { status: e.to_string(), operations, keys: 0 }),
                )
            }
        }
    }
}

/// Maps an error sentinel onto an HTTP status
fn status_for(code: Option<&str>) -> StatusCode {
    match code {
        None => StatusCode::OK,
        Some("INVALID_ARGUMENT") => StatusCode::BAD_REQUEST,
        Some(NOT_FOUND_ERROR) => StatusCode::NOT_FOUND,
        Some(ALREADY_EXIST_ERROR) => StatusCode::CONFLICT,
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
