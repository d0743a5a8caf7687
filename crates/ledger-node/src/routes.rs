use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ledger_core::balance::VolumeCheck;
use ledger_core::consensus::ChainResponse;
use ledger_core::service::{
    BalanceResponse, NodeService, RegisterPeersRequest, TransactionRequest,
};
use ledger_core::{Block, LedgerError, Transaction};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::client::HttpPeerClient;

#[derive(Clone)]
pub struct AppState {
    pub service: NodeService<HttpPeerClient>,
}

impl AppState {
    pub fn new(service: NodeService<HttpPeerClient>) -> Self {
        Self { service }
    }
}

#[derive(Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MineResponse {
    pub message: String,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
    pub timestamp: f64,
}

impl From<Block> for MineResponse {
    fn from(block: Block) -> Self {
        Self {
            message: "New Block Forged".to_string(),
            index: block.index,
            transactions: block.transactions,
            proof: block.proof,
            previous_hash: block.previous_hash,
            timestamp: block.timestamp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionAccepted {
    pub message: String,
    pub index: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeersRegistered {
    pub message: String,
    pub total_nodes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub message: String,
    pub replaced: bool,
    pub chain: Vec<Block>,
}

/// Maps core errors onto HTTP statuses with a `{"error": ...}` body.
pub struct ApiError(LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LedgerError::InvalidPeerAddress(_)
            | LedgerError::InvalidAmount(_)
            | LedgerError::MissingField(_) => StatusCode::BAD_REQUEST,
            LedgerError::MiningCancelled => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::UnreachablePeer { .. } => StatusCode::BAD_GATEWAY,
            LedgerError::InvalidChain { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::EmptyChain => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(err = %self.0, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/mine", get(mine))
        .route("/chain", get(full_chain))
        .route("/transactions/new", post(new_transaction))
        .route("/balance/{address}", get(balance))
        .route("/nodes/register", post(register_nodes))
        .route("/nodes/resolve", get(consensus))
        .route("/smart-contract", get(smart_contract))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

async fn mine(State(state): State<AppState>) -> Result<Json<MineResponse>, ApiError> {
    let block = state.service.mine().await?;
    Ok(Json(block.into()))
}

async fn full_chain(State(state): State<AppState>) -> Json<ChainResponse> {
    Json(state.service.get_chain().await)
}

async fn new_transaction(
    State(state): State<AppState>,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionAccepted>), ApiError> {
    let index = state.service.submit_transaction(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(TransactionAccepted {
            message: format!("Transaction will be added to Block {index}"),
            index,
        }),
    ))
}

async fn balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<BalanceResponse> {
    Json(state.service.get_balance(&address).await)
}

async fn register_nodes(
    State(state): State<AppState>,
    Json(request): Json<RegisterPeersRequest>,
) -> Result<(StatusCode, Json<PeersRegistered>), ApiError> {
    let total_nodes = state.service.register_peers(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(PeersRegistered {
            message: "New nodes have been added to the chain".to_string(),
            total_nodes,
        }),
    ))
}

async fn consensus(State(state): State<AppState>) -> Json<ResolveResponse> {
    let resolution = state.service.resolve_consensus().await;
    let message = if resolution.replaced {
        "Replaced chain"
    } else {
        "Our chain is sound"
    };
    Json(ResolveResponse {
        message: message.to_string(),
        replaced: resolution.replaced,
        chain: resolution.chain,
    })
}

async fn smart_contract(State(state): State<AppState>) -> Json<VolumeCheck> {
    Json(state.service.volume_check().await)
}
