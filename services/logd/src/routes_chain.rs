//! The add-chain append pipeline
//!
//! One request appends one certificate: decode the body, take the
//! single-writer gate, then read-frontier / add / insert / write-frontier /
//! commit inside one backend transaction. Every request terminates in
//! exactly one [`Outcome`], and the observability hooks fire exactly once
//! per request no matter where the pipeline stopped.

use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use logstore::LogStore;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::info;

use crate::outcome::Outcome;
use crate::state::SharedState;
use crate::telemetry::TransactionTimer;

/// How long a request may wait for the append slot before giving up.
const GATE_DEADLINE: Duration = Duration::from_millis(500);

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Deserialize)]
pub struct AddChainRequest {
    pub chain: Vec<String>,
}

pub async fn add_chain<S: LogStore>(
    State(state): State<SharedState<S>>,
    req: Request,
) -> (StatusCode, String) {
    let started = Instant::now();

    let (outcome, tree_size) = match append(&state, req).await {
        Ok(size) => (Outcome::Success, size),
        Err(outcome) => (outcome, 0),
    };

    let elapsed = started.elapsed().as_secs_f64();
    metrics::histogram!("log_handler_time_seconds", elapsed);
    metrics::increment_counter!("add_chain_outcome_total", "outcome" => outcome.label());

    let status = outcome.status();
    let message = outcome.message();
    info!(status = status.as_u16(), tree_size, elapsed, "{message}");

    (status, format!("{message}\n"))
}

async fn append<S: LogStore>(
    state: &SharedState<S>,
    req: Request,
) -> Result<i64, Outcome> {
    // Extract the certificate from the request. Deliberately unvalidated:
    // no check that it parses as X.509, no chain verification, no
    // deduplication. Only the first chain element is consumed.
    let body = to_bytes(req.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| Outcome::BodyRead(e.to_string()))?;

    let request: AddChainRequest =
        serde_json::from_slice(&body).map_err(|e| Outcome::JsonParse(e.to_string()))?;

    let first = request.chain.first().ok_or(Outcome::EmptyChain)?;

    let cert = BASE64
        .decode(first)
        .map_err(|e| Outcome::Base64Decode(e.to_string()))?;

    // The transaction runs in its own task: a client that disconnects
    // mid-request must not abort a transaction that is already in flight.
    let state = state.clone();
    tokio::spawn(transact(state, cert))
        .await
        .expect("append task panicked")
}

async fn transact<S: LogStore>(state: SharedState<S>, cert: Vec<u8>) -> Result<i64, Outcome> {
    // Await the append slot. Tokio's lock future leaves the wait queue
    // when the timeout drops it, so a timed-out request can never acquire
    // the gate later.
    let _gate = timeout(GATE_DEADLINE, state.gate.lock())
        .await
        .map_err(|_| Outcome::DbLockTimeout)?;

    let mut tx = state
        .store
        .begin()
        .await
        .map_err(|e| Outcome::TxBegin(e.to_string()))?;
    let _tx_timer = TransactionTimer::start();

    let mut frontier = match tx.read_frontier().await {
        Ok(f) => f,
        Err(e) => {
            let _ = tx.rollback().await;
            return Err(Outcome::ReadFrontier(e.to_string()));
        }
    };

    // Update the frontier with this certificate.
    let update_started = Instant::now();
    frontier.add(&cert);
    let tree_size = frontier.size() as i64;
    let tree_head = frontier.head().expect("frontier is non-empty after add");
    metrics::histogram!(
        "update_time_seconds",
        update_started.elapsed().as_secs_f64()
    );

    let timestamp = Utc::now().timestamp();
    if let Err(e) = tx
        .insert_certificate(timestamp, tree_size, &tree_head, &frontier, &cert)
        .await
    {
        let _ = tx.rollback().await;
        return Err(Outcome::LogCert(e.to_string()));
    }

    if let Err(e) = tx.write_frontier(&frontier).await {
        let _ = tx.rollback().await;
        return Err(Outcome::WriteFrontier(e.to_string()));
    }

    tx.commit()
        .await
        .map_err(|e| Outcome::TxCommit(e.to_string()))?;

    Ok(tree_size)
}
