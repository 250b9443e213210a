use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{CalculatorInputs, FieldIssue, check_fields, compute};
use crate::store::{PlanStore, SavedPlan, StoreError, normalize_contact};

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn PlanStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PlanStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SavePlanPayload {
    contact: String,
    name: Option<String>,
    inputs: CalculatorInputs,
}

#[derive(Debug)]
struct SaveRequest {
    contact: String,
    plan: SavedPlan,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldCheckResponse {
    valid: bool,
    issues: Vec<FieldIssue>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SavePlanResponse {
    contact: String,
    plan: SavedPlan,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/compute",
            get(compute_get_handler).post(compute_post_handler),
        )
        .route("/api/fields/check", post(fields_check_handler))
        .route("/api/plans", post(save_plan_handler))
        .route("/api/plans/:contact", get(load_plan_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "retirement projection API listening");
    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn compute_get_handler(Query(inputs): Query<CalculatorInputs>) -> Response {
    compute_handler_impl(&inputs)
}

async fn compute_post_handler(Json(inputs): Json<CalculatorInputs>) -> Response {
    compute_handler_impl(&inputs)
}

fn compute_handler_impl(inputs: &CalculatorInputs) -> Response {
    let outputs = compute(inputs);
    match &outputs.failure {
        Some(reason) => info!(%reason, "projection rejected"),
        None => info!(
            required = outputs.required_funds,
            projected = outputs.projected_assets,
            gap = outputs.gap,
            "projection computed"
        ),
    }
    json_response(StatusCode::OK, outputs)
}

async fn fields_check_handler(Json(inputs): Json<CalculatorInputs>) -> Response {
    let issues = check_fields(&inputs);
    json_response(
        StatusCode::OK,
        FieldCheckResponse {
            valid: issues.is_empty(),
            issues,
        },
    )
}

async fn save_plan_handler(
    State(state): State<AppState>,
    Json(payload): Json<SavePlanPayload>,
) -> Response {
    let request = match save_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let store = Arc::clone(&state.store);
    let SaveRequest { contact, plan } = request;
    let saved = tokio::task::spawn_blocking(move || {
        store.save(&contact, &plan).map(|key| SavePlanResponse {
            contact: key,
            plan,
        })
    })
    .await;

    match saved {
        Ok(Ok(response)) => {
            info!(contact = %response.contact, name = %response.plan.name, "plan saved");
            json_response(StatusCode::OK, response)
        }
        Ok(Err(err)) => store_error_response(err),
        Err(err) => {
            warn!(error = %err, "plan save task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Plan could not be saved")
        }
    }
}

async fn load_plan_handler(
    State(state): State<AppState>,
    Path(contact): Path<String>,
) -> Response {
    let store = Arc::clone(&state.store);
    let loaded = tokio::task::spawn_blocking(move || store.load(&contact)).await;

    match loaded {
        Ok(Ok(Some(plan))) => json_response(StatusCode::OK, plan),
        Ok(Ok(None)) => error_response(StatusCode::NOT_FOUND, "No plan saved for this contact"),
        Ok(Err(err)) => store_error_response(err),
        Err(err) => {
            warn!(error = %err, "plan load task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Plan could not be loaded")
        }
    }
}

fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::InvalidContact | StoreError::NotFinite => {
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
        other => {
            warn!(error = %other, "plan store failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Plan store unavailable")
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn save_request_from_json(json: &str) -> Result<SaveRequest, String> {
    let payload = serde_json::from_str::<SavePlanPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    save_request_from_payload(payload)
}

/// Checks the contact up front so a bad address never reaches the store, and
/// computes the outputs that get saved with the plan.
fn save_request_from_payload(payload: SavePlanPayload) -> Result<SaveRequest, String> {
    let contact = normalize_contact(&payload.contact).map_err(|e| e.to_string())?;
    let name = payload
        .name
        .map(|name| name.trim().to_string())
        .unwrap_or_default();
    Ok(SaveRequest {
        contact,
        plan: SavedPlan::capture(name, payload.inputs),
    })
}
