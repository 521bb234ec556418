//! HTTP API for trip planning.
//!
//! `POST /plan-trip` runs the full planning loop; `/search-flights` and
//! `/search-hotels` expose the underlying search tools directly for the
//! form UI's preview widgets. Planning failures map to a 500 with a
//! diagnostic string; a partial itinerary is never returned.

pub mod types;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::agent::{prompt, Planner};
use crate::config::Config;
use crate::llm::{self, LlmClient};
use crate::tools::ToolRegistry;

use types::{
    ErrorResponse, FlightSearchRequest, HealthResponse, HotelSearchRequest, PlanResponse,
    TripRequest,
};

/// Shared application state.
pub struct AppState {
    config: Config,
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
}

/// Start the HTTP server. Blocks until shutdown.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let llm = llm::client_for(&config);
    let tools = Arc::new(ToolRegistry::new(&config));
    let addr = format!("{}:{}", config.host, config.port);

    let state = Arc::new(AppState { config, llm, tools });

    let app = Router::new()
        .route("/health", get(health))
        .route("/plan-trip", post(plan_trip))
        .route("/search-flights", post(search_flights))
        .route("/search-hotels", post(search_hotels))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn plan_trip(State(state): State<Arc<AppState>>, Json(req): Json<TripRequest>) -> Response {
    info!(destination = %req.destination, days = req.days, "received trip request");

    let start = normalize_start_date(&req.start_date);
    let end = start + chrono::Duration::days(i64::from(req.days));
    let start_date = start.format("%Y-%m-%d").to_string();
    let end_date = end.format("%Y-%m-%d").to_string();

    let user_prompt = prompt::trip_request_prompt(&prompt::TripParams {
        origin: &req.from_city,
        destination: &req.destination,
        start_date: &start_date,
        end_date: &end_date,
        days: req.days,
        travelers: req.travelers,
        budget: &req.budget,
        vibe: &req.vibe,
        notes: req.query.as_deref(),
    });

    let planner = Planner::new(&state.config, state.llm.clone(), state.tools.clone());
    match planner.plan(&user_prompt).await {
        Ok(outcome) => (StatusCode::OK, Json(PlanResponse { result: outcome.answer })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "trip planning failed");
            error_response(e.to_string())
        }
    }
}

async fn search_flights(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FlightSearchRequest>,
) -> Response {
    let args = json!({
        "origin": req.origin,
        "destination": req.destination,
        "travel_date": req.travel_date,
        "return_date": req.return_date,
    });
    run_tool(&state, "search_flights", args).await
}

async fn search_hotels(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HotelSearchRequest>,
) -> Response {
    let args = json!({
        "location": req.location,
        "check_in_date": req.check_in_date,
        "check_out_date": req.check_out_date,
    });
    run_tool(&state, "search_hotels", args).await
}

/// Run a search tool directly and forward its JSON result.
async fn run_tool(state: &AppState, name: &str, args: Value) -> Response {
    match state.tools.run(name, args).await {
        Ok(output) => match serde_json::from_str::<Value>(&output) {
            Ok(value) => (StatusCode::OK, Json(value)).into_response(),
            // Tools that return plain text (weather) pass through as-is.
            Err(_) => (StatusCode::OK, output).into_response(),
        },
        Err(e) => {
            tracing::error!(tool = %name, error = %e, "direct tool call failed");
            error_response(e.to_string())
        }
    }
}

fn error_response(error: String) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error })).into_response()
}

/// Clamp a past or unparsable start date to two days from now.
fn normalize_start_date(raw: &str) -> NaiveDate {
    let today = Local::now().date_naive();
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) if date >= today => date,
        _ => today + chrono::Duration::days(2),
    }
}
