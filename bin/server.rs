// Expense Tracker - Web Server
// REST API over the expenses store, plus the bundled single-page UI.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use expense_tracker::{
    category_totals, delete_expense, find_anomalies, get_all_expenses, get_expense,
    insert_expense, overspending_suggestions, setup_database, update_expense, Expense,
    ExpensePayload, InsightConfig, ValidationError,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    insights: InsightConfig,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ErrorBody {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(ErrorBody {
            error: message.into(),
        })
    }

    fn from_validation(errors: &[ValidationError]) -> Json<Self> {
        let joined = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self::new(joined)
    }
}

#[derive(Serialize)]
struct MessageBody {
    message: &'static str,
}

#[derive(Serialize)]
struct CreatedBody {
    id: i64,
}

/// Pie chart payload: parallel label/value arrays, one slice per category.
#[derive(Serialize)]
struct ChartResponse {
    labels: Vec<String>,
    data: Vec<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InsightsResponse {
    category_totals: HashMap<String, f64>,
    anomalies: Vec<Expense>,
    suggestions: Vec<String>,
}

fn internal_error(err: anyhow::Error) -> axum::response::Response {
    eprintln!("Error handling request: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorBody::new("Internal server error"),
    )
        .into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /expenses - All expenses, newest first
async fn list_expenses(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match get_all_expenses(&conn) {
        Ok(expenses) => (StatusCode::OK, Json(expenses)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// POST /expenses - Create an expense, returns its new id
async fn create_expense(
    State(state): State<AppState>,
    Json(payload): Json<ExpensePayload>,
) -> impl IntoResponse {
    let expense = match payload.validate() {
        Ok(expense) => expense,
        Err(errors) => {
            return (
                StatusCode::BAD_REQUEST,
                ErrorBody::from_validation(&errors),
            )
                .into_response();
        }
    };

    let conn = state.db.lock().unwrap();

    match insert_expense(&conn, &expense) {
        Ok(id) => (StatusCode::OK, Json(CreatedBody { id })).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /expenses/:id
async fn get_expense_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match get_expense(&conn, id) {
        Ok(Some(expense)) => (StatusCode::OK, Json(expense)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, ErrorBody::new("Expense not found")).into_response(),
        Err(e) => internal_error(e),
    }
}

/// PUT /expenses/:id - Full-row overwrite
async fn update_expense_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ExpensePayload>,
) -> impl IntoResponse {
    let expense = match payload.validate() {
        Ok(expense) => expense,
        Err(errors) => {
            return (
                StatusCode::BAD_REQUEST,
                ErrorBody::from_validation(&errors),
            )
                .into_response();
        }
    };

    let conn = state.db.lock().unwrap();

    match update_expense(&conn, id, &expense) {
        Ok(true) => (StatusCode::OK, Json(MessageBody { message: "Updated" })).into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, ErrorBody::new("Expense not found")).into_response(),
        Err(e) => internal_error(e),
    }
}

/// DELETE /expenses/:id
async fn delete_expense_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match delete_expense(&conn, id) {
        Ok(true) => (StatusCode::OK, Json(MessageBody { message: "Deleted" })).into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, ErrorBody::new("Expense not found")).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /chart - Per-category totals shaped for the pie chart
async fn chart(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match get_all_expenses(&conn) {
        Ok(expenses) => {
            let totals = category_totals(&expenses);

            let mut labels: Vec<String> = totals.keys().cloned().collect();
            labels.sort();
            let data: Vec<f64> = labels.iter().map(|label| totals[label]).collect();

            (StatusCode::OK, Json(ChartResponse { labels, data })).into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// GET /insights - Totals, anomalies, and overspending suggestions
async fn insights(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match get_all_expenses(&conn) {
        Ok(expenses) => {
            let response = InsightsResponse {
                category_totals: category_totals(&expenses),
                anomalies: find_anomalies(&expenses, state.insights.anomaly_ratio),
                suggestions: overspending_suggestions(
                    &expenses,
                    state.insights.overspend_threshold,
                ),
            };

            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// GET / - Serve the bundled UI
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Main Server
// ============================================================================

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() {
    println!("💰 Expense Tracker - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = env::var("EXPENSES_DB").unwrap_or_else(|_| "expenses.db".to_string());
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let conn = Connection::open(&db_path).expect("Failed to open database");
    setup_database(&conn).expect("Failed to initialize database");
    println!("✓ Database ready: {}", db_path);

    let insights_config = InsightConfig {
        anomaly_ratio: env_f64("ANOMALY_RATIO", InsightConfig::default().anomaly_ratio),
        overspend_threshold: env_f64(
            "OVERSPEND_THRESHOLD",
            InsightConfig::default().overspend_threshold,
        ),
    };
    println!(
        "✓ Insights: anomaly ratio {} / overspend threshold {}",
        insights_config.anomaly_ratio, insights_config.overspend_threshold
    );

    // Create shared state
    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        insights: insights_config,
    };

    let app = Router::new()
        .route("/", get(serve_index))
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/:id",
            get(get_expense_by_id)
                .put(update_expense_by_id)
                .delete(delete_expense_by_id),
        )
        .route("/chart", get(chart))
        .route("/insights", get(insights))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://{}", bind_addr);
    println!("   API: http://{}/expenses", bind_addr);
    println!("   UI:  http://{}/", bind_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
