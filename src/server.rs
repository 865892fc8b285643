//! HTTP surface over the scoring engine.
//!
//! Serves the same contract [`crate::api::ApiClient`] consumes. Successful
//! bodies are wrapped as `{"data": ...}`; errors are `{"message": ...}`.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::api::types::{ErrorBody, LookupRequest};
use crate::api::{ClassReportQuery, PublishedExam};
use crate::records::MarkSheet;
use crate::scoring::{ScoringEngine, ScoringError, StudentExamResult};

#[derive(Clone)]
pub struct ServerState {
    engine: Arc<ScoringEngine<MarkSheet>>,
    token: Option<Arc<str>>,
}

impl ServerState {
    /// `token` guards the class report; `None` leaves it open
    pub fn new(engine: ScoringEngine<MarkSheet>, token: Option<String>) -> Self {
        Self {
            engine: Arc::new(engine),
            token: token.map(Arc::from),
        }
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.token.as_deref() else {
            return true;
        };
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|given| given.trim() == expected)
    }
}

#[derive(Debug, Serialize)]
struct Envelope<T> {
    data: T,
}

fn wrap<T>(data: T) -> Json<Envelope<T>> {
    Json(Envelope { data })
}

#[derive(Debug)]
struct Failure {
    status: StatusCode,
    message: String,
}

impl Failure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ScoringError> for Failure {
    fn from(err: ScoringError) -> Self {
        let status = if err.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::UNPROCESSABLE_ENTITY
        };
        Failure::new(status, err.to_string())
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: Some(self.message),
            error: None,
        };
        (self.status, Json(body)).into_response()
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/exams/published", get(published_exams))
        .route("/results/lookup", post(lookup_result))
        .route("/results/class-report", get(class_report))
        .with_state(state)
}

/// Serve until the process is stopped
pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "results server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn published_exams(State(state): State<ServerState>) -> Json<Envelope<Vec<PublishedExam>>> {
    wrap(state.engine.published_exams())
}

async fn lookup_result(
    State(state): State<ServerState>,
    Json(request): Json<LookupRequest>,
) -> Result<Json<Envelope<Option<StudentExamResult>>>, Failure> {
    debug!(exam_id = request.exam_id, "lookup request");
    let result = state
        .engine
        .lookup(request.exam_id, &request.roll_no, request.dob)
        .map_err(|e| {
            warn!(exam_id = request.exam_id, error = %e, "lookup could not be scored");
            Failure::from(e)
        })?;
    Ok(wrap(result))
}

async fn class_report(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(query): Query<ClassReportQuery>,
) -> Result<Json<Envelope<Vec<StudentExamResult>>>, Failure> {
    if !state.authorized(&headers) {
        return Err(Failure::new(StatusCode::UNAUTHORIZED, "Unauthorized"));
    }
    let results = state.engine.compute_class_results(
        query.exam_id,
        query.class_id,
        query.section_id,
        query.session_id,
    )?;
    Ok(wrap(results))
}
