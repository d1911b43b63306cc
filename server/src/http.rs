use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use entity::{Employee, EmployeeId, PeerRecognition, Perk};
use platform_api::ApiError;
use platform_db::SharedStore;
use products_recognition::{
    AwardReceipt, AwardRequest, EmployeeSummary, MessageGenerator, PeerAwardRequest, PeerReceipt,
    RecognitionError, RedeemRequest, RedemptionReceipt, TeamStats, award_kudos, employee_summary,
    leaderboard, peer_recognize, ranked, redeem_perk, team_stats,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, instrument};

use crate::{config::AppConfig, graphql::SchemaType};

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub schema: SchemaType,
    pub config: Arc<AppConfig>,
    pub messages: Arc<dyn MessageGenerator>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "kudos server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/employees", get(list_employees))
        .route("/api/employees/{id}", get(get_employee))
        .route("/api/employees/{id}/summary", get(get_employee_summary))
        .route("/api/perks", get(list_perks))
        .route("/api/peer-recognitions", get(list_peer_recognitions))
        .route("/api/kudos", post(award_handler))
        .route("/api/peer-recognize", post(peer_handler))
        .route("/api/redeem", post(redeem_handler))
        .route("/api/leaderboard", get(leaderboard_handler))
        .route("/api/rankings", get(rankings_handler))
        .route("/api/stats", get(stats_handler))
        .route("/graphql", get(graphiql).post(graphql_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    employees: usize,
    version: &'static str,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let employees = state.store.read().await.employees().len();
    Json(HealthResponse {
        ok: true,
        employees,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Mutation responses carry `success: true` next to the receipt fields.
#[derive(Serialize)]
struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

impl<T> Success<T> {
    fn new(body: T) -> Json<Self> {
        Json(Self {
            success: true,
            body,
        })
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum EmployeesResponse {
    One(Employee),
    All(Vec<Employee>),
}

#[derive(Debug, Deserialize)]
struct EmployeeQuery {
    id: Option<String>,
}

/// Ids that do not parse can never match a record.
fn employee_id(raw: &str) -> HttpResult<EmployeeId> {
    raw.trim()
        .parse()
        .map_err(|_| RecognitionError::EmployeeNotFound(0).into())
}

#[instrument(skip_all)]
async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<EmployeeQuery>,
) -> HttpResult<Json<EmployeesResponse>> {
    let store = state.store.read().await;
    let Some(raw) = query.id else {
        return Ok(Json(EmployeesResponse::All(store.employees().to_vec())));
    };
    let id = employee_id(&raw)?;
    let employee = store
        .employee(id)
        .cloned()
        .ok_or(RecognitionError::EmployeeNotFound(id))?;
    Ok(Json(EmployeesResponse::One(employee)))
}

#[instrument(skip_all)]
async fn get_employee(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> HttpResult<Json<Employee>> {
    let id = employee_id(&raw)?;
    let store = state.store.read().await;
    let employee = store
        .employee(id)
        .cloned()
        .ok_or(RecognitionError::EmployeeNotFound(id))?;
    Ok(Json(employee))
}

#[instrument(skip_all)]
async fn get_employee_summary(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> HttpResult<Json<EmployeeSummary>> {
    let id = employee_id(&raw)?;
    let store = state.store.read().await;
    Ok(Json(employee_summary(&store, id)?))
}

async fn list_perks(State(state): State<AppState>) -> Json<Vec<Perk>> {
    Json(state.store.read().await.perks().to_vec())
}

async fn list_peer_recognitions(State(state): State<AppState>) -> Json<Vec<PeerRecognition>> {
    let store = state.store.read().await;
    Json(store.peer_recognitions().cloned().collect())
}

#[instrument(skip_all)]
async fn award_handler(
    State(state): State<AppState>,
    payload: Result<Json<AwardRequest>, JsonRejection>,
) -> HttpResult<Json<Success<AwardReceipt>>> {
    let Json(request) = payload?;
    let mut store = state.store.write().await;
    let receipt = award_kudos(&mut store, &request, state.messages.as_ref(), Utc::now())?;
    Ok(Success::new(receipt))
}

#[instrument(skip_all)]
async fn peer_handler(
    State(state): State<AppState>,
    payload: Result<Json<PeerAwardRequest>, JsonRejection>,
) -> HttpResult<Json<Success<PeerReceipt>>> {
    let Json(request) = payload?;
    let mut store = state.store.write().await;
    let receipt = peer_recognize(&mut store, &request, state.messages.as_ref(), Utc::now())?;
    Ok(Success::new(receipt))
}

#[instrument(skip_all)]
async fn redeem_handler(
    State(state): State<AppState>,
    payload: Result<Json<RedeemRequest>, JsonRejection>,
) -> HttpResult<Json<Success<RedemptionReceipt>>> {
    let Json(request) = payload?;
    let mut store = state.store.write().await;
    let receipt = redeem_perk(&mut store, &request, Utc::now())?;
    Ok(Success::new(receipt))
}

#[derive(Debug, Deserialize)]
struct LeaderboardQuery {
    limit: Option<usize>,
}

#[instrument(skip_all)]
async fn leaderboard_handler(
    State(state): State<AppState>,
    query: Result<Query<LeaderboardQuery>, QueryRejection>,
) -> HttpResult<Json<Vec<Employee>>> {
    let Query(query) = query?;
    let limit = match query.limit {
        Some(0) => {
            return Err(ApiError::InvalidInput("limit must be at least 1".into()).into());
        }
        Some(limit) => limit,
        None => state.config.leaderboard_size,
    };
    let store = state.store.read().await;
    Ok(Json(
        leaderboard(store.employees(), limit)
            .into_iter()
            .cloned()
            .collect(),
    ))
}

async fn rankings_handler(State(state): State<AppState>) -> Json<Vec<Employee>> {
    let store = state.store.read().await;
    Json(ranked(store.employees()).into_iter().cloned().collect())
}

async fn stats_handler(State(state): State<AppState>) -> Json<TeamStats> {
    Json(team_stats(&*state.store.read().await))
}

async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

async fn graphql_handler(State(state): State<AppState>, request: GraphQLRequest) -> GraphQLResponse {
    state.schema.execute(request.into_inner()).await.into()
}

type HttpResult<T> = Result<T, HttpError>;

/// `ApiError` rendered as a status code and `{message, code}` body.
#[derive(Debug)]
struct HttpError(ApiError);

impl HttpError {
    fn status(&self) -> StatusCode {
        match self.0 {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) | ApiError::InsufficientFunds(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl From<RecognitionError> for HttpError {
    fn from(err: RecognitionError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ApiError::InvalidInput(rejection.body_text()))
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        Self(ApiError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.0.body())).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}
