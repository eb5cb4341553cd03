//! HTTP API 服务器
//!
//! 将会话协调器的三个操作暴露为 HTTP 接口，另附健康检查与审计日志查询。
use crate::config::ServerConfig;
use crate::models::{LogEntry, OutputStatus, SessionHandle};
use crate::session::{SessionCoordinator, SessionError};
use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

const OUTPUT_NOT_READY: &str = "Output not yet available. Please refresh the page.";

#[derive(Clone)]
pub struct AppState {
    coordinator: Arc<SessionCoordinator>,
    start_time: std::time::Instant,
}

impl AppState {
    pub fn new(coordinator: Arc<SessionCoordinator>) -> Self {
        Self {
            coordinator,
            start_time: std::time::Instant::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitUsernameForm {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitUsernameResponse {
    pub username: String,
    pub session_id: i64,
}

/// 错误到 HTTP 响应的映射
struct ApiError(SessionError);

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            SessionError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, "Session not found").into_response()
            }
            err if err.is_client_error() => {
                (StatusCode::BAD_REQUEST, err.to_string()).into_response()
            }
            err => {
                tracing::error!("[SERVER] 请求处理失败: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/create_session", post(create_session))
        .route("/submit_username", post(submit_username))
        .route("/view_output/:user_id", get(view_output))
        .route("/sessions/:user_id/logs", get(session_logs))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 启动服务器，直到 `shutdown` 完成
pub async fn run_server<F>(
    config: &ServerConfig,
    coordinator: Arc<SessionCoordinator>,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(AppState::new(coordinator));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    Ok(())
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSecs": state.start_time.elapsed().as_secs(),
    }))
}

async fn create_session(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Json<SessionHandle>, ApiError> {
    let handle = state.coordinator.create_session(&addr.ip().to_string())?;
    Ok(Json(handle))
}

async fn submit_username(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Form(form): Form<SubmitUsernameForm>,
) -> Result<Json<SubmitUsernameResponse>, ApiError> {
    let session_id = state.coordinator.attach_username(
        &form.user_id,
        &form.username,
        &addr.ip().to_string(),
    )?;
    Ok(Json(SubmitUsernameResponse {
        username: form.username,
        session_id,
    }))
}

async fn view_output(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    Ok(match state.coordinator.get_output(&user_id)? {
        OutputStatus::Ready(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            bytes,
        )
            .into_response(),
        OutputStatus::NotReady => (StatusCode::NOT_FOUND, OUTPUT_NOT_READY).into_response(),
    })
}

async fn session_logs(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<LogEntry>>, ApiError> {
    Ok(Json(state.coordinator.session_log(&user_id)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::database;
    use crate::session::ScriptedIdSource;
    use crate::task::SimulatedWorkload;
    use axum::body::{to_bytes, Body};
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app() -> (Router, TempDir) {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.output_dir = temp.path().join("outputs");
        let coordinator = SessionCoordinator::with_id_source(
            database::open_in_memory().unwrap(),
            &config,
            Arc::new(SimulatedWorkload),
            Arc::new(ScriptedIdSource::new(&[("4821", 8734)])),
        )
        .unwrap();

        let app = build_router(AppState::new(Arc::new(coordinator))).layer(MockConnectInfo(
            SocketAddr::from(([1, 2, 3, 4], 40000)),
        ));
        (app, temp)
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post_empty(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn submit_form(user_id: &str, username: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/submit_username")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("user_id={}&username={}", user_id, username)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _temp) = test_app();
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("\"status\":\"ok\""));
    }

    #[tokio::test]
    async fn test_session_flow_over_http() {
        let (app, _temp) = test_app();

        let response = app.clone().oneshot(post_empty("/create_session")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let handle: SessionHandle = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(
            handle,
            SessionHandle {
                user_id: "4821".to_string(),
                port: 8734
            }
        );

        let response = app.clone().oneshot(get("/view_output/4821")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, OUTPUT_NOT_READY);

        let mut body = None;
        for _ in 0..200 {
            let response = app.clone().oneshot(get("/view_output/4821")).await.unwrap();
            if response.status() == StatusCode::OK {
                body = Some(body_string(response).await);
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(
            body.as_deref(),
            Some("CUDA program output for user 4821\nSimulation complete!")
        );

        // 等待任务写完最后一条日志
        for _ in 0..200 {
            let response = app.clone().oneshot(get("/sessions/4821/logs")).await.unwrap();
            let log: Vec<LogEntry> = serde_json::from_str(&body_string(response).await).unwrap();
            if log.len() >= 3 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let response = app.clone().oneshot(submit_form("4821", "alice")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let submitted: SubmitUsernameResponse =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(submitted.username, "alice");

        let response = app.oneshot(get("/sessions/4821/logs")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let log: Vec<LogEntry> = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(log.first().unwrap().session_id, submitted.session_id);
        assert_eq!(
            log.last().unwrap().message,
            "Username: alice, IP: 1.2.3.4 - User submitted their username"
        );
    }

    #[tokio::test]
    async fn test_submit_username_unknown_session() {
        let (app, _temp) = test_app();
        let response = app.oneshot(submit_form("0000", "alice")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "Session not found");
    }

    #[tokio::test]
    async fn test_view_output_rejects_bad_user_id() {
        let (app, _temp) = test_app();
        let response = app.oneshot(get("/view_output/..%2Fetc")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logs_for_unknown_user() {
        let (app, _temp) = test_app();
        let response = app.oneshot(get("/sessions/0000/logs")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
