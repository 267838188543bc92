//! HTTP server: content API, contact endpoint and static files

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::contact::{ContactError, ContactService};
use crate::content::{ContentKind, ContentRepository, Document};
use crate::Folio;

/// Shared handler state
pub struct AppState {
    pub repo: ContentRepository,
    pub contact: ContactService,
}

impl AppState {
    pub fn new(repo: ContentRepository, contact: ContactService) -> Self {
        Self { repo, contact }
    }

    /// Repository with environment draft toggles, in-memory rate limiting
    pub fn from_folio(folio: &Folio) -> Self {
        Self::new(
            ContentRepository::new(folio),
            ContactService::from_config(&folio.config.contact),
        )
    }
}

/// Build the router for the given state
pub fn router(state: Arc<AppState>, public_dir: PathBuf) -> Router {
    Router::new()
        .route("/api/blog", get(list_blog_posts))
        .route("/api/blog/:slug", get(get_blog_post))
        .route("/api/case-studies", get(list_case_studies))
        .route("/api/case-studies/:slug", get(get_case_study))
        .route(
            "/api/contact",
            get(contact_method_not_allowed).post(submit_contact),
        )
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(folio: &Folio, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::from_folio(folio));
    let policy = state.repo.policy();
    tracing::info!(
        "Drafts visible: blog posts={}, case studies={}",
        policy.show_draft_blog_posts,
        policy.show_draft_case_studies
    );

    let app = router(state, folio.public_dir.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

async fn list_blog_posts(State(state): State<Arc<AppState>>) -> Response {
    list_documents(state, ContentKind::BlogPost).await
}

async fn get_blog_post(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    get_document(state, ContentKind::BlogPost, slug).await
}

async fn list_case_studies(State(state): State<Arc<AppState>>) -> Response {
    list_documents(state, ContentKind::CaseStudy).await
}

async fn get_case_study(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    get_document(state, ContentKind::CaseStudy, slug).await
}

/// File reads and compilation run on the blocking pool
async fn list_documents(state: Arc<AppState>, kind: ContentKind) -> Response {
    match tokio::task::spawn_blocking(move || state.repo.list(kind)).await {
        Ok(docs) => Json(docs).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn get_document(state: Arc<AppState>, kind: ContentKind, slug: String) -> Response {
    let lookup = tokio::task::spawn_blocking(move || state.repo.get_by_slug(kind, &slug));
    match lookup.await {
        Ok(Some(doc)) => Json::<Document>(doc).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Not found"),
        Err(e) => internal_error(e),
    }
}

async fn submit_contact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let client = client_address(&headers);
    let result =
        tokio::task::spawn_blocking(move || state.contact.submit(&client, &body).map(|_| ())).await;

    match result {
        Ok(Ok(())) => (
            StatusCode::OK,
            Json(json!({ "message": "Message sent successfully" })),
        )
            .into_response(),
        Ok(Err(e)) => e.into_response(),
        Err(e) => internal_error(e),
    }
}

async fn contact_method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// First entry of `X-Forwarded-For`, or "unknown"
fn client_address(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn internal_error(e: impl std::fmt::Display) -> Response {
    tracing::error!("Request handler failed: {}", e);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error. Please try again later.",
    )
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        match self {
            ContactError::InvalidJson => {
                error_response(StatusCode::BAD_REQUEST, "Invalid JSON in request body")
            }
            ContactError::Invalid(reason) => {
                tracing::debug!("Invalid contact form: {}", reason);
                error_response(
                    StatusCode::BAD_REQUEST,
                    "Invalid form data. Please check all required fields.",
                )
            }
            ContactError::Spam => {
                error_response(StatusCode::BAD_REQUEST, "Message contains prohibited content")
            }
            ContactError::RateLimited { retry_after } => {
                let mut response = error_response(
                    StatusCode::TOO_MANY_REQUESTS,
                    "Too many requests. Please try again later.",
                );
                let secs = retry_after.as_secs().max(1);
                if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
                response
            }
            ContactError::Internal(e) => internal_error(format!("{:#}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::VisibilityPolicy;
    use axum::body::Body;
    use axum::http::Request;
    use std::fs;
    use tower::ServiceExt;

    fn site() -> (tempfile::TempDir, Router) {
        let tmp = tempfile::tempdir().unwrap();
        let studies = tmp.path().join("src/content/case-studies");
        let blog = tmp.path().join("src/content/blog");
        fs::create_dir_all(&studies).unwrap();
        fs::create_dir_all(&blog).unwrap();
        fs::create_dir_all(tmp.path().join("public")).unwrap();

        fs::write(
            studies.join("adas-simulator.mdx"),
            "---\ntitle: ADAS Simulator\nstatus: live\ntechnologies: [Rust]\n---\n\n\
             <CalloutBox type=\"success\">Shipped</CalloutBox>\n",
        )
        .unwrap();
        fs::write(
            studies.join("secret.mdx"),
            "---\ntitle: Secret\nstatus: draft\n---\nHidden\n",
        )
        .unwrap();
        fs::write(
            blog.join("hello.mdx"),
            "---\ntitle: Hello\nstatus: published\npublishedAt: 2024-01-02\n---\n# Hi\n",
        )
        .unwrap();
        fs::write(tmp.path().join("public/robots.txt"), "User-agent: *\n").unwrap();

        let folio = Folio::new(tmp.path()).unwrap();
        let state = AppState::new(
            ContentRepository::with_policy(&folio, VisibilityPolicy::default()),
            ContactService::from_config(&folio.config.contact),
        );
        let app = router(Arc::new(state), folio.public_dir.clone());
        (tmp, app)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn contact(client: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/contact")
            .header("content-type", "application/json")
            .header("x-forwarded-for", client)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_case_study_routes() {
        let (_tmp, app) = site();

        let (status, body) = send(&app, get("/api/case-studies")).await;
        assert_eq!(status, StatusCode::OK);
        let list: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["slug"], "adas-simulator");

        let (status, body) = send(&app, get("/api/case-studies/adas-simulator")).await;
        assert_eq!(status, StatusCode::OK);
        let doc: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(doc["frontmatter"]["title"], "ADAS Simulator");
        assert!(doc["html"].as_str().unwrap().contains("Shipped"));

        let (status, _) = send(&app, get("/api/case-studies/secret")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, get("/api/case-studies/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_blog_and_static_routes() {
        let (_tmp, app) = site();

        let (status, body) = send(&app, get("/api/blog/hello")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("publishedAt"));

        let (status, body) = send(&app, get("/robots.txt")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("User-agent"));
    }

    #[tokio::test]
    async fn test_contact_route() {
        let (_tmp, app) = site();
        let form = r#"{"name": "Ann", "email": "ann@example.com", "message": "Hi there"}"#;

        for _ in 0..5 {
            let (status, body) = send(&app, contact("203.0.113.7", form)).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.contains("Message sent successfully"));
        }
        let (status, _) = send(&app, contact("203.0.113.7, 10.0.0.1", form)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        let (status, body) = send(&app, contact("198.51.100.2", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Invalid JSON in request body"));

        let (status, body) = send(&app, get("/api/contact")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(body.contains("Method not allowed"));
    }

    #[test]
    fn test_client_address() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_address(&headers), "unknown");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 203.0.113.5 , 10.0.0.1"),
        );
        assert_eq!(client_address(&headers), "203.0.113.5");
    }

    #[test]
    fn test_rate_limited_response() {
        let response = ContactError::RateLimited {
            retry_after: std::time::Duration::from_secs(120),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "120");
    }

    #[test]
    fn test_contact_error_statuses() {
        assert_eq!(
            ContactError::InvalidJson.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ContactError::Spam.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ContactError::Internal(anyhow::anyhow!("down"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
