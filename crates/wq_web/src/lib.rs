use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use wq_core::{Error, Result};

pub mod handlers;
pub mod state;

pub use state::AppState;

/// `*` (or an empty list) allows any origin.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o.trim() == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o.trim())
                .map_err(|e| Error::Config(format!("Invalid CORS origin {:?}: {}", o, e)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(layer.allow_origin(origins))
}

pub fn create_app(state: AppState, cors_origins: &[String]) -> Result<Router> {
    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins)?);

    Ok(Router::new()
        .route("/generate_quiz", post(handlers::generate_quiz))
        .route("/history", get(handlers::history))
        .route("/quiz/:id", get(handlers::get_quiz))
        .layer(layers)
        .with_state(Arc::new(state)))
}

pub mod prelude {
    pub use wq_core::{Error, QuizOutput, Result};
    pub use crate::{create_app, AppState};
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Html;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wq_core::{NewQuizRecord, QuizStorage};
    use wq_inference::models::DummyModel;
    use wq_inference::{Config, QuizGenerator};
    use wq_scraper::{HeuristicRecognizer, QuizManager, WikipediaScraper};
    use wq_storage::backends::InMemoryStorage;

    const PAGE: &str = r#"<html><body><h1 id="firstHeading">Photosynthesis</h1>
<div id="mw-content-text">
<p>Photosynthesis is a biological process used by many cellular organisms to convert light energy into chemical
energy, which is stored in organic compounds that can later be metabolized through cellular respiration.</p>
<h2><span class="mw-headline">Overview</span></h2>
<ul><li>Chlorophyll absorbs light.</li></ul>
</div></body></html>"#;

    async fn spawn_wiki_stub() -> String {
        let router = Router::new()
            .route("/wiki/Photosynthesis", get(|| async { Html(PAGE) }))
            .route("/wiki/Missing", get(|| async { StatusCode::NOT_FOUND }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn app(storage: Arc<InMemoryStorage>) -> Router {
        let scraper = WikipediaScraper::new(Arc::new(HeuristicRecognizer::new())).unwrap();
        let generator = QuizGenerator::new(Arc::new(DummyModel::new()), &Config::default());
        let manager = QuizManager::new(Arc::new(scraper), generator, storage);
        create_app(AppState::new(manager), &["*".to_string()]).unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn generate_request(url: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/generate_quiz")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "url": url }).to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_generate_then_read_back() {
        let base = spawn_wiki_stub().await;
        let storage = Arc::new(InMemoryStorage::new());

        let (status, quiz) = send(
            app(storage.clone()),
            generate_request(&format!("{}/wiki/Photosynthesis", base)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quiz["title"], "Photosynthesis");
        assert_eq!(quiz["questions"].as_array().unwrap().len(), 5);
        assert_eq!(quiz["sections"], json!(["Overview"]));

        let (status, history) = send(app(storage.clone()), get_request("/history")).await;
        assert_eq!(status, StatusCode::OK);
        let items = history.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Photosynthesis");
        assert!(items[0]["date_generated"].is_string());
        assert!(items[0]["date_generated_ms"].is_i64());
        assert_eq!(items[0]["quiz"]["questions"].as_array().unwrap().len(), 5);

        let id = items[0]["id"].as_i64().unwrap();
        let (status, stored) = send(app(storage), get_request(&format!("/quiz/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stored, quiz);
    }

    #[tokio::test]
    async fn test_generate_rejects_ftp_url() {
        let (status, body) = send(
            app(Arc::new(InMemoryStorage::new())),
            generate_request("ftp://example.com/x"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().starts_with("Scrape failed: "));
    }

    #[tokio::test]
    async fn test_generate_reports_fetch_failure() {
        let base = spawn_wiki_stub().await;
        let storage = Arc::new(InMemoryStorage::new());
        let (status, body) = send(
            app(storage.clone()),
            generate_request(&format!("{}/wiki/Missing", base)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("404"));
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_quiz_not_found() {
        let (status, body) = send(app(Arc::new(InMemoryStorage::new())), get_request("/quiz/99")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "Quiz not found"}));
    }

    #[tokio::test]
    async fn test_generate_rejects_body_without_url() {
        let request = Request::builder()
            .method("POST")
            .uri("/generate_quiz")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = send(app(Arc::new(InMemoryStorage::new())), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("url"));
    }

    #[tokio::test]
    async fn test_get_quiz_rejects_non_integer_id() {
        let (status, body) = send(app(Arc::new(InMemoryStorage::new())), get_request("/quiz/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_corrupt_record() {
        let storage = Arc::new(InMemoryStorage::new());
        let record = storage
            .save(NewQuizRecord {
                url: "https://en.wikipedia.org/wiki/Broken".to_string(),
                title: "Broken".to_string(),
                scraped_content: None,
                full_quiz_data: "{not json".to_string(),
            })
            .await
            .unwrap();

        let (status, body) = send(app(storage.clone()), get_request(&format!("/quiz/{}", record.id))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Stored quiz JSON invalid: "));

        let (status, history) = send(app(storage), get_request("/history")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history[0]["title"], "Broken");
        assert_eq!(history[0]["quiz"], json!({}));
    }

    #[test]
    fn test_cors_layer() {
        assert!(cors_layer(&[]).is_ok());
        assert!(cors_layer(&["http://localhost:3000".to_string()]).is_ok());
        assert!(matches!(
            cors_layer(&["bad\norigin".to_string()]),
            Err(Error::Config(_))
        ));
    }
}
