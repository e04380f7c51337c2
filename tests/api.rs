use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use recipe_explorer::app::build_app;
use recipe_explorer::recipes::client::{RecipeApiError, RecipeClient, SearchParams};
use recipe_explorer::state::AppState;

/// Records the parameters the router hands to the gateway.
struct CapturingClient {
    seen: Arc<Mutex<Option<SearchParams>>>,
}

#[async_trait]
impl RecipeClient for CapturingClient {
    async fn search(&self, params: SearchParams) -> Result<Value, RecipeApiError> {
        *self.seen.lock().unwrap() = Some(params);
        Ok(json!({ "results": [], "totalResults": 0 }))
    }

    async fn get_information(
        &self,
        recipe_id: i64,
        _include_nutrition: bool,
    ) -> Result<Value, RecipeApiError> {
        Ok(json!({ "id": recipe_id, "title": "Pasta" }))
    }
}

#[derive(Clone, Copy)]
enum FailureMode {
    Auth,
    Upstream,
    NotFound,
}

struct FailingClient(FailureMode);

impl FailingClient {
    fn err(&self) -> RecipeApiError {
        match self.0 {
            FailureMode::Auth => RecipeApiError::Auth,
            FailureMode::Upstream => RecipeApiError::Upstream("status 500: boom".into()),
            FailureMode::NotFound => RecipeApiError::NotFound,
        }
    }
}

#[async_trait]
impl RecipeClient for FailingClient {
    async fn search(&self, _params: SearchParams) -> Result<Value, RecipeApiError> {
        Err(self.err())
    }

    async fn get_information(
        &self,
        _recipe_id: i64,
        _include_nutrition: bool,
    ) -> Result<Value, RecipeApiError> {
        Err(self.err())
    }
}

fn state_with(client: Arc<dyn RecipeClient>) -> AppState {
    let base = AppState::fake();
    AppState::from_parts(base.db.clone(), base.config.clone(), client)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    get_with_auth(app, uri, None).await
}

async fn get_with_auth(app: axum::Router, uri: &str, bearer: Option<&str>) -> (StatusCode, Value) {
    let mut req = Request::builder().uri(uri);
    if let Some(token) = bearer {
        req = req.header("Authorization", format!("Bearer {token}"));
    }
    let res = app
        .oneshot(req.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

#[tokio::test]
async fn health_routes_answer_without_auth() {
    let app = build_app(AppState::fake());
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Healthy" }));

    let app = build_app(AppState::fake());
    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Healthy" }));
}

#[tokio::test]
async fn me_without_header_is_unauthorized() {
    let app = build_app(AppState::fake());
    let (status, body) = get(app, "/users/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn me_with_garbage_token_is_unauthorized() {
    let app = build_app(AppState::fake());
    let (status, body) = get_with_auth(app, "/users/me", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn me_with_expired_token_is_unauthorized() {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde::Serialize;

    // Signed with the fake state's secret, but already expired.
    #[derive(Serialize)]
    struct StaleClaims {
        sub: String,
        iat: usize,
        exp: usize,
    }
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;
    let token = encode(
        &Header::new(Algorithm::HS256),
        &StaleClaims {
            sub: "a@x.com".into(),
            iat: now - 120,
            exp: now - 60,
        },
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap();

    let app = build_app(AppState::fake());
    let (status, _) = get_with_auth(app, "/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn saved_routes_require_auth() {
    let app = build_app(AppState::fake());
    let (status, _) = get(app, "/users/me/saved").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn search_passes_query_through_and_clamps_pagination() {
    let seen = Arc::new(Mutex::new(None));
    let app = build_app(state_with(Arc::new(CapturingClient { seen: seen.clone() })));

    let (status, body) = get(
        app,
        "/recipes/search?q=pasta&number=999&offset=-3&diet=vegan",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalResults"], 0);

    let params = seen.lock().unwrap().take().expect("gateway was called");
    assert_eq!(params.query, "pasta");
    assert_eq!(params.number, 50);
    assert_eq!(params.offset, 0);
    assert_eq!(params.diet.as_deref(), Some("vegan"));
}

#[tokio::test]
async fn search_without_query_is_a_bad_request() {
    let app = build_app(AppState::fake());
    let (status, _) = get(app, "/recipes/search?number=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recipe_details_pass_through() {
    let seen = Arc::new(Mutex::new(None));
    let app = build_app(state_with(Arc::new(CapturingClient { seen })));
    let (status, body) = get(app, "/recipes/55?include_nutrition=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 55);
}

#[tokio::test]
async fn upstream_auth_failure_maps_to_401() {
    let app = build_app(state_with(Arc::new(FailingClient(FailureMode::Auth))));
    let (status, body) = get(app, "/recipes/search?q=pasta").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("SPOONACULAR_API_KEY"));
}

#[tokio::test]
async fn upstream_failure_maps_to_502() {
    let app = build_app(state_with(Arc::new(FailingClient(FailureMode::Upstream))));
    let (status, body) = get(app, "/recipes/search?q=pasta").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"].as_str().unwrap().contains("Spoonacular"));
}

#[tokio::test]
async fn missing_recipe_maps_to_404() {
    let app = build_app(state_with(Arc::new(FailingClient(FailureMode::NotFound))));
    let (status, body) = get(app, "/recipes/99999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Recipe not found");
}
