use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure modes of the upstream recipe provider that callers must tell
/// apart. `Auth` covers a missing key as well as an upstream rejection of
/// it; the key itself never appears in any message.
#[derive(Debug, Error)]
pub enum RecipeApiError {
    #[error("missing or invalid Spoonacular API key")]
    Auth,
    #[error("recipe not found")]
    NotFound,
    #[error("{0}")]
    Upstream(String),
}

/// Search parameters forwarded to the upstream provider.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    pub number: i64,
    pub offset: i64,
    pub diet: Option<String>,
    pub cuisine: Option<String>,
    pub intolerances: Option<String>,
}

impl SearchParams {
    /// Clamp pagination to the bounds the upstream accepts, whatever the
    /// caller sent: number in 1..=50, offset non-negative.
    pub fn normalized(mut self) -> Self {
        self.number = self.number.clamp(1, 50);
        self.offset = self.offset.max(0);
        self
    }
}

/// Upstream recipe provider, injected through `AppState` so tests swap in
/// fakes.
#[async_trait]
pub trait RecipeClient: Send + Sync {
    async fn search(&self, params: SearchParams) -> Result<Value, RecipeApiError>;

    async fn get_information(
        &self,
        recipe_id: i64,
        include_nutrition: bool,
    ) -> Result<Value, RecipeApiError>;
}

/// HTTP client for the Spoonacular API.
pub struct SpoonacularClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SpoonacularClient {
    pub fn new(base_url: String, api_key: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn require_key(&self) -> Result<&str, RecipeApiError> {
        self.api_key.as_deref().ok_or(RecipeApiError::Auth)
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, RecipeApiError> {
        let key = self.require_key()?;
        let url = format!("{}{}", self.base_url, path);

        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apiKey", key)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!(%path, "spoonacular request timed out");
                    RecipeApiError::Upstream("Spoonacular request timed out".into())
                } else {
                    // strip the URL from the error; it carries the api key
                    RecipeApiError::Upstream(format!(
                        "Spoonacular request failed: {}",
                        e.without_url()
                    ))
                }
            })?;

        let status = resp.status();
        debug!(%path, %status, "spoonacular response");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RecipeApiError::Auth);
        }
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(RecipeApiError::Upstream(format!(
                "status {status}: {detail}"
            )));
        }

        resp.json::<Value>().await.map_err(|e| {
            RecipeApiError::Upstream(format!("invalid JSON from Spoonacular: {}", e.without_url()))
        })
    }
}

#[async_trait]
impl RecipeClient for SpoonacularClient {
    async fn search(&self, params: SearchParams) -> Result<Value, RecipeApiError> {
        let p = params.normalized();

        let mut query: Vec<(&str, String)> = vec![
            ("query", p.query),
            ("number", p.number.to_string()),
            ("offset", p.offset.to_string()),
            // include summary, sourceUrl and friends in each result
            ("addRecipeInformation", "true".into()),
        ];
        if let Some(diet) = p.diet {
            query.push(("diet", diet));
        }
        if let Some(cuisine) = p.cuisine {
            query.push(("cuisine", cuisine));
        }
        if let Some(intolerances) = p.intolerances {
            query.push(("intolerances", intolerances));
        }

        self.get("/recipes/complexSearch", &query).await
    }

    async fn get_information(
        &self,
        recipe_id: i64,
        include_nutrition: bool,
    ) -> Result<Value, RecipeApiError> {
        let path = format!("/recipes/{recipe_id}/information");
        let query = [(
            "includeNutrition",
            if include_nutrition { "true" } else { "false" }.to_string(),
        )];

        let data = self.get(&path, &query).await?;

        // An empty or id-less payload on a 200 still means the recipe does
        // not exist.
        match data.get("id") {
            Some(id) if !id.is_null() => Ok(data),
            _ => Err(RecipeApiError::NotFound),
        }
    }
}
