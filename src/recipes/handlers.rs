use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::AppError;
use crate::recipes::client::SearchParams;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_number")]
    pub number: i64,
    #[serde(default)]
    pub offset: i64,
    pub diet: Option<String>,
    pub cuisine: Option<String>,
    pub intolerances: Option<String>,
}

fn default_number() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    #[serde(default)]
    pub include_nutrition: bool,
}

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes/search", get(search_recipes))
        .route("/recipes/:recipe_id", get(get_recipe_details))
}

/// Proxy the upstream search. The response payload is passed through
/// unchanged; pagination is normalized before it leaves this process.
#[instrument(skip(state))]
pub async fn search_recipes(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Value>, AppError> {
    let params = SearchParams {
        query: q.q,
        number: q.number,
        offset: q.offset,
        diet: q.diet,
        cuisine: q.cuisine,
        intolerances: q.intolerances,
    }
    .normalized();

    let data = state.recipes.search(params).await?;
    Ok(Json(data))
}

#[instrument(skip(state))]
pub async fn get_recipe_details(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
    Query(q): Query<DetailQuery>,
) -> Result<Json<Value>, AppError> {
    let data = state
        .recipes
        .get_information(recipe_id, q.include_nutrition)
        .await?;
    Ok(Json(data))
}
