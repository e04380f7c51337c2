use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::extractors::CurrentUser;
use crate::error::AppError;
use crate::saved::{
    dto::{SaveRecipeRequest, SavedRecipePublic},
    repo,
};
use crate::state::AppState;

pub fn saved_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me/saved", get(list_saved).post(save_recipe))
        .route("/users/me/saved/:recipe_id", delete(remove_saved))
}

#[instrument(skip_all)]
pub async fn list_saved(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<SavedRecipePublic>>, AppError> {
    let rows = repo::list_for_user(&state.db, user.id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Returns 201 whether the snapshot was created or overwrote an earlier
/// save of the same recipe.
#[instrument(skip_all)]
pub async fn save_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<SaveRecipeRequest>,
) -> Result<(StatusCode, Json<SavedRecipePublic>), AppError> {
    let row = repo::upsert(&state.db, user.id, &payload).await?;
    info!(user_id = %user.id, recipe_id = row.recipe_id, "recipe saved");
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[instrument(skip_all)]
pub async fn remove_saved(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = repo::remove(&state.db, user.id, recipe_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Saved recipe not found".into()));
    }
    info!(user_id = %user.id, recipe_id, "recipe unsaved");
    Ok(StatusCode::NO_CONTENT)
}
