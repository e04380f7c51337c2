use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::saved::repo::SavedRecipe;

/// Recipe snapshot sent by the client when saving. Display fields are
/// copied as-is and never re-fetched from the upstream provider.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveRecipeRequest {
    pub recipe_id: i64,
    pub title: String,
    pub image: Option<String>,
    pub source_url: Option<String>,
    pub aggregate_likes: Option<i32>,
    pub ready_in_minutes: Option<i32>,
    pub summary: Option<String>,
}

/// Saved recipe returned to clients.
#[derive(Debug, Serialize)]
pub struct SavedRecipePublic {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: i64,
    pub title: String,
    pub image: Option<String>,
    pub source_url: Option<String>,
    pub aggregate_likes: Option<i32>,
    pub ready_in_minutes: Option<i32>,
    pub summary: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<SavedRecipe> for SavedRecipePublic {
    fn from(r: SavedRecipe) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            recipe_id: r.recipe_id,
            title: r.title,
            image: r.image,
            source_url: r.source_url,
            aggregate_likes: r.aggregate_likes,
            ready_in_minutes: r.ready_in_minutes,
            summary: r.summary,
            created_at: r.created_at,
        }
    }
}
