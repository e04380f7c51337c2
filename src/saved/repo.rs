use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::saved::dto::SaveRecipeRequest;

/// Saved recipe row, unique per (user_id, recipe_id).
#[derive(Debug, Clone, FromRow)]
pub struct SavedRecipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: i64,
    pub title: String,
    pub image: Option<String>,
    pub source_url: Option<String>,
    pub aggregate_likes: Option<i32>,
    pub ready_in_minutes: Option<i32>,
    pub summary: Option<String>,
    pub created_at: OffsetDateTime,
}

pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> Result<Vec<SavedRecipe>, AppError> {
    let rows = sqlx::query_as::<_, SavedRecipe>(
        r#"
        SELECT id, user_id, recipe_id, title, image, source_url,
               aggregate_likes, ready_in_minutes, summary, created_at
        FROM saved_recipes
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

async fn find(
    db: &PgPool,
    user_id: Uuid,
    recipe_id: i64,
) -> Result<Option<SavedRecipe>, AppError> {
    let row = sqlx::query_as::<_, SavedRecipe>(
        r#"
        SELECT id, user_id, recipe_id, title, image, source_url,
               aggregate_likes, ready_in_minutes, summary, created_at
        FROM saved_recipes
        WHERE user_id = $1 AND recipe_id = $2
        "#,
    )
    .bind(user_id)
    .bind(recipe_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Overwrite the snapshot fields of an existing row; id and created_at stay.
async fn update_snapshot(
    db: &PgPool,
    user_id: Uuid,
    data: &SaveRecipeRequest,
) -> Result<SavedRecipe, AppError> {
    let row = sqlx::query_as::<_, SavedRecipe>(
        r#"
        UPDATE saved_recipes
        SET title = $3, image = $4, source_url = $5,
            aggregate_likes = $6, ready_in_minutes = $7, summary = $8
        WHERE user_id = $1 AND recipe_id = $2
        RETURNING id, user_id, recipe_id, title, image, source_url,
                  aggregate_likes, ready_in_minutes, summary, created_at
        "#,
    )
    .bind(user_id)
    .bind(data.recipe_id)
    .bind(&data.title)
    .bind(&data.image)
    .bind(&data.source_url)
    .bind(data.aggregate_likes)
    .bind(data.ready_in_minutes)
    .bind(&data.summary)
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// Insert or update the snapshot for (user, recipe).
///
/// The existence check and the insert are separate round trips, so two
/// concurrent savers can both see "absent" and race to insert. The unique
/// constraint rejects the loser, which then takes the update path against
/// the row the winner created. Any other database failure propagates.
/// Works across server processes because the constraint lives in the store.
pub async fn upsert(
    db: &PgPool,
    user_id: Uuid,
    data: &SaveRecipeRequest,
) -> Result<SavedRecipe, AppError> {
    if find(db, user_id, data.recipe_id).await?.is_some() {
        return update_snapshot(db, user_id, data).await;
    }

    let inserted = sqlx::query_as::<_, SavedRecipe>(
        r#"
        INSERT INTO saved_recipes
            (user_id, recipe_id, title, image, source_url,
             aggregate_likes, ready_in_minutes, summary)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, user_id, recipe_id, title, image, source_url,
                  aggregate_likes, ready_in_minutes, summary, created_at
        "#,
    )
    .bind(user_id)
    .bind(data.recipe_id)
    .bind(&data.title)
    .bind(&data.image)
    .bind(&data.source_url)
    .bind(data.aggregate_likes)
    .bind(data.ready_in_minutes)
    .bind(&data.summary)
    .fetch_one(db)
    .await;

    match inserted {
        Ok(row) => Ok(row),
        Err(e) if matches!(&e, sqlx::Error::Database(db_err) if db_err.is_unique_violation()) => {
            // Lost the insert race; the row exists now.
            update_snapshot(db, user_id, data).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete the (user, recipe) row if present. Idempotent; reports whether a
/// row was actually removed.
pub async fn remove(db: &PgPool, user_id: Uuid, recipe_id: i64) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        DELETE FROM saved_recipes
        WHERE user_id = $1 AND recipe_id = $2
        "#,
    )
    .bind(user_id)
    .bind(recipe_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
