//! Cart and favorite toggles share one add/remove contract; the two
//! relations differ only in which table holds the (user, recipe) pair.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::RecipeShort,
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Favorite,
    ShoppingCart,
}

impl Membership {
    fn table(self) -> &'static str {
        match self {
            Membership::Favorite => "favorites",
            Membership::ShoppingCart => "cart_entries",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Membership::Favorite => "favorites",
            Membership::ShoppingCart => "shopping cart",
        }
    }
}

pub async fn add(
    state: &AppState,
    user: &AuthUser,
    kind: Membership,
    recipe_id: Uuid,
) -> AppResult<ApiResponse<RecipeShort>> {
    let recipe: Option<RecipeShort> =
        sqlx::query_as("SELECT id, name, image, cooking_time FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .fetch_optional(&state.pool)
            .await?;
    let recipe = match recipe {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let exists: Option<(Uuid,)> = sqlx::query_as(&format!(
        "SELECT id FROM {} WHERE user_id = $1 AND recipe_id = $2",
        kind.table()
    ))
    .bind(user.user_id)
    .bind(recipe_id)
    .fetch_optional(&state.pool)
    .await?;

    let conflict_msg = format!("recipe is already in {}", kind.noun());
    if exists.is_some() {
        return Err(AppError::Conflict(conflict_msg));
    }

    // The unique (user_id, recipe_id) constraint closes the race between the
    // check above and this insert.
    sqlx::query(&format!(
        "INSERT INTO {} (id, user_id, recipe_id) VALUES ($1, $2, $3)",
        kind.table()
    ))
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(recipe_id)
    .execute(&state.pool)
    .await
    .map_err(|err| AppError::conflict_on_unique(err, &conflict_msg))?;

    Ok(ApiResponse::success(
        format!("Added to {}", kind.noun()),
        recipe,
        Some(Meta::empty()),
    ))
}

pub async fn remove(
    state: &AppState,
    user: &AuthUser,
    kind: Membership,
    recipe_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
        kind.table()
    ))
    .bind(user.user_id)
    .bind(recipe_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        format!("Removed from {}", kind.noun()),
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
