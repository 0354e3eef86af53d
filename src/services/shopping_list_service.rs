use sqlx::FromRow;

use crate::{
    error::AppResult,
    middleware::auth::AuthUser,
    shopping_list::{AggregatedIngredient, IngredientLine, merge_lines, render},
    state::AppState,
};

#[derive(FromRow)]
struct CartLineRow {
    name: String,
    measurement_unit: String,
    amount: i32,
}

/// Collect every ingredient line across the user's cart recipes and merge
/// them into per-(name, unit) totals. Pure read; an empty cart yields an
/// empty list.
pub async fn aggregate(state: &AppState, user: &AuthUser) -> AppResult<Vec<AggregatedIngredient>> {
    let rows = sqlx::query_as::<_, CartLineRow>(
        r#"
        SELECT i.name, i.measurement_unit, ri.amount
        FROM cart_entries ce
        JOIN recipe_ingredients ri ON ri.recipe_id = ce.recipe_id
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ce.user_id = $1
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(merge_lines(rows.into_iter().map(|row| IngredientLine {
        name: row.name,
        measurement_unit: row.measurement_unit,
        amount: row.amount,
    })))
}

/// The text attachment body served by `GET /api/recipes/download_shopping_cart`.
pub async fn build_report(state: &AppState, user: &AuthUser) -> AppResult<String> {
    let groups = aggregate(state, user).await?;
    Ok(render(&groups))
}
