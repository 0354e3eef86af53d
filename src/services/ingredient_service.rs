use uuid::Uuid;

use crate::{
    dto::ingredients::{IngredientList, IngredientQuery},
    error::{AppError, AppResult},
    models::Ingredient,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_ingredients(
    state: &AppState,
    query: IngredientQuery,
) -> AppResult<ApiResponse<IngredientList>> {
    let items = match query.name.as_deref().filter(|n| !n.is_empty()) {
        Some(prefix) => {
            sqlx::query_as::<_, Ingredient>(
                "SELECT * FROM ingredients WHERE name ILIKE $1 ORDER BY name",
            )
            .bind(format!("{}%", escape_like(prefix)))
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients ORDER BY name")
                .fetch_all(&state.pool)
                .await?
        }
    };

    Ok(ApiResponse::success(
        "Ingredients",
        IngredientList { items },
        Some(Meta::empty()),
    ))
}

/// LIKE metacharacters in the user-supplied prefix must match literally,
/// so `?name=%` cannot turn into a match-everything pattern.
fn escape_like(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub async fn get_ingredient(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Ingredient>> {
    let ingredient = sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let ingredient = match ingredient {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Ingredient", ingredient, None))
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(escape_like("%"), "\\%");
        assert_eq!(escape_like("a_c"), "a\\_c");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn plain_prefixes_pass_through() {
        assert_eq!(escape_like("flour"), "flour");
        assert_eq!(escape_like(""), "");
    }
}
