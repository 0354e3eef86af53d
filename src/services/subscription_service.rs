use uuid::Uuid;

use crate::{
    dto::users::{SubscriptionDto, SubscriptionList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{RecipeShort, User},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn follow(
    state: &AppState,
    user: &AuthUser,
    author_id: Uuid,
) -> AppResult<ApiResponse<SubscriptionDto>> {
    let author: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(author_id)
        .fetch_optional(&state.pool)
        .await?;
    let author = match author {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    if user.user_id == author.id {
        return Err(AppError::Conflict("you cannot follow yourself".into()));
    }

    let exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user.user_id)
            .bind(author.id)
            .fetch_optional(&state.pool)
            .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("already subscribed to this author".into()));
    }

    sqlx::query("INSERT INTO follows (id, user_id, author_id) VALUES ($1, $2, $3)")
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(author.id)
        .execute(&state.pool)
        .await
        .map_err(|err| AppError::conflict_on_unique(err, "already subscribed to this author"))?;

    let dto = subscription_dto(state, author).await?;
    Ok(ApiResponse::success("Subscribed", dto, Some(Meta::empty())))
}

pub async fn unfollow(
    state: &AppState,
    user: &AuthUser,
    author_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
        .bind(user.user_id)
        .bind(author_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Unsubscribed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_subscriptions(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<SubscriptionList>> {
    let (page, limit, offset) = pagination.normalize();

    // Canonical ordering: oldest subscription first.
    let authors = sqlx::query_as::<_, User>(
        r#"
        SELECT u.*
        FROM follows f
        JOIN users u ON u.id = f.author_id
        WHERE f.user_id = $1
        ORDER BY f.created_at ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM follows WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;

    let mut items = Vec::with_capacity(authors.len());
    for author in authors {
        items.push(subscription_dto(state, author).await?);
    }

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Subscriptions",
        SubscriptionList { items },
        Some(meta),
    ))
}

async fn subscription_dto(state: &AppState, author: User) -> AppResult<SubscriptionDto> {
    let recipes = sqlx::query_as::<_, RecipeShort>(
        r#"
        SELECT id, name, image, cooking_time
        FROM recipes
        WHERE author_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(author.id)
    .fetch_all(&state.pool)
    .await?;

    let recipes_count = recipes.len() as i64;
    Ok(SubscriptionDto {
        id: author.id,
        email: author.email,
        username: author.username,
        first_name: author.first_name,
        last_name: author.last_name,
        is_subscribed: true,
        recipes,
        recipes_count,
    })
}
