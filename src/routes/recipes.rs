use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::recipes::{CreateRecipeRequest, RecipeDto, RecipeList, RecipeQuery, UpdateRecipeRequest},
    error::AppResult,
    middleware::auth::{AuthUser, OptionalAuthUser},
    models::RecipeShort,
    response::ApiResponse,
    services::{
        membership_service::{self, Membership},
        recipe_service, shopping_list_service,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route("/download_shopping_cart", get(download_shopping_cart))
        .route(
            "/{id}",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route("/{id}/favorite", post(add_favorite).delete(remove_favorite))
        .route(
            "/{id}/shopping_cart",
            post(add_to_cart).delete(remove_from_cart),
        )
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("author" = Option<Uuid>, Query, description = "Filter by author"),
        ("tags" = Option<String>, Query, description = "Comma-separated tag slugs"),
        ("is_favorited" = Option<bool>, Query, description = "Only the caller's favorites"),
        ("is_in_shopping_cart" = Option<bool>, Query, description = "Only the caller's cart"),
    ),
    responses(
        (status = 200, description = "List recipes", body = ApiResponse<RecipeList>)
    ),
    tag = "Recipes"
)]
pub async fn list_recipes(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Query(query): Query<RecipeQuery>,
) -> AppResult<Json<ApiResponse<RecipeList>>> {
    Ok(Json(
        recipe_service::list_recipes(&state, viewer.as_ref(), query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Get recipe", body = ApiResponse<RecipeDto>),
        (status = 404, description = "Recipe not found"),
    ),
    tag = "Recipes"
)]
pub async fn get_recipe(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RecipeDto>>> {
    Ok(Json(
        recipe_service::get_recipe(&state, viewer.as_ref(), id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Create recipe", body = ApiResponse<RecipeDto>),
        (status = 400, description = "Validation error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Recipes"
)]
pub async fn create_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRecipeRequest>,
) -> AppResult<Json<ApiResponse<RecipeDto>>> {
    Ok(Json(
        recipe_service::create_recipe(&state, &user, payload).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Updated recipe", body = ApiResponse<RecipeDto>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Recipe not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Recipes"
)]
pub async fn update_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRecipeRequest>,
) -> AppResult<Json<ApiResponse<RecipeDto>>> {
    Ok(Json(
        recipe_service::update_recipe(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Deleted recipe"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Recipe not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Recipes"
)]
pub async fn delete_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(recipe_service::delete_recipe(&state, &user, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Added to favorites", body = ApiResponse<RecipeShort>),
        (status = 404, description = "Recipe not found"),
        (status = 409, description = "Already favorited"),
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RecipeShort>>> {
    Ok(Json(
        membership_service::add(&state, &user, Membership::Favorite, id).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Removed from favorites"),
        (status = 404, description = "Not favorited"),
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        membership_service::remove(&state, &user, Membership::Favorite, id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Added to shopping cart", body = ApiResponse<RecipeShort>),
        (status = 404, description = "Recipe not found"),
        (status = 409, description = "Already in cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "ShoppingCart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RecipeShort>>> {
    Ok(Json(
        membership_service::add(&state, &user, Membership::ShoppingCart, id).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Removed from shopping cart"),
        (status = 404, description = "Not in cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "ShoppingCart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        membership_service::remove(&state, &user, Membership::ShoppingCart, id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    responses(
        (status = 200, description = "Plain-text shopping list attachment", body = String, content_type = "text/plain"),
    ),
    security(("bearer_auth" = [])),
    tag = "ShoppingCart"
)]
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Response> {
    let body = shopping_list_service::build_report(&state, &user).await?;
    let headers = [
        (header::CONTENT_TYPE, "text/plain; charset=utf8"),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=shopping_list.txt",
        ),
    ];
    Ok((headers, body).into_response())
}
