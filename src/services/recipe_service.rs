use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    dto::{
        recipes::{
            CreateRecipeRequest, IngredientLineRequest, RecipeDto, RecipeIngredientDto,
            RecipeList, RecipeQuery, UpdateRecipeRequest,
        },
        users::UserDto,
    },
    entity::{
        cart_entries::{Column as CartCol, Entity as CartEntries},
        favorites::{Column as FavCol, Entity as Favorites},
        ingredients::{Column as IngredientCol, Entity as Ingredients},
        recipe_ingredients::{
            ActiveModel as LineActive, Column as LineCol, Entity as RecipeIngredients,
        },
        recipe_tags::{ActiveModel as RecipeTagActive, Column as RecipeTagCol, Entity as RecipeTags},
        recipes::{
            ActiveModel as RecipeActive, Column as RecipeCol, Entity as Recipes,
            Model as RecipeModel,
        },
        tags::{Column as TagCol, Entity as Tags},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Recipe, Tag, User},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_recipes(
    state: &AppState,
    viewer: Option<&AuthUser>,
    query: RecipeQuery,
) -> AppResult<ApiResponse<RecipeList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(author) = query.author {
        condition = condition.add(RecipeCol::AuthorId.eq(author));
    }

    let slugs = query.tag_slugs();
    if !slugs.is_empty() {
        let sub = Query::select()
            .column(RecipeTagCol::RecipeId)
            .from(RecipeTags)
            .inner_join(
                Tags,
                Expr::col((Tags, TagCol::Id)).equals((RecipeTags, RecipeTagCol::TagId)),
            )
            .and_where(TagCol::Slug.is_in(slugs))
            .to_owned();
        condition = condition.add(RecipeCol::Id.in_subquery(sub));
    }

    // Membership filters only make sense against an authenticated identity;
    // for anonymous callers they are ignored.
    if let Some(viewer) = viewer {
        if query.is_favorited == Some(true) {
            let sub = Query::select()
                .column(FavCol::RecipeId)
                .from(Favorites)
                .and_where(FavCol::UserId.eq(viewer.user_id))
                .to_owned();
            condition = condition.add(RecipeCol::Id.in_subquery(sub));
        }
        if query.is_in_shopping_cart == Some(true) {
            let sub = Query::select()
                .column(CartCol::RecipeId)
                .from(CartEntries)
                .and_where(CartCol::UserId.eq(viewer.user_id))
                .to_owned();
            condition = condition.add(RecipeCol::Id.in_subquery(sub));
        }
    }

    let finder = Recipes::find()
        .filter(condition)
        .order_by_desc(RecipeCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let recipes: Vec<Recipe> = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(recipe_from_entity)
        .collect();

    let items = build_recipe_dtos(state, viewer.map(|v| v.user_id), recipes).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Recipes",
        RecipeList { items },
        Some(meta),
    ))
}

pub async fn get_recipe(
    state: &AppState,
    viewer: Option<&AuthUser>,
    id: Uuid,
) -> AppResult<ApiResponse<RecipeDto>> {
    let recipe: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let recipe = match recipe {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let mut dtos = build_recipe_dtos(state, viewer.map(|v| v.user_id), vec![recipe]).await?;
    let dto = dtos
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("recipe hydration returned nothing")))?;
    Ok(ApiResponse::success("Recipe", dto, None))
}

pub async fn create_recipe(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRecipeRequest,
) -> AppResult<ApiResponse<RecipeDto>> {
    validate_cooking_time(payload.cooking_time)?;
    validate_ingredient_lines(&payload.ingredients)?;
    let tag_ids = dedup_ids(payload.tags);

    // All of recipe row, tag links and ingredient lines commit together or
    // not at all.
    let txn = state.orm.begin().await?;

    ensure_tags_exist(&txn, &tag_ids).await?;
    ensure_ingredients_exist(&txn, &payload.ingredients).await?;

    let recipe = RecipeActive {
        id: Set(Uuid::new_v4()),
        author_id: Set(user.user_id),
        name: Set(payload.name),
        image: Set(payload.image),
        text: Set(payload.text),
        cooking_time: Set(payload.cooking_time),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    attach_tags(&txn, recipe.id, &tag_ids).await?;
    attach_lines(&txn, recipe.id, &payload.ingredients).await?;

    txn.commit().await?;

    let recipe_id = recipe.id;
    let mut dtos =
        build_recipe_dtos(state, Some(user.user_id), vec![recipe_from_entity(recipe)]).await?;
    let dto = dtos
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("recipe hydration returned nothing")))?;

    tracing::info!(recipe_id = %recipe_id, author = %user.user_id, "recipe created");
    Ok(ApiResponse::success(
        "Recipe created",
        dto,
        Some(Meta::empty()),
    ))
}

pub async fn update_recipe(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRecipeRequest,
) -> AppResult<ApiResponse<RecipeDto>> {
    let existing = Recipes::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    if existing.author_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    if let Some(minutes) = payload.cooking_time {
        validate_cooking_time(minutes)?;
    }
    if let Some(lines) = &payload.ingredients {
        validate_ingredient_lines(lines)?;
    }
    let tag_ids = payload.tags.map(dedup_ids);

    let txn = state.orm.begin().await?;

    if let Some(ids) = &tag_ids {
        ensure_tags_exist(&txn, ids).await?;
    }
    if let Some(lines) = &payload.ingredients {
        ensure_ingredients_exist(&txn, lines).await?;
    }

    let mut active: RecipeActive = existing.clone().into();
    active.name = Set(payload.name.unwrap_or_else(|| existing.name.clone()));
    active.text = Set(payload.text.unwrap_or_else(|| existing.text.clone()));
    active.image = Set(payload.image.unwrap_or_else(|| existing.image.clone()));
    active.cooking_time = Set(payload.cooking_time.unwrap_or(existing.cooking_time));
    let updated = active.update(&txn).await?;

    // Tag links and lines are replaced wholesale when provided.
    if let Some(ids) = &tag_ids {
        RecipeTags::delete_many()
            .filter(RecipeTagCol::RecipeId.eq(id))
            .exec(&txn)
            .await?;
        attach_tags(&txn, id, ids).await?;
    }
    if let Some(lines) = &payload.ingredients {
        RecipeIngredients::delete_many()
            .filter(LineCol::RecipeId.eq(id))
            .exec(&txn)
            .await?;
        attach_lines(&txn, id, lines).await?;
    }

    txn.commit().await?;

    let mut dtos =
        build_recipe_dtos(state, Some(user.user_id), vec![recipe_from_entity(updated)]).await?;
    let dto = dtos
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("recipe hydration returned nothing")))?;
    Ok(ApiResponse::success("Updated", dto, Some(Meta::empty())))
}

pub async fn delete_recipe(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = Recipes::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    if existing.author_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    // Cascades are explicit: line items, tag links and membership rows go in
    // the same transaction as the recipe row.
    let txn = state.orm.begin().await?;
    RecipeIngredients::delete_many()
        .filter(LineCol::RecipeId.eq(id))
        .exec(&txn)
        .await?;
    RecipeTags::delete_many()
        .filter(RecipeTagCol::RecipeId.eq(id))
        .exec(&txn)
        .await?;
    Favorites::delete_many()
        .filter(FavCol::RecipeId.eq(id))
        .exec(&txn)
        .await?;
    CartEntries::delete_many()
        .filter(CartCol::RecipeId.eq(id))
        .exec(&txn)
        .await?;
    existing.delete(&txn).await?;
    txn.commit().await?;

    tracing::info!(recipe_id = %id, author = %user.user_id, "recipe deleted");
    Ok(ApiResponse::success(
        "Recipe deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Batch-hydrate full read representations: tags, ingredient lines, authors
/// and the viewer's membership flags, in one query per concern.
pub async fn build_recipe_dtos(
    state: &AppState,
    viewer: Option<Uuid>,
    recipes: Vec<Recipe>,
) -> AppResult<Vec<RecipeDto>> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();
    let author_ids: Vec<Uuid> = recipes.iter().map(|r| r.author_id).collect();

    #[derive(FromRow)]
    struct TagRow {
        recipe_id: Uuid,
        id: Uuid,
        name: String,
        color: String,
        slug: String,
    }

    let tag_rows = sqlx::query_as::<_, TagRow>(
        r#"
        SELECT rt.recipe_id, t.id, t.name, t.color, t.slug
        FROM recipe_tags rt
        JOIN tags t ON t.id = rt.tag_id
        WHERE rt.recipe_id = ANY($1)
        ORDER BY t.name
        "#,
    )
    .bind(&ids)
    .fetch_all(&state.pool)
    .await?;

    #[derive(FromRow)]
    struct LineRow {
        recipe_id: Uuid,
        ingredient_id: Uuid,
        name: String,
        measurement_unit: String,
        amount: i32,
    }

    let line_rows = sqlx::query_as::<_, LineRow>(
        r#"
        SELECT ri.recipe_id, ri.ingredient_id, i.name, i.measurement_unit, ri.amount
        FROM recipe_ingredients ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = ANY($1)
        ORDER BY i.name
        "#,
    )
    .bind(&ids)
    .fetch_all(&state.pool)
    .await?;

    let authors = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
        .bind(&author_ids)
        .fetch_all(&state.pool)
        .await?;
    let authors_by_id: HashMap<Uuid, User> =
        authors.into_iter().map(|u| (u.id, u)).collect();

    let (favorited, in_cart, followed) = match viewer {
        Some(uid) => {
            let fav: Vec<(Uuid,)> = sqlx::query_as(
                "SELECT recipe_id FROM favorites WHERE user_id = $1 AND recipe_id = ANY($2)",
            )
            .bind(uid)
            .bind(&ids)
            .fetch_all(&state.pool)
            .await?;
            let cart: Vec<(Uuid,)> = sqlx::query_as(
                "SELECT recipe_id FROM cart_entries WHERE user_id = $1 AND recipe_id = ANY($2)",
            )
            .bind(uid)
            .bind(&ids)
            .fetch_all(&state.pool)
            .await?;
            let follows: Vec<(Uuid,)> =
                sqlx::query_as("SELECT author_id FROM follows WHERE user_id = $1")
                    .bind(uid)
                    .fetch_all(&state.pool)
                    .await?;
            (
                fav.into_iter().map(|r| r.0).collect::<HashSet<_>>(),
                cart.into_iter().map(|r| r.0).collect::<HashSet<_>>(),
                follows.into_iter().map(|r| r.0).collect::<HashSet<_>>(),
            )
        }
        None => (HashSet::new(), HashSet::new(), HashSet::new()),
    };

    let mut tags_by_recipe: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    for row in tag_rows {
        tags_by_recipe.entry(row.recipe_id).or_default().push(Tag {
            id: row.id,
            name: row.name,
            color: row.color,
            slug: row.slug,
        });
    }

    let mut lines_by_recipe: HashMap<Uuid, Vec<RecipeIngredientDto>> = HashMap::new();
    for row in line_rows {
        lines_by_recipe
            .entry(row.recipe_id)
            .or_default()
            .push(RecipeIngredientDto {
                id: row.ingredient_id,
                name: row.name,
                measurement_unit: row.measurement_unit,
                amount: row.amount,
            });
    }

    recipes
        .into_iter()
        .map(|recipe| {
            let author = authors_by_id.get(&recipe.author_id).ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("recipe {} has no author row", recipe.id))
            })?;
            Ok(RecipeDto {
                id: recipe.id,
                tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
                author: UserDto {
                    id: author.id,
                    email: author.email.clone(),
                    username: author.username.clone(),
                    first_name: author.first_name.clone(),
                    last_name: author.last_name.clone(),
                    is_subscribed: followed.contains(&author.id),
                },
                ingredients: lines_by_recipe.remove(&recipe.id).unwrap_or_default(),
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                name: recipe.name,
                image: recipe.image,
                text: recipe.text,
                cooking_time: recipe.cooking_time,
            })
        })
        .collect()
}

fn recipe_from_entity(model: RecipeModel) -> Recipe {
    Recipe {
        id: model.id,
        author_id: model.author_id,
        name: model.name,
        image: model.image,
        text: model.text,
        cooking_time: model.cooking_time,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

async fn ensure_tags_exist<C: ConnectionTrait>(conn: &C, ids: &[Uuid]) -> AppResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let found = Tags::find()
        .filter(TagCol::Id.is_in(ids.iter().copied()))
        .count(conn)
        .await?;
    if found as usize != ids.len() {
        return Err(AppError::BadRequest("unknown tag id".into()));
    }
    Ok(())
}

async fn ensure_ingredients_exist<C: ConnectionTrait>(
    conn: &C,
    lines: &[IngredientLineRequest],
) -> AppResult<()> {
    let ids: Vec<Uuid> = lines.iter().map(|l| l.id).collect();
    let found = Ingredients::find()
        .filter(IngredientCol::Id.is_in(ids.iter().copied()))
        .count(conn)
        .await?;
    if found as usize != ids.len() {
        return Err(AppError::BadRequest("unknown ingredient id".into()));
    }
    Ok(())
}

async fn attach_tags<C: ConnectionTrait>(conn: &C, recipe_id: Uuid, ids: &[Uuid]) -> AppResult<()> {
    for tag_id in ids {
        RecipeTagActive {
            id: Set(Uuid::new_v4()),
            recipe_id: Set(recipe_id),
            tag_id: Set(*tag_id),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

async fn attach_lines<C: ConnectionTrait>(
    conn: &C,
    recipe_id: Uuid,
    lines: &[IngredientLineRequest],
) -> AppResult<()> {
    for line in lines {
        LineActive {
            id: Set(Uuid::new_v4()),
            recipe_id: Set(recipe_id),
            ingredient_id: Set(line.id),
            amount: Set(line.amount),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn validate_cooking_time(minutes: i32) -> AppResult<()> {
    if minutes < 1 {
        return Err(AppError::BadRequest(
            "cooking time must be at least 1 minute".into(),
        ));
    }
    Ok(())
}

fn validate_ingredient_lines(lines: &[IngredientLineRequest]) -> AppResult<()> {
    if lines.is_empty() {
        return Err(AppError::BadRequest(
            "recipe needs at least one ingredient".into(),
        ));
    }
    let mut seen = HashSet::new();
    for line in lines {
        if line.amount < 1 {
            return Err(AppError::BadRequest(
                "ingredient amount must be at least 1".into(),
            ));
        }
        if !seen.insert(line.id) {
            return Err(AppError::BadRequest(
                "duplicate ingredient in recipe".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: Uuid, amount: i32) -> IngredientLineRequest {
        IngredientLineRequest { id, amount }
    }

    #[test]
    fn rejects_empty_ingredient_list() {
        assert!(validate_ingredient_lines(&[]).is_err());
    }

    #[test]
    fn rejects_non_positive_amount() {
        assert!(validate_ingredient_lines(&[line(Uuid::new_v4(), 0)]).is_err());
        assert!(validate_ingredient_lines(&[line(Uuid::new_v4(), -5)]).is_err());
        assert!(validate_ingredient_lines(&[line(Uuid::new_v4(), 1)]).is_ok());
    }

    #[test]
    fn rejects_duplicate_ingredient_ids() {
        let id = Uuid::new_v4();
        assert!(validate_ingredient_lines(&[line(id, 1), line(id, 2)]).is_err());
        assert!(validate_ingredient_lines(&[line(id, 1), line(Uuid::new_v4(), 2)]).is_ok());
    }

    #[test]
    fn rejects_zero_cooking_time() {
        assert!(validate_cooking_time(0).is_err());
        assert!(validate_cooking_time(1).is_ok());
    }

    #[test]
    fn dedup_preserves_first_occurrence_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup_ids(vec![a, b, a, b, a]), vec![a, b]);
    }
}
