use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dto::users::UserDto, models::Tag, routes::params::Pagination};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct IngredientLineRequest {
    /// Ingredient id from the catalog.
    pub id: Uuid,
    pub amount: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<IngredientLineRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub cooking_time: Option<i32>,
    pub tags: Option<Vec<Uuid>>,
    pub ingredients: Option<Vec<IngredientLineRequest>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecipeIngredientDto {
    /// Ingredient id (not the line item id).
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecipeDto {
    pub id: Uuid,
    pub tags: Vec<Tag>,
    pub author: UserDto,
    pub ingredients: Vec<RecipeIngredientDto>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct RecipeList {
    #[schema(value_type = Vec<RecipeDto>)]
    pub items: Vec<RecipeDto>,
}

// Pagination fields are inlined rather than flattened: serde_urlencoded
// buffers flattened values as strings, which breaks integer query params
// under axum's Query extractor.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecipeQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub author: Option<Uuid>,
    /// Comma-separated tag slugs; a recipe matches if it carries any of them.
    pub tags: Option<String>,
    /// Only applied for authenticated callers.
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}

impl RecipeQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    pub fn tag_slugs(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::Uri};

    #[test]
    fn query_parses_pagination_from_uri() {
        let uri: Uri = "/api/recipes?page=2&per_page=5&tags=breakfast,lunch"
            .parse()
            .unwrap();
        let Query(query) = Query::<RecipeQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.pagination().normalize(), (2, 5, 5));
        assert_eq!(query.tag_slugs(), vec!["breakfast", "lunch"]);
    }

    #[test]
    fn query_parses_with_no_params() {
        let uri: Uri = "/api/recipes".parse().unwrap();
        let Query(query) = Query::<RecipeQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.pagination().normalize(), (1, 20, 0));
        assert!(query.tag_slugs().is_empty());
        assert!(query.author.is_none());
    }
}
