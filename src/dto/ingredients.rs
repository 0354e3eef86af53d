use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Ingredient;

#[derive(Debug, Deserialize, ToSchema)]
pub struct IngredientQuery {
    /// Case-insensitive name prefix filter.
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct IngredientList {
    #[schema(value_type = Vec<Ingredient>)]
    pub items: Vec<Ingredient>,
}
