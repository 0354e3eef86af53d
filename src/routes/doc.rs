use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        ingredients::IngredientList,
        recipes::{
            CreateRecipeRequest, IngredientLineRequest, RecipeDto, RecipeIngredientDto,
            RecipeList, UpdateRecipeRequest,
        },
        tags::TagList,
        users::{SubscriptionDto, SubscriptionList, UserDto},
    },
    models::{Ingredient, Recipe, RecipeShort, Tag, User},
    response::{ApiResponse, Meta},
    routes::{auth, health, health::HealthData, ingredients, params, recipes, tags, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        tags::list_tags,
        tags::get_tag,
        ingredients::list_ingredients,
        ingredients::get_ingredient,
        recipes::list_recipes,
        recipes::get_recipe,
        recipes::create_recipe,
        recipes::update_recipe,
        recipes::delete_recipe,
        recipes::add_favorite,
        recipes::remove_favorite,
        recipes::add_to_cart,
        recipes::remove_from_cart,
        recipes::download_shopping_cart,
        users::list_subscriptions,
        users::subscribe,
        users::unsubscribe,
    ),
    components(
        schemas(
            User,
            UserDto,
            Tag,
            Ingredient,
            Recipe,
            RecipeShort,
            TagList,
            IngredientList,
            RecipeList,
            RecipeDto,
            RecipeIngredientDto,
            CreateRecipeRequest,
            UpdateRecipeRequest,
            IngredientLineRequest,
            SubscriptionDto,
            SubscriptionList,
            params::Pagination,
            Meta,
            LoginRequest,
            LoginResponse,
            RegisterRequest,
            HealthData,
            ApiResponse<RecipeDto>,
            ApiResponse<RecipeList>,
            ApiResponse<RecipeShort>,
            ApiResponse<TagList>,
            ApiResponse<Tag>,
            ApiResponse<IngredientList>,
            ApiResponse<Ingredient>,
            ApiResponse<SubscriptionList>,
            ApiResponse<SubscriptionDto>,
            ApiResponse<User>,
            ApiResponse<LoginResponse>,
            ApiResponse<HealthData>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Tags", description = "Tag reference data"),
        (name = "Ingredients", description = "Ingredient catalog"),
        (name = "Recipes", description = "Recipe CRUD"),
        (name = "Favorites", description = "Favorite toggles"),
        (name = "ShoppingCart", description = "Shopping cart toggles and download"),
        (name = "Subscriptions", description = "Author subscriptions"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
