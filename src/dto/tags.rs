use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Tag;

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TagList {
    #[schema(value_type = Vec<Tag>)]
    pub items: Vec<Tag>,
}

/// Used by the seed tool and tests; tags are reference data and have no
/// public write endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: String,
    pub slug: String,
}
