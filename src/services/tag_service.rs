use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::tags::{CreateTagRequest, TagList},
    error::{AppError, AppResult},
    models::Tag,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_tags(state: &AppState) -> AppResult<ApiResponse<TagList>> {
    let items = sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY name")
        .fetch_all(&state.pool)
        .await?;

    Ok(ApiResponse::success(
        "Tags",
        TagList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_tag(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Tag>> {
    let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let tag = match tag {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Tag", tag, None))
}

/// Accepts `#RGB` or `#RRGGBB`.
pub fn validate_color(color: &str) -> AppResult<()> {
    let hex = color
        .strip_prefix('#')
        .ok_or_else(|| AppError::BadRequest(format!("{color} is not a HEX color code")))?;
    let valid = matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(AppError::BadRequest(format!(
            "{color} is not a HEX color code"
        )));
    }
    Ok(())
}

/// Tags have no public write endpoint; this is used by the seed tool.
pub async fn create_tag(pool: &DbPool, payload: CreateTagRequest) -> AppResult<Tag> {
    validate_color(&payload.color)?;

    let tag = sqlx::query_as::<_, Tag>(
        "INSERT INTO tags (id, name, color, slug) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.name)
    .bind(payload.color)
    .bind(payload.slug)
    .fetch_one(pool)
    .await
    .map_err(|err| AppError::conflict_on_unique(err, "tag already exists"))?;

    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::validate_color;

    #[test]
    fn accepts_short_and_long_hex() {
        assert!(validate_color("#abc").is_ok());
        assert!(validate_color("#AABBCC").is_ok());
        assert!(validate_color("#1a2B3c").is_ok());
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!(validate_color("abc").is_err());
        assert!(validate_color("#abcd").is_err());
        assert!(validate_color("#gggggg").is_err());
        assert!(validate_color("#").is_err());
        assert!(validate_color("").is_err());
    }
}
