use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use recipegram_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::tags::CreateTagRequest,
    services::tag_service,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let pool = create_pool(&config.database_url).await?;

    let chef_id = ensure_user(&pool, "chef@example.com", "chef", "chef123").await?;
    let eater_id = ensure_user(&pool, "eater@example.com", "eater", "eater123").await?;
    seed_tags(&pool).await?;
    seed_ingredients(&pool).await?;

    println!("Seed completed. Chef ID: {chef_id}, Eater ID: {eater_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    username: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, username, first_name, last_name, password_hash)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(username)
    .bind("Demo")
    .bind("User")
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email}");
    Ok(user_id)
}

async fn seed_tags(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let tags = vec![
        ("Breakfast", "#E26C2D", "breakfast"),
        ("Lunch", "#49B64E", "lunch"),
        ("Dinner", "#8775D2", "dinner"),
    ];

    for (name, color, slug) in tags {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM tags WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        if exists.is_some() {
            continue;
        }
        tag_service::create_tag(
            pool,
            CreateTagRequest {
                name: name.to_string(),
                color: color.to_string(),
                slug: slug.to_string(),
            },
        )
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    }

    println!("Seeded tags");
    Ok(())
}

async fn seed_ingredients(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let ingredients = vec![
        ("flour", "g"),
        ("sugar", "g"),
        ("butter", "g"),
        ("milk", "ml"),
        ("egg", "pc"),
        ("salt", "g"),
    ];

    for (name, unit) in ingredients {
        sqlx::query(
            r#"
            INSERT INTO ingredients (id, name, measurement_unit)
            VALUES ($1, $2, $3)
            ON CONFLICT (name, measurement_unit) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(unit)
        .execute(pool)
        .await?;
    }

    println!("Seeded ingredients");
    Ok(())
}
