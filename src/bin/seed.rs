use rust_decimal::Decimal;
use storefront_api::{
    config::AppConfig,
    db::{DbPool, create_pool},
    middleware::auth::{ADMIN_ROLE, USER_ROLE},
    services::{auth_service::hash_password, product_service::slugify},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url, 2).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin123", ADMIN_ROLE).await?;
    let user_id = ensure_user(&pool, "user@example.com", "user123", USER_ROLE).await?;
    let category_id = ensure_category(&pool, "Merchandise").await?;
    seed_products(&pool, category_id).await?;

    tracing::info!(%admin_id, %user_id, "seed completed");
    Ok(())
}

async fn ensure_user(pool: &DbPool, email: &str, password: &str, role: &str) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, first_name, last_name, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind("Demo")
    .bind(role)
    .bind(role)
    .fetch_one(pool)
    .await?;

    sqlx::query(
        "INSERT INTO customers (id, user_id) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .execute(pool)
    .await?;

    tracing::info!(email, role, "ensured user");
    Ok(user_id)
}

async fn ensure_category(pool: &DbPool, title: &str) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE title = $1")
        .bind(title)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) =
        sqlx::query_as("INSERT INTO categories (id, title) VALUES ($1, $2) RETURNING id")
            .bind(Uuid::new_v4())
            .bind(title)
            .fetch_one(pool)
            .await?;
    Ok(id)
}

async fn seed_products(pool: &DbPool, category_id: Uuid) -> anyhow::Result<()> {
    let products = [
        ("Axum Hoodie", "Warm hoodie for Rustaceans", Decimal::new(5500, 2), 50),
        ("Ferris Mug", "Coffee tastes better with Ferris", Decimal::new(1200, 2), 100),
        ("Rust Sticker Pack", "Decorate your laptop", Decimal::new(500, 2), 2),
        ("E-book: Async Rust", "Learn async Rust patterns", Decimal::new(2500, 2), 15),
    ];

    for (name, desc, price, inventory) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, slug, description, unit_price, inventory, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slugify(name))
        .bind(desc)
        .bind(price)
        .bind(inventory)
        .bind(category_id)
        .execute(pool)
        .await?;
    }

    tracing::info!("seeded products");
    Ok(())
}
