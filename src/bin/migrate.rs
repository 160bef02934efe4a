use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
};

/// Applies `migrations/*.sql` without starting the server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter("info,storefront_api=debug")
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url, 1).await?;
    let applied = run_migrations(&orm).await?;
    tracing::info!(files = applied, "migrations applied");
    Ok(())
}
