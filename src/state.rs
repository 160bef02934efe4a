use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, create_orm_conn, create_pool},
};

/// Shared handles for request handlers. Raw SQL goes through `pool`,
/// entity access and transactions through `orm`.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
}

impl AppState {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = create_pool(&config.database_url, config.db_max_connections).await?;
        let orm = create_orm_conn(&config.database_url, config.db_max_connections).await?;
        Ok(Self { pool, orm })
    }
}
