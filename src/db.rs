use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use tokio::fs;

pub type DbPool = sqlx::PgPool;
pub type OrmConn = DatabaseConnection;

/// Create the sqlx pool used for raw queries.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Create a SeaORM connection.
pub async fn create_orm_conn(database_url: &str, max_connections: u32) -> Result<OrmConn> {
    let mut options = ConnectOptions::new(database_url);
    options.max_connections(max_connections).sqlx_logging(false);
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Minimal migration runner that executes SQL files in `migrations/` in filename order.
/// Returns how many files were applied. Statements must be idempotent.
pub async fn run_migrations(conn: &OrmConn) -> Result<usize> {
    let mut entries = fs::read_dir("migrations").await?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();

    let backend = conn.get_database_backend();
    let applied = files.len();
    for file in files {
        let sql = fs::read_to_string(&file).await?;
        // Postgres prepared statements cannot contain multiple commands,
        // so split the migration file and run each statement individually.
        for stmt in sql.split(';') {
            let stmt = stmt.trim();
            if stmt.is_empty() {
                continue;
            }
            let statement = format!("{stmt};");
            conn.execute(Statement::from_string(backend, statement))
                .await?;
        }
        tracing::debug!(file = %file.display(), "migration applied");
    }

    Ok(applied)
}
