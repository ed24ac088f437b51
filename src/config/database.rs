use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

/// Connect to MySQL and apply pending migrations.
pub async fn establish_connection(
    database_url: &str,
    max_connections: u32,
) -> Result<MySqlPool, sqlx::Error> {
    let pool = MySqlPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    tracing::info!("Successfully connected to the database");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied successfully");

    Ok(pool)
}
