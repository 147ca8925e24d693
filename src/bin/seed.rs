use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use resource_manager::seed::{self, SeedOutcome};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    match seed::run(&pool).await? {
        SeedOutcome::AlreadySeeded => {
            tracing::info!("Demo data already present, nothing to do");
        }
        SeedOutcome::Inserted {
            users,
            projects,
            assignments,
        } => {
            tracing::info!(users, projects, assignments, "Demo data inserted");
            tracing::info!(
                "Log in as {} or engineer@demo.com with password '{}'",
                seed::DEMO_MANAGER_EMAIL,
                seed::DEMO_PASSWORD
            );
        }
    }

    pool.close().await;
    Ok(())
}
