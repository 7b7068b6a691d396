//! Database seeder
//!
//! Creates a known admin and a known regular user for local development:
//!
//! - admin@taskdesk.local / password123 (admin)
//! - sofyan@taskdesk.local / password123
//!
//! Safe to re-run; accounts that already exist are left untouched.
//!
//! ```bash
//! cargo run -p taskdesk-api --bin seed
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskdesk_api::config::Config;
use taskdesk_shared::{
    auth::password::hash_password,
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
    models::user::{CreateUser, User},
};

async fn seed_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    is_admin: bool,
) -> anyhow::Result<()> {
    if User::email_exists(pool, email).await? {
        tracing::info!(email, "user already seeded, skipping");
        return Ok(());
    }

    let user = User::create(
        pool,
        CreateUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            is_admin,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, email, is_admin, "user seeded");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,taskdesk_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..DatabaseConfig::default()
    })
    .await?;

    run_migrations(&pool).await?;

    seed_user(&pool, "Admin", "admin@taskdesk.local", "password123", true).await?;
    seed_user(&pool, "Sofyan", "sofyan@taskdesk.local", "password123", false).await?;

    tracing::info!("Seeding complete");

    Ok(())
}
