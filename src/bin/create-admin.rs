//! Create (or promote) a restaurant administrator.
//!
//! Usage:
//!   DATABASE_URL=... create-admin --username chef --email chef@example.com
//!
//! The password is read from `--password` or, when omitted, from the
//! `ADMIN_PASSWORD` environment variable. An existing account with the same
//! username is promoted to staff, reactivated and gets the new password.

use anyhow::Context;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;

use restaurant_backoffice::{db, services::auth::AuthService};

#[derive(Parser)]
#[command(name = "create-admin", about = "Create or promote a backoffice administrator")]
struct Args {
    #[arg(long)]
    username: String,

    #[arg(long)]
    email: String,

    /// Falls back to ADMIN_PASSWORD
    #[arg(long)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let password = match args.password {
        Some(p) => p,
        None => std::env::var("ADMIN_PASSWORD")
            .context("Pass --password or set ADMIN_PASSWORD")?,
    };
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL required")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    db::run_migrations(&pool).await?;

    let user = AuthService::upsert_admin(&pool, &args.username, &args.email, &password)
        .await
        .context("Failed to create administrator")?;

    tracing::info!(user_id = user.id, username = %user.username, "Administrator ready");
    Ok(())
}
