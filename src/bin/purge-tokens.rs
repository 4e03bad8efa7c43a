/// Purge expired password reset tokens
/// Run periodically (e.g., via cron job: 0 * * * * /app/purge-tokens)
///
/// Usage: purge-tokens [--dry-run]
///   --dry-run : Only count expired tokens, delete nothing

use clap::Parser;
use sqlx::postgres::PgPoolOptions;

use restaurant_backoffice::services::cron::CronService;

#[derive(Parser)]
#[command(name = "purge-tokens", about = "Purge expired password reset tokens")]
struct Args {
    /// Count expired tokens without deleting them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable not set"))?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    if args.dry_run {
        let count = CronService::count_expired_tokens(&pool).await?;
        tracing::info!("{} expired password reset tokens would be purged", count);
    } else {
        let purged = CronService::purge_expired_tokens(&pool).await?;
        tracing::info!("Token purge completed ({} removed)", purged);
    }

    Ok(())
}
