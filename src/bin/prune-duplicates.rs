use clap::Parser;
use match_results_crawler::{config::DatabaseArgs, Database, Table};

/// Deletes matches stored twice under the same home team, away team and
/// date, keeping the first one. Overlapping crawl runs can leave such rows.
#[derive(Debug, Parser)]
struct Args {
    #[command(flatten)]
    db: DatabaseArgs,
}

async fn prune_duplicates(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::new(&args.db.database).await?;
    let before = db.matches.count().await?;
    let deleted = db.matches.delete_duplicates().await?;
    println!("Delete {} of {} matches", deleted, before);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    prune_duplicates(Args::parse()).await
}
