use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use match_results_crawler::{
    config::{parse_day, CrawlArgs, DatabaseArgs, PageArgs, DEFAULT_CRON},
    matchendirect::MatchEnDirectParser,
    model::{DateFilter, MatchFilter, MatchUpdate, NewMatch, NewTeam, Pagination, TeamUpdate},
    schedule, Crawler, Database, MatchStore, TeamStore,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(about = "Match results crawler and record store")]
struct Cli {
    #[command(flatten)]
    db: DatabaseArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Crawl once and store the new matches
    Crawl(CrawlArgs),
    /// Crawl on a cron schedule until interrupted
    Schedule {
        #[command(flatten)]
        crawl: CrawlArgs,

        /// Cron expression, seconds first
        #[arg(long, env = "CRAWL_CRON", default_value = DEFAULT_CRON)]
        cron: String,
    },
    #[command(subcommand)]
    Matches(MatchCommand),
    #[command(subcommand)]
    Teams(TeamCommand),
}

#[derive(Debug, Subcommand)]
enum MatchCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        home_team_name: Option<String>,
        #[arg(long)]
        away_team_name: Option<String>,
        /// Home or away
        #[arg(long)]
        team: Option<String>,
        /// Kickoff day (UTC), YYYY-MM-DD
        #[arg(long, value_parser = parse_day)]
        date: Option<NaiveDate>,
    },
    Get {
        id: i64,
    },
    /// JSON body, e.g. '{"homeTeamName": "PSG", ...}'
    Create {
        json: String,
    },
    /// Partial JSON body
    Update {
        id: i64,
        json: String,
    },
    /// Complete JSON body
    Reset {
        id: i64,
        json: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum TeamCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    Get {
        id: i64,
    },
    Create {
        json: String,
    },
    Update {
        id: i64,
        json: String,
    },
    Reset {
        id: i64,
        json: String,
    },
    Delete {
        id: i64,
    },
}

fn print<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_matches(db: &Database, command: MatchCommand) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        MatchCommand::List {
            page,
            home_team_name,
            away_team_name,
            team,
            date,
        } => {
            let filter = MatchFilter {
                home_team_name,
                away_team_name,
                team,
                date: date.map(DateFilter::Day),
            };
            let pagination = Pagination {
                page: page.page,
                size: page.size,
            };
            print(&MatchStore::find_many(db, &filter, Some(pagination)).await?)
        }
        MatchCommand::Get { id } => print(&MatchStore::find_by_id(db, id).await?),
        MatchCommand::Create { json } => {
            let record: NewMatch = serde_json::from_str(&json)?;
            record.validate()?;
            print(&MatchStore::insert_one(db, record).await?)
        }
        MatchCommand::Update { id, json } => {
            let update: MatchUpdate = serde_json::from_str(&json)?;
            print(&MatchStore::update_by_id(db, id, update).await?)
        }
        MatchCommand::Reset { id, json } => {
            let record: NewMatch = serde_json::from_str(&json)?;
            print(&MatchStore::reset_by_id(db, id, record).await?)
        }
        MatchCommand::Delete { id } => {
            MatchStore::delete_by_id(db, id).await?;
            info!("Deleted match {}", id);
            Ok(())
        }
    }
}

async fn run_teams(db: &Database, command: TeamCommand) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        TeamCommand::List { page } => {
            let pagination = Pagination {
                page: page.page,
                size: page.size,
            };
            print(&TeamStore::find_many(db, pagination).await?)
        }
        TeamCommand::Get { id } => print(&TeamStore::find_by_id(db, id).await?),
        TeamCommand::Create { json } => {
            let record: NewTeam = serde_json::from_str(&json)?;
            print(&TeamStore::insert_one(db, record).await?)
        }
        TeamCommand::Update { id, json } => {
            let update: TeamUpdate = serde_json::from_str(&json)?;
            print(&TeamStore::update_by_id(db, id, update).await?)
        }
        TeamCommand::Reset { id, json } => {
            let record: NewTeam = serde_json::from_str(&json)?;
            print(&TeamStore::reset_by_id(db, id, record).await?)
        }
        TeamCommand::Delete { id } => {
            TeamStore::delete_by_id(db, id).await?;
            info!("Deleted team {}", id);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "debug,html5ever=error,selectors=error,hyper=warn,reqwest=info,sqlx=warn".into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    let cli = Cli::parse();
    let db = Database::new(&cli.db.database).await?;

    match cli.command {
        Command::Crawl(args) => {
            let crawler = Crawler::new(
                args.fetcher()?,
                MatchEnDirectParser,
                Arc::new(db),
                args.normalizer(),
            );
            let candidates = crawler.crawl(&args.start_url, args.page_budget).await;
            print(&candidates)?;
        }
        Command::Schedule { crawl, cron } => {
            let crawler = Arc::new(Crawler::new(
                crawl.fetcher()?,
                MatchEnDirectParser,
                Arc::new(db),
                crawl.normalizer(),
            ));
            let job = schedule::crawl_job(crawler, &cron, crawl.start_url, crawl.page_budget)?;
            info!("Crawl scheduled at {:?}", cron);
            schedule::run(job).await?;
        }
        Command::Matches(command) => run_matches(&db, command).await?,
        Command::Teams(command) => run_teams(&db, command).await?,
    }

    Ok(())
}
