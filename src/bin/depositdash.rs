use std::path::PathBuf;

use clap::{Parser, Subcommand};

use depositdash::{window, Config, Database, DepositDash, Window};

#[derive(Parser)]
#[command(name = "depositdash", about = "Direct deposit dashboard data refresher")]
struct Cli {
    /// Database path (default: $DEPOSITDASH_DB or ~/.depositdash/depositdash.db)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Report HTML path (default: $DEPOSITDASH_REPORT or ./index.html)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute every planned window and splice the data into the report
    Refresh,
    /// Show the planned date windows without querying
    Plan,
    /// Compute one window's aggregates and print them as JSON
    Snapshot {
        /// Window to compute (e.g. 30d, 2025-08)
        window: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = Config::resolve(cli.db, cli.report)?;
    let today = chrono::Local::now().date_naive();

    match cli.command.unwrap_or(Commands::Refresh) {
        Commands::Refresh => {
            let db = Database::open_at(&config.db_path).await?;
            let app = DepositDash::new(db);
            let cache = app.refresh_as_of(&config.report_path, today).await?;
            println!(
                "Updated {} with data for {} windows",
                config.report_path.display(),
                cache.len()
            );
        }
        Commands::Plan => {
            for window in window::default_plan() {
                let (start, end) = window.date_range(today);
                println!(
                    "{:<16} {}  ({} to {})",
                    window.label(),
                    window.cache_key(today),
                    start,
                    end
                );
            }
        }
        Commands::Snapshot { window } => {
            let window = Window::parse(&window)?;
            let db = Database::open_at(&config.db_path).await?;
            let app = DepositDash::new(db);
            let snapshot = app.snapshot(&window, today).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }

    Ok(())
}
