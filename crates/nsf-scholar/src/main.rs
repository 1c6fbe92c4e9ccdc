//! NSF Scholar - Entry Point
//!
//! One subcommand per pipeline stage.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use nsf_scholar::stages::{self, awards::AwardFilter, awards::AwardSource};
use nsf_scholar::{ClientLauncher, Config, Paths};

#[derive(Parser, Debug)]
#[command(name = "nsf-scholar")]
#[command(about = "Link NSF awards to Google Scholar authors and publications")]
#[command(version)]
struct Cli {
    /// Database directory holding every table
    #[arg(long, global = true, default_value = "database", env = "NSF_SCHOLAR_DATABASE")]
    database: PathBuf,

    /// Google Scholar base URL
    #[arg(long, global = true, env = "SCHOLAR_BASE_URL")]
    scholar_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract award records from yearly XML folders into funding_info.csv
    Awards {
        /// Directory with one subfolder of award XML per year
        #[arg(long, default_value = "nsf_data")]
        base_path: PathBuf,

        /// First award year
        #[arg(long, default_value_t = 2011)]
        start_year: i32,

        /// Last award year (inclusive)
        #[arg(long, default_value_t = 2020)]
        end_year: i32,

        /// Keep only awards from this directorate (exact long name)
        #[arg(long)]
        directorate: Option<String>,

        /// Keep only awards from this division (exact long name)
        #[arg(long)]
        division: Option<String>,
    },

    /// Resolve Google Scholar profiles for one award year
    Authors {
        /// Award year
        year: i32,

        /// Award table to read instead of the database's funding_info.csv
        #[arg(long)]
        funding_info: Option<PathBuf>,
    },

    /// Discover and enrich publications for one award year
    Publications {
        /// Award year
        year: i32,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        database = %cli.database.display(),
        "Starting NSF Scholar"
    );

    let mut config = Config::from_env()?;
    if let Some(url) = cli.scholar_url {
        config.scholar_url = url.trim_end_matches('/').to_string();
    }
    let paths = Paths::new(cli.database);

    let completion = match cli.command {
        Command::Awards { base_path, start_year, end_year, directorate, division } => {
            let source = AwardSource { base_path, start_year, end_year };
            let filter = AwardFilter { directorate, division };
            stages::awards::run(&paths, &source, &filter)?
        }
        Command::Authors { year, funding_info } => {
            let launcher = ClientLauncher::new(config.clone());
            stages::authors::run(&config, &paths, launcher, year, funding_info.as_deref()).await?
        }
        Command::Publications { year } => {
            let launcher = ClientLauncher::new(config.clone());
            stages::publications::run(&config, &paths, launcher, year).await?
        }
    };

    tracing::info!(%completion, "Done");
    Ok(())
}
