//! harvest CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use harvest::{
    commands::{
        cmd_ingest, cmd_init, cmd_list_locations, cmd_query, cmd_status, parse_sources,
        print_ingest_stats, print_locations, print_query_results, print_status,
        select_extractors, QueryOptions,
    },
    config::Config,
    error::Result,
    fetch::Fetcher,
    progress::LogWriterFactory,
    store::ContentStore,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "harvest")]
#[command(version, about = "Scrape post listings into a local SQLite store", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize harvest configuration and database
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Fetch every enabled source and store new posts
    Ingest {
        /// Only ingest these source identifiers
        #[arg(long)]
        source: Option<Vec<String>>,
    },

    /// Show stored posts
    Query {
        /// Only show these source identifiers
        #[arg(long)]
        source: Option<Vec<String>>,

        /// Only show posts from the last N days
        #[arg(long)]
        since_days: Option<u32>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show system status
    Status,

    /// List locations recorded so far
    Locations,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Returns false when the command ran but some of its work failed
async fn run() -> Result<bool> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory::default()))
        .with(filter)
        .init();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "harvest", &mut std::io::stdout());
        return Ok(true);
    }

    if let Commands::Init { force } = cli.command {
        let config = cmd_init(cli.config.clone(), force).await?;

        println!("✓ harvest initialized successfully");
        println!("  Config: {}", config.paths.config_file.display());
        println!("  Database: {}", config.paths.db_file.display());
        println!("\nNext steps:");
        println!("  harvest ingest            # Fetch all enabled sources");
        println!("  harvest query --since-days 7");
        return Ok(true);
    }

    let config = load_config(cli.config.as_deref())?;
    let store = ContentStore::new(&config.paths.db_file).await?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Ingest { source } => {
            let requested = source.as_deref().map(parse_sources).transpose()?;
            let extractors = select_extractors(&config, requested.as_deref())?;
            let fetcher = Fetcher::new(&config.fetch)?;

            let stats = cmd_ingest(&store, &fetcher, &extractors).await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_ingest_stats(&stats);
            }
            return Ok(stats.failures() == 0);
        }

        Commands::Query {
            source,
            since_days,
            limit,
        } => {
            let options = QueryOptions {
                sources: source.as_deref().map(parse_sources).transpose()?,
                since_days,
                limit,
            };

            let results = cmd_query(&config, &store, options).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_query_results(&results);
            }
        }

        Commands::Status => {
            let status = cmd_status(&config, &store).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }

        Commands::Locations => {
            let locations = cmd_list_locations(&store).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&locations)?);
            } else {
                print_locations(&locations);
            }
        }
    }

    Ok(true)
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_config_path);

    if !config_path.exists() {
        eprintln!(
            "Config file not found: {}\nRun 'harvest init' first.",
            config_path.display()
        );
        std::process::exit(1);
    }

    Config::load(&config_path)
}
