use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sw")]
#[command(about = "shopwatch operator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the environment and print the resolved config (credentials stripped)
    ConfigCheck,

    /// Fetch and print the latest page of orders, newest first. Read-only.
    Feed {
        /// Page size (defaults to SW_PAGE_SIZE)
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Print the notification payload that would be posted for an order
    Render {
        /// JSON file holding one receipt record; a built-in sample is used if omitted
        #[arg(long)]
        order_file: Option<String>,
    },

    /// Ask a running daemon for a manual check (POST /v1/check)
    Check {
        /// Daemon address (defaults to SW_DAEMON_ADDR)
        #[arg(long)]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigCheck => commands::config_check(),
        Commands::Feed { limit } => commands::feed(limit).await,
        Commands::Render { order_file } => commands::render(order_file),
        Commands::Check { addr } => commands::check(addr).await,
    }
}
