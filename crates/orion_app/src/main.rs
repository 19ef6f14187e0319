mod platform;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "orion_app")]
#[command(about = "Download the Orion.co page assets or export the observation night to a calendar")]
struct Cli {
    /// RON configuration file; built-in defaults are used when it is missing
    #[arg(short, long, default_value = "orion.ron")]
    config: PathBuf,

    /// Also write the log to ./orion.log
    #[arg(long)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the rows of the download picker
    List,
    /// Download one picker row by filename
    Download { name: String },
    /// Download every row, staggered
    DownloadAll,
    /// Open one picker row in a new context
    Open { name: String },
    /// Save the observation event as an .ics file
    Calendar,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    platform::logging::initialize(if cli.log_file {
        platform::logging::LogDestination::Both
    } else {
        platform::logging::LogDestination::Terminal
    });

    let action = match cli.command {
        Commands::List => platform::app::Action::List,
        Commands::Download { name } => platform::app::Action::Download(name),
        Commands::DownloadAll => platform::app::Action::DownloadAll,
        Commands::Open { name } => platform::app::Action::Open(name),
        Commands::Calendar => platform::app::Action::Calendar,
    };
    platform::app::run(&cli.config, action).await
}
