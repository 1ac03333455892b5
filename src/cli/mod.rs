pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "patou")]
#[command(about = "Patou CLI - admin listing, Spotify token refresh and local listening history")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List moderated tracks from a running server")]
    Songs(commands::songs::SongsArgs),

    #[command(about = "Exchange a Spotify refresh token for an access token")]
    Refresh(commands::refresh::RefreshArgs),

    #[command(about = "Local listening history and excluded tracks")]
    History {
        #[arg(long, env = "PATOU_HISTORY_FILE", default_value = "patou-history.json", help = "Local store file")]
        file: String,

        #[command(subcommand)]
        cmd: commands::history::HistoryCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Songs(args) => commands::songs::handle(args, output_format).await,
        Commands::Refresh(args) => commands::refresh::handle(args, output_format).await,
        Commands::History { file, cmd } => commands::history::handle(&file, cmd, output_format),
    }
}
