use clap::Subcommand;

use crate::cli::{utils, OutputFormat};
use crate::history::{FileLocalStore, HistoryEntry, HistoryRepository};

#[derive(Subcommand)]
pub enum HistoryCommands {
    #[command(about = "Show history and excluded tracks")]
    List,

    #[command(about = "Record a played track at the top of the history")]
    Record {
        #[arg(help = "Spotify track id")]
        id: String,
        #[arg(help = "Track name")]
        name: String,
        #[arg(help = "Artist")]
        artist: String,
        #[arg(long, help = "Cover image URL")]
        image: Option<String>,
    },

    #[command(about = "Move a track from history to excluded")]
    Exclude {
        #[arg(help = "Spotify track id")]
        id: String,
    },

    #[command(about = "Move a track from excluded back to history")]
    Restore {
        #[arg(help = "Spotify track id")]
        id: String,
    },

    #[command(about = "Empty the history (excluded tracks are kept)")]
    Clear,
}

pub fn handle(file: &str, cmd: HistoryCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let repo = HistoryRepository::new(FileLocalStore::new(file));

    match cmd {
        HistoryCommands::List => {
            let line = |e: &HistoryEntry| format!("{}  {} - {}", e.id, e.artist, e.name);
            if let OutputFormat::Text = output_format {
                println!("History:");
            }
            utils::output_list(&output_format, &repo.history()?, "  (empty)", line)?;
            if let OutputFormat::Text = output_format {
                println!("Excluded:");
            }
            utils::output_list(&output_format, &repo.excluded()?, "  (empty)", line)
        }
        HistoryCommands::Record { id, name, artist, image } => {
            let mut entry = HistoryEntry::new(id.clone(), name, artist);
            entry.image_url = image;
            if repo.record(entry)? {
                utils::output_success(&output_format, &format!("Recorded {}", id), None)
            } else {
                utils::output_success(&output_format, &format!("{} is excluded; not recorded", id), None)
            }
        }
        HistoryCommands::Exclude { id } => {
            if !repo.exclude(&id)? {
                anyhow::bail!("track {} is not in the history", id);
            }
            utils::output_success(&output_format, &format!("Excluded {}", id), None)
        }
        HistoryCommands::Restore { id } => {
            if !repo.restore(&id)? {
                anyhow::bail!("track {} is not excluded", id);
            }
            utils::output_success(&output_format, &format!("Restored {}", id), None)
        }
        HistoryCommands::Clear => {
            repo.clear_history()?;
            utils::output_success(&output_format, "History cleared", None)
        }
    }
}
