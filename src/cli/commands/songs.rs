use anyhow::Context;
use clap::Args;

use crate::cli::{utils, OutputFormat};
use crate::client::{PatouClient, SongsQuery};
use crate::database::models::{Decision, TrackDecision};

#[derive(Args)]
pub struct SongsArgs {
    #[arg(long, env = "PATOU_SERVER", default_value = "http://localhost:8888", help = "Server base URL")]
    pub server: String,

    #[arg(long, env = "ADMIN_SECRET", hide_env_values = true, help = "Admin shared secret")]
    pub secret: String,

    #[arg(long, env = "ADMIN_HEADER", default_value = "x-admin-token", help = "Header carrying the secret")]
    pub header: String,

    #[arg(long, help = "allowed or blocked")]
    pub status: Option<String>,

    #[arg(long, help = "Search track name or artist")]
    pub q: Option<String>,

    #[arg(long, help = "1-based page number")]
    pub page: Option<u32>,

    #[arg(long = "page-size", help = "Tracks per page")]
    pub page_size: Option<u32>,
}

pub async fn handle(args: SongsArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let status = args
        .status
        .as_deref()
        .map(str::parse::<Decision>)
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let client = PatouClient::new(&args.server)?.with_admin_secret(args.header, args.secret);
    let query = SongsQuery {
        status,
        q: args.q,
        page: args.page,
        page_size: args.page_size,
    };

    let page = client
        .list_songs(&query)
        .await
        .with_context(|| format!("listing songs from {}", args.server))?;

    if let OutputFormat::Json = output_format {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    utils::output_list(&output_format, &page.items, "No tracks match.", |t: &TrackDecision| {
        format!(
            "{}  {:<7}  {} - {}  ({})",
            t.decided_at.format("%Y-%m-%d %H:%M"),
            t.decision,
            t.artist,
            t.name,
            t.id
        )
    })?;
    let pages = (page.total + page.page_size as i64 - 1) / (page.page_size.max(1) as i64);
    println!("page {} of {} ({} tracks)", page.page, pages.max(1), page.total);
    Ok(())
}
