use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::client::PatouClient;

#[derive(Args)]
pub struct RefreshArgs {
    #[arg(long, env = "PATOU_SERVER", default_value = "http://localhost:8888", help = "Server base URL")]
    pub server: String,

    #[arg(long = "refresh-token", env = "SPOTIFY_REFRESH_TOKEN", hide_env_values = true, help = "Spotify refresh token")]
    pub refresh_token: String,
}

pub async fn handle(args: RefreshArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = PatouClient::new(&args.server)?.with_refresh_token(args.refresh_token);
    let token = client
        .refresh_access_token()
        .await
        .with_context(|| format!("refreshing access token via {}", args.server))?;

    match output_format {
        OutputFormat::Json => utils::output_success(
            &output_format,
            "Access token refreshed",
            Some(json!({ "access_token": token.access_token, "expires_in": token.expires_in })),
        ),
        OutputFormat::Text => {
            println!("{}", token.access_token);
            eprintln!("expires in {}s", token.expires_in);
            Ok(())
        }
    }
}
