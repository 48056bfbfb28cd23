pub mod config;
pub mod logging;
pub mod providers;
pub mod render;
pub mod repl;
pub mod session;

use anyhow::{Context, Result};
use reqwest::Client;

use config::Config;
use repl::run_repl;
use session::ChatSession;

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;
    let client = Client::builder()
        .build()
        .context("Failed to initialize HTTP client")?;

    let mut session = ChatSession::open(&client, &cfg).await?;
    run_repl(&mut session).await
}
