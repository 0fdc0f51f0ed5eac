//! Command-line client for deploy notes.

mod cli;
mod commands;
mod render;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use deploynotes_core::db::open_db;
use deploynotes_core::{
    drain_notices, init_logging, NoteStore, Notice, Notifier, SqliteLocalCache,
    StoreConfig,
};
use log::{info, warn};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    let config = StoreConfig::from_env().context("invalid client configuration")?;
    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open cache at {}", cli.db.display()))?;
    let (notifier, mut notices) = Notifier::channel();
    let mut store = NoteStore::from_config(SqliteLocalCache::new(conn), &config, notifier);

    // A refresh replaces local state anyway; skip the startup fetch it would
    // otherwise trigger on an empty cache.
    if !matches!(cli.command, Command::Refresh) {
        if let Err(err) = store.load().await {
            warn!("event=cli_load module=cli status=error error={err}");
        }
    }

    let outcome = commands::run(&mut store, &config, cli.command).await;
    store.flush().await;
    print_notices(&drain_notices(&mut notices));
    info!("event=cli_exit module=cli status=ok");

    Ok(if outcome? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        eprintln!("{notice}");
    }
}
