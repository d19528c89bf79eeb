#![doc = "trello-hook: CI hook linking pull requests to Trello cards."]

//! On a pull-request event, finds the board card named after the PR
//! source branch, then attaches the PR link or posts a comment and moves
//! the card to the list configured for the PR state.

pub mod board;
pub mod config;
pub mod event;
pub mod handler;
pub mod load_config;
pub mod trello;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use event::load_event;
use handler::handle_pull_request;
use load_config::load_config;
use trello::TrelloClient;

/// CLI for trello-hook: react to pull-request events on a Trello board.
#[derive(Parser)]
#[clap(
    name = "trello-hook",
    version,
    about = "Attach pull requests to Trello cards and move them across board lists"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process the workflow event and apply the configured card actions
    Run {
        /// Path to the event payload JSON (defaults to $GITHUB_EVENT_PATH)
        #[clap(long)]
        event: Option<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run { event } => {
            let config = load_config()?;

            let event_path = match event {
                Some(path) => path,
                None => std::env::var("GITHUB_EVENT_PATH")
                    .map(PathBuf::from)
                    .map_err(|_| {
                        anyhow::anyhow!("no --event given and GITHUB_EVENT_PATH is not set")
                    })?,
            };
            let payload = load_event(&event_path)?;

            let Some(pull_request) = payload.pull_request else {
                println!("No pull request in event payload, nothing to do.");
                return Ok(());
            };
            if pull_request.title.is_none() {
                println!("Pull request has no title, nothing to do.");
                return Ok(());
            }

            let client = TrelloClient::from_config(&config);
            match handle_pull_request(&client, &config, &pull_request).await {
                Ok(report) => {
                    println!("Pull request handled.\nReport:");
                    println!("{report:#?}");
                    Ok(())
                }
                Err(e) => {
                    eprintln!("[ERROR] Handling pull request failed: {e}");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}
