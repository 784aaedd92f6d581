//! Forum ACL - Main Entry Point
//!
//! Inspects forum privileges from a portal snapshot.

use anyhow::Result;
use clap::Parser;

use forum_acl::cli::{self, Cli};
use forum_acl::config::Config;

fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // Initialize tracing (stderr, stdout carries the command output)
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forum_acl=info".into()),
        )
        .with_writer(std::io::stderr);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let cli = Cli::parse();
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), ?cli, "Starting forum-acl");

    let stdout = std::io::stdout();
    cli::run(&cli, &config, &mut stdout.lock())
}
