mod cli;
mod logging;

use std::path::Path;

use anyhow::Context;
use clap::Parser;

use cart_settings::{load_settings, load_settings_from_path};
use cart_store::{Database, DatabaseConfig, OrderRepo};

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Settings warnings (rejected CART_* values) go through a temporary subscriber.
    let mut settings = tracing::subscriber::with_default(logging::bootstrap(), || {
        match &cli.settings {
            Some(path) => load_settings_from_path(path),
            None => load_settings(),
        }
    })
    .context("failed to load settings")?;
    if let Some(db) = &cli.db {
        settings.database.path = db.to_string_lossy().into_owned();
    }

    logging::init(&settings.logging);

    let config = DatabaseConfig {
        busy_timeout_ms: settings.database.busy_timeout_ms,
    };
    let db_path = Path::new(&settings.database.path);
    let db = Database::open_with(db_path, &config)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    tracing::debug!(command = ?cli.command, "running command");
    let repo = OrderRepo::new(db);
    let orders = cli::run(&repo, &cli.command)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&orders)?);
    } else {
        for order in &orders {
            println!("{}", cli::describe(order));
        }
    }
    Ok(())
}
