use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cart_core::{ArticleId, Order, OrderKey, UserId};
use cart_store::{OrderRepo, StorageGateway, StoreError};

#[derive(Debug, Parser)]
#[command(name = "cart", about = "Inspect and edit stored cart orders")]
pub struct Cli {
    /// Database file, overriding settings.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Settings file (default: ~/.cart/settings.json).
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Print orders as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Show one order (unsaved orders start at quantity 1).
    Show { user: UserId, article: ArticleId },
    /// List a user's orders by article.
    List { user: UserId },
    /// Add one unit of an article.
    Add { user: UserId, article: ArticleId },
    /// Remove one unit of an article.
    Remove { user: UserId, article: ArticleId },
    /// Store an exact quantity.
    Set {
        user: UserId,
        article: ArticleId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Delete an order.
    Delete { user: UserId, article: ArticleId },
}

/// Run one command and return the orders it touched or listed.
pub fn run<G: StorageGateway>(
    repo: &OrderRepo<G>,
    command: &Command,
) -> Result<Vec<Order>, StoreError> {
    match *command {
        Command::Show { user, article } => Ok(vec![repo.find_or_create(OrderKey::new(user, article))?]),
        Command::List { user } => Ok(repo.find_all_for_user(user)?.into_values().collect()),
        Command::Add { user, article } => {
            let mut order = repo.find_or_create(OrderKey::new(user, article))?;
            repo.add_item(&mut order)?;
            Ok(vec![order])
        }
        Command::Remove { user, article } => {
            let mut order = repo.find_or_create(OrderKey::new(user, article))?;
            repo.remove_item(&mut order)?;
            Ok(vec![order])
        }
        Command::Set {
            user,
            article,
            quantity,
        } => {
            let mut order = repo.find_or_create(OrderKey::new(user, article))?;
            order.set_quantity(quantity);
            repo.save(&mut order)?;
            Ok(vec![order])
        }
        Command::Delete { user, article } => {
            repo.delete(OrderKey::new(user, article))?;
            Ok(Vec::new())
        }
    }
}

pub fn describe(order: &Order) -> String {
    let state = if order.is_persisted() { "stored" } else { "new" };
    format!(
        "user={} article={} quantity={} ({state})",
        order.user(),
        order.article(),
        order.quantity()
    )
}
