pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "basket",
    about = "Basket operator CLI",
    long_about = "Operate Basket migrations, demo fixtures, config inspection, readiness checks, and the cart and notification workflows.",
    after_help = "Examples:\n  basket doctor --json\n  basket cart add --email amy@example.com --product 501 --quantity 2\n  basket notifications unread-count --email amy@example.com"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo fixtures and verify the seed contract")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, database connectivity, and schema readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Operate a user's shopping cart")]
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    #[command(about = "Operate a user's notification feed")]
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum CartAction {
    #[command(about = "Add a product to the cart (repeat adds fold into the existing line)")]
    Add {
        #[arg(long, help = "Email of the acting user")]
        email: String,
        #[arg(long, help = "Product id to add")]
        product: i64,
        #[arg(long, help = "Quantity to add (must be positive)")]
        quantity: u32,
    },
    #[command(about = "List the cart in insertion order")]
    List {
        #[arg(long, help = "Email of the acting user")]
        email: String,
    },
    #[command(about = "Replace the quantity of a cart line")]
    Update {
        #[arg(long, help = "Email of the acting user")]
        email: String,
        #[arg(long, help = "Cart item id to update")]
        item: i64,
        #[arg(long, help = "Replacement quantity (must be positive)")]
        quantity: u32,
    },
    #[command(about = "Remove a cart line")]
    Remove {
        #[arg(long, help = "Email of the acting user")]
        email: String,
        #[arg(long, help = "Cart item id to remove")]
        item: i64,
    },
    #[command(about = "Empty the cart")]
    Clear {
        #[arg(long, help = "Email of the acting user")]
        email: String,
    },
    #[command(about = "Count distinct cart lines")]
    Count {
        #[arg(long, help = "Email of the acting user")]
        email: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum NotificationAction {
    #[command(about = "List the notification feed, newest first")]
    List {
        #[arg(long, help = "Email of the acting user")]
        email: String,
    },
    #[command(about = "Count unread notifications")]
    UnreadCount {
        #[arg(long, help = "Email of the acting user")]
        email: String,
    },
    #[command(about = "Mark one notification read")]
    MarkRead {
        #[arg(long, help = "Email of the acting user")]
        email: String,
        #[arg(long, help = "Notification id to mark read")]
        id: i64,
    },
    #[command(about = "Mark the whole feed read")]
    MarkAllRead {
        #[arg(long, help = "Email of the acting user")]
        email: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Cart { action } => commands::cart::run(action),
        Command::Notifications { action } => commands::notifications::run(action),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
