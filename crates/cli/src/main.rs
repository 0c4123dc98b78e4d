//! Zada CLI - Seeding and local cache management tools.
//!
//! # Usage
//!
//! ```bash
//! # Seed the catalog with demo products
//! zada-cli seed products
//!
//! # Create an admin user
//! zada-cli admin create -e ops@zada.com -n "Ops" -p "change-me-now"
//!
//! # Inspect the local sync cache
//! zada-cli cache list
//! zada-cli cache show zada_products
//! zada-cli cache clear
//! ```
//!
//! # Commands
//!
//! - `seed products` - Seed the catalog with demo products
//! - `admin create` - Create admin users
//! - `cache` - Inspect and clear the local sync cache

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "zada-cli")]
#[command(author, version, about = "Zada Water Delivery CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed store data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Inspect and clear the local sync cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Seed the catalog with demo products
    Products,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address (must be on the company domain)
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Initial password
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached storage keys
    List,
    /// Print the cached value for one key
    Show {
        /// Storage key, e.g. `zada_products`
        key: String,
    },
    /// Remove every cached value
    Clear,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { target } => match target {
            SeedTarget::Products => commands::seed::products().await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, &password).await?;
            }
        },
        Commands::Cache { action } => match action {
            CacheAction::List => commands::cache::list().await?,
            CacheAction::Show { key } => commands::cache::show(&key).await?,
            CacheAction::Clear => commands::cache::clear().await?,
        },
    }
    Ok(())
}
