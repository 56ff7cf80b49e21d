//! Door Portal CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! dp-cli migrate
//!
//! # Create a user (role: user or admin)
//! dp-cli user create -e admin@example.com -n "Admin Name" -r admin --password '...'
//!
//! # Reset a password
//! dp-cli user password -e admin@example.com --password '...'
//!
//! # Load door styles, manufacturers, finishes and glass types
//! dp-cli seed catalog data/catalog.yaml
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user` - Create users and reset passwords
//! - `seed catalog` - Seed the reference catalog from YAML

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "dp-cli")]
#[command(author, version, about = "Door Portal CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage portal users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`user`, `admin`)
        #[arg(short, long, default_value = "user")]
        role: String,

        /// Initial password
        #[arg(long)]
        password: String,
    },
    /// Set a user's password
    Password {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// New password
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Seed the catalog from a YAML file
    Catalog {
        /// Path to the YAML file
        file: String,
    },
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                role,
                password,
            } => {
                commands::user::create_user(&email, &name, &role, &password).await?;
            }
            UserAction::Password { email, password } => {
                commands::user::set_password(&email, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file } => commands::seed::catalog(&file).await?,
        },
    }
    Ok(())
}
