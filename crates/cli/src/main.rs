//! Linha Verde CLI - Backend management tools.
//!
//! # Usage
//!
//! ```bash
//! # Register an operator account
//! lv-cli admin signup -e admin@linhaverde.com.br -p 's3nh4-forte'
//!
//! # Seed the vehicle table with the sample catalogue
//! lv-cli seed -e admin@linhaverde.com.br -p 's3nh4-forte'
//!
//! # Seed even when the table already has vehicles
//! lv-cli seed -e admin@linhaverde.com.br -p 's3nh4-forte' --force
//! ```
//!
//! # Commands
//!
//! - `seed` - Insert the sample catalogue
//! - `admin signup` - Register operator accounts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lv-cli")]
#[command(author, version, about = "Linha Verde CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert the three sample vehicles
    Seed {
        /// Operator email to sign in with
        #[arg(short, long)]
        email: String,

        /// Operator password
        #[arg(short, long)]
        password: String,

        /// Insert even when the table is not empty
        #[arg(long)]
        force: bool,
    },
    /// Manage operator accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Register a new operator account
    Signup {
        /// Operator email address
        #[arg(short, long)]
        email: String,

        /// Operator password (at least 6 characters)
        #[arg(short, long)]
        password: String,
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
        Commands::Seed {
            email,
            password,
            force,
        } => commands::seed::catalogue(&email, &password, force).await?,
        Commands::Admin { action } => match action {
            AdminAction::Signup { email, password } => {
                commands::admin::signup(&email, &password).await?;
            }
        },
    }
    Ok(())
}
