//! MYBN CLI - Sign in and browse the business directory from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Request and verify an OTP
//! mybn otp send 9876543210
//! mybn otp verify 9876543210 123456
//!
//! # Inspect or end the stored session
//! mybn session status
//! mybn logout
//!
//! # Browse the catalog
//! mybn businesses --pages 2
//! mybn businesses --query bakery --category Food
//! mybn business 42
//! mybn categories
//! mybn featured
//! ```
//!
//! Configuration is read from `MYBN_*` environment variables (or `.env`).
//! The session is kept in the file at `MYBN_STORAGE_PATH`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "mybn")]
#[command(author, version, about = "MYBN business directory client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with a one-time password
    Otp {
        #[command(subcommand)]
        action: OtpAction,
    },
    /// Inspect the stored session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Sign out and delete the stored session
    Logout,
    /// List businesses, optionally filtered
    Businesses {
        /// First page to load
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Search query
        #[arg(short, long)]
        query: Option<String>,

        /// Category name
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one business
    Business {
        /// Business ID
        id: i64,
    },
    /// List categories
    Categories,
    /// List featured businesses
    Featured,
}

#[derive(Subcommand)]
enum OtpAction {
    /// Send a code to a mobile number
    Send {
        /// 10-digit mobile number
        mobile: String,
    },
    /// Verify a code and store the session
    Verify {
        /// 10-digit mobile number
        mobile: String,

        /// 6-digit code
        code: String,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Show who is signed in
    Status,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mybn=info,mybn_directory=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Command failed");
        tracing::error!("{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> mybn_directory::Result<()> {
    let ctx = commands::Context::from_env()?;

    match cli.command {
        Commands::Otp { action } => match action {
            OtpAction::Send { mobile } => commands::otp::send(&ctx, &mobile).await?,
            OtpAction::Verify { mobile, code } => {
                commands::otp::verify(&ctx, &mobile, &code).await?;
            }
        },
        Commands::Session { action } => match action {
            SessionAction::Status => commands::session::status(&ctx).await,
        },
        Commands::Logout => commands::session::logout(&ctx).await,
        Commands::Businesses {
            page,
            pages,
            query,
            category,
        } => {
            commands::catalog::businesses(&ctx, page, pages, query, category).await?;
        }
        Commands::Business { id } => commands::catalog::business(&ctx, id).await?,
        Commands::Categories => commands::catalog::categories(&ctx).await?,
        Commands::Featured => commands::catalog::featured(&ctx).await?,
    }
    Ok(())
}
