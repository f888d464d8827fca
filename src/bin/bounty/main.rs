//! Bounty Session CLI
//!
//! Terminal front end for signing in to the bug bounty marketplace.

mod commands;
mod style;
mod wizard;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use bounty_session::{Config, MockDirectory, SessionContext};
use clap::{Parser, Subcommand};
use style::*;

const BANNER: &str = r#"
  ██████╗  ██████╗ ██╗   ██╗███╗   ██╗████████╗██╗   ██╗
  ██╔══██╗██╔═══██╗██║   ██║████╗  ██║╚══██╔══╝╚██╗ ██╔╝
  ██████╔╝██║   ██║██║   ██║██╔██╗ ██║   ██║    ╚████╔╝
  ██╔══██╗██║   ██║██║   ██║██║╚██╗██║   ██║     ╚██╔╝
  ██████╔╝╚██████╔╝╚██████╔╝██║ ╚████║   ██║      ██║
  ╚═════╝  ╚═════╝  ╚═════╝ ╚═╝  ╚═══╝   ╚═╝      ╚═╝
"#;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "bounty")]
#[command(author = "CortexLM")]
#[command(version)]
#[command(about = "Bounty Session - Sign in to the bug bounty marketplace", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to config.toml
    #[arg(short, long, env = "BOUNTY_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show who is signed in (default)
    #[command(visible_aliases = ["st", "whoami"])]
    Status,

    /// Sign in with email and password
    #[command(visible_alias = "l")]
    Login {
        /// Account email
        #[arg(short, long)]
        email: Option<String>,

        /// Password (prompted for when omitted)
        #[arg(short, long, env = "BOUNTY_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Interactive sign-up wizard
    #[command(visible_aliases = ["register", "w"])]
    Signup,

    /// Sign out and forget the stored session
    Logout,

    /// Request a password reset link
    #[command(visible_alias = "forgot")]
    ForgotPassword {
        /// Account email
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Show session configuration
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    if let Err(e) = run(cli).await {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let context = SessionContext::provide(
        config.open_store()?,
        Arc::new(MockDirectory::new()),
        config.session_settings(),
    )?;

    // Default to status if no command specified
    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => commands::status::run(&context),
        Commands::Login { email, password } => {
            commands::login::run(&context, email, password).await
        }
        Commands::Signup => wizard::run_signup_wizard(&context).await,
        Commands::Logout => commands::logout::run(&context),
        Commands::ForgotPassword { email } => {
            commands::forgot_password::run(&context, email).await
        }
        Commands::Config => commands::config::run(&config),
    }
}

pub fn print_banner() {
    println!("{}", style_cyan(BANNER));
    println!(
        "  {} {}",
        style_dim("Bounty Session"),
        style_dim(&format!("v{}", VERSION))
    );
    println!();
}
