//! Config command - show session configuration

use crate::style::*;
use anyhow::Result;
use bounty_session::config::StorageBackend;
use bounty_session::Config;

pub fn run(config: &Config) -> Result<()> {
    print_header("Session Configuration");

    println!();
    println!("Storage key:      {}", style_cyan(&config.session.storage_key));
    println!("Sign-in latency:  {} ms", config.session.latency_ms);
    println!("Reset latency:    {} ms", config.session.reset_latency_ms);

    println!();
    println!("{}", style_bold("Session Store:"));
    match config.storage.backend {
        StorageBackend::Sqlite => {
            println!("  Backend:  sqlite");
            println!("  Path:     {}", config.store_path().display());
        }
        StorageBackend::Memory => {
            println!("  Backend:  memory");
            println!("  {}", style_dim("Sessions are forgotten when the command exits"));
        }
    }

    println!();
    println!("{}", style_bold("Demo Accounts:"));
    println!("  - hacker@example.com ({})", style_green("hacker"));
    println!("  - security@techcorp.com ({})", style_green("company"));
    println!("  - Password: password123");

    Ok(())
}
