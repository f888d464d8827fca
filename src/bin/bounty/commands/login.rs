//! Login command - sign in with email and password

use crate::style::*;
use anyhow::Result;
use bounty_session::SessionContext;
use dialoguer::{theme::ColorfulTheme, Input, Password};

pub async fn run(
    context: &SessionContext,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    print_header("Sign In");

    let session = context.session()?;
    if let Some(current) = session.current() {
        print_info(&format!(
            "Already signed in as {}; signing in again replaces that session.",
            current.username
        ));
    }

    let email = match email {
        Some(email) => email,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt("  Email")
            .interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("  Password")
            .interact()?,
    };

    let pb = spinner("Signing in...");
    let result = session.authenticate(&email, &password).await;
    pb.finish_and_clear();

    if result? {
        let identity = session.require_identity()?;
        print_success(&format!(
            "Welcome back, {} ({})",
            style_cyan(&identity.username),
            identity.standing()
        ));
    } else {
        print_error("Invalid credentials.");
        println!();
        println!("Demo accounts:");
        println!("  Hacker:  hacker@example.com / password123");
        println!("  Company: security@techcorp.com / password123");
    }

    Ok(())
}
