//! Forgot password command - request a reset link

use crate::style::*;
use anyhow::Result;
use bounty_session::{SessionContext, SessionError};
use dialoguer::{theme::ColorfulTheme, Input};

pub async fn run(context: &SessionContext, email: Option<String>) -> Result<()> {
    print_header("Reset Password");

    let session = context.session()?;
    let email = match email {
        Some(email) => email,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt("  Email")
            .allow_empty(true)
            .interact_text()?,
    };

    let pb = spinner("Sending reset link...");
    let result = session.request_password_reset(&email).await;
    pb.finish_and_clear();

    match result {
        Ok(()) => {
            print_success("Check your email");
            println!();
            println!(
                "We've sent a password reset link to {}.",
                style_bold(&email)
            );
            println!("{}", style_dim("Reset links expire after 24 hours."));
            Ok(())
        }
        Err(SessionError::InvalidEmail) => {
            print_error("Please enter a valid email address");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
