//! Sign-up Wizard - Interactive account creation
//!
//! Walks the user through choosing an account type and filling in the
//! sign-up form, then signs the new account in.

use anyhow::Result;
use bounty_session::directory::looks_like_email;
use bounty_session::{Role, SessionContext, SignupRequest};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};

use crate::style::{mask_email, spinner};

pub async fn run_signup_wizard(context: &SessionContext) -> Result<()> {
    crate::print_banner();
    println!("{}", style("  Interactive Sign-up Wizard").cyan().bold());
    println!(
        "  {}",
        style("Join thousands of security researchers and companies").dim()
    );
    println!();

    let session = context.session()?;

    // Step 1: Account type
    println!("  {}", style("Step 1: Choose Account Type").bold());
    println!();

    let choices = [
        "Hacker  - find vulnerabilities and earn bounties",
        "Company - run a bug bounty program",
    ];
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("  I am a")
        .items(&choices)
        .default(0)
        .interact()?;
    let role = if selection == 0 {
        Role::Hacker
    } else {
        Role::Company
    };

    println!("  {} Account: {}", style("✓").green(), style(role).cyan());

    // Step 2: Account details
    println!();
    println!("  {}", style("Step 2: Account Details").bold());
    println!();

    let username: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(match role {
            Role::Hacker => "  Username",
            Role::Company => "  Contact name",
        })
        .validate_with(|input: &String| validate_required(input))
        .interact_text()?;

    let company_name = match role {
        Role::Company => Some(
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt("  Company name")
                .validate_with(|input: &String| validate_required(input))
                .interact_text()?,
        ),
        Role::Hacker => None,
    };

    let email: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("  Email")
        .validate_with(|input: &String| validate_email(input))
        .interact_text()?;

    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("  Password")
        .with_confirmation("  Confirm password", "Passwords do not match")
        .interact()?;

    // Step 3: Review and confirm
    println!();
    println!("  {}", style("Review Account").bold());
    println!("  {}", style("─".repeat(40)).dim());
    println!();
    println!("  Type:      {}", role);
    println!("  Username:  {}", style(&username).cyan());
    if let Some(company) = &company_name {
        println!("  Company:   {}", style(company).cyan());
    }
    println!("  Email:     {}", mask_email(&email));
    println!();

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("  Create this account?")
        .default(true)
        .interact()?;

    if !confirmed {
        println!();
        println!("  {} Sign-up cancelled", style("✗").red());
        return Ok(());
    }

    // Step 4: Submit
    println!();
    let request = SignupRequest {
        username,
        email,
        role,
        company_name,
        password,
    };

    let pb = spinner("Creating account...");
    let result = session.register(&request).await;
    pb.finish_and_clear();

    match result {
        Ok(true) => {
            let identity = session.require_identity()?;
            println!("  {}", style("═".repeat(50)).dim());
            println!();
            println!(
                "  {} Welcome aboard, {}!",
                style("✓").green().bold(),
                style(&identity.username).cyan()
            );
            println!();
            println!("  {}", style("Next steps:").bold());
            match identity.role() {
                Role::Hacker => {
                    println!("    1. Browse live programs");
                    println!("    2. Submit your first report");
                    println!("    3. Climb the leaderboard!");
                }
                Role::Company => {
                    println!("    1. Launch your first program");
                    println!("    2. Set reward ranges and scope");
                    println!("    3. Review incoming reports");
                }
            }
            println!();
            println!("  Check your session:");
            println!("    {}", style("bounty status").yellow());
            println!();
        }
        Ok(false) => {
            println!();
            println!(
                "  {} Failed to create account. Please try again.",
                style("✗").red()
            );
        }
        Err(e) => {
            println!();
            println!("  {} Error: {}", style("✗").red(), e);
        }
    }

    Ok(())
}

fn validate_required(input: &str) -> Result<(), &'static str> {
    if input.trim().is_empty() {
        return Err("This field is required");
    }
    Ok(())
}

fn validate_email(input: &str) -> Result<(), &'static str> {
    validate_required(input)?;
    if !looks_like_email(input) {
        return Err("Please enter a valid email address");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("x").is_ok());
        assert!(validate_required("").is_err());
        assert!(validate_required("   ").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("x@x.com").is_ok());
        assert!(validate_email("nobody").is_err());
        assert!(validate_email("").is_err());
    }
}
