//! Status command - show the signed-in account

use crate::style::*;
use anyhow::Result;
use bounty_session::{Role, SessionContext, SessionError};

pub fn run(context: &SessionContext) -> Result<()> {
    print_header("Session Status");

    let session = context.session()?;
    let identity = match session.require_identity() {
        Ok(identity) => identity,
        Err(SessionError::NotSignedIn) => {
            print_warning("Not signed in.");
            println!();
            println!("To sign in, run:");
            println!("  bounty login");
            println!();
            println!("New here? Create an account with:");
            println!("  bounty signup");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    print_success(&format!("Signed in as {}", style_cyan(&identity.username)));
    println!();
    println!("Email:            {}", mask_email(&identity.email));
    println!("Account:          {}", style_bold(identity.role().as_str()));

    match identity.role() {
        Role::Hacker => {
            println!("Reputation:       {}", style_green(&identity.standing()));
            println!(
                "Total bounties:   ${}",
                identity.total_bounties.unwrap_or(0)
            );
        }
        Role::Company => {
            println!("Company:          {}", style_cyan(&identity.standing()));
        }
    }

    if let Some(bio) = &identity.bio {
        println!("Bio:              {}", style_dim(bio));
    }

    if let Some(links) = &identity.social_links {
        let handles = [
            ("twitter", &links.twitter),
            ("github", &links.github),
            ("linkedin", &links.linkedin),
        ];
        for (provider, handle) in handles
            .into_iter()
            .filter_map(|(provider, handle)| handle.as_ref().map(|h| (provider, h)))
        {
            println!("{:<18}{}", format!("{}:", provider), handle);
        }
    }

    Ok(())
}
