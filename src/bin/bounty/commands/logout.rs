//! Logout command - end the session

use crate::style::*;
use anyhow::Result;
use bounty_session::SessionContext;

pub fn run(context: &SessionContext) -> Result<()> {
    let session = context.session()?;

    let previous = session.current();
    session.end_session()?;

    match previous {
        Some(identity) => print_success(&format!("Signed out {}", mask_email(&identity.email))),
        None => print_info("No active session."),
    }

    Ok(())
}
