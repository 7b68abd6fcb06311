//! Show session status and flush the offline queue.

use anyhow::Result;
use std::path::Path;

use super::{finish, open_session, RunContext};
use crate::config::Profile;

/// Run the status command.
pub async fn run(data_dir: &Path, profile: Option<&Profile>) -> Result<()> {
    println!("=== hangouts status ===");
    println!();

    let Some(profile) = profile else {
        println!("Profile: NOT INITIALIZED");
        println!();
        println!("Run 'hangouts init --username <name> --email <email>' to initialize.");
        return Ok(());
    };

    println!("Profile:");
    println!("  User:     {} <{}>", profile.username, profile.email);
    println!("  Database: {}", profile.database_path(data_dir).display());
    println!();

    // Stay offline so status never sends anything.
    let ctx = RunContext {
        data_dir,
        profile,
        offline: true,
    };
    let session = open_session(&ctx).await?;
    let view = session.view();
    println!("Session:");
    println!("  Hangouts: {}", view.hangouts().len());
    println!("  Unread:   {}", view.unread_hangouts().len());
    println!("  Queued:   {}", session.outbox().queued_count());

    Ok(())
}

/// Run the flush command: open the channel and send everything queued.
///
/// Flushing always goes online, whatever `--offline` says.
pub async fn flush(ctx: &RunContext<'_>) -> Result<()> {
    let offline = RunContext {
        offline: true,
        ..ctx.clone()
    };
    let before = open_session(&offline).await?.outbox().queued_count();

    let online = RunContext {
        offline: false,
        ..ctx.clone()
    };
    let mut session = open_session(&online).await?;
    finish(&mut session).await?;
    let after = session.outbox().queued_count();

    println!(
        "Flushed {} of {} queued commands.",
        before.saturating_sub(after),
        before
    );
    Ok(())
}
