//! Apply an inbound event payload, as if a peer had acted.

use anyhow::{Context, Result};
use std::path::Path;

use super::{describe, finish, open_session, RunContext};

/// Run the receive command with an inline payload or a file.
pub async fn run(ctx: &RunContext<'_>, payload: Option<&str>, file: Option<&Path>) -> Result<()> {
    let payload = match (payload, file) {
        (Some(payload), _) => payload.to_string(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("Must specify a payload or --file"),
    };

    let mut session = open_session(ctx).await?;
    session.handle_payload(&payload).await?;
    finish(&mut session).await?;

    for hangout in session.view().unread_hangouts() {
        println!("unread: {}", describe(hangout));
    }
    Ok(())
}
