//! Issue relationship commands and messages.

use anyhow::Result;

use super::{describe, finish, open_session, CliSession, RunContext};

/// Run the send command: issue `verb` to `peer`.
///
/// `text` becomes the compose draft, which a `MESSAGE` carries.
pub async fn run(
    ctx: &RunContext<'_>,
    peer: &str,
    verb: &str,
    email: Option<&str>,
    text: Option<&str>,
) -> Result<()> {
    let mut session = open_session(ctx).await?;
    issue(&mut session, peer, verb, email, text).await?;
    finish(&mut session).await?;

    match session.view().hangout() {
        Some(hangout) => println!("{}", describe(hangout)),
        None => println!("{}: nothing recorded", peer),
    }
    if ctx.offline {
        println!(
            "Queued offline ({} waiting). Run 'hangouts flush' to send.",
            session.outbox().queued_count()
        );
    }
    Ok(())
}

/// Focus `peer` and issue `verb`.
pub async fn issue(
    session: &mut CliSession,
    peer: &str,
    verb: &str,
    email: Option<&str>,
    text: Option<&str>,
) -> Result<()> {
    if session.view().find_hangout(peer).is_some() && email.is_none() {
        session.on_select_hangout(peer).await?;
    } else {
        session
            .on_select_user(peer, email.unwrap_or_default())
            .await?;
    }
    if let Some(text) = text {
        session.on_message_text(text);
    }
    session.on_hangout(peer, verb).await?;
    Ok(())
}
