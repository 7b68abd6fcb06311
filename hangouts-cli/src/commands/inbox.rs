//! Browse hangouts, conversations and unread badges.

use anyhow::Result;
use hangouts_types::{Message, MessageKind};

use super::{describe, finish, open_session, RunContext};

/// Run the list command.
pub async fn list(ctx: &RunContext<'_>, search: Option<&str>) -> Result<()> {
    let mut session = open_session(ctx).await?;
    if let Some(search) = search {
        session.on_search(search);
    }
    finish(&mut session).await?;

    let hangouts = session.view().filtered_hangouts();
    if hangouts.is_empty() {
        println!("No hangouts.");
        return Ok(());
    }
    for hangout in &hangouts {
        println!("{}", describe(hangout));
    }
    Ok(())
}

/// Run the open command: show a conversation and mark it read.
pub async fn open(ctx: &RunContext<'_>, peer: &str) -> Result<()> {
    let mut session = open_session(ctx).await?;
    session.on_select_hangout(peer).await?;
    finish(&mut session).await?;

    if let Some(hangout) = session.view().hangout() {
        println!("{}", describe(hangout));
        println!();
    }
    let messages = session.view().messages();
    if messages.is_empty() {
        println!("No messages.");
    }
    for message in messages {
        println!("{}", render(message));
    }
    Ok(())
}

/// Run the unread command, optionally dismissing one peer's badge.
pub async fn unread(ctx: &RunContext<'_>, dismiss: Option<&str>) -> Result<()> {
    let mut session = open_session(ctx).await?;
    if let Some(peer) = dismiss {
        session.on_remove_unread(peer).await?;
    }
    finish(&mut session).await?;

    let unread = session.view().unread_hangouts();
    if unread.is_empty() {
        println!("Nothing unread.");
        return Ok(());
    }
    for hangout in unread {
        println!("{}", describe(hangout));
    }
    Ok(())
}

fn render(message: &Message) -> String {
    match message.kind {
        MessageKind::Text => {
            let status = if message.delivered { "" } else { " [pending]" };
            format!("<{}> {}{}", message.username, message.text, status)
        }
        MessageKind::Blocker | MessageKind::Blocked => format!("-- {} --", message.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::send;
    use crate::commands::testing::{context, profile_dir};

    #[test]
    fn render_local_notice() {
        let notice = Message::blocked_notice("alice", 1);
        assert_eq!(render(&notice), "-- you blocked this user --");

        let text = Message::new("hi", "bob", 2);
        assert_eq!(render(&text), "<bob> hi [pending]");
    }

    #[tokio::test]
    async fn list_and_open_after_send() {
        let (dir, profile) = profile_dir();
        let ctx = context(&dir, &profile, false);
        send::run(&ctx, "bob", "MESSAGE", Some("bob@x.io"), Some("hello"))
            .await
            .unwrap();

        list(&ctx, None).await.unwrap();
        list(&ctx, Some("zzz")).await.unwrap();
        open(&ctx, "bob").await.unwrap();
    }

    #[tokio::test]
    async fn open_unknown_peer_fails() {
        let (dir, profile) = profile_dir();
        let ctx = context(&dir, &profile, false);
        assert!(open(&ctx, "ghost").await.is_err());
    }

    #[tokio::test]
    async fn unread_with_nothing_pending() {
        let (dir, profile) = profile_dir();
        let ctx = context(&dir, &profile, true);
        unread(&ctx, None).await.unwrap();
        unread(&ctx, Some("carol")).await.unwrap();
    }
}
