//! CLI command implementations.

pub mod inbox;
pub mod init;
pub mod receive;
pub mod send;
pub mod status;

use anyhow::{Context, Result};
use hangouts_client::{MockDirectory, Session, SessionConfig, SqliteStore};
use hangouts_types::{Hangout, ReadyState};
use std::path::Path;

use crate::config::Profile;

/// Session type every command runs against.
pub type CliSession = Session<MockDirectory, SqliteStore>;

/// Options shared by every session-backed command.
#[derive(Debug, Clone)]
pub struct RunContext<'a> {
    /// Data directory holding the profile and database.
    pub data_dir: &'a Path,
    /// Loaded profile, after command-line overrides.
    pub profile: &'a Profile,
    /// Keep the channel closed so commands are queued.
    pub offline: bool,
}

/// Open a session over the profile's database.
///
/// The directory is a loopback mock, so every accepted command is
/// acknowledged within the same run.
pub async fn open_session(ctx: &RunContext<'_>) -> Result<CliSession> {
    let path = ctx.profile.database_path(ctx.data_dir);
    let store = SqliteStore::new(&path)
        .await
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    let config = SessionConfig::new(&ctx.profile.username, &ctx.profile.email);
    let mut session = Session::open(config, MockDirectory::loopback(), store).await?;

    if !ctx.offline {
        session.set_ready_state(ReadyState::Open).await?;
        session.drain_events().await?;
    }
    Ok(session)
}

/// Apply pending events and report anything that landed in the error slot.
pub async fn finish(session: &mut CliSession) -> Result<()> {
    session.drain_events().await?;
    if let Some(error) = session.view().error() {
        eprintln!("warning: {}", error);
    }
    Ok(())
}

/// One-line summary of a hangout.
pub fn describe(hangout: &Hangout) -> String {
    let mut flags = Vec::new();
    if !hangout.delivered {
        flags.push("pending");
    }
    if !hangout.read {
        flags.push("unread");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" ({})", flags.join(", "))
    };
    format!("{:<16} {:<10}{}", hangout.username, hangout.state.as_str(), flags)
}


#[cfg(test)]
mod tests {
    use super::*;
    use hangouts_types::{HangoutState, Peer};

    #[test]
    fn describe_flags() {
        let mut hangout = Hangout::new(&Peer::new("bob", ""), HangoutState::Invited, 1);
        assert!(describe(&hangout).ends_with("(pending, unread)"));

        hangout.delivered = true;
        hangout.read = true;
        let line = describe(&hangout);
        assert!(line.starts_with("bob"));
        assert!(line.contains("INVITED"));
        assert!(!line.contains('('));
    }
}
