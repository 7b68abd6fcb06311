//! Create the local profile.

use anyhow::Result;
use std::path::Path;

use crate::config::{Profile, PROFILE_FILE};

/// Run the init command.
pub async fn run(data_dir: &Path, username: &str, email: &str) -> Result<()> {
    if Profile::exists(data_dir) {
        anyhow::bail!(
            "Profile already initialized. Delete {} to reinitialize.",
            data_dir.join(PROFILE_FILE).display()
        );
    }
    if username.is_empty() {
        anyhow::bail!("Username must not be empty");
    }

    let profile = Profile::new(username, email);
    profile.save(data_dir).await?;

    println!("Profile initialized!");
    println!();
    println!("  User:     {} <{}>", profile.username, profile.email);
    println!("  Database: {}", profile.database_path(data_dir).display());
    println!();
    println!("Next steps:");
    println!("  1. Invite someone:  hangouts send bob INVITE --to-email bob@example.com");
    println!("  2. Work offline:    hangouts --offline message bob \"see you later\"");
    println!("  3. Reconnect:       hangouts flush");

    Ok(())
}
