//! # hangouts
//!
//! CLI tool for driving a hangouts session against a local SQLite database.
//!
//! The remote directory is a loopback mock: commands sent while online are
//! acknowledged in the same run, and `--offline` parks them until `flush`.
//!
//! ## Commands
//!
//! - `init`: Create the local profile
//! - `send`: Issue a relationship command (INVITE, ACCEPT, ...) to a peer
//! - `message`: Send a message to a peer
//! - `list`: List hangouts, optionally filtered
//! - `open`: Show a conversation and mark it read
//! - `unread`: List unread badges, optionally dismissing one
//! - `receive`: Apply an inbound event payload
//! - `flush`: Send everything queued offline
//! - `status`: Show profile and session status
//!
//! ## Example
//!
//! ```bash
//! hangouts init --username alice --email alice@example.com
//! hangouts send bob INVITE --to-email bob@example.com
//! hangouts --offline message bob "see you later"
//! hangouts flush
//! hangouts open bob
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{inbox, init, receive, send, status, RunContext};
use config::Profile;

/// CLI tool for driving a hangouts session.
#[derive(Parser, Debug)]
#[command(name = "hangouts")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the profile and database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Act as this user instead of the profile's
    #[arg(long, global = true)]
    user: Option<String>,

    /// Override the profile's email
    #[arg(long, global = true)]
    user_email: Option<String>,

    /// Keep the channel closed; commands are queued until `flush`
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the local profile
    Init {
        /// Local username
        #[arg(long, short)]
        username: String,

        /// Local email
        #[arg(long, short, default_value = "")]
        email: String,
    },

    /// Issue a relationship command to a peer
    Send {
        /// Peer username
        peer: String,

        /// Command verb: INVITE, ACCEPT, DECLINE, BLOCK, UNBLOCK or MESSAGE
        verb: String,

        /// Peer email (for a first contact)
        #[arg(long = "to-email")]
        to_email: Option<String>,

        /// Message text carried by a MESSAGE
        #[arg(long, short)]
        text: Option<String>,
    },

    /// Send a message to a peer
    Message {
        /// Peer username
        peer: String,

        /// Message text
        text: String,
    },

    /// List hangouts
    List {
        /// Only show usernames containing this text
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Show a conversation and mark it read
    Open {
        /// Peer username
        peer: String,
    },

    /// List unread badges
    Unread {
        /// Dismiss this peer's badge without opening the conversation
        #[arg(long)]
        dismiss: Option<String>,
    },

    /// Apply an inbound event payload (JSON)
    Receive {
        /// Event payload (or use --file)
        payload: Option<String>,

        /// File holding the payload
        #[arg(long, short, conflicts_with = "payload")]
        file: Option<PathBuf>,
    },

    /// Send everything queued offline
    Flush,

    /// Show profile and session status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    let profile = if Profile::exists(&data_dir) {
        Some(
            Profile::load(&data_dir)
                .await?
                .with_overrides(cli.user.as_deref(), cli.user_email.as_deref()),
        )
    } else {
        None
    };
    init_logging(profile.as_ref());
    tracing::debug!("data dir: {}", data_dir.display());

    match cli.command {
        Commands::Init { username, email } => {
            init::run(&data_dir, &username, &email).await?;
        }
        Commands::Status => {
            status::run(&data_dir, profile.as_ref()).await?;
        }
        command => {
            let profile = profile
                .context("Profile not initialized. Run 'hangouts init' first.")?;
            let ctx = RunContext {
                data_dir: &data_dir,
                profile: &profile,
                offline: cli.offline,
            };
            run_session_command(&ctx, command).await?;
        }
    }

    Ok(())
}

async fn run_session_command(ctx: &RunContext<'_>, command: Commands) -> Result<()> {
    match command {
        Commands::Send {
            peer,
            verb,
            to_email,
            text,
        } => send::run(ctx, &peer, &verb, to_email.as_deref(), text.as_deref()).await,
        Commands::Message { peer, text } => {
            send::run(ctx, &peer, "MESSAGE", None, Some(&text)).await
        }
        Commands::List { search } => inbox::list(ctx, search.as_deref()).await,
        Commands::Open { peer } => inbox::open(ctx, &peer).await,
        Commands::Unread { dismiss } => inbox::unread(ctx, dismiss.as_deref()).await,
        Commands::Receive { payload, file } => {
            receive::run(ctx, payload.as_deref(), file.as_deref()).await
        }
        Commands::Flush => status::flush(ctx).await,
        // Handled before a session is opened.
        Commands::Init { .. } | Commands::Status => Ok(()),
    }
}

/// Install the log subscriber: `RUST_LOG` first, then the profile's filter,
/// then `info`.
fn init_logging(profile: Option<&Profile>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let fallback = profile
            .and_then(|p| p.log_filter.as_deref())
            .unwrap_or("info");
        EnvFilter::new(fallback)
    });
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

/// Get the default data directory for hangouts.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "hangouts", "hangouts")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
