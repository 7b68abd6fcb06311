//! Outbound delivery tracking.
//!
//! Every submitted command is tracked here until its acknowledgement has been
//! merged into the local cache:
//!
//! ```text
//! online:   Pending -> Delivered -> Cached
//! offline:  Queued -> Resent -> Pending -> Delivered -> Cached
//! ```
//!
//! Commands are kept in submit order so that acknowledgements for one peer
//! are matched first-in first-out.

use hangouts_types::PendingCommand;
use std::collections::VecDeque;
use thiserror::Error;

/// Error type for outbox operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutboxError {
    /// No tracked command has this timestamp.
    #[error("no tracked command with timestamp {timestamp}")]
    Unknown {
        /// Timestamp of the command.
        timestamp: u64,
    },
    /// The command is not in a state that allows this step.
    #[error("command {timestamp} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        /// Timestamp of the command.
        timestamp: u64,
        /// Current status.
        from: DeliveryStatus,
        /// Requested status.
        to: DeliveryStatus,
    },
}

/// Delivery lifecycle of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// Handed to the directory, waiting for acknowledgement.
    Pending,
    /// Acknowledged, not yet merged into the cache.
    Delivered,
    /// Acknowledgement merged; the command is done.
    Cached,
    /// Issued while offline, sitting in the offline bucket.
    Queued,
    /// Being re-sent from the offline bucket.
    Resent,
}

/// Where a freshly submitted command goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Send to the directory now.
    Online,
    /// Park in the offline bucket until reconnect.
    Offline,
}

#[derive(Debug, Clone)]
struct Tracked {
    command: PendingCommand,
    status: DeliveryStatus,
}

/// Tracks outbound commands from submit to cache.
#[derive(Debug, Default)]
pub struct Outbox {
    entries: VecDeque<Tracked>,
}

impl Outbox {
    /// Create an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new command and decide its route.
    pub fn submit(&mut self, command: PendingCommand, online: bool) -> Route {
        let (status, route) = if online {
            (DeliveryStatus::Pending, Route::Online)
        } else {
            (DeliveryStatus::Queued, Route::Offline)
        };
        self.entries.push_back(Tracked { command, status });
        route
    }

    /// Track commands restored from the offline bucket at startup.
    pub fn restore(&mut self, commands: Vec<PendingCommand>) {
        for command in commands {
            if self.position(command.timestamp).is_none() {
                self.entries.push_back(Tracked {
                    command,
                    status: DeliveryStatus::Queued,
                });
            }
        }
    }

    /// Queued commands in submit order.
    pub fn queued(&self) -> Vec<PendingCommand> {
        self.entries
            .iter()
            .filter(|t| t.status == DeliveryStatus::Queued)
            .map(|t| t.command.clone())
            .collect()
    }

    /// Check if `username` has a command still waiting in the offline queue.
    pub fn has_queued(&self, username: &str) -> bool {
        self.entries.iter().any(|t| {
            t.command.username == username
                && matches!(t.status, DeliveryStatus::Queued | DeliveryStatus::Resent)
        })
    }

    /// Mark a queued command as being re-sent.
    pub fn resending(&mut self, timestamp: u64) -> Result<(), OutboxError> {
        self.step(timestamp, DeliveryStatus::Queued, DeliveryStatus::Resent)
    }

    /// The directory accepted a re-sent command; it now waits like any
    /// online command.
    pub fn resent(&mut self, timestamp: u64) -> Result<(), OutboxError> {
        self.step(timestamp, DeliveryStatus::Resent, DeliveryStatus::Pending)
    }

    /// The directory rejected a re-sent command; park it again.
    pub fn resend_failed(&mut self, timestamp: u64) -> Result<(), OutboxError> {
        self.step(timestamp, DeliveryStatus::Resent, DeliveryStatus::Queued)
    }

    /// Match an acknowledgement to the oldest pending command for a peer.
    pub fn acknowledge(&mut self, username: &str) -> Option<PendingCommand> {
        let tracked = self.entries.iter_mut().find(|t| {
            t.status == DeliveryStatus::Pending && t.command.username == username
        })?;
        tracked.status = DeliveryStatus::Delivered;
        Some(tracked.command.clone())
    }

    /// Match an offline acknowledgement by the command's timestamp.
    ///
    /// Accepts the command in any status short of delivered.
    pub fn acknowledge_offline(&mut self, timestamp: u64) -> Option<PendingCommand> {
        let tracked = self.entries.iter_mut().find(|t| {
            t.command.timestamp == timestamp
                && matches!(
                    t.status,
                    DeliveryStatus::Queued | DeliveryStatus::Resent | DeliveryStatus::Pending
                )
        })?;
        tracked.status = DeliveryStatus::Delivered;
        Some(tracked.command.clone())
    }

    /// The directory refused an online command; stop tracking it so it cannot
    /// swallow a later acknowledgement for the same peer.
    pub fn reject(&mut self, timestamp: u64) -> Result<PendingCommand, OutboxError> {
        self.step(timestamp, DeliveryStatus::Pending, DeliveryStatus::Pending)?;
        let index = self
            .position(timestamp)
            .ok_or(OutboxError::Unknown { timestamp })?;
        self.entries
            .remove(index)
            .map(|t| t.command)
            .ok_or(OutboxError::Unknown { timestamp })
    }

    /// The acknowledgement was merged into the cache; stop tracking.
    pub fn cached(&mut self, timestamp: u64) -> Result<(), OutboxError> {
        self.step(timestamp, DeliveryStatus::Delivered, DeliveryStatus::Cached)?;
        if let Some(index) = self.position(timestamp) {
            self.entries.remove(index);
        }
        Ok(())
    }

    /// Current status of a tracked command.
    pub fn status(&self, timestamp: u64) -> Option<DeliveryStatus> {
        self.position(timestamp).map(|i| self.entries[i].status)
    }

    /// Number of tracked commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of commands waiting in the offline bucket.
    pub fn queued_count(&self) -> usize {
        self.count(DeliveryStatus::Queued)
    }

    /// Number of commands waiting for acknowledgement.
    pub fn pending_count(&self) -> usize {
        self.count(DeliveryStatus::Pending)
    }

    /// Forget everything (sign-out).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn count(&self, status: DeliveryStatus) -> usize {
        self.entries.iter().filter(|t| t.status == status).count()
    }

    fn position(&self, timestamp: u64) -> Option<usize> {
        self.entries
            .iter()
            .position(|t| t.command.timestamp == timestamp)
    }

    fn step(
        &mut self,
        timestamp: u64,
        from: DeliveryStatus,
        to: DeliveryStatus,
    ) -> Result<(), OutboxError> {
        let index = self
            .position(timestamp)
            .ok_or(OutboxError::Unknown { timestamp })?;
        let tracked = &mut self.entries[index];
        if tracked.status != from {
            return Err(OutboxError::InvalidTransition {
                timestamp,
                from: tracked.status,
                to,
            });
        }
        tracked.status = to;
        Ok(())
    }
}
