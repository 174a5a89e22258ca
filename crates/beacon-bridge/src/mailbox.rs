//! Per-instance command mailbox.
//!
//! Buffering until `drain_and_replay`, live afterwards, closed once its
//! tracker is gone. The lock is never held while a command executes, so a
//! handler may push new commands into its own mailbox while the buffer is
//! being replayed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use beacon_core::errors::{BeaconResult, BridgeError};
use tracing::debug;

use crate::command::{Command, CommandHandler};

enum MailboxState {
    Buffering(VecDeque<Command>),
    Live(Arc<dyn CommandHandler>),
    Closed,
}

/// Commands addressed to one tracker instance.
pub struct Mailbox {
    site_id: String,
    state: Mutex<MailboxState>,
}

impl Mailbox {
    pub fn new(site_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            state: Mutex::new(MailboxState::Buffering(VecDeque::new())),
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// Buffer the command, or run it right away once live.
    ///
    /// A closed mailbox hands the command back.
    pub fn enqueue(&self, command: Command) -> Result<(), Command> {
        let handler = {
            let mut state = self.lock();
            match &mut *state {
                MailboxState::Buffering(buffer) => {
                    buffer.push_back(command);
                    return Ok(());
                }
                MailboxState::Live(handler) => Arc::clone(handler),
                MailboxState::Closed => return Err(command),
            }
        };
        handler.handle(command);
        Ok(())
    }

    /// Replay every buffered command in arrival order, then go live.
    ///
    /// Commands enqueued during the replay are appended to the buffer and
    /// replayed in the same pass, so none is lost, duplicated or reordered.
    /// Returns the number of commands replayed.
    pub fn drain_and_replay(&self, handler: Arc<dyn CommandHandler>) -> BeaconResult<usize> {
        let mut replayed = 0;
        loop {
            let batch = {
                let mut state = self.lock();
                match &mut *state {
                    MailboxState::Closed => {
                        return Err(BridgeError::Closed {
                            site_id: self.site_id.clone(),
                        }
                        .into());
                    }
                    MailboxState::Live(_) => {
                        if replayed == 0 {
                            return Err(BridgeError::AlreadyReplayed {
                                site_id: self.site_id.clone(),
                            }
                            .into());
                        }
                        // Only reachable if another caller raced us to Live.
                        return Ok(replayed);
                    }
                    MailboxState::Buffering(buffer) if buffer.is_empty() => {
                        *state = MailboxState::Live(Arc::clone(&handler));
                        debug!(site_id = %self.site_id, replayed, "bridge: mailbox live");
                        return Ok(replayed);
                    }
                    MailboxState::Buffering(buffer) => std::mem::take(buffer),
                }
            };
            for command in batch {
                handler.handle(command);
                replayed += 1;
            }
        }
    }

    /// Stop accepting commands. Returns whatever was still buffered, in
    /// arrival order; empty if the mailbox had gone live.
    pub fn close(&self) -> Vec<Command> {
        let previous = std::mem::replace(&mut *self.lock(), MailboxState::Closed);
        match previous {
            MailboxState::Buffering(buffer) => buffer.into(),
            MailboxState::Live(_) | MailboxState::Closed => Vec::new(),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(&*self.lock(), MailboxState::Live(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(&*self.lock(), MailboxState::Closed)
    }

    /// Commands waiting for replay.
    pub fn pending(&self) -> usize {
        match &*self.lock() {
            MailboxState::Buffering(buffer) => buffer.len(),
            MailboxState::Live(_) | MailboxState::Closed => 0,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MailboxState> {
        // A panicking handler never runs under this lock, so the state is
        // consistent even when poisoned.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailbox")
            .field("site_id", &self.site_id)
            .field("live", &self.is_live())
            .field("closed", &self.is_closed())
            .field("pending", &self.pending())
            .finish()
    }
}
