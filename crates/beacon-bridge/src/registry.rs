//! Process-wide routing of page commands to tracker mailboxes.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use beacon_core::errors::{BeaconResult, BridgeError};
use serde_json::Value;
use tracing::{debug, warn};

use crate::command::Command;
use crate::mailbox::Mailbox;

struct HeldCommand {
    /// `None` for a broadcast.
    target: Option<String>,
    command: Command,
}

#[derive(Default)]
struct RegistryState {
    mailboxes: BTreeMap<String, Arc<Mailbox>>,
    /// Commands that arrived before their recipient registered, in arrival order.
    held: Vec<HeldCommand>,
}

/// Routes commands by site identifier.
///
/// A targeted command goes to that instance's mailbox. An untargeted command
/// is broadcast to every registered instance. Either kind is held when its
/// recipient does not exist yet, and handed over on registration.
#[derive(Default)]
pub struct BridgeRegistry {
    state: Mutex<RegistryState>,
}

impl BridgeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the mailbox for `site_id`, seeded with every command held for
    /// it and every held broadcast, in the order they arrived.
    pub fn register(&self, site_id: &str) -> BeaconResult<Arc<Mailbox>> {
        let mut state = self.lock();
        if state.mailboxes.contains_key(site_id) {
            return Err(BridgeError::AlreadyRegistered {
                site_id: site_id.to_string(),
            }
            .into());
        }

        let mailbox = Arc::new(Mailbox::new(site_id));
        let held = std::mem::take(&mut state.held);
        let mut handed_over = 0usize;
        for entry in held {
            // Broadcasts held before the first registration reach the first
            // instance only; later ones go live.
            if entry.target.as_deref().is_some_and(|target| target != site_id) {
                state.held.push(entry);
                continue;
            }
            match mailbox.enqueue(entry.command) {
                Ok(()) => handed_over += 1,
                Err(command) => state.held.push(HeldCommand {
                    target: entry.target,
                    command,
                }),
            }
        }
        state
            .mailboxes
            .insert(site_id.to_string(), Arc::clone(&mailbox));
        debug!(site_id, handed_over, "bridge: mailbox registered");
        Ok(mailbox)
    }

    /// Remove `mailbox` and close it. Commands it still buffered go back
    /// to the holding area for the next registration of the same site.
    ///
    /// A newer mailbox registered under the same site is left alone.
    /// Returns how many commands were held again.
    pub fn release(&self, mailbox: &Arc<Mailbox>) -> usize {
        let site_id = mailbox.site_id();
        let mut state = self.lock();
        if state
            .mailboxes
            .get(site_id)
            .is_some_and(|current| Arc::ptr_eq(current, mailbox))
        {
            state.mailboxes.remove(site_id);
        }
        let buffered = mailbox.close();
        let returned = buffered.len();
        state.held.extend(buffered.into_iter().map(|command| HeldCommand {
            target: Some(site_id.to_string()),
            command,
        }));
        debug!(site_id, returned, "bridge: mailbox released");
        returned
    }

    pub fn mailbox(&self, site_id: &str) -> Option<Arc<Mailbox>> {
        self.lock().mailboxes.get(site_id).cloned()
    }

    pub fn site_ids(&self) -> Vec<String> {
        self.lock().mailboxes.keys().cloned().collect()
    }

    /// Commands held for `target` (`None` counts held broadcasts).
    pub fn held_count(&self, target: Option<&str>) -> usize {
        self.lock()
            .held
            .iter()
            .filter(|entry| entry.target.as_deref() == target)
            .count()
    }

    /// Route a command. Execution, if any, happens outside the registry lock.
    pub fn dispatch(&self, command: Command, target: Option<&str>) {
        let recipients: Vec<Arc<Mailbox>> = {
            let mut state = self.lock();
            let recipients: Vec<Arc<Mailbox>> = match target {
                Some(site_id) => state.mailboxes.get(site_id).cloned().into_iter().collect(),
                None => state.mailboxes.values().cloned().collect(),
            };
            if recipients.is_empty() {
                debug!(target = ?target, action = command.action().as_str(), "bridge: holding command");
                state.held.push(HeldCommand {
                    target: target.map(str::to_string),
                    command,
                });
                return;
            }
            recipients
        };

        let Some((last, rest)) = recipients.split_last() else {
            return;
        };
        for mailbox in rest {
            self.deliver(mailbox, command.clone());
        }
        self.deliver(last, command);
    }

    /// Keep a command until `target` (or, for a broadcast, any instance)
    /// registers.
    pub fn hold(&self, command: Command, target: Option<&str>) {
        debug!(target = ?target, action = command.action().as_str(), "bridge: holding command");
        self.lock().held.push(HeldCommand {
            target: target.map(str::to_string),
            command,
        });
    }

    /// A mailbox closed after it was picked as a recipient: keep the command
    /// for that site's next registration.
    fn deliver(&self, mailbox: &Mailbox, command: Command) {
        if let Err(command) = mailbox.enqueue(command) {
            self.hold(command, Some(mailbox.site_id()));
        }
    }

    /// Parse and route an untyped page command. Malformed commands are
    /// reported and dropped.
    pub fn push(
        &self,
        action: &str,
        argument: Value,
        data: Option<Value>,
        target: Option<&str>,
    ) -> BeaconResult<()> {
        match Command::from_raw(action, argument, data) {
            Ok(command) => {
                self.dispatch(command, target);
                Ok(())
            }
            Err(e) => {
                warn!(action, error = %e, "bridge: rejected command");
                Err(e)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for BridgeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("BridgeRegistry")
            .field("sites", &state.mailboxes.keys().collect::<Vec<_>>())
            .field("held", &state.held.len())
            .finish()
    }
}

/// The registry shared by every tracker in the process.
pub fn global() -> Arc<BridgeRegistry> {
    static GLOBAL: OnceLock<Arc<BridgeRegistry>> = OnceLock::new();
    Arc::clone(GLOBAL.get_or_init(|| Arc::new(BridgeRegistry::new())))
}
