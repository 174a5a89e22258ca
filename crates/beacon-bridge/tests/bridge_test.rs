//! Mailbox replay and registry routing.

use std::sync::{Arc, Mutex};

use beacon_bridge::{BridgeRegistry, Command, CommandHandler, Mailbox};
use beacon_core::BeaconError;
use serde_json::{json, Map};

/// Records the event type of every track command it handles.
#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<String>>,
}

impl Recorder {
    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl CommandHandler for Recorder {
    fn handle(&self, command: Command) {
        let label = match command {
            Command::Track { event_type, .. } => event_type,
            Command::Config { .. } => "<config>".to_string(),
            Command::OnFirstImpression(callback) => {
                callback();
                "<callback>".to_string()
            }
        };
        self.seen.lock().unwrap().push(label);
    }
}

fn track(name: &str) -> Command {
    Command::track(name, Map::new())
}

#[test]
fn buffered_commands_replay_in_arrival_order() {
    let mailbox = Mailbox::new("site-a");
    for name in ["one", "two", "three"] {
        mailbox.enqueue(track(name)).unwrap();
    }
    assert_eq!(mailbox.pending(), 3);

    let recorder = Arc::new(Recorder::default());
    let replayed = mailbox.drain_and_replay(recorder.clone()).unwrap();

    assert_eq!(replayed, 3);
    assert_eq!(recorder.seen(), vec!["one", "two", "three"]);
    assert!(mailbox.is_live());
}

#[test]
fn live_mailbox_executes_immediately() {
    let mailbox = Mailbox::new("site-a");
    let recorder = Arc::new(Recorder::default());
    mailbox.drain_and_replay(recorder.clone()).unwrap();

    mailbox.enqueue(track("later")).unwrap();
    assert_eq!(recorder.seen(), vec!["later"]);
    assert_eq!(mailbox.pending(), 0);
}

#[test]
fn replay_happens_only_once() {
    let mailbox = Mailbox::new("site-a");
    let recorder = Arc::new(Recorder::default());
    mailbox.drain_and_replay(recorder.clone()).unwrap();

    let err = mailbox.drain_and_replay(recorder).unwrap_err();
    assert!(matches!(err, BeaconError::BridgeError(_)));
}

/// Pushes a follow-up command into its own mailbox while handling the first.
struct Reentrant {
    mailbox: Arc<Mailbox>,
    inner: Recorder,
}

impl CommandHandler for Reentrant {
    fn handle(&self, command: Command) {
        let is_first = matches!(&command, Command::Track { event_type, .. } if event_type == "first");
        self.inner.handle(command);
        if is_first {
            self.mailbox.enqueue(track("pushed-during-replay")).unwrap();
        }
    }
}

#[test]
fn commands_pushed_during_replay_are_not_lost() {
    let mailbox = Arc::new(Mailbox::new("site-a"));
    mailbox.enqueue(track("first")).unwrap();
    mailbox.enqueue(track("second")).unwrap();

    let handler = Arc::new(Reentrant {
        mailbox: Arc::clone(&mailbox),
        inner: Recorder::default(),
    });
    let replayed = mailbox.drain_and_replay(handler.clone()).unwrap();

    assert_eq!(replayed, 3);
    assert_eq!(
        handler.inner.seen(),
        vec!["first", "second", "pushed-during-replay"]
    );
}

#[test]
fn targeted_command_is_held_until_registration() {
    let registry = BridgeRegistry::new();
    registry.dispatch(track("early"), Some("site-b"));
    assert_eq!(registry.held_count(Some("site-b")), 1);

    // Another site does not receive it.
    let a = registry.register("site-a").unwrap();
    assert_eq!(a.pending(), 0);
    assert_eq!(registry.held_count(Some("site-b")), 1);

    let b = registry.register("site-b").unwrap();
    assert_eq!(b.pending(), 1);
    assert_eq!(registry.held_count(Some("site-b")), 0);
}

#[test]
fn broadcast_reaches_every_registered_instance() {
    let registry = BridgeRegistry::new();
    let a = registry.register("site-a").unwrap();
    let b = registry.register("site-b").unwrap();
    let ra = Arc::new(Recorder::default());
    let rb = Arc::new(Recorder::default());
    a.drain_and_replay(ra.clone()).unwrap();

    registry.dispatch(track("everyone"), None);

    assert_eq!(ra.seen(), vec!["everyone"]);
    // Still buffering, replayed later.
    assert_eq!(b.pending(), 1);
    b.drain_and_replay(rb.clone()).unwrap();
    assert_eq!(rb.seen(), vec!["everyone"]);
}

#[test]
fn held_broadcast_goes_to_first_registration_only() {
    let registry = BridgeRegistry::new();
    registry.dispatch(track("orphan"), None);

    let a = registry.register("site-a").unwrap();
    let b = registry.register("site-b").unwrap();
    assert_eq!(a.pending(), 1);
    assert_eq!(b.pending(), 0);
}

#[test]
fn held_commands_keep_arrival_order_across_kinds() {
    let registry = BridgeRegistry::new();
    registry.dispatch(track("t1"), Some("site-a"));
    registry.dispatch(track("b1"), None);
    registry.dispatch(track("other"), Some("site-z"));
    registry.dispatch(track("t2"), Some("site-a"));

    let a = registry.register("site-a").unwrap();
    let recorder = Arc::new(Recorder::default());
    a.drain_and_replay(recorder.clone()).unwrap();

    assert_eq!(recorder.seen(), vec!["t1", "b1", "t2"]);
    assert_eq!(registry.held_count(Some("site-z")), 1);
}

#[test]
fn duplicate_registration_is_rejected() {
    let registry = BridgeRegistry::new();
    let first = registry.register("site-a").unwrap();
    assert!(registry.register("site-a").is_err());

    registry.release(&first);
    assert!(registry.register("site-a").is_ok());
}

#[test]
fn released_mailbox_returns_buffered_commands_to_holding() {
    let registry = BridgeRegistry::new();
    let first = registry.register("site-a").unwrap();
    registry.dispatch(track("one"), Some("site-a"));
    registry.dispatch(track("two"), None);

    assert_eq!(registry.release(&first), 2);
    assert!(first.is_closed());
    assert!(registry.site_ids().is_empty());
    assert_eq!(registry.held_count(Some("site-a")), 2);

    let second = registry.register("site-a").unwrap();
    let recorder = Arc::new(Recorder::default());
    second.drain_and_replay(recorder.clone()).unwrap();
    assert_eq!(recorder.seen(), vec!["one", "two"]);
}

#[test]
fn closed_mailbox_hands_commands_back() {
    let mailbox = Mailbox::new("site-a");
    let recorder = Arc::new(Recorder::default());
    mailbox.drain_and_replay(recorder.clone()).unwrap();
    assert!(mailbox.close().is_empty());

    let refused = mailbox.enqueue(track("late"));
    assert!(matches!(refused, Err(Command::Track { ref event_type, .. }) if event_type == "late"));
    assert!(recorder.seen().is_empty());
    assert!(mailbox.drain_and_replay(recorder).is_err());
}

#[test]
fn releasing_a_stale_mailbox_keeps_the_newer_one() {
    let registry = BridgeRegistry::new();
    let stale = registry.register("site-a").unwrap();
    registry.release(&stale);
    let current = registry.register("site-a").unwrap();

    // A second release of the old mailbox must not evict its replacement.
    registry.release(&stale);
    assert_eq!(registry.site_ids(), vec!["site-a"]);
    assert!(Arc::ptr_eq(&registry.mailbox("site-a").unwrap(), &current));

    registry.dispatch(track("routed"), Some("site-a"));
    assert_eq!(current.pending(), 1);
    assert_eq!(registry.held_count(Some("site-a")), 0);
}

#[test]
fn malformed_push_is_reported_not_routed() {
    let registry = BridgeRegistry::new();
    assert!(registry.push("track", json!(42), None, None).is_err());
    assert_eq!(registry.held_count(None), 0);

    registry
        .push("track", json!("signup"), Some(json!({"plan": "pro"})), None)
        .unwrap();
    assert_eq!(registry.held_count(None), 1);
}

#[test]
fn callback_command_runs_through_handler() {
    let fired = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&fired);
    let mailbox = Mailbox::new("site-a");
    mailbox
        .enqueue(Command::on_first_impression(move || {
            *counter.lock().unwrap() += 1;
        }))
        .unwrap();

    let recorder = Arc::new(Recorder::default());
    mailbox.drain_and_replay(recorder.clone()).unwrap();

    assert_eq!(*fired.lock().unwrap(), 1);
    assert_eq!(recorder.seen(), vec!["<callback>"]);
}
