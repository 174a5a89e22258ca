//! Any sequence of buffered commands replays exactly once, in order.

use std::sync::{Arc, Mutex};

use beacon_bridge::{BridgeRegistry, Command, CommandHandler};
use proptest::prelude::*;
use serde_json::Map;

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<String>>,
}

impl CommandHandler for Recorder {
    fn handle(&self, command: Command) {
        if let Command::Track { event_type, .. } = command {
            self.seen.lock().unwrap().push(event_type);
        }
    }
}

proptest! {
    #[test]
    fn replay_preserves_order_without_loss(names in proptest::collection::vec("[a-z_]{1,12}", 0..40)) {
        let registry = BridgeRegistry::new();
        let mailbox = registry.register("site").unwrap();
        for name in &names {
            registry.dispatch(Command::track(name.clone(), Map::new()), Some("site"));
        }

        let recorder = Arc::new(Recorder::default());
        let replayed = mailbox.drain_and_replay(recorder.clone()).unwrap();

        prop_assert_eq!(replayed, names.len());
        prop_assert_eq!(&*recorder.seen.lock().unwrap(), &names);
    }

    #[test]
    fn held_then_registered_matches_direct_order(
        split in 0usize..20,
        names in proptest::collection::vec("[a-z]{1,8}", 0..20),
    ) {
        let split = split.min(names.len());
        let registry = BridgeRegistry::new();
        for name in &names[..split] {
            registry.dispatch(Command::track(name.clone(), Map::new()), Some("site"));
        }
        let mailbox = registry.register("site").unwrap();
        for name in &names[split..] {
            registry.dispatch(Command::track(name.clone(), Map::new()), Some("site"));
        }

        let recorder = Arc::new(Recorder::default());
        mailbox.drain_and_replay(recorder.clone()).unwrap();
        prop_assert_eq!(&*recorder.seen.lock().unwrap(), &names);
    }
}
