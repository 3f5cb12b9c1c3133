//! Tracker Logging Tests
//!
//! Installs a recording subscriber and checks the structured events the
//! forced-withdrawal tracker emits:
//! - First observation
//! - Status transitions
//! - Maturity, reported once
//! - Status read failures

use std::fmt;
use std::sync::{Arc, Mutex};

use compact_core::errors::WithdrawalError;
use compact_core::forced_withdrawal::{
    FixedClock, ForcedWithdrawalState, ForcedWithdrawalStatus, ForcedWithdrawalTracker,
    StatusSource,
};
use compact_types::ids::ResourceId;
use compact_types::{Address, U256};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::Registry;

const T0: u64 = 1_700_000_000;

#[derive(Debug, Clone, PartialEq)]
struct Recorded {
    level: Level,
    message: String,
}

/// Layer that keeps every event's level and message.
#[derive(Clone, Default)]
struct EventRecorder {
    events: Arc<Mutex<Vec<Recorded>>>,
}

impl EventRecorder {
    fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }

    fn count(&self, message: &str) -> usize {
        self.messages().iter().filter(|m| *m == message).count()
    }

    fn level_of(&self, message: &str) -> Option<Level> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.message == message)
            .map(|e| e.level)
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for EventRecorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(Recorded {
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

struct ScriptedSource {
    state: Mutex<Result<ForcedWithdrawalState, WithdrawalError>>,
}

impl ScriptedSource {
    fn new(state: ForcedWithdrawalState) -> Self {
        Self {
            state: Mutex::new(Ok(state)),
        }
    }

    fn set(&self, state: Result<ForcedWithdrawalState, WithdrawalError>) {
        *self.state.lock().unwrap() = state;
    }
}

impl StatusSource for ScriptedSource {
    fn forced_withdrawal_status(
        &self,
        _owner: &Address,
        _id: ResourceId,
    ) -> Result<ForcedWithdrawalState, WithdrawalError> {
        self.state.lock().unwrap().clone()
    }

    fn balance_of(&self, _owner: &Address, _id: ResourceId) -> Result<U256, WithdrawalError> {
        Ok(U256::from(500u64))
    }
}

#[test]
fn test_tracker_logs_transitions_and_maturity() {
    let recorder = EventRecorder::default();
    let subscriber = Registry::default().with(recorder.clone());

    tracing::subscriber::with_default(subscriber, || {
        let clock = FixedClock::new(T0);
        let source = ScriptedSource::new(ForcedWithdrawalState::disabled());
        let mut tracker = ForcedWithdrawalTracker::new(&clock, Default::default());
        let owner = Address::repeat_byte(0x22);
        let id = ResourceId::from_u256(U256::from(7u64));

        tracker.evaluate(&source, &owner, id).unwrap();

        source.set(Ok(ForcedWithdrawalState::new(
            ForcedWithdrawalStatus::Pending,
            T0 + 600,
        )));
        tracker.evaluate(&source, &owner, id).unwrap();
        clock.advance(300);
        tracker.evaluate(&source, &owner, id).unwrap();

        clock.advance(300);
        tracker.evaluate(&source, &owner, id).unwrap();
        clock.advance(5);
        tracker.evaluate(&source, &owner, id).unwrap();
    });

    assert_eq!(recorder.count("Forced withdrawal status observed"), 1);
    assert_eq!(recorder.count("Forced withdrawal status changed"), 1);
    assert_eq!(recorder.count("Forced withdrawal matured"), 1);
    assert_eq!(
        recorder.level_of("Forced withdrawal status observed"),
        Some(Level::DEBUG)
    );
    assert_eq!(
        recorder.level_of("Forced withdrawal status changed"),
        Some(Level::INFO)
    );

    let messages = recorder.messages();
    let changed = messages
        .iter()
        .position(|m| m == "Forced withdrawal status changed")
        .unwrap();
    let matured = messages
        .iter()
        .position(|m| m == "Forced withdrawal matured")
        .unwrap();
    assert!(changed < matured);
}

#[test]
fn test_tracker_warns_on_status_read_failure() {
    let recorder = EventRecorder::default();
    let subscriber = Registry::default().with(recorder.clone());

    let result = tracing::subscriber::with_default(subscriber, || {
        let clock = FixedClock::new(T0);
        let source = ScriptedSource::new(ForcedWithdrawalState::disabled());
        source.set(Err(WithdrawalError::StatusRead("timeout".to_string())));
        let mut tracker = ForcedWithdrawalTracker::new(&clock, Default::default());
        tracker.evaluate(
            &source,
            &Address::repeat_byte(0x22),
            ResourceId::from_u256(U256::from(7u64)),
        )
    });

    assert_eq!(
        result,
        Err(WithdrawalError::StatusRead("timeout".to_string()))
    );
    assert_eq!(
        recorder.level_of("Forced withdrawal status read failed"),
        Some(Level::WARN)
    );
    assert_eq!(recorder.count("Forced withdrawal status observed"), 0);
}
