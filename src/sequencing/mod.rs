pub mod events;
pub mod pattern;
pub mod scheduler;

pub use events::{EventHub, EventKind, SequencerEvent, Subscription, SubscriptionId};
pub use pattern::{Pattern, PatternStore, Step, StepUpdate, Track};
pub use scheduler::{ScheduledStep, Scheduler, Trigger};
