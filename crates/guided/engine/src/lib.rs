//! Guided exercise runtime
//!
//! The engine runs learners through multi-step equation exercises. It
//! evaluates placed tokens against canonical answers, gates forward
//! navigation on completion, reports every completion flag exactly once,
//! and follows navigation commands pushed by the surrounding dialog.
//!
//! # Key Principle
//!
//! **Completion flags only ever go from false to true.**
//!
//! Clearing a slot, resetting a step or walking backwards never retracts
//! a flag the host has already been told about.
//!
//! # Architecture
//!
//! The [`GuidedSession`] composes specialized components:
//!
//! - [`StepController`]: Owns the progress pointer, slot contents and flags
//! - [`AnswerMatcher`]: Compares filled slots with canonical answers
//! - [`CompletionEmitter`]: Turns flag flips into one-shot notifications
//! - [`SyncBridge`]: Applies navigation commands from the host
//! - [`FeedbackTimer`]: Shows success/error messages; success auto-clears
//! - [`SessionJournal`]: Bounded log of everything the session did
//!
//! [`ExerciseOrchestrator`] hosts many sessions by widget id and persists
//! them through a [`ProgressStore`].
//!
//! # Example
//!
//! ```rust
//! use guided_engine::{EngineConfig, GuidedSession};
//! use guided_types::*;
//! use std::sync::Arc;
//!
//! let definition = ExerciseDefinition::new(WidgetId::new("sums"))
//!     .with_step(StepDefinition::single(
//!         UnitDefinition::new("Make ten")
//!             .with_equation(EquationDefinition::from_layout(
//!                 "_ + _ = 10",
//!                 CanonicalAnswer::permutation(tokens(["3", "7"])),
//!             ))
//!             .with_tokens(["3", "7", "5"]),
//!     ));
//!
//! let mut session = GuidedSession::open(Arc::new(definition), &EngineConfig::default()).unwrap();
//! session.place_next(Token::new("7")).unwrap();
//! session.place_next(Token::new("3")).unwrap();
//!
//! assert!(session.feedback().unwrap().is_success());
//! let notes = session.drain_notifications();
//! assert_eq!(notes[0].notification_key(), "step-1-completed");
//! ```

#![deny(unsafe_code)]

pub mod answer_matcher;
pub mod clock;
pub mod completion_emitter;
pub mod config;
pub mod definition_registry;
pub mod feedback_driver;
pub mod feedback_timer;
pub mod journal;
pub mod orchestrator;
pub mod progress_store;
pub mod session;
pub mod state_machine;
pub mod sync_bridge;
pub mod view;

// Re-export main types
pub use answer_matcher::AnswerMatcher;
pub use clock::{Clock, ManualClock, SystemClock};
pub use completion_emitter::CompletionEmitter;
pub use config::{EngineConfig, EntryPolicy};
pub use definition_registry::DefinitionRegistry;
pub use feedback_driver::{AutoClearDriver, SharedSession};
pub use feedback_timer::{ExpiryTicket, FeedbackTimer, PendingExpiry};
pub use journal::{JournalEvent, JournalRecord, NavigationCause, SessionJournal};
pub use orchestrator::ExerciseOrchestrator;
pub use progress_store::{FileProgressStore, InMemoryProgressStore, ProgressStore};
pub use session::GuidedSession;
pub use state_machine::{PlacementOutcome, StepController, Transition};
pub use sync_bridge::{BridgeOutcome, IgnoreReason, SyncBridge};
pub use view::{EquationView, SessionView};
