//! Guided Exercise Domain Types
//!
//! A guided exercise walks a learner through an ordered list of steps,
//! some split into substeps. In each unit the learner assembles an
//! answer by placing opaque tokens into the editable slots of one or
//! more slot equations, and the assembled tuple is checked against a
//! canonical answer.
//!
//! # Key Concepts
//!
//! - **Token**: An opaque placeable value (`"M"`, `"500"`, `"2C"`).
//! - **SlotEquation**: Ordered fixed and editable slots for one sub-problem.
//! - **CanonicalAnswer**: Permutation-class (right values, any order, plus
//!   exact-value positions) or format-class (explicit allow-list of tuples).
//! - **ExerciseDefinition**: A widget's step/substep topology, equations,
//!   answers and token palettes. Pure data, no control flow.
//! - **ProgressState**: The current position, monotonic completion flags,
//!   and the live contents of every equation visited.
//! - **NavigationCommand**: A leniently parsed step jump from the host.
//!
//! # Design Principles
//!
//! 1. Widgets supply data; the engine owns every transition.
//! 2. Completion is monotonic for the lifetime of a session.
//! 3. Navigation moves the pointer and nothing else.
//! 4. Every error is recoverable and leaves progress unchanged.

#![deny(unsafe_code)]

mod answer;
mod command;
mod completion;
mod definition;
mod equation;
mod errors;
mod feedback;
mod position;
mod progress;
mod snapshot;
mod token;

pub use answer::*;
pub use command::*;
pub use completion::*;
pub use definition::*;
pub use equation::*;
pub use errors::*;
pub use feedback::*;
pub use position::*;
pub use progress::*;
pub use snapshot::*;
pub use token::*;
