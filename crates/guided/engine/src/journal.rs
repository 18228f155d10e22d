//! Session journal: a bounded record of everything a session did
//!
//! Placements, evaluations, pointer moves, dropped commands, and
//! completion transitions are recorded in order. Once `capacity` records
//! are held the oldest are discarded. Sequence numbers keep counting, so
//! gaps show how much was dropped.

use chrono::{DateTime, Utc};
use guided_types::{CompletionKey, FeedbackKind, MatchOutcome, Position, Token};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Bounded, ordered record of session events
#[derive(Clone, Debug)]
pub struct SessionJournal {
    records: VecDeque<JournalRecord>,
    capacity: usize,
    next_sequence: u64,
}

impl SessionJournal {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity: capacity.max(1),
            next_sequence: 0,
        }
    }

    /// Append an event
    pub fn record(&mut self, event: JournalEvent, timestamp: DateTime<Utc>) {
        let record = JournalRecord {
            sequence: self.next_sequence,
            event,
            timestamp,
        };
        self.next_sequence += 1;
        tracing::trace!(sequence = record.sequence, event = %record.event, "Journal recorded");
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn records(&self) -> impl Iterator<Item = &JournalRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Events ever recorded, including dropped ones
    pub fn total_recorded(&self) -> u64 {
        self.next_sequence
    }

    pub fn records_at(&self, position: Position) -> Vec<&JournalRecord> {
        self.records
            .iter()
            .filter(|r| r.event.involves(position))
            .collect()
    }

    pub fn completions(&self) -> Vec<CompletionKey> {
        self.records
            .iter()
            .filter_map(|r| match r.event {
                JournalEvent::Completed { key } => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for SessionJournal {
    fn default() -> Self {
        Self::new(256)
    }
}

/// One journal entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub sequence: u64,
    pub event: JournalEvent,
    pub timestamp: DateTime<Utc>,
}

/// How a pointer move came about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationCause {
    Next,
    Previous,
    Jump,
    Command,
    Restart,
}

/// What happened
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JournalEvent {
    SessionOpened {
        position: Position,
    },
    SessionResumed {
        position: Position,
    },
    TokenPlaced {
        position: Position,
        equation: usize,
        slot: usize,
        token: Token,
    },
    PlacementIgnored {
        position: Position,
        token: Token,
    },
    SlotCleared {
        position: Position,
        equation: usize,
        slot: usize,
    },
    Evaluated {
        position: Position,
        equation: usize,
        outcome: MatchOutcome,
    },
    Navigated {
        from: Position,
        to: Position,
        cause: NavigationCause,
    },
    NavigationRejected {
        reason: String,
    },
    CommandIgnored {
        reason: String,
    },
    StepReset {
        step: u32,
    },
    Completed {
        key: CompletionKey,
    },
    FeedbackShown {
        kind: FeedbackKind,
        key: String,
    },
    FeedbackCleared,
}

impl JournalEvent {
    pub fn involves(&self, at: Position) -> bool {
        match self {
            Self::SessionOpened { position }
            | Self::SessionResumed { position }
            | Self::TokenPlaced { position, .. }
            | Self::PlacementIgnored { position, .. }
            | Self::SlotCleared { position, .. }
            | Self::Evaluated { position, .. } => *position == at,
            Self::Navigated { from, to, .. } => *from == at || *to == at,
            Self::StepReset { step } => *step == at.step,
            Self::Completed { key } => *key == at.completion_key(),
            _ => false,
        }
    }
}

impl std::fmt::Display for JournalEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionOpened { position } => write!(f, "opened at {}", position),
            Self::SessionResumed { position } => write!(f, "resumed at {}", position),
            Self::TokenPlaced {
                position,
                equation,
                slot,
                token,
            } => write!(f, "placed {} at {} eq {} slot {}", token, position, equation, slot),
            Self::PlacementIgnored { position, token } => {
                write!(f, "ignored {} at {} (no empty slot)", token, position)
            }
            Self::SlotCleared {
                position,
                equation,
                slot,
            } => write!(f, "cleared {} eq {} slot {}", position, equation, slot),
            Self::Evaluated {
                position,
                equation,
                outcome,
            } => write!(f, "evaluated {} eq {}: {:?}", position, equation, outcome),
            Self::Navigated { from, to, cause } => {
                write!(f, "{:?}: {} -> {}", cause, from, to)
            }
            Self::NavigationRejected { reason } => write!(f, "rejected: {}", reason),
            Self::CommandIgnored { reason } => write!(f, "command ignored: {}", reason),
            Self::StepReset { step } => write!(f, "reset step {}", step),
            Self::Completed { key } => write!(f, "{}", key),
            Self::FeedbackShown { kind, key } => write!(f, "{} message {}", kind, key),
            Self::FeedbackCleared => write!(f, "feedback cleared"),
        }
    }
}
