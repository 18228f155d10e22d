//! Scripted session replay
//!
//! A replay script is a JSON document listing learner actions and host
//! commands. Each action runs against a session on a manual clock, so
//! `wait` steps advance time deterministically. Rejected actions are part
//! of the transcript, not failures of the command.

use super::load_definition;
use crate::error::CliResult;
use crate::output::{self, print_info, OutputFormat};
use chrono::Utc;
use clap::Args;
use guided_engine::{
    BridgeOutcome, EngineConfig, ExerciseOrchestrator, FileProgressStore, GuidedSession,
    ManualClock,
};
use guided_types::{GuidedResult, Token};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tabled::Tabled;

/// Arguments for `guided replay`
#[derive(Args)]
pub struct ReplayArgs {
    /// Definition file (JSON or YAML)
    pub definition: PathBuf,

    /// Replay script (JSON)
    pub script: PathBuf,

    /// Engine configuration (TOML)
    #[arg(short, long, env = "GUIDED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Progress store directory to resume from and checkpoint into
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Write the final progress snapshot to this file
    #[arg(long)]
    pub snapshot_out: Option<PathBuf>,

    /// Print the session journal after the transcript
    #[arg(long)]
    pub journal: bool,
}

/// A replay script
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub description: String,
    pub actions: Vec<ScriptAction>,
}

/// One scripted action
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    Place {
        equation: usize,
        slot: usize,
        token: Token,
    },
    PlaceNext {
        token: Token,
    },
    Clear {
        equation: usize,
        slot: usize,
    },
    Next,
    Previous,
    Jump {
        step: u32,
        #[serde(default)]
        substep: Option<u32>,
    },
    Command {
        payload: serde_json::Value,
    },
    ResetStep {
        step: u32,
    },
    Restart,
    Wait {
        ms: i64,
    },
}

impl std::fmt::Display for ScriptAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptAction::Place {
                equation,
                slot,
                token,
            } => write!(f, "place {} at {}:{}", token, equation, slot),
            ScriptAction::PlaceNext { token } => write!(f, "place {}", token),
            ScriptAction::Clear { equation, slot } => write!(f, "clear {}:{}", equation, slot),
            ScriptAction::Next => write!(f, "next"),
            ScriptAction::Previous => write!(f, "previous"),
            ScriptAction::Jump {
                step,
                substep: Some(substep),
            } => write!(f, "jump {}.{}", step, substep),
            ScriptAction::Jump { step, substep: None } => write!(f, "jump {}", step),
            ScriptAction::Command { payload } => write!(f, "command {}", payload),
            ScriptAction::ResetStep { step } => write!(f, "reset step {}", step),
            ScriptAction::Restart => write!(f, "restart"),
            ScriptAction::Wait { ms } => write!(f, "wait {}ms", ms),
        }
    }
}

/// One transcript line
#[derive(Debug, Serialize, Tabled)]
pub struct ReplayRow {
    #[tabled(rename = "#")]
    pub index: usize,
    pub action: String,
    pub result: String,
    pub position: String,
    pub feedback: String,
    pub notifications: String,
}

fn describe(result: GuidedResult<String>) -> String {
    result.unwrap_or_else(|e| format!("rejected: {}", e))
}

/// Run one action and describe what happened
pub fn run_action(session: &mut GuidedSession, clock: &ManualClock, action: &ScriptAction) -> String {
    match action {
        ScriptAction::Place {
            equation,
            slot,
            token,
        } => describe(
            session
                .place(*equation, *slot, token.clone())
                .map(|o| o.outcome.to_string()),
        ),
        ScriptAction::PlaceNext { token } => describe(session.place_next(token.clone()).map(|o| {
            o.map(|o| o.outcome.to_string())
                .unwrap_or_else(|| "no empty slot".to_string())
        })),
        ScriptAction::Clear { equation, slot } => describe(
            session
                .clear_slot(*equation, *slot)
                .map(|removed| match removed {
                    Some(token) => format!("removed {}", token),
                    None => "already empty".to_string(),
                }),
        ),
        ScriptAction::Next => describe(session.go_next().map(|t| format!("moved to {}", t.to))),
        ScriptAction::Previous => {
            describe(session.go_previous().map(|t| format!("moved to {}", t.to)))
        }
        ScriptAction::Jump { step, substep } => describe(
            session
                .jump_to(*step, *substep)
                .map(|t| format!("moved to {}", t.to)),
        ),
        ScriptAction::Command { payload } => describe(session.apply_payload(payload).map(
            |outcome| match outcome {
                BridgeOutcome::Applied(t) => format!("moved to {}", t.to),
                BridgeOutcome::Ignored(reason) => format!("ignored: {}", reason),
            },
        )),
        ScriptAction::ResetStep { step } => {
            describe(session.reset_step(*step).map(|()| "reset".to_string()))
        }
        ScriptAction::Restart => describe(session.restart().map(|t| format!("moved to {}", t.to))),
        ScriptAction::Wait { ms } => {
            clock.advance_ms(*ms);
            if session.tick() {
                "feedback cleared".to_string()
            } else {
                "waited".to_string()
            }
        }
    }
}

/// Execute the replay command
pub async fn execute(args: ReplayArgs, format: OutputFormat) -> CliResult<()> {
    let definition = load_definition(&args.definition)?;
    let script: ReplayScript = serde_json::from_str(&std::fs::read_to_string(&args.script)?)?;
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let clock = ManualClock::new(Utc::now());
    let mut orchestrator = ExerciseOrchestrator::new(config).with_clock(Arc::new(clock.clone()));
    if let Some(dir) = &args.store {
        orchestrator = orchestrator.with_store(Arc::new(FileProgressStore::new(dir)));
    }
    let widget_id = orchestrator.register_definition(definition)?;
    let resumed = orchestrator.resume_session(&widget_id).await?;

    let session = orchestrator.session_mut(&widget_id)?;
    let mut rows = Vec::with_capacity(script.actions.len());
    for (index, action) in script.actions.iter().enumerate() {
        let result = run_action(session, &clock, action);
        let notifications: Vec<String> = session
            .drain_notifications()
            .iter()
            .map(|n| n.notification_key())
            .collect();
        rows.push(ReplayRow {
            index: index + 1,
            action: action.to_string(),
            result,
            position: session.position().to_string(),
            feedback: session
                .feedback()
                .map(|m| format!("{}: {}", m.kind, m.key))
                .unwrap_or_default(),
            notifications: notifications.join(", "),
        });
    }
    let journal: Vec<_> = session.journal().records().cloned().collect();

    let snapshot = orchestrator.checkpoint(&widget_id).await?;
    if let Some(path) = &args.snapshot_out {
        std::fs::write(path, snapshot.to_json()?)?;
    }

    output::print_output(rows, format)?;
    if args.journal {
        output::print_single(&journal, format)?;
    }
    if matches!(format, OutputFormat::Table) {
        if resumed {
            print_info("resumed from stored progress");
        }
        print_info(&format!(
            "final position {}, completed: {}",
            snapshot.position,
            snapshot.completed_keys().join(", ")
        ));
    }
    Ok(())
}
