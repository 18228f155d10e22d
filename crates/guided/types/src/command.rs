//! Navigation commands received from the host dialog
//!
//! The host sends loosely-typed payloads. Parsing is lenient and works
//! field by field: a field with the wrong type is dropped, unknown keys
//! are kept for the rendering surface, and a payload without a usable
//! `step` parses into a command that applies as a no-op.
//!
//! A numeric `step` or `subStep` that is not a positive integer (zero,
//! negative, fractional) is kept as `0` rather than dropped, so bounds
//! checking rejects the whole command.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A step/substep jump requested by the host
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", rename_all = "camelCase")]
pub struct NavigationCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_step: Option<u32>,
    /// Name of a completion gate the host checks before enabling its own
    /// follow-on affordances. Never interpreted as a completion by the core.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_unless: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub display_flags: BTreeMap<String, bool>,
    /// Keys the core does not understand, passed through untouched
    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl NavigationCommand {
    pub fn to_step(step: u32) -> Self {
        Self {
            step: Some(step),
            ..Self::default()
        }
    }

    pub fn to_substep(step: u32, sub_step: u32) -> Self {
        Self {
            step: Some(step),
            sub_step: Some(sub_step),
            ..Self::default()
        }
    }

    pub fn with_disabled_unless(mut self, gate: impl Into<String>) -> Self {
        self.disabled_unless = Some(gate.into());
        self
    }

    pub fn with_display_flag(mut self, flag: impl Into<String>, visible: bool) -> Self {
        self.display_flags.insert(flag.into(), visible);
        self
    }

    /// Parse a raw host payload; never fails
    pub fn from_json_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let mut command = Self::default();
        for (key, field) in object {
            match key.as_str() {
                "step" => command.step = step_number(field),
                "subStep" | "sub_step" | "substep" => command.sub_step = step_number(field),
                "disabledUnless" | "disabled_unless" => {
                    command.disabled_unless = field.as_str().map(str::to_string)
                }
                "displayFlags" | "display_flags" => {
                    if let Some(flags) = field.as_object() {
                        command.display_flags = flags
                            .iter()
                            .filter_map(|(name, v)| v.as_bool().map(|b| (name.clone(), b)))
                            .collect();
                    }
                }
                _ => {
                    command.extra.insert(key.clone(), field.clone());
                }
            }
        }
        command
    }

    /// A command with no target step carries nothing to apply
    pub fn is_actionable(&self) -> bool {
        self.step.is_some()
    }
}

impl From<Value> for NavigationCommand {
    fn from(value: Value) -> Self {
        Self::from_json_value(&value)
    }
}

/// Steps and substeps are 1-based. Numbers (or numeric strings) that
/// are not positive integers map to `0`, which is always out of range;
/// values that are not numbers at all are absent.
fn step_number(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(n) => Some(n),
                Err(_) if s.parse::<f64>().is_ok() => None,
                Err(_) => return None,
            }
        }
        _ => return None,
    };
    Some(match n {
        Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => 0,
    })
}

/// The last observed display flags
///
/// An explicit `false` hides an optional affordance; absent or `true`
/// leaves the default visibility in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayFlags(pub BTreeMap<String, bool>);

impl DisplayFlags {
    pub fn is_visible(&self, flag: &str) -> bool {
        self.0.get(flag).copied().unwrap_or(true)
    }

    pub fn replace(&mut self, flags: BTreeMap<String, bool>) {
        self.0 = flags;
    }
}
