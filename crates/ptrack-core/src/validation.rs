//! Exercise form validation.
//!
//! Checks run in a fixed order and the first failure wins:
//! name, target reps, target sets, hold time, then the upper bounds.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::storage::config::FormDefaults;

pub const MAX_TARGET_REPS: i64 = 1000;
pub const MAX_TARGET_SETS: i64 = 100;
/// One hour.
pub const MAX_HOLD_SECONDS: i64 = 3600;

/// Raw values submitted from the add/edit form.
///
/// Numbers are signed so that out-of-range input can be reported rather
/// than rejected by the type system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseForm {
    pub name: String,
    pub target_reps: i64,
    pub target_sets: i64,
    pub hold_time: i64,
}

/// A definition that passed [`validate_exercise`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseDefinition {
    pub name: String,
    pub target_reps: u32,
    pub target_sets: u32,
    pub hold_time: u32,
}

impl ExerciseForm {
    /// Build a form from text inputs.
    ///
    /// A blank or non-numeric field (or one that parses to zero) falls back
    /// to its default, the way the input widgets behave.
    pub fn parse_fields(
        name: &str,
        target_reps: &str,
        target_sets: &str,
        hold_time: &str,
        defaults: &FormDefaults,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            target_reps: parse_or(target_reps, defaults.target_reps),
            target_sets: parse_or(target_sets, defaults.target_sets),
            hold_time: parse_or(hold_time, defaults.hold_time),
        }
    }

    /// Blank form pre-filled with the configured defaults.
    pub fn with_defaults(defaults: &FormDefaults) -> Self {
        Self {
            name: String::new(),
            target_reps: i64::from(defaults.target_reps),
            target_sets: i64::from(defaults.target_sets),
            hold_time: i64::from(defaults.hold_time),
        }
    }
}

fn parse_or(raw: &str, default: u32) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(0) | Err(_) => i64::from(default),
        Ok(n) => n,
    }
}

/// Validate a submitted form.
pub fn validate_exercise(form: &ExerciseForm) -> Result<ExerciseDefinition, ValidationError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if form.target_reps < 1 {
        return Err(ValidationError::TargetRepsTooLow);
    }
    if form.target_sets < 1 {
        return Err(ValidationError::TargetSetsTooLow);
    }
    if form.hold_time < 0 {
        return Err(ValidationError::NegativeHoldTime);
    }
    if form.target_reps > MAX_TARGET_REPS {
        return Err(ValidationError::TargetRepsTooHigh(MAX_TARGET_REPS));
    }
    if form.target_sets > MAX_TARGET_SETS {
        return Err(ValidationError::TargetSetsTooHigh(MAX_TARGET_SETS));
    }
    if form.hold_time > MAX_HOLD_SECONDS {
        return Err(ValidationError::HoldTimeTooLong(MAX_HOLD_SECONDS));
    }

    Ok(ExerciseDefinition {
        name: name.to_string(),
        target_reps: clamp_u32(form.target_reps),
        target_sets: clamp_u32(form.target_sets),
        hold_time: clamp_u32(form.hold_time),
    })
}

fn clamp_u32(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
