use std::fmt::{self, Display};

use chrono::NaiveDate;
use thiserror::Error;

use super::normalize::GoalSection;

/// One of several entries that satisfied a substring query. Positions are 1-based so they can be
/// shown to a user as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub position: usize,
    pub key: String,
}

impl Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.position, self.key)
    }
}

fn list_candidates(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("\n - {c}"))
        .collect::<String>()
}

/// Errors produced by the planner core. All of them are recoverable at the CLI/HTTP boundary and
/// none of them leave a record partially modified.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("Invalid meal: {0}")]
    InvalidMeal(String),

    #[error("Unknown show type: {0}")]
    UnknownShowType(String),

    #[error("Ambiguous command '{token}' matches: {}", candidates.join(", "))]
    AmbiguousCommand {
        token: String,
        candidates: Vec<String>,
    },

    #[error("Task containing '{0}' not found")]
    TaskNotFound(String),

    #[error("No routine section '{0}' found")]
    UnknownRoutineSection(String),

    #[error("No goals section '{0}' found")]
    UnknownGoalSection(GoalSection),

    #[error("Time must satisfy 5 <= start < end <= 24, got {start}..{end}")]
    InvalidTimeRange { start: i64, end: i64 },

    #[error("Invalid weight: {0}. Use a positive number")]
    InvalidWeight(f64),

    #[error("Invalid water amount: {0}. Use a non-negative integer")]
    InvalidAmount(i64),

    #[error("Planner for {0} already exists")]
    AlreadyExists(NaiveDate),

    #[error("No planner for {0}. Run 'init' first")]
    RecordNotFound(NaiveDate),

    #[error("Multiple matches for '{query}':{}", list_candidates(candidates))]
    Ambiguous {
        query: String,
        candidates: Vec<Candidate>,
    },

    #[error("No match for '{0}'")]
    NotFound(String),

    #[error("'{0}' not found in food database")]
    FoodNotFound(String),

    #[error("'{0}' already exists in food database")]
    FoodAlreadyExists(String),

    #[error("Invalid selection: '{0}'")]
    InvalidSelection(String),

    #[error("Corrupt day record: {0}")]
    CorruptRecord(String),
}
