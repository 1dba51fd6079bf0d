//! Canonicalization of loosely typed user input. Every parser lower-cases its input and looks at
//! the first character only, so "F", "foc" and "focus" all mean [GoalSection::Focus].

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::PlannerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalSection {
    Focus,
    Todo,
}

impl GoalSection {
    pub const ALL: [GoalSection; 2] = [GoalSection::Focus, GoalSection::Todo];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalSection::Focus => "focus",
            GoalSection::Todo => "todo",
        }
    }

    /// Heading used when displaying the section.
    pub fn title(&self) -> &'static str {
        match self {
            GoalSection::Focus => "Focus",
            GoalSection::Todo => "ToDo",
        }
    }
}

pub fn normalize_section(input: &str) -> Result<GoalSection, PlannerError> {
    let lowered = input.to_lowercase();
    if lowered.starts_with('f') {
        Ok(GoalSection::Focus)
    } else if lowered.starts_with('t') {
        Ok(GoalSection::Todo)
    } else {
        Err(PlannerError::UnknownSection(lowered))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
}

impl Meal {
    pub const ALL: [Meal; 3] = [Meal::Breakfast, Meal::Lunch, Meal::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Meal::Breakfast => "breakfast",
            Meal::Lunch => "lunch",
            Meal::Dinner => "dinner",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Meal::Breakfast => "Breakfast",
            Meal::Lunch => "Lunch",
            Meal::Dinner => "Dinner",
        }
    }
}

pub fn normalize_meal(input: &str) -> Result<Meal, PlannerError> {
    let lowered = input.to_lowercase();
    if lowered.starts_with('b') {
        Ok(Meal::Breakfast)
    } else if lowered.starts_with('l') {
        Ok(Meal::Lunch)
    } else if lowered.starts_with('d') {
        Ok(Meal::Dinner)
    } else {
        Err(PlannerError::InvalidMeal(lowered))
    }
}

/// Which part of a day record `show` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowType {
    Routine,
    Plan,
    Goals,
    Summary,
    Food,
    All,
}

/// An empty string is accepted and means [ShowType::All].
pub fn normalize_show_type(input: &str) -> Result<ShowType, PlannerError> {
    let lowered = input.to_lowercase();
    match lowered.chars().next() {
        Some('r') => Ok(ShowType::Routine),
        Some('p') => Ok(ShowType::Plan),
        Some('g') => Ok(ShowType::Goals),
        Some('s') => Ok(ShowType::Summary),
        Some('f') => Ok(ShowType::Food),
        Some('a') | None => Ok(ShowType::All),
        Some(_) => Err(PlannerError::UnknownShowType(lowered)),
    }
}

macro_rules! parse_and_display {
    ($ty:ty, $parse:ident, $show:expr) => {
        impl FromStr for $ty {
            type Err = PlannerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $parse(s)
            }
        }

        impl Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                #[allow(clippy::redundant_closure_call)]
                f.write_str(($show)(self))
            }
        }
    };
}

parse_and_display!(GoalSection, normalize_section, |v: &GoalSection| v.as_str());
parse_and_display!(Meal, normalize_meal, |v: &Meal| v.as_str());
parse_and_display!(ShowType, normalize_show_type, |v: &ShowType| match v {
    ShowType::Routine => "routine",
    ShowType::Plan => "plan",
    ShowType::Goals => "goals",
    ShowType::Summary => "summary",
    ShowType::Food => "food",
    ShowType::All => "all",
});
