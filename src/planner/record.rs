use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{
    error::PlannerError,
    normalize::{GoalSection, Meal},
    nutrients::FoodLogEntry,
};

pub const FIRST_PLAN_HOUR: u32 = 5;
pub const LAST_PLAN_HOUR: u32 = 24;

/// Days of the week that get a laundry reminder seeded into the todo list.
pub const LAUNDRY_DAYS: [Weekday; 2] = [Weekday::Tue, Weekday::Fri];
const LAUNDRY: &str = "laundry";

/// Plan keys are zero-padded two digit hours, "05" through "24".
pub fn hour_key(hour: u32) -> String {
    format!("{hour:02}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub text: String,
    pub done: bool,
}

impl Goal {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineTask {
    pub label: String,
    pub done: bool,
}

/// A named group of routine tasks. The task list is fixed when the day is created, only the
/// completion flags change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineSection {
    name: String,
    tasks: Vec<RoutineTask>,
}

impl RoutineSection {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tasks(&self) -> &[RoutineTask] {
        &self.tasks
    }

    pub fn done_count(&self) -> usize {
        self.tasks.iter().filter(|v| v.done).count()
    }

    pub(super) fn task_mut(&mut self, index: usize) -> Option<&mut RoutineTask> {
        self.tasks.get_mut(index)
    }
}

/// Routine task labels per section, in the order the user wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutineTemplate {
    sections: IndexMap<String, Vec<String>>,
}

impl RoutineTemplate {
    pub fn new(sections: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            sections: sections.into_iter().collect(),
        }
    }

    pub fn sections(&self) -> &IndexMap<String, Vec<String>> {
        &self.sections
    }
}

/// All state tracked for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DayFile", into = "DayFile")]
pub struct DayRecord {
    pub(super) routine: Vec<RoutineSection>,
    pub(super) plan: BTreeMap<String, String>,
    pub(super) goals: BTreeMap<GoalSection, Vec<Goal>>,
    pub(super) food: BTreeMap<Meal, Vec<FoodLogEntry>>,
    pub(super) water: u64,
}

impl DayRecord {
    /// Builds a fresh record for `date` from the routine template. Nothing is checked off, no hour
    /// is planned, and the todo list is seeded according to [LAUNDRY_DAYS].
    pub fn init(date: NaiveDate, template: &RoutineTemplate) -> Self {
        let routine = template
            .sections()
            .iter()
            .map(|(name, labels)| RoutineSection {
                name: name.clone(),
                tasks: labels
                    .iter()
                    .map(|label| RoutineTask {
                        label: label.clone(),
                        done: false,
                    })
                    .collect(),
            })
            .collect();

        let plan = (FIRST_PLAN_HOUR..=LAST_PLAN_HOUR)
            .map(|hour| (hour_key(hour), String::new()))
            .collect();

        let goals = BTreeMap::from([
            (GoalSection::Focus, vec![]),
            (GoalSection::Todo, seeded_todos(date)),
        ]);

        let food = Meal::ALL.into_iter().map(|meal| (meal, vec![])).collect();

        Self {
            routine,
            plan,
            goals,
            food,
            water: 0,
        }
    }

    pub fn routine(&self) -> &[RoutineSection] {
        &self.routine
    }

    pub fn plan(&self) -> &BTreeMap<String, String> {
        &self.plan
    }

    pub fn goals(&self, section: GoalSection) -> &[Goal] {
        self.goals.get(&section).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn food(&self, meal: Meal) -> &[FoodLogEntry] {
        self.food.get(&meal).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn all_food(&self) -> &BTreeMap<Meal, Vec<FoodLogEntry>> {
        &self.food
    }

    pub fn water(&self) -> u64 {
        self.water
    }

    pub fn summarize(&self) -> DaySummary {
        DaySummary {
            tasks_done: self.routine.iter().map(RoutineSection::done_count).sum(),
            tasks_total: self.routine.iter().map(|v| v.tasks.len()).sum(),
            goals: GoalSection::ALL
                .into_iter()
                .map(|section| {
                    let goals = self.goals(section);
                    GoalProgress {
                        section,
                        done: goals.iter().filter(|v| v.done).count(),
                        total: goals.len(),
                    }
                })
                .collect(),
        }
    }
}

pub fn seeded_todos(date: NaiveDate) -> Vec<Goal> {
    if LAUNDRY_DAYS.contains(&date.weekday()) {
        vec![Goal::new(LAUNDRY)]
    } else {
        vec![]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalProgress {
    pub section: GoalSection,
    pub done: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub tasks_done: usize,
    pub tasks_total: usize,
    pub goals: Vec<GoalProgress>,
}

/// On-disk layout of a day record. Tasks and their completion flags are kept in two parallel
/// maps; conversion into [DayRecord] checks they line up.
#[derive(Debug, Serialize, Deserialize)]
struct DayFile {
    tasks: IndexMap<String, Vec<String>>,
    done: IndexMap<String, Vec<bool>>,
    #[serde(default)]
    plan: BTreeMap<String, String>,
    #[serde(default)]
    goals: BTreeMap<GoalSection, Vec<Goal>>,
    #[serde(default)]
    food: BTreeMap<Meal, Vec<FoodLogEntry>>,
    #[serde(default)]
    water: u64,
}

impl TryFrom<DayFile> for DayRecord {
    type Error = PlannerError;

    fn try_from(file: DayFile) -> Result<Self, Self::Error> {
        if let Some(extra) = file.done.keys().find(|name| !file.tasks.contains_key(*name)) {
            return Err(PlannerError::CorruptRecord(format!(
                "completion flags for unknown section '{extra}'"
            )));
        }

        let mut done = file.done;
        let routine = file
            .tasks
            .into_iter()
            .map(|(name, labels)| {
                let flags = done.swap_remove(&name).ok_or_else(|| {
                    PlannerError::CorruptRecord(format!("section '{name}' has no completion flags"))
                })?;
                if flags.len() != labels.len() {
                    return Err(PlannerError::CorruptRecord(format!(
                        "section '{name}' has {} tasks but {} completion flags",
                        labels.len(),
                        flags.len()
                    )));
                }
                let tasks = labels
                    .into_iter()
                    .zip(flags)
                    .map(|(label, done)| RoutineTask { label, done })
                    .collect();
                Ok(RoutineSection { name, tasks })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DayRecord {
            routine,
            plan: file.plan,
            goals: file.goals,
            food: file.food,
            water: file.water,
        })
    }
}

impl From<DayRecord> for DayFile {
    fn from(record: DayRecord) -> Self {
        let (tasks, done) = record
            .routine
            .into_iter()
            .map(|section| {
                let (labels, flags): (Vec<_>, Vec<_>) = section
                    .tasks
                    .into_iter()
                    .map(|task| (task.label, task.done))
                    .unzip();
                ((section.name.clone(), labels), (section.name, flags))
            })
            .unzip();
        DayFile {
            tasks,
            done,
            plan: record.plan,
            goals: record.goals,
            food: record.food,
            water: record.water,
        }
    }
}
