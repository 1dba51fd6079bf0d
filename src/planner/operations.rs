//! Mutations of a [DayRecord]. Every operation validates its input before touching the record,
//! so an `Err` always means the record is unchanged.

use super::{
    error::PlannerError,
    matcher::{find_matches, match_one},
    normalize::{GoalSection, Meal},
    nutrients::{compute_food_record, validate_weight, FoodDatabase, FoodLogEntry},
    record::{hour_key, DayRecord, Goal, FIRST_PLAN_HOUR, LAST_PLAN_HOUR},
};

/// Location of a routine task inside a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRef {
    pub section: String,
    pub index: usize,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskToggle {
    Changed { task: TaskRef, status: bool },
    /// Every matching task already had the requested status.
    Unchanged { status: bool, matches: Vec<TaskRef> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalToggle {
    pub section: GoalSection,
    pub index: usize,
    pub text: String,
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoodAdded {
    pub meal: Meal,
    pub entry: FoodLogEntry,
    pub auto_selected: bool,
}

/// Hours `[start, end)` that received a plan entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedRange {
    pub start: u32,
    pub end: u32,
}

impl DayRecord {
    fn task_refs(&self) -> Vec<TaskRef> {
        self.routine
            .iter()
            .flat_map(|section| {
                section
                    .tasks()
                    .iter()
                    .enumerate()
                    .map(|(index, task)| TaskRef {
                        section: section.name().to_string(),
                        index,
                        label: task.label.clone(),
                    })
            })
            .collect()
    }

    fn set_task_flag(&mut self, task: &TaskRef, status: bool) -> Result<(), PlannerError> {
        let flag = self
            .routine
            .iter_mut()
            .find(|section| section.name() == task.section)
            .and_then(|section| section.task_mut(task.index))
            .ok_or_else(|| PlannerError::TaskNotFound(task.label.clone()))?;
        flag.done = status;
        Ok(())
    }

    /// Checks (or unchecks) one routine task by label snippet. Among all matching tasks, in
    /// section order, the first one not already in the requested state is flipped. Repeating the
    /// call walks through duplicates like "Stretch" and "Stretch again" one at a time.
    pub fn toggle_task_by_name(
        &mut self,
        snippet: &str,
        status: bool,
    ) -> Result<TaskToggle, PlannerError> {
        let refs = self.task_refs();
        let matches = find_matches(&refs, |task| task.label.as_str(), snippet);
        if matches.is_empty() {
            return Err(PlannerError::TaskNotFound(snippet.to_string()));
        }

        let target = matches.iter().find(|(_, task)| {
            self.routine
                .iter()
                .find(|section| section.name() == task.section)
                .and_then(|section| section.tasks().get(task.index))
                .is_some_and(|current| current.done != status)
        });

        match target {
            Some((_, task)) => {
                let task = (*task).clone();
                self.set_task_flag(&task, status)?;
                Ok(TaskToggle::Changed { task, status })
            }
            None => Ok(TaskToggle::Unchanged {
                status,
                matches: matches.into_iter().map(|(_, task)| task.clone()).collect(),
            }),
        }
    }

    /// Sets a routine task by its position, as the web checkboxes do.
    pub fn set_task(
        &mut self,
        section: &str,
        index: usize,
        status: bool,
    ) -> Result<TaskRef, PlannerError> {
        let routine = self
            .routine
            .iter_mut()
            .find(|v| v.name() == section)
            .ok_or_else(|| PlannerError::UnknownRoutineSection(section.to_string()))?;
        let task = routine
            .task_mut(index)
            .ok_or_else(|| PlannerError::TaskNotFound(format!("{section} #{}", index + 1)))?;
        task.done = status;
        Ok(TaskRef {
            section: section.to_string(),
            index,
            label: task.label.clone(),
        })
    }

    pub fn toggle_goal_by_name(
        &mut self,
        section: GoalSection,
        snippet: &str,
        status: bool,
    ) -> Result<GoalToggle, PlannerError> {
        let goals = self
            .goals
            .get_mut(&section)
            .ok_or(PlannerError::UnknownGoalSection(section))?;
        let (index, _) =
            match_one(goals.as_slice(), |goal| goal.text.as_str(), snippet).into_result(snippet)?;
        let goal = &mut goals[index];
        goal.done = status;
        Ok(GoalToggle {
            section,
            index,
            text: goal.text.clone(),
            status,
        })
    }

    pub fn set_goal(
        &mut self,
        section: GoalSection,
        index: usize,
        status: bool,
    ) -> Result<GoalToggle, PlannerError> {
        let goal = self
            .goals
            .get_mut(&section)
            .ok_or(PlannerError::UnknownGoalSection(section))?
            .get_mut(index)
            .ok_or_else(|| PlannerError::NotFound(format!("{section} #{}", index + 1)))?;
        goal.done = status;
        Ok(GoalToggle {
            section,
            index,
            text: goal.text.clone(),
            status,
        })
    }

    pub fn add_goal(&mut self, section: GoalSection, text: &str) {
        self.goals.entry(section).or_default().push(Goal::new(text));
    }

    /// Assigns `task` to every hour in `[start, end)`. `end` defaults to `start + 1`. Earlier
    /// assignments in the range are overwritten.
    pub fn plan_hours(
        &mut self,
        task: &str,
        start: i64,
        end: Option<i64>,
    ) -> Result<PlannedRange, PlannerError> {
        let end = end.unwrap_or(start.saturating_add(1));
        if !(FIRST_PLAN_HOUR as i64 <= start && start < end && end <= LAST_PLAN_HOUR as i64) {
            return Err(PlannerError::InvalidTimeRange { start, end });
        }
        let range = PlannedRange {
            start: start as u32,
            end: end as u32,
        };
        for hour in range.start..range.end {
            self.plan.insert(hour_key(hour), task.to_string());
        }
        Ok(range)
    }

    /// Logs food by exact name or snippet. An ambiguous snippet fails with
    /// [PlannerError::Ambiguous]; the caller picks a candidate and retries with its exact name.
    pub fn add_food(
        &mut self,
        db: &FoodDatabase,
        meal: Meal,
        food: &str,
        weight_grams: f64,
    ) -> Result<FoodAdded, PlannerError> {
        validate_weight(weight_grams)?;
        let resolved = db.resolve(food)?;
        let entry = compute_food_record(resolved.name, resolved.info, weight_grams)?;
        self.food.entry(meal).or_default().push(entry.clone());
        Ok(FoodAdded {
            meal,
            entry,
            auto_selected: resolved.auto_selected,
        })
    }

    /// Adds drunk water and returns the new total. Negative amounts are rejected.
    pub fn add_water(&mut self, amount_ml: i64) -> Result<u64, PlannerError> {
        let amount = u64::try_from(amount_ml).map_err(|_| PlannerError::InvalidAmount(amount_ml))?;
        self.water = self.water.saturating_add(amount);
        Ok(self.water)
    }
}
