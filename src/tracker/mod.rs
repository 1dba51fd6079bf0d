//! Load-transform-persist façade shared by the CLI and the HTTP API. Each operation takes the
//! target date explicitly and touches exactly one day file.

pub mod git;
pub mod locks;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::{
    planner::{
        normalize::{GoalSection, Meal},
        nutrients::{daily_targets, search_food_database, DailyTargets, FoodInfo, SortMode},
        operations::{FoodAdded, GoalToggle, PlannedRange, TaskRef, TaskToggle},
        DayRecord, PlannerError,
    },
    storage::{
        day_storage::{DayFileHandle, DayStorage, DayStorageImpl},
        defaults::{
            load_food_database, load_profile, load_routine_template, update_food_database,
        },
    },
    utils::dir::AppPaths,
};

use locks::FileLocks;

/// Most results a food search returns.
pub const MAX_FOOD_RESULTS: usize = 10;

/// The tracker over the file system used by both front ends.
pub type AppTracker = Tracker<DayStorageImpl>;

pub struct Tracker<S> {
    paths: AppPaths,
    storage: S,
    locks: FileLocks,
}

impl Tracker<DayStorageImpl> {
    /// Tracker over the standard directory layout of `paths`.
    pub fn open(paths: AppPaths) -> Result<Self> {
        let storage = DayStorageImpl::new(paths.days_dir(), paths.archive_dir())?;
        Ok(Self::new(paths, storage))
    }
}

impl<S: DayStorage> Tracker<S> {
    pub fn new(paths: AppPaths, storage: S) -> Self {
        Self {
            paths,
            storage,
            locks: FileLocks::default(),
        }
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    #[instrument(skip(self))]
    pub async fn init(&self, date: NaiveDate) -> Result<DayRecord> {
        let _guard = self.locks.write_day(date).await;
        if self.storage.exists(date).await? {
            return Err(PlannerError::AlreadyExists(date).into());
        }
        let template = load_routine_template(&self.paths).await?;
        let record = DayRecord::init(date, &template);
        self.storage.create(date, &record).await?;
        Ok(record)
    }

    pub async fn load(&self, date: NaiveDate) -> Result<DayRecord> {
        let _guard = self.locks.read_day(date).await;
        self.storage.load(date).await
    }

    /// Loads the record, creating it from the template first if it doesn't exist yet.
    pub async fn load_or_init(&self, date: NaiveDate) -> Result<DayRecord> {
        if self.storage.exists(date).await? {
            return self.load(date).await;
        }
        match self.init(date).await {
            Ok(record) => Ok(record),
            // Someone else created it in the meantime.
            Err(e) if matches!(
                e.downcast_ref::<PlannerError>(),
                Some(PlannerError::AlreadyExists(_))
            ) =>
            {
                self.load(date).await
            }
            Err(e) => Err(e),
        }
    }

    /// Runs `operation` on the stored record while holding the file lock. The record is only
    /// written back when `operation` succeeds.
    async fn modify<R: Send>(
        &self,
        date: NaiveDate,
        operation: impl FnOnce(&mut DayRecord) -> Result<R, PlannerError> + Send,
    ) -> Result<R> {
        let _guard = self.locks.write_day(date).await;
        let mut handle = self.storage.open(date).await?;
        let result = Self::modify_locked(&mut handle, operation).await;
        handle.release().await?;
        result
    }

    async fn modify_locked<R: Send>(
        handle: &mut S::DayFile,
        operation: impl FnOnce(&mut DayRecord) -> Result<R, PlannerError> + Send,
    ) -> Result<R> {
        let mut record = handle.read().await?;
        let result = operation(&mut record)?;
        handle.write(&record).await?;
        debug!("Updated record for {}", handle.date());
        Ok(result)
    }

    pub async fn check_task(
        &self,
        date: NaiveDate,
        snippet: &str,
        status: bool,
    ) -> Result<TaskToggle> {
        self.modify(date, |record| record.toggle_task_by_name(snippet, status))
            .await
    }

    pub async fn set_task(
        &self,
        date: NaiveDate,
        section: &str,
        index: usize,
        status: bool,
    ) -> Result<TaskRef> {
        self.modify(date, |record| record.set_task(section, index, status))
            .await
    }

    pub async fn check_goal(
        &self,
        date: NaiveDate,
        section: GoalSection,
        snippet: &str,
        status: bool,
    ) -> Result<GoalToggle> {
        self.modify(date, |record| {
            record.toggle_goal_by_name(section, snippet, status)
        })
        .await
    }

    pub async fn set_goal(
        &self,
        date: NaiveDate,
        section: GoalSection,
        index: usize,
        status: bool,
    ) -> Result<GoalToggle> {
        self.modify(date, |record| record.set_goal(section, index, status))
            .await
    }

    pub async fn add_goal(&self, date: NaiveDate, section: GoalSection, text: &str) -> Result<()> {
        self.modify(date, |record| {
            record.add_goal(section, text);
            Ok(())
        })
        .await
    }

    pub async fn plan(
        &self,
        date: NaiveDate,
        task: &str,
        start: i64,
        end: Option<i64>,
    ) -> Result<PlannedRange> {
        self.modify(date, |record| record.plan_hours(task, start, end))
            .await
    }

    pub async fn add_food(
        &self,
        date: NaiveDate,
        meal: Meal,
        food: &str,
        weight_grams: f64,
    ) -> Result<FoodAdded> {
        let db = {
            let _guard = self.locks.read_food_database().await;
            load_food_database(&self.paths).await?
        };
        self.modify(date, |record| record.add_food(&db, meal, food, weight_grams))
            .await
    }

    pub async fn add_water(&self, date: NaiveDate, amount_ml: i64) -> Result<u64> {
        self.modify(date, |record| record.add_water(amount_ml)).await
    }

    #[instrument(skip(self, info))]
    pub async fn add_food_info(&self, name: &str, info: FoodInfo) -> Result<()> {
        let _guard = self.locks.write_food_database().await;
        update_food_database(&self.paths, |db| db.add(name, info)).await?;
        info!("Added {name} to the food database");
        Ok(())
    }

    /// Foods whose name contains `query`, in database order, at most [MAX_FOOD_RESULTS].
    pub async fn search_food(&self, query: &str) -> Result<Vec<(String, FoodInfo)>> {
        let query = query.to_lowercase();
        if query.is_empty() {
            return Ok(vec![]);
        }
        let db = {
            let _guard = self.locks.read_food_database().await;
            load_food_database(&self.paths).await?
        };
        Ok(search_food_database(&db, &query)
            .into_iter()
            .take(MAX_FOOD_RESULTS)
            .filter_map(|(_, name)| {
                let info = *db.get(&name)?;
                Some((name, info))
            })
            .collect())
    }

    /// Reorders the food database file, returns the number of entries.
    pub async fn sort_food(&self, mode: SortMode) -> Result<usize> {
        let _guard = self.locks.write_food_database().await;
        update_food_database(&self.paths, |db| {
            db.sort(mode);
            Ok(db.len())
        })
        .await
    }

    pub async fn targets(&self) -> Result<DailyTargets> {
        Ok(daily_targets(&load_profile(&self.paths).await?))
    }

    /// Moves the day file into the archive and, if `publish` is set, commits and pushes it.
    /// A failing git step doesn't undo the move and is returned separately.
    #[instrument(skip(self))]
    pub async fn archive(&self, date: NaiveDate, publish: bool) -> Result<ArchiveOutcome> {
        let path = {
            let _guard = self.locks.write_day(date).await;
            self.storage.archive(date).await?
        };
        let published = if publish {
            let relative = path
                .strip_prefix(self.paths.root())
                .map(|v| v.to_owned())
                .unwrap_or_else(|_| path.clone());
            Some(git::commit_and_push(self.paths.root(), &relative).await)
        } else {
            None
        };
        Ok(ArchiveOutcome { path, published })
    }
}

#[derive(Debug)]
pub struct ArchiveOutcome {
    pub path: PathBuf,
    /// `None` when publishing wasn't requested.
    pub published: Option<Result<()>>,
}

#[cfg(test)]
pub(crate) mod tests {
    use anyhow::Result;
    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::{planner::record::tests::monday, utils::logging::TEST_LOGGING};

    pub(crate) const ROUTINE: &str =
        r#"{"Morning": ["Drink water", "Stretch", "Run"], "Evening": ["Read", "Stretch again"]}"#;
    pub(crate) const FOOD_DB: &str = r#"{
        "egg": {"protein": 13, "fat": 11, "carbon": 1},
        "egg white": {"protein": 11, "fat": 0.2, "carbon": 0.7},
        "chicken breast": {"protein": 31, "fat": 3.6, "carbon": 0}
    }"#;

    /// Tracker over a temporary directory with routine template and food database in place.
    pub(crate) fn test_tracker() -> Result<(TempDir, Tracker<DayStorageImpl>)> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let paths = AppPaths::new(dir.path().to_owned());
        std::fs::create_dir_all(paths.defaults_dir())?;
        std::fs::write(paths.routine_file(), ROUTINE)?;
        std::fs::write(paths.food_db_file(), FOOD_DB)?;
        Ok((dir, Tracker::open(paths)?))
    }

    fn planner_error(e: &anyhow::Error) -> Option<&PlannerError> {
        e.downcast_ref()
    }

    #[tokio::test]
    async fn test_init_once() -> Result<()> {
        let (_dir, tracker) = test_tracker()?;

        let record = tracker.init(monday()).await?;
        assert_eq!(record.summarize().tasks_total, 5);

        let err = tracker.init(monday()).await.unwrap_err();
        assert_eq!(
            planner_error(&err),
            Some(&PlannerError::AlreadyExists(monday()))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_init_without_template() -> Result<()> {
        let dir = tempdir()?;
        let tracker = Tracker::open(AppPaths::new(dir.path().to_owned()))?;
        assert!(tracker.init(monday()).await.is_err());
        assert!(!tracker.storage.exists(monday()).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_operations_need_record() -> Result<()> {
        let (_dir, tracker) = test_tracker()?;
        let err = tracker.add_water(monday(), 100).await.unwrap_err();
        assert_eq!(
            planner_error(&err),
            Some(&PlannerError::RecordNotFound(monday()))
        );
        assert_eq!(
            err.to_string(),
            "No planner for 2025-03-03. Run 'init' first"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_check_twice() -> Result<()> {
        let (_dir, tracker) = test_tracker()?;
        tracker.init(monday()).await?;

        let first = tracker.check_task(monday(), "read", true).await?;
        let second = tracker.check_task(monday(), "read", true).await?;

        assert!(matches!(first, TaskToggle::Changed { .. }));
        assert!(matches!(second, TaskToggle::Unchanged { .. }));
        let record = tracker.load(monday()).await?;
        assert!(record.routine()[1].tasks()[0].done);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_operation_keeps_file() -> Result<()> {
        let (dir, tracker) = test_tracker()?;
        tracker.init(monday()).await?;
        let path = dir.path().join("days").join("2025-03-03.json");
        let before = std::fs::read_to_string(&path)?;

        let err = tracker.plan(monday(), "gym", 3, None).await.unwrap_err();
        assert_eq!(
            planner_error(&err),
            Some(&PlannerError::InvalidTimeRange { start: 3, end: 4 })
        );
        assert_eq!(std::fs::read_to_string(&path)?, before);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_food_and_water() -> Result<()> {
        let (_dir, tracker) = test_tracker()?;
        tracker.init(monday()).await?;

        let added = tracker
            .add_food(monday(), Meal::Lunch, "chicken", 200.)
            .await?;
        assert!(added.auto_selected);
        assert_eq!(added.entry.name, "chicken breast");
        assert_eq!(added.entry.protein, 62.);

        let err = tracker
            .add_food(monday(), Meal::Lunch, "eg", 100.)
            .await
            .unwrap_err();
        assert!(matches!(
            planner_error(&err),
            Some(PlannerError::Ambiguous { .. })
        ));

        assert_eq!(tracker.add_water(monday(), 300).await?, 300);
        assert_eq!(tracker.add_water(monday(), 0).await?, 300);

        let record = tracker.load(monday()).await?;
        assert_eq!(record.food(Meal::Lunch).len(), 1);
        assert_eq!(record.water(), 300);
        Ok(())
    }

    #[tokio::test]
    async fn test_food_database_maintenance() -> Result<()> {
        let (_dir, tracker) = test_tracker()?;

        tracker
            .add_food_info(
                "Oats",
                FoodInfo {
                    protein: 13.,
                    fat: 7.,
                    carbon: 68.,
                },
            )
            .await?;
        assert_eq!(tracker.search_food("OAT").await?[0].0, "oats");
        assert_eq!(tracker.search_food("egg").await?.len(), 2);
        assert!(tracker.search_food("").await?.is_empty());

        assert_eq!(tracker.sort_food(SortMode::Carbon).await?, 4);
        let names: Vec<_> = tracker
            .search_food("e")
            .await?
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["egg", "egg white", "chicken breast"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_or_init() -> Result<()> {
        let (_dir, tracker) = test_tracker()?;
        let created = tracker.load_or_init(monday()).await?;
        tracker.add_water(monday(), 50).await?;
        let loaded = tracker.load_or_init(monday()).await?;
        assert_eq!(created.water(), 0);
        assert_eq!(loaded.water(), 50);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_writes_to_one_day() -> Result<()> {
        let (_dir, tracker) = test_tracker()?;
        tracker.init(monday()).await?;

        let (first, second) = tokio::join!(
            tracker.add_water(monday(), 100),
            tracker.add_water(monday(), 200)
        );
        first?;
        second?;

        assert_eq!(tracker.load(monday()).await?.water(), 300);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_reads_and_writes() -> Result<()> {
        let (_dir, tracker) = test_tracker()?;
        tracker.init(monday()).await?;

        let (record, water, food_info, sorted, found) = tokio::join!(
            tracker.load(monday()),
            tracker.add_water(monday(), 100),
            tracker.add_food_info("Oats", FoodInfo::default()),
            tracker.sort_food(SortMode::Name),
            tracker.search_food("egg")
        );
        record?;
        food_info?;
        assert_eq!(water?, 100);
        assert!((3..=4).contains(&sorted?));
        assert_eq!(found?.len(), 2);

        assert_eq!(tracker.load(monday()).await?.water(), 100);
        assert_eq!(tracker.search_food("oat").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_food_limit() -> Result<()> {
        let (_dir, tracker) = test_tracker()?;
        for i in 0..12 {
            tracker
                .add_food_info(&format!("bean {i}"), FoodInfo::default())
                .await?;
        }
        let found = tracker.search_food("bean").await?;
        assert_eq!(found.len(), MAX_FOOD_RESULTS);
        assert_eq!(found[0].0, "bean 0");
        Ok(())
    }

    #[tokio::test]
    async fn test_archive_without_git() -> Result<()> {
        let (dir, tracker) = test_tracker()?;
        tracker.init(monday()).await?;

        let outcome = tracker.archive(monday(), false).await?;

        assert_eq!(outcome.path, dir.path().join("archive").join("2025-03-03.json"));
        assert!(outcome.published.is_none());
        tracker.add_water(monday(), 10).await?;
        assert_eq!(tracker.load(monday()).await?.water(), 10);
        Ok(())
    }
}
