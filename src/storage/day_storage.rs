use std::{io::ErrorKind, path::PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use tokio::fs::File;
use tracing::{debug, info, instrument};

use crate::{
    fs::operations::{overwrite, read_to_string_from_start, to_pretty_json},
    planner::{DayRecord, PlannerError},
    utils::time::record_file_name,
};

/// Interface for abstracting storage of day records.
#[async_trait]
pub trait DayStorage: Send + Sync {
    type DayFile: DayFileHandle;

    /// Whether a record exists for `date`, active or archived.
    async fn exists(&self, date: NaiveDate) -> Result<bool>;

    /// Persists a brand new record. Fails with [PlannerError::AlreadyExists] if any record for the
    /// date is already stored.
    async fn create(&self, date: NaiveDate, record: &DayRecord) -> Result<()>;

    /// Reads a record under a shared lock.
    async fn load(&self, date: NaiveDate) -> Result<DayRecord>;

    /// Opens a record for modification. The returned handle holds an exclusive lock until it is
    /// released or dropped.
    async fn open(&self, date: NaiveDate) -> Result<Self::DayFile>;

    /// Moves an active record into the archive and returns its new location.
    async fn archive(&self, date: NaiveDate) -> Result<PathBuf>;
}

#[async_trait]
pub trait DayFileHandle: Send {
    async fn read(&mut self) -> Result<DayRecord>;
    async fn write(&mut self, record: &DayRecord) -> Result<()>;
    fn date(&self) -> NaiveDate;
    async fn release(self) -> Result<()>;
}

/// The main realization of [DayStorage].
pub struct DayStorageImpl {
    record_dir: PathBuf,
    archive_dir: PathBuf,
}

impl DayStorageImpl {
    pub fn new(record_dir: PathBuf, archive_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&record_dir)?;
        std::fs::create_dir_all(&archive_dir)?;

        Ok(Self {
            record_dir,
            archive_dir,
        })
    }

    fn active_path(&self, date: NaiveDate) -> PathBuf {
        self.record_dir.join(record_file_name(date))
    }

    fn archived_path(&self, date: NaiveDate) -> PathBuf {
        self.archive_dir.join(record_file_name(date))
    }

    /// Active records shadow archived ones.
    async fn locate(&self, date: NaiveDate) -> Result<Option<PathBuf>> {
        for path in [self.active_path(date), self.archived_path(date)] {
            if tokio::fs::try_exists(&path).await? {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    async fn locate_existing(&self, date: NaiveDate) -> Result<PathBuf> {
        self.locate(date)
            .await?
            .ok_or_else(|| PlannerError::RecordNotFound(date).into())
    }
}

#[async_trait]
impl DayStorage for DayStorageImpl {
    type DayFile = DayRecordFile;

    async fn exists(&self, date: NaiveDate) -> Result<bool> {
        Ok(self.locate(date).await?.is_some())
    }

    #[instrument(skip(self, record))]
    async fn create(&self, date: NaiveDate, record: &DayRecord) -> Result<()> {
        if tokio::fs::try_exists(self.archived_path(date)).await? {
            return Err(PlannerError::AlreadyExists(date).into());
        }

        let path = self.active_path(date);
        let mut file = match File::options()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(PlannerError::AlreadyExists(date).into())
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to create {path:?}")),
        };

        file.lock_exclusive()?;
        let result = overwrite(&mut file, &to_pretty_json(record)?).await;
        file.unlock_async().await?;
        result?;
        info!("Created day record {path:?}");
        Ok(())
    }

    async fn load(&self, date: NaiveDate) -> Result<DayRecord> {
        let path = self.locate_existing(date).await?;
        debug!("Loading {path:?}");
        let mut file = File::open(&path)
            .await
            .with_context(|| format!("Failed to open {path:?}"))?;
        file.lock_shared()?;
        let contents = read_to_string_from_start(&mut file).await;
        file.unlock_async().await?;
        parse_record(&contents?)
    }

    async fn open(&self, date: NaiveDate) -> Result<Self::DayFile> {
        let path = self.locate_existing(date).await?;
        let file = File::options()
            .read(true)
            .write(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open {path:?}"))?;
        file.lock_exclusive()?;
        debug!("Locked {path:?}");
        Ok(DayRecordFile { file, date })
    }

    #[instrument(skip(self))]
    async fn archive(&self, date: NaiveDate) -> Result<PathBuf> {
        let source = self.active_path(date);
        if !tokio::fs::try_exists(&source).await? {
            return Err(PlannerError::RecordNotFound(date).into());
        }
        let target = self.archived_path(date);
        if tokio::fs::try_exists(&target).await? {
            return Err(PlannerError::AlreadyExists(date).into());
        }
        tokio::fs::rename(&source, &target)
            .await
            .with_context(|| format!("Failed to move {source:?} to {target:?}"))?;
        info!("Archived {source:?} to {target:?}");
        Ok(target)
    }
}

fn parse_record(contents: &str) -> Result<DayRecord> {
    serde_json::from_str(contents).map_err(|e| PlannerError::CorruptRecord(e.to_string()).into())
}

/// An exclusively locked day file.
pub struct DayRecordFile {
    file: File,
    date: NaiveDate,
}

#[async_trait]
impl DayFileHandle for DayRecordFile {
    async fn read(&mut self) -> Result<DayRecord> {
        parse_record(&read_to_string_from_start(&mut self.file).await?)
    }

    async fn write(&mut self, record: &DayRecord) -> Result<()> {
        overwrite(&mut self.file, &to_pretty_json(record)?).await?;
        Ok(())
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    async fn release(self) -> Result<()> {
        self.file.unlock_async().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::*;
    use crate::planner::record::tests::{monday, test_template};

    fn storage(dir: &std::path::Path) -> Result<DayStorageImpl> {
        Ok(DayStorageImpl::new(
            dir.join("days"),
            dir.join("archive"),
        )?)
    }

    #[tokio::test]
    async fn test_create_then_load() -> Result<()> {
        let dir = tempdir()?;
        let storage = storage(dir.path())?;
        let record = DayRecord::init(monday(), &test_template());

        assert!(!storage.exists(monday()).await?);
        storage.create(monday(), &record).await?;

        assert!(storage.exists(monday()).await?);
        assert_eq!(storage.load(monday()).await?, record);
        assert!(dir.path().join("days").join("2025-03-03.json").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_twice_fails() -> Result<()> {
        let dir = tempdir()?;
        let storage = storage(dir.path())?;
        let record = DayRecord::init(monday(), &test_template());
        storage.create(monday(), &record).await?;

        let err = storage.create(monday(), &record).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<PlannerError>(),
            Some(&PlannerError::AlreadyExists(monday()))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_load_missing() -> Result<()> {
        let dir = tempdir()?;
        let storage = storage(dir.path())?;

        let err = storage.load(monday()).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<PlannerError>(),
            Some(&PlannerError::RecordNotFound(monday()))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_modify_through_handle() -> Result<()> {
        let dir = tempdir()?;
        let storage = storage(dir.path())?;
        storage
            .create(monday(), &DayRecord::init(monday(), &test_template()))
            .await?;

        let mut handle = storage.open(monday()).await?;
        let mut record = handle.read().await?;
        record.add_water(250)?;
        handle.write(&record).await?;
        handle.release().await?;

        assert_eq!(storage.load(monday()).await?.water(), 250);
        Ok(())
    }

    #[tokio::test]
    async fn test_archived_record_stays_reachable() -> Result<()> {
        let dir = tempdir()?;
        let storage = storage(dir.path())?;
        let record = DayRecord::init(monday(), &test_template());
        storage.create(monday(), &record).await?;

        let archived = storage.archive(monday()).await?;

        assert_eq!(archived, dir.path().join("archive").join("2025-03-03.json"));
        assert!(!dir.path().join("days").join("2025-03-03.json").exists());
        assert_eq!(storage.load(monday()).await?, record);
        let err = storage.create(monday(), &record).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<PlannerError>(),
            Some(&PlannerError::AlreadyExists(monday()))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_record() -> Result<()> {
        let dir = tempdir()?;
        let storage = storage(dir.path())?;
        std::fs::write(
            dir.path().join("days").join("2025-03-03.json"),
            r#"{"tasks": {"Morning": ["Run"]}, "done": {"Morning": []}}"#,
        )?;

        let err = storage.load(monday()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PlannerError>(),
            Some(PlannerError::CorruptRecord(_))
        ));
        Ok(())
    }
}
