//! In-process ordering of file access. The advisory file locks only order separate processes and
//! waiting on one blocks the calling thread, so tasks of this process queue here first.

use std::{collections::HashMap, sync::Arc};

use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

#[derive(Default)]
pub struct FileLocks {
    days: Mutex<HashMap<NaiveDate, Arc<RwLock<()>>>>,
    food_database: Arc<RwLock<()>>,
}

impl FileLocks {
    async fn day(&self, date: NaiveDate) -> Arc<RwLock<()>> {
        self.days.lock().await.entry(date).or_default().clone()
    }

    pub async fn read_day(&self, date: NaiveDate) -> OwnedRwLockReadGuard<()> {
        self.day(date).await.read_owned().await
    }

    pub async fn write_day(&self, date: NaiveDate) -> OwnedRwLockWriteGuard<()> {
        self.day(date).await.write_owned().await
    }

    pub async fn read_food_database(&self) -> OwnedRwLockReadGuard<()> {
        self.food_database.clone().read_owned().await
    }

    pub async fn write_food_database(&self) -> OwnedRwLockWriteGuard<()> {
        self.food_database.clone().write_owned().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn test_days_are_independent() {
        let locks = FileLocks::default();
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();

        let _writer = locks.write_day(monday).await;
        assert!(timeout(Duration::from_millis(50), locks.write_day(tuesday))
            .await
            .is_ok());
        assert!(timeout(Duration::from_millis(50), locks.read_day(monday))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_readers_share() {
        let locks = FileLocks::default();
        let _first = locks.read_food_database().await;
        assert!(timeout(Duration::from_millis(50), locks.read_food_database())
            .await
            .is_ok());
        assert!(timeout(Duration::from_millis(50), locks.write_food_database())
            .await
            .is_err());
    }
}
