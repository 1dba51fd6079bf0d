use std::{
    env, io,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};

pub const APP_NAME: &str = "dayplan";
/// Overrides the application directory when `--dir` isn't given.
pub const DIR_ENV: &str = "DAYPLAN_DIR";

pub fn create_application_default_path() -> Result<PathBuf> {
    let path = match env::var(DIR_ENV) {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => platform_state_dir()?.join(APP_NAME),
    };

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}

#[cfg(windows)]
fn platform_state_dir() -> Result<PathBuf> {
    env::var("APPDATA")
        .map(PathBuf::from)
        .map_err(|_| anyhow!("APPDATA should be present on Windows"))
}

#[cfg(not(windows))]
fn platform_state_dir() -> Result<PathBuf> {
    env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|home| PathBuf::from(home).join(".local/state")))
        .map_err(|_| anyhow!("Couldn't find neither XDG_STATE_HOME nor HOME"))
}

/// Layout of the application directory.
///
/// ```text
/// <root>/defaults/routine.json       routine template used by `init`
/// <root>/defaults/food_db.json       nutrients per 100 g
/// <root>/defaults/user_profile.json  body measurements and target factors
/// <root>/days/<date>.json            active day records
/// <root>/archive/<date>.json         archived day records
/// <root>/logs/                       rolling log files
/// ```
#[derive(Debug, Clone)]
pub struct AppPaths {
    root: PathBuf,
}

impl AppPaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Uses `dir` when given, the default application directory otherwise.
    pub fn resolve(dir: Option<PathBuf>) -> Result<Self> {
        let root = dir.map_or_else(create_application_default_path, Ok)?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn days_dir(&self) -> PathBuf {
        self.root.join("days")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.root.join("archive")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn defaults_dir(&self) -> PathBuf {
        self.root.join("defaults")
    }

    pub fn routine_file(&self) -> PathBuf {
        self.defaults_dir().join("routine.json")
    }

    pub fn food_db_file(&self) -> PathBuf {
        self.defaults_dir().join("food_db.json")
    }

    pub fn profile_file(&self) -> PathBuf {
        self.defaults_dir().join("user_profile.json")
    }
}
