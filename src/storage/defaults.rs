use anyhow::{Context, Result};
use tracing::warn;

use crate::{
    fs::operations::{read_json, read_json_or_default, update_json},
    planner::{
        nutrients::{FoodDatabase, UserProfile},
        record::RoutineTemplate,
        PlannerError,
    },
    utils::dir::AppPaths,
};

/// The routine template is the only defaults file that must exist.
pub async fn load_routine_template(paths: &AppPaths) -> Result<RoutineTemplate> {
    let path = paths.routine_file();
    read_json(&path)
        .await
        .with_context(|| format!("Routine template {path:?} is required to create a day"))
}

pub async fn load_food_database(paths: &AppPaths) -> Result<FoodDatabase> {
    read_json_or_default(&paths.food_db_file()).await
}

pub async fn load_profile(paths: &AppPaths) -> Result<UserProfile> {
    let path = paths.profile_file();
    if !tokio::fs::try_exists(&path).await? {
        warn!("No user profile at {path:?}, nutrient targets are zero");
    }
    read_json_or_default(&path).await
}

/// Read-modify-write of the food database. The database isn't written when `modify` fails.
pub async fn update_food_database<R>(
    paths: &AppPaths,
    modify: impl FnOnce(&mut FoodDatabase) -> Result<R, PlannerError>,
) -> Result<R> {
    update_json(&paths.food_db_file(), modify).await
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::*;
    use crate::planner::nutrients::FoodInfo;

    #[tokio::test]
    async fn test_missing_defaults() -> Result<()> {
        let dir = tempdir()?;
        let paths = AppPaths::new(dir.path().to_owned());

        assert!(load_routine_template(&paths).await.is_err());
        assert!(load_food_database(&paths).await?.is_empty());
        assert_eq!(load_profile(&paths).await?, UserProfile::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_template_keeps_section_order() -> Result<()> {
        let dir = tempdir()?;
        let paths = AppPaths::new(dir.path().to_owned());
        std::fs::create_dir_all(paths.defaults_dir())?;
        std::fs::write(
            paths.routine_file(),
            r#"{"Morning": ["Run"], "Afternoon": ["Walk"], "Evening": ["Read"]}"#,
        )?;

        let template = load_routine_template(&paths).await?;

        let names: Vec<_> = template.sections().keys().map(String::as_str).collect();
        assert_eq!(names, ["Morning", "Afternoon", "Evening"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_food_database() -> Result<()> {
        let dir = tempdir()?;
        let paths = AppPaths::new(dir.path().to_owned());
        let egg = FoodInfo {
            protein: 13.,
            fat: 11.,
            carbon: 1.,
        };

        update_food_database(&paths, |db| db.add("Egg", egg)).await?;
        let err = update_food_database(&paths, |db| db.add("egg", egg))
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<PlannerError>(),
            Some(&PlannerError::FoodAlreadyExists("egg".into()))
        );
        let db = load_food_database(&paths).await?;
        assert_eq!(db.len(), 1);
        assert_eq!(db.get("egg"), Some(&egg));
        Ok(())
    }
}
