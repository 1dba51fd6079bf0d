use std::{io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use fs4::tokio::AsyncFileExt;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs::File,
    io::{self, AsyncReadExt, AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt},
};
use tracing::debug;

/// Replaces the whole content of an open file. The file must have been opened for writing.
pub async fn overwrite(file: &mut File, contents: &[u8]) -> Result<(), io::Error> {
    file.set_len(0).await?;
    write_from_start(file, contents).await
}

async fn write_from_start(
    file: &mut (impl AsyncSeek + AsyncWrite + Unpin),
    contents: &[u8],
) -> Result<(), io::Error> {
    file.seek(std::io::SeekFrom::Start(0)).await?;
    file.write_all(contents).await?;
    file.flush().await
}

pub async fn read_to_string_from_start(file: &mut File) -> Result<String, io::Error> {
    file.seek(std::io::SeekFrom::Start(0)).await?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).await?;
    Ok(contents)
}

pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}

/// Reads a JSON document under a shared lock.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut file = File::open(path)
        .await
        .with_context(|| format!("Failed to open {path:?}"))?;
    file.lock_shared()?;
    let contents = read_to_string_from_start(&mut file).await;
    file.unlock_async().await?;
    serde_json::from_str(&contents?).with_context(|| format!("Failed to parse {path:?}"))
}

/// Like [read_json], but a missing file yields `T::default()`.
pub async fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match File::open(path).await {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{path:?} doesn't exist, using defaults");
            Ok(T::default())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to open {path:?}")),
        Ok(_) => read_json(path).await,
    }
}

/// Read-modify-write of a JSON document under an exclusive lock. A missing or empty file starts
/// from `T::default()`. Nothing is written when `modify` fails.
pub async fn update_json<T, R, E>(path: &Path, modify: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R>
where
    T: DeserializeOwned + Serialize + Default,
    E: Into<anyhow::Error>,
{
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = File::options()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await
        .with_context(|| format!("Failed to open {path:?}"))?;
    file.lock_exclusive()?;
    let result = update_locked(&mut file, path, modify).await;
    file.unlock_async().await?;
    result
}

async fn update_locked<T, R, E>(
    file: &mut File,
    path: &Path,
    modify: impl FnOnce(&mut T) -> Result<R, E>,
) -> Result<R>
where
    T: DeserializeOwned + Serialize + Default,
    E: Into<anyhow::Error>,
{
    let contents = read_to_string_from_start(file).await?;
    let mut value = if contents.trim().is_empty() {
        T::default()
    } else {
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse {path:?}"))?
    };
    let result = modify(&mut value).map_err(Into::into)?;
    overwrite(file, &to_pretty_json(&value)?).await?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use anyhow::{anyhow, Result};
    use tempfile::tempdir;

    use super::*;

    type Counts = BTreeMap<String, u32>;

    #[tokio::test]
    async fn test_update_json_creates_and_updates() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("counts.json");

        update_json(&path, |counts: &mut Counts| {
            counts.insert("a".into(), 1);
            Ok::<_, anyhow::Error>(())
        })
        .await?;
        let total = update_json(&path, |counts: &mut Counts| {
            *counts.entry("a".into()).or_default() += 2;
            Ok::<_, anyhow::Error>(counts.values().sum::<u32>())
        })
        .await?;

        assert_eq!(total, 3);
        let stored: Counts = read_json(&path).await?;
        assert_eq!(stored.get("a"), Some(&3));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_json_failure_keeps_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("counts.json");
        std::fs::write(&path, r#"{"a": 1}"#)?;

        let result = update_json(&path, |counts: &mut Counts| {
            counts.insert("b".into(), 2);
            Err::<(), _>(anyhow!("rejected"))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&path)?, r#"{"a": 1}"#);
        Ok(())
    }

    #[tokio::test]
    async fn test_overwrite_shrinks_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("file.json");
        std::fs::write(&path, "a much longer previous content")?;

        let mut file = File::options().read(true).write(true).open(&path).await?;
        overwrite(&mut file, b"short").await?;
        drop(file);

        assert_eq!(std::fs::read_to_string(&path)?, "short");
        Ok(())
    }

    #[tokio::test]
    async fn test_read_json_or_default_missing() -> Result<()> {
        let dir = tempdir()?;
        let counts: Counts = read_json_or_default(&dir.path().join("missing.json")).await?;
        assert!(counts.is_empty());
        Ok(())
    }
}
