//! Line-oriented job id lists.

use std::path::Path;

use ftdemo_hal::JobId;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::SchedResult;

/// Read an id list; a missing file is an empty list.
pub async fn read_ids(path: &Path) -> SchedResult<Vec<JobId>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(JobId::from)
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(vec![]),
        Err(e) => Err(e.into()),
    }
}

/// Append one id.
pub async fn append_id(path: &Path, id: &JobId) -> SchedResult<()> {
    append_line(path, id.as_str()).await
}

/// Replace the list with `ids`.
pub async fn write_ids(path: &Path, ids: &[JobId]) -> SchedResult<()> {
    let content: String = ids.iter().map(|id| format!("{id}\n")).collect();
    fs::write(path, content).await?;
    Ok(())
}

/// Append one line to a text file, creating it if needed.
pub(crate) async fn append_line(path: &Path, line: &str) -> SchedResult<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path).await?;
    file.write_all(format!("{line}\n").as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_list_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_ids(&dir.path().join("none.txt")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_and_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        append_id(&path, &JobId::from("a")).await.unwrap();
        append_id(&path, &JobId::from("b")).await.unwrap();
        assert_eq!(read_ids(&path).await.unwrap(), vec![JobId::from("a"), JobId::from("b")]);

        write_ids(&path, &[JobId::from("b")]).await.unwrap();
        assert_eq!(read_ids(&path).await.unwrap(), vec![JobId::from("b")]);
    }
}
