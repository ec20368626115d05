use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{self, AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;

/// Reads the whole file under a shared lock. A missing file is reported as `None`, because for
/// the entries file that simply means nothing has been recorded yet.
pub async fn read_locked(path: &Path) -> Result<Option<Vec<u8>>, io::Error> {
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    file.lock_shared()?;
    let mut buffer = Vec::new();
    let result = file.read_to_end(&mut buffer).await;
    file.unlock_async().await?;
    result?;
    debug!("Read {} bytes from {path:?}", buffer.len());
    Ok(Some(buffer))
}

/// Replaces `path` with `contents`. Data is written to a sibling temporary file which is synced
/// and then renamed over the target, so a crash leaves either the old or the new file.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), io::Error> {
    let temp = temp_path(path);
    let mut file = File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp)
        .await?;

    file.lock_exclusive()?;
    let result = async {
        file.write_all(contents).await?;
        file.flush().await?;
        file.sync_all().await
    }
    .await;
    file.unlock_async().await?;
    drop(file);

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e);
    }

    tokio::fs::rename(&temp, path).await?;
    debug!("Wrote {} bytes to {path:?}", contents.len());
    Ok(())
}

/// Copies `from` over `to` atomically. Fails with `NotFound` when there is nothing to copy.
pub async fn copy_atomic(from: &Path, to: &Path) -> Result<(), io::Error> {
    let Some(contents) = read_locked(from).await? else {
        return Err(io::Error::new(
            ErrorKind::NotFound,
            format!("{} does not exist", from.display()),
        ));
    };
    write_atomic(to, &contents).await
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|v| v.to_os_string())
        .unwrap_or_else(|| OsString::from("llamatime"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{copy_atomic, read_locked, temp_path, write_atomic};

    #[tokio::test]
    async fn test_read_missing_file() -> Result<()> {
        let dir = tempdir()?;
        assert_eq!(read_locked(&dir.path().join("missing.csv")).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_write_atomic_replaces_contents() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("entries.csv");

        write_atomic(&path, b"first version, much longer than the second\n").await?;
        write_atomic(&path, b"second\n").await?;

        assert_eq!(read_locked(&path).await?, Some(b"second\n".to_vec()));
        assert!(!temp_path(&path).exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_copy_atomic() -> Result<()> {
        let dir = tempdir()?;
        let from = dir.path().join("entries.csv");
        let to = dir.path().join("backup.csv");

        assert!(copy_atomic(&from, &to).await.is_err());

        write_atomic(&from, b"a,b\n").await?;
        copy_atomic(&from, &to).await?;
        assert_eq!(read_locked(&to).await?, Some(b"a,b\n".to_vec()));
        Ok(())
    }
}
