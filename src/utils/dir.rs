use std::{env, path::PathBuf};

use anyhow::{Context, Result};

/// Default location of the entries file, backups, exports and logs. Honours `XDG_STATE_HOME`
/// and falls back to `$HOME/.local/state`.
pub fn create_application_default_path() -> Result<PathBuf> {
    let path = {
        #[cfg(windows)]
        {
            let mut path = PathBuf::from(env::var("APPDATA").context("APPDATA is not set")?);
            path.push("llamatime");
            path
        }
        #[cfg(not(windows))]
        {
            let mut path = env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .context("Couldn't find neither XDG_STATE_HOME nor HOME")?;
            path.push("llamatime");
            path
        }
    };

    ensure_dir(path)
}

/// Creates `path` with its parents. A directory that already exists is fine, a `--dir` pointing
/// at a regular file is not.
pub fn ensure_dir(path: PathBuf) -> Result<PathBuf> {
    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create data directory {path:?}"))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::ensure_dir;

    #[test]
    fn test_ensure_dir() -> Result<()> {
        let dir = tempdir()?;
        let data_dir = dir.path().join("state").join("llamatime");

        assert_eq!(ensure_dir(data_dir.clone())?, data_dir);
        assert_eq!(ensure_dir(data_dir.clone())?, data_dir);

        let file = dir.path().join("time_entries.csv");
        std::fs::write(&file, "")?;
        assert!(ensure_dir(file).is_err());
        Ok(())
    }
}
