use std::path::PathBuf;

use anyhow::Result;

use crate::{
    tracking::reminder::{ReminderInterval, DEFAULT_REMINDER_INTERVAL},
    utils::dir::{create_application_default_path, ensure_dir},
};

pub const ENTRIES_FILE: &str = "time_entries.csv";
pub const BACKUP_FILE: &str = "time_entries.backup.csv";
pub const EXPORT_FILE: &str = "project_time_entries.pdf";
pub const LOG_DIR: &str = "logs";

/// Locations of everything llamatime reads and writes. All files live inside one data directory.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub reminder_interval: ReminderInterval,
}

impl AppConfig {
    /// Uses `dir` when given, the platform state directory otherwise. The directory is created
    /// if missing.
    pub fn resolve(dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match dir {
            Some(dir) => ensure_dir(dir)?,
            None => create_application_default_path()?,
        };
        Ok(Self::in_dir(data_dir))
    }

    pub fn in_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            reminder_interval: DEFAULT_REMINDER_INTERVAL,
        }
    }

    pub fn entries_path(&self) -> PathBuf {
        self.data_dir.join(ENTRIES_FILE)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.data_dir.join(BACKUP_FILE)
    }

    pub fn export_path(&self) -> PathBuf {
        self.data_dir.join(EXPORT_FILE)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::AppConfig;

    #[test]
    fn test_resolve_creates_dir() -> Result<()> {
        let dir = tempdir()?;
        let data_dir = dir.path().join("nested").join("llamatime");
        let config = AppConfig::resolve(Some(data_dir.clone()))?;

        assert!(data_dir.is_dir());
        assert_eq!(config.entries_path(), data_dir.join("time_entries.csv"));
        assert_eq!(config.backup_path(), data_dir.join("time_entries.backup.csv"));
        assert_eq!(config.export_path(), data_dir.join("project_time_entries.pdf"));
        assert_eq!(config.reminder_interval.minutes(), 30);
        Ok(())
    }
}
