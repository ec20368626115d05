use std::{io::ErrorKind, path::Path};

use tracing::info;

use crate::{
    error::Result,
    fs::operations::{copy_atomic, read_locked, write_atomic},
};

use super::entry_store::{parse_entries, EntryStore};

/// Copies the entries file of `store` to `backup_path`.
pub async fn backup(store: &EntryStore, backup_path: &Path) -> Result<()> {
    copy_atomic(store.path(), backup_path).await?;
    info!("Backed up {:?} to {backup_path:?}", store.path());
    Ok(())
}

/// Replaces the entries file with the backup and reloads `store`. The backup has to parse as an
/// entries file, otherwise nothing is touched.
pub async fn restore(store: &mut EntryStore, backup_path: &Path) -> Result<()> {
    let Some(contents) = read_locked(backup_path).await? else {
        return Err(std::io::Error::new(
            ErrorKind::NotFound,
            format!("no backup at {}", backup_path.display()),
        )
        .into());
    };
    parse_entries(&contents)?;
    write_atomic(store.path(), &contents).await?;
    store.load().await?;
    info!("Restored {} entries from {backup_path:?}", store.len());
    Ok(())
}
