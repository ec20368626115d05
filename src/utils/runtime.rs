use anyhow::Result;

/// Runtime for every command. The tracking loop, the reminder task and the stdin reader all share
/// its one thread.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
