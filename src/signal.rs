use std::future::Future;
use std::thread::JoinHandle;

use terrachrone_core::pipeline::CancellationToken;
use tracing::warn;

use crate::error::CliError;

/// Cancel `token` on the first Ctrl-C; a second Ctrl-C exits at once
pub fn cancel_on_interrupt(token: CancellationToken) -> Result<(), CliError> {
    spawn_on_runtime(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupted, finishing the running searches (press Ctrl-C again to abort)");
        token.cancel();
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    })?;
    Ok(())
}

/// Drive `future` on a current-thread runtime owned by a detached thread
fn spawn_on_runtime<F>(future: F) -> std::io::Result<JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    std::thread::Builder::new()
        .name("interrupt".to_string())
        .spawn(move || runtime.block_on(future))
}
