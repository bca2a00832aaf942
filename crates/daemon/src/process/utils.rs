use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::ServiceConfig;

/// How long in-flight bucket requests get to finish after SIGTERM.
const REQUEST_GRACE_PERIOD: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
    /// A send on the shutdown sender, e.g. `ShutdownHandle::shutdown`
    Requested,
}

/// Wait for SIGINT, SIGTERM, or a send on `requested`, whichever comes first.
///
/// If the signal handlers cannot be installed only `requested` is watched.
pub async fn wait_for_shutdown(mut requested: watch::Receiver<()>) -> ShutdownReason {
    let (mut sigint, mut sigterm) =
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!("unable to install signal handlers: {}", e);
                let _ = requested.changed().await;
                return ShutdownReason::Requested;
            }
        };

    tokio::select! {
        _ = sigint.recv() => ShutdownReason::Interrupt,
        _ = sigterm.recv() => ShutdownReason::Terminate,
        _ = requested.changed() => ShutdownReason::Requested,
    }
}

/// Spawn the task that turns a signal into a shutdown broadcast.
///
/// Returns the task handle, the sender (for programmatic shutdown), and a
/// receiver every service task should watch.
pub fn graceful_shutdown_blocker() -> (JoinHandle<()>, watch::Sender<()>, watch::Receiver<()>) {
    let (tx, rx) = watch::channel(());
    let signal_tx = tx.clone();
    let requested = rx.clone();

    let handle = tokio::spawn(async move {
        let reason = wait_for_shutdown(requested).await;
        tracing::info!(?reason, "shutting down");

        match reason {
            // the requester has already notified every receiver
            ShutdownReason::Requested => return,
            ShutdownReason::Terminate => tokio::time::sleep(REQUEST_GRACE_PERIOD).await,
            ShutdownReason::Interrupt => {}
        }
        let _ = signal_tx.send(());
    });

    (handle, tx, rx)
}

/// Registers a panic hook that logs panics using the `tracing` crate
pub fn register_panic_logger() {
    std::panic::set_hook(Box::new(|panic| match panic.location() {
        Some(loc) => {
            tracing::error!(
                message = %panic,
                panic.file = loc.file(),
                panic.line = loc.line(),
                panic.column = loc.column(),
            );
        }
        None => tracing::error!(message = %panic),
    }));
}

pub fn report_startup(config: &ServiceConfig) {
    let build = common::prelude::build_info();

    tracing::info!(
        version = build.version,
        build_profile = build.build_profile,
        api = %config.api_listen_addr,
        admin = %config.admin_listen_addr,
        database = ?config.sqlite_path,
        max_buckets = config.endpoint.max_buckets,
        "strata starting up"
    );
}
