// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal handling and turn draining for graceful shutdown.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::dispatcher::TurnDispatcher;

/// Returns a token cancelled on SIGINT or SIGTERM.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        wait_for_signal().await;
        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
            let _ = tokio::signal::ctrl_c().await;
            info!("received SIGINT (Ctrl+C), initiating shutdown");
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received SIGINT (Ctrl+C), initiating shutdown");
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM, initiating shutdown");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("received Ctrl+C, initiating shutdown");
}

/// Waits up to `timeout` for in-flight turns. Returns `false` on timeout.
pub async fn drain_turns(dispatcher: &TurnDispatcher, timeout: Duration) -> bool {
    let pending = dispatcher.in_flight();
    if pending == 0 {
        info!("no in-flight turns to drain");
        return true;
    }

    info!(count = pending, "draining in-flight turns");
    match tokio::time::timeout(timeout, dispatcher.drain()).await {
        Ok(()) => {
            info!("all turns drained");
            true
        }
        Err(_) => {
            warn!(
                remaining = dispatcher.in_flight(),
                "timeout reached, some turns interrupted"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn install_signal_handler_returns_token() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        token.cancel();
    }
}
