// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `storebot serve` command implementation.
//!
//! Starts the HTTP gateway over SQLite storage, the Fireworks model, the
//! product catalog and the store directory. On SIGINT or SIGTERM the server
//! stops accepting requests and in-flight turns are drained.

use std::time::Duration;

use storebot_agent::shutdown;
use storebot_config::model::StorebotConfig;
use storebot_core::StorebotError;
use storebot_gateway::{AppState, start_server};
use tracing::{info, warn};

use crate::stack::Stack;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn run_serve(config: StorebotConfig) -> Result<(), StorebotError> {
    let stack = Stack::build(&config).await?;
    let cancel = shutdown::install_signal_handler();

    let state = AppState::new(
        stack.storage.clone(),
        stack.dispatcher.clone(),
        config.agent.name.clone(),
        &config.gateway,
    );
    info!(environment = %config.gateway.environment, "storebot serve starting");
    start_server(&config.gateway, state, cancel).await?;

    if !shutdown::drain_turns(&stack.dispatcher, DRAIN_TIMEOUT).await {
        warn!("shutting down with unfinished turns");
    }
    stack.storage.close().await?;

    info!("storebot serve shutdown complete");
    Ok(())
}
