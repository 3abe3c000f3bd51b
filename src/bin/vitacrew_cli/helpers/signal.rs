// ABOUTME: Ctrl-C handling for the vitacrew CLI
// ABOUTME: Cancels the run's token so the runner stops at the current stage and keeps partial output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Cancel `token` on the first Ctrl-C
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            () = token.cancelled() => {}
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => {
                    warn!("Interrupt received; abandoning the current stage");
                    token.cancel();
                }
                Err(e) => error!("Failed to listen for Ctrl-C: {e}"),
            },
        }
    });
}
