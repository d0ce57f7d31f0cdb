// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SIGINT handling.
//!
//! Every SIGINT is forwarded as [`WatchEvent::Interrupt`]; the receiver
//! decides what a second one means.

use crossbeam_channel::Sender;

use crate::error::{Error, Result};
use crate::watch::WatchEvent;

/// Install the process-wide handler. Can only succeed once per process.
pub fn install(events: Sender<WatchEvent>) -> Result<()> {
    ctrlc::set_handler(move || {
        tracing::debug!("SIGINT received");
        let _ = events.send(WatchEvent::Interrupt);
    })
    .map_err(|e| Error::Internal(format!("cannot install SIGINT handler: {e}")))
}
