// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Reentrant notification batching for network edits.
//!
//! Every structural mutation entry point takes a [`NetworkLock`] internally;
//! callers doing bulk edits take one explicitly via
//! [`ProcessorNetwork::lock`](crate::core::ProcessorNetwork::lock) so the
//! whole batch produces a single aggregate `on_network_changed`
//! notification. The lock is a same-context nesting counter, not a mutex:
//! it defers notifications, it does not guard against data races.

use std::ops::{Deref, DerefMut};

use crate::core::network::ProcessorNetwork;

/// Nesting counter plus the "anything changed in this scope" flag.
#[derive(Debug, Default)]
pub(crate) struct LockState {
    pub(crate) depth: u32,
    pub(crate) modified: bool,
}

/// Scoped guard batching change notifications.
///
/// Dereferences to the network, so edits go through the guard:
///
/// ```ignore
/// let mut net = network.lock();
/// net.add_connection(a, b)?;
/// net.add_connection(c, d)?;
/// // guard drops here; one on_network_changed fires
/// ```
///
/// Nesting is free: inner guards only decrement the counter, the outermost
/// guard flushes. If nothing was modified inside the scope, nothing fires.
pub struct NetworkLock<'a> {
    network: &'a mut ProcessorNetwork,
}

impl<'a> NetworkLock<'a> {
    pub(crate) fn new(network: &'a mut ProcessorNetwork) -> Self {
        network.lock_state_mut().depth += 1;
        Self { network }
    }
}

impl Deref for NetworkLock<'_> {
    type Target = ProcessorNetwork;

    fn deref(&self) -> &ProcessorNetwork {
        self.network
    }
}

impl DerefMut for NetworkLock<'_> {
    fn deref_mut(&mut self) -> &mut ProcessorNetwork {
        self.network
    }
}

impl Drop for NetworkLock<'_> {
    fn drop(&mut self) {
        let state = self.network.lock_state_mut();
        state.depth -= 1;
        if state.depth == 0 && std::mem::take(&mut state.modified) {
            self.network.flush_network_changed();
        }
    }
}
