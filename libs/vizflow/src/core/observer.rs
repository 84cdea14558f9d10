// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Network change notification.
//!
//! Observers register on the network as `Arc<dyn NetworkObserver>` and are
//! called synchronously, in registration order. Structural mutations emit a
//! will/did pair per edit; `on_network_changed` is the coalesced aggregate
//! signal batched by the network lock. Implementations needing mutable state
//! use interior mutability behind the `&self` receivers.

use std::sync::Arc;

use crate::core::connection::PortConnection;
use crate::core::link::PropertyLink;

/// Callbacks fired by [`ProcessorNetwork`](crate::core::ProcessorNetwork)
/// on structural and lifecycle changes. All methods default to no-ops, so
/// implementations override only the events they care about.
pub trait NetworkObserver {
    fn on_will_add_processor(&self, _identifier: &str) {}
    fn on_did_add_processor(&self, _identifier: &str) {}
    fn on_will_remove_processor(&self, _identifier: &str) {}
    fn on_did_remove_processor(&self, _identifier: &str) {}

    fn on_will_add_connection(&self, _connection: &PortConnection) {}
    fn on_did_add_connection(&self, _connection: &PortConnection) {}
    fn on_will_remove_connection(&self, _connection: &PortConnection) {}
    fn on_did_remove_connection(&self, _connection: &PortConnection) {}

    fn on_will_add_link(&self, _link: &PropertyLink) {}
    fn on_did_add_link(&self, _link: &PropertyLink) {}
    fn on_will_remove_link(&self, _link: &PropertyLink) {}
    fn on_did_remove_link(&self, _link: &PropertyLink) {}

    /// Aggregate "something changed" signal, coalesced by the network lock.
    fn on_network_changed(&self) {}

    /// The invalidation set drained; the evaluation scheduler should run.
    fn on_evaluate_request(&self) {}

    /// A processor started (`delta > 0`) or finished (`delta < 0`)
    /// background jobs; `total` is the network-wide count afterwards.
    fn on_background_jobs_changed(&self, _processor: &str, _delta: i64, _total: i64) {}
}

/// Registration list; notification order is registration order.
#[derive(Default)]
pub(crate) struct ObserverList {
    observers: Vec<Arc<dyn NetworkObserver>>,
}

impl ObserverList {
    pub(crate) fn add(&mut self, observer: Arc<dyn NetworkObserver>) {
        if !self.observers.iter().any(|o| Arc::ptr_eq(o, &observer)) {
            self.observers.push(observer);
        }
    }

    pub(crate) fn remove(&mut self, observer: &Arc<dyn NetworkObserver>) {
        self.observers.retain(|o| !Arc::ptr_eq(o, observer));
    }

    pub(crate) fn notify(&self, f: impl Fn(&dyn NetworkObserver)) {
        for observer in &self.observers {
            f(observer.as_ref());
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.observers.len())
            .finish()
    }
}
