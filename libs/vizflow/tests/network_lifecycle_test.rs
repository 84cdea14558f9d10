// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Network Lifecycle Integration Test
//!
//! Verifies the observable behavior of the network over its whole life:
//! 1. Identifier assignment under collision
//! 2. Connection and link legality, idempotence of re-adds
//! 3. Cascade cleanup when a processor is removed
//! 4. Notification batching under the network lock
//! 5. Invalidation accounting and background-job reporting
//!
//! Uses only public APIs; the recording observer below is test-only.

use std::sync::Arc;

use parking_lot::Mutex;
use vizflow::{
    Inport, InvalidationLevel, NetworkObserver, Outport, PortConnection, PortRef, Processor,
    ProcessorNetwork, Property, PropertyLink, PropertyPath, PropertyValue,
};

// =============================================================================
// Test-only observer
// =============================================================================

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    fn push(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    fn count(&self, prefix: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    fn clear(&self) {
        self.events.lock().clear();
    }
}

impl NetworkObserver for RecordingObserver {
    fn on_will_add_processor(&self, identifier: &str) {
        self.push(format!("will_add_processor:{identifier}"));
    }
    fn on_did_add_processor(&self, identifier: &str) {
        self.push(format!("did_add_processor:{identifier}"));
    }
    fn on_will_remove_processor(&self, identifier: &str) {
        self.push(format!("will_remove_processor:{identifier}"));
    }
    fn on_did_remove_processor(&self, identifier: &str) {
        self.push(format!("did_remove_processor:{identifier}"));
    }
    fn on_will_add_connection(&self, connection: &PortConnection) {
        self.push(format!("will_add_connection:{connection}"));
    }
    fn on_did_add_connection(&self, connection: &PortConnection) {
        self.push(format!("did_add_connection:{connection}"));
    }
    fn on_will_remove_connection(&self, connection: &PortConnection) {
        self.push(format!("will_remove_connection:{connection}"));
    }
    fn on_did_remove_connection(&self, connection: &PortConnection) {
        self.push(format!("did_remove_connection:{connection}"));
    }
    fn on_will_add_link(&self, link: &PropertyLink) {
        self.push(format!("will_add_link:{link}"));
    }
    fn on_did_add_link(&self, link: &PropertyLink) {
        self.push(format!("did_add_link:{link}"));
    }
    fn on_will_remove_link(&self, link: &PropertyLink) {
        self.push(format!("will_remove_link:{link}"));
    }
    fn on_did_remove_link(&self, link: &PropertyLink) {
        self.push(format!("did_remove_link:{link}"));
    }
    fn on_network_changed(&self) {
        self.push("network_changed");
    }
    fn on_evaluate_request(&self) {
        self.push("evaluate_request");
    }
    fn on_background_jobs_changed(&self, processor: &str, delta: i64, total: i64) {
        self.push(format!("jobs:{processor}:{delta}:{total}"));
    }
}

// -----------------------------------------------------------------------------
// Test fixtures
// -----------------------------------------------------------------------------

fn source(identifier: &str) -> Processor {
    Processor::new("test.Source", identifier)
        .with_outport(Outport::new("out", "image"))
        .with_property(Property::new("scale", PropertyValue::Float(1.0)))
}

fn sink(identifier: &str) -> Processor {
    Processor::new("test.Sink", identifier)
        .with_inport(Inport::new("in", "image"))
        .with_property(Property::new("scale", PropertyValue::Float(1.0)))
}

fn observed_network() -> (ProcessorNetwork, Arc<RecordingObserver>) {
    let mut network = ProcessorNetwork::new();
    let observer = Arc::new(RecordingObserver::default());
    network.add_observer(observer.clone());
    (network, observer)
}

// -----------------------------------------------------------------------------
// Identifier assignment
// -----------------------------------------------------------------------------

#[test]
fn test_colliding_identifiers_get_distinct_assignments() {
    let (mut network, _observer) = observed_network();

    let p1 = network.add_processor(source("foo"));
    let p2 = network.add_processor(sink("foo"));

    assert_eq!(p1, "foo");
    assert_eq!(p2, "foo2");

    // Both resident, both reachable under their assigned identifiers.
    assert!(network.processor("foo").is_some());
    assert!(network.processor("foo2").is_some());
}

#[test]
fn test_scenario_collide_connect_remove() {
    // The full scenario: add P1 ("foo"), add P2 (also "foo") => "foo2",
    // connect P1.out -> P2.in, remove P1 => connection gone, only P2 left.
    let (mut network, _observer) = observed_network();

    let p1 = network.add_processor(source("foo"));
    let p2 = network.add_processor(sink("foo"));
    assert_eq!(p2, "foo2");

    let out = PortRef::new(&p1, "out");
    let inp = PortRef::new(&p2, "in");
    network.add_connection(&out, &inp).unwrap();
    assert!(network.is_connected(&out, &inp));

    let removed = network.remove_processor(&p1);
    assert!(removed.is_some());
    assert!(!network.is_connected(&out, &inp));

    let remaining: Vec<&str> = network.processors().map(|p| p.identifier()).collect();
    assert_eq!(remaining, vec!["foo2"]);
}

// -----------------------------------------------------------------------------
// Idempotence & notification pairs
// -----------------------------------------------------------------------------

#[test]
fn test_readding_connection_is_observably_identical() {
    let (mut network, observer) = observed_network();
    network.add_processor(source("a"));
    network.add_processor(sink("b"));
    let out = PortRef::new("a", "out");
    let inp = PortRef::new("b", "in");

    network.add_connection(&out, &inp).unwrap();
    network.add_connection(&out, &inp).unwrap();

    assert_eq!(network.connections().len(), 1);
    assert_eq!(observer.count("will_add_connection"), 1);
    assert_eq!(observer.count("did_add_connection"), 1);
}

#[test]
fn test_readding_link_is_observably_identical() {
    let (mut network, observer) = observed_network();
    network.add_processor(source("a"));
    network.add_processor(sink("b"));
    let src = PropertyPath::parse("a.scale").unwrap();
    let dst = PropertyPath::parse("b.scale").unwrap();

    network.add_link(&src, &dst).unwrap();
    network.add_link(&src, &dst).unwrap();

    assert_eq!(network.links().count(), 1);
    assert_eq!(observer.count("will_add_link"), 1);
    assert_eq!(observer.count("did_add_link"), 1);
}

#[test]
fn test_removing_missing_edges_is_silent() {
    let (mut network, observer) = observed_network();
    network.add_processor(source("a"));
    network.add_processor(sink("b"));
    observer.clear();

    network.remove_connection(&PortRef::new("a", "out"), &PortRef::new("b", "in"));
    network.remove_link(
        &PropertyPath::parse("a.scale").unwrap(),
        &PropertyPath::parse("b.scale").unwrap(),
    );

    assert_eq!(observer.count("will_remove"), 0);
    assert_eq!(observer.count("network_changed"), 0);
}

// -----------------------------------------------------------------------------
// Cascade on removal
// -----------------------------------------------------------------------------

#[test]
fn test_removal_cascades_exactly_its_own_edges() {
    let (mut network, observer) = observed_network();
    network.add_processor(source("a"));
    network.add_processor(source("other"));
    network.add_processor(
        Processor::new("test.Sink", "b")
            .with_inport(Inport::new("in", "image").with_max_connections(2))
            .with_property(Property::new("scale", PropertyValue::Float(1.0))),
    );

    let a_out = PortRef::new("a", "out");
    let other_out = PortRef::new("other", "out");
    let b_in = PortRef::new("b", "in");
    network.add_connection(&a_out, &b_in).unwrap();
    network.add_connection(&other_out, &b_in).unwrap();

    let a_scale = PropertyPath::parse("a.scale").unwrap();
    let other_scale = PropertyPath::parse("other.scale").unwrap();
    let b_scale = PropertyPath::parse("b.scale").unwrap();
    network.add_link(&a_scale, &b_scale).unwrap();
    network.add_link(&other_scale, &b_scale).unwrap();
    observer.clear();

    network.remove_processor("a");

    // Exactly a's edges went away, the other processor's survived.
    assert_eq!(observer.count("did_remove_connection"), 1);
    assert_eq!(observer.count("did_remove_link"), 1);
    assert!(!network.is_connected(&a_out, &b_in));
    assert!(network.is_connected(&other_out, &b_in));
    assert!(!network.is_linked(&a_scale, &b_scale));
    assert!(network.is_linked(&other_scale, &b_scale));
}

// -----------------------------------------------------------------------------
// Lock batching
// -----------------------------------------------------------------------------

#[test]
fn test_lock_coalesces_changed_notifications() {
    let (mut network, observer) = observed_network();

    {
        let mut net = network.lock();
        net.add_processor(source("a"));
        net.add_processor(sink("b"));
        net.add_connection(&PortRef::new("a", "out"), &PortRef::new("b", "in"))
            .unwrap();
        net.add_link(
            &PropertyPath::parse("a.scale").unwrap(),
            &PropertyPath::parse("b.scale").unwrap(),
        )
        .unwrap();
        assert_eq!(observer.count("network_changed"), 0);
    }

    assert_eq!(observer.count("network_changed"), 1);
    // Per-edit will/did pairs still fired inside the scope.
    assert_eq!(observer.count("did_add_processor"), 2);
    assert_eq!(observer.count("did_add_connection"), 1);
    assert_eq!(observer.count("did_add_link"), 1);
}

#[test]
fn test_empty_lock_scope_is_silent() {
    let (mut network, observer) = observed_network();
    {
        let _net = network.lock();
    }
    assert_eq!(observer.count("network_changed"), 0);
}

#[test]
fn test_unlocked_mutations_notify_individually() {
    let (mut network, observer) = observed_network();
    network.add_processor(source("a"));
    network.add_processor(sink("b"));
    assert_eq!(observer.count("network_changed"), 2);
}

// -----------------------------------------------------------------------------
// Invalidation & background jobs
// -----------------------------------------------------------------------------

#[test]
fn test_invalidation_requests_evaluation() {
    let (mut network, observer) = observed_network();
    network.add_processor(source("a"));
    network.add_processor(sink("b"));
    network
        .add_connection(&PortRef::new("a", "out"), &PortRef::new("b", "in"))
        .unwrap();
    observer.clear();

    network.invalidate("a", InvalidationLevel::InvalidOutput);

    assert_eq!(observer.count("evaluate_request"), 1);
    assert!(!network.is_invalidating());
    assert_eq!(
        network.processor("b").map(|p| p.invalidation()),
        Some(InvalidationLevel::InvalidOutput)
    );
}

#[test]
fn test_background_job_accounting() {
    let (mut network, observer) = observed_network();
    network.add_processor(source("a"));
    observer.clear();

    network.start_background_jobs("a", 2);
    assert_eq!(network.background_jobs(), 2);
    network.start_background_jobs("a", 1);
    assert_eq!(network.background_jobs(), 3);
    network.finish_background_jobs("a", 3);
    assert_eq!(network.background_jobs(), 0);

    let events = observer.events.lock().clone();
    assert_eq!(
        events,
        vec!["jobs:a:2:2", "jobs:a:1:3", "jobs:a:-3:0"]
    );
}

// -----------------------------------------------------------------------------
// Property propagation through the observer's eyes
// -----------------------------------------------------------------------------

#[test]
fn test_property_change_emits_one_changed_event() {
    let (mut network, observer) = observed_network();
    network.add_processor(source("a"));
    network.add_processor(sink("b"));
    let src = PropertyPath::parse("a.scale").unwrap();
    let dst = PropertyPath::parse("b.scale").unwrap();
    network.add_link(&src, &dst).unwrap();
    network.add_link(&dst, &src).unwrap();
    observer.clear();

    network
        .set_property_value(&src, PropertyValue::Float(5.0))
        .unwrap();

    // Cycle terminated, both sides converged, one aggregate notification.
    assert_eq!(network.property_value(&dst), Some(PropertyValue::Float(5.0)));
    assert_eq!(observer.count("network_changed"), 1);
}
