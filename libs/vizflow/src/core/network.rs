// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! The processor network.
//!
//! [`ProcessorNetwork`] is the aggregate root of the dataflow graph: it owns
//! the processors (keyed by unique identifier), the port connections, the
//! property links, and the observer list. All structural mutation goes
//! through it so the graph invariants hold at every step:
//!
//! - no two resident processors share an identifier;
//! - every connection and link references endpoints whose owning processor
//!   is currently registered;
//! - removing a processor first severs everything that touches it.
//!
//! Processors are stored as node weights in a stable graph; the
//! identifier map holds stable node indices, so renaming a processor is an
//! O(1) re-key that invalidates nothing. Port connections are mirrored three
//! ways: as graph edges (for downstream traversal), in a hash map (for O(1)
//! membership), and in an insertion-ordered vec (for deterministic
//! serialization).

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use tracing::debug;

use crate::core::connection::PortConnection;
use crate::core::error::{NetworkError, Result};
use crate::core::identifier::{find_unique_identifier, strip_identifier};
use crate::core::link::PropertyLink;
use crate::core::link_evaluator::LinkEvaluator;
use crate::core::lock::{LockState, NetworkLock};
use crate::core::observer::{NetworkObserver, ObserverList};
use crate::core::ports::{Inport, Outport, PortRef};
use crate::core::processor::{InvalidationLevel, Processor};
use crate::core::property::{Property, PropertyPath, PropertyValue};
use crate::core::visitor::NetworkVisitor;

pub struct ProcessorNetwork {
    graph: StableDiGraph<Processor, PortConnection>,
    ids: HashMap<String, NodeIndex>,
    connections: HashMap<PortConnection, EdgeIndex>,
    connections_vec: Vec<PortConnection>,
    links: HashSet<PropertyLink>,
    link_evaluator: LinkEvaluator,
    observers: ObserverList,
    lock_state: LockState,
    /// Processors currently mid-invalidation, in entry order.
    invalidating: Vec<String>,
    background_jobs: AtomicI64,
    pub(crate) deserializing: bool,
}

impl ProcessorNetwork {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            ids: HashMap::new(),
            connections: HashMap::new(),
            connections_vec: Vec::new(),
            links: HashSet::new(),
            link_evaluator: LinkEvaluator::new(),
            observers: ObserverList::default(),
            lock_state: LockState::default(),
            invalidating: Vec::new(),
            background_jobs: AtomicI64::new(0),
            deserializing: false,
        }
    }

    // ---------------------------------------------------------------------
    // Locking & notification plumbing
    // ---------------------------------------------------------------------

    /// Take the network lock for a batch of edits.
    ///
    /// The guard dereferences to the network; when the outermost guard
    /// drops, a single aggregate `on_network_changed` fires if anything was
    /// modified inside the scope.
    pub fn lock(&mut self) -> NetworkLock<'_> {
        NetworkLock::new(self)
    }

    pub fn is_locked(&self) -> bool {
        self.lock_state.depth > 0
    }

    pub(crate) fn lock_state_mut(&mut self) -> &mut LockState {
        &mut self.lock_state
    }

    pub(crate) fn flush_network_changed(&mut self) {
        self.observers.notify(|o| o.on_network_changed());
    }

    /// Aggregate change signal: deferred to the outermost lock exit while
    /// locked, immediate otherwise.
    pub(crate) fn notify_network_changed(&mut self) {
        if self.lock_state.depth > 0 {
            self.lock_state.modified = true;
        } else {
            self.flush_network_changed();
        }
    }

    fn notify(&self, f: impl Fn(&dyn NetworkObserver)) {
        self.observers.notify(f);
    }

    pub fn add_observer(&mut self, observer: Arc<dyn NetworkObserver>) {
        self.observers.add(observer);
    }

    pub fn remove_observer(&mut self, observer: &Arc<dyn NetworkObserver>) {
        self.observers.remove(observer);
    }

    // ---------------------------------------------------------------------
    // Processors
    // ---------------------------------------------------------------------

    /// Register a processor and return the identifier it was assigned.
    ///
    /// The requested identifier is stripped of disallowed characters and
    /// made unique by suffix probing, so registration never fails. The
    /// processor enters the network with `InvalidResources` so dependent
    /// caches rebuild before first use.
    pub fn add_processor(&mut self, mut processor: Processor) -> String {
        let base = strip_identifier(processor.identifier());
        let identifier = find_unique_identifier(&base, |id| !self.ids.contains_key(id));
        processor.set_identifier(&identifier);
        processor.raise_invalidation(InvalidationLevel::InvalidResources);

        let mut net = self.lock();
        net.notify(|o| o.on_will_add_processor(&identifier));
        let idx = net.graph.add_node(processor);
        net.ids.insert(identifier.clone(), idx);
        debug!(processor = %identifier, "added processor");
        net.notify(|o| o.on_did_add_processor(&identifier));
        net.notify_network_changed();
        identifier
    }

    /// Remove a processor and hand it back to the caller.
    ///
    /// Unknown identifiers are a no-op returning `None`. Otherwise every
    /// connection touching the processor is removed first (outports, then
    /// inports), then every link involving it, then the node itself.
    pub fn remove_processor(&mut self, identifier: &str) -> Option<Processor> {
        let idx = *self.ids.get(identifier)?;
        let id = identifier.to_string();
        let mut net = self.lock();

        let outgoing: Vec<PortConnection> = net
            .connections_vec
            .iter()
            .filter(|c| c.outport().processor() == id)
            .cloned()
            .collect();
        for c in outgoing {
            net.remove_connection(c.outport(), c.inport());
        }
        let incoming: Vec<PortConnection> = net
            .connections_vec
            .iter()
            .filter(|c| c.inport().processor() == id)
            .cloned()
            .collect();
        for c in incoming {
            net.remove_connection(c.outport(), c.inport());
        }

        let involved: Vec<PropertyLink> = net
            .links
            .iter()
            .filter(|l| l.involves_processor(&id))
            .cloned()
            .collect();
        for l in involved {
            net.remove_link(l.src(), l.dst());
        }

        net.notify(|o| o.on_will_remove_processor(&id));
        net.ids.remove(&id);
        let mut processor = net.graph.remove_node(idx)?;
        processor.detach_widget();
        net.invalidating.retain(|i| i != &id);
        debug!(processor = %id, "removed processor");
        net.notify(|o| o.on_did_remove_processor(&id));
        net.notify_network_changed();
        Some(processor)
    }

    pub fn processor(&self, identifier: &str) -> Option<&Processor> {
        let idx = self.ids.get(identifier)?;
        self.graph.node_weight(*idx)
    }

    pub fn processors(&self) -> impl Iterator<Item = &Processor> {
        self.graph.node_weights()
    }

    /// Mutable access for deserialization's in-place updates; structural
    /// edits still go through the network methods.
    pub(crate) fn processor_mut(&mut self, identifier: &str) -> Option<&mut Processor> {
        let idx = *self.ids.get(identifier)?;
        self.graph.node_weight_mut(idx)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Rename a processor. The new identifier is stripped and made unique
    /// like on registration; the map re-key is O(1) and every connection and
    /// link record referencing the old identifier is rewritten.
    pub fn set_processor_identifier(&mut self, identifier: &str, requested: &str) -> Result<String> {
        let idx = *self
            .ids
            .get(identifier)
            .ok_or_else(|| NetworkError::ProcessorNotFound(identifier.to_string()))?;

        let base = strip_identifier(requested);
        let unique =
            find_unique_identifier(&base, |id| id == identifier || !self.ids.contains_key(id));
        if unique == identifier {
            return Ok(unique);
        }

        let old = identifier.to_string();
        let mut net = self.lock();
        net.ids.remove(&old);
        net.ids.insert(unique.clone(), idx);
        if let Some(p) = net.graph.node_weight_mut(idx) {
            p.set_identifier(&unique);
        }

        net.connections_vec
            .iter_mut()
            .for_each(|c| c.rename_processor(&old, &unique));
        let rekeyed: HashMap<PortConnection, EdgeIndex> =
            std::mem::take(&mut net.connections)
                .into_iter()
                .map(|(mut conn, edge)| {
                    conn.rename_processor(&old, &unique);
                    (conn, edge)
                })
                .collect();
        net.connections = rekeyed;
        let edges: Vec<EdgeIndex> = net.connections.values().copied().collect();
        for edge in edges {
            if let Some(weight) = net.graph.edge_weight_mut(edge) {
                weight.rename_processor(&old, &unique);
            }
        }

        net.links = std::mem::take(&mut net.links)
            .into_iter()
            .map(|mut link| {
                link.rename_processor(&old, &unique);
                link
            })
            .collect();
        net.link_evaluator.clear();
        let links: Vec<PropertyLink> = net.links.iter().cloned().collect();
        for link in &links {
            net.link_evaluator.add_link(link);
        }

        for entry in net.invalidating.iter_mut() {
            if entry == &old {
                *entry = unique.clone();
            }
        }

        debug!(from = %old, to = %unique, "renamed processor");
        net.notify_network_changed();
        Ok(unique)
    }

    pub fn set_processor_display_name(&mut self, identifier: &str, name: &str) -> Result<()> {
        let idx = *self
            .ids
            .get(identifier)
            .ok_or_else(|| NetworkError::ProcessorNotFound(identifier.to_string()))?;
        if let Some(p) = self.graph.node_weight_mut(idx) {
            p.set_display_name(name);
        }
        self.notify_network_changed();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Connections
    // ---------------------------------------------------------------------

    /// Connect an outport to an inport.
    ///
    /// Either port not being resident in the network is a hard error (a
    /// precondition violation, not a recoverable condition). A connection
    /// that already exists, or that the destination port rejects (type or
    /// arity), is a silent no-op.
    pub fn add_connection(&mut self, outport: &PortRef, inport: &PortRef) -> Result<()> {
        let legal = {
            let out_decl = self.resolve_outport(outport)?;
            let in_decl = self.resolve_inport(inport)?;
            in_decl.can_connect_to(out_decl, self.inbound_count(inport))
        };
        let connection = PortConnection::new(outport.clone(), inport.clone());
        if self.connections.contains_key(&connection) || !legal {
            return Ok(());
        }

        let mut net = self.lock();
        net.notify(|o| o.on_will_add_connection(&connection));
        if let (Some(&from), Some(&to)) = (
            net.ids.get(connection.outport().processor()),
            net.ids.get(connection.inport().processor()),
        ) {
            let edge = net.graph.add_edge(from, to, connection.clone());
            net.connections.insert(connection.clone(), edge);
        }
        net.connections_vec.push(connection.clone());
        debug!(connection = %connection, "added connection");
        net.notify(|o| o.on_did_add_connection(&connection));
        net.notify_network_changed();
        Ok(())
    }

    /// Disconnect an outport from an inport. Unknown pairs are a no-op.
    pub fn remove_connection(&mut self, outport: &PortRef, inport: &PortRef) {
        let connection = PortConnection::new(outport.clone(), inport.clone());
        let Some(&edge) = self.connections.get(&connection) else {
            return;
        };
        let mut net = self.lock();
        net.notify(|o| o.on_will_remove_connection(&connection));
        net.graph.remove_edge(edge);
        net.connections.remove(&connection);
        net.connections_vec.retain(|c| c != &connection);
        debug!(connection = %connection, "removed connection");
        net.notify(|o| o.on_did_remove_connection(&connection));
        net.notify_network_changed();
    }

    pub fn is_connected(&self, outport: &PortRef, inport: &PortRef) -> bool {
        self.connections
            .contains_key(&PortConnection::new(outport.clone(), inport.clone()))
    }

    /// Connections in insertion order.
    pub fn connections(&self) -> &[PortConnection] {
        &self.connections_vec
    }

    fn inbound_count(&self, inport: &PortRef) -> usize {
        self.connections_vec
            .iter()
            .filter(|c| c.inport() == inport)
            .count()
    }

    fn resolve_outport(&self, port: &PortRef) -> Result<&Outport> {
        self.processor(port.processor())
            .and_then(|p| p.outport(port.port()))
            .ok_or_else(|| NetworkError::OutportNotInNetwork {
                processor: port.processor().to_string(),
                port: port.port().to_string(),
            })
    }

    fn resolve_inport(&self, port: &PortRef) -> Result<&Inport> {
        self.processor(port.processor())
            .and_then(|p| p.inport(port.port()))
            .ok_or_else(|| NetworkError::InportNotInNetwork {
                processor: port.processor().to_string(),
                port: port.port().to_string(),
            })
    }

    /// Remove an inport from a live processor, severing its connections
    /// first. Unknown ports are a no-op.
    pub fn remove_inport(&mut self, port: &PortRef) {
        if self
            .processor(port.processor())
            .and_then(|p| p.inport(port.port()))
            .is_none()
        {
            return;
        }
        let mut net = self.lock();
        net.remove_connections_touching(port);
        let idx = net.ids[port.processor()];
        if let Some(p) = net.graph.node_weight_mut(idx) {
            p.remove_inport(port.port());
        }
        net.notify_network_changed();
    }

    /// Remove an outport from a live processor, severing its connections
    /// first. Unknown ports are a no-op.
    pub fn remove_outport(&mut self, port: &PortRef) {
        if self
            .processor(port.processor())
            .and_then(|p| p.outport(port.port()))
            .is_none()
        {
            return;
        }
        let mut net = self.lock();
        net.remove_connections_touching(port);
        let idx = net.ids[port.processor()];
        if let Some(p) = net.graph.node_weight_mut(idx) {
            p.remove_outport(port.port());
        }
        net.notify_network_changed();
    }

    fn remove_connections_touching(&mut self, port: &PortRef) {
        let touching: Vec<PortConnection> = self
            .connections_vec
            .iter()
            .filter(|c| c.involves_port(port))
            .cloned()
            .collect();
        for c in touching {
            self.remove_connection(c.outport(), c.inport());
        }
    }

    // ---------------------------------------------------------------------
    // Links
    // ---------------------------------------------------------------------

    /// Link `src` to `dst` so value changes on `src` propagate to `dst`.
    ///
    /// Either property not being resident is a hard error. An existing or
    /// illegal link (unconvertible kinds, read-only destination) is a
    /// silent no-op.
    pub fn add_link(&mut self, src: &PropertyPath, dst: &PropertyPath) -> Result<()> {
        let legal = {
            let src_prop = self.resolve_property(src)?;
            let dst_prop = self.resolve_property(dst)?;
            self.link_evaluator.can_link(src_prop, dst_prop)
        };
        let link = PropertyLink::new(src.clone(), dst.clone());
        if self.links.contains(&link) || !legal {
            return Ok(());
        }

        let mut net = self.lock();
        net.notify(|o| o.on_will_add_link(&link));
        net.links.insert(link.clone());
        net.link_evaluator.add_link(&link);
        debug!(link = %link, "added link");
        net.notify(|o| o.on_did_add_link(&link));
        net.notify_network_changed();
        Ok(())
    }

    /// Remove the link `src` → `dst`. Unknown links are a no-op.
    pub fn remove_link(&mut self, src: &PropertyPath, dst: &PropertyPath) {
        let link = PropertyLink::new(src.clone(), dst.clone());
        if !self.links.contains(&link) {
            return;
        }
        let mut net = self.lock();
        net.notify(|o| o.on_will_remove_link(&link));
        net.link_evaluator.remove_link(&link);
        net.links.remove(&link);
        debug!(link = %link, "removed link");
        net.notify(|o| o.on_did_remove_link(&link));
        net.notify_network_changed();
    }

    pub fn is_linked(&self, src: &PropertyPath, dst: &PropertyPath) -> bool {
        self.links
            .contains(&PropertyLink::new(src.clone(), dst.clone()))
    }

    /// Both `a` → `b` and `b` → `a` exist as distinct links.
    pub fn is_linked_bidirectional(&self, a: &PropertyPath, b: &PropertyPath) -> bool {
        self.is_linked(a, b) && self.is_linked(b, a)
    }

    pub fn links(&self) -> impl Iterator<Item = &PropertyLink> {
        self.links.iter()
    }

    /// All properties transitively reachable from `property` via links.
    pub fn properties_linked_to(&self, property: &PropertyPath) -> Vec<PropertyPath> {
        self.link_evaluator.reachable_from(property)
    }

    pub fn links_between_processors(&self, a: &str, b: &str) -> Vec<PropertyLink> {
        self.links
            .iter()
            .filter(|l| {
                (l.src().processor() == a && l.dst().processor() == b)
                    || (l.src().processor() == b && l.dst().processor() == a)
            })
            .cloned()
            .collect()
    }

    pub fn is_linking(&self) -> bool {
        self.link_evaluator.is_linking()
    }

    fn resolve_property(&self, path: &PropertyPath) -> Result<&Property> {
        self.processor(path.processor())
            .and_then(|p| p.property(path.path()))
            .ok_or_else(|| NetworkError::PropertyNotInNetwork(path.to_string()))
    }

    // ---------------------------------------------------------------------
    // Property mutation & link propagation
    // ---------------------------------------------------------------------

    /// Assign a property value and propagate it along outgoing links.
    ///
    /// The write happens first; the propagation pass then carries the value
    /// into every transitively linked property (each written at most once),
    /// invalidating the owners of written destinations. One aggregate
    /// `on_network_changed` follows.
    pub fn set_property_value(&mut self, path: &PropertyPath, value: PropertyValue) -> Result<()> {
        let idx = *self
            .ids
            .get(path.processor())
            .ok_or_else(|| NetworkError::PropertyNotInNetwork(path.to_string()))?;
        let property = self
            .graph
            .node_weight_mut(idx)
            .and_then(|p| p.property_mut(path.path()))
            .ok_or_else(|| NetworkError::PropertyNotInNetwork(path.to_string()))?;
        property.set_value(value).map_err(|e| match e {
            NetworkError::PropertyKindMismatch { expected, got, .. } => {
                NetworkError::PropertyKindMismatch {
                    path: path.to_string(),
                    expected,
                    got,
                }
            }
            other => other,
        })?;

        if !self.link_evaluator.is_linking() {
            self.evaluate_links_from(path);
        }
        self.notify_network_changed();
        Ok(())
    }

    pub fn property(&self, path: &PropertyPath) -> Option<&Property> {
        self.processor(path.processor())?.property(path.path())
    }

    pub fn property_value(&self, path: &PropertyPath) -> Option<PropertyValue> {
        self.property(path)?.value().cloned()
    }

    pub fn inport(&self, port: &PortRef) -> Option<&Inport> {
        self.processor(port.processor())?.inport(port.port())
    }

    pub fn outport(&self, port: &PortRef) -> Option<&Outport> {
        self.processor(port.processor())?.outport(port.port())
    }

    /// Run a propagation pass from `source`.
    ///
    /// No-op while a pass is already running: a property being written by
    /// the propagation must not re-trigger its own links.
    pub fn evaluate_links_from(&mut self, source: &PropertyPath) {
        if self.link_evaluator.is_linking() {
            return;
        }
        self.link_evaluator.set_linking(true);
        let hops = self.link_evaluator.traversal_from(source);
        for (src, dst) in hops {
            let Some(value) = self.property_value(&src) else {
                continue;
            };
            let Some(dst_kind) = self.property(&dst).map(Property::kind) else {
                continue;
            };
            let Some(converted) = value.convert_to(dst_kind) else {
                // Legality was checked when the link was added; kinds do not
                // change afterwards, so this hop cannot miss in practice.
                continue;
            };
            let dst_idx = self.ids.get(dst.processor()).copied();
            if let Some(property) = dst_idx
                .and_then(|idx| self.graph.node_weight_mut(idx))
                .and_then(|p| p.property_mut(dst.path()))
            {
                let _ = property.set_value(converted);
            }
            self.raise_invalidation(dst.processor(), InvalidationLevel::InvalidOutput);
        }
        self.link_evaluator.set_linking(false);
    }

    /// Remove a property (and its subtree), severing links that involve it
    /// or anything below it. Unknown paths are a no-op.
    pub fn remove_property(&mut self, path: &PropertyPath) {
        if self.property(path).is_none() {
            return;
        }
        let mut net = self.lock();
        let involved: Vec<PropertyLink> = net
            .links
            .iter()
            .filter(|l| l.involves_property(path))
            .cloned()
            .collect();
        for link in involved {
            net.remove_link(link.src(), link.dst());
        }
        let idx = net.ids[path.processor()];
        if let Some(p) = net.graph.node_weight_mut(idx) {
            p.remove_property(path.path());
        }
        net.notify_network_changed();
    }

    // ---------------------------------------------------------------------
    // Invalidation & background jobs
    // ---------------------------------------------------------------------

    /// Invalidate a processor and everything downstream of it.
    ///
    /// The named processor is raised to `level`; processors reached through
    /// outgoing connections are raised to `InvalidOutput`. While the pass
    /// runs, the affected processors are accounted in the invalidating set;
    /// when the set drains, observers get an `on_evaluate_request`.
    pub fn invalidate(&mut self, identifier: &str, level: InvalidationLevel) {
        if !self.ids.contains_key(identifier) {
            return;
        }

        let mut order: Vec<String> = vec![identifier.to_string()];
        let mut visited: HashSet<String> = HashSet::from([identifier.to_string()]);
        let mut queue: VecDeque<String> = VecDeque::from([identifier.to_string()]);
        while let Some(current) = queue.pop_front() {
            for connection in &self.connections_vec {
                if connection.outport().processor() == current.as_str() {
                    let next = connection.inport().processor();
                    if visited.insert(next.to_string()) {
                        order.push(next.to_string());
                        queue.push_back(next.to_string());
                    }
                }
            }
        }

        for id in &order {
            if !self.invalidating.contains(id) {
                self.invalidating.push(id.clone());
            }
        }

        for (i, id) in order.iter().enumerate() {
            let target = if i == 0 { level } else { InvalidationLevel::InvalidOutput };
            self.raise_invalidation(id, target);
        }

        for id in &order {
            self.invalidating.retain(|entry| entry != id);
        }
        if self.invalidating.is_empty() {
            self.notify(|o| o.on_evaluate_request());
        }
    }

    fn raise_invalidation(&mut self, identifier: &str, level: InvalidationLevel) {
        let idx = self.ids.get(identifier).copied();
        if let Some(p) = idx.and_then(|idx| self.graph.node_weight_mut(idx)) {
            p.raise_invalidation(level);
        }
    }

    /// Mark a processor's cached results valid again. Used by the external
    /// evaluation scheduler after a successful run.
    pub fn set_processor_valid(&mut self, identifier: &str) {
        let idx = self.ids.get(identifier).copied();
        if let Some(p) = idx.and_then(|idx| self.graph.node_weight_mut(idx)) {
            p.set_valid();
        }
    }

    pub fn is_invalidating(&self) -> bool {
        !self.invalidating.is_empty()
    }

    /// Report `jobs` background jobs started on behalf of a processor.
    ///
    /// Callable from worker threads: the counter is atomic and observers are
    /// notified with the delta and the new total.
    pub fn start_background_jobs(&self, identifier: &str, jobs: usize) {
        let delta = jobs as i64;
        let total = self.background_jobs.fetch_add(delta, Ordering::SeqCst) + delta;
        self.notify(|o| o.on_background_jobs_changed(identifier, delta, total));
    }

    /// Report `jobs` background jobs finished on behalf of a processor.
    pub fn finish_background_jobs(&self, identifier: &str, jobs: usize) {
        let delta = jobs as i64;
        let total = self.background_jobs.fetch_sub(delta, Ordering::SeqCst) - delta;
        self.notify(|o| o.on_background_jobs_changed(identifier, -delta, total));
    }

    pub fn background_jobs(&self) -> i64 {
        self.background_jobs.load(Ordering::SeqCst)
    }

    // ---------------------------------------------------------------------
    // Whole-network operations
    // ---------------------------------------------------------------------

    /// Remove every processor (cascading all connections and links).
    pub fn clear(&mut self) {
        let mut net = self.lock();
        let mut ids: Vec<String> = net.ids.keys().cloned().collect();
        ids.sort_unstable();
        for id in ids {
            net.remove_processor(&id);
        }
    }

    pub fn is_deserializing(&self) -> bool {
        self.deserializing
    }

    /// Walk all processors (identifier order) and their property trees.
    pub fn accept(&self, visitor: &mut dyn NetworkVisitor) {
        let mut ids: Vec<&String> = self.ids.keys().collect();
        ids.sort_unstable();
        for id in ids {
            if let Some(p) = self.processor(id) {
                p.accept(visitor);
            }
        }
    }

    /// Graphviz rendering of the processor/connection topology.
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph ProcessorNetwork {\n");
        dot.push_str("  rankdir=TB;\n");
        dot.push_str("  node [shape=box];\n\n");

        let mut ids: Vec<&String> = self.ids.keys().collect();
        ids.sort_unstable();
        for id in ids {
            if let Some(p) = self.processor(id) {
                dot.push_str(&format!(
                    "  \"{}\" [label=\"{}\\n({})\"];\n",
                    id,
                    p.display_name(),
                    p.class_identifier()
                ));
            }
        }

        dot.push('\n');
        for connection in &self.connections_vec {
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}→{}\"];\n",
                connection.outport().processor(),
                connection.inport().processor(),
                connection.outport().port(),
                connection.inport().port()
            ));
        }

        dot.push_str("}\n");
        dot
    }
}

impl Default for ProcessorNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProcessorNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorNetwork")
            .field("processors", &self.ids.len())
            .field("connections", &self.connections_vec.len())
            .field("links", &self.links.len())
            .field("observers", &self.observers.len())
            .field("locked", &self.is_locked())
            .finish()
    }
}
