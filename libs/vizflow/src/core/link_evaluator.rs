// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Link legality and propagation planning.
//!
//! The evaluator keeps an adjacency cache over the network's property links
//! so a change to one property can find everything it reaches without
//! scanning the full link set. The link graph may contain cycles (A→B→A is
//! the normal way to express bidirectional synchronization), so traversal is
//! visited-set guarded: each property is written at most once per pass and
//! the pass always terminates.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::link::PropertyLink;
use crate::core::property::{can_convert, Property, PropertyPath};

#[derive(Debug, Default)]
pub struct LinkEvaluator {
    /// Outgoing adjacency: source property -> linked destinations.
    successors: HashMap<PropertyPath, Vec<PropertyPath>>,
    /// True while a propagation pass is running.
    linking: bool,
}

impl LinkEvaluator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether a link `src` → `dst` is legal: the destination is writable
    /// and the source's value kind converts into the destination's.
    pub fn can_link(&self, src: &Property, dst: &Property) -> bool {
        !dst.is_read_only() && can_convert(src.kind(), dst.kind())
    }

    /// True while a propagation pass is executing; used to suppress
    /// re-entrant propagation and redundant invalidation.
    pub fn is_linking(&self) -> bool {
        self.linking
    }

    pub(crate) fn set_linking(&mut self, linking: bool) {
        self.linking = linking;
    }

    pub(crate) fn add_link(&mut self, link: &PropertyLink) {
        let entry = self.successors.entry(link.src().clone()).or_default();
        if !entry.contains(link.dst()) {
            entry.push(link.dst().clone());
        }
    }

    pub(crate) fn remove_link(&mut self, link: &PropertyLink) {
        if let Some(entry) = self.successors.get_mut(link.src()) {
            entry.retain(|dst| dst != link.dst());
            if entry.is_empty() {
                self.successors.remove(link.src());
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.successors.clear();
    }

    /// All properties transitively reachable from `src` via outgoing links,
    /// excluding `src` itself.
    pub(crate) fn reachable_from(&self, src: &PropertyPath) -> Vec<PropertyPath> {
        self.traversal_from(src)
            .into_iter()
            .map(|(_, dst)| dst)
            .collect()
    }

    /// The ordered list of link hops a propagation pass from `src` executes.
    ///
    /// Breadth-first; each destination appears exactly once, the first time
    /// it is reached. `src` is in the visited set from the start, so cycles
    /// back into it (or into any already-written property) are dropped.
    pub(crate) fn traversal_from(&self, src: &PropertyPath) -> Vec<(PropertyPath, PropertyPath)> {
        let mut hops = Vec::new();
        let mut visited: HashSet<PropertyPath> = HashSet::new();
        visited.insert(src.clone());

        let mut queue: VecDeque<PropertyPath> = VecDeque::new();
        queue.push_back(src.clone());

        while let Some(current) = queue.pop_front() {
            let Some(destinations) = self.successors.get(&current) else {
                continue;
            };
            for dst in destinations {
                if visited.insert(dst.clone()) {
                    hops.push((current.clone(), dst.clone()));
                    queue.push_back(dst.clone());
                }
            }
        }
        hops
    }
}
