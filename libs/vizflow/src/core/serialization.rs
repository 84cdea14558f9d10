// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Versioned network documents.
//!
//! A network persists as a JSON document with four sections: the format
//! version, the processor records (opaque per-type payloads keyed by
//! identifier), the connection edges and the link edges (both as address
//! records, see [`EdgeRecord`]).
//!
//! # Example Document
//!
//! ```json
//! {
//!   "version": 3,
//!   "processors": [
//!     { "identifier": "camera", "type": "test.Source", "displayName": "Camera",
//!       "properties": [ { "identifier": "scale", "value": { "float": 1.0 } } ] },
//!     { "identifier": "display", "type": "test.Sink", "displayName": "Display" }
//!   ],
//!   "connections": [ { "from": "camera.out", "to": "display.in" } ],
//!   "links": [ { "from": "camera.scale", "to": "display.scale" } ]
//! }
//! ```
//!
//! Loading is an upsert into the live network, not a rebuild: processors
//! present on both sides are updated in place, and the connection/link sets
//! are reconciled by diff. Reloading an identical document therefore
//! produces no add/remove notifications at all.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::core::edges::EdgeRecord;
use crate::core::error::{NetworkError, Result};
use crate::core::identifier::strip_identifier;
use crate::core::network::ProcessorNetwork;
use crate::core::processor::Processor;
use crate::core::property::{Property, PropertyValue};
use crate::core::registry::ProcessorRegistry;

/// Current persisted format version. Older documents are upgraded by
/// [`NetworkConverter`] on load; newer ones are rejected.
pub const NETWORK_FORMAT_VERSION: u32 = 3;

/// Persisted property state: identifier, value, nested children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<PropertyValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PropertyRecord>,
}

impl PropertyRecord {
    fn from_property(property: &Property) -> Self {
        Self {
            identifier: property.identifier().to_string(),
            value: property.value().cloned(),
            children: property.children().iter().map(Self::from_property).collect(),
        }
    }
}

/// Persisted processor state. Ports are not serialized; the registry
/// factory rebuilds each processor's skeleton from its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorRecord {
    pub identifier: String,
    #[serde(rename = "type")]
    pub class_identifier: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(default)]
    pub properties: Vec<PropertyRecord>,
}

impl ProcessorRecord {
    fn from_processor(processor: &Processor) -> Self {
        Self {
            identifier: processor.identifier().to_string(),
            class_identifier: processor.class_identifier().to_string(),
            display_name: processor.display_name().to_string(),
            properties: processor
                .properties()
                .iter()
                .map(PropertyRecord::from_property)
                .collect(),
        }
    }
}

/// The persisted network document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDocument {
    pub version: u32,
    pub processors: Vec<ProcessorRecord>,
    #[serde(default)]
    pub connections: Vec<EdgeRecord>,
    #[serde(default)]
    pub links: Vec<EdgeRecord>,
}

impl NetworkDocument {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check internal consistency without touching a network.
    ///
    /// Catches duplicate processor identifiers and edges referencing
    /// identifiers that no processor record declares.
    pub fn validate(&self) -> Result<()> {
        let mut identifiers: HashSet<&str> = HashSet::new();
        for record in &self.processors {
            if !identifiers.insert(record.identifier.as_str()) {
                return Err(NetworkError::Serialization(format!(
                    "duplicate processor identifier: '{}'",
                    record.identifier
                )));
            }
        }

        for record in self.connections.iter().chain(&self.links) {
            for address in [&record.from, &record.to] {
                let Some((processor, _)) = address.split_once('.') else {
                    return Err(NetworkError::Serialization(format!(
                        "invalid edge address '{address}'"
                    )));
                };
                if !identifiers.contains(processor) {
                    return Err(NetworkError::Serialization(format!(
                        "edge references unknown processor '{processor}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Upgrades an old-version raw document to the current format, one version
/// step at a time. Upgrades only: a document newer than
/// [`NETWORK_FORMAT_VERSION`] is rejected as a fatal load error.
#[derive(Debug)]
pub struct NetworkConverter {
    from_version: u32,
}

impl NetworkConverter {
    pub fn new(from_version: u32) -> Self {
        Self { from_version }
    }

    pub fn convert(&self, document: &mut Value) -> Result<()> {
        if self.from_version > NETWORK_FORMAT_VERSION {
            return Err(NetworkError::LoadFatal(format!(
                "document version {} is newer than supported version {}",
                self.from_version, NETWORK_FORMAT_VERSION
            )));
        }
        for version in self.from_version..NETWORK_FORMAT_VERSION {
            match version {
                1 => convert_v1_to_v2(document),
                2 => convert_v2_to_v3(document),
                _ => {
                    return Err(NetworkError::LoadFatal(format!(
                        "cannot upgrade network document from version {version}"
                    )));
                }
            }
        }
        document["version"] = Value::from(NETWORK_FORMAT_VERSION);
        Ok(())
    }
}

/// v1 edge records used `source`/`destination` keys.
fn convert_v1_to_v2(document: &mut Value) {
    for section in ["connections", "links"] {
        if let Some(Value::Array(records)) = document.get_mut(section) {
            for record in records {
                if let Some(object) = record.as_object_mut() {
                    if let Some(v) = object.remove("source") {
                        object.insert("from".into(), v);
                    }
                    if let Some(v) = object.remove("destination") {
                        object.insert("to".into(), v);
                    }
                }
            }
        }
    }
}

/// v2 processor records used `name` for the display name.
fn convert_v2_to_v3(document: &mut Value) {
    if let Some(Value::Array(records)) = document.get_mut("processors") {
        for record in records {
            if let Some(object) = record.as_object_mut() {
                if let Some(v) = object.remove("name") {
                    object.insert("displayName".into(), v);
                }
            }
        }
    }
}

impl ProcessorNetwork {
    // -----------------------------------------------------------------
    // Serialize
    // -----------------------------------------------------------------

    /// Snapshot the network as a document. Processors are ordered by
    /// identifier and links sorted, so equal networks produce equal
    /// documents.
    pub fn to_document(&self) -> NetworkDocument {
        let mut processors: Vec<&Processor> = self.processors().collect();
        processors.sort_by(|a, b| a.identifier().cmp(b.identifier()));

        let mut links: Vec<EdgeRecord> = self.links().map(EdgeRecord::from_link).collect();
        links.sort();

        NetworkDocument {
            version: NETWORK_FORMAT_VERSION,
            processors: processors
                .into_iter()
                .map(ProcessorRecord::from_processor)
                .collect(),
            connections: self
                .connections()
                .iter()
                .map(EdgeRecord::from_connection)
                .collect(),
            links,
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    pub fn save_json_file(&self, path: &Path) -> Result<()> {
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|e| {
            NetworkError::Serialization(format!(
                "failed to write network file '{}': {e}",
                path.display()
            ))
        })
    }

    // -----------------------------------------------------------------
    // Deserialize
    // -----------------------------------------------------------------

    /// Load a document into this network, reporting per-edge resolution
    /// failures as warnings.
    pub fn load_json_str(&mut self, json: &str, registry: &ProcessorRegistry) -> Result<()> {
        self.load_json_str_with(json, registry, &mut |e| {
            warn!("skipping network edge: {e}");
        })
    }

    /// Load a document with an injected per-edge error handler.
    ///
    /// The load is an upsert (see module docs). Failure behavior:
    /// a failure while applying processor records clears the network and is
    /// fatal; a failure in the connection or link stage clears the network
    /// and is recoverable if the cause was a declared document error, fatal
    /// otherwise. Either way no partially-loaded graph stays resident, and
    /// observers see a single aggregate change once the final state is
    /// reached.
    pub fn load_json_str_with(
        &mut self,
        json: &str,
        registry: &ProcessorRegistry,
        handler: &mut dyn FnMut(&NetworkError),
    ) -> Result<()> {
        let mut raw: Value = serde_json::from_str(json)?;
        self.deserializing = true;
        let result = self.load_value(&mut raw, registry, handler);
        self.deserializing = false;
        result
    }

    pub fn load_json_file(&mut self, path: &Path, registry: &ProcessorRegistry) -> Result<()> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            NetworkError::Serialization(format!(
                "failed to read network file '{}': {e}",
                path.display()
            ))
        })?;
        self.load_json_str(&json, registry)
    }

    fn load_value(
        &mut self,
        raw: &mut Value,
        registry: &ProcessorRegistry,
        handler: &mut dyn FnMut(&NetworkError),
    ) -> Result<()> {
        let mut net = self.lock();

        let version = raw
            .get("version")
            .and_then(Value::as_u64)
            .map(|v| v as u32)
            .unwrap_or(0);
        if version != NETWORK_FORMAT_VERSION {
            warn!(
                from = version,
                to = NETWORK_FORMAT_VERSION,
                "old network document version, converting"
            );
            NetworkConverter::new(version).convert(raw)?;
        }

        if let Err(e) = net.apply_processor_records(raw, registry) {
            net.clear();
            return Err(NetworkError::LoadFatal(format!("deserialization error: {e}")));
        }

        if let Err(e) = net.apply_connection_records(raw, handler) {
            net.clear();
            return Err(classify_edge_stage_error("connections", e));
        }

        if let Err(e) = net.apply_link_records(raw, handler) {
            net.clear();
            return Err(classify_edge_stage_error("links", e));
        }

        net.notify_network_changed();
        Ok(())
    }

    /// Identity-preserving upsert of the processor collection.
    ///
    /// Records whose (stripped) identifier is already resident update the
    /// live processor in place; new identifiers are built by the registry
    /// and added; resident processors absent from the document are removed.
    fn apply_processor_records(
        &mut self,
        raw: &mut Value,
        registry: &ProcessorRegistry,
    ) -> Result<()> {
        let section = take_section(raw, "processors")?;
        let records: Vec<ProcessorRecord> = serde_json::from_value(section)?;

        let mut seen: HashSet<String> = HashSet::new();
        for record in &records {
            let identifier = strip_identifier(&record.identifier);
            let resident_class = self
                .processor(&identifier)
                .map(|p| p.class_identifier().to_string());
            match resident_class {
                Some(class) if class == record.class_identifier => {
                    if let Some(processor) = self.processor_mut(&identifier) {
                        if !record.display_name.is_empty() {
                            processor.set_display_name(&record.display_name);
                        }
                        apply_property_records(processor, &record.properties);
                    }
                }
                Some(_) => {
                    // Same identifier, different type: replace.
                    self.remove_processor(&identifier);
                    let processor = build_processor(registry, record)?;
                    self.add_processor(processor);
                }
                None => {
                    let processor = build_processor(registry, record)?;
                    self.add_processor(processor);
                }
            }
            seen.insert(identifier);
        }

        let stale: Vec<String> = self
            .processors()
            .map(|p| p.identifier().to_string())
            .filter(|id| !seen.contains(id))
            .collect();
        for identifier in stale {
            self.remove_processor(&identifier);
        }
        Ok(())
    }

    /// Reconcile the live connection set against the document by diff:
    /// edges on both sides are kept untouched, stale live edges removed,
    /// new document edges added. Unresolvable records go to `handler` and
    /// are skipped.
    fn apply_connection_records(
        &mut self,
        raw: &mut Value,
        handler: &mut dyn FnMut(&NetworkError),
    ) -> Result<()> {
        let section = take_section(raw, "connections")?;
        let records: Vec<EdgeRecord> = serde_json::from_value(section)?;

        let mut incoming = Vec::new();
        for record in &records {
            match record.to_connection(self) {
                Ok(connection) => incoming.push(connection),
                Err(e) => handler(&e),
            }
        }

        let keep: HashSet<_> = incoming.iter().cloned().collect();
        let stale: Vec<_> = self
            .connections()
            .iter()
            .filter(|c| !keep.contains(*c))
            .cloned()
            .collect();
        for connection in stale {
            self.remove_connection(connection.outport(), connection.inport());
        }

        for connection in incoming {
            if self.is_connected(connection.outport(), connection.inport()) {
                continue;
            }
            if let Err(e) = self.add_connection(connection.outport(), connection.inport()) {
                handler(&e);
            }
        }
        Ok(())
    }

    /// Reconcile the live link set against the document; same diff policy
    /// as connections.
    fn apply_link_records(
        &mut self,
        raw: &mut Value,
        handler: &mut dyn FnMut(&NetworkError),
    ) -> Result<()> {
        let section = take_section(raw, "links")?;
        let records: Vec<EdgeRecord> = serde_json::from_value(section)?;

        let mut incoming = Vec::new();
        for record in &records {
            match record.to_link(self) {
                Ok(link) => incoming.push(link),
                Err(e) => handler(&e),
            }
        }

        let keep: HashSet<_> = incoming.iter().cloned().collect();
        let stale: Vec<_> = self
            .links()
            .filter(|l| !keep.contains(*l))
            .cloned()
            .collect();
        for link in stale {
            self.remove_link(link.src(), link.dst());
        }

        for link in incoming {
            if self.is_linked(link.src(), link.dst()) {
                continue;
            }
            if let Err(e) = self.add_link(link.src(), link.dst()) {
                handler(&e);
            }
        }
        Ok(())
    }
}

/// Processor-stage failures are always fatal; the edge stages downgrade to
/// recoverable when the root cause is a declared document error.
fn classify_edge_stage_error(section: &str, error: NetworkError) -> NetworkError {
    match error {
        NetworkError::Serialization(msg) => {
            NetworkError::LoadRecoverable(format!("deserialization error in {section}: {msg}"))
        }
        other => NetworkError::LoadFatal(format!("deserialization error in {section}: {other}")),
    }
}

fn take_section(raw: &mut Value, name: &str) -> Result<Value> {
    raw.get_mut(name)
        .map(Value::take)
        .ok_or_else(|| NetworkError::Serialization(format!("missing '{name}' section")))
}

fn build_processor(registry: &ProcessorRegistry, record: &ProcessorRecord) -> Result<Processor> {
    let mut processor = registry.create(&record.class_identifier)?;
    processor.set_identifier(&record.identifier);
    if !record.display_name.is_empty() {
        processor.set_display_name(&record.display_name);
    }
    apply_property_records(&mut processor, &record.properties);
    Ok(processor)
}

fn apply_property_records(processor: &mut Processor, records: &[PropertyRecord]) {
    for record in records {
        match processor.property_mut(std::slice::from_ref(&record.identifier)) {
            Some(property) => apply_property_record(property, record),
            None => warn!(
                property = %record.identifier,
                "document references unknown property, skipping"
            ),
        }
    }
}

fn apply_property_record(property: &mut Property, record: &PropertyRecord) {
    if let Some(value) = &record.value {
        if property.set_value(value.clone()).is_err() {
            warn!(
                property = %property.identifier(),
                "document property value has mismatched kind, skipping"
            );
        }
    }
    for child_record in &record.children {
        match property.child_mut(&child_record.identifier) {
            Some(child) => apply_property_record(child, child_record),
            None => warn!(
                property = %child_record.identifier,
                "document references unknown property, skipping"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_validate_duplicate_identifier() {
        let json = r#"{
            "version": 3,
            "processors": [
                { "identifier": "a", "type": "test.Source" },
                { "identifier": "a", "type": "test.Sink" }
            ]
        }"#;
        let doc = NetworkDocument::from_json_str(json).unwrap();
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_document_validate_unknown_edge_reference() {
        let json = r#"{
            "version": 3,
            "processors": [ { "identifier": "a", "type": "test.Source" } ],
            "connections": [ { "from": "a.out", "to": "ghost.in" } ]
        }"#;
        let doc = NetworkDocument::from_json_str(json).unwrap();
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_document_sections_default_empty() {
        let json = r#"{ "version": 3, "processors": [] }"#;
        let doc = NetworkDocument::from_json_str(json).unwrap();
        assert!(doc.connections.is_empty());
        assert!(doc.links.is_empty());
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_converter_upgrades_v1_edges() {
        let mut raw: Value = serde_json::from_str(
            r#"{
                "version": 1,
                "processors": [],
                "connections": [ { "source": "a.out", "destination": "b.in" } ],
                "links": []
            }"#,
        )
        .unwrap();
        NetworkConverter::new(1).convert(&mut raw).unwrap();
        assert_eq!(raw["version"], Value::from(NETWORK_FORMAT_VERSION));
        assert_eq!(raw["connections"][0]["from"], Value::from("a.out"));
        assert_eq!(raw["connections"][0]["to"], Value::from("b.in"));
    }

    #[test]
    fn test_converter_upgrades_v2_display_name() {
        let mut raw: Value = serde_json::from_str(
            r#"{
                "version": 2,
                "processors": [ { "identifier": "a", "type": "t", "name": "Pretty" } ]
            }"#,
        )
        .unwrap();
        NetworkConverter::new(2).convert(&mut raw).unwrap();
        assert_eq!(raw["processors"][0]["displayName"], Value::from("Pretty"));
        assert!(raw["processors"][0].get("name").is_none());
    }

    #[test]
    fn test_converter_rejects_newer_documents() {
        let mut raw: Value = serde_json::from_str(r#"{ "version": 99 }"#).unwrap();
        let err = NetworkConverter::new(99).convert(&mut raw);
        assert!(matches!(err, Err(NetworkError::LoadFatal(_))));
    }

    #[test]
    fn test_converter_rejects_unversioned_documents() {
        let mut raw: Value = serde_json::from_str(r#"{ "processors": [] }"#).unwrap();
        let err = NetworkConverter::new(0).convert(&mut raw);
        assert!(matches!(err, Err(NetworkError::LoadFatal(_))));
    }
}
