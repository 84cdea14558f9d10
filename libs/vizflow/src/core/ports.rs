// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Typed ports and port addresses.
//!
//! An [`Outport`] produces data of a declared type, an [`Inport`] consumes
//! it. Connection legality is a capability check on the destination port
//! ([`Inport::can_connect_to`]) covering both type compatibility and arity,
//! never a hardcoded single-connection rule.

use serde::{Deserialize, Serialize};

use crate::core::error::{NetworkError, Result};

/// Wildcard data type accepted by inports that take anything.
pub const DATA_TYPE_ANY: &str = "any";

/// Data-producing port on a processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outport {
    identifier: String,
    data_type: String,
}

impl Outport {
    pub fn new(identifier: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            data_type: data_type.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }
}

/// Data-consuming port on a processor.
///
/// Inports accept a bounded number of incoming connections; the default is
/// one. Multi-connection inports opt in via [`Inport::with_max_connections`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inport {
    identifier: String,
    data_type: String,
    max_connections: usize,
}

impl Inport {
    pub fn new(identifier: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            data_type: data_type.into(),
            max_connections: 1,
        }
    }

    /// Allow up to `max` simultaneous incoming connections.
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Whether a connection from `outport` would be legal, given the number
    /// of connections this inport currently has.
    pub fn can_connect_to(&self, outport: &Outport, current_connections: usize) -> bool {
        self.accepts(outport.data_type()) && current_connections < self.max_connections
    }

    fn accepts(&self, data_type: &str) -> bool {
        self.data_type == DATA_TYPE_ANY || self.data_type == data_type
    }
}

/// Address of a port: `"processor.port"`.
///
/// A `PortRef` is a value, not a live handle; it stays meaningful across
/// serialization and is re-resolved against the network when used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortRef {
    processor: String,
    port: String,
}

impl PortRef {
    pub fn new(processor: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            processor: processor.into(),
            port: port.into(),
        }
    }

    /// Parse a `"processor.port"` address.
    pub fn parse(address: &str) -> Result<Self> {
        let (processor, port) = address
            .split_once('.')
            .ok_or_else(|| NetworkError::InvalidPortAddress(address.to_string()))?;
        if processor.is_empty() || port.is_empty() {
            return Err(NetworkError::InvalidPortAddress(address.to_string()));
        }
        Ok(Self::new(processor, port))
    }

    pub fn processor(&self) -> &str {
        &self.processor
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub(crate) fn set_processor(&mut self, processor: impl Into<String>) {
        self.processor = processor.into();
    }
}

impl std::fmt::Display for PortRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.processor, self.port)
    }
}
