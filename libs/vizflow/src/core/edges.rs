// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Abstract document edges.
//!
//! Persisted connections and links reference endpoints by address
//! (`"processor.port"` / `"processor.property.path"`), never by live handle.
//! An [`EdgeRecord`] resolves back against a network on load; resolution of
//! one edge failing is reported and skipped, it does not abort the load.

use serde::{Deserialize, Serialize};

use crate::core::connection::PortConnection;
use crate::core::error::{NetworkError, Result};
use crate::core::link::PropertyLink;
use crate::core::network::ProcessorNetwork;
use crate::core::ports::PortRef;
use crate::core::property::PropertyPath;

/// A directed edge in the persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Source address: `"processor.outport"` for connections,
    /// `"processor.property"` for links.
    pub from: String,
    /// Destination address, same form.
    pub to: String,
}

impl EdgeRecord {
    pub fn from_connection(connection: &PortConnection) -> Self {
        Self {
            from: connection.outport().to_string(),
            to: connection.inport().to_string(),
        }
    }

    pub fn from_link(link: &PropertyLink) -> Self {
        Self {
            from: link.src().to_string(),
            to: link.dst().to_string(),
        }
    }

    /// Resolve this record to a connection against live network state.
    pub fn to_connection(&self, network: &ProcessorNetwork) -> Result<PortConnection> {
        let outport = PortRef::parse(&self.from)?;
        let inport = PortRef::parse(&self.to)?;
        if network.outport(&outport).is_none() {
            return Err(NetworkError::OutportNotInNetwork {
                processor: outport.processor().to_string(),
                port: outport.port().to_string(),
            });
        }
        if network.inport(&inport).is_none() {
            return Err(NetworkError::InportNotInNetwork {
                processor: inport.processor().to_string(),
                port: inport.port().to_string(),
            });
        }
        Ok(PortConnection::new(outport, inport))
    }

    /// Resolve this record to a property link against live network state.
    pub fn to_link(&self, network: &ProcessorNetwork) -> Result<PropertyLink> {
        let src = PropertyPath::parse(&self.from)?;
        let dst = PropertyPath::parse(&self.to)?;
        if network.property(&src).is_none() {
            return Err(NetworkError::PropertyNotInNetwork(src.to_string()));
        }
        if network.property(&dst).is_none() {
            return Err(NetworkError::PropertyNotInNetwork(dst.to_string()));
        }
        Ok(PropertyLink::new(src, dst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ports::{Inport, Outport};
    use crate::core::processor::Processor;
    use crate::core::property::{Property, PropertyValue};

    fn network() -> ProcessorNetwork {
        let mut net = ProcessorNetwork::new();
        net.add_processor(
            Processor::new("test.Source", "source")
                .with_outport(Outport::new("out", "image"))
                .with_property(Property::new("scale", PropertyValue::Float(1.0))),
        );
        net.add_processor(
            Processor::new("test.Sink", "sink")
                .with_inport(Inport::new("in", "image"))
                .with_property(Property::new("scale", PropertyValue::Float(1.0))),
        );
        net
    }

    #[test]
    fn test_connection_round_trip() {
        let net = network();
        let record = EdgeRecord {
            from: "source.out".into(),
            to: "sink.in".into(),
        };
        let connection = record.to_connection(&net).unwrap();
        assert_eq!(EdgeRecord::from_connection(&connection), record);
    }

    #[test]
    fn test_unresolvable_connection_reports_port() {
        let net = network();
        let record = EdgeRecord {
            from: "ghost.out".into(),
            to: "sink.in".into(),
        };
        assert!(matches!(
            record.to_connection(&net),
            Err(NetworkError::OutportNotInNetwork { .. })
        ));
    }

    #[test]
    fn test_link_round_trip() {
        let net = network();
        let record = EdgeRecord {
            from: "source.scale".into(),
            to: "sink.scale".into(),
        };
        let link = record.to_link(&net).unwrap();
        assert_eq!(EdgeRecord::from_link(&link), record);
    }

    #[test]
    fn test_malformed_address_is_an_error() {
        let net = network();
        let record = EdgeRecord {
            from: "nodot".into(),
            to: "sink.in".into(),
        };
        assert!(record.to_connection(&net).is_err());
    }
}
