// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod connection;
pub mod edges;
pub mod error;
pub mod identifier;
pub mod link;
pub mod link_evaluator;
pub mod lock;
pub mod network;
pub mod observer;
pub mod ports;
pub mod processor;
pub mod property;
pub mod registry;
pub mod serialization;
pub mod visitor;

pub use connection::PortConnection;
pub use edges::EdgeRecord;
pub use error::{NetworkError, Result};
pub use identifier::{find_unique_identifier, strip_identifier};
pub use link::PropertyLink;
pub use link_evaluator::LinkEvaluator;
pub use lock::NetworkLock;
pub use network::ProcessorNetwork;
pub use observer::NetworkObserver;
pub use ports::{Inport, Outport, PortRef, DATA_TYPE_ANY};
pub use processor::{InvalidationLevel, Processor, ProcessorWidget};
pub use property::{can_convert, Property, PropertyKind, PropertyPath, PropertyValue};
pub use registry::ProcessorRegistry;
pub use serialization::{
    NetworkConverter, NetworkDocument, ProcessorRecord, PropertyRecord, NETWORK_FORMAT_VERSION,
};
pub use visitor::NetworkVisitor;
