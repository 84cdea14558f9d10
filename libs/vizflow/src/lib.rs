// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! vizflow: processor-network engine for interactive visualization
//! pipelines.
//!
//! The network is a mutable dataflow graph: processors (nodes owning typed
//! ports and a property tree), port connections (directed outport → inport
//! edges) and property links (directed edges that carry value changes,
//! cycles allowed). The [`core::ProcessorNetwork`] orchestrator validates
//! every mutation, batches notifications behind a reentrant lock, and
//! persists the whole graph as a versioned JSON document with diff-based
//! reload.
//!
//! Rendering, scheduling and GUI concerns live outside this crate; they
//! attach through [`core::NetworkObserver`] callbacks and the processor
//! widget/visitor seams.
//!
//! ```
//! use vizflow::{Inport, Outport, PortRef, Processor, ProcessorNetwork};
//!
//! let mut network = ProcessorNetwork::new();
//! network.add_processor(
//!     Processor::new("demo.Source", "camera").with_outport(Outport::new("out", "image")),
//! );
//! network.add_processor(
//!     Processor::new("demo.Sink", "display").with_inport(Inport::new("in", "image")),
//! );
//! network
//!     .add_connection(&PortRef::new("camera", "out"), &PortRef::new("display", "in"))
//!     .unwrap();
//! assert_eq!(network.connections().len(), 1);
//! ```

pub mod core;

pub use core::{
    EdgeRecord, Inport, InvalidationLevel, LinkEvaluator, NetworkConverter, NetworkDocument,
    NetworkError, NetworkLock, NetworkObserver, NetworkVisitor, Outport, PortConnection, PortRef,
    Processor, ProcessorNetwork, ProcessorRecord, ProcessorRegistry, ProcessorWidget, Property,
    PropertyKind, PropertyLink, PropertyPath, PropertyRecord, PropertyValue, Result,
    NETWORK_FORMAT_VERSION,
};
