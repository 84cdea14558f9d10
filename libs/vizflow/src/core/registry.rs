// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Processor factories keyed by class identifier.
//!
//! Deserialization rebuilds processors from their class identifier; the
//! registry supplies the factory that constructs each type with its port
//! and property skeleton. Property values are applied afterwards from the
//! document.

use std::collections::HashMap;

use crate::core::error::{NetworkError, Result};
use crate::core::processor::Processor;

type ProcessorFactory = Box<dyn Fn() -> Processor + Send + Sync>;

#[derive(Default)]
pub struct ProcessorRegistry {
    factories: HashMap<String, ProcessorFactory>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `class_identifier`. Double registration of a
    /// class is an error.
    pub fn register(
        &mut self,
        class_identifier: impl Into<String>,
        factory: impl Fn() -> Processor + Send + Sync + 'static,
    ) -> Result<()> {
        let class_identifier = class_identifier.into();
        if self.factories.contains_key(&class_identifier) {
            return Err(NetworkError::DuplicateProcessorType(class_identifier));
        }
        self.factories.insert(class_identifier, Box::new(factory));
        Ok(())
    }

    /// Construct a fresh processor of the given class.
    pub fn create(&self, class_identifier: &str) -> Result<Processor> {
        let factory = self
            .factories
            .get(class_identifier)
            .ok_or_else(|| NetworkError::UnknownProcessorType(class_identifier.to_string()))?;
        Ok(factory())
    }

    pub fn contains(&self, class_identifier: &str) -> bool {
        self.factories.contains_key(class_identifier)
    }

    /// Registered class identifiers, sorted.
    pub fn class_identifiers(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        classes.sort_unstable();
        classes
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("classes", &self.class_identifiers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_create() {
        let mut registry = ProcessorRegistry::new();
        registry
            .register("org.vizflow.Source", || {
                Processor::new("org.vizflow.Source", "source")
            })
            .unwrap();

        let p = registry.create("org.vizflow.Source").unwrap();
        assert_eq!(p.class_identifier(), "org.vizflow.Source");
        assert!(registry.contains("org.vizflow.Source"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ProcessorRegistry::new();
        registry
            .register("org.vizflow.Source", || {
                Processor::new("org.vizflow.Source", "source")
            })
            .unwrap();
        let err = registry.register("org.vizflow.Source", || {
            Processor::new("org.vizflow.Source", "source")
        });
        assert!(matches!(err, Err(NetworkError::DuplicateProcessorType(_))));
    }

    #[test]
    fn test_unknown_class_fails() {
        let registry = ProcessorRegistry::new();
        assert!(matches!(
            registry.create("org.vizflow.Missing"),
            Err(NetworkError::UnknownProcessorType(_))
        ));
    }
}
