// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Observable, typed property values owned by processors.
//!
//! Properties form a tree: a property with children is a composite group and
//! carries no value of its own. Properties are addressed by a
//! [`PropertyPath`], the owning processor's identifier plus the dotted path
//! through the tree. Value mutation goes through the network
//! (`ProcessorNetwork::set_property_value`) so that link propagation and
//! change notification always run.

use serde::{Deserialize, Serialize};

use crate::core::error::{NetworkError, Result};

/// The kind of value a property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Bool,
    Int,
    Float,
    Str,
    Vec3,
    /// Composite group; holds children, never a value.
    Group,
}

/// A property's current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Vec3([f64; 3]),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::Str(_) => PropertyKind::Str,
            PropertyValue::Vec3(_) => PropertyKind::Vec3,
        }
    }

    /// Convert this value into `kind`, if the conversion is defined.
    ///
    /// Same-kind conversion is the identity. `Int` and `Float` convert into
    /// each other (float-to-int truncates); `Bool` widens to `Int`/`Float`
    /// as 0/1. Everything else is unconvertible and returns `None`.
    pub fn convert_to(&self, kind: PropertyKind) -> Option<PropertyValue> {
        if self.kind() == kind {
            return Some(self.clone());
        }
        match (self, kind) {
            (PropertyValue::Int(v), PropertyKind::Float) => Some(PropertyValue::Float(*v as f64)),
            (PropertyValue::Float(v), PropertyKind::Int) => Some(PropertyValue::Int(*v as i64)),
            (PropertyValue::Bool(v), PropertyKind::Int) => Some(PropertyValue::Int(i64::from(*v))),
            (PropertyValue::Bool(v), PropertyKind::Float) => {
                Some(PropertyValue::Float(if *v { 1.0 } else { 0.0 }))
            }
            _ => None,
        }
    }
}

/// Whether a value of kind `from` can be carried into a property of kind `to`.
pub fn can_convert(from: PropertyKind, to: PropertyKind) -> bool {
    if from == PropertyKind::Group || to == PropertyKind::Group {
        return false;
    }
    from == to
        || matches!(
            (from, to),
            (PropertyKind::Int, PropertyKind::Float)
                | (PropertyKind::Float, PropertyKind::Int)
                | (PropertyKind::Bool, PropertyKind::Int)
                | (PropertyKind::Bool, PropertyKind::Float)
        )
}

/// A named, typed, observable value owned by a processor, or a composite
/// group of such values.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    identifier: String,
    display_name: String,
    value: Option<PropertyValue>,
    read_only: bool,
    children: Vec<Property>,
}

impl Property {
    pub fn new(identifier: impl Into<String>, value: PropertyValue) -> Self {
        let identifier = identifier.into();
        Self {
            display_name: identifier.clone(),
            identifier,
            value: Some(value),
            read_only: false,
            children: Vec::new(),
        }
    }

    /// Create a composite group owning `children`.
    pub fn group(identifier: impl Into<String>, children: Vec<Property>) -> Self {
        let identifier = identifier.into();
        Self {
            display_name: identifier.clone(),
            identifier,
            value: None,
            read_only: false,
            children,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_group(&self) -> bool {
        self.value.is_none()
    }

    pub fn kind(&self) -> PropertyKind {
        match &self.value {
            Some(v) => v.kind(),
            None => PropertyKind::Group,
        }
    }

    pub fn value(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    /// Assign a value, converting it into this property's kind.
    ///
    /// Groups cannot hold values; assigning a value of an unconvertible kind
    /// is a [`NetworkError::PropertyKindMismatch`].
    pub fn set_value(&mut self, value: PropertyValue) -> Result<()> {
        let expected = self.kind();
        match value.convert_to(expected) {
            Some(converted) => {
                self.value = Some(converted);
                Ok(())
            }
            None => Err(NetworkError::PropertyKindMismatch {
                path: self.identifier.clone(),
                expected,
                got: value.kind(),
            }),
        }
    }

    pub fn children(&self) -> &[Property] {
        &self.children
    }

    pub fn child(&self, identifier: &str) -> Option<&Property> {
        self.children.iter().find(|c| c.identifier == identifier)
    }

    pub(crate) fn child_mut(&mut self, identifier: &str) -> Option<&mut Property> {
        self.children.iter_mut().find(|c| c.identifier == identifier)
    }

    /// Resolve a relative path below this property.
    pub fn resolve(&self, path: &[String]) -> Option<&Property> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => self.child(head)?.resolve(rest),
        }
    }

    pub(crate) fn resolve_mut(&mut self, path: &[String]) -> Option<&mut Property> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => self.child_mut(head)?.resolve_mut(rest),
        }
    }

    /// Remove a direct or nested child; returns the removed subtree.
    pub(crate) fn remove_descendant(&mut self, path: &[String]) -> Option<Property> {
        match path {
            [] => None,
            [leaf] => {
                let pos = self.children.iter().position(|c| c.identifier == *leaf)?;
                Some(self.children.remove(pos))
            }
            [head, rest @ ..] => self.child_mut(head)?.remove_descendant(rest),
        }
    }
}

/// Address of a property: the owning processor's identifier plus the dotted
/// path through the property tree, e.g. `"raycaster.lighting.ambient"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyPath {
    processor: String,
    path: Vec<String>,
}

impl PropertyPath {
    pub fn new<I, S>(processor: impl Into<String>, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            processor: processor.into(),
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a `"processor.property[.child]*"` address.
    pub fn parse(address: &str) -> Result<Self> {
        let (processor, rest) = address
            .split_once('.')
            .ok_or_else(|| NetworkError::InvalidPropertyPath(address.to_string()))?;
        if processor.is_empty() || rest.is_empty() || rest.split('.').any(str::is_empty) {
            return Err(NetworkError::InvalidPropertyPath(address.to_string()));
        }
        Ok(Self {
            processor: processor.to_string(),
            path: rest.split('.').map(str::to_string).collect(),
        })
    }

    pub fn processor(&self) -> &str {
        &self.processor
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub(crate) fn set_processor(&mut self, processor: impl Into<String>) {
        self.processor = processor.into();
    }

    /// Whether `self` addresses `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &PropertyPath) -> bool {
        self.processor == other.processor
            && self.path.len() <= other.path.len()
            && self.path.iter().zip(&other.path).all(|(a, b)| a == b)
    }
}

impl std::fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.processor, self.path.join("."))
    }
}
