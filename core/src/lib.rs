//! # GA4GH Core
//!
//! Introspection helpers for classes compiled from GA4GH JSON-Schema documents.
//!
//! A schema document is compiled into a [`SchemaRegistry`] holding one
//! [`SchemaClass`] per named definition. On top of that the crate answers two
//! kinds of questions:
//!
//! - which class properties are *referable*, i.e. may hold either an inlined
//!   object or a CURIE reference to one ([`build_referable_attribute_map`]);
//! - what a runtime value is: a schema instance, a CURIE, identifiable, a
//!   literal, an array ([`introspect`] predicates).
//!
//! ```rust,no_run
//! use ga4gh_core::{build_referable_attribute_map, load_schema_classes};
//!
//! # fn main() -> ga4gh_core::Result<()> {
//! let registry = load_schema_classes("schema/vrs.json")?;
//! let referable = build_referable_attribute_map(&registry);
//! assert_eq!(referable.get("Allele"), Some(&vec!["location".to_string()]));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Error types for schema operations
pub mod error;

/// Configuration types for schema loading
pub mod config;

/// Compiled class and registry types
pub mod types;

/// JSON-Schema document compiler
pub mod compiler;

/// Runtime instances of compiled classes
pub mod instance;

/// Referable attribute classification and value predicates
pub mod introspect;

pub use compiler::SchemaCompiler;
pub use config::LoaderConfig;
pub use error::{Result, SchemaError};
pub use instance::{ArrayValue, Instance, LiteralValue, SchemaObject};
pub use introspect::{
    Introspect, SchemaType, build_referable_attribute_map, get_referable_attributes,
    is_array, is_curie, is_identifiable, is_literal, is_referable, is_schema_class,
    is_schema_instance, load_schema_classes,
};
pub use types::{
    PropertySchema, ReferableAttributeMap, SchemaClass, SchemaFragment, SchemaRegistry,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Result, SchemaError};
    pub use crate::instance::*;
    pub use crate::introspect::*;
    pub use crate::types::*;
}
