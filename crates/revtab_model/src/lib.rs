//! # Revtab Model
//!
//! The schemaless object model consumed by the Revtab index engine.
//!
//! This crate provides:
//! - A dynamic [`Value`] type for property payloads
//! - [`Model`] instances: typed bags of properties with one identity
//! - [`Reference`] encoding for cross-store object links
//! - [Introspection](introspect) deriving a relational column set and
//!   dependency edges from an instance
//!
//! ## Identity rule
//!
//! Every model carries exactly one identity property, declared with
//! [`Model::with_id`]. Introspection rejects models with zero or more than
//! one identity.
//!
//! ## Usage
//!
//! ```
//! use revtab_model::{introspect, Model};
//!
//! let model = Model::new("TestModel")
//!     .with_id("testId", "foo")
//!     .with("testInteger", 1i64);
//!
//! let schema = introspect(&model).unwrap();
//! assert_eq!(schema.identity_column(), "TESTID");
//! assert!(schema.columns().contains("TESTINTEGER"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod introspect;
mod model;
pub mod names;
mod reference;
mod value;

pub use error::{ModelError, ModelResult};
pub use introspect::{flatten, introspect, Dependency, FlatRecord, ModelSchema};
pub use model::{Model, ModelEntry, PropertyRole};
pub use reference::Reference;
pub use value::Value;
