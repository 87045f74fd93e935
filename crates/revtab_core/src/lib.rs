//! # Revtab Core
//!
//! Head/history index engine for versioned model instances.
//!
//! This crate provides:
//! - [`IndexEngine`]: transactional application of commits to per-type
//!   head (current state) and history (audit trail) tables
//! - [`IndexCommit`] / [`CommitBuilder`]: immutable, metadata-tagged
//!   operation batches
//! - [`Index`]: the per-model-type schema descriptor, durably registered
//! - A SQLite dialect driver compiling the schema model into DDL/DML
//!
//! ## Commit protocol
//!
//! Operations are expanded (nested sub-models become implicit inserts) and
//! topologically ordered so referenced instances are committed first, then
//! applied in a single transaction. Any failure rolls the whole batch
//! back; partial application is never observable.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod commit;
mod config;
mod driver;
mod engine;
mod error;
mod graph;
mod index;
mod registry;
mod tables;

pub use commit::{CommitBuilder, IndexCommit, Operation, OperationKind, Timestamp};
pub use config::EngineConfig;
pub use engine::IndexEngine;
pub use error::{EngineError, EngineResult};
pub use index::{head_table_name, history_table_name, Index};
