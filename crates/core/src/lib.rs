//! Domain core of the todo service.
//!
//! - [`todo`] / [`file`]: entities and their validation rules.
//! - [`ports`]: capability traits for the relational store, the event
//!   stream, object storage and health probes.
//! - [`usecases`]: the create-todo and file-upload workflows.
//! - [`deadline`]: per-call deadline and cancellation.
//! - `memory` (feature `test-util`): in-memory port implementations with
//!   fault injection.

pub mod deadline;
pub mod error;
pub mod file;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod ports;
pub mod todo;
pub mod types;
pub mod usecases;
