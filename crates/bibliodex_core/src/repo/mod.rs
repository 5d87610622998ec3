//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for papers and authors.
//! - Isolate SQLite query details from the transport collaborator.
//! - Resolve author descriptors to stable author ids on paper writes.
//!
//! # Invariants
//! - Write paths validate input before SQL mutations.
//! - Read-then-write sequences run inside one `Store::write` unit.
//! - Repository APIs return semantic errors (`InvalidArgument`, `NotFound`,
//!   `Constraint`) in addition to storage errors.

pub mod author_repo;
pub mod author_resolver;
pub mod error;
pub mod page;
pub mod paper_repo;
mod rows;
pub mod stats;
