//! Catalogue domain model.
//!
//! # Responsibility
//! - Define input payloads accepted by the repositories.
//! - Define read models returned to the transport collaborator.
//! - Own the defensive validation rules for inputs.
//!
//! # Invariants
//! - Read models never nest recursively: a `Paper` carries `AuthorSummary`
//!   values and an `Author` carries `PaperSummary` values.
//! - Identifiers are assigned by storage in creation order and never reused.

pub mod author;
pub mod paper;
pub mod validation;
