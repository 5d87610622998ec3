//! Author deduplication for paper writes.
//!
//! # Responsibility
//! - Map author descriptors to stable author ids, reusing exact matches and
//!   creating authors for descriptors that match nothing.
//!
//! # Invariants
//! - Matching is exact on `(name, email, affiliation)`; absent fields match
//!   only absent fields.
//! - Among several matching rows the lowest id wins.
//! - Output ids are unique and keep first-seen order.
//! - Match-then-create runs inside the caller's write transaction, so two
//!   concurrent resolutions of the same new descriptor cannot both create it.

use crate::db::Store;
use crate::model::author::{AuthorId, AuthorInput};
use crate::repo::error::RepoResult;
use crate::repo::rows::{find_matching_author, insert_author};
use log::debug;
use rusqlite::Transaction;

/// Resolves `descriptors` within an already-open write transaction.
///
/// Every descriptor is validated before the first lookup, so a blank name
/// anywhere in the list fails the call without creating authors.
pub fn resolve_in_tx(
    tx: &Transaction<'_>,
    descriptors: &[AuthorInput],
) -> RepoResult<Vec<AuthorId>> {
    for (index, descriptor) in descriptors.iter().enumerate() {
        descriptor.validate_at(index)?;
    }

    let mut resolved: Vec<AuthorId> = Vec::with_capacity(descriptors.len());
    let mut created = 0_usize;
    for descriptor in descriptors {
        let author_id = match find_matching_author(tx, descriptor)? {
            Some(existing) => existing,
            None => {
                created += 1;
                insert_author(tx, descriptor)?
            }
        };

        if !resolved.contains(&author_id) {
            resolved.push(author_id);
        }
    }

    debug!(
        "event=author_resolve module=repo status=ok descriptors={} resolved={} created={}",
        descriptors.len(),
        resolved.len(),
        created
    );
    Ok(resolved)
}

/// Standalone resolver that runs each resolution as its own write unit.
#[derive(Debug, Clone)]
pub struct AuthorResolver {
    store: Store,
}

impl AuthorResolver {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Resolves `descriptors` to author ids, creating missing authors.
    pub fn resolve(&self, descriptors: &[AuthorInput]) -> RepoResult<Vec<AuthorId>> {
        self.store
            .write("author_resolve", |tx| resolve_in_tx(tx, descriptors))
    }
}
