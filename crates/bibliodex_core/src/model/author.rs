//! Author input and read models.

use super::paper::{PaperId, PaperSummary};
use super::validation::{is_blank, ValidationError};
use serde::{Deserialize, Serialize};

/// Storage-assigned author identifier. Lower ids were created earlier.
pub type AuthorId = i64;

/// Author descriptor used for explicit author writes and for paper author lists.
///
/// Absent `email`/`affiliation` are distinct from empty strings: the resolver
/// matches `None` only against stored `NULL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorInput {
    pub name: String,
    pub email: Option<String>,
    pub affiliation: Option<String>,
}

impl AuthorInput {
    /// Creates a descriptor with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            affiliation: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = Some(affiliation.into());
        self
    }

    /// Rejects blank names. `index` is reported back for list inputs.
    pub fn validate_at(&self, index: usize) -> Result<(), ValidationError> {
        if is_blank(&self.name) {
            return Err(ValidationError::BlankAuthorName { index });
        }
        Ok(())
    }
}

/// Author scalar fields, as embedded in a `Paper`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSummary {
    pub id: AuthorId,
    pub name: String,
    pub email: Option<String>,
    pub affiliation: Option<String>,
}

/// Author read model with the papers it is linked to, ascending by paper id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub email: Option<String>,
    pub affiliation: Option<String>,
    pub papers: Vec<PaperSummary>,
}

impl Author {
    pub fn paper_ids(&self) -> Vec<PaperId> {
        self.papers.iter().map(|paper| paper.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::AuthorInput;
    use crate::model::validation::ValidationError;

    #[test]
    fn blank_name_reports_list_position() {
        let err = AuthorInput::new("  ").validate_at(3).unwrap_err();
        assert_eq!(err, ValidationError::BlankAuthorName { index: 3 });
    }

    #[test]
    fn builder_sets_optional_fields() {
        let input = AuthorInput::new("Ada Lovelace")
            .with_email("ada@example.org")
            .with_affiliation("Analytical Engines");
        assert_eq!(input.email.as_deref(), Some("ada@example.org"));
        assert_eq!(input.affiliation.as_deref(), Some("Analytical Engines"));
        assert!(input.validate_at(0).is_ok());
    }
}
