//! Paper input and read models.

use super::author::{AuthorId, AuthorInput, AuthorSummary};
use super::validation::{is_blank, ValidationError};
use serde::{Deserialize, Serialize};

/// Storage-assigned paper identifier, ascending in creation order.
pub type PaperId = i64;

/// Papers must be published after this year.
pub const EARLIEST_YEAR_EXCLUSIVE: i32 = 1900;

/// Full paper payload for create and replace-style update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperInput {
    pub title: String,
    pub venue: String,
    pub year: i32,
    pub authors: Vec<AuthorInput>,
}

impl PaperInput {
    pub fn new(
        title: impl Into<String>,
        venue: impl Into<String>,
        year: i32,
        authors: Vec<AuthorInput>,
    ) -> Self {
        Self {
            title: title.into(),
            venue: venue.into(),
            year,
            authors,
        }
    }

    /// Checks scalar fields. Author descriptors are checked by the resolver.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.title) {
            return Err(ValidationError::BlankTitle);
        }
        if is_blank(&self.venue) {
            return Err(ValidationError::BlankVenue);
        }
        if self.year <= EARLIEST_YEAR_EXCLUSIVE {
            return Err(ValidationError::YearOutOfRange(self.year));
        }
        Ok(())
    }
}

/// Paper scalar fields, as embedded in an `Author`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaperSummary {
    pub id: PaperId,
    pub title: String,
    pub venue: String,
    pub year: i32,
}

/// Paper read model with its authors, ascending by author id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paper {
    pub id: PaperId,
    pub title: String,
    pub venue: String,
    pub year: i32,
    pub authors: Vec<AuthorSummary>,
}

impl Paper {
    pub fn author_ids(&self) -> Vec<AuthorId> {
        self.authors.iter().map(|author| author.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::PaperInput;
    use crate::model::author::AuthorInput;
    use crate::model::validation::ValidationError;

    fn input(title: &str, venue: &str, year: i32) -> PaperInput {
        PaperInput::new(title, venue, year, vec![AuthorInput::new("Alice")])
    }

    #[test]
    fn year_must_be_after_1900() {
        assert_eq!(
            input("T", "V", 1900).validate(),
            Err(ValidationError::YearOutOfRange(1900))
        );
        assert!(input("T", "V", 1901).validate().is_ok());
    }

    #[test]
    fn blank_title_and_venue_are_rejected() {
        assert_eq!(
            input(" ", "V", 2020).validate(),
            Err(ValidationError::BlankTitle)
        );
        assert_eq!(
            input("T", "\t", 2020).validate(),
            Err(ValidationError::BlankVenue)
        );
    }
}
