//! Defensive input checks shared by repositories and the author resolver.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input rejected before any storage mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Paper title is empty or whitespace.
    BlankTitle,
    /// Paper venue is empty or whitespace.
    BlankVenue,
    /// Paper year is not after 1900.
    YearOutOfRange(i32),
    /// Author name at `index` of the submitted list is empty or whitespace.
    BlankAuthorName { index: usize },
    /// Author list resolved to no authors.
    NoAuthors,
    /// Page size is outside `1..=100`.
    LimitOutOfRange(u32),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "title is required"),
            Self::BlankVenue => write!(f, "published venue is required"),
            Self::YearOutOfRange(year) => {
                write!(f, "valid year after 1900 is required, got {year}")
            }
            Self::BlankAuthorName { index } => {
                write!(f, "author name is required (author #{index})")
            }
            Self::NoAuthors => write!(f, "at least one author is required"),
            Self::LimitOutOfRange(limit) => {
                write!(f, "limit must be between 1 and 100, got {limit}")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
