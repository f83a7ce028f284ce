//! Section API error types.
//!
//! Grading itself never fails; these errors report misuse of a section,
//! such as answering an item that does not exist.

use thiserror::Error;

use crate::model::ItemKind;

/// Errors raised when addressing items of a [`crate::section::Section`].
#[derive(Debug, Error, PartialEq)]
pub enum QuizError {
    /// No item has this id.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// Position past the end of the section (0-based).
    #[error("item position {position} out of range (section has {len} items)")]
    PositionOutOfRange { position: usize, len: usize },

    /// The response shape does not fit the item kind.
    #[error("item {item} is a {kind} and cannot take a {response} response")]
    ResponseMismatch {
        item: String,
        kind: ItemKind,
        response: &'static str,
    },

    /// Radio option index past the last option.
    #[error("item {item} has {options} options, option {selected} does not exist")]
    SelectionOutOfRange {
        item: String,
        selected: usize,
        options: usize,
    },
}

impl QuizError {
    /// Returns `true` if the error names an item that could not be found.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            QuizError::UnknownItem(_) | QuizError::PositionOutOfRange { .. }
        )
    }
}
