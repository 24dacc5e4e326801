//! Error types for styling operations.
//!
//! Every variant is recoverable: the engine catches failures at the
//! Apply/Reset/Sync boundary, leaves the card record untouched, and hands the
//! error back to the host so it can show [`EditorError::notice`].

use thiserror::Error;

use crate::platform::PlatformError;
use crate::types::CardId;

/// Problems caused by what the user asked for, not by the engine.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum UserInputError {
    /// Date text did not match `YY.MM.DD` or `YY.MM.DD (Ddd)`.
    #[error("invalid date {0:?}, expected YY.MM.DD")]
    InvalidDate(String),

    /// A style was requested while the field is open in its raw input.
    #[error("text cannot be styled while its field is being edited")]
    RawEditMode,

    /// A style was requested with no active selection.
    #[error("no text is selected")]
    NoSelection,

    /// Color value is neither a hex color nor a CSS keyword.
    #[error("invalid color {0:?}")]
    InvalidColor(String),

    /// Font scale was NaN or infinite.
    #[error("invalid font size {0}")]
    InvalidFontSize(f64),

    /// Adding one more card would exceed the limit.
    #[error("at most {0} cards can exist at once")]
    CardLimit(usize),

    /// The only remaining card cannot be removed.
    #[error("the last card cannot be deleted")]
    LastCard,

    /// No card with this id.
    #[error("no card with id {0}")]
    UnknownCard(CardId),
}

/// Errors surfaced by engine operations.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum EditorError {
    #[error(transparent)]
    UserInput(#[from] UserInputError),

    /// The snapshot's region was re-rendered or detached.
    #[error("selection no longer exists")]
    StaleSelection,

    /// Markup did not have the shape the operation expected.
    #[error("unexpected markup structure: {0}")]
    StructuralMutation(String),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl EditorError {
    pub(crate) fn structural(msg: impl Into<String>) -> Self {
        EditorError::StructuralMutation(msg.into())
    }

    /// Nothing in the engine is fatal.
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Whether the active snapshot must be dropped after this error.
    pub fn invalidates_selection(&self) -> bool {
        matches!(
            self,
            EditorError::StaleSelection
                | EditorError::StructuralMutation(_)
                | EditorError::UserInput(UserInputError::RawEditMode)
        )
    }

    /// Text for the blocking notice shown to the user.
    pub fn notice(&self) -> String {
        match self {
            EditorError::UserInput(UserInputError::NoSelection) => {
                "Please select some text first.".to_string()
            }
            EditorError::UserInput(UserInputError::RawEditMode) => {
                "Styles can't be applied while editing. Press Enter to save first.".to_string()
            }
            EditorError::UserInput(UserInputError::InvalidDate(_)) => {
                "Please enter the date as YY.MM.DD (e.g. 26.10.14).".to_string()
            }
            EditorError::UserInput(UserInputError::CardLimit(max)) => {
                format!("You can add up to {max} patterns.")
            }
            EditorError::UserInput(UserInputError::LastCard) => {
                "At least one pattern is required.".to_string()
            }
            EditorError::UserInput(other) => other.to_string(),
            EditorError::StaleSelection => {
                "The selection no longer exists. Please select the text again.".to_string()
            }
            EditorError::StructuralMutation(_) | EditorError::Platform(_) => {
                "Something went wrong while applying the style. Please try again.".to_string()
            }
        }
    }
}
