//! Error types for deck merging.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading, merging or writing decks.
///
/// Only path-level and save-level failures abort a merge. Shape and slide
/// level failures are recovered where they happen and logged.
#[derive(Error, Debug)]
pub enum Error {
    /// A source or template path does not point at a readable file.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The file exists but is not a presentation container we can parse.
    #[error("Unreadable presentation container {}: {reason}", .path.display())]
    UnreadableContainer { path: PathBuf, reason: String },

    /// A single shape's attributes could not be read.
    #[error("Unreadable shape: {0}")]
    UnreadableShape(String),

    /// A slide has content but no writable text region to put it in.
    #[error("Slide {slide} has no writable text region")]
    NoDestinationRegion { slide: usize },

    /// Slides have to be appended but the deck offers no layout to stamp them from.
    #[error("Deck has no slide layout to create new slides from")]
    MissingLayout,

    /// A slide index past the end of the deck.
    #[error("Slide {index} out of range, deck has {count} slides")]
    SlideOutOfRange { index: usize, count: usize },

    /// The output deck could not be written.
    #[error("Failed to save {}: {reason}", .path.display())]
    Save { path: PathBuf, reason: String },

    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML parsing or writing error (for PPTX).
    #[error("XML error: {0}")]
    Xml(String),

    /// Invalid merge configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Attach a container path to a parse failure.
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::UnreadableContainer {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
