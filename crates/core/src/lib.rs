//! Core domain types, placeholder classification, content placement and the
//! merge pipeline for moving slide text into a template deck.

pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod place;
pub mod reconcile;
pub mod types;

#[cfg(test)]
mod mock;

pub use classify::PlaceholderClassifier;
pub use config::{MergeConfig, MergeMode, PlacementStrategy, TruncatePolicy};
pub use error::{Error, Result};
pub use extract::{extract_deck, extract_slide_content};
pub use model::{Deck, DeckBuilder, DeckFile, ShapeView, Slide, TextRegion};
pub use pipeline::{merge, DeckRole, Progress, SlideStatus};
pub use place::{purge, ContentPlacer, PlacementOutcome};
pub use reconcile::{apply_reconciliation, reconcile, ReconcileAction, Reconciliation};
pub use types::{
    Alignment, ContentRecord, Geometry, MarkerKind, ParagraphRecord, RegionMarker, RunRecord,
    SlideContent,
};
