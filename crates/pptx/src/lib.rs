//! PPTX (Office Open XML) backend for deck merging.
//!
//! A .pptx file is a ZIP package of XML parts. [`PptxDeck`] reads the package,
//! exposes its slides through the `restyle-core` document model and writes
//! the rebuilt package back out.

pub mod deck;
pub mod package;
pub mod rels;
pub mod shape;
pub mod slide;
pub mod xml;

pub use deck::PptxDeck;
pub use shape::{PlaceholderKey, PptxShape, ShapeClass};
pub use slide::PptxSlide;

use restyle_core::{MergeConfig, Progress, Result};
use std::path::Path;

/// Merge the text of `source` into `template`, writing `output`.
pub fn merge_files(
    source: &Path,
    template: &Path,
    output: &Path,
    config: &MergeConfig,
    progress: &mut dyn FnMut(&Progress),
) -> Result<()> {
    restyle_core::merge::<PptxDeck>(source, template, output, config, progress)
}
