//! The document-model contract the merge algorithm runs against.
//!
//! A container backend (such as the PPTX crate) implements these traits; the
//! classifier, extractor, reconciler and placer only ever see them.

use crate::error::Result;
use crate::types::{Geometry, ParagraphRecord};
use std::fmt::Debug;
use std::path::Path;

/// A shape seen through the capabilities the merge cares about.
#[derive(Debug)]
pub enum ShapeView<'a, R> {
    /// Exposes a readable and writable text frame.
    Textual(&'a R),
    /// A picture; only its position is of interest.
    Pictorial(Geometry),
    /// A table; only its position is of interest.
    Tabular(Geometry),
    /// Anything else (connectors, groups, charts).
    Other,
}

/// A writable text container on a slide.
pub trait TextRegion {
    /// Structural name of the shape, e.g. "Title 1".
    fn name(&self) -> &str;

    /// Title regions are recognised by naming convention.
    fn is_title(&self) -> bool {
        self.name().starts_with("Title")
    }

    /// Position and size; `Ok(None)` when the shape carries none.
    fn geometry(&self) -> Result<Option<Geometry>>;

    /// Paragraphs with their run formatting.
    fn paragraphs(&self) -> Vec<ParagraphRecord>;

    /// Plain text, paragraphs joined by newlines.
    fn text(&self) -> String {
        self.paragraphs()
            .iter()
            .map(ParagraphRecord::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Remove all text, leaving a single empty paragraph.
    fn clear(&mut self);

    /// Replace the text with the given paragraphs.
    fn write(&mut self, paragraphs: &[ParagraphRecord]);
}

/// A slide as an ordered collection of shapes.
pub trait Slide {
    type Region: TextRegion;

    /// Shapes in native order. An `Err` is a shape that could not be read.
    fn shapes(&self) -> Vec<Result<ShapeView<'_, Self::Region>>>;

    /// Writable text regions in encounter order.
    fn regions_mut(&mut self) -> Vec<&mut Self::Region>;
}

/// The ability to build a deck slide by slide.
///
/// This is all slide-count reconciliation needs; it never deletes slides in
/// place.
pub trait DeckBuilder: Sized {
    /// Handle to a reusable slide layout.
    type Layout: Clone + Debug;

    fn slide_count(&self) -> usize;

    /// Layout the slide at `index` was stamped from.
    fn layout_of(&self, index: usize) -> Option<Self::Layout>;

    /// Any layout of the deck, for decks without slides.
    fn fallback_layout(&self) -> Option<Self::Layout>;

    /// A deck with the masters, layouts and theme of `style_source` but no slides.
    fn create_empty(style_source: &Self) -> Self;

    /// Append a new slide stamped from `layout`, carrying its empty placeholders.
    fn append_slide(&mut self, layout: &Self::Layout) -> Result<()>;

    /// Append a copy of slide `index` of `from`, shapes included.
    ///
    /// `from` must share the masters and media of `self`, which holds for
    /// decks made by [`DeckBuilder::create_empty`].
    fn append_copy(&mut self, from: &Self, index: usize) -> Result<()>;
}

/// A deck whose slides can be read and mutated.
pub trait Deck: DeckBuilder {
    type Slide: Slide;

    fn slides(&self) -> &[Self::Slide];

    fn slides_mut(&mut self) -> &mut [Self::Slide];
}

/// A deck backed by a file format.
pub trait DeckFile: Deck {
    /// Read a deck. Malformed containers fail with `UnreadableContainer`.
    fn open(path: &Path) -> Result<Self>;

    /// Serialize the whole deck and write it once. Returns the bytes written.
    fn save(&self, path: &Path) -> Result<u64>;
}
