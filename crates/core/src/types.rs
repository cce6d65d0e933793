//! Domain types for representing extracted slide content.

use serde::{Deserialize, Serialize};

/// Position and size of a shape, in EMU (914400 per inch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl Geometry {
    /// Create a geometry from offset and extent.
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Area shared by two bounding boxes, zero when they do not touch.
    pub fn intersection_area(&self, other: &Geometry) -> i128 {
        let x0 = self.left.max(other.left);
        let y0 = self.top.max(other.top);
        let x1 = (self.left + self.width).min(other.left + other.width);
        let y1 = (self.top + self.height).min(other.top + other.height);
        if x1 <= x0 || y1 <= y0 {
            return 0;
        }
        i128::from(x1 - x0) * i128::from(y1 - y0)
    }
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
    Distributed,
}

/// A contiguous span of text sharing one formatting set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub text: String,

    /// `None` means "inherit from the layout".
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub size_pt: Option<f64>,
}

impl RunRecord {
    /// Create a run with inherited formatting.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the font size in points.
    pub fn with_size(mut self, size_pt: f64) -> Self {
        self.size_pt = Some(size_pt);
        self
    }

    /// Set bold on or off.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }
}

/// One paragraph of a text region with its runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    /// Outline level, 0 for top level.
    pub level: u8,
    pub alignment: Option<Alignment>,
    pub runs: Vec<RunRecord>,
}

impl ParagraphRecord {
    /// A top-level paragraph holding a single run.
    pub fn single(run: RunRecord) -> Self {
        Self {
            level: 0,
            alignment: None,
            runs: vec![run],
        }
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A piece of textual content lifted from one source shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Trimmed, never empty.
    pub text: String,

    /// The source shape's name begins with "Title".
    pub is_title: bool,

    /// Zero when the shape exposes no geometry.
    pub geometry: Geometry,

    /// Captured paragraphs and runs, only in preserve-formatting mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatting: Option<Vec<ParagraphRecord>>,
}

impl ContentRecord {
    /// Create a record without captured formatting.
    pub fn new(text: impl Into<String>, is_title: bool, geometry: Geometry) -> Self {
        Self {
            text: text.into(),
            is_title,
            geometry,
            formatting: None,
        }
    }
}

/// What a non-text shape is, when recorded as an occupied region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Pictorial,
    Tabular,
}

/// A region occupied by a picture or table. Never carried as content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionMarker {
    pub kind: MarkerKind,
    pub geometry: Geometry,
}

/// Everything extracted from one source slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideContent {
    /// 0-based slide index.
    pub index: usize,

    /// Records in shape traversal order, not visual order.
    pub records: Vec<ContentRecord>,

    /// Occupied regions, only filled by detailed extraction.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub markers: Vec<RegionMarker>,
}

impl SlideContent {
    /// Create empty content for the slide at `index`.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            records: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// Whether there is no text to place.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of extracted elements, markers included.
    pub fn element_count(&self) -> usize {
        self.records.len() + self.markers.len()
    }

    /// Records in reading order (top-to-bottom, then left-to-right).
    ///
    /// The sort is stable, so records at the same position keep their
    /// traversal order.
    pub fn sorted_records(&self) -> Vec<&ContentRecord> {
        let mut sorted: Vec<&ContentRecord> = self.records.iter().collect();
        sorted.sort_by_key(|r| (r.geometry.top, r.geometry.left));
        sorted
    }
}
