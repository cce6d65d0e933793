//! In-memory deck used by the unit tests of the merge algorithm.

use crate::error::{Error, Result};
use crate::model::{Deck, DeckBuilder, DeckFile, ShapeView, Slide, TextRegion};
use crate::types::{Geometry, ParagraphRecord, RunRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MockRegion {
    pub name: String,
    pub geometry: Option<Geometry>,
    pub paragraphs: Vec<ParagraphRecord>,
    pub unreadable: bool,
}

impl MockRegion {
    pub fn new(name: &str, text: &str) -> Self {
        let paragraphs = if text.is_empty() {
            Vec::new()
        } else {
            text.split('\n')
                .map(|line| ParagraphRecord::single(RunRecord::new(line)))
                .collect()
        };
        Self {
            name: name.to_string(),
            geometry: None,
            paragraphs,
            unreadable: false,
        }
    }

    pub fn at(mut self, left: i64, top: i64) -> Self {
        self.geometry = Some(Geometry::new(left, top, 1000, 500));
        self
    }

    pub fn sized(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn first_run(&self) -> Option<&RunRecord> {
        self.paragraphs.first().and_then(|p| p.runs.first())
    }
}

impl TextRegion for MockRegion {
    fn name(&self) -> &str {
        &self.name
    }

    fn geometry(&self) -> Result<Option<Geometry>> {
        if self.unreadable {
            return Err(Error::UnreadableShape(format!("{}: bad xfrm", self.name)));
        }
        Ok(self.geometry)
    }

    fn paragraphs(&self) -> Vec<ParagraphRecord> {
        self.paragraphs.clone()
    }

    fn clear(&mut self) {
        self.paragraphs.clear();
    }

    fn write(&mut self, paragraphs: &[ParagraphRecord]) {
        self.paragraphs = paragraphs.to_vec();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MockShape {
    Text(MockRegion),
    Picture(Geometry),
    Table(Geometry),
    Broken,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MockSlide {
    pub layout: String,
    pub shapes: Vec<MockShape>,
}

impl MockSlide {
    pub fn new(layout: &str) -> Self {
        Self {
            layout: layout.to_string(),
            shapes: Vec::new(),
        }
    }

    pub fn with(mut self, region: MockRegion) -> Self {
        self.shapes.push(MockShape::Text(region));
        self
    }

    pub fn with_shape(mut self, shape: MockShape) -> Self {
        self.shapes.push(shape);
        self
    }

    pub fn region(&self, index: usize) -> &MockRegion {
        self.shapes
            .iter()
            .filter_map(|s| match s {
                MockShape::Text(r) => Some(r),
                _ => None,
            })
            .nth(index)
            .expect("no such region")
    }
}

impl Slide for MockSlide {
    type Region = MockRegion;

    fn shapes(&self) -> Vec<Result<ShapeView<'_, MockRegion>>> {
        self.shapes
            .iter()
            .map(|s| match s {
                MockShape::Text(r) => Ok(ShapeView::Textual(r)),
                MockShape::Picture(g) => Ok(ShapeView::Pictorial(*g)),
                MockShape::Table(g) => Ok(ShapeView::Tabular(*g)),
                MockShape::Broken => Err(Error::UnreadableShape("broken".into())),
            })
            .collect()
    }

    fn regions_mut(&mut self) -> Vec<&mut MockRegion> {
        self.shapes
            .iter_mut()
            .filter_map(|s| match s {
                MockShape::Text(r) => Some(r),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MockDeck {
    pub layouts: Vec<String>,
    pub slides: Vec<MockSlide>,
}

impl MockDeck {
    pub fn new(slides: Vec<MockSlide>) -> Self {
        Self {
            layouts: vec!["Title and Content".to_string()],
            slides,
        }
    }

    /// A deck of `count` slides, each holding one titled placeholder pair.
    pub fn template(count: usize) -> Self {
        let slides = (0..count)
            .map(|i| {
                MockSlide::new(&format!("layout{}", i))
                    .with(MockRegion::new("Title 1", "Click to add title").at(0, 0))
                    .with(MockRegion::new("Content Placeholder 2", "Main content").at(0, 1000))
            })
            .collect();
        Self::new(slides)
    }

    pub fn write_json(&self, path: &Path) {
        std::fs::write(path, serde_json::to_string(self).unwrap()).unwrap();
    }
}

impl DeckBuilder for MockDeck {
    type Layout = String;

    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn layout_of(&self, index: usize) -> Option<String> {
        self.slides.get(index).map(|s| s.layout.clone())
    }

    fn fallback_layout(&self) -> Option<String> {
        self.layouts.first().cloned()
    }

    fn create_empty(style_source: &Self) -> Self {
        Self {
            layouts: style_source.layouts.clone(),
            slides: Vec::new(),
        }
    }

    fn append_slide(&mut self, layout: &String) -> Result<()> {
        self.slides.push(
            MockSlide::new(layout)
                .with(MockRegion::new("Title 1", ""))
                .with(MockRegion::new("Content Placeholder 2", "")),
        );
        Ok(())
    }

    fn append_copy(&mut self, from: &Self, index: usize) -> Result<()> {
        let slide = from
            .slides
            .get(index)
            .cloned()
            .ok_or(Error::SlideOutOfRange {
                index,
                count: from.slides.len(),
            })?;
        self.slides.push(slide);
        Ok(())
    }
}

impl Deck for MockDeck {
    type Slide = MockSlide;

    fn slides(&self) -> &[MockSlide] {
        &self.slides
    }

    fn slides_mut(&mut self) -> &mut [MockSlide] {
        &mut self.slides
    }
}

impl DeckFile for MockDeck {
    fn open(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| Error::unreadable(path, e))
    }

    fn save(&self, path: &Path) -> Result<u64> {
        let json = serde_json::to_string(self).map_err(|e| Error::Xml(e.to_string()))?;
        std::fs::write(path, &json).map_err(|e| Error::Save {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(json.len() as u64)
    }
}
