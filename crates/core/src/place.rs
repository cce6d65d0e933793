//! Content placement into template slides.
//!
//! Purges placeholder boilerplate from a slide, then writes the extracted
//! source records into its text regions.

use crate::classify::PlaceholderClassifier;
use crate::config::{MergeConfig, PlacementStrategy};
use crate::model::{Slide, TextRegion};
use crate::types::{ContentRecord, ParagraphRecord, RunRecord, SlideContent};

/// Result of one placement pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementOutcome {
    /// False when the slide had no writable region for the content.
    pub filled: bool,

    /// Regions cleared by the placeholder purge.
    pub cleared_count: usize,

    /// Records written into a region.
    pub written: usize,

    /// Records dropped for lack of regions.
    pub dropped: usize,
}

/// Clear every text region whose text is placeholder boilerplate.
///
/// Empty regions are left alone. Returns the number of regions cleared.
pub fn purge<S: Slide>(slide: &mut S, classifier: &PlaceholderClassifier) -> usize {
    let mut cleared = 0;
    for region in slide.regions_mut() {
        let text = region.text();
        if classifier.is_placeholder(&text) {
            log::debug!("Clearing placeholder '{}' in {}", text.trim(), region.name());
            region.clear();
            cleared += 1;
        }
    }
    cleared
}

/// Writes extracted content into template slides.
#[derive(Debug, Clone)]
pub struct ContentPlacer {
    classifier: PlaceholderClassifier,
    strategy: PlacementStrategy,
    title_size_pt: f64,
    body_size_pt: f64,
}

impl ContentPlacer {
    /// Create a placer from a merge configuration.
    pub fn new(config: &MergeConfig) -> Self {
        Self {
            classifier: PlaceholderClassifier::styled(config),
            strategy: config.strategy,
            title_size_pt: config.title_font_size_pt,
            body_size_pt: config.body_font_size_pt,
        }
    }

    /// The classifier used for the purge step.
    pub fn classifier(&self) -> &PlaceholderClassifier {
        &self.classifier
    }

    /// Purge placeholders on `slide`, then write `content` into its regions.
    pub fn place<S: Slide>(&self, slide: &mut S, content: &SlideContent) -> PlacementOutcome {
        let cleared_count = purge(slide, &self.classifier);

        let mut regions = slide.regions_mut();
        let sorted = content.sorted_records();
        if regions.is_empty() {
            return PlacementOutcome {
                filled: false,
                cleared_count,
                written: 0,
                dropped: sorted.len(),
            };
        }

        let assignment = match self.strategy {
            PlacementStrategy::Positional => assign_positional(sorted.len(), regions.len()),
            PlacementStrategy::Overlap => assign_by_overlap(&sorted, &regions),
        };

        let mut written = 0;
        for (order, record) in sorted.iter().enumerate() {
            let Some(target) = assignment[order] else {
                log::debug!(
                    "Slide {}: no region left for '{}'",
                    content.index + 1,
                    record.text
                );
                continue;
            };

            let paragraphs = self.render(record, order == 0);
            let region = &mut regions[target];
            region.clear();
            region.write(&paragraphs);
            written += 1;
        }

        PlacementOutcome {
            filled: true,
            cleared_count,
            written,
            dropped: sorted.len() - written,
        }
    }

    /// Paragraphs to write for a record.
    ///
    /// Captured formatting wins; otherwise the whole text goes into one
    /// paragraph sized as title or body.
    fn render(&self, record: &ContentRecord, first: bool) -> Vec<ParagraphRecord> {
        if let Some(captured) = record.formatting.as_ref().filter(|p| !p.is_empty()) {
            return captured.clone();
        }

        let run = if record.is_title || first {
            RunRecord::new(record.text.as_str())
                .with_size(self.title_size_pt)
                .with_bold(true)
        } else {
            RunRecord::new(record.text.as_str()).with_size(self.body_size_pt)
        };
        vec![ParagraphRecord::single(run)]
    }
}

/// Record i goes to region i; records past the region count get nothing.
fn assign_positional(records: usize, regions: usize) -> Vec<Option<usize>> {
    (0..records).map(|i| (i < regions).then_some(i)).collect()
}

/// Each record, in reading order, takes the free region it overlaps most.
///
/// Records without geometry or without any overlapping free region fall
/// back to the lowest-index free region.
fn assign_by_overlap<R: TextRegion>(
    sorted: &[&ContentRecord],
    regions: &[&mut R],
) -> Vec<Option<usize>> {
    let bounds: Vec<_> = regions
        .iter()
        .map(|r| r.geometry().ok().flatten())
        .collect();
    let mut taken = vec![false; regions.len()];

    sorted
        .iter()
        .map(|record| {
            let best = bounds
                .iter()
                .enumerate()
                .filter(|(i, _)| !taken[*i])
                .filter_map(|(i, b)| b.map(|b| (i, record.geometry.intersection_area(&b))))
                .filter(|(_, area)| *area > 0)
                // Ties go to the earlier region.
                .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
                .map(|(i, _)| i)
                .or_else(|| taken.iter().position(|t| !t));

            if let Some(i) = best {
                taken[i] = true;
            }
            best
        })
        .collect()
}
