//! Content extraction from source slides.

use crate::model::{Deck, ShapeView, Slide, TextRegion};
use crate::types::{ContentRecord, MarkerKind, ParagraphRecord, RegionMarker, SlideContent};

/// Extract the textual content of one slide.
///
/// Records follow the slide's native shape order. With `detailed` set, the
/// paragraphs and runs of every record are captured and pictures and tables
/// are noted as occupied regions. A shape that cannot be read is skipped.
pub fn extract_slide_content<S: Slide>(slide: &S, index: usize, detailed: bool) -> SlideContent {
    let mut content = SlideContent::new(index);

    for (position, shape) in slide.shapes().into_iter().enumerate() {
        let shape = match shape {
            Ok(shape) => shape,
            Err(e) => {
                log::warn!("Slide {}: skipping shape {}: {}", index + 1, position, e);
                continue;
            }
        };

        match shape {
            ShapeView::Textual(region) => match extract_record(region, detailed) {
                Ok(Some(record)) => content.records.push(record),
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Slide {}: skipping shape '{}': {}", index + 1, region.name(), e);
                }
            },
            ShapeView::Pictorial(geometry) if detailed => content.markers.push(RegionMarker {
                kind: MarkerKind::Pictorial,
                geometry,
            }),
            ShapeView::Tabular(geometry) if detailed => content.markers.push(RegionMarker {
                kind: MarkerKind::Tabular,
                geometry,
            }),
            _ => {}
        }
    }

    log::debug!(
        "Slide {}: {} text records, {} markers",
        index + 1,
        content.records.len(),
        content.markers.len()
    );
    content
}

/// Extract every slide of a deck, one entry per slide.
pub fn extract_deck<D: Deck>(deck: &D, detailed: bool) -> Vec<SlideContent> {
    deck.slides()
        .iter()
        .enumerate()
        .map(|(index, slide)| extract_slide_content(slide, index, detailed))
        .collect()
}

fn extract_record<R: TextRegion>(
    region: &R,
    detailed: bool,
) -> crate::Result<Option<ContentRecord>> {
    let paragraphs = region.paragraphs();
    let text = joined_text(&paragraphs);
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let geometry = region.geometry()?.unwrap_or_default();
    let mut record = ContentRecord::new(text, region.is_title(), geometry);

    if detailed {
        let kept: Vec<ParagraphRecord> = paragraphs
            .into_iter()
            .filter(|p| !p.text().trim().is_empty())
            .collect();
        record.formatting = Some(kept);
    }

    Ok(Some(record))
}

fn joined_text(paragraphs: &[ParagraphRecord]) -> String {
    paragraphs
        .iter()
        .map(ParagraphRecord::text)
        .collect::<Vec<_>>()
        .join("\n")
}
