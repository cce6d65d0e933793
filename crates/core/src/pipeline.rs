//! The merge pipeline: extraction, reconciliation, placement and save.

use crate::classify::PlaceholderClassifier;
use crate::config::{MergeConfig, MergeMode};
use crate::error::{Error, Result};
use crate::extract::extract_deck;
use crate::model::{Deck, DeckFile};
use crate::place::{purge, ContentPlacer};
use crate::reconcile::{apply_reconciliation, reconcile, Reconciliation};
use crate::types::SlideContent;
use std::path::{Path, PathBuf};

/// Progress events emitted while a merge runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// A deck was opened.
    DeckLoaded { role: DeckRole, slides: usize },
    /// Content was extracted from one source slide.
    SlideExtracted { slide: usize, elements: usize },
    /// The template was brought to the source's slide count.
    Reconciled(Reconciliation),
    /// One output slide was purged and, if it had content, filled.
    SlideProcessed {
        slide: usize,
        cleared: usize,
        written: usize,
        status: SlideStatus,
    },
    /// The output deck was written.
    Saved { path: PathBuf, bytes: u64 },
}

/// Which input a deck came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckRole {
    Source,
    Template,
}

/// Outcome of processing one output slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideStatus {
    Filled,
    /// The source slide carried no text.
    NoContent,
    /// Content was present but the slide had no writable region.
    NoDestination,
    /// Lightweight mode only purges.
    Cleaned,
}

/// Merge `source` content into the look of `template`, writing `output`.
///
/// Fails before any processing when an input is missing, and without
/// touching `output` when a deck cannot be read. Per-shape and per-slide
/// problems are logged and reported through `progress`, never returned.
pub fn merge<D: DeckFile>(
    source: &Path,
    template: &Path,
    output: &Path,
    config: &MergeConfig,
    progress: &mut dyn FnMut(&Progress),
) -> Result<()> {
    check_input(source)?;
    check_input(template)?;
    config.validate()?;

    log::info!(
        "Merging {} into {} ({:?} mode)",
        source.display(),
        template.display(),
        config.mode
    );

    let deck = match config.mode {
        MergeMode::Styled => {
            let source_deck = D::open(source)?;
            emit(progress, Progress::DeckLoaded {
                role: DeckRole::Source,
                slides: source_deck.slides().len(),
            });

            let contents = extract_deck(&source_deck, config.preserve_formatting);
            for content in &contents {
                emit(progress, Progress::SlideExtracted {
                    slide: content.index,
                    elements: content.element_count(),
                });
            }

            let template_deck = D::open(template)?;
            emit(progress, Progress::DeckLoaded {
                role: DeckRole::Template,
                slides: template_deck.slides().len(),
            });

            merge_styled(template_deck, &contents, config, progress)?
        }
        MergeMode::Lightweight => {
            let mut source_deck = D::open(source)?;
            emit(progress, Progress::DeckLoaded {
                role: DeckRole::Source,
                slides: source_deck.slides().len(),
            });

            clean_lightweight(&mut source_deck, config, progress);
            source_deck
        }
    };

    let bytes = deck.save(output)?;
    emit(progress, Progress::Saved {
        path: output.to_path_buf(),
        bytes,
    });
    Ok(())
}

/// Reconcile `template` to the extracted contents and place them slide by slide.
pub fn merge_styled<D: Deck>(
    template: D,
    contents: &[SlideContent],
    config: &MergeConfig,
    progress: &mut dyn FnMut(&Progress),
) -> Result<D> {
    let plan = reconcile(contents.len(), template.slide_count());
    let mut deck = apply_reconciliation(template, &plan, config.truncate)?;
    emit(progress, Progress::Reconciled(plan));

    let placer = ContentPlacer::new(config);
    for (index, (slide, content)) in deck.slides_mut().iter_mut().zip(contents).enumerate() {
        let event = if content.is_empty() {
            let cleared = purge(slide, placer.classifier());
            Progress::SlideProcessed {
                slide: index,
                cleared,
                written: 0,
                status: SlideStatus::NoContent,
            }
        } else {
            let outcome = placer.place(slide, content);
            let status = if outcome.filled {
                SlideStatus::Filled
            } else {
                log::warn!("{}", Error::NoDestinationRegion { slide: index + 1 });
                SlideStatus::NoDestination
            };
            Progress::SlideProcessed {
                slide: index,
                cleared: outcome.cleared_count,
                written: outcome.written,
                status,
            }
        };
        emit(progress, event);
    }

    Ok(deck)
}

/// Purge the deck's own placeholder text with the lightweight classifier.
pub fn clean_lightweight<D: Deck>(
    deck: &mut D,
    config: &MergeConfig,
    progress: &mut dyn FnMut(&Progress),
) -> usize {
    let classifier = PlaceholderClassifier::lightweight(config);
    let mut total = 0;
    for (index, slide) in deck.slides_mut().iter_mut().enumerate() {
        let cleared = purge(slide, &classifier);
        total += cleared;
        emit(progress, Progress::SlideProcessed {
            slide: index,
            cleared,
            written: 0,
            status: SlideStatus::Cleaned,
        });
    }
    log::info!("Cleaned {} potential placeholders", total);
    total
}

fn check_input(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::InputNotFound(path.to_path_buf()))
    }
}

fn emit(progress: &mut dyn FnMut(&Progress), event: Progress) {
    log::debug!("{:?}", event);
    progress(&event);
}
