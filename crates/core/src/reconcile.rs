//! Slide count reconciliation between source and template decks.
//!
//! Placement is 1:1 by slide index, so the output deck must have exactly as
//! many slides as the source before any content is written.

use crate::config::TruncatePolicy;
use crate::error::{Error, Result};
use crate::model::DeckBuilder;
use serde::Serialize;

/// What has to happen to the template to match the source slide count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "action")]
pub enum ReconcileAction {
    /// Counts already match.
    None,
    /// Stamp `count` new slides from the last template slide's layout.
    Append { count: usize },
    /// Rebuild the deck from the first `keep` template slides.
    Truncate { keep: usize },
}

/// Result of comparing slide counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub final_count: usize,
    pub action: ReconcileAction,
}

/// Decide how many slides the output needs and how to get there.
pub fn reconcile(source_count: usize, template_count: usize) -> Reconciliation {
    use std::cmp::Ordering;

    match template_count.cmp(&source_count) {
        Ordering::Less => Reconciliation {
            final_count: source_count,
            action: ReconcileAction::Append {
                count: source_count - template_count,
            },
        },
        Ordering::Greater => Reconciliation {
            final_count: source_count,
            action: ReconcileAction::Truncate { keep: source_count },
        },
        Ordering::Equal => Reconciliation {
            final_count: template_count,
            action: ReconcileAction::None,
        },
    }
}

/// Carry out a reconciliation plan on `deck` using only the builder capability.
pub fn apply_reconciliation<D: DeckBuilder>(
    deck: D,
    plan: &Reconciliation,
    policy: TruncatePolicy,
) -> Result<D> {
    match plan.action {
        ReconcileAction::None => Ok(deck),
        ReconcileAction::Append { count } => {
            let mut deck = deck;
            let last = deck.slide_count().checked_sub(1);
            let layout = last
                .and_then(|i| deck.layout_of(i))
                .or_else(|| deck.fallback_layout())
                .ok_or(Error::MissingLayout)?;

            log::info!("Appending {} slides stamped from {:?}", count, layout);
            for _ in 0..count {
                deck.append_slide(&layout)?;
            }
            Ok(deck)
        }
        ReconcileAction::Truncate { keep } => {
            log::info!(
                "Dropping {} slides, keeping the first {} ({:?})",
                deck.slide_count().saturating_sub(keep),
                keep,
                policy
            );
            let mut rebuilt = D::create_empty(&deck);
            for index in 0..keep {
                match policy {
                    TruncatePolicy::KeepSlides => rebuilt.append_copy(&deck, index)?,
                    TruncatePolicy::BareLayouts => {
                        let layout = deck
                            .layout_of(index)
                            .or_else(|| deck.fallback_layout())
                            .ok_or(Error::MissingLayout)?;
                        rebuilt.append_slide(&layout)?;
                    }
                }
            }
            Ok(rebuilt)
        }
    }
}
