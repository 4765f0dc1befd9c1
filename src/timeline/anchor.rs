//! Nearest-neighbour anchor search over the known index set.

use crate::domain::BoostIndex;
use serde::Serialize;
use std::collections::BTreeSet;

/// Where a newly merged entry goes relative to the existing timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "position", content = "anchorIndex", rename_all = "lowercase")]
pub enum Placement {
    /// Timeline was empty; the entry becomes the sole element.
    Head,
    /// Immediately head-ward of the anchor.
    Before(BoostIndex),
    /// Immediately tail-ward of the anchor.
    After(BoostIndex),
}

impl Placement {
    /// Place `index` next to `anchor`, or at the head when there is no anchor.
    pub fn relative_to(index: BoostIndex, anchor: Option<BoostIndex>) -> Self {
        match anchor {
            None => Placement::Head,
            Some(anchor) if index < anchor => Placement::After(anchor),
            Some(anchor) => Placement::Before(anchor),
        }
    }

    pub fn anchor(&self) -> Option<BoostIndex> {
        match self {
            Placement::Head => None,
            Placement::Before(a) | Placement::After(a) => Some(*a),
        }
    }
}

/// Known index numerically closest to `target`.
///
/// When two known indices are equally close the larger one wins, since the
/// head of the timeline holds the highest indices.
pub fn closest(known: &BTreeSet<BoostIndex>, target: BoostIndex) -> Option<BoostIndex> {
    let below = known.range(..=target).next_back().copied();
    let above = known.range(target..).next().copied();

    match (below, above) {
        (None, None) => None,
        (Some(b), None) => Some(b),
        (None, Some(a)) => Some(a),
        (Some(b), Some(a)) => {
            if target.distance(a) <= target.distance(b) {
                Some(a)
            } else {
                Some(b)
            }
        }
    }
}
