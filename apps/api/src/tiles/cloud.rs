//! Tile word clouds: adapts a tile's term counts to the layout engine and
//! projects the result into tile pixel space.
//!
//! Tile terms arrive already ordered by the tile producer; only the first
//! `max_words` are shown and long labels are shortened before measuring.
//! Elements come back in draw order: the heaviest word is last, so it is
//! painted on top.

use serde::{Deserialize, Serialize};

use crate::layout::{
    layout_weighted, BoundingBox, Cloud, FontRange, LayoutError, TextMeasurer, WordWeight,
};

const ELLIPSIS: &str = "...";

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Geometry and display limits for per-tile clouds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileCloudConfig {
    /// Edge length of a square tile, in pixels.
    pub tile_size: f64,
    /// Horizontal padding on each side of the tile.
    pub pad_x: f64,
    /// Vertical padding on each side; leaves room for the count summary.
    pub pad_y: f64,
    pub max_words: usize,
    pub max_letters: usize,
    pub font_range: FontRange,
}

impl Default for TileCloudConfig {
    fn default() -> Self {
        Self {
            tile_size: 256.0,
            pad_x: 10.0,
            pad_y: 24.0,
            max_words: 10,
            max_letters: 20,
            font_range: FontRange::default(),
        }
    }
}

impl TileCloudConfig {
    /// Layout canvas for one tile, centered on the tile center.
    pub fn bounding_box(&self) -> Result<BoundingBox, LayoutError> {
        let bb = BoundingBox::centered(
            self.tile_size - self.pad_x * 2.0,
            self.tile_size - self.pad_y * 2.0,
        );
        if !bb.is_valid() {
            return Err(LayoutError::InvalidBoundingBox {
                width: bb.width,
                height: bb.height,
            });
        }
        Ok(bb)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request / result types
// ────────────────────────────────────────────────────────────────────────────

/// A term and how often it occurs in the tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: f64,
}

/// A positioned label in tile pixel space (origin at the tile's top-left).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileWord {
    pub word: String,
    /// The untrimmed term, for interaction lookups.
    pub term: String,
    pub count: f64,
    pub font_size: f64,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub rank: usize,
    pub input_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileCloud {
    pub tile_key: String,
    /// Placed words, lowest rank first.
    pub elements: Vec<TileWord>,
    /// Terms that were considered but could not be fit.
    pub dropped: usize,
    /// Terms beyond `max_words` that were never considered.
    pub truncated: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Shortens `text` to `max_letters` characters plus an ellipsis.
pub fn trim_label_text(text: &str, max_letters: usize) -> String {
    match text.char_indices().nth(max_letters) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Lays out one tile's terms and projects the placed words into tile space.
pub fn build_tile_cloud<M>(
    tile_key: &str,
    terms: &[TermCount],
    config: &TileCloudConfig,
    measurer: &M,
) -> Result<TileCloud, LayoutError>
where
    M: TextMeasurer + ?Sized,
{
    let bounding_box = config.bounding_box()?;
    let shown = &terms[..terms.len().min(config.max_words)];

    let entries: Vec<WordWeight> = shown
        .iter()
        .map(|t| WordWeight::new(trim_label_text(&t.term, config.max_letters), t.count))
        .collect();

    let cloud = layout_weighted(&entries, config.font_range, bounding_box, measurer)?;

    Ok(TileCloud {
        tile_key: tile_key.to_string(),
        elements: project_to_tile(&cloud, shown, config.tile_size),
        dropped: cloud.unplaced_count(),
        truncated: terms.len() - shown.len(),
    })
}

/// Converts center-relative placements to top-left tile coordinates, in
/// draw order.
fn project_to_tile(cloud: &Cloud, terms: &[TermCount], tile_size: f64) -> Vec<TileWord> {
    let half = tile_size / 2.0;
    cloud
        .slots
        .iter()
        .rev()
        .filter_map(|slot| {
            let placed = slot.placement.as_ref()?;
            let source = &terms[slot.input_index];
            Some(TileWord {
                word: placed.word.clone(),
                term: source.term.clone(),
                count: source.count,
                font_size: placed.font_size,
                left: half + placed.x - placed.width / 2.0,
                top: half + placed.y - placed.height / 2.0,
                width: placed.width,
                height: placed.height,
                rank: slot.rank,
                input_index: slot.input_index,
            })
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
