//! Word cloud packer: greedy spiral placement of weighted words.
//!
//! # Pipeline
//! 1. Validate the whole request up front (`LayoutError`); nothing is measured
//!    or placed for a bad request.
//! 2. Rank words by weight, highest first. The sort is stable.
//! 3. Scale each weight to a font size (`ln(sum)` heuristic, clamped).
//! 4. Measure every word, trimming 20% off the measured height.
//! 5. Place words in rank order by walking a spiral out from the box center
//!    until the word clears every placed word and the border.
//!
//! A word that hits the border more than `MAX_BORDER_COLLISIONS` times is left
//! unplaced. That cap is the only thing bounding the per-word search.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::layout::font_metrics::TextMeasurer;
use crate::layout::geometry::{BoundingBox, CenteredBox, TextSize};
use crate::layout::spiral::SpiralState;

/// Border hits tolerated per word; the next one abandons the word.
pub const MAX_BORDER_COLLISIONS: u32 = 20;

/// Fraction of the measured height kept. Measured boxes include line padding
/// that rendered cloud words do not use.
pub const HEIGHT_FACTOR: f64 = 0.8;

// ────────────────────────────────────────────────────────────────────────────
// Input types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordWeight {
    pub word: String,
    pub weight: f64,
}

impl WordWeight {
    pub fn new(word: impl Into<String>, weight: f64) -> Self {
        Self {
            word: word.into(),
            weight,
        }
    }
}

/// Inclusive font-size bounds, in the measurer's units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontRange {
    pub min_font_size: f64,
    pub max_font_size: f64,
}

impl FontRange {
    pub fn new(min_font_size: f64, max_font_size: f64) -> Result<Self, LayoutError> {
        let range = Self {
            min_font_size,
            max_font_size,
        };
        range.validate()?;
        Ok(range)
    }

    fn validate(&self) -> Result<(), LayoutError> {
        let (min, max) = (self.min_font_size, self.max_font_size);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && min <= max) {
            return Err(LayoutError::InvalidFontRange { min, max });
        }
        Ok(())
    }

    pub fn span(&self) -> f64 {
        self.max_font_size - self.min_font_size
    }

    pub fn clamp(&self, font_size: f64) -> f64 {
        font_size.max(self.min_font_size).min(self.max_font_size)
    }

    /// Unclamped font size for weight `weight` out of a total of `sum`.
    ///
    /// `share * span * ln(sum) + min * share`. Large totals push sizes toward
    /// the maximum for the same share; a zero total yields zero (clamped to
    /// the minimum by `font_size`).
    pub fn raw_font_size(&self, weight: f64, sum: f64) -> f64 {
        if sum <= 0.0 {
            return 0.0;
        }
        let share = weight / sum;
        share * self.span() * sum.ln() + self.min_font_size * share
    }

    pub fn font_size(&self, weight: f64, sum: f64) -> f64 {
        self.clamp(self.raw_font_size(weight, sum))
    }
}

impl Default for FontRange {
    fn default() -> Self {
        Self {
            min_font_size: 12.0,
            max_font_size: 30.0,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// A successfully placed word. `(x, y)` is the center of the word's box in
/// the bounding box's coordinate space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedWord {
    pub word: String,
    pub font_size: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacedWord {
    pub fn bounds(&self) -> CenteredBox {
        CenteredBox::new(self.x, self.y, TextSize::new(self.width, self.height))
    }
}

/// One ranked word and the outcome of its placement search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudSlot {
    /// Position in descending-weight order, 0 = heaviest.
    pub rank: usize,
    /// Position of the word in the caller's input.
    pub input_index: usize,
    pub word: String,
    pub weight: f64,
    pub font_size: f64,
    pub border_collisions: u32,
    /// Spiral steps taken, including the successful one.
    pub attempts: u32,
    /// `None` when the word could not be fit.
    pub placement: Option<PlacedWord>,
}

impl CloudSlot {
    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }
}

/// Rank-ordered layout result: one slot per input word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cloud {
    pub bounding_box: BoundingBox,
    pub font_range: FontRange,
    pub slots: Vec<CloudSlot>,
}

impl Cloud {
    pub fn placed(&self) -> impl Iterator<Item = &PlacedWord> {
        self.slots.iter().filter_map(|s| s.placement.as_ref())
    }

    pub fn unplaced_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_placed()).count()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("got {words} words but {weights} weights")]
    LengthMismatch { words: usize, weights: usize },

    #[error("weight for '{word}' must be a finite number >= 0, got {weight}")]
    InvalidWeight { word: String, weight: f64 },

    #[error("font range must be positive with min <= max, got {min}..{max}")]
    InvalidFontRange { min: f64, max: f64 },

    #[error("bounding box must have a finite center and positive size, got {width}x{height}")]
    InvalidBoundingBox { width: f64, height: f64 },

    #[error("measured size for '{word}' must be finite and non-negative, got {width}x{height}")]
    InvalidMeasurement { word: String, width: f64, height: f64 },
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry points
// ────────────────────────────────────────────────────────────────────────────

/// Lays out parallel `words`/`weights` lists. See [`layout_weighted`].
pub fn layout_cloud<S, M>(
    words: &[S],
    weights: &[f64],
    font_range: FontRange,
    bounding_box: BoundingBox,
    measurer: &M,
) -> Result<Cloud, LayoutError>
where
    S: AsRef<str>,
    M: TextMeasurer + ?Sized,
{
    if words.len() != weights.len() {
        return Err(LayoutError::LengthMismatch {
            words: words.len(),
            weights: weights.len(),
        });
    }
    let entries: Vec<WordWeight> = words
        .iter()
        .zip(weights)
        .map(|(w, &c)| WordWeight::new(w.as_ref(), c))
        .collect();
    layout_weighted(&entries, font_range, bounding_box, measurer)
}

/// Lays out weighted words inside `bounding_box`.
///
/// Returns one slot per entry, heaviest first. The engine places every entry
/// it is given; callers apply any display cap beforehand.
pub fn layout_weighted<M>(
    entries: &[WordWeight],
    font_range: FontRange,
    bounding_box: BoundingBox,
    measurer: &M,
) -> Result<Cloud, LayoutError>
where
    M: TextMeasurer + ?Sized,
{
    validate(entries, &font_range, &bounding_box)?;

    let sum: f64 = entries.iter().map(|e| e.weight).sum();

    let mut ranked: Vec<(usize, &WordWeight)> = entries.iter().enumerate().collect();
    ranked.sort_by(|(_, a), (_, b)| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Every measurement is checked before the first placement.
    let mut sized = Vec::with_capacity(ranked.len());
    for (input_index, entry) in ranked {
        let font_size = font_range.font_size(entry.weight, sum);
        let measured = measurer.measure(&entry.word, font_size);
        if !measured.is_valid() {
            return Err(LayoutError::InvalidMeasurement {
                word: entry.word.clone(),
                width: measured.width,
                height: measured.height,
            });
        }
        let size = TextSize::new(measured.width, measured.height * HEIGHT_FACTOR);
        sized.push((input_index, entry, font_size, size));
    }

    let mut committed: Vec<CenteredBox> = Vec::with_capacity(sized.len());
    let mut slots = Vec::with_capacity(sized.len());

    for (rank, (input_index, entry, font_size, size)) in sized.into_iter().enumerate() {
        let outcome = search_position(size, &committed, &bounding_box);

        let placement = outcome.position.map(|(x, y)| {
            let placed = PlacedWord {
                word: entry.word.clone(),
                font_size,
                x,
                y,
                width: size.width,
                height: size.height,
            };
            committed.push(placed.bounds());
            placed
        });

        if placement.is_none() {
            debug!(
                word = %entry.word,
                rank,
                border_collisions = outcome.border_collisions,
                "cloud word abandoned"
            );
        }

        slots.push(CloudSlot {
            rank,
            input_index,
            word: entry.word.clone(),
            weight: entry.weight,
            font_size,
            border_collisions: outcome.border_collisions,
            attempts: outcome.attempts,
            placement,
        });
    }

    debug!(
        words = slots.len(),
        placed = committed.len(),
        width = bounding_box.width,
        height = bounding_box.height,
        "cloud layout complete"
    );

    Ok(Cloud {
        bounding_box,
        font_range,
        slots,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn validate(
    entries: &[WordWeight],
    font_range: &FontRange,
    bounding_box: &BoundingBox,
) -> Result<(), LayoutError> {
    font_range.validate()?;

    if !bounding_box.is_valid() {
        return Err(LayoutError::InvalidBoundingBox {
            width: bounding_box.width,
            height: bounding_box.height,
        });
    }

    if let Some(bad) = entries
        .iter()
        .find(|e| !(e.weight.is_finite() && e.weight >= 0.0))
    {
        return Err(LayoutError::InvalidWeight {
            word: bad.word.clone(),
            weight: bad.weight,
        });
    }

    Ok(())
}

enum Collision {
    Word,
    Border,
}

fn collision(
    candidate: &CenteredBox,
    committed: &[CenteredBox],
    bb: &BoundingBox,
) -> Option<Collision> {
    if committed.iter().any(|placed| candidate.intersects(placed)) {
        return Some(Collision::Word);
    }
    if bb.border_collides(candidate) {
        return Some(Collision::Border);
    }
    None
}

struct SearchOutcome {
    position: Option<(f64, f64)>,
    border_collisions: u32,
    attempts: u32,
}

/// Walks a fresh spiral until `size` fits or the border budget runs out.
fn search_position(size: TextSize, committed: &[CenteredBox], bb: &BoundingBox) -> SearchOutcome {
    let mut spiral = SpiralState::default();
    let mut border_collisions = 0u32;
    let mut attempts = 0u32;

    loop {
        spiral.advance();
        attempts += 1;

        let candidate = CenteredBox::new(bb.x + spiral.x, bb.y + spiral.y, size);
        match collision(&candidate, committed, bb) {
            None => {
                return SearchOutcome {
                    position: Some((candidate.x, candidate.y)),
                    border_collisions,
                    attempts,
                };
            }
            Some(Collision::Word) => {}
            Some(Collision::Border) => {
                spiral.widen();
                border_collisions += 1;
                if border_collisions > MAX_BORDER_COLLISIONS {
                    return SearchOutcome {
                        position: None,
                        border_collisions,
                        attempts,
                    };
                }
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::{get_metrics, FontFamily};

    fn fixed_40x14(_: &str, _: f64) -> TextSize {
        TextSize::new(40.0, 14.0)
    }

    fn tile_box() -> BoundingBox {
        BoundingBox::centered(236.0, 208.0)
    }

    fn radius(p: &PlacedWord) -> f64 {
        (p.x * p.x + p.y * p.y).sqrt()
    }

    fn assert_no_overlaps(cloud: &Cloud) {
        let placed: Vec<&PlacedWord> = cloud.placed().collect();
        for (i, a) in placed.iter().enumerate() {
            assert!(
                !cloud.bounding_box.border_collides(&a.bounds()),
                "'{}' escapes the bounding box",
                a.word
            );
            for b in placed.iter().skip(i + 1) {
                assert!(
                    !a.bounds().intersects(&b.bounds()),
                    "'{}' overlaps '{}'",
                    a.word,
                    b.word
                );
            }
        }
    }

    fn many_words(n: usize) -> (Vec<String>, Vec<f64>) {
        let words = (0..n).map(|i| format!("term{i}")).collect();
        let weights = (0..n).map(|i| ((i * 37) % 23 + 1) as f64).collect();
        (words, weights)
    }

    #[test]
    fn test_three_word_scenario() {
        let cloud = layout_cloud(
            &["alpha", "beta", "gamma"],
            &[10.0, 5.0, 1.0],
            FontRange::default(),
            tile_box(),
            &fixed_40x14,
        )
        .unwrap();

        let order: Vec<&str> = cloud.slots.iter().map(|s| s.word.as_str()).collect();
        assert_eq!(order, ["alpha", "beta", "gamma"]);
        assert_eq!(cloud.unplaced_count(), 0);

        let alpha = cloud.slots[0].placement.as_ref().unwrap();
        let beta = cloud.slots[1].placement.as_ref().unwrap();
        let gamma = cloud.slots[2].placement.as_ref().unwrap();

        // Empty cloud: alpha takes the very first spiral point.
        let first = std::f64::consts::TAU / 10.0;
        assert_eq!(cloud.slots[0].attempts, 1);
        assert!((alpha.x - first.cos()).abs() < 1e-9);
        assert!((alpha.y - first.sin()).abs() < 1e-9);
        assert!((alpha.height - 11.2).abs() < 1e-9, "height trimmed by 20%");
        assert_eq!(alpha.width, 40.0);

        assert!(radius(beta) > radius(alpha));
        assert!(radius(gamma) > radius(alpha));
        assert!(radius(gamma) >= radius(beta));
        assert!(cloud.slots[2].attempts > cloud.slots[1].attempts);
        assert_no_overlaps(&cloud);
    }

    #[test]
    fn test_word_larger_than_box_abandoned_after_21_border_collisions() {
        let cloud = layout_cloud(
            &["enormous"],
            &[3.0],
            FontRange::default(),
            BoundingBox::centered(20.0, 20.0),
            &fixed_40x14,
        )
        .unwrap();

        let slot = &cloud.slots[0];
        assert!(slot.placement.is_none());
        assert_eq!(slot.border_collisions, MAX_BORDER_COLLISIONS + 1);
        assert_eq!(slot.attempts, 21);
    }

    #[test]
    fn test_abandoned_word_does_not_block_later_words() {
        let measure = |word: &str, _: f64| {
            if word == "huge" {
                TextSize::new(500.0, 20.0)
            } else {
                TextSize::new(30.0, 10.0)
            }
        };
        let cloud = layout_cloud(
            &["huge", "small"],
            &[9.0, 1.0],
            FontRange::default(),
            tile_box(),
            &measure,
        )
        .unwrap();
        assert!(!cloud.slots[0].is_placed());
        let small = cloud.slots[1].placement.as_ref().unwrap();
        assert_eq!(cloud.slots[1].attempts, 1, "nothing committed, first point is free");
        assert!(radius(small) < 1.0 + 1e-9);
    }

    #[test]
    fn test_all_zero_weights_use_min_font_size() {
        let cloud = layout_cloud(
            &["a", "b", "c"],
            &[0.0, 0.0, 0.0],
            FontRange::default(),
            tile_box(),
            &fixed_40x14,
        )
        .unwrap();
        for slot in &cloud.slots {
            assert_eq!(slot.font_size, 12.0, "'{}'", slot.word);
        }
    }

    #[test]
    fn test_font_size_formula() {
        let range = FontRange::default();
        let sum = 16.0_f64;
        let expected = (10.0 / sum) * 18.0 * sum.ln() + 12.0 * (10.0 / sum);
        assert!((range.raw_font_size(10.0, sum) - expected).abs() < 1e-12);
        // 10/16 share of a 16 total: ≈ 38.7 → clamped to the maximum.
        assert_eq!(range.font_size(10.0, sum), 30.0);
        // 1/16 share: ≈ 3.9 → clamped to the minimum.
        assert_eq!(range.font_size(1.0, sum), 12.0);
    }

    #[test]
    fn test_unclamped_font_size_inside_range() {
        let range = FontRange::default();
        // share 0.25 of sum 40: 0.25 * 18 * ln 40 + 3 ≈ 19.6
        let size = range.font_size(10.0, 40.0);
        assert!(size > 12.0 && size < 30.0, "got {size}");
        assert!((size - range.raw_font_size(10.0, 40.0)).abs() < 1e-12);
    }

    #[test]
    fn test_equal_weights_give_equal_unclamped_sizes() {
        // Wide enough that 7/28 of ln(28) stays strictly inside the range.
        let range = FontRange::new(1.0, 1000.0).unwrap();
        let cloud = layout_cloud(
            &["north", "south", "east", "west"],
            &[7.0, 7.0, 7.0, 7.0],
            range,
            tile_box(),
            &fixed_40x14,
        )
        .unwrap();
        let first = cloud.slots[0].font_size;
        assert!(first > 1.0 && first < 1000.0, "size {first} was clamped");
        for slot in &cloud.slots {
            assert_eq!(slot.font_size, first, "'{}'", slot.word);
        }
    }

    #[test]
    fn test_zero_total_gives_zero_raw_size() {
        let range = FontRange::default();
        let raw = range.raw_font_size(0.0, 0.0);
        assert_eq!(raw, 0.0, "got {raw}");
        assert_eq!(range.font_size(0.0, 0.0), 12.0);
    }

    #[test]
    fn test_font_sizes_always_within_range() {
        let (words, weights) = many_words(30);
        let range = FontRange::new(8.0, 40.0).unwrap();
        let cloud = layout_cloud(
            &words,
            &weights,
            range,
            tile_box(),
            get_metrics(FontFamily::Sans),
        )
        .unwrap();
        for slot in &cloud.slots {
            assert!(slot.font_size >= 8.0 && slot.font_size <= 40.0);
            if let Some(p) = &slot.placement {
                assert_eq!(p.font_size, slot.font_size);
            }
        }
    }

    #[test]
    fn test_rank_order_is_stable_descending() {
        let cloud = layout_cloud(
            &["w0", "w1", "w2", "w3", "w4"],
            &[1.0, 5.0, 1.0, 5.0, 3.0],
            FontRange::default(),
            tile_box(),
            &fixed_40x14,
        )
        .unwrap();
        let indices: Vec<usize> = cloud.slots.iter().map(|s| s.input_index).collect();
        assert_eq!(indices, [1, 3, 4, 0, 2]);
        let ranks: Vec<usize> = cloud.slots.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_every_input_appears_exactly_once() {
        let (words, weights) = many_words(40);
        let cloud = layout_cloud(
            &words,
            &weights,
            FontRange::default(),
            tile_box(),
            get_metrics(FontFamily::Sans),
        )
        .unwrap();
        assert_eq!(cloud.slots.len(), 40);
        let mut seen: Vec<usize> = cloud.slots.iter().map(|s| s.input_index).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..40).collect::<Vec<_>>());
        for slot in &cloud.slots {
            assert_eq!(slot.word, words[slot.input_index]);
        }
    }

    #[test]
    fn test_crowded_cloud_never_overlaps_and_drops_some_words() {
        let (words, weights) = many_words(150);
        let cloud = layout_cloud(
            &words,
            &weights,
            FontRange::default(),
            tile_box(),
            get_metrics(FontFamily::Sans),
        )
        .unwrap();
        assert_no_overlaps(&cloud);
        assert!(cloud.unplaced_count() > 0, "150 words cannot all fit a tile");
        for slot in cloud.slots.iter().filter(|s| !s.is_placed()) {
            assert_eq!(slot.border_collisions, MAX_BORDER_COLLISIONS + 1);
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let (words, weights) = many_words(25);
        let run = || {
            layout_cloud(
                &words,
                &weights,
                FontRange::default(),
                tile_box(),
                get_metrics(FontFamily::Condensed),
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_offset_bounding_box_centers_the_spiral() {
        let bb = BoundingBox {
            x: 500.0,
            y: -200.0,
            width: 236.0,
            height: 208.0,
        };
        let cloud = layout_cloud(&["a", "b"], &[2.0, 1.0], FontRange::default(), bb, &fixed_40x14)
            .unwrap();
        assert_eq!(cloud.unplaced_count(), 0);
        let a = cloud.slots[0].placement.as_ref().unwrap();
        assert!((a.x - 500.0).abs() <= 1.0 && (a.y + 200.0).abs() <= 1.0);
        assert_no_overlaps(&cloud);
    }

    #[test]
    fn test_empty_input_yields_empty_cloud() {
        let words: [&str; 0] = [];
        let cloud =
            layout_cloud(&words, &[], FontRange::default(), tile_box(), &fixed_40x14).unwrap();
        assert!(cloud.slots.is_empty());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = layout_cloud(
            &["a", "b"],
            &[1.0],
            FontRange::default(),
            tile_box(),
            &fixed_40x14,
        )
        .unwrap_err();
        assert_eq!(err, LayoutError::LengthMismatch { words: 2, weights: 1 });
    }

    #[test]
    fn test_inverted_font_range_rejected() {
        assert!(matches!(
            FontRange::new(30.0, 12.0),
            Err(LayoutError::InvalidFontRange { .. })
        ));
        let range = FontRange {
            min_font_size: 30.0,
            max_font_size: 12.0,
        };
        let err = layout_cloud(&["a"], &[1.0], range, tile_box(), &fixed_40x14).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidFontRange { .. }));
    }

    #[test]
    fn test_non_positive_box_rejected() {
        let err = layout_cloud(
            &["a"],
            &[1.0],
            FontRange::default(),
            BoundingBox::centered(0.0, 100.0),
            &fixed_40x14,
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidBoundingBox { .. }));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = layout_cloud(
            &["a", "b"],
            &[1.0, -2.0],
            FontRange::default(),
            tile_box(),
            &fixed_40x14,
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidWeight { ref word, .. } if word == "b"));
    }

    #[test]
    fn test_invalid_measurement_rejected_before_placement() {
        let calls = std::cell::Cell::new(0);
        let measure = |word: &str, _: f64| {
            calls.set(calls.get() + 1);
            if word == "bad" {
                TextSize::new(f64::NAN, 10.0)
            } else {
                TextSize::new(10.0, 10.0)
            }
        };
        let err = layout_cloud(
            &["good", "bad"],
            &[2.0, 1.0],
            FontRange::default(),
            tile_box(),
            &measure,
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidMeasurement { ref word, .. } if word == "bad"));
        assert_eq!(calls.get(), 2);
    }
}
