//! L3 Molecular Layer: Arc/segment projection
//!
//! Turns weighted categorical values into ordered percentage ranges and
//! reveals them progressively as a global coverage sweeps from 0 to 100.

use super::timing::non_negative;

/// Colour reference as handed in by the data layer (usually `#rrggbb`)
pub type ColorRef = String;

/// Colour of the remainder ring
pub const NEUTRAL_COLOR: &str = "#e5e7eb";

/// Input to the projector
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedItem {
    pub key: String,
    pub color: ColorRef,
    pub value: f64,
}

impl WeightedItem {
    pub fn new(key: impl Into<String>, color: impl Into<ColorRef>, value: f64) -> Self {
        Self {
            key: key.into(),
            color: color.into(),
            value,
        }
    }
}

/// A revealed range, `0 <= start_pct <= end_pct <= 100`
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub key: String,
    pub color: ColorRef,
    pub start_pct: f64,
    pub end_pct: f64,
}

impl Segment {
    #[inline]
    pub fn span(&self) -> f64 {
        self.end_pct - self.start_pct
    }
}

/// Final bounds of every non-zero item, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentPlan {
    bounds: Vec<Segment>,
}

impl SegmentPlan {
    /// Build the full partition of [0, 100]
    ///
    /// Negative values count as zero. Items with no weight occupy no arc and
    /// are skipped. A zero total yields an empty plan.
    pub fn new(items: &[WeightedItem]) -> Self {
        let total: f64 = items.iter().map(|it| non_negative(it.value)).sum();
        if !(total > 0.0) || !total.is_finite() {
            return Self::default();
        }

        let mut cumulative = 0.0;
        let mut bounds: Vec<Segment> = items
            .iter()
            .filter(|it| non_negative(it.value) > 0.0)
            .map(|it| {
                let pct = it.value / total * 100.0;
                let start = cumulative;
                cumulative += pct;
                Segment {
                    key: it.key.clone(),
                    color: it.color.clone(),
                    start_pct: start,
                    end_pct: cumulative.min(100.0),
                }
            })
            .collect();

        // Absorb floating point drift so the last range closes exactly at 100
        if let Some(last) = bounds.last_mut() {
            last.end_pct = 100.0;
        }

        Self { bounds }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Bounds at full coverage
    pub fn segments(&self) -> &[Segment] {
        &self.bounds
    }

    /// Segments visible at `coverage` percent
    ///
    /// A segment appears once coverage passes its start and its end is
    /// clipped to the coverage until coverage subsumes it.
    pub fn at(&self, coverage: f64) -> Vec<Segment> {
        let coverage = if coverage.is_nan() {
            0.0
        } else {
            coverage.clamp(0.0, 100.0)
        };
        self.bounds
            .iter()
            .filter(|seg| coverage > seg.start_pct)
            .map(|seg| Segment {
                key: seg.key.clone(),
                color: seg.color.clone(),
                start_pct: seg.start_pct,
                end_pct: seg.end_pct.min(coverage),
            })
            .collect()
    }
}

/// Paint of one stop in a rendered ring
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Category(ColorRef),
    /// Remainder not covered by any segment
    Neutral,
}

impl Fill {
    pub fn color(&self) -> &str {
        match self {
            Fill::Category(color) => color,
            Fill::Neutral => NEUTRAL_COLOR,
        }
    }
}

/// Angular stop in degrees, ready for a conic renderer
#[derive(Debug, Clone, PartialEq)]
pub struct ConicStop {
    pub fill: Fill,
    pub start_deg: f64,
    pub end_deg: f64,
}

/// Neutral remainder after the last segment, as `(start_pct, 100)`
///
/// An empty segment list leaves the whole ring neutral. Rendering only; the
/// filler is never part of the logical segment set.
pub fn filler(segments: &[Segment]) -> Option<(f64, f64)> {
    let last_end = segments.last().map(|seg| seg.end_pct).unwrap_or(0.0);
    if last_end < 100.0 {
        Some((last_end, 100.0))
    } else {
        None
    }
}

#[inline]
fn pct_to_deg(pct: f64) -> f64 {
    pct / 100.0 * 360.0
}

/// Map segments to conic stops, appending the neutral filler
pub fn conic_stops(segments: &[Segment]) -> Vec<ConicStop> {
    let mut stops: Vec<ConicStop> = segments
        .iter()
        .map(|seg| ConicStop {
            fill: Fill::Category(seg.color.clone()),
            start_deg: pct_to_deg(seg.start_pct),
            end_deg: pct_to_deg(seg.end_pct),
        })
        .collect();
    if let Some((start, end)) = filler(segments) {
        stops.push(ConicStop {
            fill: Fill::Neutral,
            start_deg: pct_to_deg(start),
            end_deg: pct_to_deg(end),
        });
    }
    stops
}

/// Stop covering `deg` (clockwise from the top), if any
pub fn fill_at(stops: &[ConicStop], deg: f64) -> Option<&Fill> {
    let deg = deg.rem_euclid(360.0);
    stops
        .iter()
        .find(|stop| deg >= stop.start_deg && deg < stop.end_deg)
        .map(|stop| &stop.fill)
}
