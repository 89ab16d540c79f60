//! Radius queries over a closed signal set, and the linear distance falloff
//! shared by both aggregators.
//!
//! [`SignalIndex`] buckets a frozen signal slice into a uniform grid so a
//! receiver only measures distance to signals in nearby cells. Query
//! results are always reported in emission order (or nearest-first with
//! emission order breaking ties), so bucketing never changes the outcome of
//! an aggregation compared with a full linear scan.

use std::collections::HashMap;

use agora_types::{CulturalSignal, SocialSignal, Vec2};

/// Anything broadcast from a point in the world.
pub trait Located {
    /// Where the signal was emitted.
    fn origin(&self) -> Vec2;
}

impl Located for SocialSignal {
    fn origin(&self) -> Vec2 {
        self.position
    }
}

impl Located for CulturalSignal {
    fn origin(&self) -> Vec2 {
        self.position
    }
}

/// A signal that passed the radius filter.
#[derive(Debug, Clone, Copy)]
pub struct InRange<'a, S> {
    /// The received signal.
    pub signal: &'a S,
    /// Position of the signal in the broadcast order.
    pub order: usize,
    /// Euclidean distance from the receiver.
    pub distance: f64,
}

type Cell = (i64, i64);

/// Read-only spatial index over one phase's closed signal set.
#[derive(Debug)]
pub struct SignalIndex<'a, S> {
    signals: &'a [S],
    grid: Option<Grid>,
}

#[derive(Debug)]
struct Grid {
    cell_size: f64,
    cells: HashMap<Cell, Vec<usize>>,
}

impl<'a, S: Located> SignalIndex<'a, S> {
    /// Bucket `signals` into square cells of edge `cell_size`.
    ///
    /// A non-positive or non-finite cell size produces a linear index.
    pub fn new(signals: &'a [S], cell_size: f64) -> Self {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Self::linear(signals);
        }
        let mut cells: HashMap<Cell, Vec<usize>> = HashMap::new();
        for (order, signal) in signals.iter().enumerate() {
            cells
                .entry(cell_of(signal.origin(), cell_size))
                .or_default()
                .push(order);
        }
        Self {
            signals,
            grid: Some(Grid { cell_size, cells }),
        }
    }

    /// An index that scans every signal for every query.
    pub const fn linear(signals: &'a [S]) -> Self {
        Self {
            signals,
            grid: None,
        }
    }

    /// Signals within `radius` of `receiver`, in emission order.
    ///
    /// Uses a squared-distance prefilter so the square root is only taken
    /// for signals that are in range. A signal exactly at the radius is
    /// included.
    pub fn within(&self, receiver: Vec2, radius: f64) -> Vec<InRange<'a, S>> {
        let radius_sq = radius * radius;
        let measure = |order: usize| {
            let signal = self.signals.get(order)?;
            let distance_sq = receiver.distance_squared(signal.origin());
            (distance_sq <= radius_sq).then(|| InRange {
                signal,
                order,
                distance: distance_sq.sqrt(),
            })
        };

        match &self.grid {
            None => (0..self.signals.len()).filter_map(measure).collect(),
            Some(grid) => {
                let mut found: Vec<InRange<'a, S>> = grid
                    .candidates(receiver, radius)
                    .into_iter()
                    .filter_map(measure)
                    .collect();
                found.sort_unstable_by_key(|r| r.order);
                found
            }
        }
    }

    /// Signals within `radius` of `receiver`, nearest first, truncated to
    /// `cap`. Equal distances keep emission order.
    pub fn nearest_within(&self, receiver: Vec2, radius: f64, cap: usize) -> Vec<InRange<'a, S>> {
        let mut in_range = self.within(receiver, radius);
        in_range.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        in_range.truncate(cap);
        in_range
    }
}

impl Grid {
    /// Emission indices of every signal in a cell overlapping the query's
    /// bounding square.
    fn candidates(&self, receiver: Vec2, radius: f64) -> Vec<usize> {
        let (cx, cy) = cell_of(receiver, self.cell_size);
        let reach = cell_reach(radius, self.cell_size);
        let span = reach.saturating_mul(2).saturating_add(1);
        let occupied = i64::try_from(self.cells.len()).unwrap_or(i64::MAX);
        if span.saturating_mul(span) > occupied {
            return self.cells.values().flatten().copied().collect();
        }
        let mut out = Vec::new();
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                let key = (cx.saturating_add(dx), cy.saturating_add(dy));
                if let Some(bucket) = self.cells.get(&key) {
                    out.extend_from_slice(bucket);
                }
            }
        }
        out
    }
}

#[allow(clippy::cast_possible_truncation)]
fn cell_of(position: Vec2, cell_size: f64) -> Cell {
    (
        (position.x / cell_size).floor() as i64,
        (position.y / cell_size).floor() as i64,
    )
}

#[allow(clippy::cast_possible_truncation)]
fn cell_reach(radius: f64, cell_size: f64) -> i64 {
    if radius.is_finite() && radius > 0.0 {
        (radius / cell_size).ceil() as i64
    } else {
        0
    }
}

/// Linear falloff: 1 at zero distance, 0 at the radius.
///
/// A zero radius yields 1, since only co-located signals pass the filter.
pub const fn distance_factor(distance: f64, radius: f64) -> f64 {
    if radius > 0.0 {
        1.0 - distance / radius
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use agora_types::CulturalGroup;

    use super::*;

    fn signal_at(x: f64, y: f64) -> SocialSignal {
        SocialSignal {
            position: Vec2::new(x, y),
            group: CulturalGroup::Harmonists,
            strength: 0.5,
        }
    }

    #[test]
    fn boundary_signal_is_in_range_with_zero_factor() {
        let signals = [signal_at(3.0, 4.0)];
        let found = SignalIndex::linear(&signals).within(Vec2::ZERO, 5.0);
        assert_eq!(found.len(), 1);
        let factor = found.first().map_or(1.0, |r| distance_factor(r.distance, 5.0));
        assert!(factor.abs() < 1e-12);
    }

    #[test]
    fn out_of_range_signals_are_dropped() {
        let signals = [signal_at(10.0, 0.0), signal_at(1.0, 0.0)];
        let found = SignalIndex::linear(&signals).within(Vec2::ZERO, 5.0);
        assert_eq!(found.len(), 1);
        assert_eq!(found.first().map(|r| r.order), Some(1));
    }

    #[test]
    fn nearest_first_ranking_respects_cap() {
        let signals = [signal_at(4.0, 0.0), signal_at(1.0, 0.0), signal_at(2.0, 0.0)];
        let found = SignalIndex::linear(&signals).nearest_within(Vec2::ZERO, 5.0, 2);
        let orders: Vec<usize> = found.iter().map(|r| r.order).collect();
        assert_eq!(orders, vec![1, 2]);
    }

    #[test]
    fn ties_keep_emission_order() {
        let signals = [signal_at(0.0, 2.0), signal_at(2.0, 0.0)];
        let found = SignalIndex::new(&signals, 1.0).nearest_within(Vec2::ZERO, 5.0, 1);
        assert_eq!(found.first().map(|r| r.order), Some(0));
    }

    #[test]
    fn zero_radius_admits_only_colocated_signals() {
        let signals = [signal_at(0.0, 0.0), signal_at(0.1, 0.0)];
        let found = SignalIndex::new(&signals, 0.0).within(Vec2::ZERO, 0.0);
        assert_eq!(found.len(), 1);
        assert!((distance_factor(0.0, 0.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn grid_matches_linear_scan() {
        let signals: Vec<SocialSignal> = (0..200)
            .map(|i| {
                let f = f64::from(i);
                signal_at((f * 7.3) % 100.0, (f * 13.1) % 100.0)
            })
            .collect();
        let linear = SignalIndex::linear(&signals);
        for cell_size in [2.5, 5.0, 12.0] {
            let grid = SignalIndex::new(&signals, cell_size);
            for point in [Vec2::new(50.0, 50.0), Vec2::new(0.0, 0.0), Vec2::new(99.0, 3.0)] {
                let a: Vec<usize> = linear.within(point, 8.0).iter().map(|r| r.order).collect();
                let b: Vec<usize> = grid.within(point, 8.0).iter().map(|r| r.order).collect();
                assert_eq!(a, b);
            }
        }
    }
}
