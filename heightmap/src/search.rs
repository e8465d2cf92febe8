//! Rectangle extremum search: the running extreme with its ties, and the
//! cache-based pruning of tiles that cannot reach it.

use crate::cache::TileSummary;
use crate::grid::TileRegion;

/// Which extremes a rectangle search looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Max,
    Min,
    MinMax,
}

impl SearchKind {
    pub(crate) fn wants_max(&self) -> bool {
        matches!(self, SearchKind::Max | SearchKind::MinMax)
    }

    pub(crate) fn wants_min(&self) -> bool {
        matches!(self, SearchKind::Min | SearchKind::MinMax)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Max,
    Min,
}

/// Running extreme over a stream of cells.
///
/// A strictly better value replaces the extreme and restarts the tie list,
/// an equal value joins it. NODATA and NaN cells are ignored.
#[derive(Debug)]
pub(crate) struct Extreme<C> {
    direction: Direction,
    nodata: f64,
    value: f64,
    cells: Vec<C>,
}

impl<C> Extreme<C> {
    pub(crate) fn new(direction: Direction, nodata: f64) -> Self {
        Self {
            direction,
            nodata,
            value: nodata,
            cells: Vec::new(),
        }
    }

    pub(crate) fn offer(&mut self, value: f64, cell: impl FnOnce() -> C) {
        if value == self.nodata || value.is_nan() {
            return;
        }
        let better = self.cells.is_empty()
            || match self.direction {
                Direction::Max => value > self.value,
                Direction::Min => value < self.value,
            };
        if better {
            self.value = value;
            self.cells.clear();
            self.cells.push(cell());
        } else if value == self.value {
            self.cells.push(cell());
        }
    }

    /// The extreme value, NODATA if no valid cell was offered.
    pub(crate) fn into_parts(self) -> (f64, Vec<C>) {
        (self.value, self.cells)
    }
}

/// A tile region of a rectangle search together with its cached summary.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub(crate) region: TileRegion,
    pub(crate) summary: Option<TileSummary>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Bounds {
    pub(crate) max: Option<f64>,
    pub(crate) min: Option<f64>,
}

/// Best extremes guaranteed to lie inside the rectangle: taken from the
/// summaries of tiles the rectangle covers completely.
pub(crate) fn bounds(candidates: &[Candidate], nodata: f64) -> Bounds {
    let complete = candidates
        .iter()
        .filter(|c| c.region.complete)
        .filter_map(|c| c.summary.as_ref());

    let mut bounds = Bounds::default();
    for summary in complete {
        if summary.h_max != nodata && !summary.h_max.is_nan() {
            bounds.max = Some(bounds.max.map_or(summary.h_max, |b| b.max(summary.h_max)));
        }
        if summary.h_min > nodata {
            bounds.min = Some(bounds.min.map_or(summary.h_min, |b| b.min(summary.h_min)));
        }
    }
    bounds
}

/// Drop the candidates whose cached extremes cannot reach the bounds.
///
/// Candidates without a summary are always kept. A tile whose summary says
/// it holds no valid cell is dropped.
pub(crate) fn prune(kind: SearchKind, candidates: Vec<Candidate>, nodata: f64) -> Vec<Candidate> {
    let bounds = bounds(&candidates, nodata);

    let keep_max = |s: &TileSummary| {
        s.h_max != nodata && bounds.max.map_or(true, |bound| s.h_max >= bound)
    };
    let keep_min =
        |s: &TileSummary| s.h_min > nodata && bounds.min.map_or(true, |bound| s.h_min <= bound);

    candidates
        .into_iter()
        .filter(|c| match &c.summary {
            None => true,
            Some(s) => match kind {
                SearchKind::Max => keep_max(s),
                SearchKind::Min => keep_min(s),
                SearchKind::MinMax => keep_max(s) || keep_min(s),
            },
        })
        .collect()
}
