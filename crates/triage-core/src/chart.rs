//! Chart geometry and per-frame draw composition.
//!
//! All coordinates are logical (CSS-pixel) units with the origin at the top
//! left and y growing downward. The loss curve uses the value domain `[0, 1]`
//! and the score curve `[0.5, 1.0]`; both share the x axis and the same plot
//! rectangle but are scaled independently.
//!
//! A frame is described as a list of [`DrawOp`]s so that the composition can
//! be tested without a real display and replayed onto any [`Surface`].

use serde::Serialize;

use crate::error::ChartError;
use crate::series::SeriesPair;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Inner padding around the plot rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Padding {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            left: 36.0,
            right: 12.0,
            top: 16.0,
            bottom: 26.0,
        }
    }
}

/// A point in logical surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub const LOSS_DOMAIN: (f64, f64) = (0.0, 1.0);
pub const SCORE_DOMAIN: (f64, f64) = (0.5, 1.0);

const GRID_ROWS: usize = 5;
const GRID_COLS: usize = 10;
const MARKER_RADIUS: f64 = 3.0;

pub const LOSS_LABEL: &str = "Loss";
pub const SCORE_LABEL: &str = "AUC";
pub const CAPTION: &str = "Synthetic metrics (demo)";

/// Maps series indices and values onto a `width x height` surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartGeometry {
    width: f64,
    height: f64,
    pad: Padding,
    steps: usize,
}

impl ChartGeometry {
    /// Geometry for `steps` points on a `width x height` logical surface.
    pub fn new(width: f64, height: f64, steps: usize) -> Result<Self, ChartError> {
        Self::with_padding(width, height, steps, Padding::default())
    }

    pub fn with_padding(
        width: f64,
        height: f64,
        steps: usize,
        pad: Padding,
    ) -> Result<Self, ChartError> {
        if steps < 2 {
            return Err(ChartError::TooFewPoints(steps));
        }
        if !(width > 0.0 && height > 0.0) {
            return Err(ChartError::EmptySurface { width, height });
        }
        Ok(Self {
            width,
            height,
            pad,
            steps,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn padding(&self) -> Padding {
        self.pad
    }

    /// x of index `i`, linear over `[pad.left, width - pad.right]`.
    pub fn x_at(&self, i: usize) -> f64 {
        let span = self.width - self.pad.left - self.pad.right;
        self.pad.left + (i as f64 / (self.steps - 1) as f64) * span
    }

    fn y_in(&self, v: f64, (lo, hi): (f64, f64)) -> f64 {
        let span = self.height - self.pad.top - self.pad.bottom;
        self.pad.top + (1.0 - (v - lo) / (hi - lo)) * span
    }

    /// y of a loss value; 0 sits on the baseline, 1 on the top edge.
    pub fn loss_y(&self, v: f64) -> f64 {
        self.y_in(v, LOSS_DOMAIN)
    }

    /// y of a score value on the independent `[0.5, 1.0]` scale.
    pub fn score_y(&self, v: f64) -> f64 {
        self.y_in(v, SCORE_DOMAIN)
    }

    /// y of the plot's bottom edge, where the loss area closes.
    pub fn baseline(&self) -> f64 {
        self.height - self.pad.bottom
    }
}

/// Points revealed at progress `t`: `max(2, floor(steps * t))`, capped at `steps`.
pub fn visible_count(steps: usize, t: f64) -> usize {
    let t = t.clamp(0.0, 1.0);
    let n = (steps as f64 * t).floor() as usize;
    n.max(2).min(steps.max(2))
}

// ---------------------------------------------------------------------------
// Draw operations
// ---------------------------------------------------------------------------

/// Which curve a stroke or fill belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Curve {
    Loss,
    Score,
}

/// One drawing instruction in logical coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    /// Clear the whole surface and paint the background.
    Clear { width: f64, height: f64 },
    /// One background grid line.
    GridLine { from: Point, to: Point },
    /// Closed polygon under the loss curve, down to the baseline.
    Area { curve: Curve, polygon: Vec<Point> },
    /// Stroked polyline.
    Stroke { curve: Curve, points: Vec<Point> },
    /// Filled circle marking the last visible point.
    Marker { curve: Curve, at: Point, radius: f64 },
    /// Text anchored at its baseline-left corner.
    Text { text: &'static str, at: Point },
}

/// A drawing target. Implementations translate [`DrawOp`]s into pixels.
pub trait Surface {
    /// Scale the backing store by `ratio` while keeping logical size
    /// `width x height`. Called exactly once per chart mount.
    fn scale_backing(&mut self, ratio: f64, width: f64, height: f64);

    /// Start a new frame.
    fn begin_frame(&mut self);

    /// Apply one operation to the current frame.
    fn draw(&mut self, op: &DrawOp);
}

/// Compose the full frame for progress `t`.
///
/// Order: background and grid, axis labels, loss line and area, score line,
/// end-point marker, caption.
pub fn compose_frame(geo: &ChartGeometry, series: &SeriesPair, t: f64) -> Vec<DrawOp> {
    let w = geo.width();
    let h = geo.height();
    let pad = geo.padding();
    let count = visible_count(geo.steps(), t).min(series.len());

    let mut ops = Vec::with_capacity(GRID_ROWS + GRID_COLS + 8);
    ops.push(DrawOp::Clear {
        width: w,
        height: h,
    });
    for i in 1..GRID_ROWS {
        let y = (i as f64 / GRID_ROWS as f64) * h;
        ops.push(DrawOp::GridLine {
            from: Point::new(0.0, y),
            to: Point::new(w, y),
        });
    }
    for i in 1..GRID_COLS {
        let x = (i as f64 / GRID_COLS as f64) * w;
        ops.push(DrawOp::GridLine {
            from: Point::new(x, 0.0),
            to: Point::new(x, h),
        });
    }

    ops.push(DrawOp::Text {
        text: LOSS_LABEL,
        at: Point::new(pad.left, pad.top - 4.0),
    });
    ops.push(DrawOp::Text {
        text: SCORE_LABEL,
        at: Point::new(w - 60.0, pad.top - 4.0),
    });

    if count > 0 {
        let loss_pts: Vec<Point> = (0..count)
            .map(|i| Point::new(geo.x_at(i), geo.loss_y(series.loss()[i])))
            .collect();
        let mut polygon = loss_pts.clone();
        polygon.push(Point::new(geo.x_at(count - 1), geo.baseline()));
        polygon.push(Point::new(geo.x_at(0), geo.baseline()));

        ops.push(DrawOp::Stroke {
            curve: Curve::Loss,
            points: loss_pts,
        });
        ops.push(DrawOp::Area {
            curve: Curve::Loss,
            polygon,
        });

        let score_pts: Vec<Point> = (0..count)
            .map(|i| Point::new(geo.x_at(i), geo.score_y(series.score()[i])))
            .collect();
        let last = score_pts[count - 1];
        ops.push(DrawOp::Stroke {
            curve: Curve::Score,
            points: score_pts,
        });
        ops.push(DrawOp::Marker {
            curve: Curve::Score,
            at: last,
            radius: MARKER_RADIUS,
        });
    }

    ops.push(DrawOp::Text {
        text: CAPTION,
        at: Point::new(pad.left, h - 6.0),
    });
    ops
}

// ---------------------------------------------------------------------------
// FrameBuffer
// ---------------------------------------------------------------------------

/// In-memory surface that keeps the most recent frame.
///
/// Used by the terminal UI (which replays the ops onto a canvas) and by tests.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    ops: Vec<DrawOp>,
    frames: u64,
    backing_scale: f64,
    backing_size: (f64, f64),
    scale_calls: u32,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            backing_scale: 1.0,
            ..Default::default()
        }
    }

    /// Operations of the last completed or in-progress frame.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Frames started on this surface.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Accumulated backing scale factor.
    pub fn backing_scale(&self) -> f64 {
        self.backing_scale
    }

    /// Backing store size in device pixels.
    pub fn backing_size(&self) -> (f64, f64) {
        self.backing_size
    }

    /// How many times `scale_backing` was invoked.
    pub fn scale_calls(&self) -> u32 {
        self.scale_calls
    }
}

impl Surface for FrameBuffer {
    fn scale_backing(&mut self, ratio: f64, width: f64, height: f64) {
        self.backing_scale *= ratio;
        self.backing_size = (width * ratio, height * ratio);
        self.scale_calls += 1;
    }

    fn begin_frame(&mut self) {
        self.ops.clear();
        self.frames += 1;
    }

    fn draw(&mut self, op: &DrawOp) {
        self.ops.push(op.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo() -> ChartGeometry {
        ChartGeometry::new(520.0, 280.0, 80).unwrap()
    }

    #[test]
    fn x_spans_padded_width() {
        let g = geo();
        assert_eq!(g.x_at(0), 36.0);
        assert!((g.x_at(79) - (520.0 - 12.0)).abs() < 1e-9);
    }

    #[test]
    fn loss_axis_is_inverted() {
        let g = geo();
        assert_eq!(g.loss_y(0.0), g.baseline());
        assert_eq!(g.loss_y(1.0), 16.0);
        assert!(g.loss_y(0.9) < g.loss_y(0.1));
    }

    #[test]
    fn score_axis_has_its_own_scale() {
        let g = geo();
        assert_eq!(g.score_y(0.5), g.baseline());
        assert_eq!(g.score_y(1.0), 16.0);
        assert_ne!(g.score_y(0.75), g.loss_y(0.75));
    }

    #[test]
    fn geometry_rejects_degenerate_input() {
        assert_eq!(
            ChartGeometry::new(520.0, 280.0, 1),
            Err(ChartError::TooFewPoints(1))
        );
        assert!(matches!(
            ChartGeometry::new(0.0, 280.0, 80),
            Err(ChartError::EmptySurface { .. })
        ));
        assert!(matches!(
            ChartGeometry::new(f64::NAN, 280.0, 80),
            Err(ChartError::EmptySurface { .. })
        ));
    }

    #[test]
    fn visible_count_floor_and_minimum() {
        assert_eq!(visible_count(80, 0.0), 2);
        assert_eq!(visible_count(80, 0.01), 2);
        assert_eq!(visible_count(80, 0.5), 40);
        assert_eq!(visible_count(80, 0.999), 79);
        assert_eq!(visible_count(80, 1.0), 80);
        assert_eq!(visible_count(80, 3.0), 80);
    }

    #[test]
    fn frame_contains_expected_layers() {
        let g = geo();
        let s = SeriesPair::from_seed(42, 80);
        let ops = compose_frame(&g, &s, 0.5);

        assert!(matches!(ops[0], DrawOp::Clear { .. }));
        let grid = ops
            .iter()
            .filter(|o| matches!(o, DrawOp::GridLine { .. }))
            .count();
        assert_eq!(grid, 4 + 9);

        let texts: Vec<&str> = ops
            .iter()
            .filter_map(|o| match o {
                DrawOp::Text { text, .. } => Some(*text),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec![LOSS_LABEL, SCORE_LABEL, CAPTION]);

        let strokes: Vec<usize> = ops
            .iter()
            .filter_map(|o| match o {
                DrawOp::Stroke { points, .. } => Some(points.len()),
                _ => None,
            })
            .collect();
        assert_eq!(strokes, vec![40, 40]);
    }

    #[test]
    fn area_closes_down_to_baseline() {
        let g = geo();
        let s = SeriesPair::from_seed(42, 80);
        let ops = compose_frame(&g, &s, 1.0);
        let polygon = ops
            .iter()
            .find_map(|o| match o {
                DrawOp::Area { polygon, .. } => Some(polygon.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(polygon.len(), 82);
        let n = polygon.len();
        assert_eq!(polygon[n - 2], Point::new(g.x_at(79), g.baseline()));
        assert_eq!(polygon[n - 1], Point::new(g.x_at(0), g.baseline()));
    }

    #[test]
    fn marker_sits_on_last_visible_score() {
        let g = geo();
        let s = SeriesPair::from_seed(42, 80);
        let ops = compose_frame(&g, &s, 0.25);
        let at = ops
            .iter()
            .find_map(|o| match o {
                DrawOp::Marker { at, .. } => Some(*at),
                _ => None,
            })
            .unwrap();
        assert_eq!(at, Point::new(g.x_at(19), g.score_y(s.score()[19])));
    }

    #[test]
    fn frame_buffer_keeps_only_last_frame() {
        let g = geo();
        let s = SeriesPair::from_seed(42, 80);
        let mut fb = FrameBuffer::new();
        for t in [0.0, 1.0] {
            fb.begin_frame();
            for op in compose_frame(&g, &s, t) {
                fb.draw(&op);
            }
        }
        assert_eq!(fb.frames(), 2);
        assert_eq!(fb.ops().len(), compose_frame(&g, &s, 1.0).len());
    }
}
