//! Progressive chart reveal.
//!
//! A [`ChartMount`] binds a series, its geometry and a [`Surface`]. Each frame
//! callback computes `t = min(1, elapsed / duration)` from the timestamp of the
//! first callback, redraws the whole chart, and reports whether another frame
//! is wanted. Once `t` reaches 1 the mount is finished and further callbacks
//! are ignored; a fresh mount is needed to animate again.

use crate::chart::{ChartGeometry, Surface, compose_frame, visible_count};
use crate::series::SeriesPair;

/// Reveal budget in milliseconds.
pub const REVEAL_DURATION_MS: f64 = 750.0;

// ---------------------------------------------------------------------------
// Progress accumulator
// ---------------------------------------------------------------------------

/// Elapsed-time progress in `[0, 1]`, anchored at the first tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    start_ms: Option<f64>,
    t: f64,
    duration_ms: f64,
}

impl Progress {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            start_ms: None,
            t: 0.0,
            duration_ms,
        }
    }

    /// Advance to `now_ms` and return the new progress.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        let start = *self.start_ms.get_or_insert(now_ms);
        let elapsed = (now_ms - start).max(0.0);
        self.t = if self.duration_ms > 0.0 {
            (elapsed / self.duration_ms).min(1.0)
        } else {
            1.0
        };
        self.t
    }

    pub fn value(&self) -> f64 {
        self.t
    }

    pub fn is_complete(&self) -> bool {
        self.t >= 1.0
    }
}

// ---------------------------------------------------------------------------
// ChartMount
// ---------------------------------------------------------------------------

/// Whether the frame loop should continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// More frames are needed; request the next one.
    Continue,
    /// The reveal finished on this frame; request nothing further.
    Finished,
    /// The mount had already finished; nothing was drawn.
    Idle,
}

/// Device pixel ratio as applied to a surface: floored, never below 1.
pub fn effective_pixel_ratio(dpr: f64) -> f64 {
    if dpr.is_finite() { dpr.floor().max(1.0) } else { 1.0 }
}

/// A chart bound to a surface, animating from `t = 0` to `t = 1`.
#[derive(Debug)]
pub struct ChartMount<S: Surface> {
    geometry: ChartGeometry,
    series: SeriesPair,
    progress: Progress,
    surface: S,
    frames_drawn: u64,
}

impl<S: Surface> ChartMount<S> {
    /// Mount on `surface`, scaling its backing store by the device pixel ratio.
    ///
    /// Scaling happens here and only here, so it is applied exactly once per
    /// mount regardless of how many frames are drawn.
    pub fn mount(
        mut surface: S,
        geometry: ChartGeometry,
        series: SeriesPair,
        device_pixel_ratio: f64,
        duration_ms: f64,
    ) -> Self {
        let ratio = effective_pixel_ratio(device_pixel_ratio);
        surface.scale_backing(ratio, geometry.width(), geometry.height());
        log::debug!(
            "chart mounted: {}x{} @{}x, {} points",
            geometry.width(),
            geometry.height(),
            ratio,
            series.len()
        );
        Self {
            geometry,
            series,
            progress: Progress::new(duration_ms),
            surface,
            frames_drawn: 0,
        }
    }

    /// Frame callback at `timestamp_ms`. Draws unless already finished.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> FrameOutcome {
        if self.progress.is_complete() {
            return FrameOutcome::Idle;
        }
        let t = self.progress.tick(timestamp_ms);
        self.surface.begin_frame();
        for op in compose_frame(&self.geometry, &self.series, t) {
            self.surface.draw(&op);
        }
        self.frames_drawn += 1;

        if self.progress.is_complete() {
            log::debug!("chart reveal finished after {} frames", self.frames_drawn);
            FrameOutcome::Finished
        } else {
            FrameOutcome::Continue
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress.value()
    }

    pub fn is_finished(&self) -> bool {
        self.progress.is_complete()
    }

    /// Points currently revealed.
    pub fn visible(&self) -> usize {
        visible_count(self.geometry.steps(), self.progress.value()).min(self.series.len())
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn geometry(&self) -> &ChartGeometry {
        &self.geometry
    }

    pub fn series(&self) -> &SeriesPair {
        &self.series
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::FrameBuffer;

    fn mount(dpr: f64) -> ChartMount<FrameBuffer> {
        let geo = ChartGeometry::new(520.0, 280.0, 80).unwrap();
        let series = SeriesPair::from_seed(42, 80);
        ChartMount::mount(FrameBuffer::new(), geo, series, dpr, REVEAL_DURATION_MS)
    }

    #[test]
    fn progress_anchors_at_first_tick() {
        let mut p = Progress::new(750.0);
        assert_eq!(p.tick(1000.0), 0.0);
        assert_eq!(p.tick(1375.0), 0.5);
        assert_eq!(p.tick(2000.0), 1.0);
        assert!(p.is_complete());
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut p = Progress::new(0.0);
        assert_eq!(p.tick(5.0), 1.0);
    }

    #[test]
    fn reveal_runs_to_completion_then_idles() {
        let mut m = mount(1.0);
        assert_eq!(m.on_frame(0.0), FrameOutcome::Continue);
        assert_eq!(m.visible(), 2);
        assert_eq!(m.on_frame(375.0), FrameOutcome::Continue);
        assert_eq!(m.visible(), 40);
        assert_eq!(m.on_frame(750.0), FrameOutcome::Finished);
        assert_eq!(m.visible(), 80);
        assert_eq!(m.on_frame(800.0), FrameOutcome::Idle);
        assert_eq!(m.frames_drawn(), 3);
        assert_eq!(m.surface().frames(), 3);
    }

    #[test]
    fn pixel_ratio_applied_once_per_mount() {
        let mut m = mount(2.0);
        for ts in [0.0, 16.0, 32.0, 48.0] {
            m.on_frame(ts);
        }
        assert_eq!(m.surface().scale_calls(), 1);
        assert_eq!(m.surface().backing_scale(), 2.0);
        assert_eq!(m.surface().backing_size(), (1040.0, 560.0));
    }

    #[test]
    fn pixel_ratio_is_floored_and_at_least_one() {
        assert_eq!(effective_pixel_ratio(2.75), 2.0);
        assert_eq!(effective_pixel_ratio(0.5), 1.0);
        assert_eq!(effective_pixel_ratio(f64::NAN), 1.0);
    }
}
