use std::time::Duration;

use triage_core::{
    ChartGeometry, ChartMount, FrameBuffer, FrameOutcome, MountId, Scheduler, SeriesPair,
    TriageConfig, Wakeup,
};

/// Upper bound on simulated frames; a reveal that never completes stops here.
pub const MAX_FRAMES: usize = 10_000;

pub struct ChartCommandConfig<'a> {
    pub at_ms: &'a [f64],
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub dpr: Option<f64>,
    pub dump_ops: bool,
}

/// One printed row of the reveal trace.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRow {
    pub timestamp_ms: f64,
    pub progress: f64,
    pub visible: usize,
    pub outcome: FrameOutcome,
}

/// Drive `mount` on a virtual clock until it stops asking for frames or
/// [`MAX_FRAMES`] have been drawn.
pub fn simulate(mount: &mut ChartMount<FrameBuffer>, frame_interval: Duration) -> Vec<FrameRow> {
    let mut scheduler = Scheduler::new(frame_interval);
    let id = MountId(0);
    scheduler.request_frame(id);
    let mut rows = Vec::new();
    while let Some(Wakeup::Frame { timestamp_ms, .. }) = scheduler.pop_due(Duration::MAX) {
        let outcome = mount.on_frame(timestamp_ms);
        rows.push(FrameRow {
            timestamp_ms,
            progress: mount.progress(),
            visible: mount.visible(),
            outcome,
        });
        if outcome == FrameOutcome::Continue && rows.len() < MAX_FRAMES {
            scheduler.request_frame(id);
        }
    }
    if rows.len() >= MAX_FRAMES && !mount.is_finished() {
        log::warn!("chart reveal still running after {MAX_FRAMES} frames, stopping");
    }
    rows
}

/// Feed explicit timestamps to `mount`.
pub fn replay(mount: &mut ChartMount<FrameBuffer>, at_ms: &[f64]) -> Vec<FrameRow> {
    at_ms
        .iter()
        .map(|&ts| {
            let outcome = mount.on_frame(ts);
            FrameRow {
                timestamp_ms: ts,
                progress: mount.progress(),
                visible: mount.visible(),
                outcome,
            }
        })
        .collect()
}

pub fn run(config: &TriageConfig, cmd: ChartCommandConfig) {
    let width = cmd.width.unwrap_or(config.canvas_width);
    let height = cmd.height.unwrap_or(config.canvas_height);
    let dpr = cmd.dpr.unwrap_or(config.device_pixel_ratio);

    let geometry = match ChartGeometry::new(width, height, config.steps) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let series = SeriesPair::from_seed(config.seed, config.steps);
    let mut mount = ChartMount::mount(FrameBuffer::new(), geometry, series, dpr, config.reveal_ms);

    let rows = if cmd.at_ms.is_empty() {
        simulate(&mut mount, config.frame_interval())
    } else {
        replay(&mut mount, cmd.at_ms)
    };

    let (bw, bh) = mount.surface().backing_size();
    println!(
        "Chart {width}x{height} (backing {bw}x{bh}), {} points, reveal {}ms\n",
        config.steps, config.reveal_ms
    );
    println!("  {:>10} {:>9} {:>8}  outcome", "t (ms)", "progress", "visible");
    println!("  {}", "-".repeat(40));
    for row in &rows {
        println!(
            "  {:>10.2} {:>9.3} {:>8}  {:?}",
            row.timestamp_ms, row.progress, row.visible, row.outcome
        );
    }
    println!(
        "\n{} frames drawn, finished: {}",
        mount.frames_drawn(),
        mount.is_finished()
    );

    if cmd.dump_ops {
        match serde_json::to_string_pretty(mount.surface().ops()) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Failed to serialize draw ops: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::REVEAL_DURATION_MS;

    fn mount() -> ChartMount<FrameBuffer> {
        let geo = ChartGeometry::new(520.0, 280.0, 80).unwrap();
        ChartMount::mount(
            FrameBuffer::new(),
            geo,
            SeriesPair::from_seed(42, 80),
            1.0,
            REVEAL_DURATION_MS,
        )
    }

    #[test]
    fn test_simulation_ends_with_finished_frame() {
        let mut m = mount();
        let rows = simulate(&mut m, Duration::from_millis(16));
        let last = rows.last().unwrap();
        assert_eq!(last.outcome, FrameOutcome::Finished);
        assert_eq!(last.visible, 80);
        assert!(rows[..rows.len() - 1]
            .iter()
            .all(|r| r.outcome == FrameOutcome::Continue));
    }

    #[test]
    fn test_simulation_is_bounded_for_endless_reveal() {
        let geo = ChartGeometry::new(520.0, 280.0, 80).unwrap();
        let mut m = ChartMount::mount(
            FrameBuffer::new(),
            geo,
            SeriesPair::from_seed(42, 80),
            1.0,
            f64::INFINITY,
        );
        let rows = simulate(&mut m, Duration::from_millis(16));
        assert_eq!(rows.len(), MAX_FRAMES);
        assert!(!m.is_finished());
    }

    #[test]
    fn test_replay_after_finish_is_idle() {
        let mut m = mount();
        let rows = replay(&mut m, &[0.0, 750.0, 900.0]);
        assert_eq!(rows[1].outcome, FrameOutcome::Finished);
        assert_eq!(rows[2].outcome, FrameOutcome::Idle);
        assert_eq!(m.frames_drawn(), 2);
    }
}
