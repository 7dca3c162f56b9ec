//! Cooperative single-threaded scheduler on a virtual clock.
//!
//! Two kinds of work can be scheduled:
//! - **frame requests**, served on the next display refresh boundary (every
//!   `frame_interval`), all pending requests sharing one timestamp;
//! - **timers**, fired once at `now + delay`.
//!
//! Nothing runs by itself. The owner pulls due [`Wakeup`]s with
//! [`Scheduler::pop_due`] and dispatches them one at a time, so no two
//! callbacks ever interleave. Time only moves when the owner advances it,
//! which lets tests drive animations and delays deterministically.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::time::Duration;

/// Default refresh interval (60 Hz).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Identifies a chart mount that asked for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountId(pub u64);

/// Identifies a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// A unit of work that became due.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wakeup {
    /// Animation frame for `mount`, with the frame timestamp in milliseconds.
    Frame { mount: MountId, timestamp_ms: f64 },
    /// Timer `id` fired.
    Timer { id: TimerId },
}

#[derive(Debug)]
pub struct Scheduler {
    now: Duration,
    frame_interval: Duration,
    frame_requests: Vec<MountId>,
    /// Requests being served at `batch_at`. Requests made while a batch is
    /// being served wait for the following boundary.
    batch: VecDeque<MountId>,
    batch_at: Duration,
    timers: BinaryHeap<Reverse<(Duration, u64)>>,
    cancelled: Vec<TimerId>,
    next_timer: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl Scheduler {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            frame_interval: frame_interval.max(Duration::from_micros(1)),
            frame_requests: Vec::new(),
            batch: VecDeque::new(),
            batch_at: Duration::ZERO,
            timers: BinaryHeap::new(),
            cancelled: Vec::new(),
            next_timer: 0,
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn now_ms(&self) -> f64 {
        self.now.as_nanos() as f64 / 1_000_000.0
    }

    /// Ask for one frame callback for `mount` at the next refresh boundary.
    /// Duplicate requests from the same mount collapse into one.
    pub fn request_frame(&mut self, mount: MountId) {
        if !self.frame_requests.contains(&mount) {
            self.frame_requests.push(mount);
        }
    }

    /// Drop any pending frame request of `mount`.
    pub fn cancel_frames(&mut self, mount: MountId) {
        self.frame_requests.retain(|m| *m != mount);
        self.batch.retain(|m| *m != mount);
    }

    /// Schedule a one-shot timer `delay` from now.
    pub fn set_timer(&mut self, delay: Duration) -> TimerId {
        let id = self.next_timer;
        self.next_timer += 1;
        let at = self.now.checked_add(delay).unwrap_or(Duration::MAX);
        self.timers.push(Reverse((at, id)));
        TimerId(id)
    }

    /// Forget a timer. Returns false if it already fired or was unknown.
    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        let pending = self.timers.iter().any(|Reverse((_, t))| *t == id.0);
        if pending && !self.cancelled.contains(&id) {
            self.cancelled.push(id);
            true
        } else {
            false
        }
    }

    /// Pending frame requests.
    pub fn pending_frames(&self) -> usize {
        self.frame_requests.len() + self.batch.len()
    }

    /// Pending, non-cancelled timers.
    pub fn pending_timers(&self) -> usize {
        self.timers
            .iter()
            .filter(|Reverse((_, t))| !self.cancelled.contains(&TimerId(*t)))
            .count()
    }

    /// True when nothing is scheduled.
    pub fn is_idle(&self) -> bool {
        self.pending_frames() == 0 && self.pending_timers() == 0
    }

    fn next_frame_boundary(&self) -> Duration {
        let interval = self.frame_interval.as_nanos();
        let now = self.now.as_nanos();
        let next = (now / interval + 1) * interval;
        u64::try_from(next).map_or(Duration::MAX, Duration::from_nanos)
    }

    fn drop_cancelled_head(&mut self) {
        while let Some(Reverse((_, id))) = self.timers.peek() {
            let id = TimerId(*id);
            if let Some(pos) = self.cancelled.iter().position(|c| *c == id) {
                self.cancelled.swap_remove(pos);
                self.timers.pop();
            } else {
                break;
            }
        }
    }

    /// Pop the earliest wakeup due no later than `until`, moving the clock to
    /// its due time. When nothing is due the clock moves to `until` and `None`
    /// is returned. Timers win ties against frames.
    ///
    /// A frame boundary serves every mount that had requested a frame before
    /// it; the first returned wakeup takes the requests, the rest follow on
    /// subsequent calls at the same timestamp. A timer due no later than that
    /// boundary still goes first.
    pub fn pop_due(&mut self, until: Duration) -> Option<Wakeup> {
        self.drop_cancelled_head();
        let timer_at = self.timers.peek().map(|Reverse((at, _))| *at);
        let frame_at = if !self.batch.is_empty() {
            Some(self.batch_at)
        } else if !self.frame_requests.is_empty() {
            Some(self.next_frame_boundary())
        } else {
            None
        };

        let take_timer = match (timer_at, frame_at) {
            (Some(t), Some(f)) => t <= f,
            (Some(_), None) => true,
            (None, _) => false,
        };

        if take_timer {
            let at = timer_at.unwrap_or(until);
            if at <= until {
                let Reverse((at, id)) = self.timers.pop()?;
                self.now = self.now.max(at);
                return Some(Wakeup::Timer { id: TimerId(id) });
            }
        } else if let Some(at) = frame_at {
            if at <= until {
                if self.batch.is_empty() {
                    self.batch = std::mem::take(&mut self.frame_requests).into();
                    self.batch_at = at;
                }
                self.now = at;
                let mount = self.batch.pop_front()?;
                return Some(Wakeup::Frame {
                    mount,
                    timestamp_ms: self.now_ms(),
                });
            }
        }

        self.now = self.now.max(until);
        None
    }

    /// Collect every wakeup due within the next `delta` without dispatching.
    /// Useful when nothing reschedules in response.
    pub fn drain(&mut self, delta: Duration) -> Vec<Wakeup> {
        let until = self.now.checked_add(delta).unwrap_or(Duration::MAX);
        let mut out = Vec::new();
        while let Some(w) = self.pop_due(until) {
            out.push(w);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn timer_fires_at_deadline() {
        let mut s = Scheduler::default();
        let id = s.set_timer(ms(600));
        assert_eq!(s.pop_due(ms(599)), None);
        assert_eq!(s.now(), ms(599));
        assert_eq!(s.pop_due(ms(600)), Some(Wakeup::Timer { id }));
        assert_eq!(s.now(), ms(600));
        assert!(s.is_idle());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut s = Scheduler::default();
        let id = s.set_timer(ms(10));
        assert!(s.cancel_timer(id));
        assert!(!s.cancel_timer(id));
        assert!(s.drain(ms(100)).is_empty());
        assert!(s.is_idle());
    }

    #[test]
    fn frames_land_on_refresh_boundaries() {
        let mut s = Scheduler::new(ms(10));
        s.request_frame(MountId(1));
        s.request_frame(MountId(1));
        assert_eq!(s.pending_frames(), 1);
        match s.pop_due(ms(100)) {
            Some(Wakeup::Frame { mount, timestamp_ms }) => {
                assert_eq!(mount, MountId(1));
                assert_eq!(timestamp_ms, 10.0);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(s.pop_due(ms(100)), None);
        assert_eq!(s.now(), ms(100));
    }

    #[test]
    fn frames_do_not_repeat_without_new_request() {
        let mut s = Scheduler::new(ms(10));
        s.request_frame(MountId(3));
        let woke = s.drain(ms(1000));
        assert_eq!(woke.len(), 1);
    }

    #[test]
    fn timers_win_ties_against_frames() {
        let mut s = Scheduler::new(ms(10));
        let id = s.set_timer(ms(10));
        s.request_frame(MountId(0));
        assert_eq!(s.pop_due(ms(50)), Some(Wakeup::Timer { id }));
        assert!(matches!(s.pop_due(ms(50)), Some(Wakeup::Frame { .. })));
    }

    #[test]
    fn cancel_frames_drops_requests() {
        let mut s = Scheduler::new(ms(10));
        s.request_frame(MountId(1));
        s.request_frame(MountId(2));
        s.cancel_frames(MountId(1));
        let woke = s.drain(ms(20));
        assert_eq!(
            woke,
            vec![Wakeup::Frame {
                mount: MountId(2),
                timestamp_ms: 10.0
            }]
        );
    }

    #[test]
    fn mounts_share_one_refresh_timestamp() {
        let mut s = Scheduler::new(ms(10));
        s.request_frame(MountId(1));
        s.request_frame(MountId(2));
        let stamps: Vec<f64> = s
            .drain(ms(100))
            .into_iter()
            .map(|w| match w {
                Wakeup::Frame { timestamp_ms, .. } => timestamp_ms,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(stamps, vec![10.0, 10.0]);
    }

    #[test]
    fn request_during_batch_waits_for_next_boundary() {
        let mut s = Scheduler::new(ms(10));
        s.request_frame(MountId(1));
        s.request_frame(MountId(2));
        assert!(matches!(
            s.pop_due(ms(100)),
            Some(Wakeup::Frame { mount: MountId(1), .. })
        ));
        s.request_frame(MountId(1));
        assert_eq!(s.pending_frames(), 2);
        assert_eq!(
            s.pop_due(ms(100)),
            Some(Wakeup::Frame {
                mount: MountId(2),
                timestamp_ms: 10.0
            })
        );
        assert_eq!(
            s.pop_due(ms(100)),
            Some(Wakeup::Frame {
                mount: MountId(1),
                timestamp_ms: 20.0
            })
        );
    }

    #[test]
    fn cancel_frames_reaches_current_batch() {
        let mut s = Scheduler::new(ms(10));
        s.request_frame(MountId(1));
        s.request_frame(MountId(2));
        s.pop_due(ms(100));
        s.cancel_frames(MountId(2));
        assert_eq!(s.pending_frames(), 0);
        assert_eq!(s.pop_due(ms(100)), None);
    }

    #[test]
    fn huge_delays_saturate() {
        let mut s = Scheduler::new(Duration::MAX);
        s.set_timer(Duration::MAX);
        s.request_frame(MountId(0));
        assert_eq!(s.pop_due(ms(10)), None);
        assert_eq!(s.pending_timers(), 1);
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut s = Scheduler::default();
        let late = s.set_timer(ms(30));
        let early = s.set_timer(ms(10));
        let woke = s.drain(ms(40));
        assert_eq!(
            woke,
            vec![Wakeup::Timer { id: early }, Wakeup::Timer { id: late }]
        );
    }
}
