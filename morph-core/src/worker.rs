//! Background point-set generation.
//!
//! A single detached thread wakes on a coarse poll interval, asks its
//! [`RequestGate`] whether a new set is due, and if so runs the
//! [`PointSource`] and pushes the result through the bounded channel.
//! The channel is the only thing the worker shares with the render loop;
//! gate state (the "last second seen" timer and friends) lives inside the
//! gate value owned by the worker thread.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::channel::BoundedChannel;
use crate::noise::triangle_wave;
use crate::sampler::PointSource;
use crate::types::PointSet;

/// Policy deciding when the worker should request a fresh point set.
///
/// Swappable by design: the pipeline does not care whether generation is
/// keyed to wall-clock seconds, a fixed interval, or the phase of a
/// periodic signal.
pub trait RequestGate: Send {
    /// Returns the label for the next set if one is due at `now_secs`,
    /// or `None` to skip this poll.
    fn poll(&mut self, now_secs: f64) -> Option<String>;
}

/// Fires once per distinct wall-clock second, labeling sets "00".."59".
pub struct DistinctSecondGate {
    last: Option<u64>,
}

impl DistinctSecondGate {
    pub fn new() -> Self {
        Self { last: None }
    }
}

impl Default for DistinctSecondGate {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestGate for DistinctSecondGate {
    fn poll(&mut self, now_secs: f64) -> Option<String> {
        let second = now_secs as u64;
        if self.last == Some(second) {
            return None;
        }
        self.last = Some(second);
        Some(format!("{:02}", second % 60))
    }
}

/// Fires once per fixed period, labeling sets with a running counter.
pub struct FixedIntervalGate {
    period_secs: f64,
    next_at: f64,
    ticks: u64,
}

impl FixedIntervalGate {
    pub fn new(period: Duration) -> Self {
        Self {
            period_secs: period.as_secs_f64(),
            next_at: 0.0,
            ticks: 0,
        }
    }
}

impl RequestGate for FixedIntervalGate {
    fn poll(&mut self, now_secs: f64) -> Option<String> {
        if now_secs < self.next_at {
            return None;
        }
        self.next_at = now_secs + self.period_secs;
        self.ticks += 1;
        Some(format!("{:04}", self.ticks))
    }
}

/// Fires on each rising zero-crossing of the 4-second triangle wave.
pub struct SignalPhaseGate {
    prev: f32,
}

impl SignalPhaseGate {
    pub fn new() -> Self {
        Self { prev: -1.0 }
    }
}

impl Default for SignalPhaseGate {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestGate for SignalPhaseGate {
    fn poll(&mut self, now_secs: f64) -> Option<String> {
        let sample = triangle_wave(now_secs as f32);
        let rising = self.prev < 0.0 && sample >= 0.0;
        self.prev = sample;
        rising.then(|| format!("{:02}", (now_secs as u64) % 60))
    }
}

/// Runs one iteration of the worker body.
///
/// Polls the gate; on a due label, generates a set and sends it. The send
/// blocks while the channel is full — that backpressure is what keeps the
/// worker from outrunning the render loop. Generation failures are logged
/// and skipped, so the loop keeps running on the next due label.
///
/// ### Returns
/// `true` if a set was generated and sent.
pub fn produce_once(
    channel: &BoundedChannel<PointSet>,
    source: &mut dyn PointSource,
    gate: &mut dyn RequestGate,
    now_secs: f64,
) -> bool {
    let Some(label) = gate.poll(now_secs) else {
        return false;
    };
    match source.generate(&label) {
        Ok(set) => {
            debug!(label = %label, points = set.len(), "generated point set");
            channel.send_blocking(set);
            true
        }
        Err(e) => {
            warn!(label = %label, error = %e, "point generation failed");
            false
        }
    }
}

/// Spawns the generator thread. The thread runs for the lifetime of the
/// process; no cancellation is modeled, and the returned handle is
/// normally dropped.
pub fn spawn_worker(
    channel: Arc<BoundedChannel<PointSet>>,
    mut source: Box<dyn PointSource>,
    mut gate: Box<dyn RequestGate>,
    poll_interval: Duration,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        loop {
            thread::sleep(poll_interval);
            let now = wall_clock_secs();
            produce_once(&channel, source.as_mut(), gate.as_mut(), now);
        }
    })
}

fn wall_clock_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs_f64()
}
