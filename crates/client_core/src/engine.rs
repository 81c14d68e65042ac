//! Seam to the wheel rendering/animation engine, plus a headless engine that
//! keeps the geometry without drawing anything.

use crossbeam_channel::Sender;
use rand::Rng;
use shared::wheel::{WheelConfig, WheelSegment};
use tracing::{debug, trace, warn};

/// Identifies one spin. A completion carrying a ticket that is no longer in
/// flight is discarded by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpinTicket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WheelEvent {
    AnimationFinished { ticket: SpinTicket, segment: usize },
}

pub trait WheelEngine {
    fn configure(&mut self, config: &WheelConfig);
    fn add_segment(&mut self, segment: WheelSegment);
    fn clear_segments(&mut self);
    fn draw(&mut self);
    /// Starts the spin. The engine reports completion by emitting exactly one
    /// `WheelEvent::AnimationFinished` carrying `ticket`.
    fn start_animation(&mut self, ticket: SpinTicket);
    fn stop_animation(&mut self, invoke_callback: bool);
    fn set_rotation_angle(&mut self, degrees: f64);
    fn rotation_angle(&self) -> f64;
    /// Segment index currently under the pointer.
    fn indicated_segment(&self) -> Option<usize>;
}

pub type StopAngleSource = Box<dyn FnMut() -> f64 + Send>;

struct PendingSpin {
    ticket: SpinTicket,
    target_rotation: f64,
}

/// Engine without a canvas. Segment `i` of `n` covers wheel angles
/// `[i * 360/n, (i + 1) * 360/n)` and the pointer sits at 0 degrees.
pub struct HeadlessWheel {
    config: WheelConfig,
    segments: Vec<WheelSegment>,
    rotation: f64,
    pending: Option<PendingSpin>,
    events: Sender<WheelEvent>,
    stop_angle: StopAngleSource,
}

impl HeadlessWheel {
    pub fn new(events: Sender<WheelEvent>) -> Self {
        Self::with_stop_angle_source(
            events,
            Box::new(|| rand::thread_rng().gen_range(0.0..360.0)),
        )
    }

    pub fn with_stop_angle_source(events: Sender<WheelEvent>, stop_angle: StopAngleSource) -> Self {
        Self {
            config: WheelConfig::standard(),
            segments: Vec::new(),
            rotation: 0.0,
            pending: None,
            events,
            stop_angle,
        }
    }

    pub fn segments(&self) -> &[WheelSegment] {
        &self.segments
    }

    pub fn is_animating(&self) -> bool {
        self.pending.is_some()
    }

    /// Runs the in-flight spin to its natural end and emits the completion.
    /// Returns false when nothing was spinning.
    pub fn finish_animation(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        self.rotation = pending.target_rotation;
        self.draw();

        let Some(segment) = self.indicated_segment() else {
            warn!("spin finished on a wheel without segments");
            return false;
        };
        debug!(ticket = pending.ticket.0, segment, "headless spin finished");
        if self
            .events
            .send(WheelEvent::AnimationFinished {
                ticket: pending.ticket,
                segment,
            })
            .is_err()
        {
            debug!("wheel event receiver dropped");
        }
        true
    }

    fn arc(&self) -> Option<f64> {
        match self.segments.len() {
            0 => None,
            n => Some(360.0 / n as f64),
        }
    }
}

impl WheelEngine for HeadlessWheel {
    fn configure(&mut self, config: &WheelConfig) {
        self.config = config.clone();
        self.segments.clear();
        self.rotation = 0.0;
        self.pending = None;
    }

    fn add_segment(&mut self, segment: WheelSegment) {
        self.segments.push(segment);
    }

    fn clear_segments(&mut self) {
        self.segments.clear();
    }

    fn draw(&mut self) {
        trace!(segments = self.segments.len(), rotation = self.rotation, "headless draw");
    }

    fn start_animation(&mut self, ticket: SpinTicket) {
        if self.segments.is_empty() {
            warn!(ticket = ticket.0, "ignoring spin of an empty wheel");
            return;
        }
        let stop = (self.stop_angle)().rem_euclid(360.0);
        let spins = f64::from(self.config.animation.spins);
        self.pending = Some(PendingSpin {
            ticket,
            target_rotation: spins * 360.0 + (360.0 - stop),
        });
    }

    fn stop_animation(&mut self, invoke_callback: bool) {
        if invoke_callback {
            self.finish_animation();
        } else if let Some(pending) = self.pending.take() {
            debug!(ticket = pending.ticket.0, "spin stopped without completion");
        }
    }

    fn set_rotation_angle(&mut self, degrees: f64) {
        self.rotation = degrees;
    }

    fn rotation_angle(&self) -> f64 {
        self.rotation
    }

    fn indicated_segment(&self) -> Option<usize> {
        let arc = self.arc()?;
        let under_pointer = (360.0 - self.rotation.rem_euclid(360.0)).rem_euclid(360.0);
        let index = (under_pointer / arc).floor() as usize;
        Some(index.min(self.segments.len() - 1))
    }
}
