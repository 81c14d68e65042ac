//! Wheel lifecycle: mirrors the segment set onto the engine and guards the
//! Idle -> Ready -> Spinning -> Resulted -> Idle state machine.

use shared::{
    domain::{Participant, SessionState},
    error::{PickerError, WheelAction},
    wheel::{WheelConfig, WheelSegment, READY_THRESHOLD},
};
use tracing::{debug, info, warn};

use crate::{
    engine::{SpinTicket, WheelEngine, WheelEvent},
    segments::SegmentSet,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateAdded {
    pub index: usize,
    pub size: usize,
    /// Set on the single add that makes the wheel spinnable.
    pub spin_enabled: bool,
}

pub struct WheelController<E: WheelEngine> {
    engine: E,
    segments: SegmentSet,
    state: SessionState,
    spin_enabled_announced: bool,
    in_flight: Option<SpinTicket>,
    next_ticket: u64,
    winner: Option<Participant>,
}

impl<E: WheelEngine> WheelController<E> {
    /// Configures `engine` with the standard profile and draws the empty wheel.
    pub fn create_wheel(mut engine: E) -> Self {
        engine.configure(&WheelConfig::standard());
        engine.draw();
        Self {
            engine,
            segments: SegmentSet::new(),
            state: SessionState::Idle,
            spin_enabled_announced: false,
            in_flight: None,
            next_ticket: 0,
            winner: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn segments(&self) -> &SegmentSet {
        &self.segments
    }

    pub fn winner(&self) -> Option<&Participant> {
        self.winner.as_ref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn on_candidate_added(
        &mut self,
        participant: Participant,
    ) -> Result<CandidateAdded, PickerError> {
        if !matches!(self.state, SessionState::Idle | SessionState::Ready) {
            return Err(PickerError::invalid(self.state, WheelAction::Add));
        }

        let segment = WheelSegment::for_participant(&participant);
        let added = self.segments.add(participant)?;

        self.engine.add_segment(segment);
        self.engine.draw();

        let spin_enabled = !self.spin_enabled_announced && added.size == READY_THRESHOLD;
        if added.size >= READY_THRESHOLD {
            self.state = SessionState::Ready;
        }
        if spin_enabled {
            self.spin_enabled_announced = true;
            info!(segments = added.size, "wheel ready to spin");
        }

        Ok(CandidateAdded {
            index: added.index,
            size: added.size,
            spin_enabled,
        })
    }

    pub fn spin(&mut self) -> Result<SpinTicket, PickerError> {
        if self.state != SessionState::Ready {
            return Err(PickerError::invalid(self.state, WheelAction::Spin));
        }

        self.next_ticket += 1;
        let ticket = SpinTicket(self.next_ticket);
        self.in_flight = Some(ticket);
        self.state = SessionState::Spinning;
        self.engine.start_animation(ticket);
        info!(ticket = ticket.0, segments = self.segments.size(), "spin started");
        Ok(ticket)
    }

    pub fn handle_event(&mut self, event: WheelEvent) -> Result<Option<Participant>, PickerError> {
        match event {
            WheelEvent::AnimationFinished { ticket, segment } => {
                self.on_animation_finished(ticket, segment)
            }
        }
    }

    /// Declares the participant bound to `segment` the winner. Accepted once
    /// per spin; completions of cancelled spins are rejected.
    pub fn on_animation_finished(
        &mut self,
        ticket: SpinTicket,
        segment: usize,
    ) -> Result<Option<Participant>, PickerError> {
        if self.state != SessionState::Spinning {
            return Err(PickerError::invalid(self.state, WheelAction::Finish));
        }
        if self.in_flight != Some(ticket) {
            return Err(PickerError::CancelledSpin { ticket: ticket.0 });
        }

        self.in_flight = None;
        self.state = SessionState::Resulted;

        let winner = match self.segments.get(segment) {
            Some(participant) => Some(participant.clone()),
            None => {
                warn!(segment, "engine reported an unknown segment; asking for the indicated one");
                self.engine
                    .indicated_segment()
                    .and_then(|index| self.segments.get(index))
                    .cloned()
            }
        };

        match &winner {
            Some(participant) => info!(ticket = ticket.0, winner = %participant.name, "spin resulted"),
            None => warn!(ticket = ticket.0, "spin resulted without a winner"),
        }
        self.winner = winner.clone();
        Ok(winner)
    }

    /// Forced stop from `Spinning`, or the normal way back from `Resulted`.
    /// A completion of the stopped spin is suppressed.
    pub fn reset(&mut self) -> Result<(), PickerError> {
        if !matches!(self.state, SessionState::Resulted | SessionState::Spinning) {
            return Err(PickerError::invalid(self.state, WheelAction::Reset));
        }

        let forced = self.state == SessionState::Spinning;
        self.engine.stop_animation(false);
        self.in_flight = None;
        self.engine.set_rotation_angle(0.0);

        self.segments.clear();
        self.engine.clear_segments();
        self.engine.draw();

        self.state = SessionState::Idle;
        self.spin_enabled_announced = false;
        self.winner = None;
        debug!(forced, "wheel reset");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/wheel_tests.rs"]
mod tests;
