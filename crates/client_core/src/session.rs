//! Top-level picker: turns UI actions and engine events into controller calls
//! and publishes what the UI should show.

use crossbeam_channel::Sender;
use shared::{
    domain::{Participant, Roster, SessionState},
    error::PickerError,
};
use tracing::{debug, info, warn};

use crate::{
    engine::{WheelEngine, WheelEvent},
    matcher::find_matches,
    wheel::WheelController,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    SearchChanged(String),
    SuggestionClicked(String),
    SpinClicked,
    ResetClicked,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    RosterInstalled { participants: usize },
    MatchesUpdated(Vec<Participant>),
    SelectionChanged(Vec<String>),
    SpinEnabled,
    SpinDisabled,
    SpinStarted,
    WinnerAnnounced { winner: Option<Participant> },
    ResetEnabled,
    ResetHidden,
}

pub struct PickerSession<E: WheelEngine> {
    roster: Roster,
    roster_installed: bool,
    wheel: WheelController<E>,
    ui_tx: Sender<UiEvent>,
}

impl<E: WheelEngine> PickerSession<E> {
    /// Starts with an empty pool; the roster arrives later via `install_roster`.
    pub fn new(engine: E, ui_tx: Sender<UiEvent>) -> Self {
        Self {
            roster: Roster::new(),
            roster_installed: false,
            wheel: WheelController::create_wheel(engine),
            ui_tx,
        }
    }

    pub fn state(&self) -> SessionState {
        self.wheel.state()
    }

    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    pub fn wheel(&self) -> &WheelController<E> {
        &self.wheel
    }

    pub fn wheel_mut(&mut self) -> &mut WheelController<E> {
        &mut self.wheel
    }

    /// Installs the session roster. Only the first call has any effect.
    pub fn install_roster(&mut self, roster: Roster) -> bool {
        if self.roster_installed {
            debug!("roster already installed; ignoring replacement");
            return false;
        }
        self.roster = roster;
        self.roster_installed = true;
        info!(participants = self.roster.len(), "roster installed");
        self.publish(UiEvent::RosterInstalled {
            participants: self.roster.len(),
        });
        true
    }

    pub fn dispatch(&mut self, action: UiAction) {
        let result = match action {
            UiAction::SearchChanged(term) => {
                self.search(&term);
                Ok(())
            }
            UiAction::SuggestionClicked(name) => self.add_candidate(&name),
            UiAction::SpinClicked => self.spin(),
            UiAction::ResetClicked => self.reset(),
        };
        match result {
            Err(err) if err.is_silent() => {
                debug!(error = %err, state = %self.state(), "ui action ignored")
            }
            Err(err) => warn!(error = %err, state = %self.state(), "ui action failed"),
            Ok(()) => {}
        }
    }

    pub fn handle_engine_event(&mut self, event: WheelEvent) {
        match self.wheel.handle_event(event) {
            Ok(winner) => {
                self.publish(UiEvent::WinnerAnnounced { winner });
                self.publish(UiEvent::ResetEnabled);
            }
            Err(err) => debug!(error = %err, "engine event ignored"),
        }
    }

    fn search(&self, term: &str) {
        let matches = find_matches(term, &self.roster);
        self.publish(UiEvent::MatchesUpdated(matches));
    }

    fn add_candidate(&mut self, name: &str) -> Result<(), PickerError> {
        let participant = self
            .roster
            .iter()
            .find(|participant| participant.name == name)
            .cloned()
            .ok_or_else(|| PickerError::UnknownCandidate {
                name: name.to_string(),
            })?;

        let added = self.wheel.on_candidate_added(participant)?;
        self.publish(UiEvent::SelectionChanged(self.wheel.segments().names()));
        if added.spin_enabled {
            self.publish(UiEvent::SpinEnabled);
        }
        Ok(())
    }

    fn spin(&mut self) -> Result<(), PickerError> {
        self.wheel.spin()?;
        self.publish(UiEvent::SpinStarted);
        Ok(())
    }

    fn reset(&mut self) -> Result<(), PickerError> {
        self.wheel.reset()?;
        self.publish(UiEvent::SelectionChanged(Vec::new()));
        self.publish(UiEvent::SpinDisabled);
        self.publish(UiEvent::ResetHidden);
        Ok(())
    }

    fn publish(&self, event: UiEvent) {
        if self.ui_tx.send(event).is_err() {
            debug!("ui event receiver dropped");
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
