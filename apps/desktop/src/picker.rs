//! Drives a picker session from the terminal loop. The spin animation runs
//! against a deadline so the loop keeps reading commands while the wheel turns.

use std::time::Duration;

use anyhow::Result;
use client_core::{HeadlessWheel, PickerSession, UiAction, WheelEvent};
use crossbeam_channel::Receiver;
use shared::domain::{Roster, SessionState};
use storage::Storage;
use tokio::time::Instant;
use tracing::{debug, warn};

pub const FALLBACK_DATABASE_URL: &str = "sqlite::memory:";

/// Opens the roster cache, falling back to an in-memory database so the
/// session still runs when the configured one cannot be opened.
pub async fn open_cache_storage(database_url: &str) -> Result<Storage> {
    match Storage::new(database_url).await {
        Ok(storage) => Ok(storage),
        Err(err) => {
            warn!(
                error = %err,
                database_url,
                "cache database unavailable; roster will not be kept between sessions"
            );
            Storage::new(FALLBACK_DATABASE_URL).await
        }
    }
}

pub struct ConsolePicker {
    session: PickerSession<HeadlessWheel>,
    engine_rx: Receiver<WheelEvent>,
    spin_delay: Duration,
    spin_due: Option<Instant>,
}

impl ConsolePicker {
    pub fn new(
        session: PickerSession<HeadlessWheel>,
        engine_rx: Receiver<WheelEvent>,
        spin_delay: Duration,
    ) -> Self {
        Self {
            session,
            engine_rx,
            spin_delay,
            spin_due: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn install_roster(&mut self, roster: Roster) -> bool {
        self.session.install_roster(roster)
    }

    /// When the running spin should come to rest, if one is running.
    pub fn spin_due(&self) -> Option<Instant> {
        self.spin_due
    }

    pub fn apply(&mut self, action: UiAction) {
        self.session.dispatch(action);
        match self.session.state() {
            SessionState::Spinning if self.spin_due.is_none() => {
                self.spin_due = Some(Instant::now() + self.spin_delay);
            }
            SessionState::Spinning => {}
            _ => self.spin_due = None,
        }
    }

    /// Lets the running spin land and feeds the completion back into the
    /// session. Returns false when there was no spin to finish.
    pub fn finish_spin(&mut self) -> bool {
        if self.spin_due.take().is_none() {
            return false;
        }
        let finished = self.session.wheel_mut().engine_mut().finish_animation();
        for event in self.engine_rx.try_iter() {
            self.session.handle_engine_event(event);
        }
        debug!(finished, state = %self.state(), "spin deadline reached");
        finished
    }
}

#[cfg(test)]
#[path = "tests/picker_tests.rs"]
mod tests;
