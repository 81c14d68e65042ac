//! Wheel picker core: roster loading, name search, the segment set and the
//! spin lifecycle driven against an external wheel engine.

pub mod engine;
pub mod matcher;
pub mod roster;
pub mod segments;
pub mod session;
pub mod wheel;

pub use engine::{HeadlessWheel, SpinTicket, WheelEngine, WheelEvent};
pub use matcher::find_matches;
pub use roster::{
    FetchError, HttpRosterFetcher, RosterCache, RosterFetcher, SnapshotStore,
    DEFAULT_ROSTER_ENDPOINT, ROSTER_SLOT,
};
pub use segments::{Added, SegmentSet};
pub use session::{PickerSession, UiAction, UiEvent};
pub use wheel::{CandidateAdded, WheelController};
