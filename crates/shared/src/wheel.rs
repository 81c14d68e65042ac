use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::Participant;

/// Hard cap on wheel slots. The rendering engine has no guard of its own.
pub const MAX_SEGMENTS: usize = 5;

/// Segment count at which spinning becomes possible.
pub const READY_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    SpinToStop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationProfile {
    pub kind: AnimationKind,
    pub duration: Duration,
    pub spins: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelConfig {
    pub segment_count: usize,
    pub text_font_size: u32,
    pub responsive: bool,
    pub line_width: u32,
    pub animation: AnimationProfile,
}

impl WheelConfig {
    /// Presentation profile every wheel is created with.
    pub fn standard() -> Self {
        Self {
            segment_count: 0,
            text_font_size: 20,
            responsive: true,
            line_width: 1,
            animation: AnimationProfile {
                kind: AnimationKind::SpinToStop,
                duration: Duration::from_secs(5),
                spins: 8,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentStyle {
    pub text_font_family: String,
    pub fill_style: String,
    pub stroke_style: String,
    pub text_fill_style: String,
}

impl SegmentStyle {
    pub fn template() -> Self {
        Self {
            text_font_family: "Roboto".into(),
            fill_style: "#22ff5f".into(),
            stroke_style: "white".into(),
            text_fill_style: "white".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelSegment {
    pub text: String,
    pub style: SegmentStyle,
    pub weight: u32,
}

impl WheelSegment {
    pub fn for_participant(participant: &Participant) -> Self {
        Self {
            text: participant.name.clone(),
            style: SegmentStyle::template(),
            weight: 1,
        }
    }
}
