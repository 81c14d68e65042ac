use shared::{domain::Participant, error::PickerError, wheel::MAX_SEGMENTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Added {
    /// Position of the new segment, matching the engine's segment order.
    pub index: usize,
    pub size: usize,
}

/// Participants currently on the wheel, in insertion order. Holds at most
/// `MAX_SEGMENTS` entries with unique names.
#[derive(Debug, Clone, Default)]
pub struct SegmentSet {
    members: Vec<Participant>,
}

impl SegmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, participant: Participant) -> Result<Added, PickerError> {
        if self.members.len() >= MAX_SEGMENTS {
            return Err(PickerError::CapacityExceeded {
                capacity: MAX_SEGMENTS,
            });
        }
        if self.contains(&participant.name) {
            return Err(PickerError::DuplicateCandidate {
                name: participant.name,
            });
        }

        self.members.push(participant);
        Ok(Added {
            index: self.members.len() - 1,
            size: self.members.len(),
        })
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|member| member.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&Participant> {
        self.members.get(index)
    }

    pub fn names(&self) -> Vec<String> {
        self.members.iter().map(|member| member.name.clone()).collect()
    }
}
