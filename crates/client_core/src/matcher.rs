use shared::domain::Participant;

/// Participants whose name contains `term`, ignoring case, in roster order.
/// An empty term places no constraint and returns the whole pool.
pub fn find_matches(term: &str, pool: &[Participant]) -> Vec<Participant> {
    if term.is_empty() {
        return pool.to_vec();
    }

    let needle = term.to_lowercase();
    pool.iter()
        .filter(|participant| participant.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
