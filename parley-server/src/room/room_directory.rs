use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parley_core::{PeerId, RoomId};
use tracing::debug;

/// Result of registering a peer in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// The joiner is the first member, so the room was just created.
    pub created: bool,
    /// Members already present, in join order, excluding the joiner.
    pub existing: Vec<PeerId>,
}

/// Process-wide room membership owned by the relay.
///
/// Each mutation takes the room's shard lock once, so concurrent joins to the same
/// room are serialised and every joiner sees a consistent member list.
#[derive(Default)]
pub struct RoomDirectory {
    rooms: DashMap<RoomId, Vec<PeerId>>,
    memberships: DashMap<PeerId, RoomId>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, room_id: &RoomId, peer_id: &PeerId) -> JoinOutcome {
        let outcome = {
            let mut members = self.rooms.entry(room_id.clone()).or_default();
            let created = members.is_empty();
            let existing: Vec<PeerId> = members.iter().filter(|p| *p != peer_id).cloned().collect();
            if !members.contains(peer_id) {
                members.push(peer_id.clone());
            }
            JoinOutcome { created, existing }
        };

        self.memberships.insert(peer_id.clone(), room_id.clone());
        debug!(
            "Peer {} joined room '{}' ({} already present)",
            peer_id,
            room_id,
            outcome.existing.len()
        );
        outcome
    }

    /// Removes the peer from its room. Returns the room and who is still in it;
    /// a room left empty is dropped.
    pub fn leave(&self, peer_id: &PeerId) -> Option<(RoomId, Vec<PeerId>)> {
        let (_, room_id) = self.memberships.remove(peer_id)?;

        let remaining = match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().retain(|p| p != peer_id);
                let remaining = entry.get().clone();
                if remaining.is_empty() {
                    entry.remove();
                    debug!("Room '{}' is empty, dropping it", room_id);
                }
                remaining
            }
            Entry::Vacant(_) => Vec::new(),
        };

        Some((room_id, remaining))
    }

    pub fn room_of(&self, peer_id: &PeerId) -> Option<RoomId> {
        self.memberships.get(peer_id).map(|r| r.value().clone())
    }

    pub fn members(&self, room_id: &RoomId) -> Vec<PeerId> {
        self.rooms
            .get(room_id)
            .map(|m| m.value().clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, room_id: &RoomId, peer_id: &PeerId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|m| m.value().contains(peer_id))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
