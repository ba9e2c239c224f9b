use parley_core::{PeerId, Role};
use std::fmt;
use std::str::FromStr;

/// Decides which member of a pair sends the offer.
///
/// Both members of a pair derive the same answer from what each of them observed,
/// so every pair ends up with exactly one offerer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RolePolicy {
    /// Rooms of two. The creator offers once the joiner announces `ready`.
    TwoParty,
    /// Full mesh. A member already in the room offers to each newcomer.
    #[default]
    Star,
}

/// What a member does right after it enters a room that already had members.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryPlan {
    /// Sessions to open as answerer.
    pub answer_to: Vec<PeerId>,
    /// Member that should receive `ready`.
    pub announce_ready_to: Option<PeerId>,
}

impl RolePolicy {
    pub fn on_room_joined(self, members: &[PeerId]) -> EntryPlan {
        match self {
            RolePolicy::Star => EntryPlan {
                answer_to: members.to_vec(),
                announce_ready_to: None,
            },
            RolePolicy::TwoParty => {
                let creator = members.first().cloned();
                EntryPlan {
                    answer_to: creator.iter().cloned().collect(),
                    announce_ready_to: creator,
                }
            }
        }
    }

    /// Role toward a newcomer, if a session should be opened right away.
    pub fn on_peer_joined(self) -> Option<Role> {
        match self {
            RolePolicy::Star => Some(Role::Offerer),
            RolePolicy::TwoParty => None,
        }
    }

    /// Role toward a member that announced `ready`. A two-party creator pairs once:
    /// while it holds a live session, later announcements are ignored.
    pub fn on_ready(self, is_creator: bool, live_sessions: usize) -> Option<Role> {
        match self {
            RolePolicy::TwoParty if is_creator && live_sessions == 0 => Some(Role::Offerer),
            _ => None,
        }
    }

    /// An offer from a member without a session makes us its answerer.
    pub fn on_unsolicited_offer(self) -> Role {
        Role::Answerer
    }
}

impl fmt::Display for RolePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RolePolicy::TwoParty => f.write_str("two-party"),
            RolePolicy::Star => f.write_str("star"),
        }
    }
}

impl FromStr for RolePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "two-party" => Ok(RolePolicy::TwoParty),
            "star" => Ok(RolePolicy::Star),
            other => Err(format!(
                "unknown role policy '{}', expected 'two-party' or 'star'",
                other
            )),
        }
    }
}
