//! A room's membership: ordered by join time, keyed by client identity.
//!
//! Only the room actor owns a `Roster`, so nothing here locks. Positions
//! matter (the turn pointer is an index into join order), but members are
//! always found and removed by [`ClientId`], never by a position a caller
//! remembered from earlier.

use easel_protocol::{ClientId, Frame};
use tokio::sync::mpsc;

/// The channel through which a room reaches one member's connection.
///
/// The session on the other end drains it onto its transport, in order.
pub type Outbox = mpsc::UnboundedSender<Frame>;

/// A client as its room sees it: identity, display name, and outbox.
#[derive(Debug, Clone)]
pub struct Member {
    id: ClientId,
    name: String,
    outbox: Outbox,
}

impl Member {
    /// Creates a member entry.
    pub fn new(id: ClientId, name: impl Into<String>, outbox: Outbox) -> Self {
        Self {
            id,
            name: name.into(),
            outbox,
        }
    }

    /// The client's unique id.
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// The client's display name (may be empty).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn outbox(&self) -> &Outbox {
        &self.outbox
    }
}

#[derive(Debug, Default)]
pub(crate) struct Roster {
    members: Vec<Member>,
}

impl Roster {
    /// Appends a member. Returns `false` (and changes nothing) if a member
    /// with the same id is already present.
    pub(crate) fn insert(&mut self, member: Member) -> bool {
        if self.contains(member.id) {
            return false;
        }
        self.members.push(member);
        true
    }

    /// Removes the member with this id, returning the position it held.
    pub(crate) fn remove(&mut self, id: ClientId) -> Option<(usize, Member)> {
        let index = self.members.iter().position(|m| m.id == id)?;
        Some((index, self.members.remove(index)))
    }

    pub(crate) fn contains(&self, id: ClientId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Member> {
        self.members.get(index)
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: u64, name: &str) -> Member {
        Member::new(ClientId(id), name, mpsc::unbounded_channel().0)
    }

    fn ids(roster: &Roster) -> Vec<u64> {
        roster.iter().map(|m| m.id().0).collect()
    }

    #[test]
    fn test_insert_keeps_join_order() {
        let mut roster = Roster::default();
        assert!(roster.insert(member(3, "c")));
        assert!(roster.insert(member(1, "a")));
        assert!(roster.insert(member(2, "b")));
        assert_eq!(ids(&roster), vec![3, 1, 2]);
    }

    #[test]
    fn test_insert_rejects_duplicate_identity() {
        let mut roster = Roster::default();
        assert!(roster.insert(member(1, "Alice")));
        // Same id, even under another name, is the same client.
        assert!(!roster.insert(member(1, "Alice again")));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get(0).unwrap().name(), "Alice");
    }

    #[test]
    fn test_same_name_different_ids_are_distinct() {
        let mut roster = Roster::default();
        assert!(roster.insert(member(1, "Sam")));
        assert!(roster.insert(member(2, "Sam")));
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_remove_by_identity_reports_position() {
        let mut roster = Roster::default();
        roster.insert(member(1, "a"));
        roster.insert(member(2, "b"));
        roster.insert(member(3, "c"));

        let (index, removed) = roster.remove(ClientId(2)).unwrap();
        assert_eq!(index, 1);
        assert_eq!(removed.name(), "b");
        assert_eq!(ids(&roster), vec![1, 3]);
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let mut roster = Roster::default();
        roster.insert(member(1, "a"));
        assert!(roster.remove(ClientId(1)).is_some());
        assert!(roster.remove(ClientId(1)).is_none());
        assert_eq!(roster.len(), 0);
    }
}
