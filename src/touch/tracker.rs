use heapless::FnvIndexMap;
use log::warn;

use super::types::{ContactSnapshot, Point, TouchId};

// Power of two, required by FnvIndexMap. Only the first two contacts
// matter for classification; the rest are tracked so their end events
// reconcile the count.
const MAX_CONTACTS: usize = 8;

/// One tracked finger on the input surface. Presence in the tracker is
/// what makes a contact active; ended contacts are removed outright.
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    pub id: TouchId,
    pub position: Point,
    pub start_position: Point,
    pub start_ms: u64,
}

/// Active contact set keyed by touch id. Pure bookkeeping, no gesture
/// logic; malformed platform input (duplicate begin, unknown id on
/// move/end) is ignored rather than propagated.
pub struct ContactTracker {
    contacts: FnvIndexMap<TouchId, Contact, MAX_CONTACTS>,
}

impl Default for ContactTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactTracker {
    pub fn new() -> Self {
        Self {
            contacts: FnvIndexMap::new(),
        }
    }

    /// Inserts a new contact. Returns false without touching existing
    /// state on a duplicate begin; that signals a platform-level
    /// inconsistency, not something gesture logic should act on.
    pub fn begin(&mut self, id: TouchId, position: Point, now_ms: u64) -> bool {
        if self.contacts.contains_key(&id) {
            warn!("duplicate begin for touch {id}, keeping existing contact");
            return false;
        }
        let contact = Contact {
            id,
            position,
            start_position: position,
            start_ms: now_ms,
        };
        if self.contacts.insert(id, contact).is_err() {
            warn!("contact table full, dropping touch {id}");
            return false;
        }
        true
    }

    /// Updates the current position. Returns false for an unknown id;
    /// a move can race a begin that was dropped.
    pub fn move_to(&mut self, id: TouchId, position: Point) -> bool {
        match self.contacts.get_mut(&id) {
            Some(contact) => {
                contact.position = position;
                true
            }
            None => false,
        }
    }

    /// Records the final position and removes the contact. Returns false
    /// for an unknown id.
    pub fn end(&mut self, id: TouchId, position: Point) -> bool {
        if let Some(contact) = self.contacts.get_mut(&id) {
            contact.position = position;
        }
        self.contacts.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.len() == 0
    }

    pub fn get(&self, id: TouchId) -> Option<&Contact> {
        self.contacts.get(&id)
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
    }

    pub(crate) fn snapshot(&self) -> ContactSnapshot {
        let mut snapshot = ContactSnapshot {
            count: self.contacts.len().min(u8::MAX as usize) as u8,
            points: [Point::default(); 2],
        };
        for (slot, contact) in self.contacts.values().take(2).enumerate() {
            snapshot.points[slot] = contact.position;
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_records_start_and_current_position() {
        let mut tracker = ContactTracker::new();
        assert!(tracker.begin(1, Point::new(10.0, 20.0), 5));

        let contact = tracker.get(1).expect("contact missing");
        assert_eq!(contact.start_position, Point::new(10.0, 20.0));
        assert_eq!(contact.position, Point::new(10.0, 20.0));
        assert_eq!(contact.start_ms, 5);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn duplicate_begin_keeps_existing_contact() {
        let mut tracker = ContactTracker::new();
        assert!(tracker.begin(1, Point::new(10.0, 20.0), 5));
        assert!(!tracker.begin(1, Point::new(99.0, 99.0), 50));

        let contact = tracker.get(1).expect("contact missing");
        assert_eq!(contact.start_position, Point::new(10.0, 20.0));
        assert_eq!(contact.start_ms, 5);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn move_updates_only_current_position() {
        let mut tracker = ContactTracker::new();
        tracker.begin(1, Point::new(10.0, 20.0), 0);
        assert!(tracker.move_to(1, Point::new(30.0, 40.0)));

        let contact = tracker.get(1).expect("contact missing");
        assert_eq!(contact.position, Point::new(30.0, 40.0));
        assert_eq!(contact.start_position, Point::new(10.0, 20.0));
    }

    #[test]
    fn unknown_move_and_end_are_noops() {
        let mut tracker = ContactTracker::new();
        assert!(!tracker.move_to(7, Point::new(1.0, 1.0)));
        assert!(!tracker.end(7, Point::new(1.0, 1.0)));
        assert!(tracker.is_empty());
    }

    #[test]
    fn end_removes_the_contact() {
        let mut tracker = ContactTracker::new();
        tracker.begin(1, Point::new(0.0, 0.0), 0);
        assert!(tracker.end(1, Point::new(2.0, 3.0)));
        assert!(tracker.get(1).is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn snapshot_reports_first_two_contacts_in_insertion_order() {
        let mut tracker = ContactTracker::new();
        tracker.begin(3, Point::new(1.0, 1.0), 0);
        tracker.begin(1, Point::new(2.0, 2.0), 0);
        tracker.begin(2, Point::new(3.0, 3.0), 0);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.count, 3);
        assert_eq!(snapshot.points[0], Point::new(1.0, 1.0));
        assert_eq!(snapshot.points[1], Point::new(2.0, 2.0));
    }

    #[test]
    fn overflow_begin_is_dropped() {
        let mut tracker = ContactTracker::new();
        for id in 0..8 {
            assert!(tracker.begin(id, Point::default(), 0));
        }
        assert!(!tracker.begin(8, Point::default(), 0));
        assert_eq!(tracker.len(), 8);
    }
}
