use indexmap::IndexMap;

use crate::state::ConnectionId;

/// Names currently held by participants, each remembering the connection that claimed it.
///
/// Insertion order is preserved so listings stay stable across snapshots.
#[derive(Debug, Default, Clone)]
pub struct ParticipantRegistry {
    names: IndexMap<String, ConnectionId>,
}

impl ParticipantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `name` for `owner`. Returns `false` when the name is already held.
    pub fn claim(&mut self, name: &str, owner: ConnectionId) -> bool {
        if self.names.contains_key(name) {
            return false;
        }
        self.names.insert(name.to_owned(), owner);
        true
    }

    /// Drop `name` from the registry; absent names are ignored.
    ///
    /// Returns whether the name was held before the call.
    pub fn release(&mut self, name: &str) -> bool {
        self.names.shift_remove(name).is_some()
    }

    /// Release every name still owned by `owner`, returning the freed names.
    pub fn release_owned_by(&mut self, owner: ConnectionId) -> Vec<String> {
        let owned: Vec<String> = self
            .names
            .iter()
            .filter(|(_, holder)| **holder == owner)
            .map(|(name, _)| name.clone())
            .collect();
        for name in &owned {
            self.names.shift_remove(name);
        }
        owned
    }

    /// Connection holding `name`, if claimed.
    pub fn owner(&self, name: &str) -> Option<ConnectionId> {
        self.names.get(name).copied()
    }

    /// Hand a claimed `name` over to `owner`. Returns `false` when the name is not claimed.
    pub fn transfer(&mut self, name: &str, owner: ConnectionId) -> bool {
        match self.names.get_mut(name) {
            Some(holder) => {
                *holder = owner;
                true
            }
            None => false,
        }
    }

    /// Whether `name` is currently claimed.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Remove every participant.
    pub fn clear(&mut self) {
        self.names.clear();
    }

    /// Claimed names in claim order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    /// Number of live participants.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when no name is claimed.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn second_claim_for_same_name_is_refused() {
        let mut registry = ParticipantRegistry::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        assert!(registry.claim("Red", first));
        assert!(!registry.claim("Red", second));
        assert!(!registry.claim("Red", first));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut registry = ParticipantRegistry::new();
        assert!(registry.claim("red", Uuid::new_v4()));
        assert!(registry.claim("Red", Uuid::new_v4()));
    }

    #[test]
    fn release_is_idempotent() {
        let mut registry = ParticipantRegistry::new();
        registry.claim("Blue", Uuid::new_v4());

        assert!(registry.release("Blue"));
        assert!(!registry.release("Blue"));
        assert!(!registry.release("Green"));
        assert!(registry.claim("Blue", Uuid::new_v4()));
    }

    #[test]
    fn release_owned_by_only_frees_that_connection() {
        let mut registry = ParticipantRegistry::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        registry.claim("Red", alice);
        registry.claim("Blue", bob);
        registry.claim("Green", alice);

        let freed = registry.release_owned_by(alice);
        assert_eq!(freed, vec!["Red".to_string(), "Green".to_string()]);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Blue"]);
    }

    #[test]
    fn owner_follows_transfer() {
        let mut registry = ParticipantRegistry::new();
        let stale = Uuid::new_v4();
        let fresh = Uuid::new_v4();
        registry.claim("Red", stale);
        assert_eq!(registry.owner("Red"), Some(stale));

        assert!(registry.transfer("Red", fresh));
        assert_eq!(registry.owner("Red"), Some(fresh));
        assert!(!registry.transfer("Blue", fresh));
        assert_eq!(registry.owner("Blue"), None);
    }

    #[test]
    fn reclaimed_name_survives_previous_owner_release() {
        let mut registry = ParticipantRegistry::new();
        let stale = Uuid::new_v4();
        let fresh = Uuid::new_v4();
        registry.claim("Red", stale);
        registry.clear();
        registry.claim("Red", fresh);

        assert!(registry.release_owned_by(stale).is_empty());
        assert!(registry.contains("Red"));
    }
}
