use std::collections::BTreeSet;

use crate::event::ViewKey;

/// Keys currently held down, as seen by the last drained key transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldKeys {
    held: BTreeSet<ViewKey>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transition. Returns true if the held state changed.
    pub fn apply(&mut self, key: ViewKey, pressed: bool) -> bool {
        if pressed {
            self.held.insert(key)
        } else {
            self.held.remove(&key)
        }
    }

    pub fn is_held(&self, key: ViewKey) -> bool {
        self.held.contains(&key)
    }

    /// Forget every held key.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

impl FromIterator<ViewKey> for HeldKeys {
    fn from_iter<I: IntoIterator<Item = ViewKey>>(iter: I) -> Self {
        Self {
            held: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_then_release() {
        let mut keys = HeldKeys::new();
        assert!(keys.apply(ViewKey::Forward, true));
        assert!(keys.is_held(ViewKey::Forward));
        assert!(keys.apply(ViewKey::Forward, false));
        assert!(!keys.is_held(ViewKey::Forward));
        assert!(keys.is_empty());
    }

    #[test]
    fn repeated_press_is_not_a_change() {
        let mut keys = HeldKeys::new();
        keys.apply(ViewKey::Left, true);
        assert!(!keys.apply(ViewKey::Left, true));
    }

    #[test]
    fn release_of_unheld_key_is_not_a_change() {
        let mut keys = HeldKeys::new();
        assert!(!keys.apply(ViewKey::Right, false));
    }

    #[test]
    fn clear_releases_everything() {
        let mut keys: HeldKeys = [ViewKey::Forward, ViewKey::Left].into_iter().collect();
        keys.clear();
        assert!(keys.is_empty());
        assert!(!keys.apply(ViewKey::Forward, false));
    }

    #[test]
    fn collect_from_iterator() {
        let keys: HeldKeys = ViewKey::MOVEMENT.into_iter().collect();
        for key in ViewKey::MOVEMENT {
            assert!(keys.is_held(key));
        }
        assert!(!keys.is_held(ViewKey::Close));
    }
}
