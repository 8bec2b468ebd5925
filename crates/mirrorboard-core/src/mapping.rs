// Mirrorboard Remap Table
// Symmetric key substitution used while the mirror layer is active

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::config::ConfigError;
use crate::Key;

/// A symmetric partial bijection between keys.
///
/// The table is authored as unordered pairs `{a, b}`. Looking up either side
/// yields the other. Keys that are in no pair have no entry and are never
/// substituted.
#[derive(Debug, Clone, Default)]
pub struct RemapTable {
    /// Authored direction, in authoring order
    forward: IndexMap<Key, Key>,
    /// Derived once at construction
    reverse: HashMap<Key, Key>,
}

impl RemapTable {
    /// Build a table from `(a, b)` pairs.
    ///
    /// Fails if a pair maps a key to itself or if any key appears in more
    /// than one pair, on either side.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (Key, Key)>,
    {
        let mut forward = IndexMap::new();
        let mut reverse = HashMap::new();

        for (a, b) in pairs {
            if a == b {
                return Err(ConfigError::SelfMapped(a));
            }
            for key in [a, b] {
                if forward.contains_key(&key) || reverse.contains_key(&key) {
                    return Err(ConfigError::DuplicateKey(key));
                }
            }
            forward.insert(a, b);
            reverse.insert(b, a);
        }

        Ok(Self { forward, reverse })
    }

    /// The key paired with `key`, if any
    pub fn substitute(&self, key: Key) -> Option<Key> {
        self.forward
            .get(&key)
            .or_else(|| self.reverse.get(&key))
            .copied()
    }

    /// Check if `key` takes part in any pair
    pub fn contains(&self, key: Key) -> bool {
        self.forward.contains_key(&key) || self.reverse.contains_key(&key)
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Pairs in authoring order
    pub fn pairs(&self) -> impl Iterator<Item = (Key, Key)> + '_ {
        self.forward.iter().map(|(a, b)| (*a, *b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIRROR_LAYOUT;

    #[test]
    fn test_substitute_is_symmetric() {
        let table = RemapTable::from_pairs(MIRROR_LAYOUT.iter().copied()).unwrap();
        for &(a, b) in MIRROR_LAYOUT {
            assert_eq!(table.substitute(a), Some(b), "{} -> {}", a, b);
            assert_eq!(table.substitute(b), Some(a), "{} -> {}", b, a);
        }
    }

    #[test]
    fn test_unmapped_key_has_no_entry() {
        let table = RemapTable::from_pairs([(Key::Q, Key::P)]).unwrap();
        assert_eq!(table.substitute(Key::SPACE), None);
        assert!(!table.contains(Key::SPACE));
        assert!(table.contains(Key::Q));
        assert!(table.contains(Key::P));
    }

    #[test]
    fn test_rejects_self_mapping() {
        let err = RemapTable::from_pairs([(Key::A, Key::A)]).unwrap_err();
        assert!(matches!(err, ConfigError::SelfMapped(Key::A)));
    }

    #[test]
    fn test_rejects_key_in_two_pairs() {
        // Same source twice
        let err = RemapTable::from_pairs([(Key::Q, Key::P), (Key::Q, Key::O)]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateKey(Key::Q)));

        // Target reused as a source
        let err = RemapTable::from_pairs([(Key::Q, Key::P), (Key::P, Key::W)]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateKey(Key::P)));

        // Pair repeated in the other direction
        let err = RemapTable::from_pairs([(Key::Q, Key::P), (Key::P, Key::Q)]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateKey(Key::P)));
    }

    #[test]
    fn test_pairs_keep_authoring_order() {
        let table =
            RemapTable::from_pairs([(Key::T, Key::Y), (Key::A, Key::SEMICOLON)]).unwrap();
        let pairs: Vec<_> = table.pairs().collect();
        assert_eq!(pairs, vec![(Key::T, Key::Y), (Key::A, Key::SEMICOLON)]);
        assert_eq!(table.len(), 2);
    }
}
