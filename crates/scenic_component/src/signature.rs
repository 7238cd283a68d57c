//! Component type ids and signature bitsets.
//!
//! A [`Signature`] records which component types an object currently owns, as
//! a fixed-capacity word-packed bitset indexed by [`ComponentId`]. Signatures
//! are also the keys of the query cache: a group matches every object whose
//! signature is a superset of the group's key.

/// Identifier for a registered component type.
///
/// Ids are assigned sequentially at registration time and double as bit
/// positions in a [`Signature`] and as column indices in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u16);

impl ComponentId {
    /// Returns the id as a table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Maximum number of component types registrable in one world.
pub const COMPONENT_CAP: usize = 256;

/// Number of `u64` words backing a [`Signature`].
pub const SIGNATURE_WORDS: usize = COMPONENT_CAP / 64;

/// Bitset over registered component type ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    words: [u64; SIGNATURE_WORDS],
}

impl Default for Signature {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Signature {
    /// The signature with no bits set.
    pub const EMPTY: Self = Self {
        words: [0; SIGNATURE_WORDS],
    };

    /// Sets the bit for `component`.
    #[inline]
    pub fn set(&mut self, component: ComponentId) {
        self.words[component.index() / 64] |= 1u64 << (component.index() % 64);
    }

    /// Clears the bit for `component`.
    #[inline]
    pub fn clear(&mut self, component: ComponentId) {
        self.words[component.index() / 64] &= !(1u64 << (component.index() % 64));
    }

    /// Returns `true` if the bit for `component` is set.
    #[inline]
    #[must_use]
    pub fn contains(&self, component: ComponentId) -> bool {
        (self.words[component.index() / 64] >> (component.index() % 64)) & 1 == 1
    }

    /// Returns `true` if every bit set in `other` is also set in `self`.
    #[inline]
    #[must_use]
    pub fn contains_all(&self, other: &Signature) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(mine, theirs)| mine & theirs == *theirs)
    }

    /// Returns `true` if no bit is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    /// Iterates over the component ids set in this signature, ascending.
    pub fn iter(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.words.iter().enumerate().flat_map(|(word_index, &word)| {
            let base = word_index * 64;
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let tz = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(ComponentId((base + tz) as u16))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_contains() {
        let mut sig = Signature::default();
        assert!(!sig.contains(ComponentId(3)));
        sig.set(ComponentId(3));
        sig.set(ComponentId(64));
        assert!(sig.contains(ComponentId(3)));
        assert!(sig.contains(ComponentId(64)));
        assert!(!sig.contains(ComponentId(4)));
    }

    #[test]
    fn test_clear() {
        let mut sig = Signature::default();
        sig.set(ComponentId(7));
        sig.clear(ComponentId(7));
        assert!(!sig.contains(ComponentId(7)));
        assert!(sig.is_empty());
    }

    #[test]
    fn test_contains_all_is_superset_test() {
        let mut key = Signature::default();
        key.set(ComponentId(1));
        key.set(ComponentId(2));

        let mut object = Signature::default();
        object.set(ComponentId(1));
        object.set(ComponentId(2));
        object.set(ComponentId(9));

        assert!(object.contains_all(&key));
        assert!(!key.contains_all(&object));
        // The empty signature is a subset of everything.
        assert!(key.contains_all(&Signature::EMPTY));
    }

    #[test]
    fn test_iter_yields_ascending_ids() {
        let mut sig = Signature::default();
        for id in [200u16, 0, 65, 63] {
            sig.set(ComponentId(id));
        }
        let ids: Vec<u16> = sig.iter().map(|id| id.0).collect();
        assert_eq!(ids, vec![0, 63, 65, 200]);
    }
}
