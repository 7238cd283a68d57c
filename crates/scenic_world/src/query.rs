//! Incrementally-maintained query cache.
//!
//! Structural queries are cached as **groups**: one ordered member set per
//! requested signature, seeded by a full scan on first request and kept
//! current by [`QueryCache::on_created`] / [`QueryCache::on_destroyed`] in
//! O(existing groups) per object event. **Tags** are explicit string-keyed
//! member sets, independent of signatures; destroying an object removes it
//! from every tag set it belonged to.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use scenic_component::{Object, Signature};

/// One cached structural query result.
#[derive(Debug)]
struct Group {
    signature: Signature,
    members: BTreeSet<Object>,
}

/// All groups and tag sets of one world.
#[derive(Debug, Default)]
pub struct QueryCache {
    groups: Vec<Group>,
    by_signature: HashMap<Signature, usize>,
    tags: HashMap<String, BTreeSet<Object>>,
}

impl QueryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the member set for `signature`, seeding a new group from
    /// `live` on first request.
    pub fn group(
        &mut self,
        signature: Signature,
        live: impl Iterator<Item = (Object, Signature)>,
    ) -> &BTreeSet<Object> {
        if !self.by_signature.contains_key(&signature) {
            let mut members = BTreeSet::new();
            for (object, object_signature) in live {
                if object_signature.contains_all(&signature) {
                    members.insert(object);
                }
            }
            debug!(seeded = members.len(), "structural group created");
            self.by_signature.insert(signature, self.groups.len());
            self.groups.push(Group { signature, members });
        }
        &self.groups[self.by_signature[&signature]].members
    }

    /// Folds a newly created object into every matching group.
    pub fn on_created(&mut self, object: Object, signature: &Signature) {
        for group in &mut self.groups {
            if signature.contains_all(&group.signature) {
                group.members.insert(object);
            }
        }
    }

    /// Removes a destroyed object from every matching group and every tag set.
    pub fn on_destroyed(&mut self, object: Object, signature: &Signature) {
        for group in &mut self.groups {
            if signature.contains_all(&group.signature) {
                group.members.remove(&object);
            }
        }
        for members in self.tags.values_mut() {
            members.remove(&object);
        }
    }

    /// Adds `object` to the named tag set.
    pub fn add_tag(&mut self, object: Object, tag: impl Into<String>) {
        self.tags.entry(tag.into()).or_default().insert(object);
    }

    /// Removes `object` from the named tag set, if present.
    pub fn remove_tag(&mut self, object: Object, tag: &str) {
        if let Some(members) = self.tags.get_mut(tag) {
            members.remove(&object);
        }
    }

    /// Returns the member set for `tag`, if any object was ever tagged with it.
    #[must_use]
    pub fn tagged(&self, tag: &str) -> Option<&BTreeSet<Object>> {
        self.tags.get(tag)
    }

    /// Number of cached structural groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
