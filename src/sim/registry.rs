//! Named object registry
//!
//! Objects live in a generational arena; names map to [`ObjectId`]s. The
//! registry owns every object, callers only borrow.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::arena::{Arena, Index};
use super::object::PhysicsObject;
use crate::error::WorldError;

/// Stable identifier of a registered object
///
/// Survives unrelated inserts and removals; once its object is removed
/// (or the world is reset) it never resolves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(Index);

impl ObjectId {
    /// Packed into a rapier `user_data` slot: generation high, slot low
    pub(crate) fn to_user_data(self) -> u128 {
        (u128::from(self.0.generation()) << 32) | u128::from(self.0.slot())
    }

    pub(crate) fn from_user_data(data: u128) -> Self {
        ObjectId(Index::from_parts(data as u32, (data >> 32) as u32))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    object: PhysicsObject,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectRegistry {
    entries: Arena<Entry>,
    names: HashMap<String, ObjectId>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `object` under `name`; an existing entry is never replaced
    pub fn insert(&mut self, name: &str, object: PhysicsObject) -> Result<ObjectId, WorldError> {
        if self.names.contains_key(name) {
            return Err(WorldError::DuplicateName(name.to_string()));
        }
        let id = ObjectId(self.entries.insert(Entry {
            name: name.to_string(),
            object,
        }));
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn find(&self, name: &str) -> Option<&PhysicsObject> {
        self.get(*self.names.get(name)?)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut PhysicsObject> {
        let id = *self.names.get(name)?;
        self.get_mut(id)
    }

    pub fn id_of(&self, name: &str) -> Option<ObjectId> {
        self.names.get(name).copied()
    }

    pub fn get(&self, id: ObjectId) -> Option<&PhysicsObject> {
        self.entries.get(id.0).map(|entry| &entry.object)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut PhysicsObject> {
        self.entries.get_mut(id.0).map(|entry| &mut entry.object)
    }

    pub fn name_of(&self, id: ObjectId) -> Option<&str> {
        self.entries.get(id.0).map(|entry| entry.name.as_str())
    }

    /// Detach the named object and hand ownership back
    pub fn remove(&mut self, name: &str) -> Option<PhysicsObject> {
        let id = self.names.remove(name)?;
        self.entries.remove(id.0).map(|entry| entry.object)
    }

    /// Every entry; call again to restart
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PhysicsObject)> + '_ {
        self.entries
            .iter()
            .map(|(_, entry)| (entry.name.as_str(), &entry.object))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut PhysicsObject)> + '_ {
        self.entries
            .iter_mut()
            .map(|(_, entry)| (entry.name.as_str(), &mut entry.object))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry; ids handed out so far stop resolving
    pub fn clear(&mut self) {
        self.entries.clear();
        self.names.clear();
    }
}
