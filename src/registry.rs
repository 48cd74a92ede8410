//! Arena registries for declared entities
//!
//! Every declared entity gets a stable integer handle when it is parsed.
//! Cross references (a light's channel outputs, its main light, its
//! global) are resolved by looking the id up once and then going through
//! the handle into the owning table.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use crate::config::{GlobalEntry, OutputEntry};
use crate::error::{ConfigError, ConfigResult};

/// Anything with a document-unique id
pub trait Identified {
    const KIND: &'static str;

    fn id(&self) -> &str;
}

impl Identified for OutputEntry {
    const KIND: &'static str = "output";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for GlobalEntry {
    const KIND: &'static str = "global";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Typed index into a `Registry<T>`
pub struct Handle<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }
}

// Manual impls: derives would require T: Clone/Eq/...
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> std::hash::Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.index)
    }
}

/// Owning table of entities of one kind, addressable by handle or id
#[derive(Debug)]
pub struct Registry<T> {
    items: Vec<T>,
    by_id: HashMap<String, usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            by_id: HashMap::new(),
        }
    }
}

impl<T: Identified> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity; ids must be unique within the registry
    pub fn insert(&mut self, item: T) -> ConfigResult<Handle<T>> {
        if self.by_id.contains_key(item.id()) {
            return Err(ConfigError::DuplicateId {
                kind: T::KIND,
                id: item.id().to_string(),
            });
        }
        let index = self.items.len();
        self.by_id.insert(item.id().to_string(), index);
        self.items.push(item);
        Ok(Handle::new(index))
    }

    pub fn lookup(&self, id: &str) -> Option<Handle<T>> {
        self.by_id.get(id).map(|&index| Handle::new(index))
    }

    /// Resolve an id, failing with `UnknownReference` naming the referrer
    pub fn resolve(&self, id: &str, referrer: &str) -> ConfigResult<Handle<T>> {
        self.lookup(id).ok_or_else(|| ConfigError::UnknownReference {
            kind: T::KIND,
            id: id.to_string(),
            referrer: referrer.to_string(),
        })
    }
}

impl<T> Registry<T> {
    pub fn get(&self, handle: Handle<T>) -> &T {
        &self.items[handle.index]
    }

    /// Entities in registration order
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| (Handle::new(index), item))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
