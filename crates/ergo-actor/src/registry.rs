//! Ordered set of distinct actors.

use crate::Actor;
use log::info;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("actor '{0}' is already registered")]
    DuplicateActor(String),

    #[error("actor '{0}' is not registered")]
    ActorNotFound(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Actors in registration order. Identity is the `Arc` allocation, so two
/// equal-valued but separately allocated actors are distinct.
///
/// `keys` holds the allocation address of every entry in `actors`, which
/// keeps `register` and `contains` O(1). The registry owns a strong
/// reference to each actor, so an address cannot be reused while registered.
#[derive(Clone, Default)]
pub struct ActorRegistry {
    actors: Vec<Arc<dyn Actor>>,
    keys: HashSet<usize>,
}

#[inline]
fn key(actor: &Arc<dyn Actor>) -> usize {
    Arc::as_ptr(actor) as *const () as usize
}

impl ActorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an actor. Fails if this instance is already registered.
    pub fn register(&mut self, actor: Arc<dyn Actor>) -> Result<()> {
        if !self.keys.insert(key(&actor)) {
            return Err(RegistryError::DuplicateActor(actor.name().to_string()));
        }
        info!("registered actor '{}'", actor.name());
        self.actors.push(actor);
        Ok(())
    }

    /// Remove an actor and hand it back.
    ///
    /// Removing an actor that is not registered is an error and leaves the
    /// registry unchanged.
    pub fn unregister(&mut self, actor: &Arc<dyn Actor>) -> Result<Arc<dyn Actor>> {
        let k = key(actor);
        if !self.keys.remove(&k) {
            return Err(RegistryError::ActorNotFound(actor.name().to_string()));
        }
        // order must be kept, so the Vec entry is found by scan
        let idx = self
            .actors
            .iter()
            .position(|a| key(a) == k)
            .ok_or_else(|| RegistryError::ActorNotFound(actor.name().to_string()))?;
        info!("unregistered actor '{}'", actor.name());
        Ok(self.actors.remove(idx))
    }

    /// True if this instance is registered.
    pub fn contains(&self, actor: &Arc<dyn Actor>) -> bool {
        self.keys.contains(&key(actor))
    }

    /// Traversal in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Actor>> + '_ {
        self.actors.iter()
    }

    /// Number of registered actors.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Remove every actor.
    pub fn clear(&mut self) {
        self.actors.clear();
        self.keys.clear();
    }
}

impl<'a> IntoIterator for &'a ActorRegistry {
    type Item = &'a Arc<dyn Actor>;
    type IntoIter = std::slice::Iter<'a, Arc<dyn Actor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.actors.iter()
    }
}

impl std::fmt::Debug for ActorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.actors.iter().map(|a| a.name()))
            .finish()
    }
}
