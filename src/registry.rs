use std::{
    any::{type_name, Any, TypeId},
    cell::RefCell,
    collections::HashMap,
    rc::Rc,
};

use crate::{
    store::{DynStore, RegistryId},
    Error, StoreDescription, StoreKey, StoreRef,
};


/// Named stores and their current states.
///
/// Stores are reduced in registration order.
/// State is only ever replaced through [`apply_action`](Self::apply_action) or a dispatch.
pub struct Registry<A: 'static> {
    id: RegistryId,
    stores: RefCell<Vec<Rc<dyn DynStore<A>>>>,
    names: RefCell<HashMap<Rc<str>, usize>>,
}

impl<A: 'static> Registry<A> {
    pub fn new() -> Self {
        Self {
            id: RegistryId::next(),
            stores: RefCell::new(Vec::new()),
            names: RefCell::new(HashMap::new()),
        }
    }

    /// Adds a store.
    ///
    /// Fails with [`Error::DuplicateStore`] if a store with the same name exists.
    pub fn register<S: PartialEq + 'static>(
        &self,
        description: StoreDescription<S, A>,
    ) -> Result<StoreKey<S>, Error> {
        let mut names = self.names.borrow_mut();
        if names.contains_key(description.name()) {
            return Err(Error::DuplicateStore {
                name: description.name().to_owned(),
            });
        }
        let node = description.into_node();
        let name = node.name().clone();
        let mut stores = self.stores.borrow_mut();
        let index = stores.len();
        stores.push(node);
        names.insert(name.clone(), index);
        tracing::trace!(store = &*name, index, "registered store");
        Ok(StoreKey::new(self.id, index, name))
    }

    /// Returns the key of the store named `name`.
    pub fn key<S: 'static>(&self, name: &str) -> Result<StoreKey<S>, Error> {
        let index = *self
            .names
            .borrow()
            .get(name)
            .ok_or_else(|| Error::unknown_store(name))?;
        let store = self.store(index);
        if store.state_type() != TypeId::of::<S>() {
            return Err(Error::StoreType {
                name: name.to_owned(),
                expected: type_name::<S>(),
            });
        }
        Ok(StoreKey::new(self.id, index, store.name().clone()))
    }

    pub(crate) fn check_key<S>(&self, key: &StoreKey<S>) -> Result<(), Error> {
        if key.registry != self.id || key.index >= self.len() {
            return Err(Error::unknown_store(&key.name));
        }
        Ok(())
    }

    /// Returns the current state of a store.
    pub fn state<S: 'static>(&self, store: impl StoreRef<S>) -> Result<Rc<S>, Error> {
        let key = store.resolve(self)?;
        let store = self.store(key.index);
        store.state().downcast::<S>().map_err(|_| Error::StoreType {
            name: key.name.to_string(),
            expected: type_name::<S>(),
        })
    }

    /// Reduces every store with `action` and commits the ones that changed.
    pub fn apply_action(&self, action: &A) -> Changes {
        let staged = self.reduce(action);
        self.commit(staged)
    }

    pub(crate) fn reduce(&self, action: &A) -> Staged<A> {
        let stores = self.stores.borrow().clone();
        let mut items = Vec::new();
        for (index, store) in stores.into_iter().enumerate() {
            if let Some(state) = store.reduce(action) {
                items.push((index, store, state));
            }
        }
        Staged(items)
    }

    pub(crate) fn commit(&self, staged: Staged<A>) -> Changes {
        let mut changes = Changes::default();
        for (index, store, state) in staged.0 {
            store.commit(state);
            changes.0.push((index, store.name().clone()));
        }
        changes
    }

    pub(crate) fn state_any(&self, index: usize) -> Rc<dyn Any> {
        self.store(index).state()
    }

    fn store(&self, index: usize) -> Rc<dyn DynStore<A>> {
        self.stores.borrow()[index].clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.borrow().contains_key(name)
    }
    pub fn len(&self) -> usize {
        self.stores.borrow().len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.stores
            .borrow()
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }
}

impl<A: 'static> Default for Registry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> std::fmt::Debug for Registry<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Reduced states that have not been committed yet.
pub(crate) struct Staged<A: 'static>(Vec<(usize, Rc<dyn DynStore<A>>, Rc<dyn Any>)>);

/// The stores whose state was replaced by one dispatch.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Changes(Vec<(usize, Rc<str>)>);

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(_, n)| &**n == name)
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, n)| &**n)
    }
    pub(crate) fn contains_index(&self, index: usize) -> bool {
        self.0.iter().any(|(i, _)| *i == index)
    }
}
