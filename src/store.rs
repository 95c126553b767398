use std::{
    any::{type_name, Any, TypeId},
    cell::RefCell,
    fmt,
    marker::PhantomData,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use derive_ex::derive_ex;

use crate::{Error, Registry};

#[cfg(test)]
mod tests;

type Reducer<S, A> = Box<dyn Fn(&Rc<S>, &A) -> Rc<S>>;

/// Static description of a store: its name, its initial state and its reducer.
///
/// Descriptions are handed to [`HookstoresBuilder::store`](crate::HookstoresBuilder::store)
/// or [`Registry::register`].
pub struct StoreDescription<S, A> {
    name: String,
    initial: S,
    reducer: Reducer<S, A>,
}

impl<S: PartialEq + 'static, A: 'static> StoreDescription<S, A> {
    /// Creates a description from a reducer that returns the next state.
    ///
    /// Returning the same `Rc` (for example `state.clone()`) or an equal value leaves the store unchanged.
    pub fn new(
        name: impl Into<String>,
        initial: S,
        reducer: impl Fn(&Rc<S>, &A) -> Rc<S> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            initial,
            reducer: Box::new(reducer),
        }
    }

    /// Creates a description from a reducer that returns `Some` only for the actions it handles.
    pub fn from_update(
        name: impl Into<String>,
        initial: S,
        update: impl Fn(&S, &A) -> Option<S> + 'static,
    ) -> Self {
        Self::new(name, initial, move |state, action| match update(&**state, action) {
            Some(next) => Rc::new(next),
            None => state.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_node(self) -> Rc<StoreNode<S, A>> {
        Rc::new(StoreNode {
            name: self.name.into(),
            state: RefCell::new(Rc::new(self.initial)),
            reducer: self.reducer,
        })
    }
}

impl<S: fmt::Debug, A> fmt::Debug for StoreDescription<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreDescription")
            .field("name", &self.name)
            .field("initial", &self.initial)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct RegistryId(u64);

impl RegistryId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Typed handle to a store registered in a [`Registry`].
#[derive_ex(Clone, bound())]
pub struct StoreKey<S> {
    pub(crate) registry: RegistryId,
    pub(crate) index: usize,
    pub(crate) name: Rc<str>,
    _phantom: PhantomData<fn() -> S>,
}

impl<S> StoreKey<S> {
    pub(crate) fn new(registry: RegistryId, index: usize, name: Rc<str>) -> Self {
        Self {
            registry,
            index,
            name,
            _phantom: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<S> fmt::Debug for StoreKey<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreKey({}: {})", self.name, type_name::<S>())
    }
}

/// Something that identifies a store holding an `S`: a [`StoreKey<S>`] or a store name.
pub trait StoreRef<S> {
    fn resolve<A: 'static>(&self, registry: &Registry<A>) -> Result<StoreKey<S>, Error>;
}

impl<S: 'static> StoreRef<S> for StoreKey<S> {
    fn resolve<A: 'static>(&self, registry: &Registry<A>) -> Result<StoreKey<S>, Error> {
        registry.check_key(self)?;
        Ok(self.clone())
    }
}

impl<S: 'static> StoreRef<S> for str {
    fn resolve<A: 'static>(&self, registry: &Registry<A>) -> Result<StoreKey<S>, Error> {
        registry.key(self)
    }
}

impl<S: 'static> StoreRef<S> for String {
    fn resolve<A: 'static>(&self, registry: &Registry<A>) -> Result<StoreKey<S>, Error> {
        registry.key(self)
    }
}

impl<S, T: StoreRef<S> + ?Sized> StoreRef<S> for &T {
    fn resolve<A: 'static>(&self, registry: &Registry<A>) -> Result<StoreKey<S>, Error> {
        T::resolve(*self, registry)
    }
}

/// Type-erased view of a store, as seen by the registry and the dispatcher.
pub(crate) trait DynStore<A> {
    fn name(&self) -> &Rc<str>;
    fn state_type(&self) -> TypeId;
    fn state(&self) -> Rc<dyn Any>;

    /// Runs the reducer against the current state without committing.
    ///
    /// Returns `None` if the reducer left the state unchanged.
    fn reduce(&self, action: &A) -> Option<Rc<dyn Any>>;
    fn commit(&self, state: Rc<dyn Any>);
}

pub(crate) struct StoreNode<S: 'static, A: 'static> {
    name: Rc<str>,
    state: RefCell<Rc<S>>,
    reducer: Reducer<S, A>,
}

impl<S: PartialEq + 'static, A: 'static> DynStore<A> for StoreNode<S, A> {
    fn name(&self) -> &Rc<str> {
        &self.name
    }
    fn state_type(&self) -> TypeId {
        TypeId::of::<S>()
    }
    fn state(&self) -> Rc<dyn Any> {
        self.state.borrow().clone()
    }

    fn reduce(&self, action: &A) -> Option<Rc<dyn Any>> {
        // The borrow is released before the reducer runs so that it may read other stores.
        let current = self.state.borrow().clone();
        let next = (self.reducer)(&current, action);
        if Rc::ptr_eq(&current, &next) || *current == *next {
            None
        } else {
            Some(next)
        }
    }
    fn commit(&self, state: Rc<dyn Any>) {
        if let Ok(state) = state.downcast::<S>() {
            *self.state.borrow_mut() = state;
        }
    }
}
