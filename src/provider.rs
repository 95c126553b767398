use std::{
    cell::{Cell, Ref, RefCell},
    rc::{Rc, Weak},
};

use derive_ex::derive_ex;

use crate::{
    context,
    subscription::{projection, Subscribers},
    Action, Changes, Config, Dispatcher, Error, LoggingMiddleware, Middleware, Registry,
    StoreDescription, StoreKey, StoreRef, Subscription,
};


/// Stores, dispatcher and subscriptions shared by a tree of components.
///
/// Cloning is cheap; all clones refer to the same stores.
#[derive_ex(Clone, bound())]
pub struct Hookstores<A: 'static>(Rc<Inner<A>>);

struct Inner<A: 'static> {
    config: Config,
    registry: Registry<A>,
    dispatcher: Dispatcher<A>,
    subscribers: Rc<Subscribers>,
}

impl<A: Action> Hookstores<A> {
    pub fn builder() -> HookstoresBuilder<A> {
        HookstoresBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.0.config
    }
    pub fn registry(&self) -> &Registry<A> {
        &self.0.registry
    }

    /// Adds a store after construction.
    ///
    /// A store registered from inside a reducer does not receive the action being dispatched.
    pub fn register<S: PartialEq + 'static>(
        &self,
        description: StoreDescription<S, A>,
    ) -> Result<StoreKey<S>, Error> {
        self.0.registry.register(description)
    }

    pub fn key<S: 'static>(&self, name: &str) -> Result<StoreKey<S>, Error> {
        self.0.registry.key(name)
    }

    pub fn state<S: 'static>(&self, store: impl StoreRef<S>) -> Result<Rc<S>, Error> {
        self.0.registry.state(store)
    }

    /// Sends `action` through the middleware to every store, then notifies the subscribers of
    /// the stores that changed.
    ///
    /// Fails with [`Error::ReentrantDispatch`] if called while another dispatch is in flight.
    /// When that happens inside a reducer or a middleware, the outer dispatch fails too and
    /// no store is changed.
    pub fn dispatch(&self, action: A) -> Result<Changes, Error> {
        let inner = &*self.0;
        inner
            .dispatcher
            .dispatch(&action, &inner.registry, &inner.subscribers)
    }

    /// Returns a handle that dispatches to this instance without keeping it alive.
    pub fn dispatcher(&self) -> Dispatch<A> {
        Dispatch(Rc::downgrade(&self.0))
    }

    pub fn is_dispatching(&self) -> bool {
        self.0.dispatcher.is_dispatching()
    }

    /// Calls `on_change` each time the projection of the store through `selector` changes.
    ///
    /// The projection is taken once at subscribe time without calling `on_change`.
    pub fn subscribe<S: 'static, T: PartialEq + 'static>(
        &self,
        store: impl StoreRef<S>,
        selector: impl Fn(&S) -> T + 'static,
        on_change: impl FnMut(&T) + 'static,
    ) -> Result<Subscription, Error> {
        let (key, initial) = self.select(store, &selector)?;
        Ok(self.subscribe_key(&key, initial, selector, on_change))
    }

    /// Same as [`subscribe`](Self::subscribe), with `props` passed to every call of `selector`.
    pub fn subscribe_with_props<S: 'static, P: 'static, T: PartialEq + 'static>(
        &self,
        store: impl StoreRef<S>,
        props: P,
        selector: impl Fn(&S, &P) -> T + 'static,
        on_change: impl FnMut(&T) + 'static,
    ) -> Result<Subscription, Error> {
        self.subscribe::<S, T>(store, move |s| selector(s, &props), on_change)
    }

    /// Subscribes the way a component does on mount: the returned hook holds the live projection.
    pub fn use_store<S: 'static, T: PartialEq + Clone + 'static>(
        &self,
        store: impl StoreRef<S>,
        selector: impl Fn(&S) -> T + 'static,
    ) -> Result<StoreHook<T>, Error> {
        let (key, initial) = self.select(store, &selector)?;
        let value = Rc::new(RefCell::new(initial.clone()));
        let renders = Rc::new(Cell::new(0));
        let subscription = self.subscribe_key(&key, initial, selector, {
            let value = value.clone();
            let renders = renders.clone();
            move |v: &T| {
                *value.borrow_mut() = v.clone();
                renders.set(renders.get() + 1);
            }
        });
        Ok(StoreHook {
            value,
            renders,
            _subscription: subscription,
        })
    }

    pub fn use_store_with_props<S: 'static, P: 'static, T: PartialEq + Clone + 'static>(
        &self,
        store: impl StoreRef<S>,
        props: P,
        selector: impl Fn(&S, &P) -> T + 'static,
    ) -> Result<StoreHook<T>, Error> {
        self.use_store::<S, T>(store, move |s| selector(s, &props))
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.0.subscribers.len()
    }

    /// Runs `f` with this instance as the innermost provider of the current thread.
    ///
    /// See [`use_hookstores`](crate::use_hookstores).
    pub fn provide<T>(&self, f: impl FnOnce() -> T) -> T {
        context::provide(self.clone(), f)
    }

    fn select<S: 'static, T>(
        &self,
        store: impl StoreRef<S>,
        selector: &impl Fn(&S) -> T,
    ) -> Result<(StoreKey<S>, T), Error> {
        let key = store.resolve(&self.0.registry)?;
        let state = self.0.registry.state(&key)?;
        Ok((key, selector(&*state)))
    }

    fn subscribe_key<S: 'static, T: PartialEq + 'static>(
        &self,
        key: &StoreKey<S>,
        initial: T,
        selector: impl Fn(&S) -> T + 'static,
        on_change: impl FnMut(&T) + 'static,
    ) -> Subscription {
        self.0.subscribers.insert(
            key.index,
            key.name.clone(),
            projection(initial, selector, on_change),
        )
    }
}

impl<A: Action> std::fmt::Debug for Hookstores<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hookstores")
            .field("label", &self.0.config.label)
            .field("stores", &self.0.registry)
            .field("subscribers", &self.0.subscribers.len())
            .finish()
    }
}

type Registration<A> = Box<dyn FnOnce(&Registry<A>) -> Result<(), Error>>;

/// Builds a [`Hookstores`] from store descriptions and middleware.
pub struct HookstoresBuilder<A: 'static> {
    config: Config,
    stores: Vec<Registration<A>>,
    middlewares: Vec<Rc<dyn Middleware<A>>>,
}

impl<A: Action> HookstoresBuilder<A> {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            stores: Vec::new(),
            middlewares: Vec::new(),
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn store<S: PartialEq + 'static>(mut self, description: StoreDescription<S, A>) -> Self {
        self.stores.push(Box::new(move |registry: &Registry<A>| {
            registry.register(description).map(|_| ())
        }));
        self
    }

    /// Appends a middleware. The first one added runs outermost.
    pub fn middleware(mut self, middleware: impl Middleware<A> + 'static) -> Self {
        self.middlewares.push(Rc::new(middleware));
        self
    }

    /// Registers every store in the order they were added.
    ///
    /// Fails with [`Error::DuplicateStore`] if two descriptions share a name.
    pub fn build(self) -> Result<Hookstores<A>, Error> {
        let Self {
            config,
            stores,
            mut middlewares,
        } = self;
        let registry = Registry::new();
        for register in stores {
            register(&registry)?;
        }
        if config.log_actions {
            middlewares.insert(
                0,
                Rc::new(LoggingMiddleware::new(&config.label, config.log_level)),
            );
        }
        tracing::debug!(
            label = %config.label,
            stores = registry.len(),
            middlewares = middlewares.len(),
            "built hookstores"
        );
        Ok(Hookstores(Rc::new(Inner {
            config,
            registry,
            dispatcher: Dispatcher::new(middlewares),
            subscribers: Rc::new(Subscribers::new()),
        })))
    }
}

impl<A: Action> Default for HookstoresBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Weak dispatch handle, as returned by [`use_dispatch`](crate::use_dispatch).
#[derive_ex(Clone, bound())]
pub struct Dispatch<A: 'static>(Weak<Inner<A>>);

impl<A: Action> Dispatch<A> {
    /// Fails with [`Error::Detached`] once every [`Hookstores`] clone is dropped.
    pub fn dispatch(&self, action: A) -> Result<Changes, Error> {
        match self.0.upgrade() {
            Some(inner) => Hookstores(inner).dispatch(action),
            None => {
                tracing::warn!(action = action.name(), "dispatch through a detached handle");
                Err(Error::Detached)
            }
        }
    }
}

impl<A: 'static> std::fmt::Debug for Dispatch<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Dispatch")
    }
}

/// A mounted component's view of a store.
///
/// Dropping the hook unmounts it.
pub struct StoreHook<T> {
    value: Rc<RefCell<T>>,
    renders: Rc<Cell<usize>>,
    _subscription: Subscription,
}

impl<T> StoreHook<T> {
    pub fn borrow(&self) -> Ref<'_, T> {
        self.value.borrow()
    }
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }

    /// Number of times the projection changed since the hook was created.
    pub fn renders(&self) -> usize {
        self.renders.get()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for StoreHook<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value.try_borrow() {
            Ok(value) => std::fmt::Debug::fmt(&*value, f),
            Err(_) => write!(f, "<borrowed>"),
        }
    }
}
