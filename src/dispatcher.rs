use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::{subscription::Subscribers, Action, Changes, Error, LogLevel, Registry};


/// Wraps every dispatch.
///
/// Middleware sees the action by shared reference and cannot change it.
/// Calling [`Next::run`] continues the chain; not calling it drops the action without reducing it.
pub trait Middleware<A> {
    fn handle(&self, action: &A, next: Next<'_, A>);
}

impl<A, F> Middleware<A> for F
where
    F: Fn(&A, Next<'_, A>),
{
    fn handle(&self, action: &A, next: Next<'_, A>) {
        self(action, next)
    }
}

type Outcome = RefCell<Option<Result<Changes, Error>>>;

/// The rest of the middleware chain, ending in the registry.
pub struct Next<'a, A> {
    chain: &'a [Rc<dyn Middleware<A>>],
    core: &'a dyn Fn(&A) -> Result<Changes, Error>,
    outcome: &'a Outcome,
}

impl<A> Next<'_, A> {
    /// Runs the inner middleware and the reducers, and returns what the innermost step produced.
    ///
    /// If an inner middleware stops the chain, returns empty `Changes`.
    pub fn run(self, action: &A) -> Result<Changes, Error> {
        match self.chain.split_first() {
            Some((first, rest)) => first.handle(
                action,
                Next {
                    chain: rest,
                    core: self.core,
                    outcome: self.outcome,
                },
            ),
            None => {
                let result = (self.core)(action);
                *self.outcome.borrow_mut() = Some(result);
            }
        }
        self.outcome
            .borrow()
            .clone()
            .unwrap_or_else(|| Ok(Changes::default()))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    Idle,
    Reducing,
    Notifying,
}

/// Single entry point for state transitions.
pub struct Dispatcher<A: 'static> {
    middlewares: Vec<Rc<dyn Middleware<A>>>,
    phase: Cell<Phase>,
    aborted: Cell<bool>,
}

impl<A: Action> Dispatcher<A> {
    pub fn new(middlewares: Vec<Rc<dyn Middleware<A>>>) -> Self {
        Self {
            middlewares,
            phase: Cell::new(Phase::Idle),
            aborted: Cell::new(false),
        }
    }

    pub fn is_dispatching(&self) -> bool {
        self.phase.get() != Phase::Idle
    }

    pub(crate) fn dispatch(
        &self,
        action: &A,
        registry: &Registry<A>,
        subscribers: &Subscribers,
    ) -> Result<Changes, Error> {
        match self.phase.get() {
            Phase::Idle => {}
            Phase::Reducing => {
                self.aborted.set(true);
                tracing::warn!(
                    action = action.name(),
                    "reentrant dispatch while reducing, aborting the outer dispatch"
                );
                return Err(Error::ReentrantDispatch);
            }
            Phase::Notifying => {
                tracing::warn!(
                    action = action.name(),
                    "reentrant dispatch while notifying subscribers"
                );
                return Err(Error::ReentrantDispatch);
            }
        }
        let _in_flight = InFlight::start(self);
        let core = |action: &A| {
            let staged = registry.reduce(action);
            if self.aborted.get() {
                return Err(Error::ReentrantDispatch);
            }
            let changes = registry.commit(staged);
            self.phase.set(Phase::Notifying);
            let notified = subscribers.notify(&changes, registry);
            tracing::trace!(
                action = action.name(),
                changed = changes.len(),
                notified,
                "dispatched"
            );
            Ok(changes)
        };
        let outcome = RefCell::new(None);
        let result = Next {
            chain: &self.middlewares,
            core: &core,
            outcome: &outcome,
        }
        .run(action);
        if self.aborted.get() {
            return Err(Error::ReentrantDispatch);
        }
        result
    }
}

struct InFlight<'a, A: 'static>(&'a Dispatcher<A>);

impl<'a, A: 'static> InFlight<'a, A> {
    fn start(dispatcher: &'a Dispatcher<A>) -> Self {
        dispatcher.phase.set(Phase::Reducing);
        dispatcher.aborted.set(false);
        Self(dispatcher)
    }
}
impl<A: 'static> Drop for InFlight<'_, A> {
    fn drop(&mut self) {
        self.0.phase.set(Phase::Idle);
        self.0.aborted.set(false);
    }
}

macro_rules! log_at {
    ($level:expr, $($arg:tt)*) => {
        match $level {
            LogLevel::Trace => tracing::trace!($($arg)*),
            LogLevel::Debug => tracing::debug!($($arg)*),
            LogLevel::Info => tracing::info!($($arg)*),
        }
    };
}

/// Logs every action and the stores it changed.
#[derive(Clone, Debug)]
pub struct LoggingMiddleware {
    label: String,
    level: LogLevel,
}

impl LoggingMiddleware {
    pub fn new(label: impl Into<String>, level: LogLevel) -> Self {
        Self {
            label: label.into(),
            level,
        }
    }
}

impl<A: Action> Middleware<A> for LoggingMiddleware {
    fn handle(&self, action: &A, next: Next<'_, A>) {
        log_at!(
            self.level,
            label = %self.label,
            action = action.name(),
            payload = ?action,
            "dispatch"
        );
        match next.run(action) {
            Ok(changes) => {
                let changed: Vec<_> = changes.names().collect();
                log_at!(
                    self.level,
                    label = %self.label,
                    action = action.name(),
                    ?changed,
                    "reduced"
                );
            }
            Err(e) => tracing::warn!(label = %self.label, action = action.name(), "{e}"),
        }
    }
}
