use std::{any::Any, cell::RefCell, rc::Rc};

use crate::{Action, Dispatch, Hookstores};


thread_local! {
    static PROVIDERS: RefCell<Vec<Rc<dyn Any>>> = const { RefCell::new(Vec::new()) };
}

pub(crate) fn provide<A: Action, T>(hookstores: Hookstores<A>, f: impl FnOnce() -> T) -> T {
    PROVIDERS.with(|p| p.borrow_mut().push(Rc::new(hookstores)));
    let _pop = PopOnDrop;
    f()
}

struct PopOnDrop;

impl Drop for PopOnDrop {
    fn drop(&mut self) {
        let _ = PROVIDERS.try_with(|p| p.borrow_mut().pop());
    }
}

/// Returns the innermost [`Hookstores<A>`] provided on the current thread by
/// [`Hookstores::provide`].
///
/// Providers for other action types are skipped, so independent apps can be nested.
pub fn use_hookstores<A: Action>() -> Option<Hookstores<A>> {
    PROVIDERS.with(|p| {
        p.borrow()
            .iter()
            .rev()
            .find_map(|h| (**h).downcast_ref::<Hookstores<A>>().cloned())
    })
}

/// Returns a dispatch handle to the innermost provider for `A`.
pub fn use_dispatch<A: Action>() -> Option<Dispatch<A>> {
    use_hookstores::<A>().map(|h| h.dispatcher())
}
