//! Named stores, reducers and selector subscriptions for UI components.
//!
//! Every dispatched action goes through the middleware chain to the reducer of every store.
//! Subscribers recompute their projection of the stores that changed and are notified only
//! when that projection differs from the previous one.
//!
//! ```
//! use std::rc::Rc;
//! use hookstores::{Action, Hookstores, StoreDescription};
//!
//! #[derive(Debug)]
//! enum CounterAction {
//!     Inc,
//! }
//! impl Action for CounterAction {
//!     fn name(&self) -> &'static str {
//!         "INC"
//!     }
//! }
//!
//! #[derive(PartialEq, Debug)]
//! struct Counter {
//!     n: u32,
//! }
//!
//! let hs = Hookstores::builder()
//!     .store(StoreDescription::new("counter", Counter { n: 0 }, |s, a: &CounterAction| match a {
//!         CounterAction::Inc => Rc::new(Counter { n: s.n + 1 }),
//!     }))
//!     .build()?;
//! let counter = hs.use_store("counter", |s: &Counter| s.n)?;
//! hs.dispatch(CounterAction::Inc)?;
//! assert_eq!(counter.get(), 1);
//! # Ok::<(), hookstores::Error>(())
//! ```
mod action;
mod config;
mod context;
mod dispatcher;
mod error;
mod provider;
mod registry;
mod store;
mod subscription;

#[cfg(test)]
mod test_helpers;

pub use action::*;
pub use config::*;
pub use context::{use_dispatch, use_hookstores};
pub use dispatcher::*;
pub use error::*;
pub use provider::*;
pub use registry::*;
pub use store::{StoreDescription, StoreKey, StoreRef};
pub use subscription::Subscription;
