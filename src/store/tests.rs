use std::rc::Rc;

use crate::{
    test_helpers::{counter, store_a, Counter, TestAction},
    Registry, StoreDescription,
};

use super::DynStore;

#[test]
fn reduce_changed() {
    let node = counter().into_node();
    let next = node.reduce(&TestAction::Inc).unwrap();
    assert_eq!(next.downcast_ref::<Counter>(), Some(&Counter { n: 1 }));

    // not committed yet
    let state = node.state();
    assert_eq!(state.downcast_ref::<Counter>(), Some(&Counter { n: 0 }));
}

#[test]
fn reduce_passthrough() {
    let node = counter().into_node();
    assert!(node.reduce(&TestAction::Noop).is_none());
}

#[test]
fn reduce_equal_value_is_unchanged() {
    let d = StoreDescription::new("s", 5, |_, _: &TestAction| Rc::new(5));
    assert!(d.into_node().reduce(&TestAction::Inc).is_none());
}

#[test]
fn commit() {
    let node = store_a().into_node();
    let next = node.reduce(&TestAction::SetA(3)).unwrap();
    node.commit(next);
    assert_eq!(node.state().downcast_ref::<i32>(), Some(&3));
}

#[test]
fn key_debug() {
    let r = Registry::new();
    let key = r.register(counter()).unwrap();
    assert_eq!(key.name(), "counter");
    assert!(format!("{key:?}").starts_with("StoreKey(counter: "));
}

#[test]
fn description_debug() {
    let s = format!("{:?}", store_a());
    assert_eq!(s, r#"StoreDescription { name: "a", initial: 0, .. }"#);
}
