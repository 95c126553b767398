use std::rc::Rc;

use crate::{Action, StoreDescription};

#[derive(Debug, Clone, PartialEq)]
pub enum TestAction {
    Inc,
    Add(u32),
    SetA(i32),
    SetB(i32),
    Noop,
}

impl Action for TestAction {
    fn name(&self) -> &'static str {
        match self {
            TestAction::Inc => "INC",
            TestAction::Add(_) => "ADD",
            TestAction::SetA(_) => "SET_A",
            TestAction::SetB(_) => "SET_B",
            TestAction::Noop => "NOOP",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    pub n: u32,
}

pub fn counter() -> StoreDescription<Counter, TestAction> {
    StoreDescription::new("counter", Counter { n: 0 }, |s, a| match a {
        TestAction::Inc => Rc::new(Counter { n: s.n + 1 }),
        TestAction::Add(k) => Rc::new(Counter { n: s.n + k }),
        _ => s.clone(),
    })
}

pub fn store_a() -> StoreDescription<i32, TestAction> {
    StoreDescription::from_update("a", 0, |_, a| match a {
        TestAction::SetA(v) => Some(*v),
        _ => None,
    })
}

pub fn store_b() -> StoreDescription<i32, TestAction> {
    StoreDescription::from_update("b", 0, |_, a| match a {
        TestAction::SetB(v) => Some(*v),
        _ => None,
    })
}
