use std::rc::Rc;

use assert_call::{call, CallRecorder};
use hookstores::{Action, Error, Hookstores, StoreDescription};
use rstest::rstest;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Msg {
    Inc,
    SetA(i32),
    SetB(i32),
    Ignored,
}

impl Action for Msg {
    fn name(&self) -> &'static str {
        match self {
            Msg::Inc => "INC",
            Msg::SetA(_) => "SET_A",
            Msg::SetB(_) => "SET_B",
            Msg::Ignored => "IGNORED",
        }
    }
}

#[derive(Debug, PartialEq)]
struct Counter {
    n: u32,
}

fn app() -> Hookstores<Msg> {
    Hookstores::builder()
        .store(StoreDescription::new(
            "counter",
            Counter { n: 0 },
            |s, a: &Msg| match a {
                Msg::Inc => Rc::new(Counter { n: s.n + 1 }),
                _ => s.clone(),
            },
        ))
        .store(StoreDescription::from_update("a", 0, |_, a: &Msg| match a {
            Msg::SetA(v) => Some(*v),
            _ => None,
        }))
        .store(StoreDescription::from_update("b", 0, |_, a: &Msg| match a {
            Msg::SetB(v) => Some(*v),
            _ => None,
        }))
        .build()
        .unwrap()
}

#[test]
fn increments_three_times() {
    let mut cr = CallRecorder::new();
    let hs = app();
    let _s = hs
        .subscribe("counter", |s: &Counter| s.n, |n| call!("{}", n))
        .unwrap();

    for _ in 0..3 {
        hs.dispatch(Msg::Inc).unwrap();
    }
    assert_eq!(*hs.state::<Counter>("counter").unwrap(), Counter { n: 3 });
    cr.verify(["1", "2", "3"]);
}

#[test]
fn only_handling_store_notified() {
    let mut cr = CallRecorder::new();
    let hs = app();
    let _a = hs.subscribe("a", |v: &i32| *v, |v| call!("a {}", v)).unwrap();
    let _b = hs.subscribe("b", |v: &i32| *v, |v| call!("b {}", v)).unwrap();

    let changes = hs.dispatch(Msg::SetA(5)).unwrap();
    assert_eq!(changes.names().collect::<Vec<_>>(), ["a"]);
    cr.verify("a 5");
}

#[rstest]
#[case(Msg::Ignored)]
#[case(Msg::SetA(0))]
#[case(Msg::SetB(0))]
fn no_op_dispatch_is_idempotent(#[case] msg: Msg, #[values(1, 2, 10)] times: usize) {
    let mut cr = CallRecorder::new();
    let hs = app();
    let _subs: Vec<_> = ["a", "b"]
        .into_iter()
        .map(|name| {
            hs.subscribe(name, |v: &i32| *v, move |v| call!("{} {}", name, v))
                .unwrap()
        })
        .collect();
    let before = hs.state::<i32>("a").unwrap();

    for _ in 0..times {
        assert!(hs.dispatch(msg).unwrap().is_empty());
    }
    cr.verify(());
    assert!(Rc::ptr_eq(&before, &hs.state::<i32>("a").unwrap()));
}

#[test]
fn unsubscribed_before_dispatch() {
    let mut cr = CallRecorder::new();
    let hs = app();
    let s = hs
        .subscribe("counter", |s: &Counter| s.n, |n| call!("{}", n))
        .unwrap();
    drop(s);
    hs.dispatch(Msg::Inc).unwrap();
    cr.verify(());
}

#[test]
fn subscribe_missing() {
    let hs = app();
    let r = hs.subscribe("missing", |v: &i32| *v, |_| {});
    assert!(matches!(r, Err(Error::UnknownStore { name }) if name == "missing"));
}

#[test]
fn nested_dispatch_from_reducer() {
    let hs = app();
    let d = hs.dispatcher();
    hs.register(StoreDescription::from_update("loop", false, move |_, a: &Msg| {
        if *a == Msg::SetB(1) {
            assert_eq!(d.dispatch(Msg::Inc), Err(Error::ReentrantDispatch));
        }
        None
    }))
    .unwrap();

    // "b" is reduced before "loop", and must be rolled back with it
    assert_eq!(hs.dispatch(Msg::SetB(1)), Err(Error::ReentrantDispatch));
    assert_eq!(*hs.state::<i32>("b").unwrap(), 0);
    assert_eq!(hs.state::<Counter>("counter").unwrap().n, 0);
}
