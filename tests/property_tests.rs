//! Property-based tests for the cell and dispatcher.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use frostbox::core::{BoxError, Commit, ImmutableCell, State, Value};
use frostbox::dispatch::{Action, Dispatcher, Reducer};
use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Clone, PartialEq, Debug)]
struct Counter {
    count: i64,
}

impl State for Counter {}

#[derive(Clone, Debug)]
enum Step {
    Add(i64),
    Set(i64),
    Reject,
}

fn arbitrary_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (-100..100i64).prop_map(Step::Add),
        (-100..100i64).prop_map(Step::Set),
        Just(Step::Reject),
    ]
}

fn arbitrary_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1.0e6..1.0e6f64).prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::from),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(Value::from),
    ];

    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::list),
            prop::collection::btree_map("[a-z]{1,4}", inner.clone(), 0..6).prop_map(Value::from),
            prop::collection::vec(inner, 0..6).prop_map(Value::set),
        ]
    })
}

/// Mutate every node of a draft in place.
fn scribble(value: &mut Value) {
    match value {
        Value::List(items) => {
            let items = Arc::make_mut(items);
            items.iter_mut().for_each(scribble);
            items.push(Value::Null);
        }
        Value::Map(entries) => {
            let entries = Arc::make_mut(entries);
            entries.values_mut().for_each(scribble);
            entries.insert("scribbled".to_string(), Value::from(true));
        }
        Value::Set(members) => {
            Arc::make_mut(members).insert(Value::from("scribbled"));
        }
        leaf => *leaf = Value::from("scribbled"),
    }
}

fn reducers() -> (Reducer<Counter, i64>, Reducer<Counter, i64>, Reducer<Counter, i64>) {
    let add = Reducer::new("add", |mut state: Counter, amount: &i64| {
        state.count += amount;
        Ok(state)
    });
    let set = Reducer::new("set", |mut state: Counter, value: &i64| {
        state.count = *value;
        Ok(state)
    });
    let reject = Reducer::new("reject", |_: Counter, _: &i64| -> Result<Counter, BoxError> {
        Err("rejected".into())
    });
    (add, set, reject)
}

proptest! {
    #[test]
    fn draft_mutation_never_reaches_held_snapshot(value in arbitrary_value()) {
        let cell = ImmutableCell::new(value);
        let before = cell.get();
        let rendered = before.to_json();

        cell.transform(|mut draft| {
            scribble(&mut draft);
            draft
        })
        .unwrap();

        prop_assert_eq!(before.to_json(), rendered);
    }

    #[test]
    fn deep_copy_equals_original(value in arbitrary_value()) {
        prop_assert_eq!(value.deep_copy(), value);
    }

    #[test]
    fn replaced_values_leave_caller_copy_untouched(value in arbitrary_value()) {
        let cell = ImmutableCell::new(Value::Null);
        let kept = value.clone();
        let rendered = kept.to_json();

        cell.replace(value).unwrap();
        cell.transform(|mut draft| {
            scribble(&mut draft);
            draft
        })
        .unwrap();

        prop_assert_eq!(kept.to_json(), rendered);
    }

    #[test]
    fn history_matches_successful_updates(steps in prop::collection::vec(arbitrary_step(), 0..20)) {
        let store = Dispatcher::new(Counter { count: 0 });
        let (add, set, reject) = reducers();
        let mut expected_names = Vec::new();
        let mut expected_states = Vec::new();

        for step in &steps {
            let result = match step {
                Step::Add(n) => store.update(&add, *n),
                Step::Set(n) => store.update(&set, *n),
                Step::Reject => store.update(&reject, 0),
            };

            match (step, result) {
                (Step::Reject, result) => prop_assert!(result.is_err()),
                (step, Ok(state)) => {
                    expected_names.push(if matches!(step, Step::Add(_)) { "add" } else { "set" });
                    expected_states.push(state.as_ref().clone());
                    prop_assert!(Arc::ptr_eq(&state, &store.state()));
                }
                (_, Err(error)) => prop_assert!(false, "unexpected error {}", error),
            }
        }

        let history = store.history();
        prop_assert_eq!(history.len(), expected_names.len());
        prop_assert_eq!(history.names(), expected_names);
        let states: Vec<Counter> = history.states().into_iter().cloned().collect();
        prop_assert_eq!(states, expected_states);
    }

    #[test]
    fn notifications_follow_commit_order(values in prop::collection::vec(any::<i64>(), 0..20)) {
        let cell = ImmutableCell::new(Counter { count: 0 });
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        cell.subscribe(move |state, _| {
            sink.lock().push(state.count);
            Ok(())
        });

        for value in &values {
            cell.replace(Counter { count: *value }).unwrap();
        }

        prop_assert_eq!(cell.flush(), values.len());
        prop_assert_eq!(seen.lock().clone(), values);
    }

    #[test]
    fn recommitting_current_snapshot_is_silent(count in any::<i64>(), repeats in 1..5usize) {
        let cell = ImmutableCell::new(Counter { count });
        for _ in 0..repeats {
            let current = cell.get();
            cell.replace(Commit::Shared(current)).unwrap();
        }
        prop_assert_eq!(cell.pending(), 0);
    }

    #[test]
    fn sends_record_nested_updates(amounts in prop::collection::vec(-50..50i64, 1..8)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        let (add, _, _) = reducers();
        let deposit = {
            let add = add.clone();
            Action::new("deposit", move |_state, amount: i64, store: Dispatcher<Counter>| {
                let add = add.clone();
                async move {
                    store.update(&add, amount)?;
                    Ok::<(), BoxError>(())
                }
            })
        };

        let store = Dispatcher::new(Counter { count: 0 });
        runtime.block_on(async {
            for amount in &amounts {
                store.send(&deposit, *amount).await.unwrap();
            }
        });

        let history = store.history();
        prop_assert_eq!(history.len(), amounts.len() * 2);
        prop_assert_eq!(store.state().count, amounts.iter().sum::<i64>());
        for pair in history.entries().chunks(2) {
            prop_assert_eq!(pair[0].name.as_str(), "add");
            prop_assert_eq!(pair[1].name.as_str(), "deposit");
            prop_assert_eq!(&pair[0].state, &pair[1].state);
        }
    }
}
