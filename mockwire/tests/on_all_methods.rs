// vim: tw=80
//! Accepting every call at once
#![deny(warnings)]

use std::time::Duration;

use mockwire::*;

#[allow(dead_code)]
#[path = "generated/store.rs"]
mod store;

use store::{Item, MockStore, Store, StoreError};

#[test]
fn zero_values() {
    let mut mock = MockStore::new();
    mock.on_all_methods(false);
    mock.flush();
    assert_eq!(mock.put(Item::default(), Duration::ZERO), Ok(()));
    assert_eq!(mock.stats(), (0, 0, 0, 0.0, false));
    assert!(mock.tags(&["a".to_owned()]).is_empty());
    mock.log(1, args!["x"]);
    mock.touch(["a".to_owned()]);
    mock.assert_number_of_method_calls("put", 1);
}

#[test]
fn errors() {
    let mut mock = MockStore::new();
    mock.on_all_methods(true);
    assert_eq!(mock.get("a"),
        Err(StoreError::Mock(MockError::default())));
    assert_eq!(mock.put(Item::default(), Duration::ZERO),
        Err(StoreError::Mock(MockError::default())));
    // Methods that can't fail still return zero values
    assert_eq!(mock.stats(), (0, 0, 0, 0.0, false));
    mock.flush();
}

/// `Item` has no zero value, so a successful `get` can't be made up.
#[test]
#[should_panic(expected = "Return value 0 of method 'get' was never set")]
fn no_zero_value() {
    let mut mock = MockStore::new();
    mock.on_all_methods(false);
    let _ = mock.get("a");
}

/// Expectations set earlier take precedence
#[test]
fn after_on_method() {
    let mut mock = MockStore::new();
    mock.on_method("stats", [])
        .returns(rets![1usize, 2usize, 3u64, 4.0f64, true]);
    mock.on_all_methods(true);
    assert_eq!(mock.stats(), (1, 2, 3, 4.0, true));
}

#[test]
#[should_panic(expected = "cannot mock all methods: mock has no method set")]
fn without_method_set() {
    let mut mocks = MockMethods::new();
    mocks.on_all_methods(true);
}

#[test]
#[should_panic(expected = "No expectations were set for method 'called'")]
fn reserved_names_are_skipped() {
    let set = MethodSet::new()
        .method("called", 0, vec![])
        .method("frob", 0, vec![]);
    let mut mocks = MockMethods::of(set);
    mocks.on_all_methods(false);
    mocks.called("frob", Vec::new());
    mocks.called("called", Vec::new());
}

#[allow(dead_code)]
#[derive(Debug, PartialEq)]
struct Opaque;

/// A `Result` whose error type has no error recipe is never an error
#[test]
fn errs_without_error_recipe() {
    let set = MethodSet::new()
        .method("frob", 0, vec![Output::ok::<u8, Opaque>()]);
    let mut mocks = MockMethods::of(set);
    mocks.on_all_methods(true);
    let rets = mocks.called("frob", Vec::new());
    assert_eq!(as1::<Result<u8, Opaque>>(&rets), Ok(0));
}
