// vim: tw=80
//! Function items and strings name the same methods.
#![deny(warnings)]

use mockwire::*;

#[allow(dead_code)]
#[path = "generated/store.rs"]
mod store;

use store::{MockStore, Store};

#[allow(dead_code)]
struct Other;

#[allow(dead_code)]
impl Other {
    fn frobnicate(&self, _x: u32) {}
}

#[test]
fn function_and_string_agree() {
    let set = MockStore::method_set();
    let pairs = [
        (method!(MockStore::flush), "flush"),
        (method!(MockStore::get), "get"),
        (method!(MockStore::put), "put"),
        (method!(MockStore::stats), "stats"),
        (method!(MockStore::tags), "tags"),
    ];
    for (func, name) in pairs {
        let by_func = resolve(&func, Some(&set));
        let by_name = resolve(&MethodRef::from(name), Some(&set));
        assert_eq!(by_func.name, name);
        assert_eq!(by_func, by_name);
    }
}

#[test]
fn arity_of_function_items() {
    let set = MockStore::method_set();
    assert_eq!(resolve(&method!(MockStore::stats), Some(&set)).arity,
        Arity::Known(0));
    assert_eq!(resolve(&method!(MockStore::put), Some(&set)).arity,
        Arity::Known(2));
    // No method set is needed to count a function item's arguments
    assert_eq!(resolve(&method!(MockStore::put), None).arity,
        Arity::Known(2));
}

#[test]
fn unknown_arity_without_method_set() {
    let r = resolve(&MethodRef::from("anything"), None);
    assert_eq!(r.name, "anything");
    assert_eq!(r.arity, Arity::Unknown);
}

#[test]
#[should_panic(expected = "method 'nope' does not exist")]
fn unknown_name() {
    let mut mock = MockStore::new();
    mock.on_method("nope", []);
}

#[test]
#[should_panic(expected = "method 'frobnicate' does not exist")]
fn unknown_function() {
    let mut mock = MockStore::new();
    mock.on_method(method!(Other::frobnicate), []);
}

#[test]
#[should_panic(expected = "not a method")]
fn closure() {
    let mock = MockStore::new();
    let f = |_: &MockStore| ();
    mock.method_call_count(method!(f));
}

/// Both forms may be used interchangeably on the same mock
#[test]
fn mixed_forms() {
    let mut mock = MockStore::new();
    mock.on_method("flush", []);
    mock.flush();
    mock.flush();
    assert_eq!(mock.method_call_count(method!(MockStore::flush)), 2);
    assert_eq!(mock.method_call_count(String::from("flush")), 2);
}
