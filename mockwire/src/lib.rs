// vim: tw=80
//! Name-addressed mock objects for Rust traits.
//!
//! Mockwire mocks record every call as a method name plus a list of
//! type-erased arguments, and answer it from a ledger of expectations.  Tests
//! refer to methods either by name or by function item, and can turn any mock
//! into a spy that forwards unexpected calls to a real implementation.
//!
//! # Usage
//!
//! * Write a mock struct holding a [`MockMethods`], or generate one with the
//!   `mockwire_gen` crate.  Every trait method forwards to
//!   [`MockMethods::called`] and unpacks the returned [`Rets`] with [`as1`] ..
//!   [`as4`] or [`as_value`].
//! * Give the mock a [`MethodSet`] describing the trait's methods.  Without
//!   one, methods can only be named by string and nothing is checked.
//! * In your test, set expectations with [`MockMethods::on_method`], or
//!   [`MockMethods::on_all_methods`] to accept everything.  Expectations are
//!   matched first-in first-out.  A call that matches nothing panics, unless
//!   the mock has a passthrough target.
//! * Afterwards, check the recorded calls with the `assert_*` methods.
//!
//! ## Getting Started
//! ```
//! use mockwire::*;
//!
//! trait Store {
//!     fn get(&self, key: &str) -> Option<u32>;
//!     fn put(&mut self, key: &str, value: u32);
//! }
//!
//! #[derive(Default)]
//! struct MockStore {
//!     mocks: MockMethods,
//! }
//!
//! impl MockStore {
//!     fn new() -> Self {
//!         let set = MethodSet::new()
//!             .method("get", 1, vec![Output::value::<Option<u32>>()])
//!             .method("put", 2, vec![]);
//!         MockStore { mocks: MockMethods::of(set) }
//!     }
//! }
//!
//! impl Store for MockStore {
//!     fn get(&self, key: &str) -> Option<u32> {
//!         let rets = self.mocks.called("get", args![key.to_owned()]);
//!         as1(&rets)
//!     }
//!     fn put(&mut self, key: &str, value: u32) {
//!         self.mocks.called("put", args![key.to_owned(), value]);
//!     }
//! }
//!
//! let mut mock = MockStore::new();
//! mock.mocks.on_method(method!(MockStore::get), [matcher::eq("a")])
//!     .returns(rets![Some(1u32)]);
//! mock.mocks.on_method("put", []);
//!
//! assert_eq!(mock.get("a"), Some(1));
//! mock.put("b", 2);
//! mock.mocks.assert_method_called(method!(MockStore::put),
//!     [matcher::eq("b")]);
//! mock.mocks.assert_method_not_called("get", [matcher::eq("b")]);
//! ```
//!
//! ## Return values
//!
//! An expectation returns a [`Rets`] vector, one [`Ret`] per return value.
//! [`rets!`] builds one from clonable values.  [`Ret::once`] returns a value
//! which need not be `Clone`, and [`Expectation::returning`] computes the
//! values from the arguments.  An expectation without return values answers
//! with an empty vector; unpacking that panics.
//!
//! ## Matching arguments
//!
//! Each argument of an expectation has a [`Matcher`].  If fewer matchers than
//! the method's arity are given, the rest match anything.  `"a"` and
//! `String::from("a")` are equal arguments.
//!
//! ## Call counts
//!
//! Expectations match any number of calls by default.  [`Expectation::once`]
//! and [`Expectation::times`] limit that; a used-up expectation is skipped
//! and the next matching one answers instead.  [`MockMethods::assert_expectations`]
//! checks minimum call counts.

mod ledger;
pub mod matcher;
mod methods;
mod resolve;
mod spy;
mod value;

pub use crate::ledger::{Call, Expectation, Ledger, Times, Unmatched};
pub use crate::matcher::Matcher;
pub use crate::methods::{MockMethods, RESERVED_METHODS};
pub use crate::resolve::{
    pad, resolve, Arity, MethodFn, MethodRef, MethodSet, MethodSpec, Output,
    Resolved,
};
pub use crate::spy::{Passthrough, SpyTarget};
pub use crate::value::{
    arg_as, as1, as2, as3, as4, as_value, Arg, IntoRets, MockError, Ret, Rets,
    Value,
};

/// Build the argument list of a call.
///
/// ```
/// # use mockwire::*;
/// let args = args![1u32, "two"];
/// assert_eq!(args[1], Arg::new(String::from("two")));
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::Arg::new($arg)),*]
    };
}

/// Build a [`Rets`] vector from clonable values.
#[macro_export]
macro_rules! rets {
    ($($ret:expr),* $(,)?) => {
        $crate::Rets::new(vec![$($crate::Ret::value($ret)),*])
    };
}

/// Refer to a method by its function item.
///
/// ```
/// # use mockwire::*;
/// struct MockThing;
/// impl MockThing {
///     fn frob(&mut self, _x: u32, _y: u32) {}
/// }
/// let r = resolve(&method!(MockThing::frob), None);
/// assert_eq!(r.name, "frob");
/// assert_eq!(r.arity, Arity::Known(2));
/// ```
#[macro_export]
macro_rules! method {
    ($f:expr) => {
        $crate::MethodRef::of(&$f)
    };
}
