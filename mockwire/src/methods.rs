// vim: tw=80
//! The helper embedded in every mock.

use std::fmt;

use crate::{
    ledger::{fmt_args, Expectation, Ledger},
    matcher::Matcher,
    resolve::{pad, resolve, Arity, MethodRef, MethodSet, Resolved},
    spy::Target,
    value::Rets,
};

/// Names of `MockMethods`' own methods.
///
/// A mock derefs to its `MockMethods`, so a trait method with one of these
/// names would be shadowed.  [`MockMethods::on_all_methods`] skips them.
pub const RESERVED_METHODS: &[&str] = &[
    "assert_expectations",
    "assert_method_called",
    "assert_method_not_called",
    "assert_number_of_method_calls",
    "assert_number_of_method_calls_is",
    "called",
    "clear_all",
    "clear_calls",
    "clear_expectations",
    "has_passthrough",
    "ledger",
    "method_call_count",
    "method_called_with",
    "method_set",
    "new",
    "of",
    "on_all_methods",
    "on_method",
    "set_passthrough",
    "set_passthrough_local",
];

/// Expectations, call history and passthrough target of one mock.
///
/// A mock struct holds a `MockMethods`, forwards every trait method to
/// [`MockMethods::called`], and derefs to it so tests can set expectations
/// and make assertions on the mock directly.
///
/// # Examples
/// ```
/// # use mockwire::*;
/// let mut mocks = MockMethods::of(
///     MethodSet::new().method("get", 2, vec![Output::value::<u32>()]));
/// mocks.on_method("get", [matcher::eq("a")]).returns(rets![7u32]);
///
/// let rets = mocks.called("get", args!["a", 1u8]);
/// assert_eq!(as1::<u32>(&rets), 7);
/// mocks.assert_method_called("get", [matcher::eq("a")]);
/// mocks.assert_number_of_method_calls("get", 1);
/// ```
#[derive(Default)]
pub struct MockMethods {
    pub(crate) ledger: Ledger,
    owner: Option<MethodSet>,
    pub(crate) passthrough: Option<Target>,
}

impl MockMethods {
    /// A mock with no [`MethodSet`].  Methods can only be named by string,
    /// and their arity is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock of the methods in `owner`.
    pub fn of(owner: MethodSet) -> Self {
        MockMethods { owner: Some(owner), ..Self::default() }
    }

    pub fn method_set(&self) -> Option<&MethodSet> {
        self.owner.as_ref()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn resolve<M: Into<MethodRef>>(&self, method: M) -> Resolved {
        resolve(&method.into(), self.owner.as_ref())
    }

    /// Expect calls to `method`.  Missing matchers match anything.
    pub fn on_method<M, I>(&mut self, method: M, matchers: I)
        -> &mut Expectation
        where M: Into<MethodRef>,
              I: IntoIterator<Item = Matcher>
    {
        let resolved = self.resolve(method);
        let matchers = pad(matchers.into_iter().collect(), resolved.arity);
        self.ledger.register(&resolved.name, matchers)
    }

    /// Expect any call to any method.
    ///
    /// Each method returns the zero value of each of its return types.  With
    /// `errs`, a method whose last return type is a `Result` with an error
    /// recipe returns an error instead.
    ///
    /// # Panics
    ///
    /// If the mock has no [`MethodSet`].
    pub fn on_all_methods(&mut self, errs: bool) {
        let Some(owner) = self.owner.as_ref() else {
            panic!("cannot mock all methods: mock has no method set");
        };
        for spec in owner.iter() {
            if RESERVED_METHODS.contains(&spec.name()) {
                continue;
            }
            let last = spec.outputs().len().checked_sub(1);
            let rets = spec.outputs()
                .iter()
                .enumerate()
                .map(|(i, out)| match out.error() {
                    Some(err) if errs && Some(i) == last => err,
                    _ => out.zero()
                }).collect::<Rets>();
            let matchers = pad(Vec::new(), Arity::Known(spec.args()));
            self.ledger.register(spec.name(), matchers).returns(rets);
        }
    }

    /// How many times has `method` been called?
    pub fn method_call_count<M: Into<MethodRef>>(&self, method: M) -> usize {
        let resolved = self.resolve(method);
        self.ledger.call_count(&resolved.name)
    }

    /// Has `method` been called with arguments accepted by `matchers`?
    /// Missing matchers match anything.
    pub fn method_called_with<M, I>(&self, method: M, matchers: I) -> bool
        where M: Into<MethodRef>,
              I: IntoIterator<Item = Matcher>
    {
        let resolved = self.resolve(method);
        let matchers = pad(matchers.into_iter().collect(), resolved.arity);
        self.ledger.calls_matching(&resolved.name, &matchers)
    }

    /// Assert that `method` was called.
    ///
    /// With no matchers, any call counts.  Otherwise missing matchers match
    /// anything and at least one call must match them all.
    pub fn assert_method_called<M, I>(&self, method: M, matchers: I)
        where M: Into<MethodRef>,
              I: IntoIterator<Item = Matcher>
    {
        let resolved = self.resolve(method);
        let matchers = matchers.into_iter().collect::<Vec<_>>();
        if matchers.is_empty() {
            assert!(self.ledger.call_count(&resolved.name) > 0,
                "Expected method '{}' to have been called", resolved.name);
        } else {
            let matchers = pad(matchers, resolved.arity);
            assert!(self.ledger.calls_matching(&resolved.name, &matchers),
                "Expected method '{}' to have been called with ({})\n{}",
                resolved.name, fmt_matchers(&matchers), self.history());
        }
    }

    /// Assert that `method` was not called.
    ///
    /// With no matchers, no call at all may have been made.  Otherwise no
    /// call may match the (padded) matchers.
    pub fn assert_method_not_called<M, I>(&self, method: M, matchers: I)
        where M: Into<MethodRef>,
              I: IntoIterator<Item = Matcher>
    {
        let resolved = self.resolve(method);
        let matchers = matchers.into_iter().collect::<Vec<_>>();
        if matchers.is_empty() {
            let n = self.ledger.call_count(&resolved.name);
            assert!(n == 0,
                "Expected method '{}' not to have been called, but it was \
                called {} time(s)", resolved.name, n);
        } else {
            let matchers = pad(matchers, resolved.arity);
            assert!(!self.ledger.calls_matching(&resolved.name, &matchers),
                "Expected method '{}' not to have been called with ({})\n{}",
                resolved.name, fmt_matchers(&matchers), self.history());
        }
    }

    pub fn assert_number_of_method_calls<M>(&self, method: M, expected: usize)
        where M: Into<MethodRef>
    {
        let resolved = self.resolve(method);
        let n = self.ledger.call_count(&resolved.name);
        assert!(n == expected,
            "Expected method '{}' to have been called {} time(s), but it was \
            called {} time(s)", resolved.name, expected, n);
    }

    /// Assert that the number of calls to `method` passes `check`.
    pub fn assert_number_of_method_calls_is<M, F>(&self, method: M, check: F)
        where M: Into<MethodRef>,
              F: FnOnce(usize) -> bool
    {
        let resolved = self.resolve(method);
        let n = self.ledger.call_count(&resolved.name);
        assert!(check(n),
            "Unexpected number of calls to method '{}': {}", resolved.name, n);
    }

    /// Assert that every expectation was called at least as many times as it
    /// requires.
    pub fn assert_expectations(&self) {
        let unsatisfied = self.ledger.unsatisfied();
        assert!(unsatisfied.is_empty(),
            "Expectation called fewer times than required:\n{}",
            unsatisfied.join("\n"));
    }

    pub fn clear_expectations(&self) {
        self.ledger.clear_expectations();
    }

    pub fn clear_calls(&self) {
        self.ledger.clear_calls();
    }

    pub fn clear_all(&self) {
        self.clear_expectations();
        self.clear_calls();
    }

    fn history(&self) -> String {
        let calls = self.ledger.calls();
        if calls.is_empty() {
            return "No calls were recorded".to_owned();
        }
        let mut s = String::from("Recorded calls:");
        for call in calls {
            s.push_str(&format!("\n    {}({})", call.method,
                fmt_args(&call.args)));
        }
        s
    }
}

fn fmt_matchers(matchers: &[Matcher]) -> String {
    matchers.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Debug for MockMethods {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MockMethods")
            .field("ledger", &self.ledger)
            .field("owner", &self.owner)
            .field("passthrough", &self.passthrough.is_some())
            .finish()
    }
}
