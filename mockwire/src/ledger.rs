// vim: tw=80
//! The expectation ledger
//!
//! A [`Ledger`] holds the expectations registered on one mock, in
//! registration order, plus the history of every call it has answered.  Calls
//! are matched first-in first-out: the earliest expectation whose method name
//! and argument matchers accept the call, and which has not been used up, wins.

use std::{
    fmt,
    ops::Range,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use crate::{
    matcher::Matcher,
    value::{Arg, Rets},
};

/// How many times an expectation may be, and must be, called.
pub struct Times {
    /// How many times has the expectation already been called?
    count: AtomicUsize,
    range: Range<usize>,
}

impl Times {
    fn call(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Has this expectation already been called the maximum allowed number of
    /// times?
    pub fn is_done(&self) -> bool {
        self.count() + 1 >= self.range.end
    }

    /// Has this expectation already been called the minimum required number of
    /// times?
    pub fn is_satisfied(&self) -> bool {
        self.count() >= self.range.start
    }

    fn any(&mut self) {
        self.range = 0..usize::MAX;
    }

    // https://github.com/rust-lang/rust-clippy/issues/3307
    #[allow(clippy::range_plus_one)]
    fn n(&mut self, n: usize) {
        self.range = n..(n + 1);
    }

    fn never(&mut self) {
        self.range = 0..1;
    }
}

impl Default for Times {
    fn default() -> Self {
        // By default, allow any number of calls
        Times { count: AtomicUsize::default(), range: 0..usize::MAX }
    }
}

impl fmt::Debug for Times {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} of {:?}", self.count(), self.range)
    }
}

enum Rfunc {
    Const(Rets),
    Mut(Mutex<Box<dyn FnMut(&[Arg]) -> Rets + Send>>),
}

impl Rfunc {
    fn call(&self, args: &[Arg]) -> Rets {
        match self {
            Rfunc::Const(rets) => rets.clone(),
            Rfunc::Mut(f) => {
                let mut f = f.lock().unwrap();
                (*f)(args)
            }
        }
    }
}

/// A registered expectation: a method name, one matcher per argument, a call
/// count limit and the values to return.
pub struct Expectation {
    method: String,
    matchers: Vec<Matcher>,
    times: Times,
    rfunc: Rfunc,
}

impl Expectation {
    pub(crate) fn new(method: &str, matchers: Vec<Matcher>) -> Self {
        Expectation {
            method: method.to_owned(),
            matchers,
            times: Times::default(),
            rfunc: Rfunc::Const(Rets::default()),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    pub fn times_called(&self) -> usize {
        self.times.count()
    }

    /// Return `rets` from every matching call.
    pub fn returns(&mut self, rets: Rets) -> &mut Self {
        self.rfunc = Rfunc::Const(rets);
        self
    }

    /// Compute the return values from the call's arguments.
    pub fn returning<F>(&mut self, f: F) -> &mut Self
        where F: FnMut(&[Arg]) -> Rets + Send + 'static
    {
        self.rfunc = Rfunc::Mut(Mutex::new(Box::new(f)));
        self
    }

    /// Match at most one call.  Later calls fall through to the next
    /// matching expectation.
    pub fn once(&mut self) -> &mut Self {
        self.times.n(1);
        self
    }

    /// Match at most `n` calls, and require exactly `n` for
    /// [`MockMethods::assert_expectations`](crate::MockMethods::assert_expectations).
    pub fn times(&mut self, n: usize) -> &mut Self {
        self.times.n(n);
        self
    }

    /// Match any number of calls.  This is the default.
    pub fn times_any(&mut self) -> &mut Self {
        self.times.any();
        self
    }

    /// Match no calls at all.
    pub fn never(&mut self) -> &mut Self {
        self.times.never();
        self
    }

    pub fn is_done(&self) -> bool {
        self.times.is_done()
    }

    pub fn is_satisfied(&self) -> bool {
        self.times.is_satisfied()
    }

    fn matches(&self, method: &str, args: &[Arg]) -> bool {
        self.method == method &&
            self.matchers.len() == args.len() &&
            self.matchers.iter().zip(args).all(|(m, a)| m.matches(a))
    }

    /// Explain why this expectation rejects `args`.
    fn explain(&self, args: &[Arg]) -> String {
        if self.is_done() {
            return format!("called {} time(s), no more calls allowed",
                self.times.count());
        }
        if self.matchers.len() != args.len() {
            return format!("expected {} argument(s), got {}",
                self.matchers.len(), args.len());
        }
        self.matchers.iter()
            .zip(args)
            .enumerate()
            .filter_map(|(i, (m, a))| {
                m.mismatch(a).map(|tree| format!("arg {}: {}", i, tree))
            }).collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Expectation")
            .field("method", &self.method)
            .field("matchers", &self.matchers)
            .field("times", &self.times)
            .finish()
    }
}

/// One entry of the call history.
#[derive(Clone, Debug)]
pub struct Call {
    pub method: String,
    pub args: Vec<Arg>,
    /// Position of this call among all calls recorded by the ledger
    pub seq: usize,
}

/// A call that no expectation accepted.
#[derive(Debug)]
pub struct Unmatched {
    method: String,
    args: Vec<Arg>,
    report: Vec<String>,
}

impl Unmatched {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }
}

impl fmt::Display for Unmatched {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "No matching expectation found for {}({})", self.method,
            fmt_args(&self.args))?;
        if self.report.is_empty() {
            write!(f, "\nNo expectations were set for method '{}'",
                self.method)?;
        }
        for (i, line) in self.report.iter().enumerate() {
            write!(f, "\nExpectation {}: {}", i, line)?;
        }
        Ok(())
    }
}

impl std::error::Error for Unmatched {}

pub(crate) fn fmt_args(args: &[Arg]) -> String {
    args.iter()
        .map(|a| format!("{:?}", a))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Expectations and call history of one mock.
#[derive(Default)]
pub struct Ledger {
    expectations: Mutex<Vec<Expectation>>,
    calls: Mutex<Vec<Call>>,
    seq: AtomicUsize,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an expectation for `method`.  It accepts calls with exactly
    /// one argument per matcher.
    pub fn register(&mut self, method: &str, matchers: Vec<Matcher>)
        -> &mut Expectation
    {
        tracing::debug!(method, matchers = matchers.len(),
            "registering expectation");
        let expectations = self.expectations.get_mut().unwrap();
        expectations.push(Expectation::new(method, matchers));
        let last = expectations.len() - 1;
        &mut expectations[last]
    }

    /// Register an expectation for one call with `nargs` arguments of any
    /// value, without exclusive access to the ledger.
    pub(crate) fn register_once(&self, method: &str, nargs: usize) {
        let matchers = (0..nargs).map(|_| crate::matcher::any()).collect();
        let mut expectation = Expectation::new(method, matchers);
        expectation.once();
        self.expectations.lock().unwrap().push(expectation);
    }

    /// Answer a call from the first matching expectation and record it in
    /// the history.  Unmatched calls are not recorded.
    pub fn record_call(&self, method: &str, args: Vec<Arg>)
        -> Result<Rets, Unmatched>
    {
        let rets = {
            let expectations = self.expectations.lock().unwrap();
            let found = expectations.iter()
                .find(|e| !e.is_done() && e.matches(method, &args));
            match found {
                Some(e) => {
                    e.times.call();
                    e.rfunc.call(&args)
                },
                None => {
                    let report = expectations.iter()
                        .filter(|e| e.method == method)
                        .map(|e| e.explain(&args))
                        .collect();
                    return Err(Unmatched {
                        method: method.to_owned(),
                        args,
                        report
                    });
                }
            }
        };
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(method, seq, args = %fmt_args(&args), "call");
        self.calls.lock().unwrap().push(Call {
            method: method.to_owned(),
            args,
            seq
        });
        Ok(rets.named(method))
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.lock().unwrap()
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Was `method` ever called with arguments accepted by `matchers`?
    pub fn calls_matching(&self, method: &str, matchers: &[Matcher]) -> bool {
        self.calls.lock().unwrap()
            .iter()
            .any(|c| {
                c.method == method &&
                    c.args.len() == matchers.len() &&
                    matchers.iter().zip(&c.args).all(|(m, a)| m.matches(a))
            })
    }

    /// A snapshot of the call history, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Describe every expectation which has not yet been called its minimum
    /// number of times.
    pub fn unsatisfied(&self) -> Vec<String> {
        self.expectations.lock().unwrap()
            .iter()
            .filter(|e| !e.is_satisfied())
            .map(|e| format!("{} called {} of at least {} time(s)", e.method,
                e.times.count(), e.times.range.start))
            .collect()
    }

    pub fn clear_expectations(&self) {
        self.expectations.lock().unwrap().clear();
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("expectations", &*self.expectations.lock().unwrap())
            .field("calls", &*self.calls.lock().unwrap())
            .finish()
    }
}
