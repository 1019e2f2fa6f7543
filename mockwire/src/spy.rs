// vim: tw=80
//! Spies: mocks that forward unexpected calls to a real implementation.
//!
//! When a mock with a passthrough target receives a call that no expectation
//! accepts, it records the call as usual and then answers it by invoking the
//! same method on the target.  A test can therefore program just the methods
//! it cares about and let every other call reach the real collaborator, while
//! [`MockMethods::method_call_count`] and friends still see every call.
//!
//! # Examples
//! ```
//! # use mockwire::*;
//! # use std::sync::atomic::{AtomicU32, Ordering};
//! struct Counter(AtomicU32);
//! impl Counter {
//!     fn bump(&self, by: u32) -> u32 {
//!         self.0.fetch_add(by, Ordering::Relaxed) + by
//!     }
//! }
//!
//! let mut mocks = MockMethods::new();
//! mocks.set_passthrough(SpyTarget::new(Counter(AtomicU32::new(0)))
//!     .method("bump", |c, args| (c.bump(arg_as::<u32>(args, 0)),)));
//! mocks.on_method("bump", [matcher::eq(100u32)]).returns(rets![0u32]);
//!
//! assert_eq!(as1::<u32>(&mocks.called("bump", args![2u32])), 2);
//! assert_eq!(as1::<u32>(&mocks.called("bump", args![100u32])), 0);
//! assert_eq!(as1::<u32>(&mocks.called("bump", args![3u32])), 5);
//! mocks.assert_number_of_method_calls("bump", 3);
//! ```

use fragile::Fragile;

use crate::{
    methods::MockMethods,
    value::{Arg, IntoRets, Rets},
};

/// An object which can invoke its methods by name.
pub trait Passthrough {
    /// Invoke `method`, or return `None` if there is no such method.
    fn invoke(&self, method: &str, args: &[Arg]) -> Option<Rets>;
}

pub(crate) enum Target {
    Shared(Box<dyn Passthrough + Send + Sync>),
    Local(Fragile<Box<dyn Passthrough>>),
}

impl Target {
    fn invoke(&self, method: &str, args: &[Arg]) -> Option<Rets> {
        match self {
            Target::Shared(p) => p.invoke(method, args),
            Target::Local(p) => p.get().invoke(method, args),
        }
    }
}

type Dispatch<T> = Box<dyn Fn(&T, &[Arg]) -> Rets + Send + Sync>;

/// A [`Passthrough`] built from a real object and one closure per method.
pub struct SpyTarget<T> {
    target: T,
    methods: Vec<(String, Dispatch<T>)>,
}

impl<T> SpyTarget<T> {
    pub fn new(target: T) -> Self {
        SpyTarget { target, methods: Vec::new() }
    }

    /// Dispatch `name` to `f`.  `f` returns the method's results as a tuple,
    /// `()` for none.
    pub fn method<F, R>(mut self, name: &str, f: F) -> Self
        where F: Fn(&T, &[Arg]) -> R + Send + Sync + 'static,
              R: IntoRets
    {
        let dispatch: Dispatch<T> = Box::new(move |t, args| {
            f(t, args).into_rets()
        });
        self.methods.push((name.to_owned(), dispatch));
        self
    }

    pub fn target(&self) -> &T {
        &self.target
    }
}

impl<T> Passthrough for SpyTarget<T> {
    fn invoke(&self, method: &str, args: &[Arg]) -> Option<Rets> {
        self.methods.iter()
            .rev()
            .find(|(name, _)| name == method)
            .map(|(_, f)| f(&self.target, args))
    }
}

impl MockMethods {
    /// Forward calls that match no expectation to `target`.
    ///
    /// Replaces any previous target.
    pub fn set_passthrough<P>(&mut self, target: P)
        where P: Passthrough + Send + Sync + 'static
    {
        self.passthrough = Some(Target::Shared(Box::new(target)));
    }

    /// Like [`set_passthrough`](Self::set_passthrough), for targets that
    /// cannot be sent between threads.
    ///
    /// # Panics
    ///
    /// Forwarding a call from any other thread than the one which set the
    /// target will panic.
    pub fn set_passthrough_local<P: Passthrough + 'static>(&mut self, target: P)
    {
        let target: Box<dyn Passthrough> = Box::new(target);
        self.passthrough = Some(Target::Local(Fragile::new(target)));
    }

    pub fn has_passthrough(&self) -> bool {
        self.passthrough.is_some()
    }

    /// Record a call to `method` and answer it.
    ///
    /// This is what every mocked method calls.  The first matching
    /// expectation provides the answer.  If there is none, the passthrough
    /// target does, and the call is recorded once just the same.
    ///
    /// # Panics
    ///
    /// * If no expectation matches and there is no passthrough target.
    /// * If the passthrough target does not implement `method`.
    pub fn called(&self, method: &str, args: Vec<Arg>) -> Rets {
        let unmatched = match self.ledger.record_call(method, args) {
            Ok(rets) => return rets,
            Err(unmatched) => unmatched
        };
        let Some(target) = &self.passthrough else {
            panic!("{}", unmatched);
        };
        let args = unmatched.args();
        tracing::debug!(method, "forwarding unexpected call to passthrough");
        self.ledger.register_once(method, args.len());
        if let Err(e) = self.ledger.record_call(method, args.to_vec()) {
            panic!("{}", e);
        }
        match target.invoke(method, args) {
            Some(rets) => rets.named(method),
            None => panic!("passthrough target does not implement method '{}'",
                method)
        }
    }
}
