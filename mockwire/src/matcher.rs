// vim: tw=80
//! Argument matchers.

use predicates::prelude::*;
use predicates_tree::CaseTreeExt;
use std::fmt;

use crate::value::{Arg, Value};

/// A predicate over one recorded argument.
///
/// Any [`Predicate<Arg>`](predicates::Predicate) can be used as a matcher,
/// but most tests need only [`eq`], [`any`] or [`function`].
pub struct Matcher(Box<dyn Predicate<Arg> + Send + Sync>);

impl Matcher {
    pub fn new<P>(p: P) -> Self
        where P: Predicate<Arg> + Send + Sync + 'static
    {
        Matcher(Box::new(p))
    }

    pub fn matches(&self, arg: &Arg) -> bool {
        self.0.eval(arg)
    }

    /// Describe why `arg` does not match, or `None` if it does.
    pub(crate) fn mismatch(&self, arg: &Arg) -> Option<String> {
        self.0.find_case(false, arg).map(|case| case.tree().to_string())
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Match an argument equal to `value`.
pub fn eq<T: Value>(value: T) -> Matcher {
    Matcher::new(predicate::eq(Arg::new(value)))
}

/// Match any argument.
pub fn any() -> Matcher {
    Matcher::new(predicate::always())
}

/// Match an argument for which `f` returns `true`.
///
/// # Examples
/// ```
/// # use mockwire::*;
/// let m = matcher::function(|a: &Arg| a.downcast_ref::<u32>() == Some(&4));
/// assert!(m.matches(&Arg::new(4u32)));
/// assert!(!m.matches(&Arg::new("four")));
/// ```
pub fn function<F>(f: F) -> Matcher
    where F: Fn(&Arg) -> bool + Send + Sync + 'static
{
    Matcher::new(predicate::function(f))
}
