// vim: tw=80
//! Method identity
//!
//! Tests name mocked methods either with a string or with the method's
//! function item, like `method!(MockStore::get)`.  [`resolve`] turns either
//! form into the method's name and its number of arguments, checking both
//! against the mock's [`MethodSet`] when it has one.

use std::any::type_name;

use crate::{
    matcher::{self, Matcher},
    value::{MockError, Ret},
};

#[doc(hidden)]
pub struct Shared;
#[doc(hidden)]
pub struct Exclusive;

/// A method taking `&self` or `&mut self` plus up to eight arguments.
///
/// `Marker` only serves to keep the implementations apart; it is always
/// inferred.
pub trait MethodFn<Marker> {
    /// Number of arguments, not counting the receiver
    const ARITY: usize;
}

macro_rules! method_fn {
    ($n:expr; $($a:ident)*) => {
        impl<F, S, R, $($a,)*> MethodFn<(Shared, S, R, $($a,)*)> for F
            where F: Fn(&S, $($a,)*) -> R
        {
            const ARITY: usize = $n;
        }

        impl<F, S, R, $($a,)*> MethodFn<(Exclusive, S, R, $($a,)*)> for F
            where F: Fn(&mut S, $($a,)*) -> R
        {
            const ARITY: usize = $n;
        }
    }
}

method_fn!(0;);
method_fn!(1; A1);
method_fn!(2; A1 A2);
method_fn!(3; A1 A2 A3);
method_fn!(4; A1 A2 A3 A4);
method_fn!(5; A1 A2 A3 A4 A5);
method_fn!(6; A1 A2 A3 A4 A5 A6);
method_fn!(7; A1 A2 A3 A4 A5 A6 A7);
method_fn!(8; A1 A2 A3 A4 A5 A6 A7 A8);

/// A reference to a mocked method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodRef {
    /// A function item, identified by its type name
    Func {
        path: &'static str,
        arity: usize,
    },
    Name(String),
}

impl MethodRef {
    /// Refer to a method by its function item.
    ///
    /// # Examples
    /// ```
    /// # use mockwire::*;
    /// struct Thing;
    /// impl Thing {
    ///     fn frob(&self, _x: u32) {}
    /// }
    /// let r = resolve(&MethodRef::of(&Thing::frob), None);
    /// assert_eq!(r.name, "frob");
    /// assert_eq!(r.arity, Arity::Known(1));
    /// ```
    pub fn of<F: MethodFn<M>, M>(_f: &F) -> Self {
        MethodRef::Func { path: type_name::<F>(), arity: F::ARITY }
    }
}

impl From<&str> for MethodRef {
    fn from(name: &str) -> Self {
        MethodRef::Name(name.to_owned())
    }
}

impl From<String> for MethodRef {
    fn from(name: String) -> Self {
        MethodRef::Name(name)
    }
}

impl From<&String> for MethodRef {
    fn from(name: &String) -> Self {
        MethodRef::Name(name.clone())
    }
}

/// Declared argument count of a resolved method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Known(usize),
    /// Named by a string on a mock without a [`MethodSet`]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub name: String,
    pub arity: Arity,
}

/// Recover the name and arity of `method`.
///
/// # Panics
///
/// * If `method` is a function item that is not a named method (a closure,
///   for example).
/// * If `owner` is given and has no method of that name.
pub fn resolve(method: &MethodRef, owner: Option<&MethodSet>) -> Resolved {
    match method {
        MethodRef::Func { path, arity } => {
            let name = func_name(path);
            if !is_ident(name) {
                panic!("not a method: `{}`", path);
            }
            if let Some(owner) = owner {
                if owner.get(name).is_none() {
                    panic!("method '{}' does not exist", name);
                }
            }
            Resolved { name: name.to_owned(), arity: Arity::Known(*arity) }
        },
        MethodRef::Name(name) => {
            let arity = match owner {
                Some(owner) => match owner.get(name) {
                    Some(spec) => Arity::Known(spec.args),
                    None => panic!("method '{}' does not exist", name)
                },
                None => Arity::Unknown
            };
            Resolved { name: name.clone(), arity }
        }
    }
}

/// The last path segment, cut at the first `-`.
fn func_name(path: &str) -> &str {
    let last = path.rsplit("::").next().unwrap_or(path);
    last.split('-').next().unwrap_or(last)
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => (),
        _ => return false
    }
    s != "_" && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Pad `matchers` with wildcards up to a known arity.
pub fn pad(mut matchers: Vec<Matcher>, arity: Arity) -> Vec<Matcher> {
    if let Arity::Known(n) = arity {
        while matchers.len() < n {
            matchers.push(matcher::any());
        }
    }
    matchers
}

/// How to build the values one return slot may hold without a test
/// providing them.
#[derive(Clone, Copy)]
pub struct Output {
    ty: &'static str,
    zero: Option<fn() -> Ret>,
    error: Option<fn() -> Ret>,
}

fn zero_of<T: Default + Send + 'static>() -> Ret {
    Ret::with(T::default)
}

fn ok_of<T, E>() -> Ret
    where T: Default + Send + 'static, E: Send + 'static
{
    Ret::with(|| Ok::<T, E>(T::default()))
}

fn err_of<T, E>() -> Ret
    where T: Send + 'static, E: From<MockError> + Send + 'static
{
    Ret::with(|| Err::<T, E>(E::from(MockError::default())))
}

impl Output {
    /// A type with no known zero value.  Its slot stays unset.
    pub fn opaque<T: ?Sized>() -> Self {
        Output { ty: type_name::<T>(), zero: None, error: None }
    }

    /// A type whose zero value is its `Default`.
    pub fn value<T: Default + Send + 'static>() -> Self {
        Output { ty: type_name::<T>(), zero: Some(zero_of::<T>), error: None }
    }

    /// A `Result<T, E>` with zero value `Ok(T::default())` and error value
    /// `Err(MockError.into())`.
    pub fn result<T, E>() -> Self
        where T: Default + Send + 'static, E: From<MockError> + Send + 'static
    {
        Output {
            ty: type_name::<Result<T, E>>(),
            zero: Some(ok_of::<T, E>),
            error: Some(err_of::<T, E>)
        }
    }

    /// A `Result<T, E>` with zero value `Ok(T::default())` and no error
    /// value, for error types that can't be made from a [`MockError`].
    pub fn ok<T, E>() -> Self
        where T: Default + Send + 'static, E: Send + 'static
    {
        Output {
            ty: type_name::<Result<T, E>>(),
            zero: Some(ok_of::<T, E>),
            error: None
        }
    }

    /// A `Result<T, E>` whose `T` has no zero value.
    pub fn fallible<T, E>() -> Self
        where T: Send + 'static, E: From<MockError> + Send + 'static
    {
        Output {
            ty: type_name::<Result<T, E>>(),
            zero: None,
            error: Some(err_of::<T, E>)
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.ty
    }

    /// The zero value, or an unset slot.
    pub fn zero(&self) -> Ret {
        self.zero.map_or_else(Ret::nil, |f| f())
    }

    pub fn error(&self) -> Option<Ret> {
        self.error.map(|f| f())
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("ty", &self.ty)
            .field("zero", &self.zero.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

/// One method of a [`MethodSet`].
#[derive(Clone, Debug)]
pub struct MethodSpec {
    name: String,
    args: usize,
    outputs: Vec<Output>,
}

impl MethodSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of arguments, not counting the receiver
    pub fn args(&self) -> usize {
        self.args
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }
}

/// The methods of a mocked trait: their names, argument counts and return
/// types.
///
/// # Examples
/// ```
/// # use mockwire::*;
/// let set = MethodSet::new()
///     .method("get", 1, vec![Output::value::<u32>()])
///     .method("flush", 0, vec![]);
/// assert_eq!(set.get("get").unwrap().args(), 1);
/// assert!(set.get("put").is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MethodSet {
    methods: Vec<MethodSpec>,
}

impl MethodSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method.
    ///
    /// # Panics
    ///
    /// If the set already has a method called `name`.
    pub fn method(mut self, name: &str, args: usize, outputs: Vec<Output>)
        -> Self
    {
        assert!(self.get(name).is_none(), "Duplicate method '{}'", name);
        self.methods.push(MethodSpec { name: name.to_owned(), args, outputs });
        self
    }

    pub fn get(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodSpec> {
        self.methods.iter()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[cfg(test)]
mod t {
    use super::*;

    struct Thing;

    #[allow(dead_code)]
    impl Thing {
        fn none(&self) {}
        fn two(&self, _a: u32, _b: &str) -> bool { true }
        fn mutable(&mut self, _a: Vec<u8>) {}
    }

    fn set() -> MethodSet {
        MethodSet::new()
            .method("none", 0, vec![])
            .method("two", 2, vec![Output::value::<bool>()])
    }

    #[test]
    fn func_name_strips_path_and_suffix() {
        assert_eq!(func_name("a::b::Thing::get"), "get");
        assert_eq!(func_name("<a::Mock as a::Store>::put"), "put");
        assert_eq!(func_name("a::Thing::get-fm"), "get");
        assert_eq!(func_name("get"), "get");
    }

    #[test]
    fn arity_of_function_items() {
        let r = resolve(&MethodRef::of(&Thing::two), Some(&set()));
        assert_eq!(r, Resolved { name: "two".into(), arity: Arity::Known(2) });
        let r = resolve(&MethodRef::of(&Thing::mutable), None);
        assert_eq!(r.arity, Arity::Known(1));
    }

    #[test]
    fn string_arity_comes_from_owner() {
        let r = resolve(&"two".into(), Some(&set()));
        assert_eq!(r.arity, Arity::Known(2));
        let r = resolve(&"two".into(), None);
        assert_eq!(r.arity, Arity::Unknown);
    }

    #[test]
    #[should_panic(expected = "method 'mutable' does not exist")]
    fn func_missing_from_owner() {
        resolve(&MethodRef::of(&Thing::mutable), Some(&set()));
    }

    #[test]
    #[should_panic(expected = "not a method")]
    fn closure() {
        let f = |_: &Thing, _: u32| ();
        resolve(&MethodRef::of(&f), None);
    }

    #[test]
    fn idents() {
        assert!(is_ident("get"));
        assert!(is_ident("_get2"));
        assert!(!is_ident("{{closure}}"));
        assert!(!is_ident("_"));
        assert!(!is_ident("2get"));
        assert!(!is_ident(""));
    }

    #[test]
    fn pad_only_known_arity() {
        assert_eq!(pad(vec![matcher::any()], Arity::Known(3)).len(), 3);
        assert_eq!(pad(vec![matcher::any()], Arity::Unknown).len(), 1);
        assert_eq!(pad(vec![], Arity::Known(0)).len(), 0);
    }

    #[test]
    fn output_recipes() {
        let out = Output::result::<u32, MockError>();
        let rets = crate::Rets::new(vec![out.zero(), out.error().unwrap()]);
        assert_eq!(crate::as_value::<Result<u32, MockError>>(&rets, 0), Ok(0));
        assert!(crate::as_value::<Result<u32, MockError>>(&rets, 1).is_err());
        assert!(Output::opaque::<Thing>().zero().is_nil());
        let out = Output::ok::<u32, Thing>();
        assert!(out.error().is_none());
        let rets = crate::Rets::new(vec![out.zero()]);
        assert!(matches!(crate::as1::<Result<u32, Thing>>(&rets), Ok(0)));
        assert!(Output::fallible::<Thing, MockError>().zero().is_nil());
    }

    #[test]
    #[should_panic(expected = "Duplicate method 'none'")]
    fn duplicate() {
        set().method("none", 1, vec![]);
    }
}
