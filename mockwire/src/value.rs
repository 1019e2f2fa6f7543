// vim: tw=80
//! Type-erased call arguments and return values.
//!
//! Every call that reaches a mock is recorded as a method name and a list of
//! [`Arg`]s.  Every answer is a [`Rets`] vector, unpacked into concrete types
//! by [`as_value`] and the `asN` helpers.

use downcast::{downcast, Any};
use std::{
    any::{self, type_name},
    error::Error,
    fmt,
    io,
    sync::{Arc, Mutex},
};

/// A value which can be recorded as the argument of a mocked call.
///
/// Implemented for every `'static` type that is `Debug`, `PartialEq`, `Send`
/// and `Sync`.
pub trait Value: Any + fmt::Debug + Send + Sync {
    /// Compare with another recorded value, which may have a different type.
    fn eq_value(&self, other: &dyn Value) -> bool;
}

downcast!(dyn Value);

impl<T> Value for T
    where T: fmt::Debug + PartialEq + Send + Sync + 'static
{
    fn eq_value(&self, other: &dyn Value) -> bool {
        match other.downcast_ref::<T>() {
            Ok(other) => self == other,
            Err(_) => match (as_str(self), as_str(other)) {
                (Some(a), Some(b)) => a == b,
                _ => false
            }
        }
    }
}

/// `String` and `&'static str` arguments are interchangeable.
fn as_str(v: &dyn Value) -> Option<&str> {
    if let Ok(s) = v.downcast_ref::<String>() {
        Some(s.as_str())
    } else if let Ok(s) = v.downcast_ref::<&'static str>() {
        Some(s)
    } else {
        None
    }
}

/// One argument of a recorded call.
///
/// Cloning an `Arg` is cheap; clones share the underlying value.
#[derive(Clone)]
pub struct Arg(Arc<dyn Value>);

impl Arg {
    /// Wrap `value`.  An `Arg` passed to `Arg::new` is returned as-is rather
    /// than wrapped a second time.
    pub fn new<T: Value>(value: T) -> Self {
        let any: &dyn any::Any = &value;
        if let Some(arg) = any.downcast_ref::<Arg>() {
            return arg.clone();
        }
        Arg(Arc::new(value))
    }

    /// Borrow the wrapped value, if it has type `T`.
    pub fn downcast_ref<T: Value>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>().ok()
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl PartialEq for Arg {
    fn eq(&self, other: &Arg) -> bool {
        self.0.eq_value(&*other.0)
    }
}

/// Fetch argument `index` of a recorded call as a `T`.
///
/// # Panics
///
/// If there is no such argument or it has a different type.
pub fn arg_as<T: Value + Clone>(args: &[Arg], index: usize) -> T {
    let arg = args.get(index).unwrap_or_else(|| {
        panic!("Call has {} argument(s), wanted index {}", args.len(), index)
    });
    match arg.downcast_ref::<T>() {
        Some(v) => v.clone(),
        None => panic!("Argument {} is {:?}, not a `{}`", index, arg,
            type_name::<T>())
    }
}

type Make = Arc<dyn Fn() -> Box<dyn any::Any + Send> + Send + Sync>;
type Taken = Arc<Mutex<Option<Box<dyn any::Any + Send>>>>;

#[derive(Clone)]
enum Slot {
    Nil,
    Make(&'static str, Make),
    Once(&'static str, Taken),
}

/// One return value of a mocked call.
///
/// A `Ret` is a recipe rather than a value: it is evaluated every time the
/// mock is called, except for [`Ret::once`].
#[derive(Clone)]
pub struct Ret(Slot);

impl Ret {
    /// An unset return slot.  Unpacking it panics.
    pub fn nil() -> Self {
        Ret(Slot::Nil)
    }

    /// Return a clone of `value` on every call.
    pub fn value<T: Clone + Send + Sync + 'static>(value: T) -> Self {
        Ret::with(move || value.clone())
    }

    /// Return the result of `f` on every call.
    pub fn with<T, F>(f: F) -> Self
        where T: Send + 'static,
              F: Fn() -> T + Send + Sync + 'static
    {
        let make: Make = Arc::new(move || {
            Box::new(f()) as Box<dyn any::Any + Send>
        });
        Ret(Slot::Make(type_name::<T>(), make))
    }

    /// Return `value` once.  Unpacking the slot a second time panics.
    ///
    /// Unlike [`Ret::value`], `T` need not be `Clone`.
    pub fn once<T: Send + 'static>(value: T) -> Self {
        let boxed: Box<dyn any::Any + Send> = Box::new(value);
        Ret(Slot::Once(type_name::<T>(), Arc::new(Mutex::new(Some(boxed)))))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.0, Slot::Nil)
    }

    fn take<T: 'static>(&self) -> Result<T, String> {
        let (ty, boxed) = match &self.0 {
            Slot::Nil => return Err("was never set".to_owned()),
            Slot::Make(ty, make) => (*ty, make()),
            Slot::Once(ty, value) => {
                match value.lock().unwrap().take() {
                    Some(boxed) => (*ty, boxed),
                    None => return Err("was already returned once".to_owned())
                }
            }
        };
        boxed.downcast::<T>()
            .map(|b| *b)
            .map_err(|_| format!("is a `{}`, not a `{}`", ty, type_name::<T>()))
    }
}

impl fmt::Debug for Ret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.0 {
            Slot::Nil => f.write_str("Ret(nil)"),
            Slot::Make(ty, _) | Slot::Once(ty, _) => write!(f, "Ret({})", ty)
        }
    }
}

/// The ordered return values of one mocked call.
#[derive(Clone, Debug, Default)]
pub struct Rets {
    method: String,
    values: Vec<Ret>,
}

impl Rets {
    pub fn new(values: Vec<Ret>) -> Self {
        Rets { method: String::new(), values }
    }

    /// Name of the method which produced these values, if known.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn get(&self, index: usize) -> Option<&Ret> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn named(mut self, method: &str) -> Self {
        self.method = method.to_owned();
        self
    }
}

impl FromIterator<Ret> for Rets {
    fn from_iter<I: IntoIterator<Item = Ret>>(iter: I) -> Self {
        Rets::new(iter.into_iter().collect())
    }
}

/// Conversion from a tuple of plain values into [`Rets`].
///
/// Used by spy closures, which return the real implementation's results.
/// Each value may be unpacked once.
pub trait IntoRets {
    fn into_rets(self) -> Rets;
}

impl IntoRets for Rets {
    fn into_rets(self) -> Rets {
        self
    }
}

macro_rules! into_rets {
    ($($t:ident)*) => {
        impl<$($t: Send + 'static,)*> IntoRets for ($($t,)*) {
            #[allow(non_snake_case)]
            fn into_rets(self) -> Rets {
                let ($($t,)*) = self;
                Rets::new(vec![$(Ret::once($t),)*])
            }
        }
    }
}

into_rets!();
into_rets!(A);
into_rets!(A B);
into_rets!(A B C);
into_rets!(A B C D);
into_rets!(A B C D E);
into_rets!(A B C D E F);
into_rets!(A B C D E F G);
into_rets!(A B C D E F G H);

/// Unpack return value `index` as a `T`.
///
/// # Panics
///
/// If the slot does not exist, was never set, or holds another type.
pub fn as_value<T: 'static>(rets: &Rets, index: usize) -> T {
    let method = if rets.method.is_empty() { "?" } else { &rets.method };
    let ret = rets.values.get(index).unwrap_or_else(|| {
        panic!("Method '{}' has {} return value(s), wanted index {}",
            method, rets.values.len(), index)
    });
    match ret.take::<T>() {
        Ok(v) => v,
        Err(e) => panic!("Return value {} of method '{}' {}", index, method, e)
    }
}

pub fn as1<T1: 'static>(rets: &Rets) -> T1 {
    as_value(rets, 0)
}

pub fn as2<T1: 'static, T2: 'static>(rets: &Rets) -> (T1, T2) {
    (as_value(rets, 0), as_value(rets, 1))
}

pub fn as3<T1, T2, T3>(rets: &Rets) -> (T1, T2, T3)
    where T1: 'static, T2: 'static, T3: 'static
{
    (as_value(rets, 0), as_value(rets, 1), as_value(rets, 2))
}

pub fn as4<T1, T2, T3, T4>(rets: &Rets) -> (T1, T2, T3, T4)
    where T1: 'static, T2: 'static, T3: 'static, T4: 'static
{
    (as_value(rets, 0), as_value(rets, 1), as_value(rets, 2),
     as_value(rets, 3))
}

/// The error produced by error recipes, see
/// [`MockMethods::on_all_methods`](crate::MockMethods::on_all_methods).
///
/// Error types opt in to error recipes with `From<MockError>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MockError {
    message: String,
}

impl MockError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        MockError { message: message.into() }
    }
}

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str("mock error")
        } else {
            f.write_str(&self.message)
        }
    }
}

impl Error for MockError {}

impl From<MockError> for io::Error {
    fn from(e: MockError) -> io::Error {
        io::Error::new(io::ErrorKind::Other, e)
    }
}

impl From<MockError> for String {
    fn from(e: MockError) -> String {
        e.to_string()
    }
}

#[cfg(test)]
mod t {
    use super::*;

    #[test]
    fn arg_is_not_wrapped_twice() {
        let arg = Arg::new(5u32);
        let again = Arg::new(arg.clone());
        assert_eq!(again.downcast_ref::<u32>(), Some(&5));
    }

    #[test]
    fn strings_compare_equal() {
        assert_eq!(Arg::new("a"), Arg::new(String::from("a")));
        assert_ne!(Arg::new("a"), Arg::new(String::from("b")));
        assert_ne!(Arg::new(1u8), Arg::new(1u16));
    }

    #[test]
    fn into_rets() {
        let rets = (1u8, String::from("x")).into_rets();
        assert_eq!(rets.len(), 2);
        assert_eq!(as2::<u8, String>(&rets), (1, String::from("x")));
        assert!(().into_rets().is_empty());
    }

    #[test]
    fn mock_error() {
        assert_eq!(MockError::default().to_string(), "mock error");
        let e: io::Error = MockError::new("boom").into();
        assert_eq!(e.to_string(), "boom");
    }
}
