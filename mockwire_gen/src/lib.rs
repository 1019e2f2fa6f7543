// vim: tw=80
//! Mock source generator for Mockwire
//!
//! Given a trait declaration, `mockwire_gen` writes the Rust source of a mock
//! struct implementing that trait on top of `mockwire::MockMethods`.  It is
//! meant to be driven from a build script or a small test that checks the
//! generated file in.
//!
//! ```
//! # use mockwire_gen::*;
//! let src = r#"
//!     use std::time::Duration;
//!     pub trait Clock {
//!         fn sleep(&self, d: Duration);
//!     }
//! "#;
//! let iface = Interface::parse(src, "Clock", "crate::clock").unwrap();
//! let code = String::from_utf8(generate_to_buffer(&iface, &Options::new())
//!     .unwrap()).unwrap();
//! assert!(code.contains("use std::time;\n"));
//! assert!(code.contains(
//!     "fn sleep(&self, arg1: time::Duration) {\n        \
//!     self.mocks.called(\"sleep\", mockwire::args![arg1]);\n"));
//! ```
//!
//! Output is deterministic: methods are sorted by name and imports are
//! sorted lexically.  It is not checked for validity.  In particular, two
//! imported namespaces ending in the same segment will collide.

use std::{
    collections::BTreeSet,
    error::Error,
    fmt,
    io::{self, BufWriter, Write},
};

mod emit;
mod interface;
mod shape;

pub use crate::emit::GeneratedSource;
pub use crate::interface::{Interface, Method, Receiver};
pub use crate::shape::{package_of, Layer, Terminal, TypeShape, RUNTIME};

#[derive(Debug)]
pub enum GenerateError {
    /// The source could not be parsed
    Parse(syn::Error),
    TraitNotFound(String),
    /// The trait uses a feature that can't be mocked
    Unsupported(String),
    Io(io::Error),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GenerateError::Parse(e) => write!(f, "parse error: {}", e),
            GenerateError::TraitNotFound(name) => {
                write!(f, "trait `{}` not found", name)
            },
            GenerateError::Unsupported(why) => write!(f, "unsupported: {}", why),
            GenerateError::Io(e) => write!(f, "write error: {}", e),
        }
    }
}

impl Error for GenerateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GenerateError::Parse(e) => Some(e),
            GenerateError::Io(e) => Some(e),
            _ => None
        }
    }
}

impl From<syn::Error> for GenerateError {
    fn from(e: syn::Error) -> Self {
        GenerateError::Parse(e)
    }
}

impl From<io::Error> for GenerateError {
    fn from(e: io::Error) -> Self {
        GenerateError::Io(e)
    }
}

/// Generator settings.
#[derive(Clone, Debug)]
pub struct Options {
    namespace: Option<String>,
    prefix: String,
    runtime: String,
    errors: BTreeSet<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            namespace: None,
            prefix: "Mock".to_owned(),
            runtime: RUNTIME.to_owned(),
            errors: BTreeSet::new(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate into this namespace instead of the trait's own.
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_owned());
        self
    }

    /// Prepended to the trait's name to name the mock.  Default `Mock`.
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_owned();
        self
    }

    /// Path of the runtime crate.  Default `mockwire`.
    pub fn runtime(mut self, runtime: &str) -> Self {
        self.runtime = runtime.to_owned();
        self
    }

    /// Declare that the error type at `path`, like `crate::store::StoreError`,
    /// implements `From<MockError>`.
    ///
    /// `Result` outputs with such an error type get an error recipe, used by
    /// `MockMethods::on_all_methods(true)`.  `std::io::Error`, `String` and
    /// `MockError` itself need no declaration.  Results with any other error
    /// type only ever return `Ok`.
    pub fn error_type(mut self, path: &str) -> Self {
        self.errors.insert(path.to_owned());
        self
    }
}

/// Generate the source of a mock for `iface`.
pub fn synthesize(iface: &Interface, opts: &Options) -> GeneratedSource {
    let namespace = opts.namespace.as_deref().unwrap_or(&iface.namespace);
    let def = emit::MockDef::new(iface, namespace, &opts.prefix,
        &opts.runtime, &opts.errors);
    let source = def.write();
    tracing::debug!(trait_name = %iface.name, namespace,
        methods = iface.methods.len(), lines = source.lines().len(),
        "generated mock");
    source
}

fn generate<W: Write>(iface: &Interface, opts: &Options, w: &mut W)
    -> Result<(), GenerateError>
{
    synthesize(iface, opts).write_to(w)?;
    w.flush()?;
    Ok(())
}

/// Generate the source of a mock for `iface` into memory.
pub fn generate_to_buffer(iface: &Interface, opts: &Options)
    -> Result<Vec<u8>, GenerateError>
{
    let mut buf = Vec::new();
    generate(iface, opts, &mut buf)?;
    Ok(buf)
}

/// Generate the source of a mock for `iface` into `w`.
pub fn generate_to_stream<W: Write>(iface: &Interface, opts: &Options, w: W)
    -> Result<(), GenerateError>
{
    generate(iface, opts, &mut BufWriter::new(w))
}
