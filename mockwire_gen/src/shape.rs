// vim: tw=80
//! Type shapes: the subset of Rust types that the generator understands.
//!
//! A [`TypeShape`] is a stack of wrapper [`Layer`]s over a [`Terminal`].
//! `&mut Vec<HashMap<String, u32>>` is `Pointer{mutable}`, `Sequence`,
//! `Map(String)` over `u32`.  Anything the generator can't take apart is kept
//! as verbatim tokens.

use std::collections::BTreeSet;

/// Path of the runtime crate that generated mocks use.
pub const RUNTIME: &str = "mockwire";

/// Namespace that `HashMap` is imported from.
pub(crate) const MAP_NAMESPACE: &str = "std::collections";

/// Types in the prelude.  They never need qualifying.
pub(crate) const PRELUDE: &[&str] = &[
    "Box", "Option", "Result", "Self", "String", "Vec",
    "bool", "char", "f32", "f64", "i128", "i16", "i32", "i64", "i8", "isize",
    "str", "u128", "u16", "u32", "u64", "u8", "usize",
];

/// Prelude types whose `Default` impl does not depend on their arguments
const DEFAULT_PRELUDE: &[&str] = &[
    "Option", "String",
    "bool", "char", "f32", "f64", "i128", "i16", "i32", "i64", "i8", "isize",
    "u128", "u16", "u32", "u64", "u8", "usize",
];

/// Other well-known types which implement `Default`
const DEFAULT_STD: &[(&str, &str)] = &[
    ("std::collections", "BTreeMap"),
    ("std::collections", "BTreeSet"),
    ("std::collections", "HashSet"),
    ("std::collections", "VecDeque"),
    ("std::time", "Duration"),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Layer {
    /// `&T` or `&mut T`
    Pointer { mutable: bool },
    /// `Vec<T>`
    Sequence,
    /// `[T]`
    Slice,
    /// `HashMap<K, T>`
    Map(Box<TypeShape>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Terminal {
    /// A named type, possibly generic.  An empty namespace means the prelude.
    Named {
        namespace: String,
        name: String,
        args: Vec<TypeShape>,
    },
    Tuple(Vec<TypeShape>),
    /// The runtime's dynamically typed `Arg`
    Any,
    Verbatim(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeShape {
    /// Outermost first
    pub layers: Vec<Layer>,
    pub terminal: Terminal,
}

impl TypeShape {
    pub fn named(namespace: &str, name: &str) -> Self {
        Self::terminal(Terminal::Named {
            namespace: namespace.to_owned(),
            name: name.to_owned(),
            args: Vec::new(),
        })
    }

    /// A prelude type, like `u32` or `String`.
    pub fn prelude(name: &str) -> Self {
        Self::named("", name)
    }

    pub fn any() -> Self {
        Self::terminal(Terminal::Any)
    }

    pub fn tuple(elems: Vec<TypeShape>) -> Self {
        Self::terminal(Terminal::Tuple(elems))
    }

    pub fn verbatim(tokens: &str) -> Self {
        Self::terminal(Terminal::Verbatim(tokens.to_owned()))
    }

    fn terminal(terminal: Terminal) -> Self {
        TypeShape { layers: Vec::new(), terminal }
    }

    /// Set the generic arguments of a named type.
    pub fn with_args(mut self, new_args: Vec<TypeShape>) -> Self {
        if let Terminal::Named { args, .. } = &mut self.terminal {
            *args = new_args;
        }
        self
    }

    /// Wrap in a new outermost layer.
    pub fn wrap(mut self, layer: Layer) -> Self {
        self.layers.insert(0, layer);
        self
    }

    pub fn pointer(self) -> Self {
        self.wrap(Layer::Pointer { mutable: false })
    }

    pub fn sequence(self) -> Self {
        self.wrap(Layer::Sequence)
    }

    pub fn slice(self) -> Self {
        self.wrap(Layer::Slice)
    }

    pub fn map(self, key: TypeShape) -> Self {
        self.wrap(Layer::Map(Box::new(key)))
    }

    /// Is this the bare `Arg` type?
    pub fn is_any(&self) -> bool {
        self.layers.is_empty() && self.terminal == Terminal::Any
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.layers.first(), Some(Layer::Pointer { .. }))
    }

    /// Does this type implement `Default`, as far as we can tell?
    pub fn has_default(&self) -> bool {
        match self.layers.first() {
            Some(Layer::Sequence) | Some(Layer::Map(_)) => true,
            Some(Layer::Pointer { .. }) | Some(Layer::Slice) => false,
            None => match &self.terminal {
                Terminal::Named { namespace, name, args } => {
                    if namespace.is_empty() {
                        DEFAULT_PRELUDE.contains(&name.as_str()) ||
                            (name == "Box" &&
                             args.len() == 1 &&
                             args[0].has_default())
                    } else {
                        DEFAULT_STD.contains(&(namespace.as_str(),
                                               name.as_str()))
                    }
                },
                Terminal::Tuple(elems) => elems.iter().all(Self::has_default),
                Terminal::Any | Terminal::Verbatim(_) => false
            }
        }
    }

    /// The namespace and name of a bare, non-generic named type.
    pub fn path(&self) -> Option<(&str, &str)> {
        match &self.terminal {
            Terminal::Named { namespace, name, args }
                if self.layers.is_empty() && args.is_empty()
                => Some((namespace.as_str(), name.as_str())),
            _ => None
        }
    }

    /// If this is a `Result<T, E>`, return `T` and `E`.
    pub fn as_result(&self) -> Option<(&TypeShape, &TypeShape)> {
        if !self.layers.is_empty() {
            return None;
        }
        match &self.terminal {
            Terminal::Named { namespace, name, args }
                if namespace.is_empty() && name == "Result" && args.len() == 2
                => Some((&args[0], &args[1])),
            _ => None
        }
    }

    /// Add every namespace that rendering this shape may refer to.
    pub(crate) fn namespaces(&self, runtime: &str, out: &mut BTreeSet<String>) {
        for layer in &self.layers {
            if let Layer::Map(key) = layer {
                out.insert(MAP_NAMESPACE.to_owned());
                key.namespaces(runtime, out);
            }
        }
        match &self.terminal {
            Terminal::Named { namespace, args, .. } => {
                if !namespace.is_empty() {
                    out.insert(namespace.clone());
                }
                for arg in args {
                    arg.namespaces(runtime, out);
                }
            },
            Terminal::Tuple(elems) => {
                for elem in elems {
                    elem.namespaces(runtime, out);
                }
            },
            Terminal::Any => {
                out.insert(runtime.to_owned());
            },
            Terminal::Verbatim(_) => ()
        }
    }

    pub(crate) fn render(&self, ctx: &Ctx) -> String {
        render_layers(&self.layers, &self.terminal, ctx)
    }
}

fn render_layers(layers: &[Layer], terminal: &Terminal, ctx: &Ctx) -> String {
    let Some((layer, rest)) = layers.split_first() else {
        return terminal.render(ctx);
    };
    let inner = render_layers(rest, terminal, ctx);
    match layer {
        Layer::Pointer { mutable: false } => format!("&{}", inner),
        Layer::Pointer { mutable: true } => format!("&mut {}", inner),
        Layer::Sequence => format!("Vec<{}>", inner),
        Layer::Slice => format!("[{}]", inner),
        Layer::Map(key) => format!("{}<{}, {}>",
            ctx.qualify(MAP_NAMESPACE, "HashMap"), key.render(ctx), inner)
    }
}

impl Terminal {
    fn render(&self, ctx: &Ctx) -> String {
        match self {
            Terminal::Named { namespace, name, args } => {
                let name = ctx.qualify(namespace, name);
                if args.is_empty() {
                    name
                } else {
                    format!("{}<{}>", name, render_list(args, ctx))
                }
            },
            Terminal::Tuple(elems) if elems.len() == 1 => {
                format!("({},)", elems[0].render(ctx))
            },
            Terminal::Tuple(elems) => format!("({})", render_list(elems, ctx)),
            Terminal::Any => ctx.qualify(&ctx.runtime, "Arg"),
            Terminal::Verbatim(tokens) => tokens.clone()
        }
    }
}

pub(crate) fn render_list(shapes: &[TypeShape], ctx: &Ctx) -> String {
    shapes.iter()
        .map(|s| s.render(ctx))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Split a namespace into the package name it is referred to by, and
/// whether it is a single-segment (crate-level) namespace.
///
/// The package name is the last path segment, or the one before it if the
/// last is a version marker like `v2`.
pub fn package_of(namespace: &str) -> (&str, bool) {
    if namespace.is_empty() {
        return ("", true);
    }
    let segments = namespace.split("::").collect::<Vec<_>>();
    match segments.as_slice() {
        [single] => (*single, true),
        [.., prev, last] if is_version(last) => (*prev, false),
        [.., last] => (*last, false),
        [] => ("", true)
    }
}

/// `crate`, `self` or `super`
fn is_path_root(namespace: &str) -> bool {
    matches!(namespace, "crate" | "self" | "super")
}

fn is_version(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next() == Some('v') &&
        segment.len() > 1 &&
        chars.all(|c| c.is_ascii_digit())
}

/// Where generated code lives, and how it refers to the runtime.
pub(crate) struct Ctx {
    /// Package name of the namespace being generated into
    pub target: String,
    /// Namespace of the runtime crate
    pub runtime: String,
}

impl Ctx {
    pub fn new(namespace: &str, runtime: &str) -> Self {
        Ctx {
            target: package_of(namespace).0.to_owned(),
            runtime: runtime.to_owned()
        }
    }

    /// Refer to `name` from `namespace`, from inside the target namespace.
    pub fn qualify(&self, namespace: &str, name: &str) -> String {
        let (pkg, _) = package_of(namespace);
        if pkg.is_empty() || pkg == self.target {
            name.to_owned()
        } else {
            format!("{}::{}", pkg, name)
        }
    }

    /// Refer to an item of the runtime crate.
    pub fn rt(&self, item: &str) -> String {
        self.qualify(&self.runtime, item)
    }

    /// Should `namespace` be imported?  Path roots like `crate` can't be, so
    /// their items are always referred to by their full path.
    pub fn imports(&self, namespace: &str) -> bool {
        let (pkg, core) = package_of(namespace);
        !namespace.is_empty() &&
            !is_path_root(namespace) &&
            (core || pkg != self.target || namespace == self.runtime)
    }
}

/// The `use` declaration that makes `namespace`'s package name available.
pub(crate) fn import_line(namespace: &str) -> String {
    let (pkg, _) = package_of(namespace);
    let last = namespace.rsplit("::").next().unwrap_or(namespace);
    if pkg == last {
        format!("use {};", namespace)
    } else {
        format!("use {} as {};", namespace, pkg)
    }
}
