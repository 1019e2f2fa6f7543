// vim: tw=80
//! Trait descriptions, and how to get them from Rust source.

use proc_macro2::TokenStream;
use quote::ToTokens;
use std::collections::BTreeMap;
use syn::{
    FnArg, GenericArgument, Item, PathArguments, ReturnType, TraitItem,
    TraitItemFn, Type, TypeParamBound, UseTree,
};

use crate::{
    shape::{package_of, Layer, TypeShape, MAP_NAMESPACE, PRELUDE, RUNTIME},
    GenerateError,
};

/// How a method takes `self`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Receiver {
    /// `&self`
    Ref,
    /// `&mut self`
    RefMut,
    /// `self`
    Value,
}

impl Receiver {
    pub(crate) fn render(self) -> &'static str {
        match self {
            Receiver::Ref => "&self",
            Receiver::RefMut => "&mut self",
            Receiver::Value => "self",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub receiver: Receiver,
    pub inputs: Vec<TypeShape>,
    pub outputs: Vec<TypeShape>,
    /// Is the last input an `impl IntoIterator<Item = T>`?  If so, its shape
    /// in `inputs` is `T`.
    pub variadic: bool,
}

impl Method {
    /// A `&self` method with no arguments and no return values.
    pub fn new(name: &str) -> Self {
        Method {
            name: name.to_owned(),
            receiver: Receiver::Ref,
            inputs: Vec::new(),
            outputs: Vec::new(),
            variadic: false,
        }
    }

    pub fn receiver(mut self, receiver: Receiver) -> Self {
        self.receiver = receiver;
        self
    }

    pub fn input(mut self, shape: TypeShape) -> Self {
        self.inputs.push(shape);
        self
    }

    /// Add a trailing `impl IntoIterator<Item = T>` input, where `item` is
    /// `T`.
    pub fn variadic_input(mut self, item: TypeShape) -> Self {
        self.inputs.push(item);
        self.variadic = true;
        self
    }

    pub fn output(mut self, shape: TypeShape) -> Self {
        self.outputs.push(shape);
        self
    }
}

/// A trait to generate a mock for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    /// Module path of the trait, like `crate::store`
    pub namespace: String,
    pub methods: Vec<Method>,
}

impl Interface {
    pub fn new(name: &str, namespace: &str) -> Self {
        Interface {
            name: name.to_owned(),
            namespace: namespace.to_owned(),
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Describe trait `name`, declared in `source`.  `namespace` is the
    /// module path of `source`.
    ///
    /// # Examples
    /// ```
    /// # use mockwire_gen::*;
    /// let src = "trait Store { fn get(&self, key: &str) -> Option<u32>; }";
    /// let iface = Interface::parse(src, "Store", "crate::store").unwrap();
    /// assert_eq!(iface.methods[0].name, "get");
    /// ```
    pub fn parse(source: &str, name: &str, namespace: &str)
        -> Result<Self, GenerateError>
    {
        let file = syn::parse_file(source)?;
        Self::from_file(&file, name, namespace)
    }

    /// Like [`parse`](Self::parse), for source that is already tokenized.
    pub fn from_tokens(tokens: TokenStream, name: &str, namespace: &str)
        -> Result<Self, GenerateError>
    {
        let file: syn::File = syn::parse2(tokens)?;
        Self::from_file(&file, name, namespace)
    }

    pub fn from_file(file: &syn::File, name: &str, namespace: &str)
        -> Result<Self, GenerateError>
    {
        let scope = Scope::new(file, namespace);
        let item = file.items.iter()
            .find_map(|item| match item {
                Item::Trait(t) if t.ident == name => Some(t),
                _ => None
            }).ok_or_else(|| GenerateError::TraitNotFound(name.to_owned()))?;
        if !item.generics.params.is_empty() {
            return Err(GenerateError::Unsupported(
                format!("trait `{}` is generic", name)));
        }
        let mut methods = Vec::new();
        for ti in &item.items {
            match ti {
                TraitItem::Fn(f) => methods.push(scope.method(f)?),
                other => tracing::debug!(trait_name = name,
                    item = %other.to_token_stream(), "skipping trait item")
            }
        }
        Ok(Interface {
            name: name.to_owned(),
            namespace: namespace.to_owned(),
            methods
        })
    }
}

/// Name resolution within one source file.
struct Scope<'a> {
    namespace: &'a str,
    /// Names brought in by `use` declarations, and their full paths
    uses: BTreeMap<String, String>,
}

fn join(prefix: &str, ident: &str) -> String {
    if prefix.is_empty() {
        ident.to_owned()
    } else {
        format!("{}::{}", prefix, ident)
    }
}

fn collect_uses(tree: &UseTree, prefix: &str,
    uses: &mut BTreeMap<String, String>)
{
    match tree {
        UseTree::Path(p) => {
            collect_uses(&p.tree, &join(prefix, &p.ident.to_string()), uses)
        },
        UseTree::Name(n) if n.ident == "self" => {
            if let Some(last) = prefix.rsplit("::").next() {
                uses.insert(last.to_owned(), prefix.to_owned());
            }
        },
        UseTree::Name(n) => {
            let ident = n.ident.to_string();
            uses.insert(ident.clone(), join(prefix, &ident));
        },
        UseTree::Rename(r) => {
            let full = if r.ident == "self" {
                prefix.to_owned()
            } else {
                join(prefix, &r.ident.to_string())
            };
            uses.insert(r.rename.to_string(), full);
        },
        UseTree::Glob(_) => (),
        UseTree::Group(g) => {
            for tree in &g.items {
                collect_uses(tree, prefix, uses);
            }
        }
    }
}

/// If `ty` is `impl IntoIterator<Item = T>`, return `T`.
fn variadic_item(ty: &Type) -> Option<&Type> {
    let Type::ImplTrait(it) = ty else {
        return None;
    };
    it.bounds.iter().find_map(|bound| {
        let TypeParamBound::Trait(tb) = bound else {
            return None;
        };
        let seg = tb.path.segments.last()?;
        if seg.ident != "IntoIterator" {
            return None;
        }
        let PathArguments::AngleBracketed(ab) = &seg.arguments else {
            return None;
        };
        ab.args.iter().find_map(|arg| match arg {
            GenericArgument::AssocType(at) if at.ident == "Item" => Some(&at.ty),
            _ => None
        })
    })
}

impl<'a> Scope<'a> {
    fn new(file: &syn::File, namespace: &'a str) -> Self {
        let mut uses = BTreeMap::new();
        for item in &file.items {
            if let Item::Use(u) = item {
                collect_uses(&u.tree, "", &mut uses);
            }
        }
        Scope { namespace, uses }
    }

    /// Find the namespace and name that a path refers to.
    fn resolve(&self, segments: &[String]) -> (String, String) {
        let Some((first, rest)) = segments.split_first() else {
            return (String::new(), String::new());
        };
        let mut full: Vec<String> = if first == "self" {
            vec![self.namespace.to_owned()]
        } else if first == "super" {
            let parent = self.namespace.rsplit_once("::")
                .map_or("", |(parent, _)| parent);
            vec![parent.to_owned()]
        } else if let Some(path) = self.uses.get(first) {
            vec![path.clone()]
        } else if rest.is_empty() && PRELUDE.contains(&first.as_str()) {
            return (String::new(), first.clone());
        } else if rest.is_empty() {
            return (self.namespace.to_owned(), first.clone());
        } else {
            vec![first.clone()]
        };
        full.extend(rest.iter().cloned());
        let joined = full.join("::");
        match joined.rsplit_once("::") {
            Some((ns, name)) => (ns.to_owned(), name.to_owned()),
            None => (String::new(), joined)
        }
    }

    fn shape(&self, ty: &Type) -> TypeShape {
        match ty {
            Type::Reference(r) => self.shape(&r.elem)
                .wrap(Layer::Pointer { mutable: r.mutability.is_some() }),
            Type::Slice(s) => self.shape(&s.elem).slice(),
            Type::Path(p) if p.qself.is_none() => self.path_shape(&p.path),
            Type::Tuple(t) => {
                TypeShape::tuple(t.elems.iter().map(|e| self.shape(e)).collect())
            },
            Type::Paren(p) => self.shape(&p.elem),
            Type::Group(g) => self.shape(&g.elem),
            other => TypeShape::verbatim(&other.to_token_stream().to_string())
        }
    }

    fn path_shape(&self, path: &syn::Path) -> TypeShape {
        let Some(last) = path.segments.last() else {
            return TypeShape::verbatim(&path.to_token_stream().to_string());
        };
        let type_args = match &last.arguments {
            PathArguments::None => Vec::new(),
            PathArguments::AngleBracketed(ab) => ab.args.iter()
                .filter_map(|arg| match arg {
                    GenericArgument::Type(ty) => Some(ty),
                    _ => None
                }).collect::<Vec<_>>(),
            PathArguments::Parenthesized(_) => {
                return TypeShape::verbatim(&path.to_token_stream().to_string());
            }
        };
        let segments = path.segments.iter()
            .map(|seg| seg.ident.to_string())
            .collect::<Vec<_>>();
        let (namespace, name) = self.resolve(&segments);
        match (name.as_str(), type_args.as_slice()) {
            ("Vec", [item]) if matches!(namespace.as_str(), "" | "std::vec")
                => self.shape(item).sequence(),
            ("HashMap", [key, value])
                if namespace == MAP_NAMESPACE ||
                    namespace == "std::collections::hash_map"
                => self.shape(value).map(self.shape(key)),
            ("Arg", []) if package_of(&namespace).0 == RUNTIME
                => TypeShape::any(),
            _ => TypeShape::named(&namespace, &name)
                .with_args(type_args.iter().map(|ty| self.shape(ty)).collect())
        }
    }

    fn method(&self, f: &TraitItemFn) -> Result<Method, GenerateError> {
        let sig = &f.sig;
        let name = sig.ident.to_string();
        let unsupported = |why: &str| {
            GenerateError::Unsupported(format!("method `{}` {}", name, why))
        };
        if !sig.generics.params.is_empty() {
            return Err(unsupported("is generic"));
        }
        if sig.asyncness.is_some() {
            return Err(unsupported("is async"));
        }
        let receiver = match sig.receiver() {
            None => return Err(unsupported("has no receiver")),
            Some(r) if r.colon_token.is_some() => {
                return Err(unsupported("has a typed receiver"));
            },
            Some(r) => match (&r.reference, &r.mutability) {
                (Some(_), Some(_)) => Receiver::RefMut,
                (Some(_), None) => Receiver::Ref,
                (None, _) => Receiver::Value
            }
        };
        let typed = sig.inputs.iter()
            .filter_map(|arg| match arg {
                FnArg::Typed(pt) => Some(&*pt.ty),
                FnArg::Receiver(_) => None
            }).collect::<Vec<_>>();
        let mut method = Method::new(&name).receiver(receiver);
        for (i, ty) in typed.iter().enumerate() {
            match variadic_item(ty) {
                Some(item) if i + 1 == typed.len() => {
                    method = method.variadic_input(self.shape(item));
                },
                _ => method = method.input(self.shape(ty))
            }
        }
        method.outputs = match &sig.output {
            ReturnType::Default => Vec::new(),
            ReturnType::Type(_, ty) => match &**ty {
                Type::Tuple(t) if t.elems.len() != 1 => {
                    t.elems.iter().map(|e| self.shape(e)).collect()
                },
                ty => vec![self.shape(ty)]
            }
        };
        Ok(method)
    }
}
