// vim: tw=80
//! Mock source emission.

use std::{
    collections::BTreeSet,
    fmt,
    io::{self, Write},
};

use crate::{
    interface::{Interface, Method},
    shape::{import_line, package_of, render_list, Ctx, TypeShape},
};

/// Generated Rust source, one line per entry, without line terminators.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratedSource {
    lines: Vec<String>,
}

impl GeneratedSource {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Write every line, each followed by `\n`.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for line in &self.lines {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl fmt::Display for GeneratedSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Writer {
    lines: Vec<String>,
}

impl Writer {
    fn line<S: Into<String>>(&mut self, indent: usize, s: S) {
        let s = s.into();
        if s.is_empty() {
            self.lines.push(s);
        } else {
            self.lines.push(format!("{:width$}{}", "", s, width = indent * 4));
        }
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }
}

/// Everything needed to write one mock struct.
pub(crate) struct MockDef<'a> {
    iface: &'a Interface,
    ctx: Ctx,
    /// Name of the mock struct
    name: String,
    /// Sorted by name
    methods: Vec<&'a Method>,
    /// Namespace being generated into, as given
    namespace: String,
    /// Full paths of user error types which implement `From<MockError>`
    errors: &'a BTreeSet<String>,
}

impl<'a> MockDef<'a> {
    pub fn new(iface: &'a Interface, namespace: &str, prefix: &str,
        runtime: &str, errors: &'a BTreeSet<String>) -> Self
    {
        let mut methods = iface.methods.iter().collect::<Vec<_>>();
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        MockDef {
            iface,
            ctx: Ctx::new(namespace, runtime),
            name: format!("{}{}", prefix, iface.name),
            methods,
            namespace: namespace.to_owned(),
            errors,
        }
    }

    fn imports(&self) -> BTreeSet<String> {
        let mut namespaces = BTreeSet::new();
        namespaces.insert(self.ctx.runtime.clone());
        namespaces.insert(self.iface.namespace.clone());
        for method in &self.methods {
            for shape in method.inputs.iter().chain(&method.outputs) {
                shape.namespaces(&self.ctx.runtime, &mut namespaces);
            }
        }
        namespaces.iter()
            .filter(|ns| self.ctx.imports(ns))
            .map(|ns| import_line(ns))
            .collect()
    }

    pub fn write(&self) -> GeneratedSource {
        let mut w = Writer::default();
        let name = &self.name;
        let rt = |item: &str| self.ctx.rt(item);
        let trait_path = self.ctx.qualify(&self.iface.namespace,
            &self.iface.name);

        w.line(0, format!("// @generated by mockwire_gen for `{}` in `{}`.  \
            Do not edit.", self.iface.name, self.namespace));
        w.blank();
        for import in self.imports() {
            w.line(0, import);
        }
        w.blank();
        w.line(0, "#[derive(Debug)]");
        w.line(0, format!("pub struct {} {{", name));
        w.line(1, format!("mocks: {},", rt("MockMethods")));
        w.line(0, "}");
        w.blank();
        w.line(0, format!("impl {} {{", name));
        w.line(1, "pub fn new() -> Self {");
        w.line(2, "Self {");
        w.line(3, format!("mocks: {}(Self::method_set()),",
            rt("MockMethods::of")));
        w.line(2, "}");
        w.line(1, "}");
        w.blank();
        w.line(1, format!("pub fn method_set() -> {} {{", rt("MethodSet")));
        w.line(2, format!("{}()", rt("MethodSet::new")));
        for method in &self.methods {
            let outputs = method.outputs.iter()
                .map(|shape| self.output_recipe(shape))
                .collect::<Vec<_>>()
                .join(", ");
            w.line(3, format!(".method(\"{}\", {}, vec![{}])", method.name,
                method.inputs.len(), outputs));
        }
        w.line(1, "}");
        w.line(0, "}");
        w.blank();
        w.line(0, format!("impl Default for {} {{", name));
        w.line(1, "fn default() -> Self {");
        w.line(2, "Self::new()");
        w.line(1, "}");
        w.line(0, "}");
        w.blank();
        w.line(0, format!("impl std::ops::Deref for {} {{", name));
        w.line(1, format!("type Target = {};", rt("MockMethods")));
        w.blank();
        w.line(1, "fn deref(&self) -> &Self::Target {");
        w.line(2, "&self.mocks");
        w.line(1, "}");
        w.line(0, "}");
        w.blank();
        w.line(0, format!("impl std::ops::DerefMut for {} {{", name));
        w.line(1, "fn deref_mut(&mut self) -> &mut Self::Target {");
        w.line(2, "&mut self.mocks");
        w.line(1, "}");
        w.line(0, "}");
        w.blank();
        w.line(0, "// make sure the mock implements the trait");
        w.line(0, "const _: fn() = || {");
        w.line(1, format!("fn implements<T: ?Sized + {}>() {{}}", trait_path));
        w.line(1, format!("implements::<{}>();", name));
        w.line(0, "};");
        w.blank();
        w.line(0, format!("impl {} for {} {{", trait_path, name));
        for (i, method) in self.methods.iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            self.write_method(&mut w, method);
        }
        w.line(0, "}");
        GeneratedSource { lines: w.lines }
    }

    /// Can a `MockError` be converted into `err`?
    fn converts(&self, err: &TypeShape) -> bool {
        let Some((namespace, name)) = err.path() else {
            return false;
        };
        match (namespace, name) {
            ("std::io", "Error") | ("", "String") => true,
            (ns, "MockError") if package_of(ns).0 ==
                package_of(&self.ctx.runtime).0 => true,
            ("", name) => self.errors.contains(name),
            (ns, name) => self.errors.contains(&format!("{}::{}", ns, name))
        }
    }

    /// The `Output` recipe describing `shape` in the method set.
    fn output_recipe(&self, shape: &TypeShape) -> String {
        let recipe = |kind: &str, types: String| {
            format!("{}::<{}>()", self.ctx.rt(&format!("Output::{}", kind)),
                types)
        };
        let pair = |ok: &TypeShape, err: &TypeShape| {
            format!("{}, {}", ok.render(&self.ctx), err.render(&self.ctx))
        };
        match shape.as_result() {
            Some((ok, err)) if self.converts(err) => {
                let kind = if ok.has_default() { "result" } else { "fallible" };
                recipe(kind, pair(ok, err))
            },
            Some((ok, err)) if ok.has_default() => recipe("ok", pair(ok, err)),
            _ if shape.has_default() => {
                recipe("value", shape.render(&self.ctx))
            },
            _ => recipe("opaque", shape.render(&self.ctx))
        }
    }

    fn write_method(&self, w: &mut Writer, method: &Method) {
        let rt = |item: &str| self.ctx.rt(item);
        let n = method.inputs.len();
        let params = method.inputs.iter()
            .enumerate()
            .map(|(i, shape)| {
                let ty = shape.render(&self.ctx);
                if method.variadic && i + 1 == n {
                    format!(", arg{}: impl IntoIterator<Item = {}>", i + 1, ty)
                } else {
                    format!(", arg{}: {}", i + 1, ty)
                }
            }).collect::<String>();
        let ret = match method.outputs.len() {
            0 => String::new(),
            1 => format!(" -> {}", method.outputs[0].render(&self.ctx)),
            _ => format!(" -> ({})", render_list(&method.outputs, &self.ctx))
        };
        w.line(1, format!("fn {}({}{}){} {{", method.name,
            method.receiver.render(), params, ret));

        let variadic = method.inputs.last().filter(|_| method.variadic);
        let fixed = n - usize::from(variadic.is_some());
        let recorded = method.inputs[..fixed].iter()
            .enumerate()
            .map(|(i, shape)| owned(&format!("arg{}", i + 1), shape))
            .collect::<Vec<_>>()
            .join(", ");
        let bind = if method.outputs.is_empty() { "" } else { "let rets = " };
        if let Some(last) = variadic {
            w.line(2, format!("let mut args: Vec<{}> = Vec::new();", rt("Arg")));
            if fixed > 0 {
                w.line(2, format!("args.extend({}[{}]);", rt("args!"), recorded));
            }
            if last.is_any() {
                w.line(2, format!("args.extend(arg{});", n));
            } else {
                w.line(2, format!("for v in arg{} {{", n));
                w.line(3, format!("args.push({}({}));", rt("Arg::new"),
                    owned("v", last)));
                w.line(2, "}");
            }
            w.line(2, format!("{}self.mocks.called(\"{}\", args);", bind,
                method.name));
        } else if n > 0 {
            w.line(2, format!("{}self.mocks.called(\"{}\", {}[{}]);", bind,
                method.name, rt("args!"), recorded));
        } else {
            w.line(2, format!("{}self.mocks.called(\"{}\", Vec::new());", bind,
                method.name));
        }

        let outputs = &method.outputs;
        match outputs.len() {
            0 => (),
            k @ 1..=4 => {
                w.line(2, format!("{}::<{}>(&rets)", rt(&format!("as{}", k)),
                    render_list(outputs, &self.ctx)));
            },
            _ => {
                let unpacked = outputs.iter()
                    .enumerate()
                    .map(|(i, shape)| format!("{}::<{}>(&rets, {})",
                        rt("as_value"), shape.render(&self.ctx), i))
                    .collect::<Vec<_>>()
                    .join(", ");
                w.line(2, format!("({})", unpacked));
            }
        }
        w.line(1, "}");
    }
}

/// How to record argument `name`: borrowed arguments are recorded by value.
fn owned(name: &str, shape: &TypeShape) -> String {
    if shape.is_pointer() {
        format!("{}.to_owned()", name)
    } else {
        name.to_owned()
    }
}
