// vim: tw=80
//! Forwarding bodies for the basic method shapes.
#![deny(warnings)]

use mockwire_gen::*;
use pretty_assertions::assert_eq;

/// Synthesize a mock of a one-method trait, and return that method's body.
fn body(method: Method) -> Vec<String> {
    let iface = Interface::new("Foo", "crate::foo").method(method);
    let src = synthesize(&iface, &Options::new());
    let lines = src.lines();
    let start = lines.iter()
        .position(|l| l == "impl Foo for MockFoo {")
        .unwrap();
    lines[start + 1..lines.len() - 1].to_vec()
}

#[test]
fn no_args_no_returns() {
    assert_eq!(body(Method::new("frob")), vec![
        "    fn frob(&self) {",
        "        self.mocks.called(\"frob\", Vec::new());",
        "    }",
    ]);
}

#[test]
fn variadic_any() {
    let m = Method::new("frob").variadic_input(TypeShape::any());
    assert_eq!(body(m), vec![
        "    fn frob(&self, arg1: impl IntoIterator<Item = mockwire::Arg>) {",
        "        let mut args: Vec<mockwire::Arg> = Vec::new();",
        "        args.extend(arg1);",
        "        self.mocks.called(\"frob\", args);",
        "    }",
    ]);
}

#[test]
fn variadic_typed() {
    let m = Method::new("frob")
        .input(TypeShape::prelude("str").pointer())
        .variadic_input(TypeShape::prelude("u32"));
    assert_eq!(body(m), vec![
        "    fn frob(&self, arg1: &str, arg2: impl IntoIterator<Item = u32>) {",
        "        let mut args: Vec<mockwire::Arg> = Vec::new();",
        "        args.extend(mockwire::args![arg1.to_owned()]);",
        "        for v in arg2 {",
        "            args.push(mockwire::Arg::new(v));",
        "        }",
        "        self.mocks.called(\"frob\", args);",
        "    }",
    ]);
}

#[test]
fn variadic_borrowed_items() {
    let m = Method::new("frob")
        .variadic_input(TypeShape::prelude("str").pointer());
    let body = body(m);
    assert_eq!(body[3], "            args.push(mockwire::Arg::new(v.to_owned()));");
}

#[test]
fn seven_returns() {
    let mut m = Method::new("frob");
    for ty in ["u8", "u16", "u32", "u64", "i8", "i16", "i32"] {
        m = m.output(TypeShape::prelude(ty));
    }
    let body = body(m);
    assert_eq!(body[1],
        "        let rets = self.mocks.called(\"frob\", Vec::new());");
    assert!(body[2].starts_with("        (mockwire::as_value::<u8>(&rets, 0), "));
    assert!(body[2].ends_with("mockwire::as_value::<i32>(&rets, 6))"));
    assert!(!body[2].contains("as7"));
}

#[test]
fn four_returns() {
    let m = Method::new("frob")
        .receiver(Receiver::RefMut)
        .input(TypeShape::prelude("u8").sequence())
        .output(TypeShape::prelude("u8"))
        .output(TypeShape::prelude("bool"))
        .output(TypeShape::prelude("String"))
        .output(TypeShape::any().sequence());
    assert_eq!(body(m), vec![
        "    fn frob(&mut self, arg1: Vec<u8>) -> (u8, bool, String, Vec<mockwire::Arg>) {",
        "        let rets = self.mocks.called(\"frob\", mockwire::args![arg1]);",
        "        mockwire::as4::<u8, bool, String, Vec<mockwire::Arg>>(&rets)",
        "    }",
    ]);
}

#[test]
fn one_return() {
    let m = Method::new("frob")
        .receiver(Receiver::Value)
        .input(TypeShape::named("crate::foo", "Bar"))
        .output(TypeShape::prelude("u8"));
    assert_eq!(body(m), vec![
        "    fn frob(self, arg1: Bar) -> u8 {",
        "        let rets = self.mocks.called(\"frob\", mockwire::args![arg1]);",
        "        mockwire::as1::<u8>(&rets)",
        "    }",
    ]);
}

#[test]
fn methods_sorted_by_name() {
    let iface = Interface::new("Foo", "crate::foo")
        .method(Method::new("zed"))
        .method(Method::new("alpha"))
        .method(Method::new("mid"));
    let src = synthesize(&iface, &Options::new());
    let names = src.lines()
        .iter()
        .filter_map(|l| l.strip_prefix("            .method(\""))
        .map(|l| l.split('"').next().unwrap().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(names, ["alpha", "mid", "zed"]);
}

#[test]
fn deterministic() {
    let iface = Interface::new("Foo", "crate::foo")
        .method(Method::new("b").input(TypeShape::named("std::time", "Instant")))
        .method(Method::new("a").input(TypeShape::named("std::io", "Error")))
        .method(Method::new("c").output(TypeShape::prelude("u8")
            .map(TypeShape::named("std::net", "IpAddr"))));
    let opts = Options::new().namespace("crate::mocks");
    let first = generate_to_buffer(&iface, &opts).unwrap();
    let second = generate_to_buffer(&iface.clone(), &opts).unwrap();
    assert_eq!(first, second);
    let text = String::from_utf8(first).unwrap();
    let imports = text.lines()
        .filter(|l| l.starts_with("use "))
        .collect::<Vec<_>>();
    assert_eq!(imports, [
        "use crate::foo;",
        "use mockwire;",
        "use std::collections;",
        "use std::io;",
        "use std::net;",
        "use std::time;",
    ]);
}

#[test]
fn custom_runtime_path() {
    let iface = Interface::new("Foo", "crate::foo")
        .method(Method::new("frob").input(TypeShape::any()));
    let opts = Options::new().runtime("crate::support::mockwire");
    let src = synthesize(&iface, &opts).to_string();
    assert!(src.contains("use crate::support::mockwire;\n"));
    assert!(src.contains("fn frob(&self, arg1: mockwire::Arg) {\n"));
}

const FALLIBLE: &str = r#"
pub struct MyErr;
pub struct NoDefault;

pub trait Foo {
    fn f(&self) -> Result<u8, MyErr>;
    fn g(&self) -> Result<NoDefault, MyErr>;
    fn h(&self) -> Result<u8, std::io::Error>;
}
"#;

/// Results whose error type can't be made from a `MockError` get no error
/// recipe.
#[test]
fn undeclared_error_type() {
    let iface = Interface::parse(FALLIBLE, "Foo", "crate::foo").unwrap();
    let src = synthesize(&iface, &Options::new()).to_string();
    assert!(src.contains(
        ".method(\"f\", 0, vec![mockwire::Output::ok::<u8, MyErr>()])\n"));
    assert!(src.contains(".method(\"g\", 0, \
        vec![mockwire::Output::opaque::<Result<NoDefault, MyErr>>()])\n"));
    assert!(src.contains(".method(\"h\", 0, \
        vec![mockwire::Output::result::<u8, io::Error>()])\n"));
}

#[test]
fn declared_error_type() {
    let iface = Interface::parse(FALLIBLE, "Foo", "crate::foo").unwrap();
    let opts = Options::new().error_type("crate::foo::MyErr");
    let src = synthesize(&iface, &opts).to_string();
    assert!(src.contains(
        ".method(\"f\", 0, vec![mockwire::Output::result::<u8, MyErr>()])\n"));
    assert!(src.contains(".method(\"g\", 0, \
        vec![mockwire::Output::fallible::<NoDefault, MyErr>()])\n"));
}

/// A declared type only matches by its full path
#[test]
fn error_type_elsewhere() {
    let iface = Interface::parse(FALLIBLE, "Foo", "crate::foo").unwrap();
    let opts = Options::new().error_type("crate::bar::MyErr");
    let src = synthesize(&iface, &opts).to_string();
    assert!(src.contains("mockwire::Output::ok::<u8, MyErr>()"));
}
