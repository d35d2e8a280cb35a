// vim: tw=80
//! Type-erased arguments and return values
//!
//! A [`Mock`](crate::Mock) doesn't know the signatures of the methods it
//! stands in for, so everything that crosses its boundary travels as a
//! [`Value`].

use std::{
    fmt,
    rc::Rc
};

use downcast::{downcast, Any};

/// Anything that can be passed to, or returned from, a mock.
///
/// Implemented for every `'static` type that is both `Debug` and
/// `PartialEq`.  There's no need to implement it by hand.
pub trait Argument: Any + fmt::Debug {
    /// Structural equality with an argument of possibly different type.
    /// Arguments of different types are never equal.
    fn dyn_eq(&self, other: &dyn Argument) -> bool;

    /// Full name of the concrete type
    fn dyn_type_name(&self) -> &'static str;
}

downcast!(dyn Argument);

impl<T> Argument for T
    where T: Any + fmt::Debug + PartialEq
{
    fn dyn_eq(&self, other: &dyn Argument) -> bool {
        match other.downcast_ref::<T>() {
            Ok(other) => self == other,
            Err(_) => false
        }
    }

    fn dyn_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A single argument or return value.
///
/// Cloning a `Value` is cheap; clones share the underlying object.
///
/// # Examples
/// ```
/// # use dynmock::*;
/// let v = Value::new(42u32);
/// assert_eq!(Some(&42u32), v.get::<u32>());
/// assert_eq!(None, v.get::<i64>());
/// assert_eq!("<42:u32>", v.to_string());
/// ```
#[derive(Clone)]
pub struct Value(Rc<dyn Argument>);

impl Value {
    /// Wrap an argument.  Wrapping a `Value` returns it unchanged.
    pub fn new<T: Argument>(value: T) -> Self {
        let mut slot = Some(value);
        let any: &mut dyn std::any::Any = &mut slot;
        if let Some(inner) = any.downcast_mut::<Option<Value>>() {
            if let Some(v) = inner.take() {
                return v;
            }
        }
        slot.map(|v| Value(Rc::new(v)))
            .unwrap_or_else(Value::nil)
    }

    /// The value returned by expectations with no configured return value.
    pub fn nil() -> Self {
        Value(Rc::new(()))
    }

    pub fn is_nil(&self) -> bool {
        self.is::<()>()
    }

    /// Does this value hold a `T`?
    pub fn is<T: Argument>(&self) -> bool {
        (*self.0).is::<T>()
    }

    /// Borrow the contents as a `T`, if that's what it holds.
    pub fn get<T: Argument>(&self) -> Option<&T> {
        (*self.0).downcast_ref::<T>().ok()
    }

    /// Name of the contained type, with module paths stripped.  `String`
    /// rather than `alloc::string::String`.
    pub fn type_name(&self) -> String {
        short_type_name((*self.0).dyn_type_name())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Renders as `<value:type>`
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{:?}:{}>", self, self.type_name())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        (*self.0).dyn_eq(&*other.0)
    }
}

/// A closure that a caller hands to a mock alongside its ordinary arguments.
///
/// Mocks receive it as one extra, trailing argument.  See
/// [`Mock::invoke_with_callback`](crate::Mock::invoke_with_callback).
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&[Value]) -> Value>);

impl Callback {
    pub fn new<F>(f: F) -> Self
        where F: Fn(&[Value]) -> Value + 'static
    {
        Callback(Rc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Callback")
    }
}

/// Two callbacks are equal only if they are clones of each other
impl PartialEq for Callback {
    fn eq(&self, other: &Callback) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Render a list of values the way failure messages show them.
pub(crate) fn render(values: &[Value]) -> String {
    values.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Strip the module path from every path segment of a type name, e.g.
/// `alloc::vec::Vec<alloc::string::String>` => `Vec<String>`
pub(crate) fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut word = String::new();
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            word.clear();
        } else if c.is_alphanumeric() || c == '_' {
            word.push(c);
        } else {
            out.push_str(&word);
            word.clear();
            out.push(c);
        }
    }
    out.push_str(&word);
    out
}

#[cfg(test)]
mod t {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn different_types_are_unequal() {
        assert_ne!(Value::new(1i32), Value::new(1i64));
        assert_ne!(Value::new("1"), Value::new(1u8));
    }

    #[test]
    fn downcast_argument() {
        let a: &dyn Argument = &5u8;
        assert!(a.is::<u8>());
        assert!(!a.is::<i8>());
        assert_eq!(Some(&5u8), a.downcast_ref::<u8>().ok());
        assert!(a.downcast_ref::<i8>().is_err());
        assert!(a.dyn_eq(&5u8));
        assert!(!a.dyn_eq(&6u8));
        assert!(!a.dyn_eq(&5i8));
    }

    #[test]
    fn equal_contents_are_equal() {
        assert_eq!(Value::new(String::from("x")),
                   Value::new(String::from("x")));
        assert_eq!(Value::new(vec![1, 2]), Value::new(vec![1, 2]));
    }

    #[test]
    fn callback_equality_is_identity() {
        let c = Callback::new(|_| Value::nil());
        let d = Callback::new(|_| Value::nil());
        assert_eq!(c, c.clone());
        assert_ne!(c, d);
    }

    #[test]
    fn callback_call() {
        let c = Callback::new(|args| Value::new(args.len()));
        let r = c.call(&[Value::nil(), Value::nil()]);
        assert_eq!(Some(&2usize), r.get::<usize>());
    }

    #[test]
    fn nil() {
        assert!(Value::nil().is_nil());
        assert!(Value::new(()).is_nil());
        assert!(!Value::new(0).is_nil());
    }

    #[test]
    fn rewrapping_is_a_noop() {
        let v = Value::new(5u16);
        let w = Value::new(v.clone());
        assert_eq!(v, w);
        assert_eq!(Some(&5u16), w.get::<u16>());
    }

    #[test]
    fn render_list() {
        let values = [Value::new(1), Value::new("a"), Value::new(String::new())];
        assert_eq!(r#"<1:i32>, <"a":&str>, <"":String>"#, render(&values));
    }

    #[test]
    fn short_names() {
        assert_eq!("u32", short_type_name("u32"));
        assert_eq!("String", short_type_name("alloc::string::String"));
        assert_eq!("Vec<String>",
                   short_type_name("alloc::vec::Vec<alloc::string::String>"));
        assert_eq!("(i32, &str)", short_type_name("(i32, &str)"));
        assert_eq!("Option<&[u8]>",
                   short_type_name("core::option::Option<&[u8]>"));
    }
}
