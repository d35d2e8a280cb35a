// vim: tw=80
use std::{
    cell::{Cell, RefCell},
    fmt,
    panic::Location,
    rc::Rc,
    thread
};

use tracing::{debug, trace};

use crate::{
    Argument,
    Callback,
    Error,
    MessageExpectation,
    Result,
    Value,
    expectation::Responder,
    value::{render, short_type_name}
};

/// Configuration for a new [`Mock`].
///
/// # Examples
/// ```
/// # use dynmock::*;
/// let options = MockOptions::new()
///     .permissive(true)
///     .verify_on_drop(false);
/// let mock = Mock::with_options("logger", options);
/// assert!(mock.is_permissive());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MockOptions {
    permissive: bool,
    verify_on_drop: bool,
}

impl MockOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Act as a null object: accept any unexpected message and return the
    /// mock itself.  Off by default.
    pub fn permissive(mut self, permissive: bool) -> Self {
        self.permissive = permissive;
        self
    }

    /// Verify every expectation when the mock is dropped, panicking if any
    /// are unmet.  On by default.
    pub fn verify_on_drop(mut self, verify: bool) -> Self {
        self.verify_on_drop = verify;
        self
    }
}

impl Default for MockOptions {
    fn default() -> Self {
        MockOptions {
            permissive: false,
            verify_on_drop: true
        }
    }
}

struct Inner {
    name: String,
    permissive: bool,
    verify_on_drop: Cell<bool>,
    expectations: RefCell<Vec<Rc<MessageExpectation>>>,
}

impl Inner {
    fn unmet_expectations(&self) -> Vec<Error> {
        self.expectations.borrow()
            .iter()
            .filter_map(|e| e.verify().err())
            .collect()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if !self.verify_on_drop.get() || thread::panicking() {
            return;
        }
        let failures = self.unmet_expectations()
            .into_iter()
            .map(|e| match e.location() {
                Some(l) => format!("{l}: {e}"),
                None => e.to_string()
            })
            .collect::<Vec<_>>();
        if !failures.is_empty() {
            panic!("{}", failures.join("\n"));
        }
    }
}

/// A stand-in object that can receive any message.
///
/// Every call goes through [`invoke`](Mock::invoke), which hands it to the
/// first matching expectation.  Typed call sites can reach it through the
/// stubs generated by [`#[forward]`](crate::forward).
///
/// `Mock` is a handle: clones refer to the same mock.  Its expectations are
/// verified when the last handle is dropped, unless that was disabled with
/// [`MockOptions::verify_on_drop`].
#[derive(Clone)]
pub struct Mock(Rc<Inner>);

impl Mock {
    /// Create a strict mock.  `name` only appears in failure messages.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self::with_options(name, MockOptions::default())
    }

    /// Create a permissive (null object) mock.
    pub fn permissive<S: Into<String>>(name: S) -> Self {
        Self::with_options(name, MockOptions::new().permissive(true))
    }

    pub fn with_options<S: Into<String>>(name: S, options: MockOptions)
        -> Self
    {
        Mock(Rc::new(Inner {
            name: name.into(),
            permissive: options.permissive,
            verify_on_drop: Cell::new(options.verify_on_drop),
            expectations: RefCell::default()
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn is_permissive(&self) -> bool {
        self.0.permissive
    }

    /// Turn the drop-time verification on or off for this mock.
    pub fn set_verify_on_drop(&self, verify: bool) {
        self.0.verify_on_drop.set(verify);
    }

    /// Number of expectations currently declared
    pub fn expectation_count(&self) -> usize {
        self.0.expectations.borrow().len()
    }

    /// Expect this mock to receive `message`.
    ///
    /// The new expectation expects exactly one call with any arguments, and
    /// returns nil.  Configure it with its builder methods.  The caller's
    /// source location is recorded so that verification failures can point
    /// back at it.
    #[track_caller]
    pub fn expect<S: Into<String>>(&self, message: S)
        -> Rc<MessageExpectation>
    {
        self.declare(message.into(), Location::caller(), None)
    }

    /// Expect this mock to receive `message`, and let `block` handle it.
    ///
    /// `block` receives the call's arguments and computes the return value.
    /// The expectation's argument checking and return value settings are
    /// bypassed, though its call count still applies.  Return
    /// [`Error::ExpectationNotMet`] from the block to report a failed
    /// assertion; the caller will see it as an
    /// [`Error::CallExpectationViolated`].
    ///
    /// # Examples
    /// ```
    /// # use dynmock::*;
    /// let mock = Mock::new("validator");
    /// mock.expect_with("check", |args| {
    ///     if args.first().and_then(|v| v.get::<i32>()) == Some(&3) {
    ///         Ok(Value::new(true))
    ///     } else {
    ///         Err(Error::not_met("expected 3"))
    ///     }
    /// });
    /// let e = mock.invoke("check", args![4]).unwrap_err();
    /// assert_eq!("Call expectation violated with: expected 3", e.to_string());
    /// mock.invoke("check", args![3]).unwrap();
    /// ```
    #[track_caller]
    pub fn expect_with<S, F>(&self, message: S, block: F)
        -> Rc<MessageExpectation>
        where S: Into<String>,
              F: FnMut(&[Value]) -> Result<Value> + 'static
    {
        self.declare(message.into(), Location::caller(), Some(Box::new(block)))
    }

    /// Does nothing.  Together with [`receive`](Mock::receive) it allows
    /// writing `mock.should().receive("foo")`.
    pub fn should(&self) -> &Self {
        self
    }

    /// Same as [`expect`](Mock::expect)
    #[track_caller]
    pub fn receive<S: Into<String>>(&self, message: S)
        -> Rc<MessageExpectation>
    {
        self.declare(message.into(), Location::caller(), None)
    }

    /// Same as [`expect_with`](Mock::expect_with)
    #[track_caller]
    pub fn receive_with<S, F>(&self, message: S, block: F)
        -> Rc<MessageExpectation>
        where S: Into<String>,
              F: FnMut(&[Value]) -> Result<Value> + 'static
    {
        self.declare(message.into(), Location::caller(), Some(Box::new(block)))
    }

    fn declare(&self, message: String, location: &'static Location<'static>,
               responder: Option<Responder>) -> Rc<MessageExpectation>
    {
        debug!(mock = %self.0.name, %message, %location,
               "declared expectation");
        let e = Rc::new(MessageExpectation::new(&self.0.name, message,
                                                location, responder));
        self.0.expectations.borrow_mut().push(Rc::clone(&e));
        e
    }

    /// Send `message` to the mock.
    ///
    /// Expectations are checked in the order they were declared, and the
    /// first one that matches both the message and the arguments handles the
    /// call.  If none matches, a permissive mock returns itself, and a strict
    /// one fails with [`Error::UnexpectedMessage`].
    pub fn invoke(&self, message: &str, args: Vec<Value>) -> Result<Value> {
        self.dispatch(message, args, None)
    }

    /// Like [`invoke`](Mock::invoke), but also pass a callback.  It reaches
    /// the matching expectation's return value closure as the last argument.
    ///
    /// # Examples
    /// ```
    /// # use dynmock::*;
    /// let mock = Mock::new("list");
    /// mock.expect("each").and_return_with(|args| {
    ///     let cb = args.last().and_then(|v| v.get::<Callback>()).unwrap();
    ///     cb.call(&args![1, 2, 3])
    /// });
    /// let count = Callback::new(|args| Value::new(args.len()));
    /// let r = mock.invoke_with_callback("each", args![], count).unwrap();
    /// assert_eq!(Some(&3usize), r.get::<usize>());
    /// ```
    pub fn invoke_with_callback(&self, message: &str, args: Vec<Value>,
                                callback: Callback) -> Result<Value>
    {
        self.dispatch(message, args, Some(callback))
    }

    /// Like [`invoke`](Mock::invoke), but convert the answer to a `T`.
    ///
    /// Fails with [`Error::ReturnType`] if the answer isn't a `T`.
    pub fn invoke_as<T>(&self, message: &str, args: Vec<Value>) -> Result<T>
        where T: Argument + Clone
    {
        let value = self.invoke(message, args)?;
        match value.get::<T>() {
            Some(t) => Ok(t.clone()),
            None => Err(Error::ReturnType {
                mock: self.0.name.clone(),
                message: message.to_owned(),
                expected: short_type_name(std::any::type_name::<T>()),
                found: value.to_string()
            })
        }
    }

    fn dispatch(&self, message: &str, args: Vec<Value>,
                callback: Option<Callback>) -> Result<Value>
    {
        // Release the borrow before calling, so expectations may call back
        // into this mock.
        let found = self.0.expectations.borrow()
            .iter()
            .find(|e| e.matches(message, &args))
            .cloned();
        match found {
            Some(e) => {
                trace!(mock = %self.0.name, %message, "matched expectation");
                e.call(args, callback)
            },
            None if self.0.permissive => {
                trace!(mock = %self.0.name, %message,
                       "ignored unexpected message");
                Ok(Value::new(self.clone()))
            },
            None => {
                debug!(mock = %self.0.name, %message, "unexpected message");
                Err(Error::UnexpectedMessage {
                    mock: self.0.name.clone(),
                    message: message.to_owned(),
                    args: render(&args)
                })
            }
        }
    }

    /// Verify every expectation, in declaration order, stopping at the first
    /// failure.
    pub fn verify_all(&self) -> Result<()> {
        for e in self.0.expectations.borrow().iter() {
            e.verify()?;
        }
        Ok(())
    }

    /// Verify every expectation and collect all of the failures.
    pub fn unmet_expectations(&self) -> Vec<Error> {
        self.0.unmet_expectations()
    }

    /// Verify all current expectations, then remove them, whether or not they
    /// were satisfied.
    ///
    /// Afterwards the mock behaves as if it had just been created.
    pub fn checkpoint(&self) -> Result<()> {
        let r = self.verify_all();
        self.0.expectations.borrow_mut().clear();
        r
    }
}

impl fmt::Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Mock")
            .field(&self.0.name)
            .finish()
    }
}

/// Handles are equal if they refer to the same mock
impl PartialEq for Mock {
    fn eq(&self, other: &Mock) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
