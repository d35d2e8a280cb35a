// vim: tw=80
//! A single expected message: its argument constraint, call count and return
//! value.

use std::{
    cell::{Cell, RefCell},
    fmt,
    panic::Location,
    rc::Rc,
};

use bitflags::bitflags;
use predicates::prelude::*;
use predicates_tree::CaseTreeExt;
use tracing::{debug, trace};

use crate::{
    Callback,
    Error,
    Result,
    Value,
    value::render
};

/// How many times an expectation should be called
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Expected {
    Exactly(usize),
    AtLeastOnce,
    AnyNumber,
}

/// Renders as the phrase used in failure messages, like "twice"
impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expected::Exactly(0) => f.write_str("never"),
            Expected::Exactly(1) => f.write_str("once"),
            Expected::Exactly(2) => f.write_str("twice"),
            Expected::Exactly(n) => write!(f, "{n} times"),
            Expected::AtLeastOnce => f.write_str("at least once"),
            Expected::AnyNumber => f.write_str("any number of times"),
        }
    }
}

/// The word `once`, as in `at().least(Once)`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Once;

#[derive(Debug)]
struct Times {
    /// How many times has the expectation already been called?
    count: Cell<usize>,
    expected: Cell<Expected>,
}

impl Times {
    /// Record one call and return the new count
    fn call(&self) -> usize {
        let count = self.count.get() + 1;
        self.count.set(count);
        count
    }

    fn count(&self) -> usize {
        self.count.get()
    }

    fn expected(&self) -> Expected {
        self.expected.get()
    }

    fn is_satisfied(&self) -> bool {
        match self.expected.get() {
            Expected::Exactly(n) => self.count.get() == n,
            Expected::AtLeastOnce => self.count.get() > 0,
            Expected::AnyNumber => true
        }
    }

    fn set(&self, expected: Expected) {
        self.expected.set(expected);
    }
}

impl Default for Times {
    fn default() -> Self {
        Times {
            count: Cell::new(0),
            expected: Cell::new(Expected::Exactly(1))
        }
    }
}

/// An expectation's argument constraint
struct Matcher {
    /// `None` matches any arguments
    args: Option<Vec<Value>>,
    pred: Box<dyn Predicate<[Value]>>,
}

impl Matcher {
    fn new(args: Option<Vec<Value>>) -> Self {
        let pred: Box<dyn Predicate<[Value]>> = match &args {
            None => Box::new(predicate::always()),
            Some(a) => Box::new(predicate::eq(a.clone()))
        };
        Matcher{args, pred}
    }

    fn matches(&self, args: &[Value]) -> bool {
        self.pred.eval(args)
    }

    fn verify(&self, mock: &str, message: &str, args: &[Value]) -> Result<()>
    {
        match (&self.args, self.pred.find_case(false, args)) {
            (Some(expected), Some(case)) => Err(Error::ParameterMismatch {
                mock: mock.to_owned(),
                message: message.to_owned(),
                expected: format!("{expected:?}"),
                actual: format!("{args:?}"),
                case: case.tree().to_string()
            }),
            _ => Ok(())
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Matcher::new(None)
    }
}

/// Return functions for expectations
enum Rfunc {
    /// Return nil
    Default,
    Const(Value),
    Mut(Box<dyn FnMut(&[Value]) -> Value>),
    /// Return each value in turn, repeating the last one forever
    Sequence(Vec<Value>),
}

impl Rfunc {
    /// `count` is the number of calls so far, including this one
    fn call_mut(&mut self, args: &[Value], count: usize) -> Value {
        match self {
            Rfunc::Default => Value::nil(),
            Rfunc::Const(v) => v.clone(),
            Rfunc::Mut(f) => f(args),
            Rfunc::Sequence(values) => {
                count.min(values.len())
                    .checked_sub(1)
                    .and_then(|i| values.get(i))
                    .cloned()
                    .unwrap_or_else(Value::nil)
            }
        }
    }
}

/// A closure that replaces an expectation's normal argument checking and
/// return value.
pub(crate) type Responder = Box<dyn FnMut(&[Value]) -> Result<Value>>;

bitflags! {
    /// Connective words of an unfinished count phrase
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    struct Words: u8 {
        const AT = 0b0001;
        const ANY = 0b0010;
        const NUMBER = 0b0100;
        const OF = 0b1000;
    }
}

/// One expected message on a [`Mock`](crate::Mock).
///
/// Created by [`Mock::expect`](crate::Mock::expect) and configured through
/// its builder methods, which may be chained:
///
/// ```
/// # use dynmock::*;
/// let mock = Mock::new("calculator");
/// mock.expect("add")
///     .with_args(args![1, 2])
///     .at().least(Once)
///     .and_return(3);
/// assert_eq!(Some(&3), mock.invoke("add", args![1, 2]).unwrap().get::<i32>());
/// mock.verify_all().unwrap();
/// ```
///
/// Builder methods only record configuration.  Configure an expectation
/// before the code under test calls the mock.  Each one returns a new handle
/// to the same expectation, so a whole chain can be bound to a variable:
///
/// ```
/// # use dynmock::*;
/// let mock = Mock::new("calculator");
/// let e = mock.expect("clear").twice().and_return(0);
/// mock.invoke("clear", args![]).unwrap();
/// assert_eq!(1, e.received());
/// mock.invoke("clear", args![]).unwrap();
/// ```
pub struct MessageExpectation {
    mock: String,
    message: String,
    declared_at: &'static Location<'static>,
    matcher: RefCell<Matcher>,
    times: Times,
    rfunc: RefCell<Rfunc>,
    responder: Option<RefCell<Responder>>,
    words: Cell<Words>,
}

impl MessageExpectation {
    pub(crate) fn new(
        mock: &str,
        message: String,
        declared_at: &'static Location<'static>,
        responder: Option<Responder>) -> Self
    {
        MessageExpectation {
            mock: mock.to_owned(),
            message,
            declared_at,
            matcher: RefCell::default(),
            times: Times::default(),
            rfunc: RefCell::new(Rfunc::Default),
            responder: responder.map(RefCell::new),
            words: Cell::new(Words::empty()),
        }
    }

    /// Simulate calling the real method.
    ///
    /// `callback`, if any, is appended to `args` before the return value is
    /// computed.  Expectations with a response block hand `args` to the block
    /// instead and skip both argument checking and the return value.
    ///
    /// The return value closure or response block runs while this
    /// expectation is busy, so calling the same expectation from inside it
    /// fails with [`Error::Reentered`].
    pub fn call(&self, args: Vec<Value>, callback: Option<Callback>)
        -> Result<Value>
    {
        if let Some(responder) = &self.responder {
            let result = {
                let mut block = responder.try_borrow_mut()
                    .map_err(|_| self.reentered())?;
                (&mut *block)(&args)
            };
            return match result {
                Ok(v) => {
                    self.times.call();
                    Ok(v)
                },
                Err(Error::ExpectationNotMet(reason)) => {
                    Err(Error::CallExpectationViolated {
                        mock: self.mock.clone(),
                        message: self.message.clone(),
                        reason
                    })
                },
                Err(e) => Err(e)
            };
        }

        self.matcher.borrow().verify(&self.mock, &self.message, &args)?;
        let mut rfunc = self.rfunc.try_borrow_mut()
            .map_err(|_| self.reentered())?;
        let mut args = args;
        if let Some(cb) = callback {
            args.push(Value::new(cb));
        }
        let count = self.times.call();
        trace!(mock = %self.mock, message = %self.message, count,
               "expectation called");
        Ok(rfunc.call_mut(&args, count))
    }

    fn reentered(&self) -> Error {
        debug!(mock = %self.mock, message = %self.message,
               "expectation re-entered");
        Error::Reentered {
            mock: self.mock.clone(),
            message: self.message.clone()
        }
    }

    /// Does this expectation accept a `message` with these arguments?
    pub fn matches(&self, message: &str, args: &[Value]) -> bool {
        self.message == message && self.matcher.borrow().matches(args)
    }

    /// Check the number of calls received against the number expected.
    ///
    /// Doesn't change any state, so it may be called repeatedly.
    pub fn verify(&self) -> Result<()> {
        if self.times.is_satisfied() {
            return Ok(());
        }
        let e = Error::UnmetExpectation {
            mock: self.mock.clone(),
            signature: self.signature(),
            expected: self.times.expected(),
            received: self.times.count(),
            location: self.declared_at
        };
        debug!(mock = %self.mock, location = %self.declared_at, "{}", e);
        Err(e)
    }

    /// How the expected call looks in failure messages, e.g. `foo(<1:i32>)`
    fn signature(&self) -> String {
        match &self.matcher.borrow().args {
            None => self.message.clone(),
            Some(args) => format!("{}({})", self.message, render(args))
        }
    }

    /// The name of the expected method
    pub fn message(&self) -> &str {
        &self.message
    }

    /// How many times has this expectation been called so far?
    pub fn received(&self) -> usize {
        self.times.count()
    }

    pub fn expected(&self) -> Expected {
        self.times.expected()
    }

    /// The line of code that declared this expectation
    pub fn declared_at(&self) -> &'static Location<'static> {
        self.declared_at
    }

    /// Only match calls with exactly these arguments.
    ///
    /// Use the [`args!`](crate::args) macro to build the list.
    pub fn with_args(self: &Rc<Self>, args: Vec<Value>) -> Rc<Self> {
        self.matcher.replace(Matcher::new(Some(args)));
        Rc::clone(self)
    }

    /// Match calls with any arguments at all.  This is the default.
    pub fn with_any_args(self: &Rc<Self>) -> Rc<Self> {
        self.matcher.replace(Matcher::new(None));
        Rc::clone(self)
    }

    /// Only match calls that have no arguments.
    pub fn with_no_args(self: &Rc<Self>) -> Rc<Self> {
        self.with_args(Vec::new())
    }

    /// Expect this expectation to be called exactly `n` times.
    pub fn exactly(self: &Rc<Self>, n: usize) -> Rc<Self> {
        self.times.set(Expected::Exactly(n));
        Rc::clone(self)
    }

    /// Forbid this expectation from ever being called.
    pub fn never(self: &Rc<Self>) -> Rc<Self> {
        self.exactly(0)
    }

    /// Expect this expectation to be called exactly once.  This is the
    /// default.
    pub fn once(self: &Rc<Self>) -> Rc<Self> {
        self.exactly(1)
    }

    pub fn twice(self: &Rc<Self>) -> Rc<Self> {
        self.exactly(2)
    }

    /// Shortcut for `at().least(Once)`
    pub fn at_least_once(self: &Rc<Self>) -> Rc<Self> {
        self.times.set(Expected::AtLeastOnce);
        Rc::clone(self)
    }

    /// Shortcut for `any().number().of().times()`
    pub fn any_number_of_times(self: &Rc<Self>) -> Rc<Self> {
        self.times.set(Expected::AnyNumber);
        Rc::clone(self)
    }

    /// Return `value` from every call.
    pub fn and_return<T>(self: &Rc<Self>, value: T) -> Rc<Self>
        where T: crate::Argument
    {
        self.rfunc.replace(Rfunc::Const(Value::new(value)));
        Rc::clone(self)
    }

    /// Return each of `values` in turn.  Once they run out, keep returning
    /// the last one.
    ///
    /// ```
    /// # use dynmock::*;
    /// let mock = Mock::new("dice");
    /// mock.expect("roll").any_number_of_times().and_return_each([6, 2]);
    /// for expected in [6, 2, 2, 2] {
    ///     let v = mock.invoke("roll", args![]).unwrap();
    ///     assert_eq!(Some(&expected), v.get::<i32>());
    /// }
    /// ```
    pub fn and_return_each<I>(self: &Rc<Self>, values: I) -> Rc<Self>
        where I: IntoIterator,
              I::Item: crate::Argument
    {
        let values = values.into_iter().map(Value::new).collect();
        self.rfunc.replace(Rfunc::Sequence(values));
        Rc::clone(self)
    }

    /// Compute the return value from the call's arguments.  A callback passed
    /// by the caller arrives as the last argument.
    ///
    /// `f` may call other expectations of the same mock, but not this one.
    /// A recursive call fails with [`Error::Reentered`].
    pub fn and_return_with<F>(self: &Rc<Self>, f: F) -> Rc<Self>
        where F: FnMut(&[Value]) -> Value + 'static
    {
        self.rfunc.replace(Rfunc::Mut(Box::new(f)));
        Rc::clone(self)
    }

    /// Does nothing.  It only makes declarations read better.
    pub fn and(self: &Rc<Self>) -> Rc<Self> {
        Rc::clone(self)
    }

    /// First word of `at().least(Once)`
    pub fn at(self: &Rc<Self>) -> Rc<Self> {
        self.see(Words::AT);
        Rc::clone(self)
    }

    /// Completes `at().least(Once)`.  Without a preceding `at()` it does
    /// nothing.
    pub fn least(self: &Rc<Self>, _once: Once) -> Rc<Self> {
        if self.take(Words::AT) {
            self.times.set(Expected::AtLeastOnce);
        }
        Rc::clone(self)
    }

    /// First word of `any().number().of().times()`
    pub fn any(self: &Rc<Self>) -> Rc<Self> {
        self.see(Words::ANY);
        Rc::clone(self)
    }

    pub fn number(self: &Rc<Self>) -> Rc<Self> {
        let any = self.take(Words::ANY);
        self.mark(Words::NUMBER, any);
        Rc::clone(self)
    }

    pub fn of(self: &Rc<Self>) -> Rc<Self> {
        let number = self.take(Words::NUMBER);
        self.mark(Words::OF, number);
        Rc::clone(self)
    }

    /// Completes `any().number().of().times()`.  Without the preceding words
    /// it does nothing.
    pub fn times(self: &Rc<Self>) -> Rc<Self> {
        if self.take(Words::OF) {
            self.times.set(Expected::AnyNumber);
        }
        Rc::clone(self)
    }

    fn see(&self, word: Words) {
        self.mark(word, true);
    }

    fn mark(&self, word: Words, value: bool) {
        let mut words = self.words.get();
        words.set(word, value);
        self.words.set(words);
    }

    /// Consume a word, returning whether it had been seen
    fn take(&self, word: Words) -> bool {
        let words = self.words.get();
        self.words.set(words.difference(word));
        words.contains(word)
    }
}

impl fmt::Debug for MessageExpectation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MessageExpectation")
            .field("mock", &self.mock)
            .field("signature", &self.signature())
            .field("expected", &self.times.expected())
            .field("received", &self.times.count())
            .finish_non_exhaustive()
    }
}
