// vim: tw=80
//! Dynamically dispatched mock objects for Rust.
//!
//! A [`Mock`] is a stand-in object that can receive any message.  In your
//! test you tell it which messages to expect, with which arguments, how many
//! times, and what to return.  When the test is over the mock checks that
//! every expectation was met.
//!
//! # Usage
//!
//! * Create a mock with [`Mock::new`], or [`Mock::permissive`] for a null
//!   object that silently accepts anything.
//! * Declare expectations with [`Mock::expect`].  Each one has an optional
//!   argument constraint, an expected call count (exactly once by default)
//!   and a return value (nil by default).
//! * Hand the mock to the code under test.  Calls reach it either through
//!   [`Mock::invoke`] or through a trait implementation generated by
//!   [`#[forward]`](forward).
//! * Expectations are verified when the mock is dropped.  Call
//!   [`Mock::verify_all`] to check them earlier, as a `Result`.
//!
//! # User Guide
//!
//! * [`Getting started`](#getting-started)
//! * [`Return values`](#return-values)
//! * [`Matching arguments`](#matching-arguments)
//! * [`Call counts`](#call-counts)
//! * [`Response blocks`](#response-blocks)
//! * [`Null objects`](#null-objects)
//! * [`Verification`](#verification)
//! * [`Traits`](#traits)
//!
//! ## Getting Started
//! ```
//! use dynmock::*;
//!
//! let mock = Mock::new("account");
//! mock.expect("deposit")
//!     .with_args(args![100u32])
//!     .and_return(true);
//!
//! let ok = mock.invoke("deposit", args![100u32]).unwrap();
//! assert_eq!(Some(&true), ok.get::<bool>());
//! ```
//!
//! ## Return values
//!
//! An expectation returns nil (`()`) unless told otherwise.  It can return a
//! constant, a value computed from the arguments, or a sequence of values, one
//! per call.  Once a sequence runs out, its last value repeats.
//!
//! ```
//! # use dynmock::*;
//! let mock = Mock::new("clock");
//! mock.expect("now").exactly(3).and_return_each([1u64, 2]);
//! mock.expect("double").and_return_with(|args| {
//!     Value::new(args[0].get::<i32>().unwrap() * 2)
//! });
//!
//! let ticks = (0..3)
//!     .map(|_| *mock.invoke("now", args![]).unwrap().get::<u64>().unwrap())
//!     .collect::<Vec<_>>();
//! assert_eq!(vec![1, 2, 2], ticks);
//! let d = mock.invoke("double", args![21]).unwrap();
//! assert_eq!(Some(&42), d.get::<i32>());
//! ```
//!
//! ## Matching arguments
//!
//! By default an expectation matches any arguments.  [`with_args`] restricts
//! it to one exact argument list, compared with `PartialEq`, and
//! [`with_no_args`] to calls without arguments.  Arguments of different
//! types never match, so `1i32` and `1u32` are different.
//!
//! When several expectations could handle a call, the one declared first
//! wins.  Calls that no expectation matches are errors.
//!
//! ```
//! # use dynmock::*;
//! let mock = Mock::new("store");
//! mock.expect("get").with_args(args!["a"]).and_return(1);
//! mock.expect("get").and_return(0);
//!
//! assert_eq!(Some(&1), mock.invoke("get", args!["a"]).unwrap().get::<i32>());
//! assert_eq!(Some(&0), mock.invoke("get", args!["b"]).unwrap().get::<i32>());
//! assert!(mock.invoke("put", args!["a"]).is_err());
//! ```
//!
//! ## Call counts
//!
//! Every expectation expects exactly one call unless told otherwise.  Use
//! [`never`], [`once`], [`twice`], [`exactly`], [`at_least_once`] or
//! [`any_number_of_times`].  The last two can also be spelled out:
//!
//! ```
//! # use dynmock::*;
//! let mock = Mock::new("cache");
//! mock.expect("hit").at().least(Once);
//! mock.expect("miss").any().number().of().times();
//! mock.invoke("hit", args![]).unwrap();
//! mock.invoke("hit", args![]).unwrap();
//! ```
//!
//! Each connective word only counts when the following word completes the
//! phrase, so `least(Once)` on its own has no effect.
//!
//! ## Response blocks
//!
//! [`Mock::expect_with`] hands every matching call to a closure, which
//! computes the return value itself.  The closure can make its own
//! assertions and report failures with [`Error::ExpectationNotMet`].
//!
//! ## Null objects
//!
//! A permissive mock accepts messages that no expectation matches, and
//! answers them with itself, so that chained calls work too.
//!
//! ```
//! # use dynmock::*;
//! let mock = Mock::permissive("logger");
//! let r = mock.invoke("info", args!["starting"]).unwrap();
//! let again = r.get::<Mock>().unwrap();
//! assert_eq!(&mock, again);
//! again.invoke("flush", args![]).unwrap();
//! ```
//!
//! ## Verification
//!
//! When the last handle to a mock is dropped, every expectation is checked,
//! and the test panics if any call count is wrong.  The message points at the
//! line that declared the expectation.
//!
//! ```should_panic
//! # use dynmock::*;
//! let mock = Mock::new("mailer");
//! mock.expect("send");
//! ```
//!
//! [`Mock::verify_all`] performs the same check and returns the first failure
//! instead, and [`Mock::checkpoint`] verifies and then discards all
//! expectations.
//!
//! ## Traits
//!
//! Code under test usually talks to a trait, not to a [`Mock`].  Adding
//! [`#[forward]`](forward) to a trait implements it for [`Mock`], forwarding
//! each method to [`Mock::invoke`] by name.
//!
//! ```
//! # use dynmock::*;
//! #[forward]
//! trait Greeter {
//!     fn greet(&self, name: &str) -> String;
//! }
//!
//! fn welcome(g: &dyn Greeter) -> String {
//!     g.greet("world")
//! }
//!
//! let mock = Mock::new("greeter");
//! mock.expect("greet")
//!     .with_args(args![String::from("world")])
//!     .and_return(String::from("hello world"));
//! assert_eq!("hello world", welcome(&mock));
//! ```
//!
//! Reference arguments are converted to their owned forms, as `&str` was to
//! `String` above.  Any failure panics, since the trait's signature has no
//! room for a mock error.
//!
//! [`any_number_of_times`]: MessageExpectation::any_number_of_times
//! [`at_least_once`]: MessageExpectation::at_least_once
//! [`exactly`]: MessageExpectation::exactly
//! [`never`]: MessageExpectation::never
//! [`once`]: MessageExpectation::once
//! [`twice`]: MessageExpectation::twice
//! [`with_args`]: MessageExpectation::with_args
//! [`with_no_args`]: MessageExpectation::with_no_args

mod error;
mod expectation;
mod mock;
mod value;

pub use dynmock_derive::forward;

pub use crate::error::{Error, Result};
pub use crate::expectation::{Expected, MessageExpectation, Once};
pub use crate::mock::{Mock, MockOptions};
pub use crate::value::{Argument, Callback, Value};

/// Build an argument list for [`Mock::invoke`] or
/// [`MessageExpectation::with_args`].
///
/// # Examples
/// ```
/// # use dynmock::*;
/// let a: Vec<Value> = args![1, "two", 3.0];
/// assert_eq!(3, a.len());
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$( $crate::Value::new($arg), )+]
    };
}
