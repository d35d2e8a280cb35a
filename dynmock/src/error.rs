// vim: tw=80
//! Failures raised by mocks and their expectations.

use std::panic::Location;

use thiserror::Error;

use crate::expectation::Expected;

/// Everything that can go wrong while calling or verifying a mock.
///
/// The `Display` output of each variant is the text that ends up in the test
/// failure, so it is meant to be read by a human.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A strict mock received a message that no expectation matched.
    #[error("Mock '{mock}' received unexpected message '{message}' with [{args}]")]
    UnexpectedMessage {
        mock: String,
        message: String,
        /// Each argument rendered as `<value:type>`, comma separated.
        args: String,
    },

    /// An expectation was called directly with arguments that violate its
    /// argument constraint.
    #[error("{message}: Parameter mismatch: Expected <{expected}>, got <{actual}>")]
    ParameterMismatch {
        mock: String,
        message: String,
        expected: String,
        actual: String,
        /// The failing predicate case, as rendered by `predicates-tree`.
        /// Not part of the `Display` output.
        case: String,
    },

    /// A response block reported that one of its own expectations was not
    /// met.
    #[error("Call expectation violated with: {reason}")]
    CallExpectationViolated {
        mock: String,
        message: String,
        reason: String,
    },

    /// At verification time, an expectation had been called the wrong number
    /// of times.
    #[error("Mock '{mock}' expected {signature} {expected}, but received it {received} times")]
    UnmetExpectation {
        mock: String,
        signature: String,
        expected: Expected,
        received: usize,
        /// Where the expectation was declared
        location: &'static Location<'static>,
    },

    /// Signal for a failed assertion inside a response block.
    ///
    /// Return this from a block passed to
    /// [`Mock::expect_with`](crate::Mock::expect_with); the mock will report
    /// it as a [`CallExpectationViolated`](Error::CallExpectationViolated).
    #[error("{0}")]
    ExpectationNotMet(String),

    /// An expectation was called again from inside its own return value
    /// closure or response block.
    #[error("Mock '{mock}' received '{message}' while still answering an earlier '{message}'")]
    Reentered {
        mock: String,
        message: String,
    },

    /// A forwarded method could not convert the mock's answer into its
    /// declared return type.
    #[error("Mock '{mock}' answered '{message}' with {found}, which is not a {expected}")]
    ReturnType {
        mock: String,
        message: String,
        expected: String,
        found: String,
    },
}

impl Error {
    /// Shorthand for [`Error::ExpectationNotMet`].
    pub fn not_met<S: Into<String>>(reason: S) -> Self {
        Error::ExpectationNotMet(reason.into())
    }

    /// The name of the mock that raised this error, if any.
    pub fn mock(&self) -> Option<&str> {
        match self {
            Error::UnexpectedMessage{mock, ..}
            | Error::ParameterMismatch{mock, ..}
            | Error::CallExpectationViolated{mock, ..}
            | Error::UnmetExpectation{mock, ..}
            | Error::Reentered{mock, ..}
            | Error::ReturnType{mock, ..} => Some(mock.as_str()),
            Error::ExpectationNotMet(_) => None
        }
    }

    /// Source location that a test author should look at.
    ///
    /// For unmet expectations this is the line that declared the expectation,
    /// not the line that verified it.
    pub fn location(&self) -> Option<&'static Location<'static>> {
        match self {
            Error::UnmetExpectation{location, ..} => Some(*location),
            _ => None
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
