// vim: tw=80
//! Proc Macros for use with dynmock
//!
//! You probably don't want to use this crate directly.  Instead, you should use
//! its reexports via the [`dynmock`](../dynmock/index.html) crate.

extern crate proc_macro;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::spanned::Spanned;

mod forward;
use crate::forward::do_forward;

/// Implement a trait for `dynmock::Mock` by forwarding every method to
/// `Mock::invoke`.
///
/// Each generated method sends the mock a message named after the method,
/// with the method's arguments.  Arguments passed by reference are converted
/// to their owned forms with `ToOwned`, so `&str` arrives as a `String`.  The
/// mock's answer is converted to the method's return type; unit methods
/// ignore it.  Any error panics.
///
/// The trait itself is left unchanged.
///
/// # Examples
/// ```ignore
/// use dynmock::*;
/// #[forward]
/// pub trait Counter {
///     fn incr(&mut self, by: u32) -> u32;
///     fn reset(&mut self);
/// }
///
/// let mut mock = Mock::new("counter");
/// mock.expect("incr").with_args(args![5u32]).and_return(5u32);
/// mock.expect("reset");
/// assert_eq!(5, mock.incr(5));
/// mock.reset();
/// ```
///
/// Some traits can't be forwarded:
/// * generic traits, and traits with associated types
/// * generic methods (lifetime parameters are fine)
/// * methods without a `&self` or `&mut self` receiver
/// * methods that return references or `impl Trait`
/// * `async` methods
#[proc_macro_attribute]
pub fn forward(attrs: proc_macro::TokenStream, input: proc_macro::TokenStream)
    -> proc_macro::TokenStream
{
    let input: proc_macro2::TokenStream = input.into();
    let mut output = input.clone();
    output.extend(do_forward(attrs.into(), input));
    output.into()
}
