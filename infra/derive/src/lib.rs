#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the call stack workspace.
//! This crate provides the error enum attribute shared by every crate in the
//! workspace and a derive for frame descriptions.
//!
//! ## Usage
//! Depend on the crate directly, or use the re-exports from `stackline`:
//! ```toml
//! [dependencies]
//! stackline-derive = { path = "../infra/derive" }
//! ```

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// A high-level attribute macro for defining domain-specific error enums.
///
/// This macro reduces boilerplate by transforming a standard enum into a fully-featured
/// error type.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]`.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a `#[source]` field,
///   enabling the use of the `?` operator for upstream errors.
/// * **Internal Fallback**: Provides specialized `From<&str>` and `From<String>` implementations
///   if an `Internal` variant is present.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum**.
/// 2. Variants that support context must include a `context: Option<Cow<'static, str>>` field.
/// 3. Variants wrapping external errors must include a `source: T` field or a field marked
///    with `#[source]`/`#[from]` (compatible with `thiserror`).
/// 4. Tuple or unit variants are rejected to keep error wiring explicit and reliable.
///
/// # Example
///
/// ```rust,ignore
/// use stackline_derive::stackline_error;
/// use std::borrow::Cow;
///
/// #[stackline_error]
/// pub enum WorkerError {
///     #[error("Spawn failed{}: {source}", format_context(.context))]
///     Spawn {
///         #[source]
///         source: std::io::Error,
///         context: Option<Cow<'static, str>>,
///     },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn spawn() -> Result<(), WorkerError> {
///     std::thread::Builder::new()
///         .spawn(|| {})
///         .context("Spawning worker")?;
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn stackline_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Derives `stackline_callstack::Descriptive`.
///
/// Without attributes the description is the type name. A
/// `#[descriptive("...")]` attribute on a struct with named fields supplies a
/// format string evaluated with every field bound by reference.
///
/// The generated impl names `::stackline_callstack`. Crates that reach the
/// call stack through the `stackline` facade point it there with
/// `#[descriptive(crate = stackline::callstack)]`; the path and the format
/// string may share one attribute.
///
/// # Example
///
/// ```rust,ignore
/// use stackline_callstack::{CallStack, Descriptive};
///
/// #[derive(Descriptive)]
/// #[descriptive("load user {id} from {source}")]
/// struct LoadUser {
///     id: u64,
///     source: &'static str,
/// }
///
/// #[derive(Descriptive)]
/// struct Bootstrap;
///
/// let stack = CallStack::empty();
/// stack.push(Bootstrap)?;
/// stack.push(LoadUser { id: 7, source: "cache" })?;
/// assert_eq!(stack.peek().unwrap().as_str(), "load user 7 from cache");
/// ```
#[proc_macro_derive(Descriptive, attributes(descriptive))]
pub fn derive_descriptive(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::describe::expand_derive(input).into()
}
