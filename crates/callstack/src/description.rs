use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Text label of a single call stack frame.
///
/// Cloning is cheap: the text is shared. Two descriptions are equal when
/// their text is equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Description(Arc<str>);

impl Description {
    /// Creates a description from any string-like value.
    ///
    /// # Examples
    /// ```rust
    /// use stackline_callstack::Description;
    ///
    /// let description = Description::new("parse header");
    /// assert_eq!(description.as_str(), "parse header");
    /// assert_eq!(description.to_string(), "parse header");
    /// ```
    #[must_use]
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Description {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Description {
    fn from(text: &str) -> Self {
        Self(text.into())
    }
}

impl From<String> for Description {
    fn from(text: String) -> Self {
        Self(text.into())
    }
}

impl From<Cow<'_, str>> for Description {
    fn from(text: Cow<'_, str>) -> Self {
        Self(text.into())
    }
}

/// A value that can describe itself as a call stack frame.
///
/// Implement it by hand, or derive it with `#[derive(Descriptive)]`.
pub trait Descriptive {
    fn description(&self) -> Description;
}

impl Descriptive for Description {
    fn description(&self) -> Description {
        self.clone()
    }
}

impl<D: Descriptive + ?Sized> Descriptive for &D {
    fn description(&self) -> Description {
        (**self).description()
    }
}

impl<D: Descriptive + ?Sized> Descriptive for Box<D> {
    fn description(&self) -> Description {
        (**self).description()
    }
}

/// Wraps a value that has no description of its own.
///
/// The frame text is `[<type>] <value>`, using the unqualified type name.
///
/// # Examples
/// ```rust
/// use stackline_callstack::{Descriptive, NonDescriptive};
///
/// assert_eq!(NonDescriptive::new(10).description().as_str(), "[i32] 10");
/// assert_eq!(NonDescriptive::new(String::from("hi")).description().as_str(), "[String] hi");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NonDescriptive<T>(T);

impl<T> NonDescriptive<T> {
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    pub const fn get(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: fmt::Display> Descriptive for NonDescriptive<T> {
    fn description(&self) -> Description {
        Description::new(format!("[{}] {}", simple_type_name::<T>(), self.0))
    }
}

/// `alloc::vec::Vec<u8>` becomes `Vec`, `&str` stays `&str`.
pub(crate) fn simple_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
