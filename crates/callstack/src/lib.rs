//! # Call Stack
//!
//! Thread-owned logical call stacks.
//!
//! ## Overview
//!
//! A [`CallStack`] is an explicit stack of [`Description`] frames that code
//! pushes and pops to record what it is doing. Each stack belongs to one
//! thread and is installed as that thread's current stack. Stacks move
//! between threads in one of two ways:
//!
//! * [`CallStack::split`] copies the frames into a new, unowned stack.
//! * [`CallStack::migrate`] does the same and locks the source for good.
//!
//! Either copy must be [installed](CallStack::install) on the receiving
//! thread before it accepts writes. [`CallStack::wrap_executor`] automates
//! this for every task handed to an [`Executor`].
//!
//! # Example
//!
//! ```rust
//! use stackline_callstack::{CallStack, Description, Executor, SpawnExecutor};
//!
//! # fn main() -> Result<(), stackline_callstack::CallStackError> {
//! let stack = CallStack::empty();
//! stack.push(Description::new("handle request"))?;
//!
//! let executor = stack.wrap_executor(SpawnExecutor::default());
//! let top = executor.submit(|| CallStack::current().pop())?.join()??;
//! assert_eq!(top.as_str(), "handle request");
//!
//! // The worker popped its own copy.
//! assert_eq!(stack.depth(), 1);
//! # Ok(())
//! # }
//! ```

extern crate self as stackline_callstack;

mod call_stack;
mod description;
mod error;
mod executor;
mod frame;
mod spawn;
mod wrap;

pub use call_stack::CallStack;
pub use description::{Description, Descriptive, NonDescriptive};
pub use error::{CallStackError, CallStackErrorExt};
pub use executor::{ActiveTask, Executor, Lifecycle, Task, TaskHandle};
pub use frame::FrameGuard;
pub use spawn::SpawnExecutor;
pub use stackline_derive::Descriptive;
pub use wrap::StackExecutor;
