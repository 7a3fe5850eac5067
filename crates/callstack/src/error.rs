use std::borrow::Cow;

/// Errors raised by call stack writes and executor hand-off.
#[stackline_derive::stackline_error]
pub enum CallStackError {
    /// The stack was migrated and no longer accepts writes.
    #[error("Call stack is locked{}: {message}", format_context(.context))]
    Locked { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The stack has never been installed on a thread.
    #[error("Call stack is not installed{}: {message}", format_context(.context))]
    NotInstalled { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The calling thread's current stack is a different one.
    #[error("Call stack is not current{}: {message}", format_context(.context))]
    NotCurrent { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The calling thread does not own the stack.
    #[error("Call stack owned by another thread{}: {message}", format_context(.context))]
    WrongThread { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The stack already has an owning thread.
    #[error("Call stack already installed{}: {message}", format_context(.context))]
    AlreadyInstalled { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Pop on a stack without frames.
    #[error("Call stack is empty{}: {message}", format_context(.context))]
    Empty { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The executor was shut down before the task was handed over.
    #[error("Task rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The task panicked or was dropped before producing a value.
    #[error("Task failed{}: {message}", format_context(.context))]
    TaskFailed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The operating system refused to start a worker thread.
    #[error("Worker spawn failed{}: {source}", format_context(.context))]
    Spawn { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal call stack error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
