use crate::description::{Description, Descriptive, NonDescriptive};
use crate::error::CallStackError;
use crate::executor::Executor;
use crate::frame::FrameGuard;
use crate::wrap::StackExecutor;
use parking_lot::{Mutex, MutexGuard};
use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};
use tracing::{debug, trace};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT: RefCell<Option<CallStack>> = const { RefCell::new(None) };
}

#[derive(Debug)]
struct Inner {
    id: u64,
    frames: Mutex<Vec<Description>>,
    owner: OnceLock<ThreadId>,
    locked: AtomicBool,
}

/// A logical call stack owned by exactly one thread.
///
/// `CallStack` is a handle: clones refer to the same stack, and equality is
/// identity. Reads work from any thread. Writes require that the stack is
/// not locked, has an owning thread, is that thread's current stack, and is
/// called from the owner.
///
/// # Examples
/// ```rust
/// use stackline_callstack::{CallStack, Description};
///
/// # fn main() -> Result<(), stackline_callstack::CallStackError> {
/// let stack = CallStack::empty();
/// stack.push(Description::new("First"))?;
/// stack.push(Description::new("Second"))?;
/// assert_eq!(stack.pop()?.as_str(), "Second");
/// assert_eq!(stack.pop()?.as_str(), "First");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CallStack {
    inner: Arc<Inner>,
}

impl CallStack {
    fn with_frames(frames: Vec<Description>, owner: Option<ThreadId>) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                frames: Mutex::new(frames),
                owner: owner.map_or_else(OnceLock::new, OnceLock::from),
                locked: AtomicBool::new(false),
            }),
        }
    }

    /// Creates an empty stack owned by the calling thread and makes it the
    /// thread's current stack. During thread exit, once the current slot is
    /// gone, the stack is returned without becoming current.
    #[must_use]
    pub fn empty() -> Self {
        let stack = Self::with_frames(Vec::new(), Some(thread::current().id()));
        stack.make_current();
        trace!(stack = stack.id(), "Installed empty call stack");
        stack
    }

    /// Returns the calling thread's current stack, installing an empty one
    /// if the thread has none yet.
    #[must_use]
    pub fn current() -> Self {
        Self::try_current().unwrap_or_else(Self::empty)
    }

    /// Returns the calling thread's current stack without creating one.
    #[must_use]
    pub fn try_current() -> Option<Self> {
        CURRENT.try_with(|slot| slot.borrow().clone()).ok().flatten()
    }

    /// Binds the stack to the calling thread and makes it current.
    ///
    /// A stack can be installed once. The thread's previous current stack,
    /// if any, stops accepting writes.
    ///
    /// # Errors
    /// Returns [`CallStackError::AlreadyInstalled`] if the stack already has
    /// an owning thread.
    pub fn install(&self) -> Result<Self, CallStackError> {
        self.inner.owner.set(thread::current().id()).map_err(|_| {
            CallStackError::AlreadyInstalled {
                message: format!("call stack #{} already has an owning thread", self.id()).into(),
                context: None,
            }
        })?;
        self.make_current();
        debug!(stack = self.id(), depth = self.depth(), "Installed call stack");
        Ok(self.clone())
    }

    /// Pushes a frame.
    ///
    /// # Errors
    /// Returns the first failed write check: [`CallStackError::Locked`],
    /// [`CallStackError::NotInstalled`], [`CallStackError::NotCurrent`] or
    /// [`CallStackError::WrongThread`].
    pub fn push<D: Descriptive>(&self, frame: D) -> Result<(), CallStackError> {
        let description = frame.description();
        let depth = {
            let mut frames = self.write()?;
            frames.push(description.clone());
            frames.len()
        };
        trace!(stack = self.id(), depth, frame = %description, "Pushed frame");
        Ok(())
    }

    /// Pushes a value without its own description as `[<type>] <value>`.
    ///
    /// # Errors
    /// Same as [`CallStack::push`].
    pub fn push_value<T: fmt::Display>(&self, value: T) -> Result<(), CallStackError> {
        self.push(NonDescriptive::new(value))
    }

    /// Removes and returns the top frame.
    ///
    /// # Errors
    /// Same as [`CallStack::push`], plus [`CallStackError::Empty`] when there
    /// is nothing to pop.
    pub fn pop(&self) -> Result<Description, CallStackError> {
        let top = self.write()?.pop();
        let top = top.ok_or_else(|| CallStackError::Empty {
            message: format!("call stack #{} has no frames to pop", self.id()).into(),
            context: None,
        })?;
        trace!(stack = self.id(), frame = %top, "Popped frame");
        Ok(top)
    }

    /// Pushes a frame that is popped again when the returned guard drops.
    ///
    /// # Errors
    /// Same as [`CallStack::push`].
    ///
    /// # Examples
    /// ```rust
    /// use stackline_callstack::{CallStack, Description};
    ///
    /// # fn main() -> Result<(), stackline_callstack::CallStackError> {
    /// let stack = CallStack::empty();
    /// {
    ///     let _frame = stack.enter(Description::new("handle request"))?;
    ///     stack.push(Description::new("decode body"))?;
    ///     assert_eq!(stack.depth(), 2);
    /// }
    /// assert!(stack.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn enter<D: Descriptive>(&self, frame: D) -> Result<FrameGuard<'_>, CallStackError> {
        let description = frame.description();
        let depth = {
            let mut frames = self.write()?;
            let depth = frames.len();
            frames.push(description.clone());
            depth
        };
        trace!(stack = self.id(), depth = depth + 1, frame = %description, "Entered frame");
        Ok(FrameGuard::new(self, depth))
    }

    /// Drops every frame above `depth` and returns how many were removed.
    ///
    /// # Errors
    /// Same as [`CallStack::push`].
    pub fn unwind_to(&self, depth: usize) -> Result<usize, CallStackError> {
        let removed = {
            let mut frames = self.write()?;
            let removed = frames.len().saturating_sub(depth);
            frames.truncate(depth);
            removed
        };
        if removed > 0 {
            trace!(stack = self.id(), depth, removed, "Unwound frames");
        }
        Ok(removed)
    }

    /// Returns the top frame without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<Description> {
        self.inner.frames.lock().last().cloned()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.inner.frames.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.frames.lock().is_empty()
    }

    /// Snapshot of all frames, bottom first.
    #[must_use]
    pub fn frames(&self) -> Vec<Description> {
        self.inner.frames.lock().clone()
    }

    /// Creates an independent copy with the same frames and no owner.
    ///
    /// The copy must be [installed](CallStack::install) before it accepts
    /// writes. Changes to either stack are never visible in the other.
    #[must_use]
    pub fn split(&self) -> Self {
        let split = Self::with_frames(self.frames(), None);
        trace!(source = self.id(), split = split.id(), depth = split.depth(), "Split call stack");
        split
    }

    /// Like [`CallStack::split`], but permanently locks this stack against
    /// further writes.
    ///
    /// # Examples
    /// ```rust
    /// use stackline_callstack::{CallStack, Description};
    ///
    /// # fn main() -> Result<(), stackline_callstack::CallStackError> {
    /// let stack = CallStack::empty();
    /// stack.push(Description::new("First"))?;
    /// let migrated = stack.migrate();
    /// assert!(stack.push(Description::new("Second")).is_err());
    ///
    /// let popped = std::thread::spawn(move || migrated.install()?.pop())
    ///     .join()
    ///     .expect("worker thread panicked")?;
    /// assert_eq!(popped.as_str(), "First");
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn migrate(&self) -> Self {
        let frames = {
            let frames = self.inner.frames.lock();
            self.inner.locked.store(true, Ordering::Release);
            frames.clone()
        };
        let migrated = Self::with_frames(frames, None);
        debug!(source = self.id(), target = migrated.id(), "Migrated call stack");
        migrated
    }

    /// Wraps `executor` so that every task starts with a copy of this stack
    /// taken at submission time.
    pub fn wrap_executor<E: Executor>(&self, executor: E) -> StackExecutor<E> {
        StackExecutor::new(self.clone(), executor)
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.inner.locked.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.inner.owner.get().is_some()
    }

    #[must_use]
    pub fn owner(&self) -> Option<ThreadId> {
        self.inner.owner.get().copied()
    }

    /// Process-unique identifier, used in log fields and error messages.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// No-op while the thread-local storage is being torn down.
    fn make_current(&self) {
        let Ok(previous) = CURRENT.try_with(|slot| slot.replace(Some(self.clone()))) else {
            trace!(stack = self.id(), "Thread is exiting, call stack left detached");
            return;
        };
        if let Some(previous) = previous.filter(|previous| previous != self) {
            trace!(previous = previous.id(), current = self.id(), "Replaced current call stack");
        }
    }

    fn is_current(&self) -> bool {
        CURRENT
            .try_with(|slot| slot.borrow().as_ref().is_some_and(|current| current == self))
            .unwrap_or(false)
    }

    /// Locks the frames and runs the write checks while holding the lock,
    /// so no write can land after [`CallStack::migrate`] set the lock flag.
    fn write(&self) -> Result<MutexGuard<'_, Vec<Description>>, CallStackError> {
        let frames = self.inner.frames.lock();

        if self.is_locked() {
            return Err(CallStackError::Locked {
                message: format!("call stack #{} was migrated", self.id()).into(),
                context: None,
            });
        }
        let Some(owner) = self.owner() else {
            return Err(CallStackError::NotInstalled {
                message: format!("call stack #{} has no owning thread", self.id()).into(),
                context: None,
            });
        };
        if !self.is_current() {
            return Err(CallStackError::NotCurrent {
                message: format!("call stack #{} is not the current stack of this thread", self.id())
                    .into(),
                context: None,
            });
        }
        // Unreachable through the public API: only `empty` and `install` set
        // the current stack, and both bind the owner to the calling thread.
        if owner != thread::current().id() {
            return Err(CallStackError::WrongThread {
                message: format!("the calling thread does not own call stack #{}", self.id())
                    .into(),
                context: None,
            });
        }

        Ok(frames)
    }
}

impl PartialEq for CallStack {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for CallStack {}

impl IntoIterator for &CallStack {
    type Item = Description;
    type IntoIter = std::vec::IntoIter<Description>;

    /// Iterates over a snapshot of the frames, bottom first.
    fn into_iter(self) -> Self::IntoIter {
        self.frames().into_iter()
    }
}

/// Renders the stack top first, one `at <frame>` line per frame.
impl fmt::Display for CallStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frames = self.frames();
        let noun = if frames.len() == 1 { "frame" } else { "frames" };
        write!(f, "call stack #{} ({} {noun}", self.id(), frames.len())?;
        if self.is_locked() {
            f.write_str(", locked")?;
        }
        f.write_str(")")?;
        for frame in frames.iter().rev() {
            write!(f, "\n    at {frame}")?;
        }
        Ok(())
    }
}
