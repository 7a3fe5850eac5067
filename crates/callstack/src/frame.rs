use crate::call_stack::CallStack;
use tracing::warn;

/// Unwinds a [`CallStack`] to the depth it had before [`CallStack::enter`]
/// when dropped.
///
/// Frames pushed on top of the guarded frame are removed as well. Dropping
/// the guard on a thread that cannot write the stack logs a warning and
/// leaves the frames in place.
#[must_use = "dropping the guard immediately pops the frame"]
#[derive(Debug)]
pub struct FrameGuard<'a> {
    stack: &'a CallStack,
    depth: usize,
}

impl<'a> FrameGuard<'a> {
    pub(crate) const fn new(stack: &'a CallStack, depth: usize) -> Self {
        Self { stack, depth }
    }

    /// Depth of the stack below the guarded frame.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub const fn stack(&self) -> &CallStack {
        self.stack
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.stack.unwind_to(self.depth) {
            warn!(
                stack = self.stack.id(),
                depth = self.depth,
                kind = err.kind(),
                %err,
                "Failed to unwind guarded frame"
            );
        }
    }
}
