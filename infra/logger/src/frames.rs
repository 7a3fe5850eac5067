use stackline_callstack::{CallStack, Description};
use std::thread::{self, ThreadId};
use tracing::Subscriber;
use tracing::span::Id;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Mirrors entered tracing spans as frames of the thread's current
/// [`CallStack`].
///
/// Entering a span pushes `<target>::<span name>`; exiting it unwinds the
/// stack to the depth it had before the enter, which also drops any frame
/// pushed while the span was entered. Spans entered on a thread whose stack
/// rejects writes (e.g. after a migration) are skipped.
///
/// # Example
///
/// ```rust
/// use stackline_callstack::CallStack;
/// use stackline_logger::SpanFrameLayer;
/// use tracing_subscriber::layer::SubscriberExt;
///
/// let subscriber = tracing_subscriber::registry().with(SpanFrameLayer::new());
/// tracing::subscriber::with_default(subscriber, || {
///     let span = tracing::info_span!("handle_request");
///     let _entered = span.enter();
///     let top = CallStack::current().peek().unwrap();
///     assert!(top.as_str().ends_with("::handle_request"));
/// });
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct SpanFrameLayer {
    _private: (),
}

impl SpanFrameLayer {
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

/// Enters of one span that are still open, possibly on several threads.
#[derive(Debug, Default)]
struct OpenFrames(Vec<OpenFrame>);

#[derive(Debug)]
struct OpenFrame {
    thread: ThreadId,
    stack: CallStack,
    depth: usize,
}

impl<S> Layer<S> for SpanFrameLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let stack = CallStack::current();
        let depth = stack.depth();
        let metadata = span.metadata();
        let frame = Description::new(format!("{}::{}", metadata.target(), metadata.name()));
        if stack.push(frame).is_err() {
            return;
        }

        let open = OpenFrame { thread: thread::current().id(), stack, depth };
        let mut extensions = span.extensions_mut();
        if let Some(frames) = extensions.get_mut::<OpenFrames>() {
            frames.0.push(open);
        } else {
            extensions.insert(OpenFrames(vec![open]));
        }
    }

    fn on_exit(&self, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let thread = thread::current().id();
        let open = {
            let mut extensions = span.extensions_mut();
            let Some(frames) = extensions.get_mut::<OpenFrames>() else {
                return;
            };
            let Some(index) = frames.0.iter().rposition(|frame| frame.thread == thread) else {
                return;
            };
            frames.0.remove(index)
        };

        // The stack may have been migrated while the span was entered.
        let _ = open.stack.unwind_to(open.depth);
    }
}
