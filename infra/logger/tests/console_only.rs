use stackline_callstack::CallStack;
use stackline_logger::{LevelFilter, Logger};
use tracing::info_span;

#[test]
fn spans_leave_call_stack_alone_without_span_frames() {
    let logger = Logger::builder()
        .name("integration-console-only")
        .console(true)
        .level(LevelFilter::TRACE)
        .init()
        .expect("logger should initialize");
    assert!(logger.guard().is_none(), "console-only logger should not create a file guard");

    let stack = CallStack::empty();
    info_span!("unmirrored").in_scope(|| {
        assert!(stack.is_empty(), "spans must not become frames unless span_frames is set");
    });
}
