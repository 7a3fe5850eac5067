use stackline_callstack::{CallStack, Description, Executor, SpawnExecutor};
use stackline_logger::{LevelFilter, Logger};
use tracing::info_span;

fn frame(name: &str) -> Description {
    Description::new(format!("{}::{name}", module_path!()))
}

#[test]
fn installed_logger_mirrors_spans_into_call_stacks() -> Result<(), Box<dyn std::error::Error>> {
    let _logger = Logger::builder()
        .name("integration-span-frames")
        .console(true)
        .span_frames(true)
        .level(LevelFilter::TRACE)
        .init()?;

    let stack = CallStack::empty();
    {
        let request = info_span!("request");
        let _request = request.enter();
        assert_eq!(stack.frames(), vec![frame("request")]);

        // Copies handed to workers carry the span frame along.
        let executor = stack.wrap_executor(SpawnExecutor::default());
        let seen = executor
            .submit(|| {
                let inner = info_span!("worker");
                let _inner = inner.enter();
                CallStack::current().frames()
            })?
            .join()?;
        assert_eq!(seen, vec![frame("request"), frame("worker")]);
    }

    assert!(stack.is_empty());
    Ok(())
}
