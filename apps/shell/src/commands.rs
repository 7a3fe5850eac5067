use anyhow::{Context, Result, bail};
use stackline::{CallStack, Description, Executor};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, info_span};

const TERMINATION_TIMEOUT: Duration = Duration::from_secs(30);

fn push_frames(stack: &CallStack, frames: usize) -> Result<()> {
    for level in 0..frames {
        stack.push_value(level)?;
    }
    Ok(())
}

fn finish(executor: &dyn Executor) -> Result<()> {
    executor.shutdown();
    if !executor.await_termination(TERMINATION_TIMEOUT) {
        bail!("executor did not terminate within {TERMINATION_TIMEOUT:?}");
    }
    Ok(())
}

pub fn split(out: &mut impl Write, executor: Arc<dyn Executor>, frames: usize) -> Result<()> {
    let _span = info_span!("split", frames).entered();
    let stack = CallStack::current();
    push_frames(&stack, frames)?;

    let copy = stack.split();
    let worker = executor.submit(move || -> Result<String> {
        let copy = copy.install()?;
        copy.push(Description::new("worker"))?;
        Ok(copy.to_string())
    })?;
    stack.push(Description::new("caller keeps going"))?;

    writeln!(out, "worker:\n{}", worker.join()??)?;
    writeln!(out, "caller:\n{stack}")?;
    finish(&*executor)
}

pub fn migrate(out: &mut impl Write, executor: Arc<dyn Executor>, frames: usize) -> Result<()> {
    let _span = info_span!("migrate", frames).entered();
    let stack = CallStack::current();
    push_frames(&stack, frames)?;

    let moved = stack.migrate();
    let worker = executor.submit(move || -> Result<String> {
        let moved = moved.install()?;
        let top = moved.pop()?;
        Ok(format!("popped {top}\n{moved}"))
    })?;

    let rejected = stack.push(Description::new("after migrate")).is_err();
    writeln!(out, "worker:\n{}", worker.join()??)?;
    writeln!(out, "caller:\n{stack}")?;
    writeln!(out, "caller push rejected: {rejected}")?;
    finish(&*executor)
}

pub fn fanout(out: &mut impl Write, executor: Arc<dyn Executor>, tasks: usize) -> Result<()> {
    let _span = info_span!("fanout", tasks).entered();
    let stack = CallStack::current();
    stack.push(Description::new("fanout"))?;

    let wrapped = stack.wrap_executor(executor);
    let handles = (0..tasks)
        .map(|task| {
            wrapped.submit(move || -> Result<String> {
                let stack = CallStack::current();
                stack.push_value(task)?;
                let thread = std::thread::current().name().unwrap_or("unnamed").to_owned();
                Ok(format!("on {thread}\n{stack}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (task, handle) in handles.into_iter().enumerate() {
        let rendered = handle.join().with_context(|| format!("task {task}"))??;
        writeln!(out, "task {task} {rendered}")?;
    }
    info!(depth = stack.depth(), "Caller stack untouched by workers");
    writeln!(out, "caller:\n{stack}")?;
    finish(&wrapped)
}
