pub mod fixtures;

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use stackline_callstack::*;
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_copy_is_taken_at_submission_time() -> Result<(), CallStackError> {
        let stack = CallStack::empty();
        stack.push(frame("before wrap"))?;
        let executor = stack.wrap_executor(SpawnExecutor::default());

        stack.push(frame("before submit"))?;
        let first = executor.submit(|| CallStack::current().frames())?;
        stack.push(frame("after submit"))?;

        assert_eq!(first.join()?, vec![frame("before wrap"), frame("before submit")]);
        Ok(())
    }

    #[test]
    fn test_each_task_gets_its_own_copy() -> Result<(), CallStackError> {
        let stack = CallStack::empty();
        stack.push(Request { id: 9 })?;
        let executor = stack.wrap_executor(SpawnExecutor::default());

        let handles = (0..4)
            .map(|n| {
                executor.submit(move || -> Result<usize, CallStackError> {
                    let current = CallStack::current();
                    current.push_value(n)?;
                    Ok(current.depth())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for handle in handles {
            assert_eq!(handle.join()??, 2);
        }
        assert_eq!(stack.depth(), 1);
        Ok(())
    }

    #[test]
    fn test_worker_stack_is_owned_by_worker() -> Result<(), CallStackError> {
        let stack = CallStack::empty();
        let executor = stack.wrap_executor(SpawnExecutor::default());
        let (tx, rx) = mpsc::channel();

        executor.execute(Box::new(move || {
            let _ = tx.send(CallStack::current());
        }))?;

        let worker_stack = rx.recv_timeout(Duration::from_secs(5)).expect("task did not run");
        assert_ne!(worker_stack, stack);
        assert!(worker_stack.is_installed());
        assert_ne!(worker_stack.owner(), stack.owner());
        assert!(matches!(worker_stack.push(frame("x")), Err(CallStackError::NotCurrent { .. })));
        Ok(())
    }

    #[test]
    fn test_shutdown_rejects_and_terminates() -> Result<(), CallStackError> {
        let stack = CallStack::empty();
        let executor = stack.wrap_executor(SpawnExecutor::default());
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let handle = executor.submit(move || release_rx.recv().is_ok())?;
        executor.shutdown();

        assert!(executor.is_shutdown());
        assert!(executor.inner().is_shutdown());
        assert!(!executor.await_termination(Duration::from_millis(20)));
        assert!(matches!(executor.submit(|| ()), Err(CallStackError::Rejected { .. })));

        release_tx.send(()).expect("task is waiting");
        assert!(handle.join()?);
        assert!(executor.await_termination(Duration::from_secs(5)));
        assert!(executor.is_terminated());
        Ok(())
    }

    #[test]
    fn test_shared_executor_through_arc() -> Result<(), CallStackError> {
        let stack = CallStack::empty();
        stack.push(frame("shared"))?;
        let executor: Arc<dyn Executor> = Arc::new(SpawnExecutor::default());
        let wrapped = stack.wrap_executor(Arc::clone(&executor));

        let top = wrapped.submit(|| CallStack::current().peek())?.join()?;
        assert_eq!(top, Some(frame("shared")));

        executor.shutdown();
        assert!(wrapped.is_shutdown());
        Ok(())
    }

    #[tokio::test]
    async fn test_wait_from_async_context() -> Result<(), CallStackError> {
        let stack = CallStack::empty();
        stack.push(frame("async caller"))?;
        let executor = stack.wrap_executor(SpawnExecutor::default());

        let frames = executor.submit(|| CallStack::current().frames())?.wait().await?;
        assert_eq!(frames, vec![frame("async caller")]);
        Ok(())
    }
}
