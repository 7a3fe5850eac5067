pub mod fixtures;

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use stackline_callstack::*;
    use std::thread;

    #[test]
    fn test_pop_returns_frames_in_reverse_order() -> Result<(), CallStackError> {
        let stack = CallStack::empty();
        stack.push(frame("First"))?;
        stack.push(frame("Second"))?;

        assert_eq!(stack.pop()?.to_string(), "Second");
        assert_eq!(stack.pop()?.to_string(), "First");
        Ok(())
    }

    #[test]
    fn test_foreign_thread_cannot_push() {
        let stack = CallStack::empty();
        let shared = stack.clone();

        let result = thread::spawn(move || shared.push(frame("First")))
            .join()
            .expect("writer thread panicked");

        assert!(matches!(result, Err(CallStackError::NotCurrent { .. })));
        assert!(matches!(stack.pop(), Err(CallStackError::Empty { .. })));
    }

    #[test]
    fn test_installed_elsewhere_rejects_owner_mismatch() {
        let split = CallStack::empty().split();
        let installed = split.clone();
        thread::spawn(move || installed.install().map(|_| ()))
            .join()
            .expect("installer thread panicked")
            .expect("fresh split installs");

        assert!(matches!(split.install(), Err(CallStackError::AlreadyInstalled { .. })));
        assert!(matches!(split.push(frame("x")), Err(CallStackError::NotCurrent { .. })));
    }

    #[test]
    fn test_migrated_stack_moves_to_worker() -> Result<(), CallStackError> {
        let stack = CallStack::empty();
        stack.push(frame("First"))?;
        let migrated = stack.migrate();

        assert!(stack.is_locked());
        assert!(matches!(stack.push(frame("Second")), Err(CallStackError::Locked { .. })));
        assert!(matches!(stack.pop(), Err(CallStackError::Locked { .. })));

        let executor = SpawnExecutor::default();
        let popped = executor.submit(move || migrated.install()?.pop())?.join()??;
        assert_eq!(popped.to_string(), "First");

        // Reads keep working on the locked source.
        assert_eq!(stack.frames(), vec![frame("First")]);
        Ok(())
    }

    #[test]
    fn test_wrapped_executor_hands_over_copy() -> Result<(), CallStackError> {
        let stack = CallStack::empty();
        stack.push(frame("First"))?;

        let executor = stack.wrap_executor(SpawnExecutor::default());
        let popped = executor.submit(|| CallStack::current().pop())?.join()??;

        assert_eq!(popped.to_string(), "First");
        assert_eq!(stack.depth(), 1, "source stack must be untouched");
        Ok(())
    }

    #[test]
    fn test_non_descriptive_values() -> Result<(), CallStackError> {
        let stack = CallStack::empty();
        stack.push_value(10)?;
        stack.push_value("label")?;

        assert_eq!(stack.pop()?.to_string(), "[&str] label");
        assert_eq!(stack.pop()?.to_string(), "[i32] 10");
        Ok(())
    }

    #[test]
    fn test_derived_descriptions() -> Result<(), CallStackError> {
        let stack = CallStack::empty();
        stack.push(Startup)?;
        stack.push(Request { id: 42 })?;

        assert_eq!(stack.frames(), vec![frame("Startup"), frame("request 42")]);
        Ok(())
    }

    #[test]
    fn test_split_is_disjoint() -> Result<(), CallStackError> {
        let stack = CallStack::empty();
        stack.push(frame("shared"))?;
        let split = stack.split();
        assert!(!split.is_installed());

        stack.push(frame("source only"))?;

        let split_frames = thread::spawn(move || -> Result<Vec<Description>, CallStackError> {
            let split = split.install()?;
            split.push(frame("split only"))?;
            Ok(split.frames())
        })
        .join()
        .expect("split thread panicked")?;

        assert_eq!(split_frames, vec![frame("shared"), frame("split only")]);
        assert_eq!(stack.frames(), vec![frame("shared"), frame("source only")]);
        Ok(())
    }

    #[test]
    fn test_frame_guard_unwinds_nested_frames() -> Result<(), CallStackError> {
        let stack = CallStack::empty();
        stack.push(frame("root"))?;
        {
            let guard = stack.enter(Request { id: 1 })?;
            assert_eq!(guard.depth(), 1);
            stack.push(frame("leaked"))?;
            assert_eq!(stack.depth(), 3);
        }
        assert_eq!(stack.frames(), vec![frame("root")]);
        Ok(())
    }

    #[test]
    fn test_iteration_is_bottom_first_snapshot() -> Result<(), CallStackError> {
        let stack = CallStack::empty();
        for name in ["a", "b", "c"] {
            stack.push(frame(name))?;
        }

        let mut seen = Vec::new();
        for description in &stack {
            seen.push(description.to_string());
            // The iterator holds a snapshot, so writes during iteration are fine.
            stack.push(frame("during"))?;
        }

        assert_eq!(seen, ["a", "b", "c"]);
        assert_eq!(stack.depth(), 6);
        Ok(())
    }

    #[test]
    fn test_peek_does_not_remove() -> Result<(), CallStackError> {
        let stack = CallStack::empty();
        assert_eq!(stack.peek(), None);
        stack.push(frame("top"))?;
        assert_eq!(stack.peek(), Some(frame("top")));
        assert_eq!(stack.depth(), 1);
        Ok(())
    }
}
