use crate::cleanup::{Cleanup, CleanupStack};
use loam_core::{TempId, Value};
use pretty_assertions::assert_eq;

fn temp(n: u32) -> Value {
    Value::Temp(TempId(n))
}

#[test]
fn test_active_cleanups_are_innermost_first() {
    let mut stack = CleanupStack::new();
    stack.push(Cleanup::DeallocStack(temp(0)));
    stack.push(Cleanup::Release(temp(1)));
    stack.push(Cleanup::DeallocStack(temp(2)));

    assert_eq!(
        stack.active_above(1),
        vec![Cleanup::DeallocStack(temp(2)), Cleanup::Release(temp(1))]
    );
    // Emitting for an early exit does not pop.
    assert_eq!(stack.depth(), 3);
}

#[test]
fn test_pop_to_removes_scope() {
    let mut stack = CleanupStack::new();
    stack.push(Cleanup::DeallocStack(temp(0)));
    let depth = stack.depth();
    stack.push(Cleanup::Release(temp(1)));
    stack.push(Cleanup::Release(temp(2)));

    let popped = stack.pop_to(depth);
    assert_eq!(popped, vec![Cleanup::Release(temp(2)), Cleanup::Release(temp(1))]);
    assert_eq!(stack.depth(), 1);
    assert!(stack.pop_to(5).is_empty());
    assert_eq!(stack.pop_to(0), vec![Cleanup::DeallocStack(temp(0))]);
    assert!(stack.is_empty());
}

#[test]
fn test_active_above_out_of_range_is_empty() {
    let stack = CleanupStack::new();
    assert!(stack.active_above(0).is_empty());
    assert!(stack.active_above(3).is_empty());
}
