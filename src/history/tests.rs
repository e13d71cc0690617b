use super::{Direction, HistoryStack};

fn stack_of(items: &[&'static str]) -> HistoryStack<&'static str> {
    let mut stack = HistoryStack::new();
    for item in items {
        stack.push(*item);
    }
    stack
}

#[test]
fn push_moves_index_to_new_tail() {
    let stack = stack_of(&["a", "b", "c"]);
    assert_eq!(stack.len(), 3);
    assert_eq!(stack.current_index(), 2);
    assert_eq!(stack.current(), Some(&"c"));
}

#[test]
fn push_after_undo_discards_redo_branch() {
    let mut stack = stack_of(&["a", "b", "c"]);
    stack.undo().expect("undo to b");
    stack.undo().expect("undo to a");
    assert_eq!(stack.current_index(), 0);

    stack.push("d");
    assert_eq!(stack.entries(), &["a", "d"]);
    assert_eq!(stack.current_index(), 1);
    assert!(!stack.can_redo());
    assert!(stack.redo().is_err());
}

#[test]
fn undo_at_bottom_is_a_reported_no_op() {
    let mut stack = stack_of(&["a"]);
    let error = stack.undo().expect_err("bottom");
    assert_eq!(error.direction, Direction::Undo);
    assert_eq!(stack.current_index(), 0);
    assert_eq!(stack.current(), Some(&"a"));
}

#[test]
fn redo_at_top_is_a_reported_no_op() {
    let mut stack = stack_of(&["a", "b"]);
    let error = stack.redo().expect_err("top");
    assert_eq!(error.direction, Direction::Redo);
    assert_eq!(stack.current_index(), 1);
}

#[test]
fn undo_then_redo_walks_the_stack() {
    let mut stack = stack_of(&["a", "b", "c"]);
    assert_eq!(stack.undo().copied(), Ok("b"));
    assert_eq!(stack.redo().copied(), Ok("c"));
}

#[test]
fn reset_then_undo_keeps_base() {
    let mut stack = stack_of(&["a", "b", "c"]);
    stack.reset("base");
    assert!(stack.undo().is_err());
    assert_eq!(stack.current_index(), 0);
    assert_eq!(stack.current(), Some(&"base"));
    assert_eq!(stack.len(), 1);
}

#[test]
fn empty_stack_rejects_both_directions() {
    let mut stack: HistoryStack<u8> = HistoryStack::new();
    assert!(stack.undo().is_err());
    assert!(stack.redo().is_err());
    assert_eq!(stack.current(), None);
    stack.push(7);
    assert_eq!(stack.current(), Some(&7));
}
