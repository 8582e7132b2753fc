use super::*;

#[test]
fn test_insert_chars_coalesce() {
    let mut stack = UndoStack::new(40);
    assert!(stack.record(EditType::InsertChars, Some("")));
    assert!(!stack.record(EditType::InsertChars, Some("a")));
    assert!(!stack.record(EditType::InsertChars, Some("ab")));
    assert_eq!(stack.len(), 1);

    assert_eq!(stack.undo("abc"), Some(""));
    assert!(!stack.can_undo());
}

#[test]
fn test_coalesced_edit_keeps_saved_state() {
    let mut stack = UndoStack::new(40);
    assert!(stack.starts_group(EditType::InsertChars));
    stack.record(EditType::InsertChars, Some("start"));

    assert!(!stack.starts_group(EditType::InsertChars));
    assert!(!stack.record(EditType::InsertChars, None));
    // A state offered for a joining edit is ignored
    assert!(!stack.record(EditType::InsertChars, Some("later")));
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.undo("end"), Some("start"));
}

#[test]
fn test_kind_change_breaks_group() {
    let mut stack = UndoStack::new(40);
    stack.record(EditType::InsertChars, Some(""));
    assert!(stack.record(EditType::Delete, Some("ab")));
    assert!(!stack.record(EditType::Delete, Some("a")));
    assert!(stack.record(EditType::InsertChars, Some("")));
    assert_eq!(stack.len(), 3);
}

#[test]
fn test_other_never_coalesces() {
    let mut stack = UndoStack::new(40);
    assert!(stack.record(EditType::Other, Some(0)));
    assert!(stack.record(EditType::Other, Some(1)));
    assert_eq!(stack.len(), 2);
}

#[test]
fn test_break_group() {
    let mut stack = UndoStack::new(40);
    stack.record(EditType::InsertChars, Some(""));
    stack.break_group();
    assert!(stack.record(EditType::InsertChars, Some("a")));
}

#[test]
fn test_undo_redo_round_trip() {
    let mut stack = UndoStack::new(40);
    stack.record(EditType::Other, Some("one"));
    stack.record(EditType::Other, Some("two"));

    assert_eq!(stack.undo("three"), Some("two"));
    assert_eq!(stack.undo("two"), Some("one"));
    assert_eq!(stack.undo("one"), None);
    assert!(stack.can_redo());

    assert_eq!(stack.redo("one"), Some("two"));
    assert_eq!(stack.redo("two"), Some("three"));
    assert_eq!(stack.redo("three"), None);
}

#[test]
fn test_new_edit_discards_redo() {
    let mut stack = UndoStack::new(40);
    stack.record(EditType::Other, Some(1));
    stack.undo(2);
    assert!(stack.can_redo());
    stack.record(EditType::Other, Some(1));
    assert!(!stack.can_redo());
}

#[test]
fn test_limit_drops_oldest() {
    let mut stack = UndoStack::new(3);
    for i in 0..5 {
        stack.record(EditType::Other, Some(i));
    }
    assert_eq!(stack.len(), 3);
    assert_eq!(stack.undo(5), Some(4));
    assert_eq!(stack.undo(4), Some(3));
    assert_eq!(stack.undo(3), Some(2));
    assert_eq!(stack.undo(2), None);

    stack.set_limit(1);
    assert!(stack.len() <= 1);
}

#[test]
fn test_zero_limit_keeps_nothing() {
    let mut stack = UndoStack::new(0);
    stack.record(EditType::Other, Some("a"));
    assert!(!stack.can_undo());
}
