//! Tests for the action module

use super::*;

#[test]
fn test_action_equals() {
    assert_eq!(Action::Move(Motion::Left), Action::Move(Motion::Left));
    assert_ne!(Action::Move(Motion::Left), Action::Move(Motion::Right));
    assert_eq!(Action::host("save"), Action::Host("save".to_string()));
}

#[test]
fn test_parse_movement() {
    assert_eq!(
        "editor:move_down".parse::<Action>().unwrap(),
        Action::Move(Motion::Down)
    );
    assert_eq!(
        "editor:move_file_end".parse::<Action>().unwrap(),
        Action::Move(Motion::EndOfFile)
    );
}

#[test]
fn test_parse_edits_and_operators() {
    assert_eq!(
        "edit:delete_forward".parse::<Action>().unwrap(),
        Action::Edit(EditCommand::DeleteForward)
    );
    assert_eq!(
        "operator:delete".parse::<Action>().unwrap(),
        Action::Operator(Operator::Delete)
    );
    assert_eq!("operator:linewise".parse::<Action>().unwrap(), Action::Linewise);
    assert_eq!(
        "edit:toggle_comment".parse::<Action>().unwrap(),
        Action::Edit(EditCommand::ToggleComment)
    );
    assert_eq!(
        "edit:delete_word_backward".parse::<Action>().unwrap(),
        Action::Edit(EditCommand::DeleteWordBackward)
    );
    assert_eq!(
        "insert:open_above".parse::<Action>().unwrap(),
        Action::Insert(InsertEntry::OpenAbove)
    );
    assert_eq!(
        "mode:visual".parse::<Action>().unwrap(),
        Action::EnterMode(Mode::Visual)
    );
}

#[test]
fn test_parse_host_action() {
    assert_eq!(
        "host:format_document".parse::<Action>().unwrap(),
        Action::host("format_document")
    );
    assert!("host:".parse::<Action>().is_err());
}

#[test]
fn test_parse_unknown_is_error() {
    let err = "editor:teleport".parse::<Action>().unwrap_err();
    assert_eq!(err.code, "INVALID_ACTION");
    assert!(err.contains_msg("editor:teleport"));
}

#[test]
fn test_motion_linewise() {
    assert!(Motion::Down.is_linewise());
    assert!(Motion::EndOfFile.is_linewise());
    assert!(!Motion::NextWord.is_linewise());
    assert!(!Motion::Left.is_linewise());
}
