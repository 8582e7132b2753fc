//! Default vim-flavoured bindings

use super::{KeyContext, KeyMap};
use crate::action::{Action, EditCommand, InsertEntry, Motion, Operator};
use crate::constants::actions;
use crate::key::{Key, KeyDescriptor};
use crate::mode::Mode;

/// Motions shared by normal, visual and operator pending modes
fn register_motions(map: &mut KeyMap, context: KeyContext) {
    let char_motions = [
        ('h', Motion::Left),
        ('l', Motion::Right),
        ('j', Motion::Down),
        ('k', Motion::Up),
        ('w', Motion::NextWord),
        ('b', Motion::PreviousWord),
        ('0', Motion::StartOfLine),
        ('$', Motion::EndOfLine),
        ('G', Motion::EndOfFile),
    ];
    for (c, motion) in char_motions {
        map.register(context, KeyDescriptor::char(c), Action::Move(motion));
    }

    let arrows = [
        (Key::ArrowLeft, Motion::Left),
        (Key::ArrowRight, Motion::Right),
        (Key::ArrowUp, Motion::Up),
        (Key::ArrowDown, Motion::Down),
        (Key::Home, Motion::StartOfLine),
        (Key::End, Motion::EndOfLine),
    ];
    for (key, motion) in arrows {
        map.register(context, KeyDescriptor::plain(key), Action::Move(motion));
    }

    map.register_sequence(
        context,
        vec![KeyDescriptor::char('g'), KeyDescriptor::char('g')],
        Action::Move(Motion::StartOfFile),
    );
}

/// Build the keymap a session starts with
pub fn default_keymap() -> KeyMap {
    let mut map = KeyMap::new();

    // Global
    map.register(
        KeyContext::Global,
        KeyDescriptor::ctrl('s'),
        Action::host(actions::SAVE),
    );

    // Insert
    let insert = KeyContext::Insert;
    map.register(insert, KeyDescriptor::plain(Key::Escape), Action::EnterMode(Mode::Normal));
    map.register_sequence(
        insert,
        vec![KeyDescriptor::char('j'), KeyDescriptor::char('j')],
        Action::EnterMode(Mode::Normal),
    );
    map.register(insert, KeyDescriptor::plain(Key::Enter), Action::Edit(EditCommand::InsertNewline));
    map.register(insert, KeyDescriptor::plain(Key::Tab), Action::Edit(EditCommand::InsertTab));
    map.register(insert, KeyDescriptor::plain(Key::Backspace), Action::Edit(EditCommand::DeleteBackward));
    map.register(insert, KeyDescriptor::plain(Key::Delete), Action::Edit(EditCommand::DeleteForward));
    map.register(insert, KeyDescriptor::ctrl('w'), Action::Edit(EditCommand::DeleteWordBackward));
    map.register(insert, KeyDescriptor::ctrl('t'), Action::Edit(EditCommand::Transpose));
    for (key, motion) in [
        (Key::ArrowLeft, Motion::Left),
        (Key::ArrowRight, Motion::Right),
        (Key::ArrowUp, Motion::Up),
        (Key::ArrowDown, Motion::Down),
        (Key::Home, Motion::StartOfLine),
        (Key::End, Motion::EndOfLine),
    ] {
        map.register(insert, KeyDescriptor::plain(key), Action::Move(motion));
    }

    // Normal
    let normal = KeyContext::Normal;
    register_motions(&mut map, normal);
    map.register(normal, KeyDescriptor::char('i'), Action::Insert(InsertEntry::Before));
    map.register(normal, KeyDescriptor::char('a'), Action::Insert(InsertEntry::After));
    map.register(normal, KeyDescriptor::char('A'), Action::Insert(InsertEntry::EndOfLine));
    map.register(normal, KeyDescriptor::char('o'), Action::Insert(InsertEntry::OpenBelow));
    map.register(normal, KeyDescriptor::char('O'), Action::Insert(InsertEntry::OpenAbove));
    map.register(normal, KeyDescriptor::char('x'), Action::Edit(EditCommand::DeleteForward));
    map.register(normal, KeyDescriptor::char('d'), Action::Operator(Operator::Delete));
    map.register(normal, KeyDescriptor::char('y'), Action::Operator(Operator::Yank));
    map.register(normal, KeyDescriptor::char('v'), Action::EnterMode(Mode::Visual));
    map.register(normal, KeyDescriptor::char('u'), Action::host(actions::UNDO));
    map.register(normal, KeyDescriptor::ctrl('r'), Action::host(actions::REDO));
    map.register(normal, KeyDescriptor::char('p'), Action::host(actions::PASTE));
    map.register_sequence(
        normal,
        vec![KeyDescriptor::char('g'), KeyDescriptor::char('c'), KeyDescriptor::char('c')],
        Action::Edit(EditCommand::ToggleComment),
    );
    map.register_sequence(
        normal,
        vec![KeyDescriptor::char('Z'), KeyDescriptor::char('Z')],
        Action::host(actions::WRITE_QUIT),
    );

    // Operator pending
    let pending = KeyContext::OperatorPending;
    register_motions(&mut map, pending);
    map.register(pending, KeyDescriptor::char('d'), Action::Linewise);
    map.register(pending, KeyDescriptor::char('y'), Action::Linewise);
    map.register(pending, KeyDescriptor::plain(Key::Escape), Action::EnterMode(Mode::Normal));

    // Visual
    let visual = KeyContext::Visual;
    register_motions(&mut map, visual);
    map.register(visual, KeyDescriptor::char('d'), Action::Edit(EditCommand::DeleteSelection));
    map.register(visual, KeyDescriptor::char('x'), Action::Edit(EditCommand::DeleteSelection));
    map.register(visual, KeyDescriptor::char('y'), Action::Edit(EditCommand::YankSelection));
    map.register(visual, KeyDescriptor::plain(Key::Escape), Action::EnterMode(Mode::Normal));
    map.register(visual, KeyDescriptor::char('v'), Action::EnterMode(Mode::Normal));
    map.register_sequence(
        visual,
        vec![KeyDescriptor::char('g'), KeyDescriptor::char('c')],
        Action::Edit(EditCommand::ToggleComment),
    );

    map
}
