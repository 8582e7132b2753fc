use super::*;
use crate::key::{Key, Modifiers};
use crate::lines::LineRange;
use crate::test_utils::{HostCall, RecordingHost, CHAR_WIDTH, LINE_HEIGHT};
use proptest::prelude::*;
use serde_json::json;

fn create_session() -> (Session<RecordingHost>, RecordingHost) {
    let host = RecordingHost::new();
    let session = Session::new(host.clone(), SessionConfig::default()).unwrap();
    (session, host)
}

fn session_with_text(text: &str) -> (Session<RecordingHost>, RecordingHost) {
    let (mut session, host) = create_session();
    session.send_message(&json!({"method": "set_text", "params": {"text": text}}).to_string());
    host.clear();
    (session, host)
}

fn normal_session(text: &str) -> (Session<RecordingHost>, RecordingHost) {
    let (mut session, host) = session_with_text(text);
    session.send_message(r#"{"method":"set_mode","params":{"mode":"normal"}}"#);
    host.clear();
    (session, host)
}

fn press(session: &mut Session<RecordingHost>, c: char) {
    session
        .handle_input(0, KeyDescriptor::char(c), EventPayload(c as u64))
        .unwrap();
}

// =============================================================================
// Lifecycle and queries
// =============================================================================

#[test]
fn test_new_session_has_one_empty_line() {
    let (session, host) = create_session();
    assert_eq!(session.line_count(), 1);
    assert_eq!(session.get_line(0).unwrap().text, "");
    assert_eq!(session.get_line(1), None);
    assert_eq!(session.mode(), Mode::Insert);
    assert!(host.calls().is_empty());
}

#[test]
fn test_invalid_config_rejected() {
    let config = SessionConfig {
        tab_size: 0,
        ..SessionConfig::default()
    };
    assert!(Session::new(RecordingHost::new(), config).is_err());
}

#[test]
fn test_get_line_is_a_snapshot() {
    let (mut session, _host) = session_with_text("abc");
    let before = session.get_line(0).unwrap();
    press(&mut session, 'x');
    assert_eq!(before.text, "abc");
    assert_eq!(session.get_line(0).unwrap().text, "xabc");
}

#[test]
fn test_get_line_out_of_range() {
    let (session, _host) = session_with_text("a\nb");
    assert_eq!(session.line_count(), 2);
    assert!(session.get_line(1).is_some());
    assert_eq!(session.get_line(2), None);
}

#[test]
fn test_input_on_missing_line_is_an_error() {
    let (mut session, host) = create_session();
    let err = session
        .handle_input(3, KeyDescriptor::char('a'), EventPayload(1))
        .unwrap_err();
    assert_eq!(err.code, errors::LINE_OUT_OF_RANGE);
    assert!(err.is_programming());
    assert!(session.clear_pending(1).is_err());
    assert!(session.handle_key_event(1, "a", 0, EventPayload(2)).is_err());

    assert!(host.calls().is_empty());
    assert_eq!(session.text(), "");
}

#[test]
fn test_destroy_cancels_live_timers() {
    let (mut session, host) = create_session();
    press(&mut session, 'j');
    assert_eq!(host.timers_set(), vec![1]);

    session.destroy();
    assert_eq!(host.timers_cancelled(), vec![1]);
}

#[test]
fn test_drop_tears_down_once() {
    let (mut session, host) = create_session();
    press(&mut session, 'j');
    drop(session);
    assert_eq!(host.timers_cancelled(), vec![1]);

    let (session, host) = create_session();
    session.destroy();
    assert!(host.calls().is_empty());
}

// =============================================================================
// Key input
// =============================================================================

#[test]
fn test_unbound_key_only_emits_event() {
    let (mut session, host) = create_session();
    session
        .handle_input(0, KeyDescriptor::ctrl('q'), EventPayload(5))
        .unwrap();
    assert_eq!(host.calls(), vec![HostCall::Event(EventPayload(5), false)]);
}

#[test]
fn test_insert_character() {
    let (mut session, host) = create_session();
    session
        .handle_input(0, KeyDescriptor::char('a'), EventPayload(1))
        .unwrap();

    let line = session.get_line(0).unwrap();
    assert_eq!(line.text, "a");
    assert_eq!(line.cursor, Some(1));
    assert_eq!(host.invalidations(), vec![LineRange::single(0)]);
    assert_eq!(host.events(), vec![(EventPayload(1), true)]);
    assert!(host.actions().is_empty());

    let calls = host.calls();
    assert_eq!(calls.first(), Some(&HostCall::Invalidate(LineRange::single(0))));
    assert_eq!(calls.last(), Some(&HostCall::Event(EventPayload(1), true)));
}

#[test]
fn test_two_key_sequence_cancels_its_timer_once() {
    let (mut session, host) = create_session();
    press(&mut session, 'j');
    assert_eq!(
        host.calls().first(),
        Some(&HostCall::SetTimer(1, EventPayload('j' as u64), 500))
    );
    assert_eq!(host.notifications("parse_state"), vec![json!({"state": "j"})]);

    press(&mut session, 'j');
    assert_eq!(host.timers_cancelled(), vec![1]);
    assert_eq!(session.mode(), Mode::Normal);
    assert_eq!(host.notifications("mode_change"), vec![json!({"mode": "normal"})]);
    assert!(host.invalidations().is_empty());
    assert_eq!(host.events().len(), 2);

    // The completed sequence's timer firing late changes nothing
    host.clear();
    session.fire_timer(1, EventPayload(99));
    assert!(host.calls().is_empty());
}

#[test]
fn test_timeout_inserts_pending_key() {
    let (mut session, host) = create_session();
    press(&mut session, 'j');
    host.clear();

    session.fire_timer(1, EventPayload(9));
    assert_eq!(session.text(), "j");
    assert_eq!(host.invalidations(), vec![LineRange::single(0)]);
    assert_eq!(host.calls().last(), Some(&HostCall::Event(EventPayload(9), true)));
}

#[test]
fn test_dropped_prefix_timeout_reports_unhandled() {
    let (mut session, host) = normal_session("abc");
    press(&mut session, 'g');
    host.clear();

    session.fire_timer(1, EventPayload(7));
    assert_eq!(session.text(), "abc");
    assert!(host.invalidations().is_empty());
    assert_eq!(host.notifications("parse_state"), vec![json!({"state": ""})]);
    assert_eq!(host.calls().last(), Some(&HostCall::Event(EventPayload(7), false)));
}

#[test]
fn test_cancel_then_fire_is_noop() {
    let (mut session, host) = create_session();
    press(&mut session, 'j');
    session.clear_pending(0).unwrap();
    assert_eq!(host.timers_cancelled(), vec![1]);
    assert_eq!(
        host.notifications("parse_state").last(),
        Some(&json!({"state": ""}))
    );

    host.clear();
    session.fire_timer(1, EventPayload(1));
    assert!(host.calls().is_empty());
    assert_eq!(session.text(), "");
}

#[test]
fn test_clear_pending_when_idle_is_silent() {
    let (mut session, host) = create_session();
    session.clear_pending(0).unwrap();
    session.clear_pending(0).unwrap();
    assert!(host.calls().is_empty());
}

#[test]
fn test_broken_sequence_invalidates_once() {
    let (mut session, host) = create_session();
    press(&mut session, 'j');
    host.clear();
    press(&mut session, 'k');
    assert_eq!(session.text(), "jk");
    assert_eq!(host.invalidations(), vec![LineRange::single(0)]);
    assert_eq!(host.timers_cancelled(), vec![1]);
}

#[test]
fn test_host_action_in_normal_mode() {
    let (mut session, host) = normal_session("abc");
    press(&mut session, 'u');
    assert_eq!(host.actions(), vec!["undo".to_string()]);
    assert_eq!(host.events(), vec![(EventPayload('u' as u64), true)]);
    assert!(host.invalidations().is_empty());
}

#[test]
fn test_handle_key_event() {
    let (mut session, host) = create_session();
    session
        .handle_key_event(0, "Escape", 0, EventPayload(1))
        .unwrap();
    assert_eq!(session.mode(), Mode::Normal);

    session.handle_key_event(0, "ab", 0, EventPayload(2)).unwrap();
    assert_eq!(host.events().last(), Some(&(EventPayload(2), false)));

    session
        .handle_key_event(0, "r", Modifiers::CTRL_MASK, EventPayload(3))
        .unwrap();
    assert_eq!(host.actions(), vec!["redo".to_string()]);
}

#[test]
fn test_open_line_below_reports_one_range() {
    let (mut session, host) = normal_session("one\ntwo\nthree");
    press(&mut session, 'o');
    assert_eq!(session.text(), "one\n\ntwo\nthree");
    assert_eq!(host.invalidations(), vec![LineRange::new(0, 3)]);
    assert_eq!(session.mode(), Mode::Insert);
}

#[test]
fn test_content_size_follows_text() {
    let (mut session, host) = create_session();
    session.send_message(r#"{"method":"insert","params":{"chars":"abc"}}"#);
    assert_eq!(
        host.notifications("content_size"),
        vec![json!({"width": 3.0 * CHAR_WIDTH, "height": LINE_HEIGHT})]
    );

    // Caret movement does not re-measure
    let measured = host.measure_count();
    session.send_message(r#"{"method":"move_left"}"#);
    assert_eq!(host.measure_count(), measured);

    session
        .handle_input(0, KeyDescriptor::plain(Key::Enter), EventPayload(0))
        .unwrap();
    assert_eq!(
        host.notifications("content_size").last(),
        Some(&json!({"width": 2.0 * CHAR_WIDTH, "height": 2.0 * LINE_HEIGHT}))
    );
}

// =============================================================================
// Protocol
// =============================================================================

#[test]
fn test_insert_message() {
    let (mut session, host) = create_session();
    session.send_message(r#"{"method":"insert","params":{"chars":"hi"}}"#);
    assert_eq!(session.text(), "hi");
    assert_eq!(host.invalidations(), vec![LineRange::single(0)]);
    assert!(host.replies().is_empty());
    assert!(host.events().is_empty());
}

#[test]
fn test_insert_crlf_splits_lines() {
    let (mut session, host) = create_session();
    session.send_message(r#"{"method":"insert","params":{"chars":"a\r\nb"}}"#);
    assert_eq!(session.line_count(), 2);
    assert_eq!(session.get_line(0).unwrap().text, "a");
    assert_eq!(session.get_line(1).unwrap().text, "b");
    assert_eq!(host.invalidations(), vec![LineRange::new(0, 1)]);

    let text = session.text();
    assert_eq!(text, "a\nb");
    session.send_message(&json!({"method": "set_text", "params": {"text": text}}).to_string());
    assert_eq!(session.text(), "a\nb");
}

#[test]
fn test_requests_get_one_reply_each() {
    let (mut session, host) = session_with_text("hi\nthere");
    session.send_message(r#"{"id":1,"method":"line_count"}"#);
    session.send_message(r#"{"id":2,"method":"get_line","params":{"index":0}}"#);
    session.send_message(r#"{"id":3,"method":"get_line","params":{"index":9}}"#);
    session.send_message(r#"{"id":4,"method":"get_text"}"#);
    session.send_message(r#"{"id":5,"method":"move_right"}"#);

    assert_eq!(
        host.replies(),
        vec![
            json!({"id": 1, "result": 2}),
            json!({"id": 2, "result": {"text": "hi", "cursor": 0}}),
            json!({"id": 3, "result": null}),
            json!({"id": 4, "result": "hi\nthere"}),
            json!({"id": 5, "result": null}),
        ]
    );
}

#[test]
fn test_malformed_message_reports_error() {
    let (mut session, host) = create_session();
    session.send_message("{oops");
    assert_eq!(
        host.notifications("error")[0]["code"],
        json!(errors::MALFORMED_MESSAGE)
    );

    session.send_message(r#"{"id":4,"method":12}"#);
    let reply = &host.replies()[0];
    assert_eq!(reply["id"], json!(4));
    assert_eq!(reply["error"]["code"], json!(errors::MALFORMED_MESSAGE));

    // Still usable
    session.send_message(r#"{"method":"insert","params":{"chars":"ok"}}"#);
    assert_eq!(session.text(), "ok");
}

#[test]
fn test_unknown_method_and_bad_params() {
    let (mut session, host) = create_session();
    session.send_message(r#"{"id":1,"method":"frobnicate"}"#);
    session.send_message(r#"{"id":2,"method":"insert","params":{}}"#);
    session.send_message(r#"{"method":"move_sideways_and_modify_selection"}"#);

    let replies = host.replies();
    assert_eq!(replies[0]["error"]["code"], json!(errors::UNKNOWN_METHOD));
    assert_eq!(replies[1]["error"]["code"], json!(errors::INVALID_PARAMS));
    assert_eq!(
        host.notifications("error")[0]["code"],
        json!(errors::UNKNOWN_METHOD)
    );
    assert!(host.invalidations().is_empty());
}

#[test]
fn test_motion_selection_and_copy() {
    let (mut session, host) = session_with_text("hello world");
    session.send_message(r#"{"method":"move_word_right"}"#);
    assert_eq!(session.caret(), Position::new(0, 6));

    session.send_message(r#"{"method":"move_to_end_of_line_and_modify_selection"}"#);
    assert_eq!(session.get_line(0).unwrap().selection, Some((6, 11)));

    session.send_message(r#"{"id":1,"method":"copy"}"#);
    assert_eq!(host.replies().last(), Some(&json!({"id": 1, "result": "world"})));
    assert_eq!(host.notifications("set_pasteboard"), vec![json!({"text": "world"})]);

    session.send_message(r#"{"method":"cut"}"#);
    assert_eq!(session.text(), "hello ");

    session.send_message(r#"{"method":"undo"}"#);
    assert_eq!(session.text(), "hello world");
    assert_eq!(host.invalidations().last(), Some(&LineRange::ALL));
    session.send_message(r#"{"method":"redo"}"#);
    assert_eq!(session.text(), "hello ");
}

#[test]
fn test_delete_to_line_edges() {
    let (mut session, _host) = session_with_text("one two three");
    session.send_message(r#"{"method":"move_word_right"}"#);
    session.send_message(r#"{"method":"delete_to_end_of_line"}"#);
    assert_eq!(session.text(), "one ");
    session.send_message(r#"{"method":"delete_to_beginning_of_line"}"#);
    assert_eq!(session.text(), "");
}

#[test]
fn test_word_delete_transpose_and_comment() {
    let (mut session, _host) = session_with_text("one two");
    session.send_message(r#"{"method":"move_to_end_of_line"}"#);
    session.send_message(r#"{"method":"delete_word_backward"}"#);
    assert_eq!(session.text(), "one ");

    session.send_message(r#"{"method":"move_left"}"#);
    session.send_message(r#"{"method":"transpose"}"#);
    assert_eq!(session.text(), "on e");

    session.send_message(r#"{"method":"set_text","params":{"text":"x\ny"}}"#);
    session.send_message(r#"{"method":"select_all"}"#);
    session.send_message(r#"{"method":"toggle_comment"}"#);
    assert_eq!(session.text(), "// x\n// y");
    session.send_message(r#"{"method":"toggle_comment"}"#);
    assert_eq!(session.text(), "x\ny");

    session.send_message(r#"{"method":"undo"}"#);
    assert_eq!(session.text(), "// x\n// y");
}

#[test]
fn test_page_motions() {
    let text: Vec<String> = (0..30).map(|i| i.to_string()).collect();
    let (mut session, _host) = session_with_text(&text.join("\n"));

    // Without a viewport a page is a fixed number of lines
    session.send_message(r#"{"method":"page_down"}"#);
    assert_eq!(session.caret(), Position::new(20, 0));
    session.send_message(r#"{"method":"page_up"}"#);
    assert_eq!(session.caret(), Position::new(0, 0));

    // 160 / 16 = 10 rows
    session.send_message(r#"{"method":"viewport_change","params":{"width":640.0,"height":160.0}}"#);
    session.send_message(r#"{"method":"page_down_and_modify_selection"}"#);
    assert_eq!(session.caret(), Position::new(10, 0));
    assert_eq!(session.get_line(0).unwrap().selection, Some((0, 1)));

    session.send_message(r#"{"method":"page_down"}"#);
    session.send_message(r#"{"method":"page_down"}"#);
    assert_eq!(session.caret(), Position::new(29, 0));
    assert_eq!(session.get_line(0).unwrap().selection, None);
}

#[test]
fn test_gestures() {
    let (mut session, _host) = session_with_text("alpha beta\ngamma");
    session.send_message(r#"{"method":"gesture","params":{"line":0,"col":7,"ty":"word_select"}}"#);
    assert_eq!(session.get_line(0).unwrap().selection, Some((6, 10)));

    session.send_message(r#"{"method":"gesture","params":{"line":1,"col":2,"ty":"point_select"}}"#);
    assert_eq!(session.caret(), Position::new(1, 2));

    session.send_message(r#"{"method":"gesture","params":{"line":0,"col":1,"ty":"range_select"}}"#);
    assert_eq!(session.get_line(1).unwrap().selection, Some((0, 2)));

    session.send_message(r#"{"method":"gesture","params":{"line":0,"col":3,"ty":"line_select"}}"#);
    assert_eq!(session.get_line(0).unwrap().selection, Some((0, 10)));
    assert_eq!(session.caret(), Position::new(1, 0));
}

#[test]
fn test_set_option() {
    let (mut session, host) = create_session();
    session.send_message(r#"{"id":1,"method":"set_option","params":{"name":"ts","value":2}}"#);
    assert_eq!(host.replies()[0], json!({"id": 1, "result": "tab_size"}));
    assert_eq!(session.config().tab_size, 2);

    session.send_message(r#"{"method":"insert_tab"}"#);
    assert_eq!(session.text(), "  ");

    session.send_message(r#"{"id":2,"method":"set_option","params":{"name":"spell","value":true}}"#);
    assert_eq!(host.replies()[1]["error"]["code"], json!(errors::UNKNOWN_SETTING));

    session.send_message(r#"{"id":3,"method":"set_option","params":{"name":"tm","value":0}}"#);
    assert_eq!(
        host.replies()[2]["error"]["code"],
        json!(errors::SETTING_VALIDATION_ERROR)
    );
    assert_eq!(session.config().key_timeout_ms, 500);
}

#[test]
fn test_undo_limit_option() {
    let (mut session, _host) = create_session();
    session.send_message(r#"{"method":"set_option","params":{"name":"undo_limit","value":1}}"#);
    for chars in ["a", "\n", "b"] {
        session.send_message(&json!({"method": "insert", "params": {"chars": chars}}).to_string());
    }
    session.send_message(r#"{"method":"undo"}"#);
    session.send_message(r#"{"method":"undo"}"#);
    assert_eq!(session.text(), "a\n");
}

#[test]
fn test_set_mode_message() {
    let (mut session, host) = create_session();
    press(&mut session, 'j');
    host.clear();

    session.send_message(r#"{"method":"set_mode","params":{"mode":"normal"}}"#);
    assert_eq!(session.mode(), Mode::Normal);
    assert_eq!(host.timers_cancelled(), vec![1]);
    assert_eq!(host.notifications("mode_change"), vec![json!({"mode": "normal"})]);

    session.send_message(r#"{"id":1,"method":"set_mode","params":{"mode":"bogus"}}"#);
    assert_eq!(host.replies()[0]["error"]["code"], json!(errors::INVALID_PARAMS));
    assert_eq!(session.mode(), Mode::Normal);
}

#[test]
fn test_viewport_change() {
    let (mut session, host) = session_with_text("abc");
    session.send_message(r#"{"method":"viewport_change","params":{"width":640.0,"height":480.0}}"#);
    assert_eq!(session.viewport(), Some(TextSize::new(640.0, 480.0)));
    assert_eq!(host.notifications("scroll_to"), vec![json!({"line": 0, "col": 0})]);
}

#[test]
fn test_word_wrap_follows_viewport() {
    let (mut session, host) = session_with_text("one two three four\nab");
    session.send_message(r#"{"method":"set_option","params":{"name":"word_wrap","value":true}}"#);
    assert!(host.invalidations().is_empty());
    assert!(host.notifications("content_size").is_empty());

    // 80 px holds ten characters
    session.send_message(r#"{"method":"viewport_change","params":{"width":80.0,"height":160.0}}"#);
    assert_eq!(host.invalidations(), vec![LineRange::ALL]);
    assert_eq!(
        host.notifications("content_size"),
        vec![json!({"width": 80.0, "height": 3.0 * LINE_HEIGHT})]
    );
    assert_eq!(session.get_line(0).unwrap().wraps, vec![8]);
    assert!(session.get_line(1).unwrap().wraps.is_empty());

    // Same width again is not a rewrap
    host.clear();
    session.send_message(r#"{"method":"viewport_change","params":{"width":80.0,"height":320.0}}"#);
    assert!(host.invalidations().is_empty());

    session.send_message(r#"{"method":"move_to_end_of_document"}"#);
    session.send_message(r#"{"method":"insert","params":{"chars":" cd ef gh"}}"#);
    assert_eq!(host.invalidations(), vec![LineRange::single(1)]);
    assert_eq!(session.get_line(1).unwrap().wraps, vec![9]);
    assert_eq!(
        host.notifications("content_size").last(),
        Some(&json!({"width": 80.0, "height": 4.0 * LINE_HEIGHT}))
    );

    host.clear();
    session.send_message(r#"{"method":"set_option","params":{"name":"wrap","value":false}}"#);
    assert_eq!(host.invalidations(), vec![LineRange::ALL]);
    assert!(session.get_line(0).unwrap().wraps.is_empty());
    assert_eq!(
        host.notifications("content_size"),
        vec![json!({"width": 18.0 * CHAR_WIDTH, "height": 2.0 * LINE_HEIGHT})]
    );
}

#[test]
fn test_word_wrap_from_config() {
    let config = SessionConfig {
        word_wrap: true,
        ..SessionConfig::default()
    };
    let host = RecordingHost::new();
    let mut session = Session::new(host.clone(), config).unwrap();
    session.send_message(r#"{"method":"insert","params":{"chars":"aaaa bbbb"}}"#);
    assert!(session.get_line(0).unwrap().wraps.is_empty());

    session.send_message(r#"{"method":"viewport_change","params":{"width":40.0,"height":100.0}}"#);
    assert_eq!(session.get_line(0).unwrap().wraps, vec![5]);

    session.send_message(r#"{"method":"viewport_change","params":{"width":200.0,"height":100.0}}"#);
    assert!(session.get_line(0).unwrap().wraps.is_empty());
    assert_eq!(host.invalidations().last(), Some(&LineRange::ALL));
}

// =============================================================================
// Properties
// =============================================================================

fn arb_key() -> impl Strategy<Value = KeyDescriptor> {
    prop_oneof![
        6 => "[a-zA-Z0-9$ ]".prop_map(|s| KeyDescriptor::char(s.chars().next().unwrap_or('a'))),
        1 => Just(KeyDescriptor::plain(Key::Escape)),
        1 => Just(KeyDescriptor::plain(Key::Enter)),
        1 => Just(KeyDescriptor::plain(Key::Backspace)),
        1 => Just(KeyDescriptor::plain(Key::Delete)),
        1 => Just(KeyDescriptor::ctrl('r')),
    ]
}

proptest! {
    /// Every key yields exactly one event and at most one invalidation, and
    /// every line keeps its marks inside its text
    #[test]
    fn prop_one_event_per_key(keys in proptest::collection::vec(arb_key(), 1..40)) {
        let (mut session, host) = session_with_text("one two\n  three\nfour");
        for (i, key) in keys.into_iter().enumerate() {
            host.clear();
            let line = session.caret().line;
            session.handle_input(line, key, EventPayload(i as u64)).unwrap();

            prop_assert_eq!(host.events().len(), 1);
            prop_assert_eq!(host.events()[0].0, EventPayload(i as u64));
            prop_assert!(host.invalidations().len() <= 1);

            let mut cursors = 0;
            for index in 0..session.line_count() {
                let line = session.get_line(index).unwrap();
                let len = line.text.chars().count();
                if let Some(col) = line.cursor {
                    prop_assert!(col <= len);
                    cursors += 1;
                }
                if let Some((start, end)) = line.selection {
                    prop_assert!(start <= end && end <= len);
                }
            }
            prop_assert_eq!(cursors, 1);
        }
    }
}
