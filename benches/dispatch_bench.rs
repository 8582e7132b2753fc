use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use monster_weft::config::SessionConfig;
use monster_weft::host::{EventPayload, HostCallbacks};
use monster_weft::key::{Key, KeyDescriptor};
use monster_weft::lines::LineRange;
use monster_weft::measure::TextSize;
use monster_weft::session::Session;
use monster_weft::timers::TimerToken;
use std::hint::black_box;

/// Host that drops every callback
struct NullHost;

impl HostCallbacks for NullHost {
    fn rpc_out(&mut self, message: &str) {
        black_box(message);
    }

    fn invalidate(&mut self, range: LineRange) {
        black_box(range);
    }

    fn measure_text(&self, text: &str) -> TextSize {
        TextSize::new(text.len() as f64, 1.0)
    }

    fn event(&mut self, _payload: &EventPayload, _handled: bool) {}

    fn action(&mut self, _name: &str) {}

    fn set_timer(&mut self, _token: TimerToken, _payload: &EventPayload, _delay_ms: u32) {}

    fn cancel_timer(&mut self, _token: TimerToken) {}
}

fn new_session(text: &str) -> Session<NullHost> {
    let mut session = Session::new(NullHost, SessionConfig::default()).unwrap();
    let message = serde_json::json!({"method": "set_text", "params": {"text": text}});
    session.send_message(&message.to_string());
    session
}

fn sample_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("line {i} with some words to move across"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    group.bench_function("insert_typing", |b| {
        b.iter_batched(
            || new_session(""),
            |mut session| {
                for (i, ch) in "the quick brown fox jumps over the lazy dog".chars().enumerate() {
                    session
                        .handle_input(0, KeyDescriptor::char(ch), EventPayload(i as u64))
                        .unwrap();
                }
                session
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("normal_motions", |b| {
        let text = sample_text(1000);
        b.iter_batched(
            || {
                let mut session = new_session(&text);
                session
                    .handle_input(0, KeyDescriptor::plain(Key::Escape), EventPayload(0))
                    .unwrap();
                session
            },
            |mut session| {
                for (i, ch) in "wwwjjjbbbkkk".chars().cycle().take(240).enumerate() {
                    let line = session.caret().line;
                    session
                        .handle_input(line, KeyDescriptor::char(ch), EventPayload(i as u64))
                        .unwrap();
                }
                session
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("delete_lines", |b| {
        let text = sample_text(500);
        b.iter_batched(
            || {
                let mut session = new_session(&text);
                session
                    .handle_input(0, KeyDescriptor::plain(Key::Escape), EventPayload(0))
                    .unwrap();
                session
            },
            |mut session| {
                for i in 0..100u64 {
                    let line = session.caret().line;
                    session
                        .handle_input(line, KeyDescriptor::char('d'), EventPayload(i))
                        .unwrap();
                    session
                        .handle_input(line, KeyDescriptor::char('d'), EventPayload(i))
                        .unwrap();
                }
                session
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("protocol_messages", |b| {
        let text = sample_text(200);
        b.iter_batched(
            || new_session(&text),
            |mut session| {
                for _ in 0..50 {
                    session.send_message(r#"{"method":"move_down"}"#);
                    session.send_message(r#"{"method":"insert","params":{"chars":"x"}}"#);
                    session.send_message(r#"{"id":1,"method":"get_line","params":{"index":3}}"#);
                }
                session
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, dispatch);
criterion_main!(benches);
