//! Weft - modal editing engine
//! Terminal demo host: drives a `Session` from crossterm key events

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use unicode_width::UnicodeWidthStr;

use monster_weft::config::{BindingConfig, SessionConfig};
use monster_weft::constants::actions;
use monster_weft::host::{EventPayload, HostCallbacks};
use monster_weft::lines::LineRange;
use monster_weft::measure::TextSize;
use monster_weft::session::Session;
use monster_weft::term::{scroll_top, Frame, Terminal};
use monster_weft::timers::TimerToken;

/// How long the loop sleeps when no timer is due
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Default)]
struct Args {
    file: Option<PathBuf>,
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> Result<Self> {
        let mut args = Args::default();
        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-c" | "--config" => {
                    let path = iter.next().context("--config needs a path")?;
                    args.config = Some(PathBuf::from(path));
                }
                flag if flag.starts_with('-') => bail!("unknown option {flag}"),
                _ if args.file.is_some() => bail!("only one file can be edited"),
                _ => args.file = Some(PathBuf::from(arg)),
            }
        }
        Ok(args)
    }
}

/// Host state the session reports into
#[derive(Debug, Default)]
struct DemoHost {
    timers: HashMap<TimerToken, (Instant, EventPayload)>,
    actions: Vec<String>,
    pasteboard: String,
    mode: String,
    parse_state: String,
    message: String,
    scroll_line: Option<usize>,
    dirty: bool,
}

impl DemoHost {
    fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().map(|(deadline, _)| *deadline).min()
    }

    fn take_due(&mut self, now: Instant) -> Vec<(TimerToken, EventPayload)> {
        let due: Vec<TimerToken> = self
            .timers
            .iter()
            .filter(|(_, (deadline, _))| *deadline <= now)
            .map(|(token, _)| *token)
            .collect();
        due.into_iter()
            .filter_map(|token| self.timers.remove(&token).map(|(_, payload)| (token, payload)))
            .collect()
    }

    fn take_actions(&mut self) -> Vec<String> {
        std::mem::take(&mut self.actions)
    }

    fn notification(&mut self, method: &str, params: &Value) {
        match method {
            "mode_change" => {
                self.mode = params["mode"].as_str().unwrap_or_default().to_string();
            }
            "parse_state" => {
                self.parse_state = params["state"].as_str().unwrap_or_default().to_string();
            }
            "set_pasteboard" => {
                self.pasteboard = params["text"].as_str().unwrap_or_default().to_string();
            }
            "scroll_to" => {
                self.scroll_line = params["line"].as_u64().map(|line| line as usize);
            }
            "error" => {
                self.message = params["message"].as_str().unwrap_or_default().to_string();
            }
            _ => {}
        }
        self.dirty = true;
    }
}

impl HostCallbacks for DemoHost {
    fn rpc_out(&mut self, message: &str) {
        let Ok(value) = serde_json::from_str::<Value>(message) else {
            tracing::warn!(raw = message, "unreadable message from session");
            return;
        };
        if let Some(method) = value["method"].as_str() {
            self.notification(method, &value["params"]);
        } else if let Some(error) = value.get("error") {
            self.message = error["message"].as_str().unwrap_or_default().to_string();
        }
    }

    fn invalidate(&mut self, range: LineRange) {
        tracing::trace!(?range, "invalidate");
        self.dirty = true;
    }

    /// One cell per display column, one row per line
    fn measure_text(&self, text: &str) -> TextSize {
        TextSize::new(text.width() as f64, 1.0)
    }

    fn event(&mut self, payload: &EventPayload, handled: bool) {
        if !handled {
            tracing::trace!(payload = payload.0, "key passed through");
        }
    }

    fn action(&mut self, name: &str) {
        self.actions.push(name.to_string());
    }

    fn set_timer(&mut self, token: TimerToken, payload: &EventPayload, delay_ms: u32) {
        let deadline = Instant::now() + Duration::from_millis(u64::from(delay_ms));
        self.timers.insert(token, (deadline, *payload));
    }

    fn cancel_timer(&mut self, token: TimerToken) {
        self.timers.remove(&token);
    }
}

fn init_logging() -> Result<()> {
    let Some(path) = std::env::var_os("WEFT_LOG") else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("cannot create log file {path:?}"))?;
    // Another subscriber being installed already is fine
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let mut config = match path {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    config.bindings.push(BindingConfig {
        mode: "global".to_string(),
        keys: "<C-q>".to_string(),
        action: format!("host:{}", actions::QUIT),
    });
    Ok(config)
}

fn save(session: &mut Session<DemoHost>, path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        session.host_mut().message = "no file name".to_string();
        return Ok(());
    };
    std::fs::write(path, session.text())
        .with_context(|| format!("cannot write {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved");
    session.host_mut().message = format!("\"{}\" written", path.display());
    Ok(())
}

fn draw(session: &mut Session<DemoHost>, terminal: &mut Terminal, top: &mut usize) -> Result<()> {
    let size = terminal.size()?;
    let rows = usize::from(size.rows.saturating_sub(1));
    let caret = session.caret();
    let target = session.host_mut().scroll_line.take().unwrap_or(caret.line);
    *top = scroll_top(*top, target, rows);

    let end = (*top + rows).min(session.line_count());
    let lines: Vec<_> = (*top..end).filter_map(|i| session.get_line(i)).collect();

    let host = session.host();
    let status = format!(
        " {} {:>6} {}:{}  {}",
        host.mode.to_uppercase(),
        host.parse_state,
        caret.line + 1,
        caret.col + 1,
        host.message
    );
    terminal.draw(&Frame {
        lines: &lines,
        status: &status,
    })?;
    session.host_mut().dirty = false;
    Ok(())
}

/// Returns when the user quits
fn run(session: &mut Session<DemoHost>, terminal: &mut Terminal, path: Option<&Path>) -> Result<()> {
    let size = terminal.size()?;
    session.send_message(
        &json!({
            "method": "viewport_change",
            "params": {"width": size.cols, "height": size.rows},
        })
        .to_string(),
    );

    let mut top = 0;
    let mut next_payload = 0u64;
    let mut redraw = true;
    loop {
        if redraw || session.host().dirty {
            draw(session, terminal, &mut top)?;
        }

        let timeout = session
            .host()
            .next_deadline()
            .map_or(IDLE_POLL, |deadline| {
                deadline.saturating_duration_since(Instant::now())
            });
        redraw = false;
        if let Some(key) = terminal.poll_key(timeout)? {
            next_payload += 1;
            session.host_mut().message.clear();
            let line = session.caret().line;
            session.handle_input(line, key, EventPayload(next_payload))?;
            redraw = true;
        }

        for (token, payload) in session.host_mut().take_due(Instant::now()) {
            session.fire_timer(token, payload);
            redraw = true;
        }

        // Actions are applied after the callback that raised them has returned
        for action in session.host_mut().take_actions() {
            tracing::debug!(action, "host action");
            match action.as_str() {
                actions::SAVE => save(session, path)?,
                actions::WRITE_QUIT => {
                    save(session, path)?;
                    return Ok(());
                }
                actions::QUIT => return Ok(()),
                actions::UNDO => session.send_message(r#"{"method":"undo"}"#),
                actions::REDO => session.send_message(r#"{"method":"redo"}"#),
                actions::PASTE => {
                    let text = session.host().pasteboard.clone();
                    if !text.is_empty() {
                        session.send_message(
                            &json!({"method": "insert", "params": {"chars": text}}).to_string(),
                        );
                    }
                }
                other => session.host_mut().message = format!("unhandled action {other}"),
            }
            redraw = true;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse()?;
    init_logging()?;

    let config = load_config(args.config.as_deref())?;
    let mut session = Session::new(DemoHost::default(), config)?;
    session.host_mut().mode = session.mode().to_string();

    if let Some(path) = args.file.as_deref().filter(|p| p.exists()) {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        session.send_message(&json!({"method": "set_text", "params": {"text": text}}).to_string());
        tracing::info!(path = %path.display(), lines = session.line_count(), "opened");
    }

    let mut terminal = Terminal::new();
    terminal.init()?;
    let result = run(&mut session, &mut terminal, args.file.as_deref());
    terminal.deinit();
    session.destroy();
    result
}
