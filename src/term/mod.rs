//! Crossterm-based terminal
//! Raw-mode input and line rendering for the demo host
//!
//! ## term/ Invariants
//!
//! - Raw mode is enabled before input processing begins.
//! - Terminal state is restored on normal exit and on panic unwinding.
//! - Only key presses reach the session; releases and repeats are dropped.
//! - Columns on screen are display cells, never code points.

use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{self, ClearType},
};
use unicode_width::UnicodeWidthChar;

use crate::error::Result;
use crate::key::{Key, KeyDescriptor, Modifiers};
use crate::lines::Line;

/// Terminal size information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub rows: u16,
    pub cols: u16,
}

/// What one redraw shows
#[derive(Debug)]
pub struct Frame<'a> {
    /// Snapshots of the visible lines, top row first
    pub lines: &'a [Line],
    pub status: &'a str,
}

pub struct Terminal {
    out: Stdout,
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            out: stdout(),
            raw_mode_enabled: false,
            alternate_screen_enabled: false,
        }
    }

    /// Enter the alternate screen and raw mode
    pub fn init(&mut self) -> Result<()> {
        queue!(self.out, terminal::EnterAlternateScreen)?;
        self.out.flush()?;
        self.alternate_screen_enabled = true;

        terminal::enable_raw_mode()?;
        self.raw_mode_enabled = true;
        Ok(())
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn deinit(&mut self) {
        let _ = queue!(self.out, cursor::Show, SetAttribute(Attribute::Reset));

        if self.raw_mode_enabled {
            let _ = terminal::disable_raw_mode();
            self.raw_mode_enabled = false;
        }

        if self.alternate_screen_enabled {
            let _ = queue!(self.out, terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
        }
        let _ = self.out.flush();
    }

    pub fn size(&self) -> Result<Size> {
        let (cols, rows) = terminal::size()?;
        Ok(Size { rows, cols })
    }

    /// Wait up to `timeout` for a key press
    pub fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyDescriptor>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                Ok(translate_key_event(key_event))
            }
            _ => Ok(None),
        }
    }

    /// Redraw the text area and the status line
    pub fn draw(&mut self, frame: &Frame<'_>) -> Result<()> {
        let size = self.size()?;
        let text_rows = size.rows.saturating_sub(1);
        let width = usize::from(size.cols);
        let mut caret = None;

        queue!(self.out, cursor::Hide)?;
        for row in 0..text_rows {
            queue!(
                self.out,
                cursor::MoveTo(0, row),
                terminal::Clear(ClearType::UntilNewLine)
            )?;
            let Some(line) = frame.lines.get(usize::from(row)) else {
                queue!(self.out, Print("~"))?;
                continue;
            };
            self.draw_line(line, width)?;
            if let Some(col) = line.cursor {
                let x = display_col(&line.text, col).min(width.saturating_sub(1));
                caret = Some((x as u16, row));
            }
        }

        let status = fit_to_width(frame.status, width);
        queue!(
            self.out,
            cursor::MoveTo(0, text_rows),
            terminal::Clear(ClearType::UntilNewLine),
            SetAttribute(Attribute::Reverse),
            Print(status),
            SetAttribute(Attribute::Reset)
        )?;

        if let Some((x, y)) = caret {
            queue!(self.out, cursor::MoveTo(x, y), cursor::Show)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn draw_line(&mut self, line: &Line, width: usize) -> Result<()> {
        let visible = fit_to_width(&line.text, width);
        match line.selection {
            Some((start, end)) if start < end => {
                let chars: Vec<char> = visible.chars().collect();
                let start = start.min(chars.len());
                let end = end.min(chars.len());
                let before: String = chars[..start].iter().collect();
                let selected: String = chars[start..end].iter().collect();
                let after: String = chars[end..].iter().collect();
                queue!(
                    self.out,
                    Print(before),
                    SetAttribute(Attribute::Reverse),
                    Print(selected),
                    SetAttribute(Attribute::Reset),
                    Print(after)
                )?;
            }
            _ => queue!(self.out, Print(visible))?,
        }
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        self.deinit();
    }
}

/// First visible line so that `caret_line` stays on screen
pub fn scroll_top(top: usize, caret_line: usize, rows: usize) -> usize {
    let rows = rows.max(1);
    if caret_line < top {
        caret_line
    } else if caret_line >= top + rows {
        caret_line + 1 - rows
    } else {
        top
    }
}

/// Display cell of code-point column `col`
pub fn display_col(text: &str, col: usize) -> usize {
    text.chars()
        .take(col)
        .map(|c| c.width().unwrap_or(0))
        .sum()
}

/// Longest prefix of `text` that fits in `width` cells
pub fn fit_to_width(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (i, c) in text.char_indices() {
        used += c.width().unwrap_or(0);
        if used > width {
            return &text[..i];
        }
    }
    text
}

/// Translate a crossterm `KeyEvent`; keys the engine has no name for yield `None`
pub fn translate_key_event(key_event: KeyEvent) -> Option<KeyDescriptor> {
    let modifiers = Modifiers {
        ctrl: key_event.modifiers.contains(KeyModifiers::CONTROL),
        alt: key_event.modifiers.contains(KeyModifiers::ALT),
        cmd: key_event.modifiers.contains(KeyModifiers::SUPER),
    };

    let key = match key_event.code {
        // Some terminals send Enter as a character
        KeyCode::Char('\r') | KeyCode::Char('\n') => Key::Enter,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Left => Key::ArrowLeft,
        KeyCode::Right => Key::ArrowRight,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Delete => Key::Delete,
        _ => return None,
    };
    Some(KeyDescriptor::new(key, modifiers))
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
